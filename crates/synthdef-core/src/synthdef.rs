//! Definition build entry point and the compiled artifact.
//!
//! [`SynthDefBuilder::build`] runs the whole pipeline: it validates the
//! parameter declarations, installs a fresh [`Builder`], creates the control
//! nodes, runs the body, uninstalls the builder (also when the body fails),
//! orders the graph, and collects the constant pool.
//!
//! ```no_run
//! use synthdef_core::{ParamDef, Rate, SynthDefBuilder, NodeSpec};
//!
//! let def = SynthDefBuilder::new("beep")
//!     .param(ParamDef::control("freq", 440.0))
//!     .build(|b, params| {
//!         let freq = params.get("freq")?;
//!         let sine = b.expand(&NodeSpec::new("SinOsc", Rate::Audio), &[freq, 0.0.into()], &[0, 1])?;
//!         let out = b.mul(&sine, 0.2)?;
//!         b.expand(&NodeSpec::new("Out", Rate::Audio).outputs(0), &[0.into(), out], &[0, 1])?;
//!         Ok(())
//!     })?;
//! let bytes = def.encode()?;
//! # Ok::<(), synthdef_core::SynthDefError>(())
//! ```

use core::fmt;
use std::collections::HashMap;

use crate::error::{Result, SynthDefError};
use crate::graph::{ActiveBuild, Builder, BuiltGraph, Input, schedule};
use crate::params::{ParamDef, ParamTable, Params, create_controls};
use crate::rate::Rate;

/// One input of a compiled node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSpec {
    /// Index into the constant pool.
    Constant(u32),
    /// Output `output` of the node at position `ugen`.
    Wire {
        /// Position of the source node in the ordered node list.
        ugen: u32,
        /// Output slot on the source node.
        output: u32,
    },
}

/// One node of a compiled definition.
#[derive(Clone, Debug, PartialEq)]
pub struct UGenSpec {
    /// Node type name.
    pub type_tag: String,
    /// Calculation rate.
    pub rate: Rate,
    /// Type-specific selector.
    pub special_index: i32,
    /// Inputs in argument order.
    pub inputs: Vec<InputSpec>,
    /// Rate of each output.
    pub output_rates: Vec<Rate>,
}

/// A named full set of parameter values.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    /// Variant name.
    pub name: String,
    /// One value per parameter-table slot.
    pub values: Vec<f32>,
}

/// Declaration of a variant: overrides applied to the parameter defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantDef {
    name: String,
    overrides: Vec<(String, Vec<f32>)>,
}

impl VariantDef {
    /// Starts a variant with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: Vec::new(),
        }
    }

    /// Overrides the values of one parameter.
    pub fn set(mut self, param: impl Into<String>, values: impl Into<Vec<f32>>) -> Self {
        self.overrides.push((param.into(), values.into()));
        self
    }

    /// Variant name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, table: &ParamTable) -> Result<Variant> {
        let mut values = table.values.clone();
        for (param, override_values) in &self.overrides {
            let slots = table
                .slots(param)
                .ok_or_else(|| SynthDefError::UnknownParameter(param.clone()))?;
            if slots.len() != override_values.len() {
                return Err(SynthDefError::invalid_param(
                    param,
                    format!(
                        "variant '{}' sets {} values, expected {}",
                        self.name,
                        override_values.len(),
                        slots.len()
                    ),
                ));
            }
            values[slots].copy_from_slice(override_values);
        }
        Ok(Variant {
            name: self.name.clone(),
            values,
        })
    }
}

/// A compiled synth definition.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthDef {
    /// Definition name.
    pub name: String,
    /// Deduplicated constant pool, in first-use order.
    pub constants: Vec<f32>,
    /// Parameter defaults and names.
    pub params: ParamTable,
    /// Nodes in execution order.
    pub ugens: Vec<UGenSpec>,
    /// Named parameter presets.
    pub variants: Vec<Variant>,
}

impl SynthDef {
    /// Looks up a constant by pool index.
    pub fn constant(&self, index: u32) -> Option<f32> {
        self.constants.get(index as usize).copied()
    }

    /// Positions of all nodes of the given type.
    pub fn find_ugens<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.ugens
            .iter()
            .enumerate()
            .filter(move |(_, u)| u.type_tag == type_tag)
            .map(|(i, _)| i)
    }
}

impl fmt::Display for SynthDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        if !self.params.names.is_empty() {
            let names: Vec<String> = self
                .params
                .names
                .iter()
                .map(|n| format!("{}@{}", n.name, n.index))
                .collect();
            writeln!(f, "  params: {} = {:?}", names.join(" "), self.params.values)?;
        }
        for (i, ugen) in self.ugens.iter().enumerate() {
            let inputs: Vec<String> = ugen
                .inputs
                .iter()
                .map(|input| match *input {
                    InputSpec::Constant(c) => self
                        .constant(c)
                        .map_or_else(|| format!("const#{c}"), |v| v.to_string()),
                    InputSpec::Wire { ugen, output } => format!("{ugen}_{output}"),
                })
                .collect();
            write!(f, "  [{i}] {} {}", ugen.type_tag, ugen.rate)?;
            if ugen.special_index != 0 {
                write!(f, " #{}", ugen.special_index)?;
            }
            writeln!(f, " ({}) -> {}", inputs.join(", "), ugen.output_rates.len())?;
        }
        for variant in &self.variants {
            writeln!(f, "  variant {}: {:?}", variant.name, variant.values)?;
        }
        Ok(())
    }
}

/// Deduplicating constant pool in first-use order.
///
/// Values are equal when numerically equal: `-0.0` joins `0.0`, and NaNs
/// join by bit pattern.
#[derive(Default)]
struct ConstantPool {
    values: Vec<f32>,
    index: HashMap<u32, u32>,
}

impl ConstantPool {
    fn intern(&mut self, value: f32) -> Result<u32> {
        let value = if value == 0.0 { 0.0 } else { value };
        if let Some(&i) = self.index.get(&value.to_bits()) {
            return Ok(i);
        }
        let i = u32::try_from(self.values.len())
            .map_err(|_| SynthDefError::overflow("constant count", self.values.len(), i64::from(u32::MAX)))?;
        self.values.push(value);
        self.index.insert(value.to_bits(), i);
        Ok(i)
    }
}

/// Orders a finished graph and converts it to the compiled form.
pub fn compile_graph(name: &str, graph: &BuiltGraph, params: ParamTable, variants: Vec<Variant>) -> Result<SynthDef> {
    let order = schedule(graph)?;

    let mut pool = ConstantPool::default();
    let mut constant_index = Vec::with_capacity(graph.nodes().len());
    for node in graph.nodes() {
        let indices = node
            .inputs()
            .iter()
            .map(|input| match input {
                Input::Constant(v) => pool.intern(*v).map(Some),
                Input::Wire(_) => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;
        constant_index.push(indices);
    }

    let mut ugens = Vec::with_capacity(order.len());
    for &id in order.order() {
        let node = &graph.nodes()[id.index() as usize];
        let inputs = node
            .inputs()
            .iter()
            .zip(&constant_index[id.index() as usize])
            .map(|(input, constant)| match (input, constant) {
                (_, Some(c)) => InputSpec::Constant(*c),
                (Input::Wire(w), None) => InputSpec::Wire {
                    ugen: order.position(w.node()).unwrap_or(u32::MAX),
                    output: w.output(),
                },
                (Input::Constant(_), None) => unreachable!("every constant was interned"),
            })
            .collect();
        ugens.push(UGenSpec {
            type_tag: node.type_tag().to_string(),
            rate: node.rate(),
            special_index: node.special_index(),
            inputs,
            output_rates: vec![node.rate(); node.output_count() as usize],
        });
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "compile: '{}' {} ugens, {} constants, {} params",
        name,
        ugens.len(),
        pool.values.len(),
        params.values.len()
    );

    Ok(SynthDef {
        name: name.to_string(),
        constants: pool.values,
        params,
        ugens,
        variants,
    })
}

/// Declares and builds one synth definition.
#[derive(Clone, Debug)]
pub struct SynthDefBuilder {
    name: String,
    params: Vec<ParamDef>,
    variants: Vec<VariantDef>,
}

impl SynthDefBuilder {
    /// Starts a definition with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Declares one parameter.
    pub fn param(mut self, def: ParamDef) -> Self {
        self.params.push(def);
        self
    }

    /// Declares several parameters, in order.
    pub fn params(mut self, defs: impl IntoIterator<Item = ParamDef>) -> Self {
        self.params.extend(defs);
        self
    }

    /// Declares a variant.
    pub fn variant(mut self, variant: VariantDef) -> Self {
        self.variants.push(variant);
        self
    }

    /// Runs `body` against a fresh build context and compiles the result.
    ///
    /// `body` receives the builder and the parameter proxies. Any error it
    /// returns aborts the build; the context is uninstalled either way.
    pub fn build<F>(self, body: F) -> Result<SynthDef>
    where
        F: FnOnce(&mut Builder, &Params) -> Result<()>,
    {
        self.try_build(body)
    }

    /// Like [`build`](Self::build), for bodies with their own error type.
    pub fn try_build<E, F>(self, body: F) -> std::result::Result<SynthDef, E>
    where
        E: From<SynthDefError>,
        F: FnOnce(&mut Builder, &Params) -> std::result::Result<(), E>,
    {
        let table = ParamTable::from_defs(&self.params)?;
        let variants = self
            .variants
            .iter()
            .map(|v| v.resolve(&table))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = Builder::new();
        {
            let _active = ActiveBuild::install(&builder)?;
            let params = create_controls(&mut builder, &self.params)?;
            body(&mut builder, &params)?;
        }
        let graph = builder.finish();
        Ok(compile_graph(&self.name, &graph, table, variants)?)
    }
}

/// Opens a definition with the given parameters.
pub fn begin_definition(name: impl Into<String>, params: impl IntoIterator<Item = ParamDef>) -> SynthDefBuilder {
    SynthDefBuilder::new(name).params(params)
}
