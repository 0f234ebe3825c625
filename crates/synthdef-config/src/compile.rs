//! Building a [`SynthDef`] from a definition file.

use std::collections::HashMap;

use synthdef_core::{Builder, Params, Signal, SynthDef, SynthDefBuilder};
use synthdef_ugens::{ArgKind, ArgValue, UGenArgs, UGenRegistry};

use crate::definition::{ArgConfig, DefinitionFile, NodeConfig};
use crate::error::ConfigError;
use crate::validation::{Operator, parse_rate, split_reference, validate_with};

/// Validate and compile a definition with the built-in registry.
///
/// # Example
///
/// ```rust
/// use synthdef_config::{compile_definition, get_factory_definition};
///
/// let def = get_factory_definition("sine").unwrap();
/// let compiled = compile_definition(&def).unwrap();
/// assert_eq!(compiled.ugens.len(), 3);
/// ```
pub fn compile_definition(def: &DefinitionFile) -> Result<SynthDef, ConfigError> {
    compile_with(def, &UGenRegistry::new())
}

/// Validate and compile a definition, creating nodes through `registry`.
pub fn compile_with(def: &DefinitionFile, registry: &UGenRegistry) -> Result<SynthDef, ConfigError> {
    validate_with(def, registry)?;

    let builder = def
        .variant_defs()
        .into_iter()
        .fold(SynthDefBuilder::new(&def.name).params(def.param_defs()), SynthDefBuilder::variant);

    let compiled = builder.try_build(|b, params| -> Result<(), ConfigError> {
        let mut scope = Scope {
            params,
            nodes: HashMap::new(),
        };
        for (index, node) in def.nodes.iter().enumerate() {
            let label = node.label(index);
            let signal = match (&node.ugen, &node.op) {
                (Some(name), _) => build_ugen(registry, b, &scope, node, name, &label)?,
                (None, Some(op)) => build_op(b, &scope, node, op, &label)?,
                (None, None) => return Err(ConfigError::invalid_node(&label, "needs 'ugen' or 'op'")),
            };
            if let Some(id) = &node.id {
                scope.nodes.insert(id.as_str(), signal);
            }
        }
        Ok(())
    })?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "compile_definition: {} ({} nodes, {} ugens)",
        def.name,
        def.nodes.len(),
        compiled.ugens.len()
    );

    Ok(compiled)
}

/// Names visible to node arguments while building.
struct Scope<'a> {
    params: &'a Params,
    nodes: HashMap<&'a str, Signal>,
}

impl Scope<'_> {
    fn resolve(&self, reference: &str, node: &str) -> Result<Signal, ConfigError> {
        let unknown = || ConfigError::UnknownReference {
            node: node.to_string(),
            reference: reference.to_string(),
        };
        let (name, channel) = split_reference(reference).ok_or_else(unknown)?;
        let signal = match self.nodes.get(name) {
            Some(signal) => signal.clone(),
            None if self.params.contains(name) => self.params.get(name)?,
            None => return Err(unknown()),
        };
        match channel {
            None => Ok(signal),
            Some(i) if i < signal.width() => Ok(signal.channel(i)),
            Some(_) => Err(unknown()),
        }
    }

    fn signal(&self, value: &ArgConfig, node: &str, arg: &str) -> Result<Signal, ConfigError> {
        match value {
            ArgConfig::Number(v) => Ok(Signal::from(*v as f32)),
            ArgConfig::Reference(r) => self.resolve(r, node),
            ArgConfig::Array(items) => items
                .iter()
                .map(|item| self.signal(item, node, arg))
                .collect::<Result<Vec<_>, _>>()
                .map(Signal::Many),
            ArgConfig::Envelope(_) => Err(ConfigError::invalid_arg(node, arg, "an envelope is not a signal")),
        }
    }

    fn arg_value(&self, value: &ArgConfig, kind: ArgKind, node: &str, arg: &str) -> Result<ArgValue, ConfigError> {
        match (kind, value) {
            (ArgKind::Envelope, ArgConfig::Envelope(env)) => Ok(ArgValue::Env(env.to_env()?)),
            (ArgKind::Envelope, _) => Err(ConfigError::invalid_arg(node, arg, "expected an envelope table")),
            (ArgKind::Text, ArgConfig::Reference(text)) => Ok(ArgValue::Text(text.clone())),
            (ArgKind::Text, _) => Err(ConfigError::invalid_arg(node, arg, "expected a string")),
            _ => Ok(ArgValue::Signal(self.signal(value, node, arg)?)),
        }
    }

    fn operand(&self, node: &NodeConfig, name: &str, label: &str) -> Result<Option<Signal>, ConfigError> {
        node.args
            .get(name)
            .map(|value| self.signal(value, label, name))
            .transpose()
    }

    fn required_operand(&self, node: &NodeConfig, name: &str, label: &str) -> Result<Signal, ConfigError> {
        self.operand(node, name, label)?
            .ok_or_else(|| ConfigError::invalid_arg(label, name, "required operand is missing"))
    }
}

fn build_ugen(
    registry: &UGenRegistry,
    b: &mut Builder,
    scope: &Scope<'_>,
    node: &NodeConfig,
    name: &str,
    label: &str,
) -> Result<Signal, ConfigError> {
    let descriptor = registry
        .get(name)
        .ok_or_else(|| ConfigError::UnknownUGen(name.to_string()))?;
    let rate = match &node.rate {
        Some(rate) => parse_rate(rate, label)?,
        None => descriptor.default_rate(),
    };

    let mut args = UGenArgs::new();
    let mut scale = None;
    let mut offset = None;
    for (arg, value) in &node.args {
        match arg.as_str() {
            "mul" => scale = Some(scope.signal(value, label, arg)?),
            "add" => offset = Some(scope.signal(value, label, arg)?),
            _ => {
                let kind = descriptor.arg(arg).map_or(ArgKind::Input, |spec| spec.kind);
                args.set(arg.as_str(), scope.arg_value(value, kind, label, arg)?);
            }
        }
    }

    let signal = registry.create(b, name, rate, &args)?;
    if scale.is_none() && offset.is_none() {
        return Ok(signal);
    }
    Ok(b.mul_add(
        signal,
        scale.unwrap_or_else(|| Signal::from(1.0)),
        offset.unwrap_or_else(|| Signal::from(0.0)),
    )?)
}

fn build_op(
    b: &mut Builder,
    scope: &Scope<'_>,
    node: &NodeConfig,
    op: &str,
    label: &str,
) -> Result<Signal, ConfigError> {
    let operator = Operator::resolve(op, node.args.contains_key("b"))
        .ok_or_else(|| ConfigError::UnknownOperator(op.to_string()))?;
    let signal = match operator {
        Operator::Unary(op) => b.unary_op(op, scope.required_operand(node, "a", label)?)?,
        Operator::Binary(op) => b.binary_op(
            op,
            scope.required_operand(node, "a", label)?,
            scope.required_operand(node, "b", label)?,
        )?,
        Operator::MulAdd => b.mul_add(
            scope.required_operand(node, "in", label)?,
            scope.operand(node, "mul", label)?.unwrap_or_else(|| Signal::from(1.0)),
            scope.operand(node, "add", label)?.unwrap_or_else(|| Signal::from(0.0)),
        )?,
    };
    Ok(signal)
}
