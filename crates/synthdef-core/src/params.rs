//! Parameter declarations and their control nodes.
//!
//! Parameters are declared once, before the definition body runs. Each one
//! contributes its default values to the parameter table, in declaration
//! order. Contiguous runs of parameters of the same kind share one control
//! node whose special index is the table offset of the run's first value:
//!
//! | Kind | Node | Rate |
//! |---|---|---|
//! | scalar | `Control` | scalar |
//! | control | `Control`, or `LagControl` if any lag is non-zero | control |
//! | trigger | `TrigControl` | control |
//! | audio | `AudioControl` | audio |
//!
//! The body receives [`Params`]: one proxy signal per parameter, a single
//! wire for one-value parameters and an array of wires for vectors.

use core::fmt;

use crate::error::{Result, SynthDefError};
use crate::graph::{Builder, Input, NodeSpec, Signal, Wire};
use crate::rate::Rate;

/// How a parameter is updated while a synth runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ParamRate {
    /// Fixed when the synth starts.
    Scalar,
    /// Updated once per control block.
    #[default]
    Control,
    /// Control-rate value that resets to zero after one block.
    Trigger,
    /// Audio-rate input.
    Audio,
}

impl ParamRate {
    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            ParamRate::Scalar => "scalar",
            ParamRate::Control => "control",
            ParamRate::Trigger => "trigger",
            ParamRate::Audio => "audio",
        }
    }

    /// Parses a rate name (`ir`/`kr`/`tr`/`ar` abbreviations accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "scalar" | "ir" => Some(ParamRate::Scalar),
            "control" | "kr" => Some(ParamRate::Control),
            "trigger" | "tr" => Some(ParamRate::Trigger),
            "audio" | "ar" => Some(ParamRate::Audio),
            _ => None,
        }
    }

    /// Rate of the wires this parameter produces.
    pub const fn rate(self) -> Rate {
        match self {
            ParamRate::Scalar => Rate::Scalar,
            ParamRate::Control | ParamRate::Trigger => Rate::Control,
            ParamRate::Audio => Rate::Audio,
        }
    }
}

impl fmt::Display for ParamRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDef {
    name: String,
    rate: ParamRate,
    defaults: Vec<f32>,
    lag: Vec<f32>,
}

impl ParamDef {
    /// Declares a parameter with one or more default values.
    pub fn new(name: impl Into<String>, rate: ParamRate, defaults: impl Into<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            rate,
            defaults: defaults.into(),
            lag: Vec::new(),
        }
    }

    /// Scalar parameter with one default.
    pub fn scalar(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, ParamRate::Scalar, [default])
    }

    /// Control parameter with one default.
    pub fn control(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, ParamRate::Control, [default])
    }

    /// Trigger parameter with one default.
    pub fn trigger(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, ParamRate::Trigger, [default])
    }

    /// Audio parameter with one default.
    pub fn audio(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, ParamRate::Audio, [default])
    }

    /// Sets lag times: one for every value, or one per value.
    ///
    /// Only control parameters may lag.
    pub fn with_lag(mut self, lag: impl Into<Vec<f32>>) -> Self {
        self.lag = lag.into();
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Update rate.
    pub fn rate(&self) -> ParamRate {
        self.rate
    }

    /// Default values.
    pub fn defaults(&self) -> &[f32] {
        &self.defaults
    }

    /// Lag times as declared.
    pub fn lag(&self) -> &[f32] {
        &self.lag
    }

    /// Lag of value `i`, zero when none was declared.
    fn lag_at(&self, i: usize) -> f32 {
        match self.lag.len() {
            0 => 0.0,
            1 => self.lag[0],
            _ => self.lag[i],
        }
    }

    fn has_lag(&self) -> bool {
        self.lag.iter().any(|&l| l != 0.0)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SynthDefError::invalid_param(&self.name, "name is empty"));
        }
        if self.defaults.is_empty() {
            return Err(SynthDefError::invalid_param(&self.name, "no default value"));
        }
        if self.has_lag() && self.rate != ParamRate::Control {
            return Err(SynthDefError::invalid_param(
                &self.name,
                format!("{} parameters cannot lag", self.rate),
            ));
        }
        if self.lag.len() > 1 && self.lag.len() != self.defaults.len() {
            return Err(SynthDefError::invalid_param(
                &self.name,
                format!(
                    "{} lag values for {} default values",
                    self.lag.len(),
                    self.defaults.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Name and first parameter-table slot of one parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamName {
    /// Parameter name.
    pub name: String,
    /// Index of its first value in the parameter table.
    pub index: u32,
}

/// Parameter table of a definition: flattened defaults plus names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTable {
    /// Default values of every parameter, in declaration order.
    pub values: Vec<f32>,
    /// Name entries, in declaration order.
    pub names: Vec<ParamName>,
}

impl ParamTable {
    /// Builds the table, rejecting invalid or duplicate declarations.
    pub fn from_defs(defs: &[ParamDef]) -> Result<Self> {
        let mut table = ParamTable::default();
        for def in defs {
            def.validate()?;
            if table.names.iter().any(|n| n.name == def.name) {
                return Err(SynthDefError::invalid_param(&def.name, "declared twice"));
            }
            let index = u32::try_from(table.values.len())
                .map_err(|_| SynthDefError::overflow("parameter count", table.values.len(), i64::from(u32::MAX)))?;
            table.names.push(ParamName {
                name: def.name.clone(),
                index,
            });
            table.values.extend_from_slice(&def.defaults);
        }
        Ok(table)
    }

    /// Slot range of the named parameter.
    pub fn slots(&self, name: &str) -> Option<std::ops::Range<usize>> {
        let pos = self.names.iter().position(|n| n.name == name)?;
        let start = self.names[pos].index as usize;
        let end = self
            .names
            .get(pos + 1)
            .map_or(self.values.len(), |n| n.index as usize);
        Some(start..end)
    }
}

/// Read-only parameter proxies handed to a definition body.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: Vec<(String, Signal)>,
}

impl Params {
    /// Proxy of the named parameter.
    pub fn get(&self, name: &str) -> Result<Signal> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| SynthDefError::UnknownParameter(name.to_string()))
    }

    /// True when a parameter of that name was declared.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no parameters were declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Scalar,
    Control,
    Trigger,
    Audio,
}

impl From<ParamRate> for RunKind {
    fn from(rate: ParamRate) -> Self {
        match rate {
            ParamRate::Scalar => RunKind::Scalar,
            ParamRate::Control => RunKind::Control,
            ParamRate::Trigger => RunKind::Trigger,
            ParamRate::Audio => RunKind::Audio,
        }
    }
}

/// Creates the control nodes for `defs` and returns the proxies.
///
/// `defs` must already have passed [`ParamTable::from_defs`].
pub fn create_controls(builder: &mut Builder, defs: &[ParamDef]) -> Result<Params> {
    let mut params = Params::default();
    let mut offset = 0usize;
    let mut start = 0;
    while start < defs.len() {
        let kind = RunKind::from(defs[start].rate);
        let end = defs[start..]
            .iter()
            .position(|d| RunKind::from(d.rate) != kind)
            .map_or(defs.len(), |p| start + p);
        let run = &defs[start..end];

        let width: usize = run.iter().map(|d| d.defaults.len()).sum();
        let lagged = kind == RunKind::Control && run.iter().any(ParamDef::has_lag);
        let (tag, rate) = match kind {
            RunKind::Scalar => ("Control", Rate::Scalar),
            RunKind::Control if lagged => ("LagControl", Rate::Control),
            RunKind::Control => ("Control", Rate::Control),
            RunKind::Trigger => ("TrigControl", Rate::Control),
            RunKind::Audio => ("AudioControl", Rate::Audio),
        };
        let inputs: Vec<Input> = if lagged {
            run.iter()
                .flat_map(|d| (0..d.defaults.len()).map(move |i| Input::Constant(d.lag_at(i))))
                .collect()
        } else {
            Vec::new()
        };

        let special = i32::try_from(offset)
            .map_err(|_| SynthDefError::overflow("control offset", offset, i64::from(i32::MAX)))?;
        let spec = NodeSpec::new(tag, rate)
            .outputs(width as u32)
            .special_index(special);
        let wires = builder.add_node(&spec, inputs)?;

        let mut cursor = 0;
        for def in run {
            let n = def.defaults.len();
            let proxy = proxy(&wires[cursor..cursor + n]);
            params.entries.push((def.name.clone(), proxy));
            cursor += n;
        }

        offset += width;
        start = end;
    }
    Ok(params)
}

fn proxy(wires: &[Wire]) -> Signal {
    if wires.len() == 1 {
        Signal::from(wires[0])
    } else {
        Signal::array(wires.iter().copied())
    }
}
