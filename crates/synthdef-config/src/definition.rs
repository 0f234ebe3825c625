//! Definition file format.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use synthdef_core::{Adsr, Asr, Curve, Env, Linen, ParamDef, ParamRate, Perc, VariantDef};

use crate::error::ConfigError;

/// A synth definition described declaratively.
///
/// Nodes are created in file order. An argument value is a number, a
/// reference to a parameter or an earlier node id (`"osc"`, or `"pan:1"`
/// for one channel), an array (which expands the node), or an envelope
/// table.
///
/// # TOML Format
///
/// ```toml
/// name = "pan"
/// description = "Sine panned by a control"
///
/// [[params]]
/// name = "pos"
/// default = 0.0
///
/// [[nodes]]
/// id = "osc"
/// ugen = "SinOsc"
/// args = { freq = 440 }
///
/// [[nodes]]
/// id = "pan"
/// ugen = "Pan2"
/// args = { in = "osc", pos = "pos" }
///
/// [[nodes]]
/// ugen = "Out"
/// args = { bus = 0, channels = "pan" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefinitionFile {
    /// Definition name written to the compiled file.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamConfig>,

    /// Nodes, in creation order.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Named parameter presets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantConfig>,
}

impl DefinitionFile {
    /// Create an empty definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            nodes: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a parameter.
    pub fn with_param(mut self, param: ParamConfig) -> Self {
        self.params.push(param);
        self
    }

    /// Add a node.
    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a variant.
    pub fn with_variant(mut self, variant: VariantConfig) -> Self {
        self.variants.push(variant);
        self
    }

    /// Load a definition from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the definition to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the definition to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parameter declarations for the core builder.
    pub fn param_defs(&self) -> Vec<ParamDef> {
        self.params.iter().map(ParamConfig::to_param_def).collect()
    }

    /// Variant declarations for the core builder.
    pub fn variant_defs(&self) -> Vec<VariantDef> {
        self.variants.iter().map(VariantConfig::to_variant_def).collect()
    }
}

/// Update rate of a parameter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Fixed at synth start.
    Scalar,
    /// Updated once per control block.
    #[default]
    Control,
    /// Resets to zero after one block.
    Trigger,
    /// Audio-rate input.
    Audio,
}

impl From<ParamKind> for ParamRate {
    fn from(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Scalar => ParamRate::Scalar,
            ParamKind::Control => ParamRate::Control,
            ParamKind::Trigger => ParamRate::Trigger,
            ParamKind::Audio => ParamRate::Audio,
        }
    }
}

/// One number or a list of numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Values {
    /// A single value.
    One(f64),
    /// Several values.
    Many(Vec<f64>),
}

impl Values {
    /// The values as `f32`s.
    pub fn to_vec(&self) -> Vec<f32> {
        match self {
            Values::One(v) => vec![*v as f32],
            Values::Many(vs) => vs.iter().map(|v| *v as f32).collect(),
        }
    }
}

impl From<f64> for Values {
    fn from(v: f64) -> Self {
        Values::One(v)
    }
}

impl From<Vec<f64>> for Values {
    fn from(vs: Vec<f64>) -> Self {
        Values::Many(vs)
    }
}

/// A parameter declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamConfig {
    /// Parameter name, also usable as a reference in node arguments.
    pub name: String,
    /// Update rate.
    #[serde(default)]
    pub rate: ParamKind,
    /// Default value, or one value per channel.
    pub default: Values,
    /// Lag time per channel. Control rate only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag: Option<Values>,
}

impl ParamConfig {
    /// A control-rate parameter.
    pub fn new(name: impl Into<String>, default: impl Into<Values>) -> Self {
        Self {
            name: name.into(),
            rate: ParamKind::Control,
            default: default.into(),
            lag: None,
        }
    }

    /// Set the rate.
    pub fn with_rate(mut self, rate: ParamKind) -> Self {
        self.rate = rate;
        self
    }

    /// Set the lag.
    pub fn with_lag(mut self, lag: impl Into<Values>) -> Self {
        self.lag = Some(lag.into());
        self
    }

    /// Core declaration for this parameter.
    pub fn to_param_def(&self) -> ParamDef {
        let def = ParamDef::new(&self.name, self.rate.into(), self.default.to_vec());
        match &self.lag {
            Some(lag) => def.with_lag(lag.to_vec()),
            None => def,
        }
    }
}

/// One node: either a unit generator or an operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    /// Name other nodes use to refer to this node's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unit generator type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ugen: Option<String>,
    /// Operator name (`"mul"`, `"+"`, `"midicps"`, `"mul_add"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Rate name. Defaults to the unit generator's first rate. Not allowed
    /// on operators, whose rate follows their operands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    /// Named arguments. Unit generators also take `mul` and `add`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, ArgConfig>,
}

impl NodeConfig {
    /// A unit generator node.
    pub fn ugen(name: impl Into<String>) -> Self {
        Self {
            ugen: Some(name.into()),
            ..Self::default()
        }
    }

    /// An operator node.
    pub fn op(name: impl Into<String>) -> Self {
        Self {
            op: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the rate.
    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    /// Bind an argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<ArgConfig>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Name used in error messages: the id, or `#<position>`.
    pub fn label(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("#{index}"))
    }
}

/// Value of one node argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArgConfig {
    /// A literal.
    Number(f64),
    /// A parameter or node reference, or the text of a label argument.
    Reference(String),
    /// Several values. Expands the node in expandable slots.
    Array(Vec<ArgConfig>),
    /// An envelope.
    Envelope(EnvelopeConfig),
}

impl ArgConfig {
    /// Calls `f` on every reference, including those nested in arrays.
    pub fn for_each_reference<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            ArgConfig::Reference(r) => f(r),
            ArgConfig::Array(items) => items.iter().for_each(|i| i.for_each_reference(f)),
            ArgConfig::Number(_) | ArgConfig::Envelope(_) => {}
        }
    }
}

impl From<f64> for ArgConfig {
    fn from(v: f64) -> Self {
        ArgConfig::Number(v)
    }
}

impl From<i32> for ArgConfig {
    fn from(v: i32) -> Self {
        ArgConfig::Number(f64::from(v))
    }
}

impl From<&str> for ArgConfig {
    fn from(r: &str) -> Self {
        ArgConfig::Reference(r.to_string())
    }
}

impl<T: Into<ArgConfig>> From<Vec<T>> for ArgConfig {
    fn from(items: Vec<T>) -> Self {
        ArgConfig::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<EnvelopeConfig> for ArgConfig {
    fn from(env: EnvelopeConfig) -> Self {
        ArgConfig::Envelope(env)
    }
}

/// Envelope shape name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvShape {
    /// Attack, decay, sustain, release.
    Adsr,
    /// Attack, sustain, release.
    Asr,
    /// Percussive attack and release.
    Perc,
    /// Trapezoid with a timed sustain.
    Linen,
    /// Linear rise and fall.
    Triangle,
    /// Explicit `levels`, `times`, and `curves`.
    Custom,
}

/// A segment curve: a curvature number or a curve name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CurveConfig {
    /// Curvature value.
    Value(f64),
    /// Curve name such as `"lin"` or `"exp"`.
    Name(String),
}

impl CurveConfig {
    fn to_curve(&self) -> Result<Curve, ConfigError> {
        match self {
            CurveConfig::Value(v) => Ok(Curve::Numeric(*v as f32)),
            CurveConfig::Name(name) => Ok(name.parse()?),
        }
    }
}

/// Envelope table.
///
/// Omitted fields take the shape's defaults. For `asr`, `sustain` is a
/// level; for `linen`, it is a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeConfig {
    /// Shape.
    pub shape: EnvShape,
    /// Attack time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<f64>,
    /// Decay time (`adsr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay: Option<f64>,
    /// Sustain level (`adsr`, `asr`) or time (`linen`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustain: Option<f64>,
    /// Release time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<f64>,
    /// Peak level (`adsr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<f64>,
    /// Level (`perc`, `linen`, `triangle`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    /// Offset added to every level (`adsr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<f64>,
    /// Total duration (`triangle`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Curve of every segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveConfig>,
    /// Breakpoint levels (`custom`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<f64>,
    /// Segment times (`custom`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<f64>,
    /// Per-segment curves, cycled (`custom`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curves: Vec<CurveConfig>,
    /// Node the envelope holds at until released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_node: Option<usize>,
    /// Node the envelope loops back to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_node: Option<usize>,
}

impl EnvelopeConfig {
    /// An envelope of the given shape with default fields.
    pub fn new(shape: EnvShape) -> Self {
        Self {
            shape,
            attack: None,
            decay: None,
            sustain: None,
            release: None,
            peak: None,
            level: None,
            bias: None,
            duration: None,
            curve: None,
            levels: Vec::new(),
            times: Vec::new(),
            curves: Vec::new(),
            release_node: None,
            loop_node: None,
        }
    }

    /// Builds the envelope.
    pub fn to_env(&self) -> Result<Env, ConfigError> {
        let curve = self.curve.as_ref().map(CurveConfig::to_curve).transpose()?;
        let pick = |field: Option<f64>, default: f32| field.map_or(default, |v| v as f32);

        let env = match self.shape {
            EnvShape::Adsr => {
                let d = Adsr::default();
                Env::adsr(&Adsr {
                    attack: pick(self.attack, d.attack),
                    decay: pick(self.decay, d.decay),
                    sustain: pick(self.sustain, d.sustain),
                    release: pick(self.release, d.release),
                    peak: pick(self.peak, d.peak),
                    curve: curve.unwrap_or(d.curve),
                    bias: pick(self.bias, d.bias),
                })
            }
            EnvShape::Asr => {
                let d = Asr::default();
                Env::asr(&Asr {
                    attack: pick(self.attack, d.attack),
                    sustain: pick(self.sustain, d.sustain),
                    release: pick(self.release, d.release),
                    curve: curve.unwrap_or(d.curve),
                })
            }
            EnvShape::Perc => {
                let d = Perc::default();
                Env::perc(&Perc {
                    attack: pick(self.attack, d.attack),
                    release: pick(self.release, d.release),
                    level: pick(self.level, d.level),
                    curve: curve.unwrap_or(d.curve),
                })
            }
            EnvShape::Linen => {
                let d = Linen::default();
                Env::linen(&Linen {
                    attack: pick(self.attack, d.attack),
                    sustain: pick(self.sustain, d.sustain),
                    release: pick(self.release, d.release),
                    level: pick(self.level, d.level),
                    curve: curve.unwrap_or(d.curve),
                })
            }
            EnvShape::Triangle => Env::triangle(pick(self.duration, 1.0), pick(self.level, 1.0)),
            EnvShape::Custom => {
                let mut curves = self
                    .curves
                    .iter()
                    .map(CurveConfig::to_curve)
                    .collect::<Result<Vec<_>, _>>()?;
                if curves.is_empty()
                    && let Some(curve) = curve
                {
                    curves.push(curve);
                }
                Env::new(
                    self.levels.iter().map(|v| *v as f32).collect(),
                    self.times.iter().map(|v| *v as f32).collect(),
                    curves,
                )?
            }
        };

        let env = match self.release_node {
            Some(node) => env.with_release_node(node),
            None => env,
        };
        Ok(match self.loop_node {
            Some(node) => env.with_loop_node(node),
            None => env,
        })
    }
}

/// A named set of parameter overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantConfig {
    /// Variant name.
    pub name: String,
    /// Values per overridden parameter.
    #[serde(default)]
    pub values: BTreeMap<String, Values>,
}

impl VariantConfig {
    /// A variant with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Override one parameter.
    pub fn with_value(mut self, param: impl Into<String>, values: impl Into<Values>) -> Self {
        self.values.insert(param.into(), values.into());
        self
    }

    /// Core declaration for this variant.
    pub fn to_variant_def(&self) -> VariantDef {
        self.values
            .iter()
            .fold(VariantDef::new(&self.name), |v, (param, values)| {
                v.set(param, values.to_vec())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAN: &str = r#"
name = "pan"

[[params]]
name = "pos"
default = 0.0

[[nodes]]
id = "osc"
ugen = "SinOsc"

[[nodes]]
id = "pan"
ugen = "Pan2"
args = { in = "osc", pos = "pos" }

[[nodes]]
ugen = "Out"
args = { bus = 0, channels = ["pan:0", "pan:1"] }
"#;

    #[test]
    fn parses_nodes_and_arguments() {
        let def = DefinitionFile::from_toml(PAN).unwrap();
        assert_eq!(def.name, "pan");
        assert_eq!(def.params[0].rate, ParamKind::Control);
        assert_eq!(def.nodes.len(), 3);
        assert_eq!(def.nodes[1].args["in"], ArgConfig::Reference("osc".to_string()));
        assert_eq!(def.nodes[2].args["bus"], ArgConfig::Number(0.0));
        assert!(matches!(&def.nodes[2].args["channels"], ArgConfig::Array(items) if items.len() == 2));
        assert_eq!(def.nodes[2].label(2), "#2");
    }

    #[test]
    fn toml_round_trip() {
        let def = DefinitionFile::from_toml(PAN).unwrap();
        let again = DefinitionFile::from_toml(&def.to_toml().unwrap()).unwrap();
        assert_eq!(def, again);
    }

    #[test]
    fn envelope_table_parses() {
        let def = DefinitionFile::from_toml(
            r#"
name = "e"
[[nodes]]
ugen = "EnvGen"
args = { envelope = { shape = "perc", release = 0.5, curve = "lin" } }
"#,
        )
        .unwrap();
        let ArgConfig::Envelope(env) = &def.nodes[0].args["envelope"] else {
            panic!("expected an envelope");
        };
        let env = env.to_env().unwrap();
        assert_eq!(env.times(), &[0.01, 0.5]);
        assert_eq!(env.curve(0), Curve::Linear);
    }

    #[test]
    fn adsr_defaults_match_core() {
        let env = EnvelopeConfig::new(EnvShape::Adsr).to_env().unwrap();
        assert_eq!(env, Env::adsr(&Adsr::default()));
    }

    #[test]
    fn custom_envelope_checks_lengths() {
        let mut env = EnvelopeConfig::new(EnvShape::Custom);
        env.levels = vec![0.0, 1.0, 0.0];
        env.times = vec![0.5];
        assert!(matches!(
            env.to_env(),
            Err(ConfigError::SynthDef(synthdef_core::SynthDefError::InvalidEnvelope { .. }))
        ));
    }

    #[test]
    fn unknown_curve_name_is_an_error() {
        let mut env = EnvelopeConfig::new(EnvShape::Perc);
        env.curve = Some(CurveConfig::Name("wobbly".to_string()));
        assert!(matches!(
            env.to_env(),
            Err(ConfigError::SynthDef(synthdef_core::SynthDefError::UnknownCurve(_)))
        ));
    }

    #[test]
    fn params_convert_to_core() {
        let param = ParamConfig::new("cutoff", vec![800.0, 1200.0]).with_lag(0.1);
        let def = param.to_param_def();
        assert_eq!(def.name(), "cutoff");
        assert_eq!(def.rate(), ParamRate::Control);
        assert_eq!(def.defaults(), &[800.0, 1200.0]);
        assert_eq!(def.lag(), &[0.1]);
    }

    #[test]
    fn references_are_collected_through_arrays() {
        let arg = ArgConfig::from(vec![
            ArgConfig::from("a"),
            ArgConfig::from(vec![ArgConfig::from("b:1"), ArgConfig::from(2.0)]),
        ]);
        let mut seen = Vec::new();
        arg.for_each_reference(&mut |r| seen.push(r));
        assert_eq!(seen, vec!["a", "b:1"]);
    }
}
