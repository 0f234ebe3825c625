//! Argument metadata, named argument maps, and the [`UGen`] trait.

use core::fmt;

use synthdef_core::{Builder, Env, Input, Rate, Signal, SynthDefError};

use crate::error::UGenError;

/// How an argument is turned into node inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// One signal input. Arrays expand the node.
    Input,
    /// Any number of signal inputs, one per channel.
    Channels,
    /// An envelope, flattened into trailing literal inputs.
    Envelope,
    /// A literal count fixed when the node is built, such as a channel count.
    Count,
    /// A label written as its length followed by its character codes.
    Text,
}

impl ArgKind {
    /// Whether array values in this argument expand the node.
    pub const fn expands(self) -> bool {
        matches!(self, ArgKind::Input | ArgKind::Channels)
    }
}

/// One named argument of a unit generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArgSpec {
    /// Argument name as written in definition files.
    pub name: &'static str,
    /// How the value becomes inputs.
    pub kind: ArgKind,
    /// Value used when the argument is omitted. `None` means required.
    pub default: Option<f32>,
}

impl ArgSpec {
    /// A signal input with a default.
    pub const fn input(name: &'static str, default: f32) -> Self {
        Self {
            name,
            kind: ArgKind::Input,
            default: Some(default),
        }
    }

    /// A required signal input.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Input,
            default: None,
        }
    }

    /// A required channel list.
    pub const fn channels(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Channels,
            default: None,
        }
    }

    /// A required envelope.
    pub const fn envelope(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Envelope,
            default: None,
        }
    }

    /// A literal count with a default.
    pub const fn count(name: &'static str, default: f32) -> Self {
        Self {
            name,
            kind: ArgKind::Count,
            default: Some(default),
        }
    }

    /// An optional text label.
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Text,
            default: None,
        }
    }
}

/// Number of outputs a unit generator produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outputs {
    /// A fixed count. Zero for sinks.
    Fixed(u32),
    /// Given by the `numChannels` argument.
    Channels,
    /// One per value of the channel-list argument.
    PerChannel,
}

impl fmt::Display for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outputs::Fixed(0) => f.write_str("none"),
            Outputs::Fixed(n) => write!(f, "{n}"),
            Outputs::Channels => f.write_str("numChannels"),
            Outputs::PerChannel => f.write_str("one per channel"),
        }
    }
}

/// A value bound to a named argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// A signal: literal, wire, or array.
    Signal(Signal),
    /// An envelope.
    Env(Env),
    /// A text label.
    Text(String),
}

impl From<Signal> for ArgValue {
    fn from(signal: Signal) -> Self {
        ArgValue::Signal(signal)
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        ArgValue::Signal(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Signal(value.into())
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Signal(value.into())
    }
}

impl From<Env> for ArgValue {
    fn from(env: Env) -> Self {
        ArgValue::Env(env)
    }
}

impl From<&str> for ArgValue {
    fn from(text: &str) -> Self {
        ArgValue::Text(text.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(text: String) -> Self {
        ArgValue::Text(text)
    }
}

/// Named arguments for creating a unit generator by name.
///
/// Omitted arguments take their defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UGenArgs {
    entries: Vec<(String, ArgValue)>,
}

impl UGenArgs {
    /// An empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` and returns the map.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Binds `name`, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Bound names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of bound arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejects names that are not in `specs`.
    pub fn check(&self, ugen: &'static str, specs: &[ArgSpec]) -> Result<(), UGenError> {
        match self.names().find(|n| !specs.iter().any(|s| s.name == *n)) {
            Some(unknown) => Err(UGenError::UnknownArgument {
                ugen,
                arg: unknown.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The signal bound to `arg`, if any.
    pub fn signal(&self, ugen: &'static str, arg: &'static str) -> Result<Option<Signal>, UGenError> {
        match self.get(arg) {
            None => Ok(None),
            Some(ArgValue::Signal(s)) => Ok(Some(s.clone())),
            Some(_) => Err(invalid(ugen, arg, "expected a signal")),
        }
    }

    /// The signal bound to `arg`, or an error when it is missing.
    pub fn required_signal(&self, ugen: &'static str, arg: &'static str) -> Result<Signal, UGenError> {
        self.signal(ugen, arg)?
            .ok_or_else(|| invalid(ugen, arg, "required argument is missing"))
    }

    /// The envelope bound to `arg`, or an error when it is missing.
    pub fn required_env(&self, ugen: &'static str, arg: &'static str) -> Result<Env, UGenError> {
        match self.get(arg) {
            Some(ArgValue::Env(env)) => Ok(env.clone()),
            Some(_) => Err(invalid(ugen, arg, "expected an envelope")),
            None => Err(invalid(ugen, arg, "required argument is missing")),
        }
    }

    /// The text bound to `arg`, if any.
    pub fn text(&self, ugen: &'static str, arg: &'static str) -> Result<Option<String>, UGenError> {
        match self.get(arg) {
            None => Ok(None),
            Some(ArgValue::Text(t)) => Ok(Some(t.clone())),
            Some(_) => Err(invalid(ugen, arg, "expected text")),
        }
    }

    /// The literal count bound to `arg`, if any. Counts are positive integers.
    pub fn count(&self, ugen: &'static str, arg: &'static str) -> Result<Option<u32>, UGenError> {
        let Some(signal) = self.signal(ugen, arg)? else {
            return Ok(None);
        };
        match signal.as_input().and_then(|i| i.as_constant()) {
            Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f32 => Ok(Some(n as u32)),
            _ => Err(invalid(ugen, arg, "expected a positive whole number")),
        }
    }
}

fn invalid(ugen: &'static str, arg: &'static str, reason: &str) -> UGenError {
    UGenError::InvalidArgument {
        ugen,
        arg,
        reason: reason.to_string(),
    }
}

/// A unit generator type: its static description plus how to build it.
pub trait UGen: Sized {
    /// Type tag written to the definition.
    const NAME: &'static str;
    /// Rates the node runs at. The first is the default.
    const RATES: &'static [Rate];
    /// Named arguments with their defaults.
    const ARGS: &'static [ArgSpec];
    /// Output count.
    const OUTPUTS: Outputs;

    /// Reads options from named arguments, defaulting omitted ones.
    fn from_args(args: &UGenArgs) -> Result<Self, UGenError>;

    /// Adds the node (or its expanded instances) to the build.
    fn build(self, builder: &mut Builder, rate: Rate) -> synthdef_core::Result<Signal>;
}

/// Fails unless `U` runs at `rate`.
pub fn check_rate<U: UGen>(rate: Rate) -> synthdef_core::Result<()> {
    if U::RATES.contains(&rate) {
        Ok(())
    } else {
        Err(SynthDefError::UnsupportedRate {
            type_tag: U::NAME.to_string(),
            rate: rate.name(),
        })
    }
}

/// Every slot index of an argument list.
pub(crate) fn all_slots(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// Literal inputs for a label: its length, then one code per byte.
pub(crate) fn label_inputs(label: &str) -> Vec<Input> {
    std::iter::once(Input::Constant(label.len() as f32))
        .chain(label.bytes().map(|c| Input::Constant(f32::from(c))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_earlier_value() {
        let mut args = UGenArgs::new().with("freq", 440.0);
        args.set("freq", 220.0);
        assert_eq!(args.len(), 1);
        assert_eq!(args.get("freq"), Some(&ArgValue::Signal(220.0.into())));
    }

    #[test]
    fn check_rejects_unknown_names() {
        let specs = [ArgSpec::input("freq", 440.0)];
        let args = UGenArgs::new().with("frq", 1.0);
        assert!(matches!(
            args.check("SinOsc", &specs),
            Err(UGenError::UnknownArgument { ugen: "SinOsc", ref arg }) if arg == "frq"
        ));
    }

    #[test]
    fn count_requires_positive_whole_number() {
        let args = UGenArgs::new()
            .with("a", 2.0)
            .with("b", 1.5)
            .with("c", 0.0);
        assert_eq!(args.count("In", "a").unwrap(), Some(2));
        assert!(args.count("In", "b").is_err());
        assert!(args.count("In", "c").is_err());
        assert_eq!(args.count("In", "missing").unwrap(), None);
    }

    #[test]
    fn wrong_kind_is_reported() {
        let args = UGenArgs::new().with("label", "x");
        assert!(args.signal("Poll", "label").is_err());
        assert_eq!(args.text("Poll", "label").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn label_is_length_then_codes() {
        assert_eq!(
            label_inputs("ab"),
            vec![Input::Constant(2.0), Input::Constant(97.0), Input::Constant(98.0)]
        );
    }

    #[test]
    fn outputs_display() {
        assert_eq!(Outputs::Fixed(0).to_string(), "none");
        assert_eq!(Outputs::Fixed(2).to_string(), "2");
        assert_eq!(Outputs::Channels.to_string(), "numChannels");
    }
}
