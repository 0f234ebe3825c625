//! Envelope generators and ramps.

use synthdef_core::{Builder, Env, NodeSpec, Rate, Result, Signal};

use crate::args::{ArgSpec, Outputs, UGen, UGenArgs, check_rate};
use crate::error::UGenError;

/// Common `doneAction` codes.
pub mod done_action {
    /// Do nothing when finished.
    pub const NONE: f32 = 0.0;
    /// Pause the enclosing synth.
    pub const PAUSE_SELF: f32 = 1.0;
    /// Free the enclosing synth.
    pub const FREE_SELF: f32 = 2.0;
}

ugen! {
    /// Linear ramp from `start` to `end`.
    Line {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Starting value.
            start("start") = 0.0,
            /// Ending value.
            end("end") = 1.0,
            /// Duration in seconds.
            dur("dur") = 1.0,
            /// Action when the ramp ends.
            done_action("doneAction") = 0.0,
        }
    }
}

ugen! {
    /// Exponential ramp from `start` to `end`. Both must share a sign.
    XLine {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Starting value.
            start("start") = 1.0,
            /// Ending value.
            end("end") = 2.0,
            /// Duration in seconds.
            dur("dur") = 1.0,
            /// Action when the ramp ends.
            done_action("doneAction") = 0.0,
        }
    }
}

/// Plays an [`Env`] each time `gate` opens.
///
/// Inputs are the five control arguments followed by the flattened
/// envelope. Only the control arguments expand.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvGen {
    /// Breakpoints to play.
    pub envelope: Env,
    /// Opens (positive) and releases (zero) the envelope. Default `1`.
    pub gate: Signal,
    /// Multiplies every level. Default `1`.
    pub level_scale: Signal,
    /// Added to every level. Default `0`.
    pub level_bias: Signal,
    /// Multiplies every duration. Default `1`.
    pub time_scale: Signal,
    /// Action when the envelope ends. Default `0`.
    pub done_action: Signal,
}

impl EnvGen {
    /// Options for `envelope` with the other arguments at their defaults.
    pub fn new(envelope: Env) -> Self {
        Self {
            envelope,
            gate: 1.0.into(),
            level_scale: 1.0.into(),
            level_bias: 0.0.into(),
            time_scale: 1.0.into(),
            done_action: 0.0.into(),
        }
    }

    /// Sets `gate`.
    pub fn gate(mut self, value: impl Into<Signal>) -> Self {
        self.gate = value.into();
        self
    }

    /// Sets `levelScale`.
    pub fn level_scale(mut self, value: impl Into<Signal>) -> Self {
        self.level_scale = value.into();
        self
    }

    /// Sets `levelBias`.
    pub fn level_bias(mut self, value: impl Into<Signal>) -> Self {
        self.level_bias = value.into();
        self
    }

    /// Sets `timeScale`.
    pub fn time_scale(mut self, value: impl Into<Signal>) -> Self {
        self.time_scale = value.into();
        self
    }

    /// Sets `doneAction`.
    pub fn done_action(mut self, value: impl Into<Signal>) -> Self {
        self.done_action = value.into();
        self
    }

    /// Creates the node at audio rate.
    pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Audio)
    }

    /// Creates the node at control rate.
    pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Control)
    }
}

impl UGen for EnvGen {
    const NAME: &'static str = "EnvGen";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::envelope("envelope"),
        ArgSpec::input("gate", 1.0),
        ArgSpec::input("levelScale", 1.0),
        ArgSpec::input("levelBias", 0.0),
        ArgSpec::input("timeScale", 1.0),
        ArgSpec::input("doneAction", 0.0),
    ];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.required_env(Self::NAME, "envelope")?);
        if let Some(v) = args.signal(Self::NAME, "gate")? {
            ugen.gate = v;
        }
        if let Some(v) = args.signal(Self::NAME, "levelScale")? {
            ugen.level_scale = v;
        }
        if let Some(v) = args.signal(Self::NAME, "levelBias")? {
            ugen.level_bias = v;
        }
        if let Some(v) = args.signal(Self::NAME, "timeScale")? {
            ugen.time_scale = v;
        }
        if let Some(v) = args.signal(Self::NAME, "doneAction")? {
            ugen.done_action = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let mut args = vec![
            self.gate,
            self.level_scale,
            self.level_bias,
            self.time_scale,
            self.done_action,
        ];
        args.extend(self.envelope.to_signal().into_channels());
        builder.expand(&NodeSpec::new(Self::NAME, rate), &args, &[0, 1, 2, 3, 4])
    }
}

/// Reads an [`Env`] at an arbitrary position given by `index`, in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct IEnvGen {
    /// Breakpoints to read.
    pub envelope: Env,
    /// Read position. Default `0`.
    pub index: Signal,
}

impl IEnvGen {
    /// Options reading `envelope` at position 0.
    pub fn new(envelope: Env) -> Self {
        Self {
            envelope,
            index: 0.0.into(),
        }
    }

    /// Sets `index`.
    pub fn index(mut self, value: impl Into<Signal>) -> Self {
        self.index = value.into();
        self
    }

    /// Creates the node at audio rate.
    pub fn ar(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Audio)
    }

    /// Creates the node at control rate.
    pub fn kr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Control)
    }
}

impl UGen for IEnvGen {
    const NAME: &'static str = "IEnvGen";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[ArgSpec::envelope("envelope"), ArgSpec::input("index", 0.0)];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.required_env(Self::NAME, "envelope")?);
        if let Some(v) = args.signal(Self::NAME, "index")? {
            ugen.index = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let mut args = vec![self.index];
        args.extend(Signal::array(self.envelope.flatten_for_interpolation()).into_channels());
        builder.expand(&NodeSpec::new(Self::NAME, rate), &args, &[0])
    }
}
