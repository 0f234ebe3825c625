//! Triggers and reporting.

use synthdef_core::{Builder, Input, Node, NodeSpec, Rate, Result, Signal, expand_with};

use crate::args::{ArgSpec, Outputs, UGen, UGenArgs, check_rate, label_inputs};
use crate::error::UGenError;
use crate::osc::Impulse;

ugen! {
    /// Holds 1 for `dur` seconds after each trigger.
    Trig {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Trigger input.
            input("in") = 0.0,
            /// Hold time in seconds.
            dur("dur") = 0.1,
        }
    }
}

ugen! {
    /// Samples `in` on each trigger and holds it.
    Latch {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to sample.
            input("in") = 0.0,
            /// Trigger input.
            trig("trig") = 0.0,
        }
    }
}

ugen! {
    /// Sends a trigger message to clients on each trigger.
    SendTrig {
        outputs: 0,
        rates: [ar, kr],
        args: {
            /// Trigger input.
            input("in") = 0.0,
            /// Identifier sent with the message.
            id("id") = 0.0,
            /// Value sent with the message.
            value("value") = 0.0,
        }
    }
}

/// Prints `input` to the engine's console on each trigger.
///
/// A literal `trig` is a polling frequency and is replaced by an
/// [`Impulse`] at that frequency. The label is written as its length
/// followed by one input per character code.
#[derive(Clone, Debug, PartialEq)]
pub struct Poll {
    /// Trigger input, or a polling frequency. Default `10`.
    pub trig: Signal,
    /// Signal to print.
    pub input: Signal,
    /// Printed before the value. Defaults to `UGen(<type of input>)`.
    pub label: Option<String>,
    /// Also sends a trigger message with this id when not negative. Default `-1`.
    pub trig_id: Signal,
}

impl Poll {
    /// Polls `input` ten times a second.
    pub fn new(input: impl Into<Signal>) -> Self {
        Self {
            trig: 10.0.into(),
            input: input.into(),
            label: None,
            trig_id: (-1.0).into(),
        }
    }

    /// Sets `trig`.
    pub fn trig(mut self, value: impl Into<Signal>) -> Self {
        self.trig = value.into();
        self
    }

    /// Sets `label`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets `trigid`.
    pub fn trig_id(mut self, value: impl Into<Signal>) -> Self {
        self.trig_id = value.into();
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

fn default_label(builder: &Builder, input: &Signal) -> String {
    let class = match input.as_input() {
        Some(Input::Wire(wire)) => builder.node(wire.node()).map_or("UGen", Node::type_tag),
        Some(Input::Constant(_)) => "Float",
        None => "Array",
    };
    format!("UGen({class})")
}

impl UGen for Poll {
    const NAME: &'static str = "Poll";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::input("trig", 10.0),
        ArgSpec::required("in"),
        ArgSpec::text("label"),
        ArgSpec::input("trigid", -1.0),
    ];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.required_signal(Self::NAME, "in")?);
        if let Some(v) = args.signal(Self::NAME, "trig")? {
            ugen.trig = v;
        }
        ugen.label = args.text(Self::NAME, "label")?;
        if let Some(v) = args.signal(Self::NAME, "trigid")? {
            ugen.trig_id = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let label = self
            .label
            .unwrap_or_else(|| default_label(builder, &self.input));
        let label = label_inputs(&label);
        let trig = match self.trig.as_input() {
            Some(Input::Constant(freq)) => Impulse::new().freq(freq).build(builder, rate)?,
            _ => self.trig,
        };

        let spec = NodeSpec::new(Self::NAME, rate);
        expand_with(
            Self::NAME,
            &[trig, self.input, self.trig_id],
            &[0, 1, 2],
            |mut inputs| {
                inputs.extend_from_slice(&label);
                builder.create(&spec, inputs)
            },
        )
    }
}
