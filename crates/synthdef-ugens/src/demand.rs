//! Demand-rate sequencing.
//!
//! Demand-rate sources produce a value only when a [`Demand`] node pulls
//! one, on each of its triggers.

use synthdef_core::{Builder, NodeSpec, Rate, Result, Signal, SynthDefError};

use crate::args::{ArgSpec, Outputs, UGen, UGenArgs, all_slots, check_rate};
use crate::error::UGenError;

/// Plays `list` in order, `repeats` times.
#[derive(Clone, Debug, PartialEq)]
pub struct Dseq {
    /// Values or demand sources to step through.
    pub list: Signal,
    /// Number of passes. `f32::INFINITY` loops forever. Default `1`.
    pub repeats: Signal,
}

impl Dseq {
    /// One pass over `list`.
    pub fn new(list: impl Into<Signal>) -> Self {
        Self {
            list: list.into(),
            repeats: 1.0.into(),
        }
    }

    /// Sets `repeats`.
    pub fn repeats(mut self, value: impl Into<Signal>) -> Self {
        self.repeats = value.into();
        self
    }

    /// Creates the node.
    pub fn dr(self, builder: &mut Builder) -> Result<Signal> {
        self.build(builder, Rate::Demand)
    }
}

impl UGen for Dseq {
    const NAME: &'static str = "Dseq";
    const RATES: &'static [Rate] = &[Rate::Demand];
    const ARGS: &'static [ArgSpec] = &[ArgSpec::channels("list"), ArgSpec::input("repeats", 1.0)];
    const OUTPUTS: Outputs = Outputs::Fixed(1);

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(args.required_signal(Self::NAME, "list")?);
        if let Some(v) = args.signal(Self::NAME, "repeats")? {
            ugen.repeats = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        if self.list.is_empty() {
            return Err(SynthDefError::EmptyExpansionArgument {
                type_tag: Self::NAME.to_string(),
                slot: 1,
            });
        }
        let mut args = vec![self.repeats];
        args.extend(self.list.into_channels());
        builder.expand(&NodeSpec::new(Self::NAME, rate), &args, &all_slots(args.len()))
    }
}

ugen! {
    /// Uniformly distributed random values.
    Dwhite {
        outputs: 1,
        rates: [dr],
        args: {
            /// Number of values before the source ends.
            length("length") = f32::INFINITY,
            /// Lower bound.
            lo("lo") = 0.0,
            /// Upper bound.
            hi("hi") = 1.0,
        }
    }
}

ugen! {
    /// Arithmetic series.
    Dseries {
        outputs: 1,
        rates: [dr],
        args: {
            /// Number of values before the source ends.
            length("length") = f32::INFINITY,
            /// First value.
            start("start") = 1.0,
            /// Increment.
            step("step") = 1.0,
        }
    }
}

/// Pulls one value from each demand source on every trigger.
///
/// Has one output per source. Only `trig` and `reset` expand.
#[derive(Clone, Debug, PartialEq)]
pub struct Demand {
    /// Pulls the next values on a positive edge.
    pub trig: Signal,
    /// Resets every source on a positive edge. Default `0`.
    pub reset: Signal,
    /// Demand-rate sources, one output each.
    pub sources: Signal,
}

impl Demand {
    /// Pulls from `sources` on each `trig`.
    pub fn new(trig: impl Into<Signal>, sources: impl Into<Signal>) -> Self {
        Self {
            trig: trig.into(),
            reset: 0.0.into(),
            sources: sources.into(),
        }
    }

    /// Sets `reset`.
    pub fn reset(mut self, value: impl Into<Signal>) -> Self {
        self.reset = value.into();
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

impl UGen for Demand {
    const NAME: &'static str = "Demand";
    const RATES: &'static [Rate] = &[Rate::Audio, Rate::Control];
    const ARGS: &'static [ArgSpec] = &[
        ArgSpec::required("trig"),
        ArgSpec::input("reset", 0.0),
        ArgSpec::channels("demandUGens"),
    ];
    const OUTPUTS: Outputs = Outputs::PerChannel;

    fn from_args(args: &UGenArgs) -> std::result::Result<Self, UGenError> {
        args.check(Self::NAME, Self::ARGS)?;
        let mut ugen = Self::new(
            args.required_signal(Self::NAME, "trig")?,
            args.required_signal(Self::NAME, "demandUGens")?,
        );
        if let Some(v) = args.signal(Self::NAME, "reset")? {
            ugen.reset = v;
        }
        Ok(ugen)
    }

    fn build(self, builder: &mut Builder, rate: Rate) -> Result<Signal> {
        check_rate::<Self>(rate)?;
        let sources = self.sources.into_channels();
        if sources.is_empty() {
            return Err(SynthDefError::EmptyExpansionArgument {
                type_tag: Self::NAME.to_string(),
                slot: 2,
            });
        }
        let outputs = u32::try_from(sources.len())
            .map_err(|_| SynthDefError::overflow("Demand source count", sources.len(), i64::from(u32::MAX)))?;
        let spec = NodeSpec::new(Self::NAME, rate).outputs(outputs);
        let mut args = vec![self.trig, self.reset];
        args.extend(sources);
        builder.expand(&spec, &args, &[0, 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Impulse;
    use synthdef_core::{ActiveBuild, Input};

    #[test]
    fn dseq_puts_repeats_first() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        Dseq::new([60, 62, 64])
            .repeats(f32::INFINITY)
            .dr(&mut b)
            .unwrap();
        let node = &b.nodes()[0];
        assert_eq!(node.rate(), Rate::Demand);
        assert_eq!(node.inputs()[0], Input::Constant(f32::INFINITY));
        assert_eq!(node.inputs().len(), 4);
    }

    #[test]
    fn demand_has_one_output_per_source() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let trig = Impulse::new().freq(2).kr(&mut b).unwrap();
        let a = Dseq::new([1, 2]).dr(&mut b).unwrap();
        let w = Dwhite::new().dr(&mut b).unwrap();
        let out = Demand::new(&trig, Signal::array([a, w])).kr(&mut b).unwrap();
        assert_eq!(out.width(), 2);
        let node = b.nodes().last().unwrap();
        assert_eq!(node.output_count(), 2);
        assert_eq!(node.inputs().len(), 4);
    }

    #[test]
    fn dwhite_inputs_start_with_length() {
        let names: Vec<_> = Dwhite::ARGS.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["length", "lo", "hi"]);
    }

    #[test]
    fn demand_sources_do_not_expand() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let nested = Signal::array([Signal::array([1.0, 2.0])]);
        assert!(matches!(
            Demand::new(1.0, nested).kr(&mut b),
            Err(SynthDefError::NonExpandableArgument { slot: 2, .. })
        ));
    }
}
