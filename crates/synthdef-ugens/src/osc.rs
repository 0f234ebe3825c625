//! Periodic oscillators.

ugen! {
    /// Sine oscillator.
    SinOsc {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Phase offset in radians.
            phase("phase") = 0.0,
        }
    }
}

ugen! {
    /// Band-limited sawtooth.
    Saw {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
        }
    }
}

ugen! {
    /// Band-limited pulse wave.
    Pulse {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Duty cycle, 0 to 1.
            width("width") = 0.5,
        }
    }
}

ugen! {
    /// Band-limited impulse train with a fixed number of harmonics.
    Blip {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Number of harmonics.
            numharm("numharm") = 200.0,
        }
    }
}

ugen! {
    /// Non-band-limited sawtooth, useful as a modulator.
    LFSaw {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Initial phase, 0 to 2.
            iphase("iphase") = 0.0,
        }
    }
}

ugen! {
    /// Non-band-limited pulse wave.
    LFPulse {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Initial phase, 0 to 1.
            iphase("iphase") = 0.0,
            /// Duty cycle, 0 to 1.
            width("width") = 0.5,
        }
    }
}

ugen! {
    /// Non-band-limited triangle wave.
    LFTri {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Initial phase, 0 to 4.
            iphase("iphase") = 0.0,
        }
    }
}

ugen! {
    /// Single-sample impulses at a fixed frequency.
    Impulse {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Frequency in Hz.
            freq("freq") = 440.0,
            /// Phase offset, 0 to 1.
            phase("phase") = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UGen, UGenArgs};
    use synthdef_core::{ActiveBuild, Builder, Input, Rate, Signal, SynthDefError};

    #[test]
    fn defaults_match_argument_table() {
        let sine = SinOsc::default();
        assert_eq!(sine.freq, Signal::from(440.0));
        assert_eq!(sine.phase, Signal::from(0.0));
        assert_eq!(SinOsc::ARGS.len(), 2);
        assert_eq!(SinOsc::ARGS[0].default, Some(440.0));
        assert_eq!(SinOsc::RATES, &[Rate::Audio, Rate::Control]);
    }

    #[test]
    fn setters_and_rate_methods() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        LFPulse::new().freq(2.0).width(0.25).kr(&mut b).unwrap();
        let node = &b.nodes()[0];
        assert_eq!(node.type_tag(), "LFPulse");
        assert_eq!(node.rate(), Rate::Control);
        assert_eq!(
            node.inputs(),
            &[Input::Constant(2.0), Input::Constant(0.0), Input::Constant(0.25)]
        );
    }

    #[test]
    fn array_argument_expands() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let sig = Saw::new().freq([100.0, 150.0, 200.0]).ar(&mut b).unwrap();
        assert_eq!(sig.width(), 3);
        assert_eq!(b.node_count(), 3);
    }

    #[test]
    fn unsupported_rate_is_rejected() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let result = SinOsc::new().build(&mut b, Rate::Demand);
        assert!(matches!(
            result,
            Err(SynthDefError::UnsupportedRate { rate: "demand", .. })
        ));
    }

    #[test]
    fn from_args_fills_defaults() {
        let sine = SinOsc::from_args(&UGenArgs::new().with("phase", 1.0)).unwrap();
        assert_eq!(sine.freq, Signal::from(440.0));
        assert_eq!(sine.phase, Signal::from(1.0));
    }
}
