//! Filters and smoothing.

ugen! {
    /// Second-order Butterworth lowpass.
    LPF {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to filter.
            input("in") = 0.0,
            /// Cutoff in Hz.
            freq("freq") = 440.0,
        }
    }
}

ugen! {
    /// Second-order Butterworth highpass.
    HPF {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to filter.
            input("in") = 0.0,
            /// Cutoff in Hz.
            freq("freq") = 440.0,
        }
    }
}

ugen! {
    /// Second-order Butterworth bandpass.
    BPF {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to filter.
            input("in") = 0.0,
            /// Centre frequency in Hz.
            freq("freq") = 440.0,
            /// Reciprocal of Q.
            rq("rq") = 1.0,
        }
    }
}

ugen! {
    /// Resonant lowpass.
    RLPF {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to filter.
            input("in") = 0.0,
            /// Cutoff in Hz.
            freq("freq") = 440.0,
            /// Reciprocal of Q.
            rq("rq") = 1.0,
        }
    }
}

ugen! {
    /// Resonant highpass.
    RHPF {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to filter.
            input("in") = 0.0,
            /// Cutoff in Hz.
            freq("freq") = 440.0,
            /// Reciprocal of Q.
            rq("rq") = 1.0,
        }
    }
}

ugen! {
    /// Exponential lag, for smoothing control signals.
    Lag {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Signal to smooth.
            input("in") = 0.0,
            /// 60 dB lag time in seconds.
            lag_time("lagTime") = 0.1,
        }
    }
}

ugen! {
    /// Exponential decay of impulses.
    Decay {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Input impulses.
            input("in") = 0.0,
            /// 60 dB decay time in seconds.
            decay_time("decayTime") = 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UGen;
    use synthdef_core::{ActiveBuild, Builder, Input};

    #[test]
    fn filter_takes_input_first() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let noise = crate::WhiteNoise::new().ar(&mut b).unwrap();
        let lpf = LPF::new().input(&noise).freq(1200.0).ar(&mut b).unwrap();
        assert_eq!(b.node_count(), 2);
        let node = &b.nodes()[1];
        assert_eq!(node.inputs()[0], noise.as_input().unwrap());
        assert_eq!(node.inputs()[1], Input::Constant(1200.0));
        assert_eq!(lpf.width(), 1);
    }

    #[test]
    fn camel_case_argument_names() {
        let names: Vec<_> = Lag::ARGS.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["in", "lagTime"]);
    }
}
