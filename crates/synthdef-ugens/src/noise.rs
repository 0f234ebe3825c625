//! Noise sources.

ugen! {
    /// Uniform white noise.
    WhiteNoise {
        outputs: 1,
        rates: [ar, kr],
        args: {}
    }
}

ugen! {
    /// Pink noise, falling 3 dB per octave.
    PinkNoise {
        outputs: 1,
        rates: [ar, kr],
        args: {}
    }
}

ugen! {
    /// Random impulses from 0 to 1.
    Dust {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Average impulses per second.
            density("density") = 0.0,
        }
    }
}

ugen! {
    /// Step noise: a new random value at each period.
    LFNoise0 {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Rate of new values in Hz.
            freq("freq") = 500.0,
        }
    }
}

ugen! {
    /// Ramp noise: linear interpolation between random values.
    LFNoise1 {
        outputs: 1,
        rates: [ar, kr],
        args: {
            /// Rate of new values in Hz.
            freq("freq") = 500.0,
        }
    }
}
