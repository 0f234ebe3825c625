//! Server information.

ugen! {
    /// The engine's sample rate.
    SampleRate {
        outputs: 1,
        rates: [ir],
        args: {}
    }
}

ugen! {
    /// The engine's control rate.
    ControlRate {
        outputs: 1,
        rates: [ir],
        args: {}
    }
}
