//! Stereo placement.

ugen! {
    /// Equal-power two-channel panner.
    Pan2 {
        outputs: 2,
        rates: [ar, kr],
        args: {
            /// Mono source.
            input("in") = 0.0,
            /// Position, -1 (left) to 1 (right).
            pos("pos") = 0.0,
            /// Output gain.
            level("level") = 1.0,
        }
    }
}

ugen! {
    /// Stereo balance of a left/right pair.
    Balance2 {
        outputs: 2,
        rates: [ar, kr],
        args: {
            /// Left source.
            left("left") = 0.0,
            /// Right source.
            right("right") = 0.0,
            /// Balance, -1 (left) to 1 (right).
            pos("pos") = 0.0,
            /// Output gain.
            level("level") = 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthdef_core::{ActiveBuild, Builder, Signal};

    #[test]
    fn pan_yields_two_channels() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let stereo = Pan2::new().input(0.5).ar(&mut b).unwrap();
        assert_eq!(stereo.width(), 2);
        assert_eq!(b.nodes()[0].output_count(), 2);
    }

    #[test]
    fn panning_a_bank_nests_per_instance() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let bank = Pan2::new().pos([-1.0, 1.0]).ar(&mut b).unwrap();
        let Signal::Many(instances) = bank else {
            panic!("expected an array");
        };
        assert_eq!(instances.len(), 2);
        assert!(instances.iter().all(|i| i.width() == 2));
    }
}
