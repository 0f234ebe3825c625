//! Calculation rates.

use core::fmt;

/// Update frequency class of a node output.
///
/// The discriminants are the rate codes written to the binary format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Rate {
    /// Computed once when the synth starts.
    #[default]
    Scalar = 0,
    /// Computed once per control block.
    Control = 1,
    /// Computed every sample.
    Audio = 2,
    /// Computed when pulled by a demand-driven consumer.
    Demand = 3,
}

impl Rate {
    /// Returns the wire-format rate code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire-format rate code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Rate::Scalar),
            1 => Some(Rate::Control),
            2 => Some(Rate::Audio),
            3 => Some(Rate::Demand),
            _ => None,
        }
    }

    /// Returns the lowercase rate name.
    pub const fn name(self) -> &'static str {
        match self {
            Rate::Scalar => "scalar",
            Rate::Control => "control",
            Rate::Audio => "audio",
            Rate::Demand => "demand",
        }
    }

    /// Parses a rate name (`ir`/`kr`/`ar`/`dr` abbreviations accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "scalar" | "ir" | "i" => Some(Rate::Scalar),
            "control" | "kr" | "k" => Some(Rate::Control),
            "audio" | "ar" | "a" => Some(Rate::Audio),
            "demand" | "dr" | "d" => Some(Rate::Demand),
            _ => None,
        }
    }

    /// Rate of an operator node combining operands of the given rates.
    ///
    /// Demand dominates when present; otherwise the fastest of
    /// Scalar < Control < Audio wins.
    pub fn combine(rates: impl IntoIterator<Item = Rate>) -> Rate {
        let mut result = Rate::Scalar;
        for rate in rates {
            if rate == Rate::Demand {
                return Rate::Demand;
            }
            result = result.max(rate);
        }
        result
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
