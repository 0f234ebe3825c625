//! Error types for graph construction, compilation, and encoding.
//!
//! Every error is fatal to the build that raised it: no partially built
//! definition is ever returned.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors that can occur while building, compiling, encoding, or decoding
/// a synth definition.
#[derive(Debug, Error)]
pub enum SynthDefError {
    /// A node factory was invoked while no build context was installed.
    #[error("no synth definition build is active on this thread")]
    NoActiveBuild,

    /// A second build context was installed while one was already active.
    #[error("a synth definition build is already active on this thread")]
    ReentrantBuild,

    /// An array was passed in an argument slot that does not allow expansion.
    #[error("argument {slot} of {type_tag} does not accept an array")]
    NonExpandableArgument {
        /// Node type being created.
        type_tag: String,
        /// Zero-based argument position.
        slot: usize,
    },

    /// An array of arrays was passed in a single argument slot.
    #[error("argument {slot} of {type_tag} nests arrays; expansion is one level deep")]
    NestedExpansion {
        /// Node type being created.
        type_tag: String,
        /// Zero-based argument position.
        slot: usize,
    },

    /// An empty array was passed in an expandable slot.
    #[error("argument {slot} of {type_tag} is an empty array")]
    EmptyExpansionArgument {
        /// Node type being created.
        type_tag: String,
        /// Zero-based argument position.
        slot: usize,
    },

    /// An envelope curve name is not in the recognized table.
    #[error("unknown envelope curve '{0}'")]
    UnknownCurve(String),

    /// An envelope's level and time lists have inconsistent lengths.
    #[error("envelope needs one more level than times (got {levels} levels, {times} times)")]
    InvalidEnvelope {
        /// Number of levels supplied.
        levels: usize,
        /// Number of segment durations supplied.
        times: usize,
    },

    /// Explicit ordering constraints form a cycle.
    #[error("ordering constraints form a cycle through {} node(s)", .0.len())]
    OrderingCycle(Vec<NodeId>),

    /// A count, index, or string length does not fit its field in the wire format.
    #[error("{field} value {value} exceeds the format limit of {max}")]
    EncodingOverflow {
        /// Name of the field that overflowed.
        field: &'static str,
        /// Value that was attempted.
        value: i64,
        /// Largest value the field can hold.
        max: i64,
    },

    /// A wire created by one build was used as an input in another.
    #[error("wire from another build used as input to {type_tag}")]
    CrossBuildReference {
        /// Node type whose inputs contained the foreign wire.
        type_tag: String,
    },

    /// A parameter declaration is invalid.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the declaration was rejected.
        reason: String,
    },

    /// A parameter name was looked up that was never declared.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// A node type was asked to run at a rate it does not support.
    #[error("{type_tag} does not run at {rate} rate")]
    UnsupportedRate {
        /// Node type being created.
        type_tag: String,
        /// Requested rate name.
        rate: &'static str,
    },

    /// A binary synth definition could not be decoded.
    #[error("malformed synth definition at byte {offset}: {reason}")]
    Decode {
        /// Byte offset where decoding failed.
        offset: u64,
        /// What was wrong.
        reason: String,
    },

    /// I/O failure while reading or writing a binary definition.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthDefError {
    /// Create an overflow error for a named field.
    pub fn overflow(field: &'static str, value: usize, max: i64) -> Self {
        SynthDefError::EncodingOverflow {
            field,
            value: i64::try_from(value).unwrap_or(i64::MAX),
            max,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SynthDefError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SynthDefError>;
