//! Errors raised when creating unit generators by name.

use thiserror::Error;

use synthdef_core::SynthDefError;

/// Errors from [`UGenRegistry::create`](crate::UGenRegistry::create) and
/// [`UGen::from_args`](crate::UGen::from_args).
#[derive(Debug, Error)]
pub enum UGenError {
    /// No unit generator is registered under this name.
    #[error("unknown unit generator '{0}'")]
    UnknownUGen(String),

    /// An argument name the unit generator does not take.
    #[error("{ugen} has no argument '{arg}'")]
    UnknownArgument {
        /// Unit generator name.
        ugen: &'static str,
        /// Offending argument name.
        arg: String,
    },

    /// An argument was given a value of the wrong kind.
    #[error("argument '{arg}' of {ugen}: {reason}")]
    InvalidArgument {
        /// Unit generator name.
        ugen: &'static str,
        /// Argument name.
        arg: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Graph construction failed.
    #[error(transparent)]
    SynthDef(#[from] SynthDefError),
}
