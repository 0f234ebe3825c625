//! Error types for definition files.

use std::path::PathBuf;

use synthdef_core::SynthDefError;
use synthdef_ugens::UGenError;
use thiserror::Error;

/// Errors that can occur while loading, validating, or compiling a
/// definition file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A node names a unit generator the registry does not know.
    #[error("unknown ugen: {0}")]
    UnknownUGen(String),

    /// A node names an operator that does not exist.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// An argument refers to a name that is neither a parameter nor an
    /// earlier node.
    #[error("node '{node}' refers to unknown '{reference}'")]
    UnknownReference {
        /// Label of the referring node.
        node: String,
        /// The reference as written.
        reference: String,
    },

    /// Two nodes share an id, or a node id shadows a parameter.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// A node is malformed as a whole.
    #[error("invalid node '{node}': {reason}")]
    InvalidNode {
        /// Label of the node.
        node: String,
        /// What is wrong with it.
        reason: String,
    },

    /// One argument of a node is malformed.
    #[error("invalid argument '{arg}' for node '{node}': {reason}")]
    InvalidArgument {
        /// Label of the node.
        node: String,
        /// Argument name.
        arg: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Error from graph building or encoding.
    #[error(transparent)]
    SynthDef(#[from] SynthDefError),

    /// Error from creating a unit generator.
    #[error(transparent)]
    UGen(#[from] UGenError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_node(node: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidNode {
            node: node.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_arg(node: &str, arg: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            node: node.to_string(),
            arg: arg.to_string(),
            reason: reason.into(),
        }
    }
}
