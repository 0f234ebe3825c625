//! Declarative synth definitions for synthdef.
//!
//! A definition file is a TOML description of one synth definition: its
//! parameters, its nodes in creation order, and its variants. Files are
//! validated against the [`UGenRegistry`] and compiled through the same
//! build entry point as code-built definitions, so both produce identical
//! bytes.
//!
//! # Features
//!
//! - **Definition files**: load, save, and round-trip [`DefinitionFile`]s
//! - **Validation**: unknown names, duplicate ids, and dangling references
//! - **Compilation**: [`compile_definition`] builds a [`SynthDef`]
//! - **Factory definitions**: built-in examples of each compiler feature
//!
//! # Example
//!
//! ```rust
//! use synthdef_config::{DefinitionFile, NodeConfig, ParamConfig, compile_definition};
//!
//! let def = DefinitionFile::new("beep")
//!     .with_param(ParamConfig::new("freq", 880.0))
//!     .with_node(NodeConfig::ugen("SinOsc").with_id("osc").with_arg("freq", "freq").with_arg("mul", 0.1))
//!     .with_node(NodeConfig::ugen("Out").with_arg("channels", "osc"));
//!
//! let compiled = compile_definition(&def).unwrap();
//! assert_eq!(&compiled.encode().unwrap()[..4], b"SCgf");
//! ```
//!
//! [`SynthDef`]: synthdef_core::SynthDef

mod compile;
mod definition;
mod error;

/// Definition validation.
pub mod validation;

/// Factory definitions bundled with the library.
pub mod factory;

pub use compile::{compile_definition, compile_with};
pub use definition::{
    ArgConfig, CurveConfig, DefinitionFile, EnvShape, EnvelopeConfig, NodeConfig, ParamConfig, ParamKind, Values,
    VariantConfig,
};
pub use error::ConfigError;
pub use factory::{
    FACTORY_DEFINITION_NAMES, factory_definition_names, factory_definitions, get_factory_definition,
    is_factory_definition,
};
pub use validation::{Operator, validate_definition, validate_with};

/// Re-export of the registry definition files are checked against.
pub use synthdef_ugens::{UGenCategory, UGenDescriptor, UGenRegistry};
