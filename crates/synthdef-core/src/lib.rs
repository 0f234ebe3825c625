//! Synthdef Core - synth definition graph builder and binary compiler
//!
//! This crate builds a unit-generator signal graph while user code runs and
//! compiles it into the `SCgf` binary format consumed by a real-time audio
//! engine.
//!
//! # Pipeline
//!
//! 1. [`SynthDefBuilder`] declares the name, parameters, and variants.
//! 2. [`SynthDefBuilder::build`] installs a fresh [`Builder`] on the current
//!    thread and creates one control node per run of parameters.
//! 3. The body adds nodes through [`Builder::create`] (one node) or
//!    [`Builder::expand`] (multichannel expansion), and combines signals with
//!    the operator methods ([`Builder::mul`], [`Builder::mul_add`], ...),
//!    which fold constants and drop identities.
//! 4. The finalizer ([`schedule`]) orders nodes by data wires, width-first
//!    dependencies, and explicit [`Builder::order_after`] constraints, with
//!    creation order as the tie-break.
//! 5. [`SynthDef::encode`] writes the ordered graph, constant pool,
//!    parameter table, and variants.
//!
//! # Core Abstractions
//!
//! - [`Wire`] / [`Input`] / [`Signal`] - edges, node inputs, multichannel values
//! - [`Builder`] / [`ActiveBuild`] - the build context and its per-thread slot
//! - [`UnaryOp`] / [`BinaryOp`] - operator opcodes and literal folding
//! - [`Env`] / [`Curve`] - envelope flattening
//! - [`ParamDef`] / [`Params`] - parameter declarations and proxies
//! - [`SynthDef`] - the compiled artifact; [`decode`] reads it back
//!
//! # Example
//!
//! ```rust
//! use synthdef_core::{NodeSpec, ParamDef, Rate, SynthDefBuilder};
//!
//! let def = SynthDefBuilder::new("sine")
//!     .param(ParamDef::control("amp", 0.1))
//!     .build(|b, params| {
//!         let sine = b.expand(&NodeSpec::new("SinOsc", Rate::Audio), &[440.0.into(), 0.0.into()], &[0, 1])?;
//!         let out = b.mul(&sine, params.get("amp")?)?;
//!         b.expand(&NodeSpec::new("Out", Rate::Audio).outputs(0), &[0.into(), out], &[0, 1])?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(def.ugens.len(), 4);
//! assert_eq!(&def.encode().unwrap()[..4], b"SCgf");
//! ```
//!
//! # Features
//!
//! - `tracing`: debug-level logging of node creation, folding, ordering, and
//!   encoding through the `tracing` crate.

pub mod decode;
pub mod encode;
pub mod env;
pub mod error;
pub mod graph;
pub mod ops;
pub mod params;
pub mod rate;
pub mod synthdef;

pub use decode::decode;
pub use encode::{FORMAT_VERSION, MAGIC, encode_file, write_file};
pub use env::{Adsr, Asr, Curve, Env, Linen, NO_NODE, Perc, parse_curves};
pub use error::{Result, SynthDefError};
pub use graph::{
    ActiveBuild, BuildId, Builder, BuiltGraph, Input, LocalBufToken, MAX_LOCAL_BUFS, Node, NodeId,
    NodeSpec, Schedule, Signal, Wire, current_build, expand_with, outputs_signal, schedule,
};
pub use ops::{BINARY_OP_UGEN, BinaryOp, MUL_ADD, UNARY_OP_UGEN, UnaryOp, can_be_mul_add};
pub use params::{ParamDef, ParamName, ParamRate, ParamTable, Params, create_controls};
pub use rate::Rate;
pub use synthdef::{
    InputSpec, SynthDef, SynthDefBuilder, UGenSpec, Variant, VariantDef, begin_definition,
    compile_graph,
};
