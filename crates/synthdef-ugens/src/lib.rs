//! Synthdef UGens - typed unit-generator wrappers and registry
//!
//! One options struct per unit-generator type. Each struct documents its
//! defaults, has a chained setter per argument, and has one constructor method
//! per supported rate (`ar`, `kr`, `ir`, `dr`). The struct adds its nodes to a
//! [`Builder`](synthdef_core::Builder) through the core's single-node and
//! multichannel-expanding primitives.
//!
//! # Example
//!
//! ```rust
//! use synthdef_core::{ParamDef, SynthDefBuilder};
//! use synthdef_ugens::{Out, Pan2, SinOsc};
//!
//! let def = SynthDefBuilder::new("pan")
//!     .param(ParamDef::control("pos", 0.0))
//!     .build(|b, p| {
//!         let sine = SinOsc::new().ar(b)?;
//!         let stereo = Pan2::new().input(sine).pos(p.get("pos")?).ar(b)?;
//!         Out::new(0, stereo).ar(b)?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(def.ugens.len(), 4);
//! ```
//!
//! # Registry
//!
//! [`UGenRegistry`] lists every built-in type with its rates, arguments,
//! and output shape. It creates nodes by name from [`UGenArgs`]:
//!
//! ```rust
//! use synthdef_core::{ActiveBuild, Builder, Rate};
//! use synthdef_ugens::{UGenArgs, UGenRegistry};
//!
//! let registry = UGenRegistry::new();
//! let mut b = Builder::new();
//! let _active = ActiveBuild::install(&b).unwrap();
//! let args = UGenArgs::new().with("freq", 220.0);
//! let sine = registry.create(&mut b, "SinOsc", Rate::Audio, &args).unwrap();
//! assert_eq!(sine.width(), 1);
//! ```

#[macro_use]
mod macros;

pub mod args;
pub mod buffer;
pub mod demand;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod info;
pub mod io;
pub mod noise;
pub mod osc;
pub mod pan;
pub mod registry;
pub mod trigger;

pub use args::{ArgKind, ArgSpec, ArgValue, Outputs, UGen, UGenArgs, check_rate};
pub use buffer::{BufFrames, LocalBuf, PlayBuf, RecordBuf};
pub use demand::{Demand, Dseq, Dseries, Dwhite};
pub use envelope::{EnvGen, IEnvGen, Line, XLine, done_action};
pub use error::UGenError;
pub use filter::{BPF, Decay, HPF, LPF, Lag, RHPF, RLPF};
pub use info::{ControlRate, SampleRate};
pub use io::{In, LocalIn, LocalOut, Out, ReplaceOut};
pub use noise::{Dust, LFNoise0, LFNoise1, PinkNoise, WhiteNoise};
pub use osc::{Blip, Impulse, LFPulse, LFSaw, LFTri, Pulse, Saw, SinOsc};
pub use pan::{Balance2, Pan2};
pub use registry::{UGenCategory, UGenDescriptor, UGenRegistry};
pub use trigger::{Latch, Poll, SendTrig, Trig};
