//! Graph construction: node and wire model, the build context, multichannel
//! expansion, and the ordering pass.

pub mod builder;
pub mod expand;
pub mod node;
pub mod order;
pub mod wire;

pub use builder::{ActiveBuild, Builder, BuiltGraph, LocalBufToken, MAX_LOCAL_BUFS, current_build};
pub use expand::{expand_with, outputs_signal};
pub use node::{Node, NodeId, NodeSpec};
pub use order::{Schedule, schedule};
pub use wire::{BuildId, Input, Signal, Wire};
