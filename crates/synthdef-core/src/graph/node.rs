//! Graph node types.
//!
//! A [`Node`] is one unit-generator instance. Nodes are created only through
//! [`Builder::add_node`](super::Builder::add_node) (directly or via
//! multichannel expansion) and are never mutated afterwards; the finalizer
//! only records their position in the final order.

use core::fmt;

use crate::rate::Rate;

use super::wire::Input;

/// Identifier of a node within one build.
///
/// Node IDs are assigned sequentially in creation order and never reused
/// within a build. The raw value doubles as the node's creation index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier (the creation index).
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Static description of the node to create: everything except its inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec<'a> {
    /// Node type name, e.g. `"SinOsc"`.
    pub type_tag: &'a str,
    /// Calculation rate of the node and all of its outputs.
    pub rate: Rate,
    /// Number of output slots. Zero for sink nodes.
    pub output_count: u32,
    /// Type-specific selector, e.g. an operator opcode.
    pub special_index: i32,
    /// Every node created after this one is ordered after it.
    pub width_first: bool,
}

impl<'a> NodeSpec<'a> {
    /// Creates a single-output spec with special index 0.
    pub fn new(type_tag: &'a str, rate: Rate) -> Self {
        Self {
            type_tag,
            rate,
            output_count: 1,
            special_index: 0,
            width_first: false,
        }
    }

    /// Sets the number of outputs.
    pub fn outputs(mut self, output_count: u32) -> Self {
        self.output_count = output_count;
        self
    }

    /// Sets the special index.
    pub fn special_index(mut self, special_index: i32) -> Self {
        self.special_index = special_index;
        self
    }

    /// Marks the node as width-first.
    pub fn width_first(mut self) -> Self {
        self.width_first = true;
        self
    }
}

/// One unit-generator instance in the graph under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) type_tag: String,
    pub(crate) rate: Rate,
    pub(crate) special_index: i32,
    pub(crate) inputs: Vec<Input>,
    pub(crate) output_count: u32,
    /// Nodes that must precede this one without a data wire.
    pub(crate) ordering_deps: Vec<NodeId>,
}

impl Node {
    /// Node identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node type name.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Calculation rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Type-specific selector.
    pub fn special_index(&self) -> i32 {
        self.special_index
    }

    /// Inputs in argument order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Number of output slots.
    pub fn output_count(&self) -> u32 {
        self.output_count
    }

    /// Nodes this one is ordered after without consuming their output.
    pub fn ordering_deps(&self) -> &[NodeId] {
        &self.ordering_deps
    }

    /// IDs of nodes this one reads from, in input order (duplicates kept).
    pub fn data_sources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.iter().filter_map(|input| match input {
            Input::Wire(wire) => Some(wire.node()),
            Input::Constant(_) => None,
        })
    }
}
