//! Wires, inputs, and multichannel signals.
//!
//! A [`Wire`] is a typed reference to one output slot of one node. It never
//! owns its target: nodes live in the [`Builder`](super::Builder)'s node list
//! and a wire names them by [`NodeId`]. Several wires may name the same
//! `(node, slot)` pair; that is the graph's fan-out.
//!
//! [`Signal`] is the value user code passes around: either a single
//! [`Input`] or an array of signals produced by multichannel expansion.

use core::fmt;

use crate::rate::Rate;

use super::node::NodeId;

/// Identity of one build. Wires carry it so they cannot leak between builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildId(pub(crate) u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build#{}", self.0)
    }
}

/// The `output`-th output of a node, at the node's rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wire {
    pub(crate) build: BuildId,
    pub(crate) node: NodeId,
    pub(crate) output: u32,
    pub(crate) rate: Rate,
}

impl Wire {
    /// Build this wire belongs to.
    pub fn build(&self) -> BuildId {
        self.build
    }

    /// Source node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Output slot on the source node.
    pub fn output(&self) -> u32 {
        self.output
    }

    /// Rate of the output.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

/// A node input: a literal number or a wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    /// Literal value, stored in the definition's constant pool.
    Constant(f32),
    /// Output of another node.
    Wire(Wire),
}

impl Input {
    /// Rate of the input. Literals are scalar.
    pub fn rate(&self) -> Rate {
        match self {
            Input::Constant(_) => Rate::Scalar,
            Input::Wire(wire) => wire.rate,
        }
    }

    /// Returns the literal value, if this is a constant.
    pub fn as_constant(&self) -> Option<f32> {
        match self {
            Input::Constant(value) => Some(*value),
            Input::Wire(_) => None,
        }
    }

    /// Returns the wire, if this is not a constant.
    pub fn as_wire(&self) -> Option<Wire> {
        match self {
            Input::Constant(_) => None,
            Input::Wire(wire) => Some(*wire),
        }
    }

    /// True when this is the literal `value`.
    #[inline]
    pub fn is_constant(&self, value: f32) -> bool {
        self.as_constant() == Some(value)
    }
}

impl From<Wire> for Input {
    fn from(wire: Wire) -> Self {
        Input::Wire(wire)
    }
}

impl From<f32> for Input {
    fn from(value: f32) -> Self {
        Input::Constant(value)
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Constant(value as f32)
    }
}

impl From<i32> for Input {
    fn from(value: i32) -> Self {
        Input::Constant(value as f32)
    }
}

/// A single input or an array of signals.
///
/// `One` is always a plain value. `Many` is an array whose elements are
/// usually `One`; an element is itself `Many` only for banks of
/// multi-output nodes. The shape is explicit: a one-output node yields
/// `One`, a multi-output node yields `Many`, and expansion to width `n`
/// yields `Many` of `n` per-instance shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// A single input.
    One(Input),
    /// An array of signals.
    Many(Vec<Signal>),
}

impl Signal {
    /// An empty array, returned by sink nodes.
    pub fn empty() -> Self {
        Signal::Many(Vec::new())
    }

    /// Builds an array from anything convertible to signals.
    pub fn array<T: Into<Signal>>(items: impl IntoIterator<Item = T>) -> Self {
        Signal::Many(items.into_iter().map(Into::into).collect())
    }

    /// Number of channels: 1 for `One`, the array length for `Many`.
    pub fn width(&self) -> usize {
        match self {
            Signal::One(_) => 1,
            Signal::Many(items) => items.len(),
        }
    }

    /// True for an empty array.
    pub fn is_empty(&self) -> bool {
        matches!(self, Signal::Many(items) if items.is_empty())
    }

    /// Returns the input when this is `One`.
    pub fn as_input(&self) -> Option<Input> {
        match self {
            Signal::One(input) => Some(*input),
            Signal::Many(_) => None,
        }
    }

    /// Returns channel `index`, wrapping around for arrays. `One` returns itself.
    pub fn channel(&self, index: usize) -> Signal {
        match self {
            Signal::One(_) => self.clone(),
            Signal::Many(items) if items.is_empty() => self.clone(),
            Signal::Many(items) => items[index % items.len()].clone(),
        }
    }

    /// Flattens nested arrays into a single list of inputs, depth first.
    pub fn flatten(&self) -> Vec<Input> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Input>) {
        match self {
            Signal::One(input) => out.push(*input),
            Signal::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }

    /// Splits into top-level channels: `One` becomes a one-element list.
    pub fn into_channels(self) -> Vec<Signal> {
        match self {
            Signal::One(_) => vec![self],
            Signal::Many(items) => items,
        }
    }
}

impl From<Input> for Signal {
    fn from(input: Input) -> Self {
        Signal::One(input)
    }
}

impl From<Wire> for Signal {
    fn from(wire: Wire) -> Self {
        Signal::One(Input::Wire(wire))
    }
}

impl From<f32> for Signal {
    fn from(value: f32) -> Self {
        Signal::One(Input::Constant(value))
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        Signal::One(Input::from(value))
    }
}

impl From<i32> for Signal {
    fn from(value: i32) -> Self {
        Signal::One(Input::from(value))
    }
}

impl<T: Into<Signal>> From<Vec<T>> for Signal {
    fn from(items: Vec<T>) -> Self {
        Signal::array(items)
    }
}

impl<T: Into<Signal>, const N: usize> From<[T; N]> for Signal {
    fn from(items: [T; N]) -> Self {
        Signal::array(items)
    }
}

impl From<&Signal> for Signal {
    fn from(signal: &Signal) -> Self {
        signal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(node: u32) -> Wire {
        Wire {
            build: BuildId(1),
            node: NodeId(node),
            output: 0,
            rate: Rate::Audio,
        }
    }

    #[test]
    fn literal_inputs_are_scalar() {
        assert_eq!(Input::from(0.5).rate(), Rate::Scalar);
        assert_eq!(Input::from(wire(0)).rate(), Rate::Audio);
    }

    #[test]
    fn width_and_channel_wrap() {
        let sig = Signal::from([1.0, 2.0, 3.0]);
        assert_eq!(sig.width(), 3);
        assert_eq!(sig.channel(4), Signal::from(2.0));
        assert_eq!(Signal::from(7.0).channel(9), Signal::from(7.0));
    }

    #[test]
    fn flatten_is_depth_first() {
        let sig = Signal::Many(vec![
            Signal::from([1.0, 2.0]),
            Signal::from(3.0),
            Signal::from(wire(4)),
        ]);
        assert_eq!(
            sig.flatten(),
            vec![
                Input::Constant(1.0),
                Input::Constant(2.0),
                Input::Constant(3.0),
                Input::Wire(wire(4)),
            ]
        );
    }

    #[test]
    fn empty_signal() {
        assert!(Signal::empty().is_empty());
        assert_eq!(Signal::empty().width(), 0);
        assert!(!Signal::from(1.0).is_empty());
    }
}
