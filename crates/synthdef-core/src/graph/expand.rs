//! Multichannel expansion.
//!
//! An array-valued argument in an expandable slot instantiates the node once
//! per array element instead of once overall. The expansion width is the
//! longest array among the arguments; shorter arrays wrap around with modulo
//! indexing and plain arguments are reused by every instance. Width 1
//! degrades to a single ordinary node. Expansion is one level deep: an array
//! of arrays in a slot is rejected, as is any array in a slot the node type
//! did not list as expandable.

use crate::error::{Result, SynthDefError};

use super::builder::Builder;
use super::node::NodeSpec;
use super::wire::{Input, Signal, Wire};

/// Expansion width of an argument list after validating every slot.
fn expansion_width(type_tag: &str, args: &[Signal], expandable: &[usize]) -> Result<usize> {
    let mut width = 1;
    for (slot, arg) in args.iter().enumerate() {
        let Signal::Many(items) = arg else {
            continue;
        };
        if !expandable.contains(&slot) {
            return Err(SynthDefError::NonExpandableArgument {
                type_tag: type_tag.to_string(),
                slot,
            });
        }
        if items.iter().any(|item| matches!(item, Signal::Many(_))) {
            return Err(SynthDefError::NestedExpansion {
                type_tag: type_tag.to_string(),
                slot,
            });
        }
        if items.is_empty() {
            return Err(SynthDefError::EmptyExpansionArgument {
                type_tag: type_tag.to_string(),
                slot,
            });
        }
        width = width.max(items.len());
    }
    Ok(width)
}

/// Inputs of the `instance`-th expanded node.
fn instance_inputs(args: &[Signal], instance: usize) -> Vec<Input> {
    args.iter()
        .map(|arg| match arg {
            Signal::One(input) => *input,
            Signal::Many(items) => match &items[instance % items.len()] {
                Signal::One(input) => *input,
                // Rejected by `expansion_width`.
                Signal::Many(_) => unreachable!("nested expansion argument"),
            },
        })
        .collect()
}

/// Runs `make` once per expanded instance of `args`.
///
/// Returns `make`'s result directly for width 1 and a `Many` of the
/// per-instance results otherwise.
pub fn expand_with<F>(type_tag: &str, args: &[Signal], expandable: &[usize], mut make: F) -> Result<Signal>
where
    F: FnMut(Vec<Input>) -> Result<Signal>,
{
    let width = expansion_width(type_tag, args, expandable)?;
    if width == 1 {
        return make(instance_inputs(args, 0));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("expand: {type_tag} x{width}");

    let instances = (0..width)
        .map(|i| make(instance_inputs(args, i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Signal::Many(instances))
}

/// Presents the wires of one node as a signal: nothing for sinks, `One` for a
/// single output, `Many` otherwise.
pub fn outputs_signal(wires: Vec<Wire>) -> Signal {
    if wires.len() == 1 {
        Signal::from(wires[0])
    } else {
        Signal::array(wires)
    }
}

impl Builder {
    /// Creates one node and returns its outputs as a signal.
    pub fn create(&mut self, spec: &NodeSpec<'_>, inputs: Vec<Input>) -> Result<Signal> {
        self.add_node(spec, inputs).map(outputs_signal)
    }

    /// Creates one node per expanded instance of `args`.
    ///
    /// `expandable` lists the argument positions allowed to carry arrays.
    /// The result is the single node's output shape for width 1, or a `Many`
    /// holding each instance's shape. Sink nodes return an empty signal.
    pub fn expand(&mut self, spec: &NodeSpec<'_>, args: &[Signal], expandable: &[usize]) -> Result<Signal> {
        let result = expand_with(spec.type_tag, args, expandable, |inputs| self.create(spec, inputs))?;
        if spec.output_count == 0 {
            Ok(Signal::empty())
        } else {
            Ok(result)
        }
    }
}
