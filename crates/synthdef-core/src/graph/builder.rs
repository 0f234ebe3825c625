//! Construction context for one synth definition build.
//!
//! A [`Builder`] accumulates nodes while a definition body runs. It is an
//! explicit object passed by `&mut` through every node-factory call; there is
//! no ambient global builder. The "one build in flight" contract is kept by a
//! per-thread active slot: [`ActiveBuild::install`] claims the slot for one
//! builder and releases it on drop, including on the error path. Adding a
//! node through a builder that does not hold the slot fails with
//! [`SynthDefError::NoActiveBuild`], and claiming an occupied slot fails with
//! [`SynthDefError::ReentrantBuild`].

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, SynthDefError};
use crate::rate::Rate;

use super::node::{Node, NodeId, NodeSpec};
use super::wire::{BuildId, Input, Wire};

static NEXT_BUILD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTIVE_BUILD: Cell<Option<BuildId>> = const { Cell::new(None) };
}

/// Returns the build currently installed on this thread, if any.
pub fn current_build() -> Option<BuildId> {
    ACTIVE_BUILD.with(Cell::get)
}

/// Guard holding this thread's active-build slot.
///
/// Dropping the guard uninstalls the build.
#[must_use = "the build is uninstalled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ActiveBuild {
    id: BuildId,
}

impl ActiveBuild {
    /// Installs `builder` as the active build on this thread.
    ///
    /// Fails with [`SynthDefError::ReentrantBuild`] if any build is already
    /// installed; builds are not reentrant.
    pub fn install(builder: &Builder) -> Result<Self> {
        ACTIVE_BUILD.with(|slot| {
            if slot.get().is_some() {
                return Err(SynthDefError::ReentrantBuild);
            }
            slot.set(Some(builder.id));
            Ok(Self { id: builder.id })
        })
    }

    /// The installed build.
    pub fn id(&self) -> BuildId {
        self.id
    }
}

impl Drop for ActiveBuild {
    fn drop(&mut self) {
        ACTIVE_BUILD.with(|slot| {
            if slot.get() == Some(self.id) {
                slot.set(None);
            }
        });
    }
}

/// Handle to one local scratch buffer slot.
///
/// Returned by [`Builder::allocate_local_buffer`]; consumed by the node that
/// owns the buffer.
#[derive(Debug)]
pub struct LocalBufToken {
    index: u32,
    counter: Wire,
}

impl LocalBufToken {
    /// Zero-based allocation index within the build.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Output of the build's buffer-count node, to be wired as an input of
    /// the buffer-owning node.
    pub fn counter(&self) -> Wire {
        self.counter
    }
}

/// Nodes and ordering constraints of a finished build.
#[derive(Debug)]
pub struct BuiltGraph {
    pub(crate) nodes: Vec<Node>,
    /// Explicit `(dependent, prerequisite)` ordering edges.
    pub(crate) ordering: Vec<(NodeId, NodeId)>,
}

impl BuiltGraph {
    /// Nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Explicit `(dependent, prerequisite)` ordering edges.
    pub fn ordering(&self) -> &[(NodeId, NodeId)] {
        &self.ordering
    }
}

/// Mutable state of one definition build.
///
/// Holds the append-only node list, the width-first node set, explicit
/// ordering constraints, and the local-buffer counter.
#[derive(Debug)]
pub struct Builder {
    id: BuildId,
    nodes: Vec<Node>,
    width_first: Vec<NodeId>,
    ordering: Vec<(NodeId, NodeId)>,
    local_bufs: u32,
    max_local_bufs: Option<Wire>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Type name of the node that announces the local-buffer count.
pub const MAX_LOCAL_BUFS: &str = "MaxLocalBufs";

impl Builder {
    /// Creates an empty builder with a fresh build identity.
    ///
    /// The builder must be installed with [`ActiveBuild::install`] before
    /// nodes can be added.
    pub fn new() -> Self {
        Self {
            id: BuildId(NEXT_BUILD_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: Vec::new(),
            width_first: Vec::new(),
            ordering: Vec::new(),
            local_bufs: 0,
            max_local_bufs: None,
        }
    }

    /// This build's identity.
    pub fn id(&self) -> BuildId {
        self.id
    }

    /// True when this builder holds the thread's active slot.
    pub fn is_active(&self) -> bool {
        current_build() == Some(self.id)
    }

    /// Nodes created so far, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node of this build.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// ID of the most recently created node.
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().map(|n| n.id)
    }

    /// Number of local buffers allocated so far.
    pub fn local_buffer_count(&self) -> u32 {
        self.local_bufs
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SynthDefError::NoActiveBuild)
        }
    }

    fn check_input(&self, type_tag: &str, input: &Input) -> Result<()> {
        if let Input::Wire(wire) = input
            && (wire.build != self.id || wire.node.0 as usize >= self.nodes.len())
        {
            return Err(SynthDefError::CrossBuildReference {
                type_tag: type_tag.to_string(),
            });
        }
        Ok(())
    }

    /// Appends a node and returns one wire per output slot.
    ///
    /// The node gets the next sequential ID. Every width-first node created
    /// earlier in the build becomes one of its ordering dependencies.
    pub fn add_node(&mut self, spec: &NodeSpec<'_>, inputs: Vec<Input>) -> Result<Vec<Wire>> {
        self.ensure_active()?;
        for input in &inputs {
            self.check_input(spec.type_tag, input)?;
        }

        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| {
            SynthDefError::overflow("node count", self.nodes.len(), i64::from(u32::MAX))
        })?);

        self.nodes.push(Node {
            id,
            type_tag: spec.type_tag.to_string(),
            rate: spec.rate,
            special_index: spec.special_index,
            inputs,
            output_count: spec.output_count,
            ordering_deps: self.width_first.clone(),
        });
        if spec.width_first {
            self.width_first.push(id);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "build_add: {} {} {} ({} outputs)",
            id,
            spec.type_tag,
            spec.rate,
            spec.output_count
        );

        let build = self.id;
        let rate = spec.rate;
        Ok((0..spec.output_count)
            .map(|output| Wire {
                build,
                node: id,
                output,
                rate,
            })
            .collect())
    }

    /// Reserves a private scratch-buffer slot.
    ///
    /// The first call creates the build's buffer-count node. At the end of
    /// the build its single input is set to the total number of allocations.
    /// Request one token per buffer-owning node.
    pub fn allocate_local_buffer(&mut self) -> Result<LocalBufToken> {
        self.ensure_active()?;
        let counter = match self.max_local_bufs {
            Some(wire) => wire,
            None => {
                let spec = NodeSpec::new(MAX_LOCAL_BUFS, Rate::Scalar);
                let wire = self.add_node(&spec, vec![Input::Constant(0.0)])?[0];
                self.max_local_bufs = Some(wire);
                wire
            }
        };
        let index = self.local_bufs;
        self.local_bufs += 1;
        Ok(LocalBufToken { index, counter })
    }

    /// Requires `dependent` to be ordered after `prerequisite` even though no
    /// data wire connects them.
    ///
    /// Constraints that cannot all be satisfied are reported as
    /// [`SynthDefError::OrderingCycle`] when the graph is finalized.
    pub fn order_after(&mut self, dependent: NodeId, prerequisite: NodeId) -> Result<()> {
        self.ensure_active()?;
        for id in [dependent, prerequisite] {
            if id.0 as usize >= self.nodes.len() {
                return Err(SynthDefError::CrossBuildReference {
                    type_tag: "ordering constraint".to_string(),
                });
            }
        }
        self.ordering.push((dependent, prerequisite));
        Ok(())
    }

    /// Ends the build and returns its nodes and ordering constraints.
    pub fn finish(mut self) -> BuiltGraph {
        if let Some(counter) = self.max_local_bufs {
            let count = self.local_bufs as f32;
            self.nodes[counter.node.0 as usize].inputs = vec![Input::Constant(count)];
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "build_finish: {} nodes, {} ordering constraints",
            self.nodes.len(),
            self.ordering.len()
        );
        BuiltGraph {
            nodes: self.nodes,
            ordering: self.ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_requires_installation() {
        let mut b = Builder::new();
        let result = b.add_node(&NodeSpec::new("SinOsc", Rate::Audio), vec![]);
        assert!(matches!(result, Err(SynthDefError::NoActiveBuild)));
    }

    #[test]
    fn add_node_assigns_sequential_ids_and_wires() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();

        let a = b
            .add_node(&NodeSpec::new("SinOsc", Rate::Audio), vec![440.0.into()])
            .unwrap();
        let c = b
            .add_node(
                &NodeSpec::new("Pan2", Rate::Audio).outputs(2),
                vec![a[0].into(), 0.0.into(), 1.0.into()],
            )
            .unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].node(), NodeId(0));
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].node(), NodeId(1));
        assert_eq!(c[1].output(), 1);
        assert_eq!(c[1].rate(), Rate::Audio);
        assert_eq!(b.node_count(), 2);
    }

    #[test]
    fn sink_nodes_return_no_wires() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let wires = b
            .add_node(&NodeSpec::new("Out", Rate::Audio).outputs(0), vec![0.0.into()])
            .unwrap();
        assert!(wires.is_empty());
        assert_eq!(b.last_node(), Some(NodeId(0)));
    }

    #[test]
    fn second_install_is_rejected() {
        let outer = Builder::new();
        let inner = Builder::new();
        let _active = ActiveBuild::install(&outer).unwrap();
        assert!(matches!(
            ActiveBuild::install(&inner),
            Err(SynthDefError::ReentrantBuild)
        ));
        assert_eq!(current_build(), Some(outer.id()));
    }

    #[test]
    fn dropping_guard_uninstalls() {
        let b = Builder::new();
        {
            let _active = ActiveBuild::install(&b).unwrap();
            assert!(b.is_active());
        }
        assert!(!b.is_active());
        assert_eq!(current_build(), None);
    }

    #[test]
    fn wires_from_other_builds_are_rejected() {
        let mut first = Builder::new();
        let foreign = {
            let _active = ActiveBuild::install(&first).unwrap();
            first
                .add_node(&NodeSpec::new("SinOsc", Rate::Audio), vec![])
                .unwrap()[0]
        };

        let mut second = Builder::new();
        let _active = ActiveBuild::install(&second).unwrap();
        let result = second.add_node(&NodeSpec::new("Out", Rate::Audio).outputs(0), vec![
            0.0.into(),
            foreign.into(),
        ]);
        assert!(matches!(
            result,
            Err(SynthDefError::CrossBuildReference { ref type_tag }) if type_tag == "Out"
        ));
    }

    #[test]
    fn width_first_nodes_become_ordering_deps() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        b.add_node(&NodeSpec::new("A", Rate::Scalar), vec![]).unwrap();
        b.add_node(&NodeSpec::new("W", Rate::Scalar).width_first(), vec![])
            .unwrap();
        b.add_node(&NodeSpec::new("C", Rate::Scalar), vec![]).unwrap();

        assert!(b.nodes()[1].ordering_deps().is_empty());
        assert_eq!(b.nodes()[2].ordering_deps(), &[NodeId(1)]);
    }

    #[test]
    fn local_buffers_share_one_counter_node() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let first = b.allocate_local_buffer().unwrap();
        let second = b.allocate_local_buffer().unwrap();

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(first.counter(), second.counter());
        assert_eq!(b.node_count(), 1);

        drop(active);
        let graph = b.finish();
        assert_eq!(graph.nodes()[0].type_tag(), MAX_LOCAL_BUFS);
        assert_eq!(graph.nodes()[0].inputs(), &[Input::Constant(2.0)]);
    }

    #[test]
    fn order_after_rejects_unknown_nodes() {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        b.add_node(&NodeSpec::new("A", Rate::Scalar), vec![]).unwrap();
        assert!(b.order_after(NodeId(0), NodeId(3)).is_err());
        assert!(b.order_after(NodeId(0), NodeId(0)).is_ok());
    }
}
