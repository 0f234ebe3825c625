//! Graph finalizer: dependency-respecting linearization.
//!
//! Edges come from three places: every wire from a consumer to its source,
//! every width-first ordering dependency recorded on a node, and every
//! explicit [`Builder::order_after`](super::Builder::order_after) constraint.
//! Kahn's algorithm runs with a min-heap keyed on creation index, so among
//! the nodes that are ready at any step the oldest goes first. Identical
//! source therefore always yields an identical order.
//!
//! Data edges alone cannot form a cycle because a wire can only name an
//! already-created node. Explicit constraints can; any node left unscheduled
//! is reported in [`SynthDefError::OrderingCycle`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Result, SynthDefError};

use super::builder::BuiltGraph;
use super::node::NodeId;

/// Final execution order of a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<NodeId>,
    positions: Vec<u32>,
}

impl Schedule {
    /// Node IDs in execution order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Position of `id` in the execution order.
    pub fn position(&self, id: NodeId) -> Option<u32> {
        self.positions.get(id.0 as usize).copied()
    }

    /// Number of scheduled nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True for an empty graph.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Computes the execution order of a finished build.
pub fn schedule(graph: &BuiltGraph) -> Result<Schedule> {
    let n = graph.nodes.len();
    let mut in_degree = vec![0u32; n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];

    let mut add_edge = |from: NodeId, to: usize| {
        successors[from.0 as usize].push(to);
        in_degree[to] += 1;
    };

    for (idx, node) in graph.nodes.iter().enumerate() {
        for source in node.data_sources() {
            add_edge(source, idx);
        }
        for &dep in &node.ordering_deps {
            add_edge(dep, idx);
        }
    }
    for &(dependent, prerequisite) in &graph.ordering {
        add_edge(prerequisite, dependent.0 as usize);
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(NodeId(idx as u32));
        for &next in &successors[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() != n {
        let stuck = (0..n)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| NodeId(i as u32))
            .collect();
        return Err(SynthDefError::OrderingCycle(stuck));
    }

    let mut positions = vec![0u32; n];
    for (position, id) in order.iter().enumerate() {
        positions[id.0 as usize] = position as u32;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("schedule: {} nodes ordered", order.len());

    Ok(Schedule { order, positions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ActiveBuild, Builder, NodeSpec};
    use crate::rate::Rate;

    fn leaf(b: &mut Builder, tag: &str) -> NodeId {
        b.add_node(&NodeSpec::new(tag, Rate::Control).outputs(0), vec![])
            .unwrap();
        b.last_node().unwrap()
    }

    #[test]
    fn unconstrained_nodes_keep_creation_order() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        for tag in ["a", "b", "c"] {
            leaf(&mut b, tag);
        }
        drop(active);
        let s = schedule(&b.finish()).unwrap();
        assert_eq!(s.order(), &[NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn explicit_constraint_moves_prerequisite_first() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let writer = leaf(&mut b, "writer");
        let reader = leaf(&mut b, "reader");
        b.order_after(writer, reader).unwrap();
        drop(active);

        let s = schedule(&b.finish()).unwrap();
        assert_eq!(s.order(), &[reader, writer]);
        assert_eq!(s.position(reader), Some(0));
        assert_eq!(s.position(writer), Some(1));
    }

    #[test]
    fn data_edges_precede_consumers() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let unrelated = leaf(&mut b, "unrelated");
        let src = b
            .add_node(&NodeSpec::new("src", Rate::Audio), vec![])
            .unwrap()[0];
        b.add_node(&NodeSpec::new("sink", Rate::Audio).outputs(0), vec![src.into()])
            .unwrap();
        let sink = b.last_node().unwrap();
        b.order_after(unrelated, sink).unwrap();
        drop(active);

        let s = schedule(&b.finish()).unwrap();
        assert_eq!(s.order(), &[src.node(), sink, unrelated]);
    }

    #[test]
    fn cycles_are_reported() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let first = leaf(&mut b, "first");
        let second = leaf(&mut b, "second");
        leaf(&mut b, "free");
        b.order_after(first, second).unwrap();
        b.order_after(second, first).unwrap();
        drop(active);

        match schedule(&b.finish()) {
            Err(SynthDefError::OrderingCycle(nodes)) => assert_eq!(nodes, vec![first, second]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_constraint_is_a_cycle() {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let only = leaf(&mut b, "only");
        b.order_after(only, only).unwrap();
        drop(active);
        assert!(matches!(
            schedule(&b.finish()),
            Err(SynthDefError::OrderingCycle(_))
        ));
    }
}
