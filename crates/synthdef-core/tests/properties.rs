//! Property-based tests for synthdef-core.
//!
//! Covers encoding determinism, constant folding against direct computation,
//! ordering validity under random constraints, and multichannel expansion
//! width and wrap-around.

use proptest::prelude::*;
use synthdef_core::{
    ActiveBuild, BinaryOp, Builder, Input, NodeId, NodeSpec, ParamDef, Rate, Signal,
    SynthDefBuilder, schedule,
};

fn build_param_sine(freq: f32, amp: f32) -> Vec<u8> {
    SynthDefBuilder::new("param_sine")
        .param(ParamDef::control("freq", freq))
        .param(ParamDef::control("amp", amp))
        .build(|b, p| {
            let sine = b.expand(
                &NodeSpec::new("SinOsc", Rate::Audio),
                &[p.get("freq")?, 0.0.into()],
                &[0, 1],
            )?;
            let sig = b.mul(&sine, p.get("amp")?)?;
            b.expand(
                &NodeSpec::new("Out", Rate::Audio).outputs(0),
                &[0.into(), sig],
                &[0, 1],
            )?;
            Ok(())
        })
        .unwrap()
        .encode()
        .unwrap()
}

fn direct(op: BinaryOp, a: f32, b: f32) -> f32 {
    let (x, y) = (f64::from(a), f64::from(b));
    let r = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => x / y,
        BinaryOp::Min => x.min(y),
        BinaryOp::Max => x.max(y),
        BinaryOp::Hypot => x.hypot(y),
        _ => unreachable!(),
    };
    r as f32
}

const FOLDABLE: [BinaryOp; 7] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Min,
    BinaryOp::Max,
    BinaryOp::Hypot,
];

/// Chain lengths, the interleaved order their nodes are created in, and
/// extra cross-chain ordering pairs over creation indices.
fn interleaved_chains() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
    prop::collection::vec(1usize..5, 1..5).prop_flat_map(|lengths| {
        let sequence: Vec<usize> = lengths
            .iter()
            .enumerate()
            .flat_map(|(chain, &len)| std::iter::repeat_n(chain, len))
            .collect();
        let n = sequence.len();
        (
            Just(sequence).prop_shuffle(),
            prop::collection::vec((0..n, 0..n), 0..8),
        )
    })
}

fn constraint_case() -> impl Strategy<Value = (usize, Vec<usize>, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        (
            Just(n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec((0..n, 0..n), 0..24),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Building the same definition twice gives byte-identical output.
    #[test]
    fn encoding_is_deterministic(freq in 20.0f32..20000.0, amp in 0.0f32..1.0) {
        prop_assert_eq!(build_param_sine(freq, amp), build_param_sine(freq, amp));
    }

    /// Literal operands fold to the directly computed value and create no node.
    #[test]
    fn folding_matches_direct_computation(
        op_index in 0usize..FOLDABLE.len(),
        a in -1000.0f32..1000.0,
        b in 0.5f32..1000.0,
    ) {
        let op = FOLDABLE[op_index];
        let mut builder = Builder::new();
        let _active = ActiveBuild::install(&builder).unwrap();
        let folded = builder.binary(op, a.into(), b.into()).unwrap();
        prop_assert_eq!(folded, Input::Constant(direct(op, a, b)));
        prop_assert_eq!(builder.node_count(), 0);
    }

    /// Acyclic explicit constraints are always honored, and with no
    /// constraints at all the order is the creation order.
    #[test]
    fn ordering_respects_random_constraints((n, rank, pairs) in constraint_case()) {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let ids: Vec<NodeId> = (0..n)
            .map(|_| {
                b.create(&NodeSpec::new("Node", Rate::Control).outputs(0), vec![]).unwrap();
                b.last_node().unwrap()
            })
            .collect();

        // Edges only point from a higher rank to a lower one, so they cannot cycle.
        let mut constraints = Vec::new();
        for &(x, y) in &pairs {
            if rank[x] == rank[y] {
                continue;
            }
            let (dependent, prerequisite) = if rank[x] > rank[y] { (x, y) } else { (y, x) };
            b.order_after(ids[dependent], ids[prerequisite]).unwrap();
            constraints.push((ids[dependent], ids[prerequisite]));
        }
        drop(active);

        let order = schedule(&b.finish()).unwrap();
        prop_assert_eq!(order.len(), n);
        for (dependent, prerequisite) in &constraints {
            prop_assert!(order.position(*prerequisite) < order.position(*dependent));
        }
        if constraints.is_empty() {
            prop_assert_eq!(order.order(), ids.as_slice());
        }
    }

    /// Independent chains created in any interleaving are scheduled in
    /// creation order, with every data wire and ordering edge honored.
    #[test]
    fn ordering_is_stable_across_interleavings((sequence, pairs) in interleaved_chains()) {
        let mut b = Builder::new();
        let active = ActiveBuild::install(&b).unwrap();
        let mut tails: Vec<Option<Input>> = vec![None; sequence.len()];
        let mut ids = Vec::with_capacity(sequence.len());
        let mut chain_of = Vec::with_capacity(sequence.len());
        for &chain in &sequence {
            let input = tails[chain].unwrap_or(Input::Constant(chain as f32));
            let out = b.create(&NodeSpec::new("Step", Rate::Control), vec![input]).unwrap();
            tails[chain] = out.as_input();
            ids.push(b.last_node().unwrap());
            chain_of.push(chain);
        }

        let mut constraints = Vec::new();
        for &(x, y) in &pairs {
            if x < y {
                b.order_after(ids[y], ids[x]).unwrap();
                constraints.push((ids[y], ids[x]));
            }
        }
        drop(active);

        let graph = b.finish();
        let order = schedule(&graph).unwrap();
        prop_assert_eq!(order.order(), ids.as_slice());

        for node in graph.nodes() {
            for source in node.data_sources() {
                prop_assert!(order.position(source) < order.position(node.id()));
            }
        }
        for (dependent, prerequisite) in &constraints {
            prop_assert!(order.position(*prerequisite) < order.position(*dependent));
        }
        // Each chain runs in its own creation order whatever the interleaving.
        for chain in 0..sequence.len() {
            let positions: Vec<u32> = ids
                .iter()
                .zip(&chain_of)
                .filter(|&(_, &c)| c == chain)
                .filter_map(|(&id, _)| order.position(id))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// Expansion width is the longest array; shorter arrays wrap around.
    #[test]
    fn expansion_width_and_wraparound(
        left in prop::collection::vec(-100i32..100, 1..6),
        right in prop::collection::vec(-100i32..100, 1..6),
    ) {
        let mut b = Builder::new();
        let _active = ActiveBuild::install(&b).unwrap();
        let out = b
            .expand(
                &NodeSpec::new("Pair", Rate::Audio),
                &[Signal::array(left.clone()), Signal::array(right.clone())],
                &[0, 1],
            )
            .unwrap();

        let width = left.len().max(right.len());
        prop_assert_eq!(b.node_count(), width);
        prop_assert_eq!(out.width(), width);
        for (i, node) in b.nodes().iter().enumerate() {
            let expected = [
                Input::Constant(left[i % left.len()] as f32),
                Input::Constant(right[i % right.len()] as f32),
            ];
            prop_assert_eq!(node.inputs(), &expected[..]);
        }
    }
}
