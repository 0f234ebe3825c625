//! Integration tests for synthdef-core.
//!
//! Exercises the whole pipeline (build, order, compile, encode, decode)
//! through the public API, using raw `NodeSpec`s in place of a UGen library.

use synthdef_core::{
    ActiveBuild, Adsr, Builder, Env, InputSpec, NodeSpec, ParamDef, Rate, Signal, SynthDef,
    SynthDefBuilder, SynthDefError, VariantDef, decode, encode_file, schedule,
};

fn sin_osc(b: &mut Builder, freq: Signal) -> synthdef_core::Result<Signal> {
    b.expand(&NodeSpec::new("SinOsc", Rate::Audio), &[freq, 0.0.into()], &[0, 1])
}

fn out(b: &mut Builder, bus: f32, channels: Signal) -> synthdef_core::Result<()> {
    let mut args = vec![Signal::from(bus)];
    args.extend(channels.into_channels());
    let expandable: Vec<usize> = (0..args.len()).collect();
    b.expand(&NodeSpec::new("Out", Rate::Audio).outputs(0), &args, &expandable)?;
    Ok(())
}

fn tags(def: &SynthDef) -> Vec<&str> {
    def.ugens.iter().map(|u| u.type_tag.as_str()).collect()
}

// ============================================================================
// 1. Determinism
// ============================================================================

fn gated_def() -> SynthDef {
    SynthDefBuilder::new("gated")
        .param(ParamDef::control("gate", 1.0))
        .param(ParamDef::control("freq", 440.0))
        .build(|b, p| {
            let mut args = vec![p.get("gate")?, 1.0.into(), 0.0.into(), 1.0.into(), 2.0.into()];
            args.extend(Env::adsr(&Adsr::default()).to_signal().into_channels());
            let env = b.expand(&NodeSpec::new("EnvGen", Rate::Control), &args, &[0, 1, 2, 3, 4])?;
            let sine = sin_osc(b, p.get("freq")?)?;
            let sig = b.mul(&sine, &env)?;
            out(b, 0.0, sig)
        })
        .unwrap()
}

#[test]
fn same_definition_encodes_identically() {
    let a = gated_def().encode().unwrap();
    let b = gated_def().encode().unwrap();
    assert_eq!(a, b);
}

#[test]
fn gated_envelope_layout() {
    let def = gated_def();
    assert_eq!(tags(&def), vec!["Control", "EnvGen", "SinOsc", "BinaryOpUGen", "Out"]);
    assert_eq!(
        def.constants,
        vec![1.0, 0.0, 2.0, 3.0, -99.0, 0.01, 5.0, -4.0, 0.5, 0.3]
    );
    // gate, levelScale, levelBias, timeScale, doneAction, then 16 envelope values
    assert_eq!(def.ugens[1].inputs.len(), 5 + 16);
    assert_eq!(def.ugens[1].inputs[0], InputSpec::Wire { ugen: 0, output: 0 });
    assert_eq!(def.ugens[3].rate, Rate::Audio);
}

// ============================================================================
// 2. Multichannel expansion end to end
// ============================================================================

#[test]
fn stereo_bank_feeds_one_out() {
    let def = SynthDefBuilder::new("chorus")
        .build(|b, _| {
            let sines = sin_osc(b, Signal::from([440.0, 442.0]))?;
            let sig = b.mul(&sines, 0.1)?;
            out(b, 0.0, sig)
        })
        .unwrap();
    assert_eq!(
        tags(&def),
        vec!["SinOsc", "SinOsc", "BinaryOpUGen", "BinaryOpUGen", "Out"]
    );
    assert_eq!(def.ugens[4].inputs.len(), 3);
}

#[test]
fn equal_effective_arguments_give_identical_subgraphs() {
    let wrapped = SynthDefBuilder::new("x")
        .build(|b, _| {
            let s = b.expand(
                &NodeSpec::new("Pulse", Rate::Audio),
                &[Signal::from([100.0, 200.0]), Signal::from([0.5])],
                &[0, 1],
            )?;
            out(b, 0.0, s)
        })
        .unwrap();
    let explicit = SynthDefBuilder::new("x")
        .build(|b, _| {
            let s = b.expand(
                &NodeSpec::new("Pulse", Rate::Audio),
                &[Signal::from([100.0, 200.0]), Signal::from([0.5, 0.5])],
                &[0, 1],
            )?;
            out(b, 0.0, s)
        })
        .unwrap();
    assert_eq!(wrapped.encode().unwrap(), explicit.encode().unwrap());
}

// ============================================================================
// 3. Ordering
// ============================================================================

#[test]
fn width_first_nodes_run_before_later_nodes() {
    let def = SynthDefBuilder::new("buf")
        .build(|b, _| {
            let sine = sin_osc(b, 220.0.into())?;
            let token = b.allocate_local_buffer()?;
            let buf = b.create(
                &NodeSpec::new("LocalBuf", Rate::Scalar).width_first(),
                vec![1.0.into(), 512.0.into(), token.counter().into()],
            )?;
            b.expand(&NodeSpec::new("RecordBuf", Rate::Audio).outputs(0), &[buf, sine], &[0, 1])?;
            Ok(())
        })
        .unwrap();
    assert_eq!(tags(&def), vec!["SinOsc", "MaxLocalBufs", "LocalBuf", "RecordBuf"]);
    assert_eq!(def.constants, vec![220.0, 0.0, 1.0, 512.0]);
    assert!(def.ugens[3].inputs.contains(&InputSpec::Wire { ugen: 2, output: 0 }));
    match def.ugens[1].inputs[0] {
        InputSpec::Constant(c) => assert_eq!(def.constants[c as usize], 1.0),
        other => panic!("expected constant count, got {other:?}"),
    }
}

#[test]
fn explicit_ordering_overrides_creation_order() {
    let mut b = Builder::new();
    let active = ActiveBuild::install(&b).unwrap();
    let write = b
        .create(&NodeSpec::new("LocalOut", Rate::Audio).outputs(0), vec![0.0.into()])
        .unwrap();
    assert!(write.is_empty());
    let writer = b.last_node().unwrap();
    b.create(&NodeSpec::new("LocalIn", Rate::Audio), vec![0.0.into()])
        .unwrap();
    let reader = b.last_node().unwrap();
    b.order_after(writer, reader).unwrap();
    drop(active);

    let graph = b.finish();
    let order = schedule(&graph).unwrap();
    assert!(order.position(reader) < order.position(writer));
}

#[test]
fn ordering_cycle_fails_the_build() {
    let result = SynthDefBuilder::new("cycle").build(|b, _| {
        b.create(&NodeSpec::new("A", Rate::Control).outputs(0), vec![])?;
        let a = b.last_node().unwrap();
        b.create(&NodeSpec::new("B", Rate::Control).outputs(0), vec![])?;
        let c = b.last_node().unwrap();
        b.order_after(a, c)?;
        b.order_after(c, a)?;
        Ok(())
    });
    assert!(matches!(result, Err(SynthDefError::OrderingCycle(ref ids)) if ids.len() == 2));
}

// ============================================================================
// 4. Errors
// ============================================================================

#[test]
fn node_factory_outside_build_fails() {
    let mut b = Builder::new();
    let result = b.create(&NodeSpec::new("SinOsc", Rate::Audio), vec![]);
    assert!(matches!(result, Err(SynthDefError::NoActiveBuild)));
}

#[test]
fn wire_leaked_from_previous_build_is_rejected() {
    let mut leaked = None;
    SynthDefBuilder::new("first")
        .build(|b, _| {
            leaked = Some(sin_osc(b, 440.0.into())?);
            Ok(())
        })
        .unwrap();

    let result = SynthDefBuilder::new("second").build(|b, _| {
        let sig = leaked.clone().unwrap();
        out(b, 0.0, sig)
    });
    assert!(matches!(
        result,
        Err(SynthDefError::CrossBuildReference { .. })
    ));
}

#[test]
fn parameter_names_too_long_overflow() {
    let def = SynthDefBuilder::new("long")
        .param(ParamDef::control("p".repeat(300), 0.0))
        .build(|_, _| Ok(()))
        .unwrap();
    assert!(matches!(
        def.encode(),
        Err(SynthDefError::EncodingOverflow { field: "parameter name length", .. })
    ));
}

// ============================================================================
// 5. Decoding
// ============================================================================

#[test]
fn decoded_file_reencodes_to_same_bytes() {
    let with_variant = SynthDefBuilder::new("v")
        .param(ParamDef::control("freq", 440.0))
        .variant(VariantDef::new("low").set("freq", [110.0]))
        .build(|b, p| {
            let s = sin_osc(b, p.get("freq")?)?;
            out(b, 0.0, s)
        })
        .unwrap();
    let bytes = encode_file(&[gated_def(), with_variant]).unwrap();
    let defs = decode(&bytes).unwrap();
    assert_eq!(defs.len(), 2);
    assert_eq!(defs[1].variants[0].values, vec![110.0]);
    assert_eq!(encode_file(&defs).unwrap(), bytes);
}
