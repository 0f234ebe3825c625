//! Integration tests for synthdef-config.
//!
//! Factory definitions must compile to the same bytes as the reference
//! files the typed wrappers are checked against.

use synthdef_config::{
    ConfigError, DefinitionFile, NodeConfig, ParamConfig, VariantConfig, compile_definition, factory_definitions,
    get_factory_definition,
};
use synthdef_core::decode;
use tempfile::TempDir;

fn fixture(name: &str) -> &'static [u8] {
    match name {
        "sine" => &include_bytes!("../../synthdef-ugens/tests/fixtures/sine.scsyndef")[..],
        "param_sine" => &include_bytes!("../../synthdef-ugens/tests/fixtures/param_sine.scsyndef")[..],
        "pan" => &include_bytes!("../../synthdef-ugens/tests/fixtures/pan.scsyndef")[..],
        "gated" => &include_bytes!("../../synthdef-ugens/tests/fixtures/gated.scsyndef")[..],
        "feedback" => &include_bytes!("../../synthdef-ugens/tests/fixtures/feedback.scsyndef")[..],
        "demand_poll" => &include_bytes!("../../synthdef-ugens/tests/fixtures/demand_poll.scsyndef")[..],
        other => panic!("no fixture for {other}"),
    }
}

#[test]
fn test_factory_definitions_match_fixtures() {
    for def in factory_definitions() {
        let compiled = compile_definition(&def)
            .unwrap_or_else(|e| panic!("factory definition '{}' failed to compile: {e}", def.name));
        let bytes = compiled.encode().unwrap();
        assert_eq!(bytes, fixture(&def.name), "{} differs from fixture\n{compiled}", def.name);
    }
}

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("defs").join("gated.toml");

    let def = get_factory_definition("gated").unwrap();
    def.save(&path).unwrap();
    assert!(path.exists());

    let loaded = DefinitionFile::load(&path).unwrap();
    assert_eq!(loaded, def);
    assert_eq!(
        compile_definition(&loaded).unwrap().encode().unwrap(),
        fixture("gated")
    );
}

#[test]
fn test_every_factory_definition_survives_toml() {
    for def in factory_definitions() {
        let text = def.to_toml().unwrap();
        let again = DefinitionFile::from_toml(&text).unwrap();
        assert_eq!(again, def, "{} changed through TOML:\n{text}", def.name);
    }
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        DefinitionFile::load(&path),
        Err(ConfigError::ReadFile { path: p, .. }) if p == path
    ));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        DefinitionFile::from_toml("name = "),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_compiled_definition_decodes() {
    let def = DefinitionFile::new("chord")
        .with_param(ParamConfig::new("amp", 0.2))
        .with_node(
            NodeConfig::ugen("Saw")
                .with_id("saws")
                .with_arg("freq", vec![220.0, 277.0, 330.0])
                .with_arg("mul", "amp"),
        )
        .with_node(NodeConfig::op("sum3rand").with_id("noise").with_arg("a", 0.1))
        .with_node(NodeConfig::ugen("Out").with_arg("channels", "saws"))
        .with_variant(VariantConfig::new("quiet").with_value("amp", 0.05));

    let compiled = compile_definition(&def).unwrap();
    assert_eq!(compiled.find_ugens("Saw").count(), 3);
    // Random operators are never folded, even on literals.
    assert_eq!(compiled.find_ugens("UnaryOpUGen").count(), 1);
    assert_eq!(compiled.variants.len(), 1);

    let decoded = decode(&compiled.encode().unwrap()).unwrap();
    assert_eq!(decoded, vec![compiled]);
}
