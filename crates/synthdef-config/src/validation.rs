//! Definition file validation.
//!
//! Checks the structure of a [`DefinitionFile`] against the
//! [`UGenRegistry`] before anything is built: unit generator and operator
//! names, rates, argument names, required arguments, node ids, and
//! references.
//!
//! # Example
//!
//! ```rust
//! use synthdef_config::{DefinitionFile, NodeConfig, validate_definition};
//!
//! let def = DefinitionFile::new("bad")
//!     .with_node(NodeConfig::ugen("Out").with_arg("channels", "nowhere"));
//! assert!(validate_definition(&def).is_err());
//! ```

use std::collections::HashSet;

use synthdef_core::{BinaryOp, Rate, UnaryOp};
use synthdef_ugens::{ArgKind, UGenRegistry};

use crate::definition::{DefinitionFile, NodeConfig};
use crate::error::ConfigError;

/// Operator a node's `op` field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// One operand, `a`.
    Unary(UnaryOp),
    /// Two operands, `a` and `b`.
    Binary(BinaryOp),
    /// `in * mul + add`.
    MulAdd,
}

impl Operator {
    /// Resolves an operator name. Names shared by a unary and a binary
    /// operator pick the binary one when `binary` is set.
    pub fn resolve(name: &str, binary: bool) -> Option<Self> {
        if matches!(name, "mul_add" | "madd") {
            return Some(Operator::MulAdd);
        }
        let unary = UnaryOp::from_name(name).map(Operator::Unary);
        let binary_op = BinaryOp::from_name(name).map(Operator::Binary);
        if binary {
            binary_op.or(unary)
        } else {
            unary.or(binary_op)
        }
    }

    /// Operand names.
    pub const fn operands(self) -> &'static [&'static str] {
        match self {
            Operator::Unary(_) => &["a"],
            Operator::Binary(_) => &["a", "b"],
            Operator::MulAdd => &["in", "mul", "add"],
        }
    }

    /// Operand names that must be bound.
    pub const fn required(self) -> &'static [&'static str] {
        match self {
            Operator::Unary(_) => &["a"],
            Operator::Binary(_) => &["a", "b"],
            Operator::MulAdd => &["in"],
        }
    }
}

/// Validate a definition against the built-in registry.
pub fn validate_definition(def: &DefinitionFile) -> Result<(), ConfigError> {
    validate_with(def, &UGenRegistry::new())
}

/// Validate a definition against `registry`.
pub fn validate_with(def: &DefinitionFile, registry: &UGenRegistry) -> Result<(), ConfigError> {
    let params: HashSet<&str> = def.params.iter().map(|p| p.name.as_str()).collect();
    let mut ids: HashSet<&str> = HashSet::new();

    for (index, node) in def.nodes.iter().enumerate() {
        let label = node.label(index);
        validate_node(registry, node, &label)?;

        for (arg, value) in &node.args {
            if is_text_arg(registry, node, arg) {
                continue;
            }
            let mut unknown = None;
            value.for_each_reference(&mut |reference| {
                let known = split_reference(reference)
                    .is_some_and(|(name, _)| params.contains(name) || ids.contains(name));
                if !known && unknown.is_none() {
                    unknown = Some(reference.to_string());
                }
            });
            if let Some(reference) = unknown {
                return Err(ConfigError::UnknownReference {
                    node: label,
                    reference,
                });
            }
        }

        if let Some(id) = &node.id
            && (params.contains(id.as_str()) || !ids.insert(id.as_str()))
        {
            return Err(ConfigError::DuplicateNode(id.clone()));
        }
    }
    Ok(())
}

fn validate_node(registry: &UGenRegistry, node: &NodeConfig, label: &str) -> Result<(), ConfigError> {
    match (&node.ugen, &node.op) {
        (Some(_), Some(_)) => Err(ConfigError::invalid_node(label, "sets both 'ugen' and 'op'")),
        (None, None) => Err(ConfigError::invalid_node(label, "needs 'ugen' or 'op'")),
        (Some(name), None) => {
            let descriptor = registry
                .get(name)
                .ok_or_else(|| ConfigError::UnknownUGen(name.clone()))?;
            if let Some(rate) = &node.rate {
                let rate = parse_rate(rate, label)?;
                if !descriptor.supports(rate) {
                    return Err(ConfigError::invalid_node(
                        label,
                        format!("{name} does not run at {rate} rate"),
                    ));
                }
            }
            for arg in node.args.keys() {
                if !matches!(arg.as_str(), "mul" | "add") && descriptor.arg(arg).is_none() {
                    return Err(ConfigError::invalid_arg(label, arg, format!("not an argument of {name}")));
                }
            }
            for spec in descriptor.args {
                if spec.default.is_none() && spec.kind != ArgKind::Text && !node.args.contains_key(spec.name) {
                    return Err(ConfigError::invalid_arg(label, spec.name, "required argument is missing"));
                }
            }
            Ok(())
        }
        (None, Some(op)) => {
            if node.rate.is_some() {
                return Err(ConfigError::invalid_node(
                    label,
                    "operators take their rate from their operands",
                ));
            }
            let operator = Operator::resolve(op, node.args.contains_key("b"))
                .ok_or_else(|| ConfigError::UnknownOperator(op.clone()))?;
            for arg in node.args.keys() {
                if !operator.operands().contains(&arg.as_str()) {
                    return Err(ConfigError::invalid_arg(label, arg, format!("not an operand of {op}")));
                }
            }
            for operand in operator.required() {
                if !node.args.contains_key(*operand) {
                    return Err(ConfigError::invalid_arg(label, operand, "required operand is missing"));
                }
            }
            Ok(())
        }
    }
}

fn is_text_arg(registry: &UGenRegistry, node: &NodeConfig, arg: &str) -> bool {
    node.ugen
        .as_deref()
        .and_then(|name| registry.get(name))
        .and_then(|d| d.arg(arg))
        .is_some_and(|spec| spec.kind == ArgKind::Text)
}

/// Parses a node rate name.
pub(crate) fn parse_rate(name: &str, label: &str) -> Result<Rate, ConfigError> {
    Rate::from_name(name).ok_or_else(|| ConfigError::invalid_node(label, format!("unknown rate '{name}'")))
}

/// Splits `"name:channel"` into its parts. `None` when the channel is not
/// a number.
pub(crate) fn split_reference(reference: &str) -> Option<(&str, Option<usize>)> {
    match reference.rsplit_once(':') {
        Some((name, channel)) => channel.parse().ok().map(|c| (name, Some(c))),
        None => Some((reference, None)),
    }
}
