//! # appstrap Configuration Schema
//!
//! File: app/src/core/schema.rs
//!
//! ## Overview
//!
//! This module implements the declarative configuration schema: which dotted
//! keys an application recognizes, what type each one has, its default value,
//! integer bounds, and a one-line description. The schema is built once with
//! a small builder DSL and validated when it is finished, so malformed
//! definitions fail at construction time, never at use time.
//!
//! ## Architecture
//!
//! - `SchemaBuilder` collects nodes (`bool`, `int`, `str`) and nested
//!   `section`s; `finish()` validates the whole definition and produces an
//!   immutable `ConfigSchema`.
//! - `ConfigSchema` keeps both the declaration-ordered tree (for `dump()`)
//!   and a flat dotted-key map (for lookups by the configuration store).
//! - `dump()` renders the effective schema as a YAML-like text block with
//!   each description as a `#` comment line. The output is byte-stable for an
//!   unchanged definition and is used for documentation generation and
//!   regression testing.
//!
//! The built-in application schema (`application_schema`) declares the keys
//! the bootstrap itself consumes: the application identity and the log
//! handler settings.
//!
use crate::core::error::{AppError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Configuration keys understood by the bootstrap core.
pub const APPLICATION_NAME: &str = "application.name";
pub const APPLICATION_VERSION: &str = "application.version";
pub const LOG_DIRECTORY: &str = "application.log.directory";
pub const LOG_FILENAME: &str = "application.log.filename";
pub const LOG_OUTPUT_FORMAT: &str = "application.log.output_format";
pub const LOG_DATE_FORMAT: &str = "application.log.date_format";

/// A typed configuration value. `Null` represents an unset scalar and is
/// accepted by every node type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    /// Human-readable type name used in validation error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) => "integer",
            ConfigValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "~"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => ConfigValue::Null,
        }
    }
}

/// Type and constraints of a single leaf node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Bool {
        default: Option<bool>,
    },
    Int {
        default: Option<i64>,
        min: Option<i64>,
        max: Option<i64>,
    },
    Str {
        default: Option<String>,
    },
}

impl NodeKind {
    fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Bool { .. } => "boolean",
            NodeKind::Int { .. } => "integer",
            NodeKind::Str { .. } => "string",
        }
    }
}

/// A leaf node of the schema: kind plus an optional description line.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    kind: NodeKind,
    info: Option<String>,
}

impl LeafSpec {
    /// The declared default, with an absent default reported as `Null`.
    pub fn default_value(&self) -> ConfigValue {
        match &self.kind {
            NodeKind::Bool { default } => default.map(ConfigValue::Bool).unwrap_or(ConfigValue::Null),
            NodeKind::Int { default, .. } => default.map(ConfigValue::Int).unwrap_or(ConfigValue::Null),
            NodeKind::Str { default } => default
                .clone()
                .map(ConfigValue::Str)
                .unwrap_or(ConfigValue::Null),
        }
    }

    /// Validate a value against this node. `Null` is always accepted; it
    /// means "unset".
    pub fn validate(&self, key: &str, value: &ConfigValue) -> Result<()> {
        if matches!(value, ConfigValue::Null) {
            return Ok(());
        }
        match (&self.kind, value) {
            (NodeKind::Bool { .. }, ConfigValue::Bool(_)) => Ok(()),
            (NodeKind::Str { .. }, ConfigValue::Str(_)) => Ok(()),
            (NodeKind::Int { min, max, .. }, ConfigValue::Int(i)) => {
                if let Some(min) = min {
                    if i < min {
                        return Err(AppError::Config(format!(
                            "key '{key}': value {i} is below the minimum {min}"
                        ))
                        .into());
                    }
                }
                if let Some(max) = max {
                    if i > max {
                        return Err(AppError::Config(format!(
                            "key '{key}': value {i} is above the maximum {max}"
                        ))
                        .into());
                    }
                }
                Ok(())
            }
            (kind, value) => Err(AppError::Config(format!(
                "key '{key}': expected {}, got {}",
                kind.type_name(),
                value.type_name()
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone)]
enum SchemaNode {
    Leaf { name: String, spec: LeafSpec },
    Section { name: String, children: Vec<SchemaNode> },
}

/// An immutable, validated configuration schema.
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    root: String,
    nodes: Vec<SchemaNode>,
    leaves: BTreeMap<String, LeafSpec>,
}

impl ConfigSchema {
    /// Look up a leaf by its dotted key (including the root segment).
    pub fn leaf(&self, key: &str) -> Option<&LeafSpec> {
        self.leaves.get(key)
    }

    /// All leaves, keyed by dotted path.
    pub fn leaves(&self) -> impl Iterator<Item = (&String, &LeafSpec)> {
        self.leaves.iter()
    }

    /// Name of the root node (the first segment of every key).
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Render the schema as a YAML-like text block. Each described node gets
    /// a `#` comment line preceded by a blank line; keys are padded so the
    /// values line up. The output is byte-stable for an unchanged definition.
    pub fn dump(&self) -> String {
        let mut out = format!("{}:\n", self.root);
        Self::dump_nodes(&mut out, &self.nodes, 4);
        out
    }

    fn dump_nodes(out: &mut String, nodes: &[SchemaNode], indent: usize) {
        let pad = " ".repeat(indent);
        for node in nodes {
            match node {
                SchemaNode::Leaf { name, spec } => {
                    if let Some(info) = &spec.info {
                        out.push('\n');
                        out.push_str(&format!("{pad}# {info}\n"));
                    }
                    let value = Self::render_default(&spec.default_value());
                    out.push_str(&format!("{pad}{:<21} {value}\n", format!("{name}:")));
                }
                SchemaNode::Section { name, children } => {
                    out.push('\n');
                    out.push_str(&format!("{pad}{name}:\n"));
                    Self::dump_nodes(out, children, indent + 4);
                }
            }
        }
    }

    fn render_default(value: &ConfigValue) -> String {
        match value {
            ConfigValue::Str(s) if s.is_empty() => "''".to_string(),
            other => other.to_string(),
        }
    }
}

/// Builder node for a boolean leaf.
#[derive(Debug, Default)]
pub struct BoolNode {
    default: Option<bool>,
    info: Option<String>,
}

impl BoolNode {
    pub fn default_value(mut self, v: bool) -> Self {
        self.default = Some(v);
        self
    }

    pub fn info(mut self, s: &str) -> Self {
        self.info = Some(s.to_string());
        self
    }
}

/// Builder node for a bounded integer leaf.
#[derive(Debug, Default)]
pub struct IntNode {
    default: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
    info: Option<String>,
}

impl IntNode {
    pub fn default_value(mut self, v: i64) -> Self {
        self.default = Some(v);
        self
    }

    pub fn min(mut self, v: i64) -> Self {
        self.min = Some(v);
        self
    }

    pub fn max(mut self, v: i64) -> Self {
        self.max = Some(v);
        self
    }

    pub fn info(mut self, s: &str) -> Self {
        self.info = Some(s.to_string());
        self
    }
}

/// Builder node for a string leaf.
#[derive(Debug, Default)]
pub struct StrNode {
    default: Option<String>,
    info: Option<String>,
}

impl StrNode {
    pub fn default_value(mut self, v: &str) -> Self {
        self.default = Some(v.to_string());
        self
    }

    pub fn info(mut self, s: &str) -> Self {
        self.info = Some(s.to_string());
        self
    }
}

/// Declarative schema builder. Nodes are declared in display order; the
/// definition is validated as a whole by `finish()`.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    nodes: Vec<SchemaNode>,
}

impl SchemaBuilder {
    /// Start a schema rooted at `name` (the first segment of every key).
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Declare a boolean node.
    pub fn bool(mut self, key: &str, f: impl FnOnce(BoolNode) -> BoolNode) -> Self {
        let node = f(BoolNode::default());
        self.nodes.push(SchemaNode::Leaf {
            name: key.to_string(),
            spec: LeafSpec {
                kind: NodeKind::Bool { default: node.default },
                info: node.info,
            },
        });
        self
    }

    /// Declare a bounded integer node.
    pub fn int(mut self, key: &str, f: impl FnOnce(IntNode) -> IntNode) -> Self {
        let node = f(IntNode::default());
        self.nodes.push(SchemaNode::Leaf {
            name: key.to_string(),
            spec: LeafSpec {
                kind: NodeKind::Int {
                    default: node.default,
                    min: node.min,
                    max: node.max,
                },
                info: node.info,
            },
        });
        self
    }

    /// Declare a string node.
    pub fn str(mut self, key: &str, f: impl FnOnce(StrNode) -> StrNode) -> Self {
        let node = f(StrNode::default());
        self.nodes.push(SchemaNode::Leaf {
            name: key.to_string(),
            spec: LeafSpec {
                kind: NodeKind::Str { default: node.default },
                info: node.info,
            },
        });
        self
    }

    /// Declare a nested section; its children get `name.` prefixed to their
    /// dotted keys.
    pub fn section(mut self, name: &str, f: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        let child = f(SchemaBuilder::root(name));
        self.nodes.push(SchemaNode::Section {
            name: child.name,
            children: child.nodes,
        });
        self
    }

    /// Validate the definition and produce the immutable schema. Duplicate
    /// keys, empty names, and defaults outside their own bounds are reported
    /// here rather than when the schema is used.
    pub fn finish(self) -> Result<ConfigSchema> {
        if self.name.is_empty() {
            return Err(AppError::Schema("root name cannot be empty".to_string()).into());
        }
        let mut leaves = BTreeMap::new();
        Self::collect(&self.name, &self.nodes, &mut leaves)?;
        Ok(ConfigSchema {
            root: self.name,
            nodes: self.nodes,
            leaves,
        })
    }

    fn collect(
        prefix: &str,
        nodes: &[SchemaNode],
        leaves: &mut BTreeMap<String, LeafSpec>,
    ) -> Result<()> {
        for node in nodes {
            match node {
                SchemaNode::Leaf { name, spec } => {
                    if name.is_empty() {
                        return Err(AppError::Schema(format!(
                            "node under '{prefix}' has an empty name"
                        ))
                        .into());
                    }
                    let key = format!("{prefix}.{name}");
                    if let NodeKind::Int { default, min, max } = &spec.kind {
                        if let (Some(min), Some(max)) = (min, max) {
                            if min > max {
                                return Err(AppError::Schema(format!(
                                    "key '{key}': minimum {min} exceeds maximum {max}"
                                ))
                                .into());
                            }
                        }
                        if let Some(d) = default {
                            spec.validate(&key, &ConfigValue::Int(*d)).map_err(|_| {
                                AppError::Schema(format!(
                                    "key '{key}': default {d} is outside its declared bounds"
                                ))
                            })?;
                        }
                    }
                    if leaves.insert(key.clone(), spec.clone()).is_some() {
                        return Err(
                            AppError::Schema(format!("duplicate key '{key}'")).into()
                        );
                    }
                }
                SchemaNode::Section { name, children } => {
                    if name.is_empty() {
                        return Err(AppError::Schema(format!(
                            "section under '{prefix}' has an empty name"
                        ))
                        .into());
                    }
                    Self::collect(&format!("{prefix}.{name}"), children, leaves)?;
                }
            }
        }
        Ok(())
    }
}

/// The schema of the keys the bootstrap core itself consumes: application
/// identity plus the log handler settings. Log format defaults are applied
/// by the logger builder so the schema stays free of pattern strings.
pub fn application_schema() -> ConfigSchema {
    SchemaBuilder::root("application")
        .str("name", |n| n.info("Application name."))
        .str("version", |n| n.info("Application version."))
        .section("log", |log| {
            log.str("directory", |n| {
                n.info("Directory for the log file. File logging is disabled when unset.")
            })
            .str("filename", |n| {
                n.info("Log file name. Defaults to <application name>.log.")
            })
            .str("output_format", |n| n.info("Line format for file log records."))
            .str("date_format", |n| n.info("Date format for file log records."))
        })
        .finish()
        .expect("built-in application schema is valid")
}

// --- Unit Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Dump of the reference schema used across the store tests. Regression
    /// guard: the rendering must stay byte-identical for an unchanged
    /// definition.
    const DUMPED_SCHEMA: &str = "application:

    # True or false.
    true_or_false:        false

    # A number between 0 and 100.
    positive_number:      100

    # A string
    this_is_a_string:     ~
    another_string:       ~
";

    pub(crate) fn test_schema() -> ConfigSchema {
        SchemaBuilder::root("application")
            .bool("true_or_false", |n| n.default_value(false).info("True or false."))
            .int("positive_number", |n| {
                n.default_value(100).min(0).info("A number between 0 and 100.")
            })
            .str("this_is_a_string", |n| n.info("A string"))
            .str("another_string", |n| n)
            .finish()
            .unwrap()
    }

    #[test]
    fn test_dump_is_stable() {
        assert_eq!(test_schema().dump(), DUMPED_SCHEMA);
        // An unchanged definition dumps identically on every build.
        assert_eq!(test_schema().dump(), test_schema().dump());
    }

    #[test]
    fn test_leaf_lookup() {
        let schema = test_schema();
        assert!(schema.leaf("application.true_or_false").is_some());
        assert!(schema.leaf("application.no_such_key").is_none());
        assert_eq!(
            schema.leaf("application.positive_number").unwrap().default_value(),
            ConfigValue::Int(100)
        );
        assert_eq!(
            schema.leaf("application.this_is_a_string").unwrap().default_value(),
            ConfigValue::Null
        );
    }

    #[test]
    fn test_duplicate_key_fails_at_finish() {
        let err = SchemaBuilder::root("application")
            .bool("flag", |n| n)
            .bool("flag", |n| n)
            .finish()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate key 'application.flag'"));
    }

    #[test]
    fn test_default_outside_bounds_fails_at_finish() {
        let err = SchemaBuilder::root("application")
            .int("count", |n| n.default_value(200).min(0).max(100))
            .finish()
            .unwrap_err();
        assert!(err.to_string().contains("outside its declared bounds"));
    }

    #[test]
    fn test_inverted_bounds_fail_at_finish() {
        let err = SchemaBuilder::root("application")
            .int("count", |n| n.min(10).max(5))
            .finish()
            .unwrap_err();
        assert!(err.to_string().contains("minimum 10 exceeds maximum 5"));
    }

    #[test]
    fn test_empty_names_fail_at_finish() {
        let err = SchemaBuilder::root("application")
            .str("", |n| n)
            .finish()
            .unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn test_validate_values() {
        let schema = test_schema();
        let number = schema.leaf("application.positive_number").unwrap();
        assert!(number.validate("application.positive_number", &ConfigValue::Int(0)).is_ok());
        assert!(number.validate("application.positive_number", &ConfigValue::Null).is_ok());
        let err = number
            .validate("application.positive_number", &ConfigValue::Int(-1))
            .unwrap_err();
        assert!(err.to_string().contains("below the minimum 0"));
        let err = number
            .validate("application.positive_number", &ConfigValue::Str("ten".into()))
            .unwrap_err();
        assert!(err.to_string().contains("expected integer, got string"));
    }

    #[test]
    fn test_application_schema_keys() {
        let schema = application_schema();
        for key in [
            APPLICATION_NAME,
            APPLICATION_VERSION,
            LOG_DIRECTORY,
            LOG_FILENAME,
            LOG_OUTPUT_FORMAT,
            LOG_DATE_FORMAT,
        ] {
            assert!(schema.leaf(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_application_schema_dump_mentions_every_key() {
        let dump = application_schema().dump();
        for fragment in ["name:", "version:", "log:", "directory:", "filename:"] {
            assert!(dump.contains(fragment), "dump misses {fragment}");
        }
    }
}
