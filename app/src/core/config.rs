//! # appstrap Configuration Store
//!
//! File: app/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration store: the resolved values behind
//! the dotted keys a schema declares. Values are layered — explicit `set`
//! overrides a runtime `set_default`, which overrides the schema default —
//! and the whole store is validated against the schema by `build()`.
//!
//! ## Architecture
//!
//! The store follows these principles:
//! - Every settable key must exist in the schema; setting an unknown key
//!   fails with a configuration error.
//! - Reads before `build()` see the layered value without validation, the
//!   declared default when nothing was set, and fail only on unknown keys.
//! - `build()` validates every layered value (type, integer bounds) and
//!   materializes the resolved mapping; any later write invalidates it.
//!
//! Configuration sources (in order of precedence):
//! 1. Explicit `set` calls (including TOML file overrides via `load_file`)
//! 2. Runtime defaults installed with `set_default`
//! 3. Defaults declared in the schema
//!
use crate::core::error::{AppError, Result};
use crate::core::schema::{ConfigSchema, ConfigValue};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Schema-validated configuration values, addressed by dotted key.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    schema: ConfigSchema,
    defaults: BTreeMap<String, ConfigValue>,
    values: BTreeMap<String, ConfigValue>,
    resolved: Option<BTreeMap<String, ConfigValue>>,
}

impl ConfigStore {
    pub fn new(schema: ConfigSchema) -> Self {
        Self {
            schema,
            defaults: BTreeMap::new(),
            values: BTreeMap::new(),
            resolved: None,
        }
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Render the schema as its YAML-like documentation block.
    pub fn dump_schema(&self) -> String {
        self.schema.dump()
    }

    /// Set an explicit value. The key must exist in the schema.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        self.known(key)?;
        self.values.insert(key.to_string(), value.into());
        self.resolved = None;
        Ok(())
    }

    /// Install a runtime default: consulted when no explicit value was set,
    /// before falling back to the schema default.
    pub fn set_default(&mut self, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        self.known(key)?;
        self.defaults.insert(key.to_string(), value.into());
        self.resolved = None;
        Ok(())
    }

    /// Read the layered value for `key`. Before `build()` this resolves
    /// through the layers without validation; afterwards it reads the
    /// materialized mapping. Unknown keys fail.
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        let leaf = self.known(key)?;
        if let Some(resolved) = &self.resolved {
            return Ok(resolved.get(key).cloned().unwrap_or(ConfigValue::Null));
        }
        Ok(self
            .values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .cloned()
            .unwrap_or_else(|| leaf.default_value()))
    }

    /// String accessor; `Null` reads as `None`.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Str(s) => Ok(Some(s)),
            other => Err(AppError::Config(format!(
                "key '{key}': expected string, got {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Boolean accessor; `Null` reads as `None`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Bool(b) => Ok(Some(b)),
            other => Err(AppError::Config(format!(
                "key '{key}': expected boolean, got {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Integer accessor; `Null` reads as `None`.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Int(i) => Ok(Some(i)),
            other => Err(AppError::Config(format!(
                "key '{key}': expected integer, got {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Like `get_str`, but an unknown key reads as `None` instead of failing.
    /// Used by the bootstrap for its own keys, which a replacement schema may
    /// legitimately not declare.
    pub fn lookup_str(&self, key: &str) -> Result<Option<String>> {
        if self.schema.leaf(key).is_none() {
            return Ok(None);
        }
        self.get_str(key)
    }

    /// Validate every layered value against the schema and materialize the
    /// resolved mapping.
    pub fn build(&mut self) -> Result<()> {
        let mut resolved = BTreeMap::new();
        for (key, leaf) in self.schema.leaves() {
            let value = self
                .values
                .get(key)
                .or_else(|| self.defaults.get(key))
                .cloned()
                .unwrap_or_else(|| leaf.default_value());
            leaf.validate(key, &value)?;
            resolved.insert(key.clone(), value);
        }
        debug!("configuration built: {} keys resolved", resolved.len());
        self.resolved = Some(resolved);
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.resolved.is_some()
    }

    /// Apply overrides from a TOML file. Tables become dotted-key prefixes;
    /// scalar values are applied through `set`, so unknown keys fail.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        info!("loading configuration overrides from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("cannot parse configuration file {}", path.display()))?;
        let table = value.as_table().ok_or_else(|| {
            AppError::Config(format!(
                "configuration file {} is not a table",
                path.display()
            ))
        })?;
        self.apply_table(None, table)
    }

    fn apply_table(&mut self, prefix: Option<&str>, table: &toml::value::Table) -> Result<()> {
        for (name, value) in table {
            let key = match prefix {
                Some(p) => format!("{p}.{name}"),
                None => name.clone(),
            };
            match value {
                toml::Value::Table(inner) => self.apply_table(Some(&key), inner)?,
                toml::Value::Boolean(b) => self.set(&key, *b)?,
                toml::Value::Integer(i) => self.set(&key, *i)?,
                toml::Value::String(s) => self.set(&key, s.as_str())?,
                other => {
                    return Err(AppError::Config(format!(
                        "key '{key}': unsupported value type '{}'",
                        other.type_str()
                    ))
                    .into())
                }
            }
        }
        Ok(())
    }

    fn known(&self, key: &str) -> Result<&crate::core::schema::LeafSpec> {
        self.schema
            .leaf(key)
            .ok_or_else(|| AppError::Config(format!("unknown configuration key '{key}'")).into())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::tests::test_schema;
    use std::io::Write;

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut store = ConfigStore::new(test_schema());
        let err = store.set("application.no_such_key", true).unwrap_err();
        assert!(err
            .to_string()
            .contains("unknown configuration key 'application.no_such_key'"));
        assert!(store.get("application.no_such_key").is_err());
    }

    #[test]
    fn test_layer_precedence() {
        let mut store = ConfigStore::new(test_schema());
        // Schema default first.
        assert_eq!(
            store.get("application.positive_number").unwrap(),
            ConfigValue::Int(100)
        );
        // Runtime default overrides the schema default.
        store.set_default("application.positive_number", 42).unwrap();
        assert_eq!(
            store.get("application.positive_number").unwrap(),
            ConfigValue::Int(42)
        );
        // Explicit set overrides both.
        store.set("application.positive_number", 7).unwrap();
        assert_eq!(
            store.get("application.positive_number").unwrap(),
            ConfigValue::Int(7)
        );
    }

    #[test]
    fn test_get_before_build_returns_default() {
        let store = ConfigStore::new(test_schema());
        assert_eq!(
            store.get("application.true_or_false").unwrap(),
            ConfigValue::Bool(false)
        );
        assert_eq!(store.get("application.this_is_a_string").unwrap(), ConfigValue::Null);
    }

    #[test]
    fn test_build_applies_validation() {
        let mut store = ConfigStore::new(test_schema());
        store.set("application.positive_number", -5).unwrap();
        let err = store.build().unwrap_err();
        assert!(err.to_string().contains("below the minimum 0"));
        assert!(!store.is_built());

        store.set("application.positive_number", 5).unwrap();
        store.build().unwrap();
        assert!(store.is_built());
        assert_eq!(
            store.get("application.positive_number").unwrap(),
            ConfigValue::Int(5)
        );
    }

    #[test]
    fn test_write_invalidates_build() {
        let mut store = ConfigStore::new(test_schema());
        store.build().unwrap();
        assert!(store.is_built());
        store.set("application.true_or_false", true).unwrap();
        assert!(!store.is_built());
    }

    #[test]
    fn test_typed_accessors() {
        let mut store = ConfigStore::new(test_schema());
        store.set("application.this_is_a_string", "hello").unwrap();
        assert_eq!(
            store.get_str("application.this_is_a_string").unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(store.get_str("application.another_string").unwrap(), None);
        assert_eq!(store.get_bool("application.true_or_false").unwrap(), Some(false));
        assert_eq!(store.get_int("application.positive_number").unwrap(), Some(100));

        let err = store.get_int("application.this_is_a_string").unwrap_err();
        assert!(err.to_string().contains("expected integer, got string"));
    }

    #[test]
    fn test_set_null_clears_value() {
        let mut store = ConfigStore::new(test_schema());
        store.set("application.this_is_a_string", "x").unwrap();
        store
            .set("application.this_is_a_string", ConfigValue::Null)
            .unwrap();
        assert_eq!(store.get_str("application.this_is_a_string").unwrap(), None);
    }

    #[test]
    fn test_lookup_str_on_unknown_key() {
        let store = ConfigStore::new(test_schema());
        assert_eq!(store.lookup_str("application.log.directory").unwrap(), None);
    }

    #[test]
    fn test_load_file_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[application]\ntrue_or_false = true\npositive_number = 12\nthis_is_a_string = \"from file\""
        )
        .unwrap();

        let mut store = ConfigStore::new(test_schema());
        store.load_file(&path).unwrap();
        assert_eq!(store.get_bool("application.true_or_false").unwrap(), Some(true));
        assert_eq!(store.get_int("application.positive_number").unwrap(), Some(12));
        assert_eq!(
            store.get_str("application.this_is_a_string").unwrap(),
            Some("from file".to_string())
        );
    }

    #[test]
    fn test_load_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.toml");
        fs::write(&path, "[application]\nbogus = 1\n").unwrap();

        let mut store = ConfigStore::new(test_schema());
        let err = store.load_file(&path).unwrap_err();
        assert!(err.to_string().contains("unknown configuration key"));
    }
}
