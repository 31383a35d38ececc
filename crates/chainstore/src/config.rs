use chainstore_core::db::DbOptions;
use chainstore_schema::{
    document::{EntityDocument, SchemaDocument},
    node::Schema,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid toml in {origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Schema(#[from] chainstore_schema::Error),
}

///
/// StoreConfig
///
/// Runtime settings plus the entity schema, read from TOML:
///
/// ```toml
/// debug = false
/// metrics = true
/// lock_timeout_ms = 5000
/// schema_path = "schema.toml"   # optional, relative to this file
///
/// [[entity]]
/// name = "Account"
/// id = "hex"
///
/// [[entity.field]]
/// name = "balance"
/// kind = "bigint"
/// ```
///
/// Inline entities and those in `schema_path` are validated together.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Log every store call at `info`.
    #[serde(default)]
    pub debug: bool,

    /// Keep in-memory metrics.
    #[serde(default = "StoreConfig::default_metrics")]
    pub metrics: bool,

    /// Longest wait, in milliseconds, for a key while another one is held.
    #[serde(default = "StoreConfig::default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Separate schema document; relative paths resolve against the config
    /// file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,

    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityDocument>,
}

impl StoreConfig {
    const fn default_metrics() -> bool {
        true
    }

    #[expect(clippy::cast_possible_truncation)]
    const fn default_lock_timeout_ms() -> u64 {
        DbOptions::DEFAULT_LOCK_TIMEOUT.as_millis() as u64
    }

    /// Parse a config from TOML text. `schema_path` stays as written.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: "config".to_string(),
            source,
        })?;
        config.check()?;

        Ok(config)
    }

    /// Read a config file, resolving `schema_path` against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read(path)?;

        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        if let (Some(schema), Some(dir)) = (config.schema_path.as_mut(), path.parent())
            && schema.is_relative()
        {
            *schema = dir.join(&*schema);
        }
        config.check()?;

        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.schema_path.is_none() && self.entities.is_empty() {
            return Err(ConfigError::Invalid(
                "no entities declared: set schema_path or add [[entity]] tables".to_string(),
            ));
        }

        Ok(())
    }

    /// Runtime options for the store.
    #[must_use]
    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            debug: self.debug,
            metrics: self.metrics,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }

    /// Load and validate the schema this config declares.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        let mut document = SchemaDocument {
            entities: self.entities.clone(),
        };

        if let Some(path) = &self.schema_path {
            let text = read(path)?;
            let file: SchemaDocument =
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    origin: path.display().to_string(),
                    source,
                })?;
            document.entities.extend(file.entities);
        }

        Ok(document.into_schema()?)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debug: false,
            metrics: Self::default_metrics(),
            lock_timeout_ms: Self::default_lock_timeout_ms(),
            schema_path: None,
            entities: Vec::new(),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        debug = true
        lock_timeout_ms = 250

        [[entity]]
        name = "Person"
        id = "text"

        [[entity.field]]
        name = "age"
        kind = "int"
    "#;

    #[test]
    fn settings_map_to_db_options() {
        let config = StoreConfig::from_toml_str(CONFIG).expect("config should parse");
        let options = config.db_options();

        assert!(options.debug);
        assert!(options.metrics);
        assert_eq!(options.lock_timeout, Duration::from_millis(250));
    }

    #[test]
    fn inline_entities_build_a_schema() {
        let schema = StoreConfig::from_toml_str(CONFIG)
            .unwrap()
            .schema()
            .expect("inline schema should validate");

        assert_eq!(schema.entity_names(), ["Person"]);
    }

    #[test]
    fn defaults_fill_omitted_settings() {
        let config = StoreConfig::from_toml_str(
            r#"
            [[entity]]
            name = "Person"
            id = "text"
            "#,
        )
        .unwrap();

        assert!(!config.debug);
        assert_eq!(config.db_options(), DbOptions::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = StoreConfig::from_toml_str(&CONFIG.replace("250", "0")).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_without_entities_is_rejected() {
        let err = StoreConfig::from_toml_str("debug = true").unwrap_err();

        assert!(err.to_string().contains("no entities declared"));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = StoreConfig::from_toml_str("verbose = true").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
