use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// On-disk shape of an `.eslintrc.json` document (and of every preset).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigObject {
    pub root: bool,
    pub env: BTreeMap<String, bool>,
    #[serde(deserialize_with = "one_or_many")]
    pub extends: Vec<String>,
    pub plugins: Vec<String>,
    pub parser: Option<String>,
    pub parser_options: Map<String, Value>,
    pub settings: Map<String, Value>,
    pub globals: Map<String, Value>,
    pub rules: Map<String, Value>,
    pub overrides: Vec<OverrideObject>,
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverrideObject {
    #[serde(deserialize_with = "one_or_many")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub excluded_files: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub parser: Option<String>,
    #[serde(default)]
    pub parser_options: Map<String, Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub globals: Map<String, Value>,
    #[serde(default)]
    pub rules: Map<String, Value>,
    #[serde(default)]
    pub overrides: Vec<OverrideObject>,
}

impl ConfigObject {
    /// Parse a document from JSON text. `origin` names the document in errors.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content)
            .map_err(|err| ConfigError::InvalidDocument(format!("{origin}: {err}")))
    }

    pub fn from_value(value: Value, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_value(value)
            .map_err(|err| ConfigError::InvalidDocument(format!("{origin}: {err}")))
    }
}

impl OverrideObject {
    /// The block's own keys as a standalone document, so that it can be
    /// flattened the same way a top-level document is.
    pub fn to_config_object(&self) -> ConfigObject {
        ConfigObject {
            root: false,
            env: self.env.clone(),
            extends: self.extends.clone(),
            plugins: self.plugins.clone(),
            parser: self.parser.clone(),
            parser_options: self.parser_options.clone(),
            settings: self.settings.clone(),
            globals: self.globals.clone(),
            rules: self.rules.clone(),
            overrides: self.overrides.clone(),
            ignore_patterns: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}
