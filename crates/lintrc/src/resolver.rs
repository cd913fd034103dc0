use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::config::{
    ConfigArray, ConfigLayer, ConfigObject, OverrideBlock, PresetRegistry, RuleLevel, RuleSet,
    RuleSetting, TargetPath,
};
use crate::error::ConfigError;

/// Effective rules for one file: `base` with every matching override block
/// merged on top, in declaration order. A later block's setting for a rule
/// fully replaces any earlier one.
pub fn resolve(
    base: &RuleSet,
    overrides: &[OverrideBlock],
    target_path: &str,
) -> Result<RuleSet, ConfigError> {
    let path = TargetPath::parse(target_path)?;
    let mut rules = base.clone();
    for (index, block) in overrides.iter().enumerate() {
        if block.matches(&path) {
            trace!(path = %path, block = index, "override matched");
            rules.merge(block.rules());
        }
    }
    Ok(rules)
}

/// Like [`resolve`], but also merges the `env` flags of matching blocks.
pub fn resolve_effective(
    base: &RuleSet,
    overrides: &[OverrideBlock],
    target_path: &str,
) -> Result<EffectiveConfig, ConfigError> {
    let path = TargetPath::parse(target_path)?;
    let mut config = EffectiveConfig {
        rules: base.clone(),
        ..Default::default()
    };
    for (index, block) in overrides.iter().enumerate() {
        if block.matches(&path) {
            trace!(path = %path, block = index, "override matched");
            config.rules.merge(block.rules());
            merge_env(&mut config.env, block.env());
        }
    }
    Ok(config)
}

/// Run the whole pipeline on a raw document: expand presets, validate every
/// rule setting and pattern, then resolve for `target_path`.
pub fn resolve_document(
    doc: &ConfigObject,
    registry: &PresetRegistry,
    target_path: &str,
) -> Result<EffectiveConfig, ConfigError> {
    let array = ConfigArray::from_document(doc, registry)?;
    let path = TargetPath::parse(target_path)?;
    Ok(array.extract(&path))
}

/// Fully resolved configuration of one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub env: BTreeMap<String, bool>,
    pub globals: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    pub parser_options: Map<String, Value>,
    pub plugins: Vec<String>,
    pub rules: RuleSet,
    pub settings: Map<String, Value>,
}

impl EffectiveConfig {
    /// Merge one layer on top. Mappings merge key by key at the top level,
    /// `parser` is replaced, plugins are appended once.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        merge_env(&mut self.env, &layer.env);
        merge_map(&mut self.globals, &layer.globals);
        if let Some(parser) = &layer.parser {
            self.parser = Some(parser.clone());
        }
        merge_map(&mut self.parser_options, &layer.parser_options);
        for plugin in &layer.plugins {
            if !self.plugins.contains(plugin) {
                self.plugins.push(plugin.clone());
            }
        }
        self.rules.merge(&layer.rules);
        merge_map(&mut self.settings, &layer.settings);
    }

    pub fn rule(&self, name: &str) -> Option<&RuleSetting> {
        self.rules.get(name)
    }

    /// Severity of `name`; rules that are never mentioned are off.
    pub fn severity(&self, name: &str) -> RuleLevel {
        self.rule(name)
            .map(|setting| setting.level)
            .unwrap_or(RuleLevel::Off)
    }
}

fn merge_env(dst: &mut BTreeMap<String, bool>, src: &BTreeMap<String, bool>) {
    for (name, enabled) in src {
        dst.insert(name.clone(), *enabled);
    }
}

fn merge_map(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}
