use std::collections::BTreeMap;
use std::path::Path;

use itertools::Itertools;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::resolver::EffectiveConfig;

use super::config_object::ConfigObject;
use super::presets::{normalize_plugin_name, Preset, PresetRegistry};
use super::{FileMatcher, RuleSet, TargetPath};

/// One flattened slice of configuration: the keys of a single document,
/// preset or override block, plus the file patterns that gate it.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
    /// Every matcher must accept the path; empty means the layer always applies.
    pub(crate) scope: Vec<FileMatcher>,
    /// Directory (relative to the resolution root) the patterns are relative to.
    pub(crate) prefix: String,
    pub(crate) env: BTreeMap<String, bool>,
    pub(crate) globals: Map<String, Value>,
    pub(crate) parser: Option<String>,
    pub(crate) parser_options: Map<String, Value>,
    pub(crate) plugins: Vec<String>,
    pub(crate) rules: RuleSet,
    pub(crate) settings: Map<String, Value>,
}

impl ConfigLayer {
    fn from_document(doc: &ConfigObject, scope: &[FileMatcher]) -> Result<Self, ConfigError> {
        Ok(Self {
            scope: scope.to_vec(),
            prefix: String::new(),
            env: doc.env.clone(),
            globals: doc.globals.clone(),
            parser: doc.parser.clone(),
            parser_options: doc.parser_options.clone(),
            plugins: doc
                .plugins
                .iter()
                .map(|name| normalize_plugin_name(name))
                .collect(),
            rules: RuleSet::from_map(&doc.rules)?,
            settings: doc.settings.clone(),
        })
    }

    pub fn applies_to(&self, path: &TargetPath) -> bool {
        if self.scope.is_empty() {
            return true;
        }
        let Some(relative) = path.strip_dir(&self.prefix) else {
            return false;
        };
        self.scope.iter().all(|matcher| matcher.is_match(relative))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// The ordered layers of one config document with its presets expanded.
///
/// Layers are stored lowest priority first: plugin presets, `extends`
/// presets, the document's own keys, then each override block (whose own
/// presets and nested blocks are expanded in place).
#[derive(Debug, Clone, Default)]
pub struct ConfigArray {
    layers: Vec<ConfigLayer>,
}

impl ConfigArray {
    /// Flatten an in-memory document. File-path `extends` are not available.
    pub fn from_document(
        doc: &ConfigObject,
        registry: &PresetRegistry,
    ) -> Result<Self, ConfigError> {
        Self::load(doc, registry, None, "<inline config>")
    }

    /// Flatten a document named `name`, resolving file-path `extends` from `base_dir`.
    pub fn load(
        doc: &ConfigObject,
        registry: &PresetRegistry,
        base_dir: Option<&Path>,
        name: &str,
    ) -> Result<Self, ConfigError> {
        let mut array = Self::default();
        let mut chain = vec![name.to_string()];
        array.flatten(doc, registry, base_dir, name, &[], &mut chain)?;
        Ok(array)
    }

    /// Re-root every pattern-gated layer below directory `prefix`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for layer in &mut self.layers {
            layer.prefix = prefix.to_string();
        }
        self
    }

    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    pub fn apply_to(&self, path: &TargetPath, config: &mut EffectiveConfig) {
        for layer in self.layers.iter().filter(|layer| layer.applies_to(path)) {
            config.apply(layer);
        }
    }

    pub fn extract(&self, path: &TargetPath) -> EffectiveConfig {
        let mut config = EffectiveConfig::default();
        self.apply_to(path, &mut config);
        config
    }

    fn flatten(
        &mut self,
        doc: &ConfigObject,
        registry: &PresetRegistry,
        base_dir: Option<&Path>,
        name: &str,
        scope: &[FileMatcher],
        chain: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        for plugin in &doc.plugins {
            if let Some(preset) = registry.resolve_plugin(plugin, name)? {
                // a plugin preset may list its own plugin
                if chain.contains(&preset.key) {
                    continue;
                }
                self.flatten_preset(preset, registry, scope, chain)?;
            }
        }

        for entry in &doc.extends {
            let preset = registry.resolve_extends(entry, name, base_dir)?;
            self.flatten_preset(preset, registry, scope, chain)?;
        }

        self.layers.push(ConfigLayer::from_document(doc, scope)?);

        for block in &doc.overrides {
            let mut child_scope = scope.to_vec();
            child_scope.push(FileMatcher::new(&block.files, &block.excluded_files)?);
            self.flatten(
                &block.to_config_object(),
                registry,
                base_dir,
                name,
                &child_scope,
                chain,
            )?;
        }
        Ok(())
    }

    fn flatten_preset(
        &mut self,
        preset: Preset,
        registry: &PresetRegistry,
        scope: &[FileMatcher],
        chain: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        if chain.contains(&preset.key) {
            let cycle = chain.iter().chain(std::iter::once(&preset.key)).join(" -> ");
            return Err(ConfigError::CircularPreset(cycle));
        }

        chain.push(preset.key.clone());
        let result = self.flatten(
            &preset.object,
            registry,
            preset.base_dir.as_deref(),
            &preset.key,
            scope,
            chain,
        );
        chain.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleLevel;
    use serde_json::json;

    fn doc(value: Value) -> ConfigObject {
        ConfigObject::from_value(value, "test").unwrap()
    }

    fn level(config: &EffectiveConfig, rule: &str) -> Option<RuleLevel> {
        config.rules.get(rule).map(|setting| setting.level)
    }

    #[test]
    fn presets_come_before_own_rules() {
        let registry = PresetRegistry::new();
        let array = ConfigArray::from_document(
            &doc(json!({
                "extends": ["eslint:recommended", "prettier"],
                "rules": {"no-debugger": "warn"}
            })),
            &registry,
        )
        .unwrap();
        let config = array.extract(&TargetPath::parse("src/index.js").unwrap());

        assert_eq!(level(&config, "no-debugger"), Some(RuleLevel::Warn));
        assert_eq!(level(&config, "no-undef"), Some(RuleLevel::Error));
        // prettier comes after eslint:recommended
        assert_eq!(level(&config, "no-mixed-spaces-and-tabs"), Some(RuleLevel::Off));
    }

    #[test]
    fn layers_are_ordered_lowest_priority_first() {
        let mut registry = PresetRegistry::empty();
        registry.register("shared", doc(json!({"rules": {"semi": "error"}})));
        let array = ConfigArray::from_document(
            &doc(json!({
                "extends": "shared",
                "rules": {"semi": "warn"},
                "overrides": [{"files": ["*.ts"], "rules": {"semi": "off"}}]
            })),
            &registry,
        )
        .unwrap();

        let levels: Vec<_> = array
            .layers()
            .iter()
            .map(|layer| layer.rules().get("semi").map(|setting| setting.level))
            .collect();
        assert_eq!(
            levels,
            [Some(RuleLevel::Error), Some(RuleLevel::Warn), Some(RuleLevel::Off)]
        );
    }

    #[test]
    fn preset_overrides_stay_scoped() {
        let registry = PresetRegistry::new();
        let array = ConfigArray::from_document(
            &doc(json!({
                "extends": ["eslint:recommended", "plugin:@typescript-eslint/recommended"]
            })),
            &registry,
        )
        .unwrap();

        let ts = array.extract(&TargetPath::parse("src/app.ts").unwrap());
        let js = array.extract(&TargetPath::parse("src/app.js").unwrap());
        assert_eq!(level(&ts, "no-undef"), Some(RuleLevel::Off));
        assert_eq!(level(&js, "no-undef"), Some(RuleLevel::Error));
        assert_eq!(ts.parser.as_deref(), Some("@typescript-eslint/parser"));
        assert_eq!(ts.plugins, ["@typescript-eslint"]);
    }

    #[test]
    fn nested_overrides_need_both_scopes() {
        let registry = PresetRegistry::new();
        let array = ConfigArray::from_document(
            &doc(json!({
                "overrides": [{
                    "files": ["packages/frontend/**"],
                    "rules": {"react/no-danger": "warn"},
                    "overrides": [{
                        "files": ["*.test.tsx"],
                        "rules": {"react/no-danger": "off"}
                    }]
                }]
            })),
            &registry,
        )
        .unwrap();

        let component = array.extract(&TargetPath::parse("packages/frontend/App.tsx").unwrap());
        let test = array.extract(&TargetPath::parse("packages/frontend/App.test.tsx").unwrap());
        let backend = array.extract(&TargetPath::parse("packages/backend/a.test.tsx").unwrap());
        assert_eq!(level(&component, "react/no-danger"), Some(RuleLevel::Warn));
        assert_eq!(level(&test, "react/no-danger"), Some(RuleLevel::Off));
        assert_eq!(level(&backend, "react/no-danger"), None);
    }

    #[test]
    fn override_extends_are_scoped_to_the_block() {
        let registry = PresetRegistry::new();
        let array = ConfigArray::from_document(
            &doc(json!({
                "overrides": [{
                    "files": ["*.tsx"],
                    "extends": ["plugin:react-hooks/recommended"],
                    "rules": {"react-hooks/exhaustive-deps": "error"}
                }]
            })),
            &registry,
        )
        .unwrap();

        let tsx = array.extract(&TargetPath::parse("src/App.tsx").unwrap());
        assert_eq!(level(&tsx, "react-hooks/rules-of-hooks"), Some(RuleLevel::Error));
        assert_eq!(level(&tsx, "react-hooks/exhaustive-deps"), Some(RuleLevel::Error));

        let ts = array.extract(&TargetPath::parse("src/app.ts").unwrap());
        assert!(ts.rules.is_empty());
        assert!(ts.plugins.is_empty());
    }

    #[test]
    fn registered_cycle_is_reported() {
        let mut registry = PresetRegistry::empty();
        registry.register("a", doc(json!({"extends": "b"})));
        registry.register("b", doc(json!({"extends": ["a"]})));

        let err = ConfigArray::from_document(&doc(json!({"extends": "a"})), &registry).unwrap_err();
        match err {
            ConfigError::CircularPreset(chain) => {
                assert_eq!(chain, "<inline config> -> a -> b -> a")
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn plugin_preset_may_list_itself() {
        let mut registry = PresetRegistry::empty();
        registry.register(
            "plugin:acme",
            doc(json!({"plugins": ["acme"], "rules": {"acme/no-foo": "warn"}})),
        );

        let array =
            ConfigArray::from_document(&doc(json!({"plugins": ["acme"]})), &registry).unwrap();
        let config = array.extract(&TargetPath::parse("a.js").unwrap());
        assert_eq!(level(&config, "acme/no-foo"), Some(RuleLevel::Warn));
        assert_eq!(config.plugins, ["acme"]);
    }

    #[test]
    fn prefix_scopes_override_patterns() {
        let registry = PresetRegistry::new();
        let array = ConfigArray::from_document(
            &doc(json!({
                "rules": {"semi": "error"},
                "overrides": [{"files": ["src/**"], "rules": {"semi": "off"}}]
            })),
            &registry,
        )
        .unwrap()
        .with_prefix("packages/web");

        let inside = array.extract(&TargetPath::parse("packages/web/src/a.ts").unwrap());
        let outside = array.extract(&TargetPath::parse("src/a.ts").unwrap());
        assert_eq!(level(&inside, "semi"), Some(RuleLevel::Off));
        assert_eq!(level(&outside, "semi"), Some(RuleLevel::Error));
    }
}
