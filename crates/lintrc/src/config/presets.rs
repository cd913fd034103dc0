use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::ConfigError;

use super::config_object::ConfigObject;
use super::loader::{absolutize, load_config};

/// A preset resolved from an `extends` or `plugins` entry.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Identity used for cycle detection: the registered name or the absolute file path.
    pub key: String,
    pub object: Arc<ConfigObject>,
    /// Directory that relative `extends` inside this preset are resolved against.
    pub base_dir: Option<PathBuf>,
}

/// Named presets and known plugins available to `extends` / `plugins`.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: HashMap<String, Arc<ConfigObject>>,
    plugins: BTreeSet<String>,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self {
            presets: BUILTIN_PRESETS.clone(),
            plugins: BUILTIN_PLUGINS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no presets and no plugins at all.
    pub fn empty() -> Self {
        Self {
            presets: HashMap::new(),
            plugins: BTreeSet::new(),
        }
    }

    /// Register (or replace) a named preset. Use `plugin:<name>` to attach
    /// rules to a `plugins` entry.
    pub fn register(&mut self, name: impl Into<String>, preset: ConfigObject) {
        self.presets.insert(name.into(), Arc::new(preset));
    }

    pub fn register_plugin(&mut self, name: &str) {
        self.plugins.insert(normalize_plugin_name(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Find a named preset, also trying the `eslint-config-` shareable-config prefix.
    pub fn lookup(&self, name: &str) -> Option<(&str, &Arc<ConfigObject>)> {
        if let Some((key, preset)) = self.presets.get_key_value(name) {
            return Some((key.as_str(), preset));
        }
        if name.contains(':') || name.starts_with("eslint-config-") {
            return None;
        }
        self.presets
            .get_key_value(&format!("eslint-config-{name}"))
            .map(|(key, preset)| (key.as_str(), preset))
    }

    /// Resolve one `extends` entry of the document named `referrer`, which
    /// lives in `base_dir` when it was loaded from disk.
    pub fn resolve_extends(
        &self,
        entry: &str,
        referrer: &str,
        base_dir: Option<&Path>,
    ) -> Result<Preset, ConfigError> {
        if is_file_reference(entry) {
            let Some(base_dir) = base_dir else {
                return Err(ConfigError::InvalidDocument(format!(
                    "{referrer} extends {entry}, but has no directory to resolve it against"
                )));
            };
            let path = absolutize(&base_dir.join(entry));
            debug!(preset = %path.display(), referrer, "loading preset file");
            let object = load_config(&path)?;
            return Ok(Preset {
                key: path.display().to_string(),
                object: Arc::new(object),
                base_dir: path.parent().map(Path::to_path_buf),
            });
        }

        let (key, object) = self
            .lookup(entry)
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: entry.to_string(),
                referrer: referrer.to_string(),
            })?;
        debug!(preset = key, referrer, "using registered preset");
        Ok(Preset {
            key: key.to_string(),
            object: Arc::clone(object),
            base_dir: base_dir.map(Path::to_path_buf),
        })
    }

    /// Resolve a `plugins` entry. Plugins without a registered `plugin:<name>`
    /// preset contribute nothing but must still be known.
    pub fn resolve_plugin(
        &self,
        entry: &str,
        referrer: &str,
    ) -> Result<Option<Preset>, ConfigError> {
        let name = normalize_plugin_name(entry);
        let key = format!("plugin:{name}");
        if let Some(object) = self.presets.get(&key) {
            return Ok(Some(Preset {
                key,
                object: Arc::clone(object),
                base_dir: None,
            }));
        }
        if self.plugins.contains(&name) {
            return Ok(None);
        }
        Err(ConfigError::UnknownPreset {
            name: entry.to_string(),
            referrer: referrer.to_string(),
        })
    }
}

/// `eslint-plugin-react` is `react`; `@scope/eslint-plugin` is `@scope`.
pub fn normalize_plugin_name(name: &str) -> String {
    if let Some(scope) = name.strip_suffix("/eslint-plugin") {
        if scope.starts_with('@') {
            return scope.to_string();
        }
    }
    name.strip_prefix("eslint-plugin-").unwrap_or(name).to_string()
}

fn is_file_reference(entry: &str) -> bool {
    entry.starts_with("./")
        || entry.starts_with("../")
        || entry.starts_with('/')
        || entry.ends_with(".json")
}

const BUILTIN_PLUGINS: &[&str] = &[
    "@typescript-eslint",
    "react",
    "react-hooks",
    "import",
    "prettier",
    "node",
    "jest",
];

static BUILTIN_PRESETS: Lazy<HashMap<String, Arc<ConfigObject>>> = Lazy::new(|| {
    [
        ("eslint:recommended", ESLINT_RECOMMENDED),
        ("plugin:@typescript-eslint/recommended", TYPESCRIPT_ESLINT_RECOMMENDED),
        ("plugin:react/recommended", REACT_RECOMMENDED),
        ("plugin:react-hooks/recommended", REACT_HOOKS_RECOMMENDED),
        ("plugin:import/errors", IMPORT_ERRORS),
        ("plugin:import/warnings", IMPORT_WARNINGS),
        ("plugin:import/typescript", IMPORT_TYPESCRIPT),
        ("prettier", PRETTIER),
        ("plugin:prettier/recommended", PRETTIER_RECOMMENDED),
    ]
    .into_iter()
    .map(|(name, source)| {
        let object = ConfigObject::from_json_str(source, name).expect("builtin preset must parse");
        (name.to_string(), Arc::new(object))
    })
    .collect()
});

const ESLINT_RECOMMENDED: &str = r#"{
  "rules": {
    "constructor-super": "error",
    "for-direction": "error",
    "getter-return": "error",
    "no-async-promise-executor": "error",
    "no-case-declarations": "error",
    "no-class-assign": "error",
    "no-compare-neg-zero": "error",
    "no-cond-assign": "error",
    "no-const-assign": "error",
    "no-constant-condition": "error",
    "no-control-regex": "error",
    "no-debugger": "error",
    "no-delete-var": "error",
    "no-dupe-args": "error",
    "no-dupe-class-members": "error",
    "no-dupe-else-if": "error",
    "no-dupe-keys": "error",
    "no-duplicate-case": "error",
    "no-empty": "error",
    "no-empty-character-class": "error",
    "no-empty-pattern": "error",
    "no-ex-assign": "error",
    "no-extra-boolean-cast": "error",
    "no-extra-semi": "error",
    "no-fallthrough": "error",
    "no-func-assign": "error",
    "no-global-assign": "error",
    "no-import-assign": "error",
    "no-inner-declarations": "error",
    "no-invalid-regexp": "error",
    "no-irregular-whitespace": "error",
    "no-loss-of-precision": "error",
    "no-misleading-character-class": "error",
    "no-mixed-spaces-and-tabs": "error",
    "no-new-symbol": "error",
    "no-nonoctal-decimal-escape": "error",
    "no-obj-calls": "error",
    "no-octal": "error",
    "no-prototype-builtins": "error",
    "no-redeclare": "error",
    "no-regex-spaces": "error",
    "no-self-assign": "error",
    "no-setter-return": "error",
    "no-shadow-restricted-names": "error",
    "no-sparse-arrays": "error",
    "no-this-before-super": "error",
    "no-undef": "error",
    "no-unexpected-multiline": "error",
    "no-unreachable": "error",
    "no-unsafe-finally": "error",
    "no-unsafe-negation": "error",
    "no-unsafe-optional-chaining": "error",
    "no-unused-labels": "error",
    "no-unused-vars": "error",
    "no-useless-backreference": "error",
    "no-useless-catch": "error",
    "no-useless-escape": "error",
    "no-with": "error",
    "require-yield": "error",
    "use-isnan": "error",
    "valid-typeof": "error"
  }
}"#;

const TYPESCRIPT_ESLINT_RECOMMENDED: &str = r#"{
  "parser": "@typescript-eslint/parser",
  "parserOptions": { "sourceType": "module" },
  "plugins": ["@typescript-eslint"],
  "rules": {
    "@typescript-eslint/adjacent-overload-signatures": "error",
    "@typescript-eslint/ban-ts-comment": "error",
    "@typescript-eslint/ban-types": "error",
    "no-array-constructor": "off",
    "@typescript-eslint/no-array-constructor": "error",
    "no-empty-function": "off",
    "@typescript-eslint/no-empty-function": "error",
    "@typescript-eslint/no-empty-interface": "error",
    "@typescript-eslint/no-explicit-any": "warn",
    "@typescript-eslint/no-extra-non-null-assertion": "error",
    "no-extra-semi": "off",
    "@typescript-eslint/no-extra-semi": "error",
    "@typescript-eslint/no-inferrable-types": "error",
    "no-loss-of-precision": "off",
    "@typescript-eslint/no-loss-of-precision": "error",
    "@typescript-eslint/no-misused-new": "error",
    "@typescript-eslint/no-namespace": "error",
    "@typescript-eslint/no-non-null-asserted-optional-chain": "error",
    "@typescript-eslint/no-non-null-assertion": "warn",
    "@typescript-eslint/no-this-alias": "error",
    "@typescript-eslint/no-unnecessary-type-constraint": "error",
    "no-unused-vars": "off",
    "@typescript-eslint/no-unused-vars": "warn",
    "@typescript-eslint/no-var-requires": "error",
    "@typescript-eslint/prefer-as-const": "error",
    "@typescript-eslint/prefer-namespace-keyword": "error",
    "@typescript-eslint/triple-slash-reference": "error"
  },
  "overrides": [
    {
      "files": ["*.ts", "*.tsx", "*.mts", "*.cts"],
      "rules": {
        "constructor-super": "off",
        "getter-return": "off",
        "no-const-assign": "off",
        "no-dupe-args": "off",
        "no-dupe-class-members": "off",
        "no-dupe-keys": "off",
        "no-func-assign": "off",
        "no-import-assign": "off",
        "no-new-symbol": "off",
        "no-obj-calls": "off",
        "no-redeclare": "off",
        "no-setter-return": "off",
        "no-this-before-super": "off",
        "no-undef": "off",
        "no-unreachable": "off",
        "no-unsafe-negation": "off",
        "no-var": "error",
        "prefer-const": "error",
        "prefer-rest-params": "error",
        "prefer-spread": "error",
        "valid-typeof": "off"
      }
    }
  ]
}"#;

const REACT_RECOMMENDED: &str = r#"{
  "plugins": ["react"],
  "parserOptions": { "ecmaFeatures": { "jsx": true } },
  "rules": {
    "react/display-name": 2,
    "react/jsx-key": 2,
    "react/jsx-no-comment-textnodes": 2,
    "react/jsx-no-duplicate-props": 2,
    "react/jsx-no-target-blank": 2,
    "react/jsx-no-undef": 2,
    "react/jsx-uses-react": 2,
    "react/jsx-uses-vars": 2,
    "react/no-children-prop": 2,
    "react/no-danger-with-children": 2,
    "react/no-deprecated": 2,
    "react/no-direct-mutation-state": 2,
    "react/no-find-dom-node": 2,
    "react/no-is-mounted": 2,
    "react/no-render-return-value": 2,
    "react/no-string-refs": 2,
    "react/no-unescaped-entities": 2,
    "react/no-unknown-property": 2,
    "react/no-unsafe": 0,
    "react/prop-types": 2,
    "react/react-in-jsx-scope": 2,
    "react/require-render-return": 2
  }
}"#;

const REACT_HOOKS_RECOMMENDED: &str = r#"{
  "plugins": ["react-hooks"],
  "rules": {
    "react-hooks/rules-of-hooks": "error",
    "react-hooks/exhaustive-deps": "warn"
  }
}"#;

const IMPORT_ERRORS: &str = r#"{
  "plugins": ["import"],
  "rules": {
    "import/no-unresolved": 2,
    "import/named": 2,
    "import/namespace": 2,
    "import/default": 2,
    "import/export": 2
  }
}"#;

const IMPORT_WARNINGS: &str = r#"{
  "plugins": ["import"],
  "rules": {
    "import/no-named-as-default": 1,
    "import/no-named-as-default-member": 1,
    "import/no-duplicates": 1
  }
}"#;

const IMPORT_TYPESCRIPT: &str = r#"{
  "settings": {
    "import/extensions": [".ts", ".cts", ".mts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"],
    "import/external-module-folders": ["node_modules", "node_modules/@types"],
    "import/parsers": {
      "@typescript-eslint/parser": [".ts", ".cts", ".mts", ".tsx"]
    },
    "import/resolver": {
      "node": {
        "extensions": [".ts", ".cts", ".mts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"]
      }
    }
  },
  "rules": {
    "import/named": "off"
  }
}"#;

const PRETTIER: &str = r#"{
  "rules": {
    "curly": 0,
    "lines-around-comment": 0,
    "max-len": 0,
    "no-confusing-arrow": 0,
    "no-mixed-operators": 0,
    "no-tabs": 0,
    "no-unexpected-multiline": 0,
    "quotes": 0,
    "@typescript-eslint/quotes": 0,
    "array-bracket-newline": "off",
    "array-bracket-spacing": "off",
    "array-element-newline": "off",
    "arrow-parens": "off",
    "arrow-spacing": "off",
    "block-spacing": "off",
    "brace-style": "off",
    "comma-dangle": "off",
    "comma-spacing": "off",
    "comma-style": "off",
    "computed-property-spacing": "off",
    "dot-location": "off",
    "eol-last": "off",
    "func-call-spacing": "off",
    "function-call-argument-newline": "off",
    "function-paren-newline": "off",
    "generator-star-spacing": "off",
    "implicit-arrow-linebreak": "off",
    "indent": "off",
    "jsx-quotes": "off",
    "key-spacing": "off",
    "keyword-spacing": "off",
    "linebreak-style": "off",
    "multiline-ternary": "off",
    "newline-per-chained-call": "off",
    "new-parens": "off",
    "no-extra-parens": "off",
    "no-extra-semi": "off",
    "no-floating-decimal": "off",
    "no-mixed-spaces-and-tabs": "off",
    "no-multi-spaces": "off",
    "no-multiple-empty-lines": "off",
    "no-trailing-spaces": "off",
    "no-whitespace-before-property": "off",
    "nonblock-statement-body-position": "off",
    "object-curly-newline": "off",
    "object-curly-spacing": "off",
    "object-property-newline": "off",
    "one-var-declaration-per-line": "off",
    "operator-linebreak": "off",
    "padded-blocks": "off",
    "quote-props": "off",
    "rest-spread-spacing": "off",
    "semi": "off",
    "semi-spacing": "off",
    "semi-style": "off",
    "space-before-blocks": "off",
    "space-before-function-paren": "off",
    "space-in-parens": "off",
    "space-infix-ops": "off",
    "space-unary-ops": "off",
    "switch-colon-spacing": "off",
    "template-curly-spacing": "off",
    "template-tag-spacing": "off",
    "wrap-iife": "off",
    "wrap-regex": "off",
    "yield-star-spacing": "off",
    "@typescript-eslint/brace-style": "off",
    "@typescript-eslint/comma-dangle": "off",
    "@typescript-eslint/comma-spacing": "off",
    "@typescript-eslint/func-call-spacing": "off",
    "@typescript-eslint/indent": "off",
    "@typescript-eslint/keyword-spacing": "off",
    "@typescript-eslint/member-delimiter-style": "off",
    "@typescript-eslint/no-extra-parens": "off",
    "@typescript-eslint/no-extra-semi": "off",
    "@typescript-eslint/object-curly-spacing": "off",
    "@typescript-eslint/semi": "off",
    "@typescript-eslint/space-before-function-paren": "off",
    "@typescript-eslint/space-infix-ops": "off",
    "@typescript-eslint/type-annotation-spacing": "off",
    "react/jsx-child-element-spacing": "off",
    "react/jsx-closing-bracket-location": "off",
    "react/jsx-closing-tag-location": "off",
    "react/jsx-curly-newline": "off",
    "react/jsx-curly-spacing": "off",
    "react/jsx-equals-spacing": "off",
    "react/jsx-first-prop-new-line": "off",
    "react/jsx-indent": "off",
    "react/jsx-indent-props": "off",
    "react/jsx-max-props-per-line": "off",
    "react/jsx-newline": "off",
    "react/jsx-one-expression-per-line": "off",
    "react/jsx-props-no-multi-spaces": "off",
    "react/jsx-tag-spacing": "off",
    "react/jsx-wrap-multilines": "off"
  }
}"#;

const PRETTIER_RECOMMENDED: &str = r#"{
  "extends": ["prettier"],
  "plugins": ["prettier"],
  "rules": {
    "prettier/prettier": "error",
    "arrow-body-style": "off",
    "prefer-arrow-callback": "off"
  }
}"#;
