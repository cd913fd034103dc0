use std::fs;
use std::path::Path;

use lintrc::{
    ConfigError, ConfigObject, ConfigStore, EffectiveConfig, FormatOptions, PresetRegistry,
    RuleLevel, DEFAULT_CONFIG_FILENAME,
};
use serde_json::json;
use tempfile::tempdir;

const PORTAL_CONFIG: &str = include_str!("fixtures/portal.eslintrc.json");
const PORTAL_PRETTIERRC: &str = include_str!("fixtures/portal.prettierrc.json");

fn write_config(dir: &Path, contents: &str) {
    fs::create_dir_all(dir).expect("create dir");
    fs::write(dir.join(DEFAULT_CONFIG_FILENAME), contents).expect("write config");
}

fn level(config: &EffectiveConfig, name: &str) -> Option<RuleLevel> {
    config.rule(name).map(|setting| setting.level)
}

#[test]
fn reads_config_from_root_file() {
    let temp = tempdir().expect("tempdir");
    write_config(
        temp.path(),
        r#"{
  "rules": {
    "no-console": "error"
  }
}"#,
    );

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let config = store
        .resolve(&temp.path().join("src/index.ts"))
        .expect("resolve");

    assert_eq!(level(&config, "no-console"), Some(RuleLevel::Error));
}

#[test]
fn missing_config_resolves_to_empty() {
    let temp = tempdir().expect("tempdir");
    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let config = store
        .resolve(&temp.path().join("src/index.ts"))
        .expect("resolve");

    assert_eq!(config, EffectiveConfig::default());
}

#[test]
fn nearer_config_wins_and_cascades_to_root() {
    let temp = tempdir().expect("tempdir");
    write_config(
        temp.path(),
        r#"{
  "root": true,
  "env": { "browser": true },
  "rules": { "no-console": "warn", "semi": "error" },
  "overrides": [{ "files": ["packages/backend/**"], "rules": { "eqeqeq": "error" } }]
}"#,
    );
    write_config(
        &temp.path().join("packages/backend"),
        r#"{
  "env": { "node": true, "browser": false },
  "rules": { "no-console": "off" },
  "overrides": [{ "files": ["scripts/**"], "rules": { "no-process-exit": "off" } }]
}"#,
    );

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let server = store
        .resolve(&temp.path().join("packages/backend/src/server.ts"))
        .expect("resolve");
    assert_eq!(level(&server, "no-console"), Some(RuleLevel::Off));
    assert_eq!(level(&server, "semi"), Some(RuleLevel::Error));
    assert_eq!(level(&server, "eqeqeq"), Some(RuleLevel::Error));
    assert_eq!(level(&server, "no-process-exit"), None);
    assert_eq!(server.env.get("browser"), Some(&false));
    assert_eq!(server.env.get("node"), Some(&true));

    // patterns of the nested config are relative to its own directory
    let script = store
        .resolve(&temp.path().join("packages/backend/scripts/migrate.ts"))
        .expect("resolve");
    assert_eq!(level(&script, "no-process-exit"), Some(RuleLevel::Off));

    let web = store
        .resolve(&temp.path().join("packages/web/src/app.ts"))
        .expect("resolve");
    assert_eq!(level(&web, "no-console"), Some(RuleLevel::Warn));
    assert_eq!(level(&web, "eqeqeq"), None);

    let files = store
        .config_files(&temp.path().join("packages/backend/src/server.ts"))
        .expect("config files");
    assert_eq!(
        files,
        [
            temp.path().join(DEFAULT_CONFIG_FILENAME),
            temp.path().join("packages/backend").join(DEFAULT_CONFIG_FILENAME)
        ]
    );
}

#[test]
fn root_true_stops_the_cascade() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), r#"{ "rules": { "semi": "error" } }"#);
    write_config(
        &temp.path().join("legacy"),
        r#"{ "root": true, "rules": { "no-var": "off" } }"#,
    );

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let config = store
        .resolve(&temp.path().join("legacy/old.js"))
        .expect("resolve");

    assert_eq!(level(&config, "no-var"), Some(RuleLevel::Off));
    assert_eq!(level(&config, "semi"), None);
}

#[test]
fn explicit_config_replaces_discovery() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), r#"{ "rules": { "semi": "error" } }"#);
    let explicit = temp.path().join("configs/strict.json");
    fs::create_dir_all(explicit.parent().unwrap()).unwrap();
    fs::write(
        &explicit,
        r#"{
  "rules": { "no-console": "error" },
  "overrides": [{ "files": ["scripts/**"], "rules": { "no-console": "off" } }]
}"#,
    )
    .unwrap();

    let store = ConfigStore::new(temp.path(), Some(explicit)).expect("config store");
    let app = store.resolve(&temp.path().join("src/app.ts")).expect("resolve");
    let script = store
        .resolve(&temp.path().join("scripts/build.ts"))
        .expect("resolve");

    assert_eq!(level(&app, "semi"), None);
    assert_eq!(level(&app, "no-console"), Some(RuleLevel::Error));
    assert_eq!(level(&script, "no-console"), Some(RuleLevel::Off));
}

#[test]
fn ignores_paths_matching_ignore_patterns() {
    let temp = tempdir().expect("tempdir");
    write_config(
        temp.path(),
        r#"{
  "ignorePatterns": ["dist/", "*.min.js", "!vendor/keep.min.js"]
}"#,
    );
    write_config(
        &temp.path().join("packages/web"),
        r#"{ "ignorePatterns": ["generated/**"] }"#,
    );

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let ignored = |path: &str| store.is_ignored(&temp.path().join(path)).expect("is_ignored");

    assert!(ignored("dist/app.js"));
    assert!(ignored("packages/web/dist/app.js"));
    assert!(ignored("src/lib.min.js"));
    assert!(!ignored("vendor/keep.min.js"));
    assert!(ignored("packages/web/generated/api.ts"));
    assert!(!ignored("generated/api.ts"));
    assert!(ignored("node_modules/react/index.js"));
    assert!(ignored("packages/web/node_modules/left-pad/index.js"));
    assert!(!ignored("src/app.ts"));

    // ignored files can still be resolved
    assert!(store.resolve(&temp.path().join("dist/app.js")).is_ok());
}

#[test]
fn relative_file_extends_are_loaded() {
    let temp = tempdir().expect("tempdir");
    fs::create_dir_all(temp.path().join("configs")).unwrap();
    fs::write(
        temp.path().join("configs/base.json"),
        r#"{ "extends": ["./team.json"], "rules": { "eqeqeq": "warn" } }"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("configs/team.json"),
        r#"{ "rules": { "eqeqeq": "error", "curly": "error" } }"#,
    )
    .unwrap();
    write_config(
        temp.path(),
        r#"{
  // comments are allowed
  "extends": "./configs/base.json",
  "rules": { "curly": "off" } /* own rules last */
}"#,
    );

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let config = store.resolve(&temp.path().join("a.js")).expect("resolve");

    assert_eq!(level(&config, "eqeqeq"), Some(RuleLevel::Warn));
    assert_eq!(level(&config, "curly"), Some(RuleLevel::Off));
}

#[test]
fn circular_file_extends_fail() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
    fs::write(temp.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();
    write_config(temp.path(), r#"{ "extends": "./a.json" }"#);

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let err = store.resolve(&temp.path().join("x.js")).unwrap_err();
    assert!(
        matches!(err, ConfigError::CircularPreset(ref chain) if chain.ends_with("a.json")),
        "{err:?}"
    );
}

#[test]
fn config_errors_are_reported() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), r#"{ "rules": { "no-console": "loud" } }"#);
    write_config(&temp.path().join("bad-json"), r#"{ "rules": "#);
    write_config(&temp.path().join("bad-key"), r#"{ "rule": {} }"#);

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let err = store.resolve(&temp.path().join("a.js")).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedRuleSet { .. }));

    let err = store
        .resolve(&temp.path().join("bad-json/a.js"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Json(..)));

    let err = store.resolve(&temp.path().join("bad-key/a.js")).unwrap_err();
    assert!(matches!(err, ConfigError::Json(..)));

    let err = ConfigStore::new(temp.path(), Some(temp.path().join("missing.json"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn custom_registry_presets() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), r#"{ "extends": ["company"], "plugins": ["acme"] }"#);

    let mut registry = PresetRegistry::new();
    registry.register(
        "eslint-config-company",
        ConfigObject::from_value(json!({"rules": {"no-alert": "error"}}), "company").unwrap(),
    );
    registry.register_plugin("eslint-plugin-acme");

    let store = ConfigStore::with_registry(temp.path(), None, registry).expect("config store");
    let config = store.resolve(&temp.path().join("a.js")).expect("resolve");
    assert_eq!(level(&config, "no-alert"), Some(RuleLevel::Error));
    assert_eq!(config.plugins, ["acme"]);
}

#[test]
fn monorepo_config_resolves_per_package() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), PORTAL_CONFIG);
    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let resolve = |path: &str| store.resolve(&temp.path().join(path)).expect("resolve");

    let server = resolve("packages/backend/src/server.ts");
    assert_eq!(level(&server, "no-console"), Some(RuleLevel::Off));
    assert_eq!(level(&server, "no-process-exit"), Some(RuleLevel::Error));
    assert_eq!(
        level(&server, "@typescript-eslint/explicit-module-boundary-types"),
        Some(RuleLevel::Warn)
    );
    // switched off for TypeScript by the typescript-eslint preset
    assert_eq!(level(&server, "no-undef"), Some(RuleLevel::Off));
    assert_eq!(server.parser.as_deref(), Some("@typescript-eslint/parser"));
    assert_eq!(
        server.plugins,
        ["@typescript-eslint", "react", "react-hooks", "import", "prettier"]
    );

    let app = resolve("packages/frontend/src/App.tsx");
    let console = app.rule("no-console").expect("no-console");
    assert_eq!(console.level, RuleLevel::Warn);
    assert_eq!(console.options, [json!({"allow": ["error", "warn", "info"]})]);
    assert_eq!(level(&app, "react/no-danger"), Some(RuleLevel::Warn));
    assert_eq!(level(&app, "react/prop-types"), Some(RuleLevel::Off));
    assert_eq!(level(&app, "react/display-name"), Some(RuleLevel::Error));
    assert_eq!(app.settings["react"], json!({"version": "detect"}));
    assert_eq!(app.parser_options["ecmaVersion"], json!(2022));

    let test = resolve("packages/frontend/src/App.test.tsx");
    assert_eq!(level(&test, "@typescript-eslint/no-explicit-any"), Some(RuleLevel::Off));
    assert_eq!(level(&test, "max-lines-per-function"), Some(RuleLevel::Off));
    assert_eq!(test.env.get("jest"), Some(&true));
    assert_eq!(test.env.get("mocha"), Some(&true));

    let firebase = resolve("packages/backend/src/services/firebase/auth.ts");
    assert_eq!(level(&firebase, "camelcase"), Some(RuleLevel::Off));
    assert_eq!(level(&firebase, "@typescript-eslint/no-explicit-any"), Some(RuleLevel::Off));

    let vite = resolve("packages/frontend/vite.config.ts");
    assert_eq!(level(&vite, "@typescript-eslint/no-var-requires"), Some(RuleLevel::Off));
    assert_eq!(level(&vite, "import/no-extraneous-dependencies"), Some(RuleLevel::Off));

    let shared = resolve("packages/shared/src/util.ts");
    assert_eq!(level(&shared, "@typescript-eslint/no-explicit-any"), Some(RuleLevel::Warn));
    assert_eq!(level(&shared, "camelcase"), None);

    // formatting rules are switched off by the prettier preset
    assert_eq!(level(&shared, "no-mixed-spaces-and-tabs"), Some(RuleLevel::Off));
    assert_eq!(level(&shared, "no-extra-semi"), Some(RuleLevel::Off));
    assert_eq!(level(&shared, "@typescript-eslint/no-extra-semi"), Some(RuleLevel::Off));

    assert!(store.is_ignored(&temp.path().join("packages/web/dist/index.js")).unwrap());
    assert!(!store.is_ignored(&temp.path().join("packages/web/src/index.ts")).unwrap());
}

#[test]
fn monorepo_format_options_follow_the_prettier_rule() {
    let temp = tempdir().expect("tempdir");
    write_config(temp.path(), PORTAL_CONFIG);
    fs::write(temp.path().join(".prettierrc.json"), PORTAL_PRETTIERRC).unwrap();
    let src = temp.path().join("packages/frontend/src");
    fs::create_dir_all(&src).unwrap();

    let store = ConfigStore::new(temp.path(), None).expect("config store");
    let config = store.resolve(&src.join("App.tsx")).expect("resolve");
    let from_file = FormatOptions::discover(&src).expect("format options");
    let options = from_file.with_rule_options(&config).expect("rule options");

    assert_eq!(options.print_width, 100);
    assert!(options.single_quote);
    assert!(!options.bracket_same_line);
    assert_eq!(
        serde_json::to_value(&options).unwrap()["arrowParens"],
        json!("avoid")
    );
}
