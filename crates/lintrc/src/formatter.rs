use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{find_config_file, strip_json_comments, FORMAT_CONFIG_FILENAME};
use crate::error::FormatError;
use crate::resolver::EffectiveConfig;

/// Lint rule whose options carry formatter settings.
pub const PRETTIER_RULE_NAME: &str = "prettier/prettier";

/// Default line width (80).
fn default_print_width() -> usize {
    80
}

/// Default indent width (2).
fn default_tab_width() -> usize {
    2
}

fn default_use_tabs() -> bool {
    false
}

fn default_semi() -> bool {
    true
}

fn default_single_quote() -> bool {
    false
}

fn default_jsx_single_quote() -> bool {
    false
}

fn default_bracket_spacing() -> bool {
    true
}

fn default_bracket_same_line() -> bool {
    false
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteProps {
    #[default]
    AsNeeded,
    Consistent,
    Preserve,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    None,
    #[default]
    Es5,
    All,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArrowParens {
    #[default]
    Always,
    Avoid,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    #[default]
    Lf,
    Crlf,
    Cr,
    Auto,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProseWrap {
    Always,
    Never,
    #[default]
    Preserve,
}

/// Options handed to the external code formatter. Flat, with no per-file layering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormatOptions {
    /// Maximum characters per line.
    #[serde(default = "default_print_width")]
    pub print_width: usize,
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
    /// Indent with tabs instead of spaces.
    #[serde(default = "default_use_tabs")]
    pub use_tabs: bool,
    #[serde(default = "default_semi")]
    pub semi: bool,
    #[serde(default = "default_single_quote")]
    pub single_quote: bool,
    #[serde(default)]
    pub quote_props: QuoteProps,
    #[serde(default = "default_jsx_single_quote")]
    pub jsx_single_quote: bool,
    #[serde(default)]
    pub trailing_comma: TrailingComma,
    #[serde(default = "default_bracket_spacing")]
    pub bracket_spacing: bool,
    /// Older configs spell this `jsxBracketSameLine`.
    #[serde(default = "default_bracket_same_line", alias = "jsxBracketSameLine")]
    pub bracket_same_line: bool,
    #[serde(default)]
    pub arrow_parens: ArrowParens,
    #[serde(default)]
    pub end_of_line: EndOfLine,
    #[serde(default)]
    pub prose_wrap: ProseWrap,
}

impl FormatOptions {
    /// Build options from the config file at `config_path`, then apply
    /// `settings_json`, a JSON object whose keys take priority over the file.
    pub fn new(
        settings_json: Option<&str>,
        config_path: Option<&Path>,
    ) -> Result<FormatOptions, FormatError> {
        let mut options = Map::new();

        if let Some(path) = config_path {
            debug!(path = %path.display(), "reading formatter config");
            let content =
                fs::read_to_string(path).map_err(|e| FormatError::Io(path.to_path_buf(), e))?;
            let file_options: Map<String, Value> =
                serde_json::from_str(&strip_json_comments(&content))
                    .map_err(|e| FormatError::IllegalSettingFile(path.to_path_buf(), e))?;
            options.extend(canonical_keys(file_options));
        }

        if let Some(settings_json) = settings_json {
            let settings: Map<String, Value> =
                serde_json::from_str(settings_json).map_err(FormatError::InvalidSettings)?;
            options.extend(canonical_keys(settings));
        }

        serde_json::from_value(Value::Object(options)).map_err(FormatError::InvalidSettings)
    }

    /// Load the nearest `.prettierrc.json` at or above `start_dir`, or the
    /// defaults when there is none.
    pub fn discover(start_dir: &Path) -> Result<FormatOptions, FormatError> {
        let path = find_config_file(start_dir, FORMAT_CONFIG_FILENAME);
        Self::new(None, path.as_deref())
    }

    /// Layer the options of an enabled `prettier/prettier` rule on top.
    ///
    /// `["error", {...}, {"usePrettierrc": false}]` discards the file options
    /// and starts again from the defaults.
    pub fn with_rule_options(
        &self,
        config: &EffectiveConfig,
    ) -> Result<FormatOptions, FormatError> {
        let Some(setting) = config.rule(PRETTIER_RULE_NAME) else {
            return Ok(self.clone());
        };
        if !setting.is_enabled() {
            return Ok(self.clone());
        }

        let use_prettierrc = setting
            .options
            .get(1)
            .and_then(|extra| extra.get("usePrettierrc"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let base = if use_prettierrc {
            self.clone()
        } else {
            FormatOptions::default()
        };

        let Some(Value::Object(rule_options)) = setting.options.first() else {
            return Ok(base);
        };

        let mut options = match serde_json::to_value(&base) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        options.extend(canonical_keys(rule_options.clone()));

        serde_json::from_value(Value::Object(options)).map_err(FormatError::InvalidRuleOptions)
    }
}

/// Rename legacy keys so layers spelling the same option differently do not collide.
fn canonical_keys(mut options: Map<String, Value>) -> Map<String, Value> {
    if let Some(value) = options.remove("jsxBracketSameLine") {
        options.entry("bracketSameLine").or_insert(value);
    }
    options
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: default_print_width(),
            tab_width: default_tab_width(),
            use_tabs: default_use_tabs(),
            semi: default_semi(),
            single_quote: default_single_quote(),
            quote_props: QuoteProps::default(),
            jsx_single_quote: default_jsx_single_quote(),
            trailing_comma: TrailingComma::default(),
            bracket_spacing: default_bracket_spacing(),
            bracket_same_line: default_bracket_same_line(),
            arrow_parens: ArrowParens::default(),
            end_of_line: EndOfLine::default(),
            prose_wrap: ProseWrap::default(),
        }
    }
}
