mod config;
mod error;
mod formatter;
mod resolver;

pub use config::{
    find_config_file, load_config, strip_json_comments, ConfigArray, ConfigLayer, ConfigObject,
    ConfigStore, FileMatcher, OverrideBlock, OverrideObject, Preset, PresetRegistry, RuleLevel,
    RuleSet, RuleSetting, TargetPath, DEFAULT_CONFIG_FILENAME, FORMAT_CONFIG_FILENAME,
};
pub use error::{ConfigError, FormatError};
pub use formatter::{
    ArrowParens, EndOfLine, FormatOptions, ProseWrap, QuoteProps, TrailingComma,
    PRETTIER_RULE_NAME,
};
pub use resolver::{resolve, resolve_document, resolve_effective, EffectiveConfig};
