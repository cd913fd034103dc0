mod config_array;
mod config_object;
mod config_store;
mod loader;
mod overrides;
mod path;
mod pattern;
mod presets;
mod types;

pub const DEFAULT_CONFIG_FILENAME: &str = ".eslintrc.json";
pub const FORMAT_CONFIG_FILENAME: &str = ".prettierrc.json";

pub use config_array::{ConfigArray, ConfigLayer};
pub use config_object::{ConfigObject, OverrideObject};
pub use config_store::ConfigStore;
pub use loader::{find_config_file, load_config, strip_json_comments};
pub use overrides::OverrideBlock;
pub use path::TargetPath;
pub use pattern::FileMatcher;
pub use presets::{Preset, PresetRegistry};
pub use types::{RuleLevel, RuleSet, RuleSetting};
