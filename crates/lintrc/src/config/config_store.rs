use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Component, Path, PathBuf},
    sync::{Arc, RwLock},
};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use tracing::debug;

use crate::error::ConfigError;
use crate::resolver::EffectiveConfig;

use super::{
    loader::{absolutize, load_config},
    ConfigArray, PresetRegistry, TargetPath, DEFAULT_CONFIG_FILENAME,
};

/// Directory name that is ignored everywhere below the store root.
const DEFAULT_IGNORED_DIR: &str = "node_modules";

#[derive(Debug)]
struct LoadedConfig {
    path: PathBuf,
    dir: PathBuf,
    root: bool,
    array: ConfigArray,
    ignore: Option<Gitignore>,
}

/// Discovers, loads and caches the config documents of a project tree and
/// resolves the effective configuration of individual files.
#[derive(Debug)]
pub struct ConfigStore {
    root_dir: PathBuf,
    explicit: Option<Arc<LoadedConfig>>,
    registry: PresetRegistry,
    cache: RwLock<HashMap<PathBuf, Option<Arc<LoadedConfig>>>>,
}

impl ConfigStore {
    /// `config_path`, when given, replaces discovery: that one document applies
    /// to every file, with its patterns relative to `root_dir`.
    pub fn new(
        root_dir: impl Into<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::with_registry(root_dir, config_path, PresetRegistry::new())
    }

    pub fn with_registry(
        root_dir: impl Into<PathBuf>,
        config_path: Option<PathBuf>,
        registry: PresetRegistry,
    ) -> Result<Self, ConfigError> {
        let root_dir = absolutize(&root_dir.into());
        let explicit = match config_path {
            Some(path) => {
                let path = absolutize(&path);
                debug!(path = %path.display(), "using explicit config");
                let loaded = LoadedConfig::load(&path, &root_dir, &root_dir, &registry)?;
                Some(Arc::new(loaded))
            }
            None => None,
        };
        Ok(Self {
            root_dir,
            explicit,
            registry,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn resolve(&self, file: &Path) -> Result<EffectiveConfig, ConfigError> {
        let file = absolutize(file);
        let target = TargetPath::parse(&relative_key(&self.root_dir, &file))?;
        let mut config = EffectiveConfig::default();
        for loaded in self.configs_for(&file)? {
            loaded.array.apply_to(&target, &mut config);
        }
        Ok(config)
    }

    /// Whether `file` is excluded by `ignorePatterns` (or lives in `node_modules`).
    pub fn is_ignored(&self, file: &Path) -> Result<bool, ConfigError> {
        let file = absolutize(file);
        if let Ok(relative) = file.strip_prefix(&self.root_dir) {
            let default_ignored = Component::Normal(OsStr::new(DEFAULT_IGNORED_DIR));
            let in_default_ignored = relative
                .components()
                .any(|component| component == default_ignored);
            if in_default_ignored {
                return Ok(true);
            }
        }

        let mut ignored = false;
        for loaded in self.configs_for(&file)? {
            let Some(matcher) = &loaded.ignore else {
                continue;
            };
            let Ok(relative) = file.strip_prefix(&loaded.dir) else {
                continue;
            };
            match matcher.matched_path_or_any_parents(relative, false) {
                Match::Ignore(_) => ignored = true,
                Match::Whitelist(_) => ignored = false,
                Match::None => {}
            }
        }
        Ok(ignored)
    }

    /// Config files that apply to `file`, outermost first.
    pub fn config_files(&self, file: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let configs = self.configs_for(&absolutize(file))?;
        Ok(configs.iter().map(|loaded| loaded.path.clone()).collect())
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn configs_for(&self, file: &Path) -> Result<Vec<Arc<LoadedConfig>>, ConfigError> {
        if let Some(explicit) = &self.explicit {
            return Ok(vec![Arc::clone(explicit)]);
        }

        let mut configs = Vec::new();
        let mut current = file.parent();
        while let Some(dir) = current {
            if let Some(loaded) = self.load_dir(dir)? {
                let is_root = loaded.root;
                configs.push(loaded);
                if is_root {
                    break;
                }
            }
            if dir == self.root_dir {
                break;
            }
            current = dir.parent();
        }
        configs.reverse();
        Ok(configs)
    }

    fn load_dir(&self, dir: &Path) -> Result<Option<Arc<LoadedConfig>>, ConfigError> {
        {
            let cache = self
                .cache
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(entry) = cache.get(dir) {
                return Ok(entry.clone());
            }
        }

        let path = dir.join(DEFAULT_CONFIG_FILENAME);
        let loaded = if path.is_file() {
            debug!(path = %path.display(), "found config");
            Some(Arc::new(LoadedConfig::load(
                &path,
                dir,
                &self.root_dir,
                &self.registry,
            )?))
        } else {
            None
        };

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cache.entry(dir.to_path_buf()).or_insert(loaded).clone())
    }
}

impl LoadedConfig {
    /// Load the document at `path`, whose patterns are relative to `dir`.
    fn load(
        path: &Path,
        dir: &Path,
        root_dir: &Path,
        registry: &PresetRegistry,
    ) -> Result<Self, ConfigError> {
        let object = load_config(path)?;
        let base_dir = path.parent().unwrap_or(dir);
        let name = path.display().to_string();
        let array = ConfigArray::load(&object, registry, Some(base_dir), &name)?
            .with_prefix(&relative_key(root_dir, dir));
        let ignore = build_ignore(dir, &object.ignore_patterns)?;
        Ok(Self {
            path: path.to_path_buf(),
            dir: dir.to_path_buf(),
            root: object.root,
            array,
            ignore,
        })
    }
}

fn build_ignore(dir: &Path, patterns: &[String]) -> Result<Option<Gitignore>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(dir);
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|source| ConfigError::InvalidIgnorePattern {
                pattern: pattern.clone(),
                source,
            })?;
    }
    let matcher = builder
        .build()
        .map_err(|source| ConfigError::InvalidIgnorePattern {
            pattern: patterns.join(", "),
            source,
        })?;
    Ok(Some(matcher))
}

/// `path` as a `/`-separated string relative to `root`, or the full path
/// when it lies outside `root`.
fn relative_key(root: &Path, path: &Path) -> String {
    let shown = match path.strip_prefix(root) {
        Ok(relative) => relative,
        Err(_) => path,
    };
    shown.to_string_lossy().replace('\\', "/")
}
