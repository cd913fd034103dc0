use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// Matches a target path against the `files` / `excludedFiles` of an override block.
///
/// Patterns are relative to the directory of the config that declares them.
/// A pattern without `/` is tested against the file name only, so
/// `*.config.js` also matches `packages/web/vite.config.js`.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    files: Vec<String>,
    excluded_files: Vec<String>,
    include: PatternSet,
    exclude: PatternSet,
}

impl FileMatcher {
    pub fn new(files: &[String], excluded_files: &[String]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Err(ConfigError::InvalidDocument(
                "override block requires at least one pattern in files".to_string(),
            ));
        }
        Ok(Self {
            files: files.to_vec(),
            excluded_files: excluded_files.to_vec(),
            include: PatternSet::build(files)?,
            exclude: PatternSet::build(excluded_files)?,
        })
    }

    /// `path` must already be relative to the declaring config's directory.
    pub fn is_match(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn excluded_files(&self) -> &[String] {
        &self.excluded_files
    }
}

#[derive(Debug, Clone)]
struct PatternSet {
    paths: GlobSet,
    names: GlobSet,
}

impl PatternSet {
    fn build(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut paths = GlobSetBuilder::new();
        let mut names = GlobSetBuilder::new();
        for pattern in patterns {
            let normalized = normalize_pattern(pattern)?;
            let glob = compile_glob(pattern, normalized)?;
            if normalized.contains('/') {
                paths.add(glob);
            } else {
                names.add(glob);
            }
        }
        Ok(Self {
            paths: build_globset(paths, patterns)?,
            names: build_globset(names, patterns)?,
        })
    }

    fn is_match(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        self.paths.is_match(path) || self.names.is_match(file_name)
    }
}

fn normalize_pattern(pattern: &str) -> Result<&str, ConfigError> {
    if pattern.split('/').any(|segment| segment == "..") {
        return Err(ConfigError::InvalidDocument(format!(
            "pattern {pattern} must not refer to a parent directory"
        )));
    }
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    Ok(pattern.strip_prefix('/').unwrap_or(pattern))
}

fn compile_glob(original: &str, normalized: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(normalized)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidGlob {
            pattern: original.to_string(),
            source,
        })
}

fn build_globset(builder: GlobSetBuilder, patterns: &[String]) -> Result<GlobSet, ConfigError> {
    builder.build().map_err(|source| ConfigError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}
