use std::fmt;

use crate::error::ConfigError;

/// A validated, `/`-separated path of the file being configured.
///
/// Backslashes become `/` and a leading `./` is dropped. Anything else that
/// is not already normal (empty segments, `.`/`..`, a trailing `/`) is rejected
/// rather than silently rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath(String);

impl TargetPath {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut path = raw.replace('\\', "/");
        while let Some(rest) = path.strip_prefix("./") {
            path = rest.to_string();
        }

        if path.is_empty() {
            return Err(ConfigError::invalid_path(raw, "path is empty"));
        }
        if path.contains('\0') {
            return Err(ConfigError::invalid_path(raw, "path contains a NUL byte"));
        }
        if path.ends_with('/') {
            return Err(ConfigError::invalid_path(raw, "path names a directory"));
        }

        let relative = path.strip_prefix('/').unwrap_or(&path);
        for segment in relative.split('/') {
            match segment {
                "" => return Err(ConfigError::invalid_path(raw, "path has an empty segment")),
                "." | ".." => {
                    return Err(ConfigError::invalid_path(raw, "path is not normalized"))
                }
                _ => {}
            }
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The remainder of this path below directory `dir`, or `None` when the
    /// path lies outside it. An empty `dir` contains every path.
    pub fn strip_dir(&self, dir: &str) -> Option<&str> {
        if dir.is_empty() {
            return Some(&self.0);
        }
        self.0.strip_prefix(dir)?.strip_prefix('/')
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
