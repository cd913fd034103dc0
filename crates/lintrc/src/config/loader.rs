use std::{
    env, fs,
    path::{Component, Path, PathBuf},
};

use tracing::debug;

use crate::error::ConfigError;

use super::config_object::ConfigObject;

/// Find `file_name` in `start_dir` or the nearest ancestor that has one.
pub fn find_config_file(start_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        let config_path = current.join(file_name);
        if config_path.is_file() {
            return Some(config_path);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    None
}

/// Load a JSON config document. `//` and `/* */` comments are allowed.
pub fn load_config(path: &Path) -> Result<ConfigObject, ConfigError> {
    debug!(path = %path.display(), "reading config file");
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
    let config = serde_json::from_str(&strip_json_comments(&content))
        .map_err(|err| ConfigError::Json(path.to_path_buf(), err))?;
    Ok(config)
}

/// Blank out comments while keeping line and column positions intact, so
/// parse errors still point at the right place.
pub fn strip_json_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(if next == '\t' { '\t' } else { ' ' });
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        out.push(' ');
                        break;
                    }
                    out.push(if next.is_whitespace() { next } else { ' ' });
                    prev = next;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Make `path` absolute and resolve `.`/`..` lexically, without touching the filesystem.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
