use std::collections::BTreeMap;

use crate::error::ConfigError;

use super::{FileMatcher, RuleSet, TargetPath};

/// A glob-scoped partial rule set, applied on top of the base rules for
/// every file its patterns match.
#[derive(Debug, Clone)]
pub struct OverrideBlock {
    files: FileMatcher,
    rules: RuleSet,
    env: BTreeMap<String, bool>,
}

impl OverrideBlock {
    pub fn new<S: AsRef<str>>(files: &[S], rules: RuleSet) -> Result<Self, ConfigError> {
        let files = to_strings(files);
        Ok(Self {
            files: FileMatcher::new(&files, &[])?,
            rules,
            env: BTreeMap::new(),
        })
    }

    pub fn with_excluded_files<S: AsRef<str>>(self, excluded: &[S]) -> Result<Self, ConfigError> {
        let files = FileMatcher::new(self.files.files(), &to_strings(excluded))?;
        Ok(Self { files, ..self })
    }

    pub fn with_env(mut self, env: BTreeMap<String, bool>) -> Self {
        self.env = env;
        self
    }

    pub fn matches(&self, path: &TargetPath) -> bool {
        self.files.is_match(path.as_str())
    }

    pub fn files(&self) -> &FileMatcher {
        &self.files
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn env(&self) -> &BTreeMap<String, bool> {
        &self.env
    }
}

fn to_strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| item.as_ref().to_string()).collect()
}
