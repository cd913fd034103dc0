use std::collections::{btree_map, BTreeMap};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleLevel {
    Off,
    Warn,
    Error,
}

impl RuleLevel {
    /// Parse an ESLint severity: `"off" | "warn" | "error"` (any case) or `0 | 1 | 2`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "off" => Some(RuleLevel::Off),
                "warn" => Some(RuleLevel::Warn),
                "error" => Some(RuleLevel::Error),
                _ => None,
            },
            Value::Number(num) => match severity_number(num)? {
                0 => Some(RuleLevel::Off),
                1 => Some(RuleLevel::Warn),
                2 => Some(RuleLevel::Error),
                _ => None,
            },
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RuleLevel::Off => "off",
            RuleLevel::Warn => "warn",
            RuleLevel::Error => "error",
        }
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, RuleLevel::Off)
    }
}

/// `2.0` is the same number as `2` in a JSON config.
fn severity_number(num: &Number) -> Option<u64> {
    num.as_u64().or_else(|| {
        num.as_f64()
            .filter(|value| value.fract() == 0.0 && (0.0..=2.0).contains(value))
            .map(|value| value as u64)
    })
}

impl Serialize for RuleLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single rule entry: its severity plus the options passed to the rule.
///
/// A later setting for the same rule replaces this one wholesale; options are
/// never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetting {
    pub level: RuleLevel,
    pub options: Vec<Value>,
}

impl RuleSetting {
    pub fn new(level: RuleLevel) -> Self {
        Self {
            level,
            options: Vec::new(),
        }
    }

    pub fn with_options(level: RuleLevel, options: Vec<Value>) -> Self {
        Self { level, options }
    }

    /// Validate one `rules` entry. Accepts a bare severity or `[severity, ...options]`.
    pub fn parse(name: &str, value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Array(items) => {
                let (first, rest) = items
                    .split_first()
                    .ok_or_else(|| ConfigError::malformed(name, value))?;
                let level = RuleLevel::from_value(first)
                    .ok_or_else(|| ConfigError::malformed(name, value))?;
                Ok(Self::with_options(level, rest.to_vec()))
            }
            other => RuleLevel::from_value(other)
                .map(Self::new)
                .ok_or_else(|| ConfigError::malformed(name, value)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.level.is_enabled()
    }
}

impl Serialize for RuleSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.options.is_empty() {
            return self.level.serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(self.options.len() + 1))?;
        seq.serialize_element(&self.level)?;
        for option in &self.options {
            seq.serialize_element(option)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, RuleSetting>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from the raw `rules` mapping of a config document.
    pub fn from_map(rules: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut parsed = BTreeMap::new();
        for (name, value) in rules {
            let setting = RuleSetting::parse(name, value)?;
            parsed.insert(name.clone(), setting);
        }
        Ok(Self { rules: parsed })
    }

    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(rules) = value else {
            return Err(ConfigError::InvalidDocument(format!(
                "rules should be a mapping, got {value}"
            )));
        };
        Self::from_map(rules)
    }

    pub fn insert(&mut self, name: impl Into<String>, setting: RuleSetting) -> Option<RuleSetting> {
        self.rules.insert(name.into(), setting)
    }

    pub fn get(&self, name: &str) -> Option<&RuleSetting> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RuleSetting> {
        self.rules.iter()
    }

    /// Rules whose severity is not `off`.
    pub fn enabled(&self) -> impl Iterator<Item = (&str, &RuleSetting)> {
        self.rules
            .iter()
            .filter(|(_, setting)| setting.is_enabled())
            .map(|(name, setting)| (name.as_str(), setting))
    }

    /// Shallow merge: every rule in `other` replaces the entry of the same name.
    pub fn merge(&mut self, other: &RuleSet) {
        for (name, setting) in &other.rules {
            self.rules.insert(name.clone(), setting.clone());
        }
    }
}

impl FromIterator<(String, RuleSetting)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (String, RuleSetting)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = (&'a String, &'a RuleSetting);
    type IntoIter = btree_map::Iter<'a, String, RuleSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
