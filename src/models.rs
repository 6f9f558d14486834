use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_yaml_ng::Value;

use crate::duration::RuleDuration;

/// Top-level content of a rule file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroups {
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

/// A named group of rules evaluated together.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub interval: Option<RuleDuration>,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub partial_response_strategy: Option<PartialResponseStrategy>,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// How a group behaves when some stores fail to answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialResponseStrategy {
    Warn,
    #[default]
    Abort,
}

impl<'de> Deserialize<'de> for PartialResponseStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "abort" => Ok(Self::Abort),
            _ => Err(serde::de::Error::custom(format!(
                "unknown partial_response_strategy {s:?}, expected one of: warn, abort"
            ))),
        }
    }
}

impl fmt::Display for PartialResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// A single alerting or recording rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default)]
    pub record: Option<String>,

    #[serde(default)]
    pub alert: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub expr: Option<String>,

    #[serde(default, rename = "for")]
    pub for_duration: Option<RuleDuration>,

    #[serde(default)]
    pub keep_firing_for: Option<RuleDuration>,

    #[serde(default, deserialize_with = "scalar_map")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "scalar_map")]
    pub annotations: BTreeMap<String, String>,
}

impl Rule {
    /// The rule's `alert` or `record` name, whichever is set.
    #[must_use]
    pub fn name(&self) -> &str {
        self.alert
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.record.as_deref())
            .unwrap_or("")
    }
}

/// Render a YAML scalar the way it is written; `None` for null or non-scalars.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_to_string(&other)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a string")),
    }
}

fn scalar_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let value = match value {
            Value::Null => String::new(),
            other => scalar_to_string(&other).ok_or_else(|| {
                serde::de::Error::custom(format!("value of {key:?} must be a string"))
            })?,
        };
        out.insert(key, value);
    }
    Ok(out)
}
