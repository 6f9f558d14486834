use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Rule, RuleGroup, RuleGroups};

/// Valid metric names, used for recording rule names.
static METRIC_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("metric name regex must compile")
});

/// Valid label names, used for label and annotation keys.
static LABEL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("label name regex must compile")
});

const METRIC_NAME_LABEL: &str = "__name__";

/// Validates the content of one rule file.
///
/// Returns the number of rules found, or every problem detected.
pub trait Validate {
    fn validate(&self, reader: &mut dyn Read) -> Result<usize, Vec<RuleError>>;
}

impl<F> Validate for F
where
    F: Fn(&mut dyn Read) -> Result<usize, Vec<RuleError>>,
{
    fn validate(&self, reader: &mut dyn Read) -> Result<usize, Vec<RuleError>> {
        self(reader)
    }
}

/// The default [`Validate`] implementation for YAML rule files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFileValidator;

impl Validate for RuleFileValidator {
    fn validate(&self, reader: &mut dyn Read) -> Result<usize, Vec<RuleError>> {
        validate_and_count(reader)
    }
}

/// A problem found in a rule file, optionally located at a group and rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleError {
    /// Name of the group the problem was found in.
    pub group: Option<String>,
    /// 1-based rule index within the group, and the rule's name.
    pub rule: Option<(usize, String)>,
    /// Human-readable message.
    pub message: String,
}

impl RuleError {
    /// An error not tied to any group (I/O or parse failure).
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            group: None,
            rule: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn in_group(group: &str, message: impl Into<String>) -> Self {
        Self {
            group: Some(group.to_string()),
            rule: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn in_rule(group: &str, index: usize, name: &str, message: impl Into<String>) -> Self {
        Self {
            group: Some(group.to_string()),
            rule: Some((index, name.to_string())),
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.group, &self.rule) {
            (Some(g), Some((i, name))) => write!(f, "group {g:?}, rule {i}, {name:?}: {}", self.message),
            (Some(g), None) => write!(f, "group {g:?}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RuleError {}

/// Read, parse and validate a rule file, returning its rule count.
///
/// A read or parse failure yields a single error; otherwise every group and
/// rule is checked and all problems are returned together.
pub fn validate_and_count(reader: &mut dyn Read) -> Result<usize, Vec<RuleError>> {
    let mut content = String::new();
    if let Err(e) = reader.read_to_string(&mut content) {
        return Err(vec![RuleError::new(format!("failed to read rule file: {e}"))]);
    }
    if is_blank_document(&content) {
        return Ok(0);
    }
    let groups: RuleGroups = serde_yaml_ng::from_str(&content)
        .map_err(|e| vec![RuleError::new(format!("failed to parse rule file: {e}"))])?;

    let errors = validate_groups(&groups);
    if errors.is_empty() {
        Ok(groups.groups.iter().map(|g| g.rules.len()).sum())
    } else {
        Err(errors)
    }
}

/// Check every group in a parsed rule file.
#[must_use]
pub fn validate_groups(groups: &RuleGroups) -> Vec<RuleError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for group in &groups.groups {
        if group.name.is_empty() {
            errors.push(RuleError::new("group name must not be empty"));
        } else if !seen.insert(group.name.as_str()) {
            errors.push(RuleError::in_group(
                &group.name,
                "group name is repeated in the same file",
            ));
        }
        errors.extend(validate_group_rules(group));
    }
    errors
}

fn validate_group_rules(group: &RuleGroup) -> Vec<RuleError> {
    group
        .rules
        .iter()
        .enumerate()
        .flat_map(|(i, rule)| {
            validate_rule(rule)
                .into_iter()
                .map(move |msg| RuleError::in_rule(&group.name, i + 1, rule.name(), msg))
        })
        .collect()
}

/// Check a single rule, returning one message per problem.
#[must_use]
pub fn validate_rule(rule: &Rule) -> Vec<String> {
    let mut problems = Vec::new();
    let record = rule.record.as_deref().unwrap_or("");
    let alert = rule.alert.as_deref().unwrap_or("");

    match (record.is_empty(), alert.is_empty()) {
        (false, false) => problems.push("only one of 'record' and 'alert' must be set".to_string()),
        (true, true) => problems.push("one of 'record' or 'alert' must be set".to_string()),
        _ => {}
    }

    match rule.expr.as_deref().map(str::trim) {
        None | Some("") => problems.push("field 'expr' must be set in rule".to_string()),
        Some(expr) => {
            if let Err(e) = check_expression(expr) {
                problems.push(format!("could not parse expression: {e}"));
            }
        }
    }

    if !record.is_empty() {
        if !rule.annotations.is_empty() {
            problems.push("invalid field 'annotations' in recording rule".to_string());
        }
        if rule.for_duration.is_some_and(|d| !d.is_zero()) {
            problems.push("invalid field 'for' in recording rule".to_string());
        }
        if rule.keep_firing_for.is_some_and(|d| !d.is_zero()) {
            problems.push("invalid field 'keep_firing_for' in recording rule".to_string());
        }
        if !METRIC_NAME_RE.is_match(record) {
            problems.push(format!("invalid recording rule name: {record}"));
        }
    }

    for name in rule.labels.keys() {
        if name == METRIC_NAME_LABEL || !LABEL_NAME_RE.is_match(name) {
            problems.push(format!("invalid label name: {name}"));
        }
    }

    if !alert.is_empty() {
        for name in rule.annotations.keys() {
            if !LABEL_NAME_RE.is_match(name) {
                problems.push(format!("invalid annotation name: {name}"));
            }
        }
    }

    problems
}

/// Structural check of a query expression: brackets balance and every
/// quoted string is terminated. Comments run from `#` to end of line.
pub fn check_expression(expr: &str) -> Result<(), String> {
    let mut stack: Vec<char> = Vec::new();
    let mut chars = expr.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                let quote = c;
                let mut closed = false;
                while let Some(n) = chars.next() {
                    if n == '\\' && quote != '`' {
                        chars.next();
                    } else if n == quote {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err("unterminated quoted string".to_string());
                }
            }
            '#' => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        break;
                    }
                }
            }
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(open) {
                    return Err(format!("unexpected {c:?}"));
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some('(') => Err("unclosed left parenthesis".to_string()),
        Some('[') => Err("unclosed left bracket".to_string()),
        Some(_) => Err("unclosed left brace".to_string()),
        None => Ok(()),
    }
}

/// `true` when the document holds nothing but whitespace, comments and
/// document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#') || t == "---" || t == "..."
    })
}
