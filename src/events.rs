//! Progress events emitted while checking rule files, and the loggers that
//! consume them.
//!
//! The event stream doubles as the human-readable report of a run: one
//! "checking" event per pattern and per matched file, followed by a SUCCESS
//! or FAILED result. [`CheckEvent::to_logfmt`] gives each event a stable
//! single-line rendering.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a [`CheckEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

/// One step of a rules check, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    /// A pattern is about to be expanded.
    CheckingPattern { pattern: String },
    /// A pattern failed to expand or matched nothing.
    PatternFailed { pattern: String, error: String },
    /// A matched file is about to be opened.
    CheckingFile { path: PathBuf },
    /// A matched file could not be opened.
    OpenFailed { path: PathBuf, error: String },
    /// A file failed validation; its individual errors follow.
    ValidationFailed { path: PathBuf, errors: usize },
    /// One validation error of the preceding failed file.
    RuleError { path: PathBuf, error: String },
    /// A file passed validation.
    Success { path: PathBuf, rules: usize },
}

impl CheckEvent {
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            CheckEvent::CheckingPattern { .. }
            | CheckEvent::CheckingFile { .. }
            | CheckEvent::Success { .. } => Level::Info,
            CheckEvent::PatternFailed { .. }
            | CheckEvent::OpenFailed { .. }
            | CheckEvent::ValidationFailed { .. }
            | CheckEvent::RuleError { .. } => Level::Error,
        }
    }

    /// The event's fields as ordered key/value pairs.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CheckEvent::CheckingPattern { pattern } => {
                vec![("msg", "checking".into()), ("pattern", pattern.clone())]
            }
            CheckEvent::CheckingFile { path } => vec![
                ("msg", "checking".into()),
                ("filename", path.display().to_string()),
            ],
            CheckEvent::PatternFailed { error, .. } | CheckEvent::OpenFailed { error, .. } => {
                vec![("result", "FAILED".into()), ("error", error.clone())]
            }
            CheckEvent::ValidationFailed { .. } => vec![("result", "FAILED".into())],
            CheckEvent::RuleError { error, .. } => vec![("error", error.clone())],
            CheckEvent::Success { rules, .. } => vec![
                ("result", "SUCCESS".into()),
                ("rules found", rules.to_string()),
            ],
        }
    }

    /// Render as a logfmt line without the level, e.g.
    /// `result=SUCCESS "rules found"=3`.
    #[must_use]
    pub fn to_logfmt(&self) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.fields().iter().enumerate() {
            if i != 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", logfmt_quote(key), logfmt_quote(value));
        }
        out
    }
}

/// Quote a logfmt key or value when it contains spaces, `=`, quotes or
/// control characters.
fn logfmt_quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s
            .chars()
            .any(|c| c == ' ' || c == '=' || c == '"' || c.is_control());
    if needs_quotes {
        format!("{s:?}")
    } else {
        s.to_string()
    }
}

/// Receives check events. Implementations must not fail.
pub trait Logger {
    fn log(&self, event: &CheckEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, event: &CheckEvent) {
        match event {
            CheckEvent::CheckingPattern { pattern } => {
                tracing::info!(pattern = %pattern, "checking");
            }
            CheckEvent::CheckingFile { path } => {
                tracing::info!(filename = %path.display(), "checking");
            }
            CheckEvent::PatternFailed { error, .. } | CheckEvent::OpenFailed { error, .. } => {
                tracing::error!(result = %"FAILED", error = %error);
            }
            CheckEvent::ValidationFailed { .. } => {
                tracing::error!(result = %"FAILED");
            }
            CheckEvent::RuleError { error, .. } => {
                tracing::error!(error = %error);
            }
            CheckEvent::Success { rules, .. } => {
                tracing::info!(result = %"SUCCESS", "rules found" = rules);
            }
        }
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    events: Arc<Mutex<Vec<CheckEvent>>>,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<CheckEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded events rendered as `level=<lvl> <logfmt>` lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| format!("level={} {}", e.level().as_str(), e.to_logfmt()))
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &CheckEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
