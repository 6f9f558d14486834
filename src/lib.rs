//! Batch validation of alerting and recording rule files.
//!
//! [`RulesChecker`] expands glob patterns, opens and validates every matched
//! file, and collects every failure into a [`MultiError`] instead of stopping
//! at the first one. Its collaborators (glob expansion, file opening, rule
//! validation and logging) are traits so they can be swapped out.

pub mod checker;
pub mod duration;
pub mod errors;
pub mod events;
pub mod expand;
pub mod models;
pub mod multierror;
pub mod validator;

// Re-export key types at crate root for convenience.
pub use checker::{check_rules_files, RulesChecker};
pub use errors::{CheckError, Result};
pub use events::{CheckEvent, Level, Logger, MemoryLogger, TracingLogger};
pub use expand::{Expand, FsGlob, FsOpener, Open};
pub use models::{PartialResponseStrategy, Rule, RuleGroup, RuleGroups};
pub use multierror::MultiError;
pub use validator::{validate_and_count, RuleError, RuleFileValidator, Validate};
