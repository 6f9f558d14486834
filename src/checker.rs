//! Batch rule checking: expand patterns, open and validate every match, and
//! collect every failure.
//!
//! A failure on one pattern or file never stops the rest of the run, so a
//! single invocation reports every broken rule file.

use crate::errors::CheckError;
use crate::events::{CheckEvent, Logger};
use crate::expand::{Expand, FsGlob, FsOpener, Open};
use crate::multierror::MultiError;
use crate::validator::{RuleFileValidator, Validate};

/// Checks rule files matched by glob patterns.
///
/// All collaborators are injected; [`RulesChecker::new`] wires the
/// filesystem glob, the filesystem opener and the YAML rule validator.
pub struct RulesChecker {
    logger: Box<dyn Logger>,
    expander: Box<dyn Expand>,
    opener: Box<dyn Open>,
    validator: Box<dyn Validate>,
}

impl RulesChecker {
    #[must_use]
    pub fn new(logger: impl Logger + 'static) -> Self {
        Self {
            logger: Box::new(logger),
            expander: Box::new(FsGlob),
            opener: Box::new(FsOpener),
            validator: Box::new(RuleFileValidator),
        }
    }

    #[must_use]
    pub fn with_expander(mut self, expander: impl Expand + 'static) -> Self {
        self.expander = Box::new(expander);
        self
    }

    #[must_use]
    pub fn with_opener(mut self, opener: impl Open + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Check every pattern in order.
    ///
    /// # Errors
    /// Returns every expansion, open and validation failure, in the order
    /// they were encountered.
    pub fn check<S: AsRef<str>>(&self, patterns: &[S]) -> Result<(), MultiError> {
        let mut failed = MultiError::new();
        for pattern in patterns {
            self.check_pattern(pattern.as_ref(), &mut failed);
        }
        failed.into_result()
    }

    fn check_pattern(&self, pattern: &str, failed: &mut MultiError) {
        self.logger.log(&CheckEvent::CheckingPattern {
            pattern: pattern.to_string(),
        });

        let matches = match self.expander.expand(pattern) {
            Ok(paths) if !paths.is_empty() => paths,
            other => {
                let err = CheckError::NoMatch {
                    pattern: pattern.to_string(),
                    source: other.err().map(Box::new),
                };
                self.logger.log(&CheckEvent::PatternFailed {
                    pattern: pattern.to_string(),
                    error: err.to_string(),
                });
                failed.add(err);
                return;
            }
        };

        for path in matches {
            self.logger
                .log(&CheckEvent::CheckingFile { path: path.clone() });

            // The reader lives only for this iteration.
            let mut reader = match self.opener.open(&path) {
                Ok(r) => r,
                Err(source) => {
                    let err = CheckError::Open {
                        path: path.clone(),
                        source,
                    };
                    self.logger.log(&CheckEvent::OpenFailed {
                        path,
                        error: err.to_string(),
                    });
                    failed.add(err);
                    continue;
                }
            };

            match self.validator.validate(&mut reader) {
                Ok(rules) => {
                    self.logger.log(&CheckEvent::Success { path, rules });
                }
                Err(errors) => {
                    self.logger.log(&CheckEvent::ValidationFailed {
                        path: path.clone(),
                        errors: errors.len(),
                    });
                    for source in errors {
                        self.logger.log(&CheckEvent::RuleError {
                            path: path.clone(),
                            error: source.to_string(),
                        });
                        failed.add(CheckError::Rule {
                            path: path.clone(),
                            source,
                        });
                    }
                }
            }
        }
    }
}

/// Check rule files matched by `patterns` using the filesystem and the
/// default rule validator.
///
/// # Errors
/// Returns the collected failures when any pattern, file or rule failed.
pub fn check_rules_files<S: AsRef<str>>(
    logger: impl Logger + 'static,
    patterns: &[S],
) -> Result<(), MultiError> {
    RulesChecker::new(logger).check(patterns)
}
