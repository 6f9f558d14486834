//! Ordered, append-only accumulator for errors collected during a run.
//!
//! A run never stops at the first failure; every failure is pushed here and
//! the accumulator is turned into a single result once at the end.

use std::fmt;

use crate::errors::CheckError;

/// An ordered collection of [`CheckError`]s that renders as one error.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<CheckError>,
}

impl MultiError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one error.
    pub fn add(&mut self, err: impl Into<CheckError>) {
        self.errors.push(err.into());
    }

    /// Append an error if present. `None` leaves the accumulator untouched.
    pub fn add_opt(&mut self, err: Option<impl Into<CheckError>>) {
        if let Some(err) = err {
            self.add(err);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate the collected errors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CheckError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise the whole collection.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// One error renders as itself; several render as `"N errors: e1; e2"`.
impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() > 1 {
            write!(f, "{} errors: ", self.errors.len())?;
        }
        for (i, err) in self.errors.iter().enumerate() {
            if i != 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

impl Extend<CheckError> for MultiError {
    fn extend<I: IntoIterator<Item = CheckError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for MultiError {
    type Item = CheckError;
    type IntoIter = std::vec::IntoIter<CheckError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a CheckError;
    type IntoIter = std::slice::Iter<'a, CheckError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
