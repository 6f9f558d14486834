//! Filesystem collaborators: glob expansion and opening matched files.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::errors::{CheckError, Result};

/// Expands a pattern into concrete paths.
pub trait Expand {
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

impl<F> Expand for F
where
    F: Fn(&str) -> Result<Vec<PathBuf>>,
{
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self(pattern)
    }
}

/// Opens a path for reading.
pub trait Open {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;
}

impl<F> Open for F
where
    F: Fn(&Path) -> io::Result<Box<dyn Read>>,
{
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        self(path)
    }
}

/// Glob expansion against the local filesystem.
///
/// Matches come back in the order produced by the `glob` crate, which is
/// sorted and therefore stable between runs. Entries that cannot be read
/// are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlob;

impl Expand for FsGlob {
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern).map_err(|e| CheckError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(paths.filter_map(std::result::Result::ok).collect())
    }
}

/// Opens regular files with a buffered reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl Open for FsOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn glob_matches_are_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.yml", "a.yml", "c.yaml"] {
            fs::write(dir.path().join(name), "groups: []\n").unwrap();
        }
        let pattern = dir.path().join("*.yml");
        let matches = FsGlob.expand(pattern.to_str().unwrap()).unwrap();
        assert_eq!(
            matches,
            [dir.path().join("a.yml"), dir.path().join("b.yml")]
        );
    }

    #[test]
    fn glob_without_matches_is_empty_not_error() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("missing-*.yml");
        let matches = FsGlob.expand(pattern.to_str().unwrap()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn invalid_glob_syntax_is_error() {
        let err = FsGlob.expand("rules/[.yml").unwrap_err();
        assert!(matches!(err, CheckError::InvalidPattern { .. }));
        assert!(err.to_string().contains("rules/[.yml"));
    }

    #[test]
    fn opener_reads_file_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.yml");
        fs::write(&path, "groups: []\n").unwrap();
        let mut content = String::new();
        FsOpener
            .open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "groups: []\n");
    }

    #[test]
    fn opener_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = FsOpener.open(&dir.path().join("gone.yml")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
