//! Source loading for `include`
//!
//! The engine never touches the file system itself; the host hands it a
//! [`SourceLoader`]. [`FsLoader`] resolves a path against the directory of
//! the including file first and the working directory second.

use std::fmt;
use std::path::{Path, PathBuf};

/// A loaded source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    /// Logical file name used in token locations
    pub name: String,
    pub text: String,
}

pub trait SourceLoader: fmt::Debug + Send {
    /// Load `path`, included from the file named `from`.
    fn load(&self, path: &str, from: &str) -> Result<LoadedSource, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    fn candidates(path: &str, from: &str) -> Vec<PathBuf> {
        let requested = Path::new(path);
        let mut candidates = Vec::new();
        if requested.is_relative() {
            if let Some(dir) = Path::new(from).parent() {
                candidates.push(dir.join(requested));
            }
        }
        candidates.push(requested.to_path_buf());
        candidates
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, path: &str, from: &str) -> Result<LoadedSource, String> {
        let mut last_error = format!("file '{}' not found", path);
        for candidate in Self::candidates(path, from) {
            match std::fs::read_to_string(&candidate) {
                Ok(text) => {
                    return Ok(LoadedSource {
                        name: candidate.display().to_string(),
                        text,
                    })
                }
                Err(e) => last_error = e.to_string(),
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_tries_including_directory_first() {
        let candidates = FsLoader::candidates("lib.finn", "demos/main.finn");
        assert_eq!(
            candidates,
            vec![PathBuf::from("demos/lib.finn"), PathBuf::from("lib.finn")]
        );
    }
}
