//! Lazy, depth-first walk over the input roots.

use crate::error::{CompressionError, Result};
use crate::logger::Logger;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GLOB_METACHARACTERS: &[char] = &['*', '?', '['];

/// Yields every non-directory entry under the given roots as an absolute
/// path. Errors are per root (or per subtree) and never end the sequence.
pub struct FileEnumerator {
    pending: VecDeque<PathBuf>,
    current: Option<walkdir::IntoIter>,
    logger: Logger,
}

impl FileEnumerator {
    pub fn new<P: AsRef<Path>>(roots: &[P], logger: Logger) -> Self {
        Self {
            pending: roots.iter().map(|root| root.as_ref().to_path_buf()).collect(),
            current: None,
            logger,
        }
    }

    /// Queues the matches of `pattern` ahead of the remaining roots.
    fn expand_glob(&mut self, pattern: &Path) -> Result<()> {
        let pattern_str = pattern.to_string_lossy();
        let mut matches = Vec::new();
        for entry in glob::glob(&pattern_str)? {
            match entry {
                Ok(path) => matches.push(path),
                Err(e) => self
                    .logger
                    .warn(format!("Error reading glob match {}: {}", e.path().display(), e)),
            }
        }

        if matches.is_empty() {
            self.logger
                .warn(format!("No files match pattern: {}", pattern_str));
        } else {
            self.logger.verbose(format!(
                "Pattern {} matched {} paths",
                pattern_str,
                matches.len()
            ));
        }

        for path in matches.into_iter().rev() {
            self.pending.push_front(path);
        }
        Ok(())
    }

    fn open_root(&mut self, root: PathBuf) -> Option<Result<PathBuf>> {
        let root = match std::path::absolute(&root) {
            Ok(absolute) => absolute,
            Err(source) => {
                return Some(Err(CompressionError::RootInaccessible { path: root, source }))
            }
        };

        match fs::metadata(&root) {
            Ok(_) => {
                self.current = Some(WalkDir::new(root).into_iter());
                None
            }
            Err(_) if is_glob_pattern(&root) => self.expand_glob(&root).err().map(Err),
            Err(source) => Some(Err(CompressionError::RootInaccessible { path: root, source })),
        }
    }
}

impl Iterator for FileEnumerator {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(walker) = self.current.as_mut() {
                match walker.next() {
                    Some(Ok(entry)) if entry.file_type().is_dir() => continue,
                    Some(Ok(entry)) => return Some(Ok(entry.into_path())),
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.current = None,
                }
                continue;
            }

            let root = self.pending.pop_front()?;
            if let Some(item) = self.open_root(root) {
                return Some(item);
            }
        }
    }
}

fn is_glob_pattern(path: &Path) -> bool {
    path.to_string_lossy().contains(GLOB_METACHARACTERS)
}
