//! Line-delimited JSON reader
//!
//! Files are discovered with `walkdir` at the pattern's depth, sorted by
//! path, and read lazily one line at a time.

use super::pattern::FilePattern;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// Reader over all files under `root` selected by a pattern
///
/// Each call to [`SourceReader::iter`] walks the tree again, so the sequence
/// can be consumed any number of times.
#[derive(Debug, Clone)]
pub struct SourceReader<T> {
    /// Directory the pattern is relative to
    root: PathBuf,
    /// File selection pattern
    pattern: FilePattern,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SourceReader<T> {
    /// Create a reader for the given root and pattern
    pub fn new(root: impl Into<PathBuf>, pattern: FilePattern) -> Self {
        Self {
            root: root.into(),
            pattern,
            _record: PhantomData,
        }
    }

    /// File selection pattern
    pub fn pattern(&self) -> &FilePattern {
        &self.pattern
    }

    /// List matching files in path order
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::SourceNotFound {
                path: self.root.display().to_string(),
            });
        }

        let depth = self.pattern.depth();
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(depth)
            .max_depth(depth)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::Other(format!("Path outside source root: {e}")))?;
            if self.pattern.matches(relative) {
                files.push(entry.into_path());
            }
        }

        debug!(
            root = %self.root.display(),
            pattern = self.pattern.as_str(),
            files = files.len(),
            "Discovered source files"
        );

        Ok(files)
    }

    /// Lazily iterate over every record of every matching file
    pub fn iter(&self) -> Result<RecordIter<T>> {
        Ok(RecordIter::new(self.files()?))
    }

    /// Read every record, failing on the first malformed one
    pub fn read_all(&self) -> Result<Vec<T>> {
        self.iter()?.collect()
    }
}

/// Lazy record iterator over a list of files
///
/// Stops after the first error.
pub struct RecordIter<T> {
    /// Files not yet opened
    pending: std::vec::IntoIter<PathBuf>,
    /// File currently being read
    current: Option<OpenFile>,
    /// Set once an error has been yielded
    failed: bool,
    _record: PhantomData<fn() -> T>,
}

struct OpenFile {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl<T> RecordIter<T> {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            pending: files.into_iter(),
            current: None,
            failed: false,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> RecordIter<T> {
    fn next_record(&mut self) -> Option<Result<T>> {
        loop {
            if self.current.is_none() {
                let path = self.pending.next()?;
                match File::open(&path) {
                    Ok(file) => {
                        debug!(path = %path.display(), "Reading source file");
                        self.current = Some(OpenFile {
                            path,
                            lines: BufReader::new(file).lines(),
                            line_no: 0,
                        });
                    }
                    Err(e) => {
                        return Some(Err(Error::Other(format!(
                            "Failed to open {}: {e}",
                            path.display()
                        ))))
                    }
                }
            }

            let open = self.current.as_mut()?;
            match open.lines.next() {
                None => {
                    self.current = None;
                }
                Some(Err(e)) => {
                    return Some(Err(Error::source_parse(
                        open.path.display().to_string(),
                        open.line_no + 1,
                        format!("Failed to read line: {e}"),
                    )));
                }
                Some(Ok(line)) => {
                    open.line_no += 1;
                    let path = open.path.display().to_string();
                    if let Some(record) = parse_line(&path, open.line_no, &line) {
                        return Some(record);
                    }
                }
            }
        }
    }
}

/// Parse one source line; `None` for blank lines
pub(super) fn parse_line<T: DeserializeOwned>(
    path: &str,
    line_no: usize,
    line: &str,
) -> Option<Result<T>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line).map_err(|e| Error::source_parse(path, line_no, e.to_string())))
}

impl<T: DeserializeOwned> Iterator for RecordIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_record();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}
