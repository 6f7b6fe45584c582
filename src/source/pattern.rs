//! File selection patterns
//!
//! A pattern such as `song_data/*/*/*/*.json` is split on `/`; each segment
//! matches exactly one path component, so the segment count is also the
//! depth at which matching files live below the root.

use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;

/// Compiled glob pattern over paths relative to a source root
#[derive(Debug, Clone)]
pub struct FilePattern {
    /// Pattern as written
    raw: String,
    /// Anchored regex over `/`-joined relative paths
    regex: Regex,
    /// Number of path components a match has
    depth: usize,
    /// Leading directory segments without wildcards
    prefix: String,
}

impl FilePattern {
    /// Parse a glob pattern
    ///
    /// `*` matches any run of characters within one component, `?` matches a
    /// single character, everything else is literal.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::pattern(pattern, "pattern is empty"));
        }

        let parts: Vec<&str> = trimmed.split('/').collect();
        let mut segments = Vec::new();
        for &segment in &parts {
            if segment.is_empty() {
                return Err(Error::pattern(pattern, "pattern contains an empty segment"));
            }
            if segment == "." || segment == ".." {
                return Err(Error::pattern(pattern, "relative segments are not supported"));
            }
            segments.push(segment_to_regex(segment));
        }

        let regex = Regex::new(&format!("^{}$", segments.join("/")))?;
        let prefix = parts[..parts.len() - 1]
            .iter()
            .take_while(|segment| !segment.contains(['*', '?']))
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            raw: pattern.to_string(),
            regex,
            depth: segments.len(),
            prefix,
        })
    }

    /// Pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of path components below the root
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Directory every match lives under
    ///
    /// `log_data/2018/*/*.json` gives `log_data/2018`. Object-store sources
    /// list only below this prefix.
    pub fn literal_prefix(&self) -> &str {
        &self.prefix
    }

    /// Check a path relative to the source root
    pub fn matches(&self, relative: &Path) -> bool {
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.regex.is_match(&joined)
    }
}

fn segment_to_regex(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() * 2);
    for ch in segment.chars() {
        match ch {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}
