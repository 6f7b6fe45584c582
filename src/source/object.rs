//! Object-store source reader
//!
//! Keys are listed below the pattern's literal prefix, filtered with the
//! same matcher as local sources and read in key order. Each object body is
//! split into lines and parsed with the local reader's rules, so the first
//! malformed line fails the read.

use super::pattern::FilePattern;
use super::reader::parse_line;
use crate::error::{Error, Result};
use crate::output::Destination;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::io::BufRead;
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// Reader over the objects below a store location selected by a pattern
#[derive(Debug, Clone)]
pub struct ObjectSourceReader<T> {
    /// Store and prefix the pattern is relative to
    location: Destination,
    /// Key selection pattern
    pattern: FilePattern,
    _record: PhantomData<fn() -> T>,
}

impl<T> ObjectSourceReader<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a reader for the given location and pattern
    pub fn new(location: Destination, pattern: FilePattern) -> Self {
        Self {
            location,
            pattern,
            _record: PhantomData,
        }
    }

    /// List matching keys in key order, relative to the location
    ///
    /// A prefix holding no objects at all is reported as a missing source.
    pub async fn files(&self) -> Result<Vec<String>> {
        let prefix = self.pattern.literal_prefix();
        let keys = match self.location.list(prefix).await {
            Ok(keys) => keys,
            Err(Error::ObjectStore(object_store::Error::NotFound { .. })) => Vec::new(),
            Err(e) => return Err(e),
        };
        if keys.is_empty() {
            return Err(Error::SourceNotFound {
                path: format!("{}://{prefix}", self.location.scheme()),
            });
        }

        let files: Vec<String> = keys
            .into_iter()
            .filter(|key| self.pattern.matches(Path::new(key)))
            .collect();

        debug!(
            scheme = self.location.scheme(),
            pattern = self.pattern.as_str(),
            files = files.len(),
            "Discovered source objects"
        );

        Ok(files)
    }

    /// Read every record of every matching object, failing on the first
    /// malformed one
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let mut bodies = Vec::new();
        for key in self.files().await? {
            debug!(key = %key, "Reading source object");
            let body = self.location.get(&key).await?;
            bodies.push((key, body));
        }

        tokio::task::spawn_blocking(move || parse_objects(&bodies))
            .await
            .map_err(|e| Error::Other(format!("Source parse task failed: {e}")))?
    }
}

/// Parse object bodies in order
fn parse_objects<T: DeserializeOwned>(bodies: &[(String, Bytes)]) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for (key, body) in bodies {
        for (index, line) in body.as_ref().lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| {
                Error::source_parse(key.as_str(), line_no, format!("Failed to read line: {e}"))
            })?;
            if let Some(record) = parse_line(key, line_no, &line) {
                records.push(record?);
            }
        }
    }
    Ok(records)
}
