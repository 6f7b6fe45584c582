//! Source location
//!
//! The pipeline input is either a local directory tree or an object-store
//! prefix given as `s3://`, `r2://`, `gs://` or `az://` URL.

use super::object::ObjectSourceReader;
use super::pattern::FilePattern;
use super::reader::SourceReader;
use crate::config::StorageCredentials;
use crate::error::{Error, Result};
use crate::output::Destination;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Where source files are read from
#[derive(Debug, Clone)]
pub enum SourceLocation {
    /// Local directory tree
    Local(PathBuf),
    /// Prefix in an object store
    ObjectStore(Destination),
}

impl SourceLocation {
    /// Parse an input location
    ///
    /// Object-store URLs use the same credentials as the destination. Any
    /// other value, with or without `file://`, is a local directory.
    pub fn parse(input: &str, credentials: &StorageCredentials) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::missing_field("input"));
        }
        if Destination::is_object_store_url(input) {
            return Ok(Self::ObjectStore(Destination::parse(input, credentials)?));
        }
        Ok(Self::Local(PathBuf::from(
            input.strip_prefix("file://").unwrap_or(input),
        )))
    }

    /// Check if the source lives in an object store
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::ObjectStore(_))
    }

    /// Read every record selected by `pattern`, failing on the first
    /// malformed line
    ///
    /// Local files are read on the blocking pool.
    pub async fn read_all<T>(&self, pattern: FilePattern) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self {
            Self::Local(root) => {
                let reader: SourceReader<T> = SourceReader::new(root.clone(), pattern);
                tokio::task::spawn_blocking(move || reader.read_all())
                    .await
                    .map_err(|e| Error::Other(format!("Source read task failed: {e}")))?
            }
            Self::ObjectStore(location) => {
                ObjectSourceReader::new(location.clone(), pattern)
                    .read_all()
                    .await
            }
        }
    }
}

