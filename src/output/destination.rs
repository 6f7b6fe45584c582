//! Output destinations (local filesystem, S3, R2, GCS, Azure, in-memory)

use crate::config::StorageCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;

/// URL schemes backed by a remote object store
const OBJECT_STORE_SCHEMES: [&str; 4] = ["s3", "r2", "gs", "az"];

/// Destination root parsed from a URL or local path
#[derive(Debug, Clone)]
pub struct Destination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging (s3, r2, gs, az, file, memory)
    scheme: String,
    /// Root directory for local destinations
    local_root: Option<PathBuf>,
}

impl Destination {
    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible, needs `endpoint`)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    ///
    /// Credentials come only from `credentials`; the process environment is
    /// never consulted.
    pub fn parse(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::s3(rest, credentials, false)
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::s3(rest, credentials, true)
        } else if let Some(rest) = url.strip_prefix("gs://") {
            Self::gcs(rest, credentials)
        } else if let Some(rest) = url.strip_prefix("az://") {
            Self::azure(rest, credentials)
        } else {
            Self::local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// In-memory destination
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: String::new(),
            scheme: "memory".to_string(),
            local_root: None,
        }
    }

    fn s3(rest: &str, credentials: &StorageCredentials, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(rest, scheme)?;

        let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
        if let Some(key) = &credentials.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &credentials.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        if let Some(region) = &credentials.region {
            builder = builder.with_region(region);
        } else if is_r2 {
            builder = builder.with_region("auto");
        }
        match &credentials.endpoint {
            Some(endpoint) => builder = builder.with_endpoint(endpoint),
            None if is_r2 => return Err(Error::missing_field("credentials.endpoint")),
            None => {}
        }
        if credentials.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            local_root: None,
        })
    }

    fn gcs(rest: &str, credentials: &StorageCredentials) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest, "gs")?;

        let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);
        if let Some(path) = &credentials.service_account_path {
            builder = builder.with_service_account_path(path);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            local_root: None,
        })
    }

    fn azure(rest: &str, credentials: &StorageCredentials) -> Result<Self> {
        let (container, prefix) = split_bucket(rest, "az")?;

        let mut builder = MicrosoftAzureBuilder::new().with_container_name(container);
        if let Some(account) = &credentials.account_name {
            builder = builder.with_account(account);
        }
        if let Some(key) = &credentials.account_key {
            builder = builder.with_access_key(key);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            local_root: None,
        })
    }

    fn local(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(Error::missing_field("output"));
        }

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            local_root: Some(PathBuf::from(path)),
        })
    }

    /// Check whether a location is an object-store URL rather than a local path
    pub fn is_object_store_url(url: &str) -> bool {
        OBJECT_STORE_SCHEMES
            .iter()
            .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| rest.starts_with("://")))
    }

    /// Check if this is a cloud destination (not local or in-memory)
    pub fn is_cloud(&self) -> bool {
        self.local_root.is_none() && self.scheme != "memory"
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Full object path of a location below the root
    ///
    /// The relative path is taken as already encoded, so escaped partition
    /// values such as `artist_id=A%2FB` are stored verbatim.
    fn object_path(&self, relative: &str) -> Result<ObjectPath> {
        let relative = relative.trim_matches('/');
        let prefix = self.prefix.trim_matches('/');
        let full = match (prefix.is_empty(), relative.is_empty()) {
            (true, _) => relative.to_string(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{prefix}/{relative}"),
        };
        ObjectPath::parse(&full)
            .map_err(|e| Error::output(format!("Invalid object path '{full}': {e}")))
    }

    /// Write bytes to a file below the destination root
    ///
    /// Returns the full path for logging.
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(relative)?;

        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;

        Ok(format!("{}://{path}", self.scheme))
    }

    /// Read a file below the destination root
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let path = self.object_path(relative)?;
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(bytes)
    }

    /// List files below a directory, relative to the destination root, sorted
    pub async fn list(&self, relative_dir: &str) -> Result<Vec<String>> {
        let dir = self.object_path(relative_dir)?;
        let objects: Vec<_> = self.store.list(Some(&dir)).try_collect().await?;

        let root = self.object_path("")?;
        let mut files: Vec<String> = objects
            .into_iter()
            .map(|meta| {
                let full = meta.location.to_string();
                match root.as_ref() {
                    "" => full,
                    root => full
                        .strip_prefix(&format!("{root}/"))
                        .map_or(full.clone(), str::to_string),
                }
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Remove everything below a directory
    ///
    /// A missing directory is not an error. Returns the number of files
    /// deleted.
    pub async fn remove_dir(&self, relative_dir: &str) -> Result<usize> {
        let dir = self.object_path(relative_dir)?;
        let objects: Vec<_> = match self.store.list(Some(&dir)).try_collect().await {
            Ok(objects) => objects,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for meta in objects {
            match self.store.delete(&meta.location).await {
                Ok(()) => removed += 1,
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        // Object stores have no directories; clear the empty local tree too
        if let Some(root) = &self.local_root {
            let local = root.join(relative_dir.trim_matches('/'));
            match tokio::fs::remove_dir_all(&local).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(removed)
    }
}

/// Split `bucket/prefix/...` into bucket and prefix
fn split_bucket(rest: &str, scheme: &str) -> Result<(String, String)> {
    let (bucket, prefix) = match rest.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix.trim_matches('/').to_string()),
        None => (rest, String::new()),
    };
    if bucket.is_empty() {
        return Err(Error::config(format!("Missing bucket in {scheme}:// URL")));
    }
    Ok((bucket.to_string(), prefix))
}
