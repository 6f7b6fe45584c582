//! Pipeline configuration
//!
//! Input/output locations, source file patterns, storage credentials and
//! Parquet settings. Loaded from YAML (JSON is valid YAML) and passed
//! explicitly into the reader and writer; nothing is read from the process
//! environment.

use crate::error::{Error, Result, ResultExt};
use crate::output::ParquetWriterConfig;
use crate::source::FilePattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// Top-Level Pipeline Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root holding `song_data/` and `log_data/` (local path or
    /// `s3://`, `r2://`, `gs://`, `az://` URL)
    #[serde(default)]
    pub input: String,

    /// Destination root (local path or `s3://`, `r2://`, `gs://`, `az://` URL)
    #[serde(default)]
    pub output: String,

    /// Pattern selecting catalog files, relative to `input`
    #[serde(default = "default_song_pattern")]
    pub song_pattern: String,

    /// Pattern selecting event log files, relative to `input`
    #[serde(default = "default_log_pattern")]
    pub log_pattern: String,

    /// Credentials for cloud destinations
    #[serde(default)]
    pub credentials: StorageCredentials,

    /// Parquet output settings
    #[serde(default)]
    pub parquet: ParquetSettings,
}

fn default_song_pattern() -> String {
    "song_data/*/*/*/*.json".to_string()
}

fn default_log_pattern() -> String {
    "log_data/*/*/*.json".to_string()
}

impl PipelineConfig {
    /// Create a config for the given input root and destination
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            song_pattern: default_song_pattern(),
            log_pattern: default_log_pattern(),
            credentials: StorageCredentials::default(),
            parquet: ParquetSettings::default(),
        }
    }

    /// Load config from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Override the input root
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Override the destination
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Check that required fields are present and patterns compile
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::missing_field("input"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::missing_field("output"));
        }
        FilePattern::parse(&self.song_pattern)
            .map_err(|e| Error::invalid_value("song_pattern", e.to_string()))?;
        FilePattern::parse(&self.log_pattern)
            .map_err(|e| Error::invalid_value("log_pattern", e.to_string()))?;
        if self.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Compiled catalog file pattern
    pub fn song_file_pattern(&self) -> Result<FilePattern> {
        FilePattern::parse(&self.song_pattern)
    }

    /// Compiled event log file pattern
    pub fn log_file_pattern(&self) -> Result<FilePattern> {
        FilePattern::parse(&self.log_pattern)
    }
}

// ============================================================================
// Storage Credentials
// ============================================================================

/// Credentials and endpoint settings for object storage destinations
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StorageCredentials {
    /// Access key id (S3/R2)
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key (S3/R2)
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<String>,

    /// Region (S3)
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (R2, MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,

    /// Service account key file (GCS)
    #[serde(default)]
    pub service_account_path: Option<String>,

    /// Storage account name (Azure)
    #[serde(default)]
    pub account_name: Option<String>,

    /// Storage account key (Azure)
    #[serde(default)]
    pub account_key: Option<String>,
}

impl StorageCredentials {
    /// Create S3-style key credentials
    pub fn with_keys(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            ..Default::default()
        }
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("session_token", &redact(&self.session_token))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .field("service_account_path", &self.service_account_path)
            .field("account_name", &self.account_name)
            .field("account_key", &redact(&self.account_key))
            .finish()
    }
}

// ============================================================================
// Parquet Settings
// ============================================================================

/// Compression codec for output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// Snappy (default)
    #[default]
    Snappy,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
    /// No compression
    None,
}

/// Parquet output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParquetSettings {
    /// Compression codec
    #[serde(default)]
    pub compression: CompressionCodec,

    /// Maximum rows per row group
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
        }
    }
}

impl ParquetSettings {
    /// Build the writer config for these settings
    pub fn writer_config(&self) -> ParquetWriterConfig {
        let config = ParquetWriterConfig::new().with_row_group_size(self.row_group_size);
        match self.compression {
            CompressionCodec::Snappy => config,
            CompressionCodec::Zstd => config.zstd(),
            CompressionCodec::Gzip => config.gzip(),
            CompressionCodec::None => config.uncompressed(),
        }
    }
}
