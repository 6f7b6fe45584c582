//! CLI module
//!
//! Command-line interface for running the warehouse pipeline.
//!
//! # Commands
//!
//! - `run` - Build all five tables (or only the catalog tables)
//! - `validate` - Parse and validate a config file
//! - `tables` - List output tables and their partition columns

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

use tracing_subscriber::EnvFilter;

/// Log filter for the binary
///
/// `--verbose` selects `debug`. Otherwise `RUST_LOG` directives apply when
/// they parse, and `info` is the default.
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_takes_precedence_over_default() {
        assert_eq!(log_filter(false, Some("warn")).to_string(), "warn");
        assert_eq!(
            log_filter(false, Some("songplay_warehouse=trace")).to_string(),
            "songplay_warehouse=trace"
        );
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(log_filter(false, None).to_string(), "info");
        assert_eq!(log_filter(false, Some("")).to_string(), "info");
    }

    #[test]
    fn test_verbose_selects_debug() {
        assert_eq!(log_filter(true, Some("warn")).to_string(), "debug");
        assert_eq!(log_filter(true, None).to_string(), "debug");
    }
}
