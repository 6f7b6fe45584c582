//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, RunSummary};
use crate::types::TableName;
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                input,
                output,
                songs_only,
            } => {
                self.run_pipeline(input.clone(), output.clone(), *songs_only)
                    .await
            }
            Commands::Validate => self.validate(),
            Commands::Tables => self.tables(),
        }
    }

    /// Load configuration and apply flag overrides
    ///
    /// Without a config file both `--input` and `--output` are required.
    fn load_config(&self, input: Option<String>, output: Option<String>) -> Result<PipelineConfig> {
        let mut config = match &self.cli.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = input {
            config = config.with_input(input);
        }
        if let Some(output) = output {
            config = config.with_output(output);
        }

        config.validate()?;
        Ok(config)
    }

    /// Run the pipeline
    async fn run_pipeline(
        &self,
        input: Option<String>,
        output: Option<String>,
        songs_only: bool,
    ) -> Result<()> {
        let config = self.load_config(input, output)?;
        info!(
            input = %config.input,
            output = %config.output,
            songs_only,
            "Starting pipeline"
        );

        let pipeline = Pipeline::from_config(config)?;
        let summary = if songs_only {
            let start = Instant::now();
            let mut summary = RunSummary::new();
            pipeline.process_song_data(&mut summary).await?;
            summary.duration_ms = start.elapsed().as_millis() as u64;
            summary
        } else {
            pipeline.run().await?
        };

        self.output_message(&summary)
    }

    /// Validate configuration file
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -C flag)"))?;
        let config = PipelineConfig::from_file(path)?;
        config.validate()?;

        self.output_message(&json!({
            "valid": true,
            "input": config.input,
            "output": config.output,
            "song_pattern": config.song_pattern,
            "log_pattern": config.log_pattern,
        }))
    }

    /// List output tables
    fn tables(&self) -> Result<()> {
        let tables: Vec<_> = TableName::ALL
            .iter()
            .map(|table| {
                json!({
                    "table": table.as_str(),
                    "partition_by": table.partition_columns(),
                })
            })
            .collect();

        self.output_message(&tables)
    }

    /// Output a message
    fn output_message<T: Serialize>(&self, msg: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        println!("{text}");
        Ok(())
    }
}
