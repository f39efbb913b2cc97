//! Conversion of CLI arguments into client configuration

use crate::cli::main_impl::{Cli, CliChannels, CliOutputFormat, CliSize, RemoveArgs};
use crate::config::{ChannelMode, ClientConfig, OutputFormat, ProcessingOptions, SizePreset};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the client configuration from global flags
    pub(crate) fn client_config(cli: &Cli) -> Result<ClientConfig> {
        let api_key = cli
            .api_key
            .clone()
            .context("No API key given. Pass --api-key or set BGREMOVE_API_KEY")?;

        let mut builder = ClientConfig::builder(api_key);
        if let Some(base_url) = &cli.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(secs) = cli.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }

    /// Processing options for the flags that were given
    pub(crate) fn processing_options(args: &RemoveArgs) -> ProcessingOptions {
        ProcessingOptions {
            format: args.format.map(|format| match format {
                CliOutputFormat::Png => OutputFormat::Png,
                CliOutputFormat::Jpg => OutputFormat::Jpg,
                CliOutputFormat::Webp => OutputFormat::Webp,
            }),
            channels: args.channels.map(|channels| match channels {
                CliChannels::Rgba => ChannelMode::Rgba,
                CliChannels::Rgb => ChannelMode::Rgb,
            }),
            bg_color: args.bg_color.clone(),
            size: args.size.map(|size| match size {
                CliSize::Full => SizePreset::Full,
                CliSize::Preview => SizePreset::Preview,
                CliSize::Small => SizePreset::Small,
                CliSize::Medium => SizePreset::Medium,
                CliSize::Large => SizePreset::Large,
            }),
            crop: args.crop,
        }
    }

    /// `<dir>/<stem>-nobg.<ext>` next to the input, `output-nobg.<ext>` for stdin
    pub(crate) fn default_output_path(input: &str, extension: &str) -> PathBuf {
        if input == "-" {
            return PathBuf::from(format!("output-nobg.{}", extension));
        }

        let input_path = Path::new(input);
        let stem = input_path
            .file_stem()
            .map_or_else(|| "output".into(), |stem| stem.to_string_lossy());
        let file_name = format!("{}-nobg.{}", stem, extension);

        match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
            _ => PathBuf::from(file_name),
        }
    }
}
