//! Command-line interface for the background removal API

use super::config::CliConfigBuilder;
use crate::{error::BgRemovalError, tracing_config::init_cli_tracing, BgRemoveClient, ImageInput};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Background removal API command-line client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-api")]
pub struct Cli {
    /// API key (falls back to the BGREMOVE_API_KEY environment variable)
    #[arg(long, env = "BGREMOVE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the API base URL
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove the background of one image
    Remove(RemoveArgs),
    /// Show plan and credit usage for the API key
    Me,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Input image file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Output file (use "-" for stdout) [default: <input-stem>-nobg.<ext>]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Output channels
    #[arg(long, value_enum)]
    pub channels: Option<CliChannels>,

    /// Background color for rgb output (e.g. "#ffffff")
    #[arg(long, value_name = "COLOR")]
    pub bg_color: Option<String>,

    /// Output size preset
    #[arg(short, long, value_enum)]
    pub size: Option<CliSize>,

    /// Crop the result to the subject (`--crop` or `--crop=false`; omit to let the service decide)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub crop: Option<bool>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpg,
    Webp,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliChannels {
    Rgba,
    Rgb,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliSize {
    Full,
    Preview,
    Small,
    Medium,
    Large,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::client_config(&cli).context("Invalid configuration")?;
    let client = BgRemoveClient::with_config(config).context("Failed to create API client")?;

    match &cli.command {
        Command::Remove(args) => remove(&client, args).await,
        Command::Me => show_account(&client).await,
    }
}

async fn remove(client: &BgRemoveClient, args: &RemoveArgs) -> Result<()> {
    let input = read_input(&args.input)?;
    let options = CliConfigBuilder::processing_options(args);
    debug!("Input: {}, options: {:?}", input.describe(), options);

    let spinner = create_spinner(&format!("Removing background from {}", args.input))?;
    let outcome = client.remove_background(input, &options).await;
    spinner.finish_and_clear();

    let result = outcome.map_err(|e| anyhow::anyhow!(describe_error(&e)))?;

    match args.output.as_deref() {
        Some("-") => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&result.data)
                .and_then(|()| stdout.flush())
                .context("Failed to write image to stdout")?;
        },
        output => {
            let path = output.map_or_else(
                || CliConfigBuilder::default_output_path(&args.input, result.file_extension()),
                std::path::PathBuf::from,
            );
            result
                .save(&path)
                .await
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!(
                "Saved {} ({}x{}, {} ms, request {})",
                path.display(),
                result.metadata.width,
                result.metadata.height,
                result.metadata.processing_time_ms,
                result.metadata.request_id
            );
        },
    }

    Ok(())
}

async fn show_account(client: &BgRemoveClient) -> Result<()> {
    let account = client
        .me()
        .await
        .map_err(|e| anyhow::anyhow!(describe_error(&e)))?;

    println!("Organization:   {}", account.organization_id);
    println!("Plan:           {}", account.plan);
    println!(
        "Credits:        {} / {} used ({} remaining)",
        account.used_credits,
        account.max_credits,
        account.remaining_credits()
    );
    match account.auto_recharge_threshold {
        Some(threshold) => println!("Auto-recharge:  below {} credits", threshold),
        None => println!("Auto-recharge:  disabled"),
    }
    Ok(())
}

fn read_input(input: &str) -> Result<ImageInput> {
    if input == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read image from stdin")?;
        return Ok(ImageInput::from_bytes(buffer));
    }
    Ok(ImageInput::from_path(input))
}

fn create_spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// One-line failure description including everything support needs
pub(crate) fn describe_error(err: &BgRemovalError) -> String {
    match err.api_error() {
        Some(api) => {
            let mut line = format!("{} error [{}]", api.kind, api.code);
            if let Some(status) = api.status {
                line.push_str(&format!(" (HTTP {})", status));
            }
            line.push_str(&format!(": {}", api.message));
            if let Some(details) = &api.details {
                line.push_str(&format!(" - {}", details));
            }
            if let Some(request_id) = &api.request_id {
                line.push_str(&format!(" [request id: {}]", request_id));
            }
            line
        },
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ErrorKind};

    #[test]
    fn test_parse_remove_command() {
        let cli = Cli::try_parse_from([
            "bgremove-api",
            "--api-key",
            "k",
            "remove",
            "cat.jpg",
            "-f",
            "webp",
            "--crop",
            "-s",
            "preview",
        ])
        .unwrap();

        match cli.command {
            Command::Remove(args) => {
                assert_eq!(args.input, "cat.jpg");
                assert_eq!(args.format, Some(CliOutputFormat::Webp));
                assert_eq!(args.size, Some(CliSize::Preview));
                assert_eq!(args.crop, Some(true));
                assert!(args.channels.is_none());
            },
            Command::Me => panic!("expected remove"),
        }
    }

    #[test]
    fn test_parse_crop_values() {
        let crop_for = |extra: &[&str]| {
            let mut argv = vec!["bgremove-api", "remove"];
            argv.extend_from_slice(extra);
            argv.push("cat.jpg");
            match Cli::try_parse_from(argv).unwrap().command {
                Command::Remove(args) => args.crop,
                Command::Me => panic!("expected remove"),
            }
        };

        assert_eq!(crop_for(&[]), None);
        assert_eq!(crop_for(&["--crop"]), Some(true));
        assert_eq!(crop_for(&["--crop=true"]), Some(true));
        assert_eq!(crop_for(&["--crop=false"]), Some(false));
        let invalid = Cli::try_parse_from(["bgremove-api", "remove", "cat.jpg", "--crop=maybe"]);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_parse_me_with_global_flags() {
        let cli = Cli::try_parse_from([
            "bgremove-api",
            "me",
            "--api-key",
            "k",
            "-vv",
            "--timeout",
            "5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Me));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.timeout, Some(5));
    }

    #[test]
    fn test_describe_api_error() {
        let err = BgRemovalError::from(ApiError {
            kind: ErrorKind::PaymentRequired,
            message: "Insufficient credits".into(),
            code: "payment_required".into(),
            status: Some(402),
            request_id: Some("r1".into()),
            details: None,
        });
        assert_eq!(
            describe_error(&err),
            "payment_required error [payment_required] (HTTP 402): \
             Insufficient credits [request id: r1]"
        );
    }

    #[test]
    fn test_describe_other_error() {
        let err = BgRemovalError::environment("no filesystem");
        assert_eq!(describe_error(&err), "Environment error: no filesystem");
    }
}
