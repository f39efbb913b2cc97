#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]

//! # Background Removal API Client
//!
//! A typed Rust client for the hosted background removal HTTP API.
//!
//! The client takes an image in any of the supported representations, sends
//! it to the service in one multipart request and returns either the processed
//! image with its metadata or a typed error.
//!
//! ## Features
//!
//! - **Flexible Inputs**: file paths, raw bytes, shared buffers or bytes with a declared type
//! - **Content Sniffing**: PNG, JPEG, WebP and GIF detection from leading bytes
//! - **Typed Errors**: one error kind per API error code, plus timeout and unclassified
//! - **Account Info**: plan and credit usage for the configured key
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_api::{BgRemoveClient, ErrorKind, ImageInput, ProcessingOptions, SizePreset};
//!
//! # async fn example() -> bgremove_api::Result<()> {
//! let client = BgRemoveClient::new(std::env::var("BGREMOVE_API_KEY").unwrap_or_default())?;
//!
//! let options = ProcessingOptions::builder().size(SizePreset::Preview).build();
//! match client.remove_background(ImageInput::from_path("input.jpg"), &options).await {
//!     Ok(result) => result.save("output.png").await?,
//!     Err(e) if e.kind() == Some(ErrorKind::PaymentRequired) => {
//!         eprintln!("Out of credits (request {:?})", e.request_id());
//!     },
//!     Err(e) => return Err(e),
//! }
//!
//! let account = client.me().await?;
//! println!("{} credits left on {}", account.remaining_credits(), account.plan);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface and tracing subscriber setup
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! bgremove-api = { version = "0.1", default-features = false }
//! ```

pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod services;
pub mod tracing_config;
pub mod types;

// Public API exports
pub use classifier::{classify, kind_for_code};
pub use client::BgRemoveClient;
pub use config::{
    ChannelMode, ClientConfig, ClientConfigBuilder, OutputFormat, ProcessingOptions,
    ProcessingOptionsBuilder, SizePreset, API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use error::{ApiError, BgRemovalError, ErrorKind, Result};
pub use services::{FileSystem, InputNormalizer, LocalFileSystem};
pub use tracing_config::{TracingConfig, TracingFormat};
pub use types::{
    AccountInfo, ApiErrorPayload, ImageInput, NormalizedPayload, ProcessingMetadata,
    ProcessingResult,
};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_compiles() {
        let options = ProcessingOptions::default();
        assert!(options.form_fields().is_empty());
        assert!(BgRemoveClient::new("sk_test").is_ok());
    }
}
