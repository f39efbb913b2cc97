//! Background Removal API CLI Tool
//!
//! Command-line interface for the hosted background removal API, built on
//! the bgremove-api library.

use bgremove_api::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}
