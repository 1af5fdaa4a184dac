//! CLI command definitions and dispatch for the `propertease` binary.
//!
//! Uses clap derive macros for argument parsing. Each subcommand maps to one
//! gateway operation (e.g., `propertease ask`, `propertease describe`).

pub mod chat;
pub mod generate;
pub mod listing;
pub mod local;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use base64::Engine;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use propertease_types::llm::Region;

/// AI request gateway for the PropertEase listings app.
#[derive(Parser)]
#[command(name = "propertease", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to propertease.toml.
    #[arg(long, global = true, env = "PROPERTEASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model region, overriding the config file.
    #[arg(long, global = true, env = "PROPERTEASE_REGION")]
    pub region: Option<Region>,

    /// Write log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config, 8080).
        #[arg(short, long, env = "PROPERTEASE_PORT")]
        port: Option<u16>,

        /// Host to bind to (default from config, 127.0.0.1).
        #[arg(long, env = "PROPERTEASE_HOST")]
        host: Option<String>,
    },

    /// Send one prompt to the text model.
    Ask {
        /// The prompt text.
        prompt: String,

        /// Print the reply as it is generated.
        #[arg(long)]
        stream: bool,
    },

    /// Describe an image with the vision model.
    Describe {
        /// Image URL (http, https or data:) or a local file path.
        image: String,

        /// What to ask about the image.
        prompt: String,
    },

    /// Start an interactive chat with the listings assistant.
    Chat,

    /// Prompt the on-device model.
    Local {
        /// The prompt text.
        prompt: Option<String>,

        /// Image URL or local file path to send along.
        #[arg(long)]
        image: Option<String>,

        /// Only report availability, do not create a session.
        #[arg(long)]
        probe: bool,
    },

    /// Show property recommendations for a user.
    Recommend {
        /// User identifier.
        user_id: String,
    },

    /// Look up coordinates for an address.
    Geocode {
        /// Street address.
        address: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Spinner shown while waiting on a model call.
pub fn thinking_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Turn an image argument into a URL the fetcher understands.
///
/// URLs pass through; anything else is read from disk into a `data:` URL.
pub async fn image_source(arg: &str) -> anyhow::Result<String> {
    let lower = arg.to_ascii_lowercase();
    if ["http://", "https://", "data:"].iter().any(|p| lower.starts_with(p)) {
        return Ok(arg.to_string());
    }

    let path = Path::new(arg);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image file {}", path.display()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{encoded}", mime_for_path(path)))
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_local_with_image() {
        let cli = Cli::try_parse_from(["propertease", "local", "What is this?", "--image", "door.jpg"])
            .unwrap();
        match cli.command {
            Commands::Local { prompt, image, probe } => {
                assert_eq!(prompt.as_deref(), Some("What is this?"));
                assert_eq!(image.as_deref(), Some("door.jpg"));
                assert!(!probe);
            }
            _ => panic!("expected local command"),
        }
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("door.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("door.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("door")), "image/jpeg");
    }

    #[tokio::test]
    async fn test_image_source_passes_urls_through() {
        let url = "https://images.unsplash.com/photo-1";
        assert_eq!(image_source(url).await.unwrap(), url);
    }

    #[tokio::test]
    async fn test_image_source_encodes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("door.png");
        tokio::fs::write(&path, [0u8, 1, 2]).await.unwrap();

        let url = image_source(path.to_str().unwrap()).await.unwrap();
        assert_eq!(url, "data:image/png;base64,AAEC");
    }

    #[test]
    fn test_parse_region_override() {
        let cli = Cli::try_parse_from(["propertease", "--region", "europe-west1", "ask", "hi"]).unwrap();
        assert_eq!(cli.region, Some(Region::EuropeWest1));
    }
}
