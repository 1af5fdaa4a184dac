//! `local` command: prompt the on-device model through the session manager.

use anyhow::{Result, bail};
use console::style;

use propertease_types::local::LocalSessionState;

use crate::cli::{image_source, thinking_spinner};
use crate::state::ConcreteLocalManager;

/// Probe, negotiate a session, submit one prompt and release the session.
pub async fn run_local(
    manager: &ConcreteLocalManager,
    prompt: Option<&str>,
    image: Option<&str>,
    probe_only: bool,
    json: bool,
) -> Result<()> {
    if probe_only {
        let availability = manager.probe().await;
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "availability": availability.to_string() }))?
            );
        } else {
            println!("\n  {} {}\n", style("Availability:").bold(), availability);
        }
        return Ok(());
    }

    let image_url = match image {
        Some(arg) => Some(image_source(arg).await?),
        None => None,
    };

    let spinner = (!json).then(|| thinking_spinner("checking local model..."));
    let session_state = manager.initialize().await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    if let LocalSessionState::Unavailable { reason } = &session_state {
        bail!("{reason}");
    }

    let spinner = (!json).then(|| thinking_spinner("thinking..."));
    let result = manager.submit(prompt, image_url.as_deref()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    manager.release().await;
    let reply = result?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "text": reply }))?
        );
    } else {
        println!();
        println!("  {}", reply.trim());
        println!();
    }
    Ok(())
}
