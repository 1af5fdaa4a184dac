//! One-shot generation commands: `ask` and `describe`.

use std::io::Write;

use anyhow::Result;
use console::style;
use futures_util::StreamExt;

use propertease_types::llm::StreamEvent;

use crate::cli::{image_source, thinking_spinner};
use crate::state::AppState;

/// Send one prompt to the text model and print the reply.
pub async fn ask(state: &AppState, prompt: &str, stream: bool, json: bool) -> Result<()> {
    if stream && !json {
        return ask_streaming(state, prompt).await;
    }

    let spinner = (!json).then(|| thinking_spinner("thinking..."));
    let result = state.gateway.generate(prompt).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let text = result?;

    if json {
        let output = serde_json::json!({
            "model": state.gateway.selector().model,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("  {}", text.trim());
        println!();
    }
    Ok(())
}

async fn ask_streaming(state: &AppState, prompt: &str) -> Result<()> {
    let mut stream = state.gateway.stream(prompt)?;
    let spinner = thinking_spinner("thinking...");
    let mut first_token_received = false;

    while let Some(event_result) = stream.next().await {
        match event_result {
            Ok(StreamEvent::TextDelta { text }) => {
                if !first_token_received {
                    spinner.finish_and_clear();
                    first_token_received = true;
                    print!("\n  ");
                }
                print!("{text}");
                let _ = std::io::stdout().flush();
            }
            Ok(StreamEvent::Done) => break,
            Ok(_) => {}
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        }
    }

    if !first_token_received {
        spinner.finish_and_clear();
    }
    println!();
    println!();
    Ok(())
}

/// Describe an image with the vision model.
pub async fn describe(state: &AppState, image: &str, prompt: &str, json: bool) -> Result<()> {
    let image_url = image_source(image).await?;

    let spinner = (!json).then(|| thinking_spinner("looking at the image..."));
    let result = state.vision.describe(&image_url, prompt).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let text = result?;

    if json {
        let output = serde_json::json!({
            "model": state.vision.model().selector().model,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("  {} {}", style("Image:").bold(), style(image).dim());
        println!();
        println!("  {}", text.trim());
        println!();
    }
    Ok(())
}
