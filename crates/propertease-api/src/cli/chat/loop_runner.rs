//! Main chat loop orchestration.
//!
//! Reads lines, appends each as a user turn, waits for the exchange and
//! prints the reply. Gateway failures show up as the controller's fallback
//! reply, so the loop itself never stops on a model error.

use std::io::Write;

use console::style;
use tracing::warn;

use propertease_types::chat::{ChatMessage, Sender};

use crate::cli::thinking_spinner;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

fn speaker(message: &ChatMessage) -> String {
    match message.sender {
        Sender::User => format!("{}", style("You").green().bold()),
        Sender::Bot => format!("{}", style("Assistant").cyan().bold()),
    }
}

/// Run the interactive chat loop against the shared controller.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let controller = &state.chat;
    let selector = state.gateway.selector();
    print_welcome_banner(
        &format!("{} ({})", selector.model, selector.region),
        &controller.context_mode().to_string(),
    );

    // The transcript opens with the greeting.
    if let Some(greeting) = controller.transcript().first() {
        println!("  {} {}", speaker(greeting), greeting.text);
        println!();
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, mut writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                writeln!(writer, "\n  {}", style("Session ended.").dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(writer, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(&mut writer)?,
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            writeln!(writer, "\n  {}", style("Session ended.").dim())?;
                            break;
                        }
                        ChatCommand::History => {
                            writeln!(writer)?;
                            for message in controller.transcript() {
                                writeln!(writer, "  {} {}", speaker(&message), message.text)?;
                            }
                            writeln!(writer)?;
                        }
                        ChatCommand::Unknown(name) => {
                            writeln!(
                                writer,
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            )?;
                        }
                    }
                    continue;
                }

                let exchange = match controller.append_user_turn(&text) {
                    Ok(exchange) => exchange,
                    Err(e) => {
                        warn!(error = %e, "message rejected");
                        continue;
                    }
                };

                let spinner = thinking_spinner("thinking...");
                let reply = exchange.resolve().await;
                spinner.finish_and_clear();

                writeln!(writer, "\n  {} {}\n", speaker(&reply), reply.text.trim())?;
            }
        }
    }

    chat_input.flush();
    Ok(())
}
