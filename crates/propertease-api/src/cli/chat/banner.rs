//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the model and how much of the transcript each turn sends.
pub fn print_welcome_banner(model: &str, context_mode: &str) {
    println!();
    println!("  * {}", style("PropertEase assistant").cyan().bold());
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Context:").bold(), style(context_mode).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
