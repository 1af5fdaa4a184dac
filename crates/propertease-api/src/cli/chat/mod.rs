//! Interactive CLI chat with the listings assistant.
//!
//! A REPL over the conversation controller: greeting banner, thinking
//! spinner, slash commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
