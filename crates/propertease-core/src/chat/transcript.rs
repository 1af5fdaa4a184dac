//! Append-only chat transcript.
//!
//! Entries are never removed or reordered; the only mutation is `push`.

use propertease_types::chat::{ChatMessage, Sender};

/// Ordered user/bot turns, seeded with the assistant greeting.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Start a transcript with a bot greeting as its first entry.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::bot(greeting)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Render the dialogue leading up to the user turn at `turn` as a
    /// single text prompt.
    ///
    /// Bot replies committed after `turn` belong to earlier exchanges and are
    /// kept; later user turns are still queued and are left out. The leading
    /// greeting is kept so the model sees what it already said.
    pub fn render_turn(&self, turn: usize) -> String {
        let mut out = String::new();
        let earlier = self.messages.iter().take(turn);
        let answered = self
            .messages
            .iter()
            .skip(turn + 1)
            .filter(|m| m.sender == Sender::Bot);
        for message in earlier.chain(answered).chain(self.messages.get(turn)) {
            let speaker = match message.sender {
                Sender::User => "User",
                Sender::Bot => "Assistant",
            };
            out.push_str(speaker);
            out.push_str(": ");
            out.push_str(&message.text);
            out.push('\n');
        }
        out.push_str("Assistant:");
        out
    }
}
