//! ConversationController -- owns the transcript and drives bot turns.
//!
//! A user turn is committed synchronously by `append_user_turn`; the bot
//! turn is produced by resolving the returned [`PendingExchange`]. Exchanges
//! complete in submission order: each one waits for its predecessor's
//! completion signal before calling the model. Model failures never reach
//! the caller; they become the fallback reply.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{Instrument, debug, info_span, warn};

use propertease_types::chat::{ChatMessage, ContextMode};
use propertease_types::config::ChatConfig;
use propertease_types::error::ChatError;

use crate::gateway::ModelGateway;

use super::transcript::Transcript;

struct ChatState {
    transcript: Transcript,
    /// Completion signal of the most recently submitted exchange.
    tail: Option<oneshot::Receiver<()>>,
}

/// Conversational state controller for one transcript.
pub struct ConversationController {
    gateway: ModelGateway,
    state: Arc<Mutex<ChatState>>,
    context_mode: ContextMode,
    fallback_reply: String,
    exchange_timeout: Duration,
}

impl ConversationController {
    pub fn new(gateway: ModelGateway, config: &ChatConfig) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(ChatState {
                transcript: Transcript::with_greeting(config.greeting.clone()),
                tail: None,
            })),
            context_mode: config.context_mode,
            fallback_reply: config.fallback_reply.clone(),
            exchange_timeout: Duration::from_secs(config.exchange_timeout_secs),
        }
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock(&self.state).transcript.messages().to_vec()
    }

    pub fn context_mode(&self) -> ContextMode {
        self.context_mode
    }

    /// Commit a user turn and return the exchange that will produce the reply.
    ///
    /// Empty or whitespace-only text is rejected and the transcript is left
    /// untouched. The stored message is trimmed.
    pub fn append_user_turn(&self, text: &str) -> Result<PendingExchange, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (done, next) = oneshot::channel();
        let (turn, previous) = {
            let mut state = lock(&self.state);
            let turn = state.transcript.len();
            state.transcript.push(ChatMessage::user(text));
            (turn, state.tail.replace(next))
        };
        debug!(turn, context_mode = %self.context_mode, "user turn appended");

        Ok(PendingExchange {
            text: text.to_string(),
            turn,
            context_mode: self.context_mode,
            previous,
            done,
            gateway: self.gateway.clone(),
            state: Arc::clone(&self.state),
            fallback_reply: self.fallback_reply.clone(),
            timeout: self.exchange_timeout,
        })
    }

    /// Append a user turn and wait for the bot reply.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let exchange = self.append_user_turn(text)?;
        Ok(exchange.resolve().await)
    }
}

/// One in-flight exchange: the user turn is already in the transcript.
pub struct PendingExchange {
    text: String,
    /// Transcript index of the user turn.
    turn: usize,
    context_mode: ContextMode,
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
    gateway: ModelGateway,
    state: Arc<Mutex<ChatState>>,
    fallback_reply: String,
    timeout: Duration,
}

impl PendingExchange {
    /// The trimmed user text of this exchange.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Call the model and append the bot turn; returns the appended message.
    ///
    /// The prompt is built once the predecessor has finished, so in full
    /// context mode it includes every earlier reply. On error or timeout the
    /// fallback reply is appended instead.
    pub async fn resolve(self) -> ChatMessage {
        if let Some(previous) = self.previous {
            // A dropped predecessor counts as finished.
            let _ = previous.await;
        }

        let prompt = match self.context_mode {
            ContextMode::Latest => self.text,
            ContextMode::Full => lock(&self.state).transcript.render_turn(self.turn),
        };

        let span = info_span!("chat.exchange", turn = self.turn, prompt_chars = prompt.len());
        let outcome = tokio::time::timeout(self.timeout, self.gateway.generate(&prompt))
            .instrument(span)
            .await;

        let reply = match outcome {
            Ok(Ok(text)) => ChatMessage::bot(text),
            Ok(Err(e)) => {
                warn!(error = %e, kind = e.kind(), "chat exchange failed, using fallback reply");
                ChatMessage::bot(self.fallback_reply)
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "chat exchange timed out, using fallback reply"
                );
                ChatMessage::bot(self.fallback_reply)
            }
        };

        lock(&self.state).transcript.push(reply.clone());
        let _ = self.done.send(());
        reply
    }
}

fn lock(state: &Mutex<ChatState>) -> std::sync::MutexGuard<'_, ChatState> {
    state.lock().expect("transcript lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubProvider, text_gateway};
    use propertease_types::chat::{FALLBACK_REPLY, Sender};
    use propertease_types::llm::ContentPart;

    fn controller(provider: &StubProvider) -> ConversationController {
        ConversationController::new(text_gateway(provider), &ChatConfig::default())
    }

    #[test]
    fn test_starts_with_greeting() {
        let provider = StubProvider::replying("unused");
        let transcript = controller(&provider).transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].sender, Sender::Bot);
        assert!(transcript[0].text.starts_with("Hello! How can I help"));
    }

    #[tokio::test]
    async fn test_user_turn_is_appended_before_reply() {
        let provider = StubProvider::replying("Sure!");
        let chat = controller(&provider);

        let exchange = chat.append_user_turn("hello").unwrap();
        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].sender, Sender::User);
        assert_eq!(transcript[1].text, "hello");
        assert_eq!(provider.calls(), 0);

        let reply = exchange.resolve().await;
        assert_eq!(reply.text, "Sure!");
        assert_eq!(chat.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_user_text_is_trimmed() {
        let provider = StubProvider::replying("ok");
        let chat = controller(&provider);
        chat.send("  two bedrooms?  ").await.unwrap();
        assert_eq!(chat.transcript()[1].text, "two bedrooms?");
        assert_eq!(
            provider.last_request().unwrap().parts,
            vec![ContentPart::Text("two bedrooms?".to_string())]
        );
    }

    #[test]
    fn test_blank_input_leaves_transcript_untouched() {
        let provider = StubProvider::replying("unused");
        let chat = controller(&provider);
        assert_eq!(chat.append_user_turn("   ").err(), Some(ChatError::EmptyMessage));
        assert_eq!(chat.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_appends_one_fallback() {
        let provider = StubProvider::failing("HTTP 500");
        let chat = controller(&provider);

        let reply = chat.send("hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);

        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].sender, Sender::Bot);
        assert_eq!(transcript[2].text, FALLBACK_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_appends_fallback() {
        let provider = StubProvider::replying("too late").with_delay(Duration::from_secs(45));
        let chat = controller(&provider);
        let reply = chat.send("hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_replies_follow_submission_order() {
        let provider = StubProvider::echoing();
        let chat = controller(&provider);

        let first = chat.append_user_turn("first").unwrap();
        let second = chat.append_user_turn("second").unwrap();
        // Resolve out of order; the second still waits for the first.
        let (b, a) = tokio::join!(second.resolve(), first.resolve());
        assert_eq!(a.text, "first");
        assert_eq!(b.text, "second");

        let texts: Vec<_> = chat.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts[1..], ["first", "second", "first", "second"]);
    }

    #[tokio::test]
    async fn test_dropped_exchange_does_not_block_next() {
        let provider = StubProvider::replying("ok");
        let chat = controller(&provider);
        let abandoned = chat.append_user_turn("never answered").unwrap();
        let next = chat.append_user_turn("answered").unwrap();
        drop(abandoned);
        assert_eq!(next.resolve().await.text, "ok");
    }

    fn full_context(provider: &StubProvider) -> ConversationController {
        let config = ChatConfig {
            greeting: "Hi!".to_string(),
            context_mode: ContextMode::Full,
            ..ChatConfig::default()
        };
        ConversationController::new(text_gateway(provider), &config)
    }

    fn sent_text(provider: &StubProvider) -> String {
        match provider.last_request().unwrap().parts.as_slice() {
            [ContentPart::Text(text)] => text.clone(),
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_full_context_mode_sends_dialogue() {
        let provider = StubProvider::replying("We have three.");
        let chat = full_context(&provider);

        let exchange = chat.append_user_turn("Any lofts?").unwrap();
        assert_eq!(exchange.text(), "Any lofts?");
        exchange.resolve().await;
        assert_eq!(sent_text(&provider), "Assistant: Hi!\nUser: Any lofts?\nAssistant:");
    }

    #[tokio::test]
    async fn test_full_context_queued_turn_sees_earlier_reply() {
        let provider = StubProvider::replying("R1");
        let chat = full_context(&provider);

        let first = chat.append_user_turn("first").unwrap();
        let second = chat.append_user_turn("second").unwrap();
        let (_, _) = tokio::join!(second.resolve(), first.resolve());

        assert_eq!(provider.calls(), 2);
        assert_eq!(
            sent_text(&provider),
            "Assistant: Hi!\nUser: first\nAssistant: R1\nUser: second\nAssistant:"
        );
    }
}
