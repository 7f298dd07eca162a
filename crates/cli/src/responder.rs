//! Local stand-in for a model backend
//!
//! Echoes each message back as a quoted markdown reply, streamed into the
//! store a few words at a time so the transcript exercises in-place updates.

use murmur_core::{Entry, SharedTranscript};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Delay between streamed chunks
const CHUNK_DELAY: Duration = Duration::from_millis(40);

pub struct EchoResponder {
    store: SharedTranscript,
    ready_tx: watch::Sender<bool>,
    cancel_token: CancellationToken,
}

impl EchoResponder {
    pub fn new(store: SharedTranscript, ready_tx: watch::Sender<bool>, cancel_token: CancellationToken) -> Self {
        Self { store, ready_tx, cancel_token }
    }

    /// Answer messages from `inbox` until it closes or the token is cancelled
    pub async fn run(self, mut inbox: mpsc::UnboundedReceiver<String>) {
        let _ = self.ready_tx.send(true);

        loop {
            let message = tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                message = inbox.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            let _ = self.ready_tx.send(false);
            self.reply(&message).await;
            let _ = self.ready_tx.send(true);
        }

        tracing::debug!("responder stopped");
    }

    async fn reply(&self, message: &str) {
        let id = self.store.push(Entry::assistant(""));
        let reply = compose_reply(message);
        tracing::debug!(id = %id, chars = reply.len(), "streaming reply");

        for chunk in reply.split_inclusive(' ') {
            tokio::select! {
                _ = self.cancel_token.cancelled() => return,
                _ = tokio::time::sleep(CHUNK_DELAY) => {}
            }

            if let Err(e) = self.store.append_to(&id, chunk) {
                tracing::warn!(error = %e, "reply target disappeared");
                return;
            }
        }
    }
}

/// Markdown reply quoting `message`
pub fn compose_reply(message: &str) -> String {
    let words = message.split_whitespace().count();
    let quoted = message.lines().map(|line| format!("> {line}")).collect::<Vec<_>>().join("\n");
    let noun = if words == 1 { "word" } else { "words" };
    format!("You said ({words} {noun}):\n\n{quoted}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{Role, TranscriptStore};

    #[test]
    fn test_compose_reply() {
        assert_eq!(compose_reply("hello"), "You said (1 word):\n\n> hello");
        assert_eq!(compose_reply("a b\nc"), "You said (3 words):\n\n> a b\n> c");
    }

    #[tokio::test]
    async fn test_reply_streams_into_store() {
        let store = SharedTranscript::new();
        let (ready_tx, mut ready_rx) = watch::channel(false);
        let (tx, rx) = mpsc::unbounded_channel();
        let responder = EchoResponder::new(store.clone(), ready_tx, CancellationToken::new());
        let handle = tokio::spawn(responder.run(rx));

        ready_rx.changed().await.unwrap();
        assert!(*ready_rx.borrow());

        tx.send("ping pong".to_string()).unwrap();
        drop(tx);
        handle.await.unwrap();

        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::Assistant);
        assert_eq!(entries[0].title, compose_reply("ping pong"));
        assert!(*ready_rx.borrow());
    }

    #[tokio::test]
    async fn test_cancel_stops_responder() {
        let store = SharedTranscript::new();
        let (ready_tx, _ready_rx) = watch::channel(false);
        let (_tx, rx) = mpsc::unbounded_channel::<String>();
        let token = CancellationToken::new();
        let handle = tokio::spawn(EchoResponder::new(store.clone(), ready_tx, token.clone()).run(rx));

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(store.is_empty());
    }
}
