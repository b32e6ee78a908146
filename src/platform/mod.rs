pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A text message received from the chat transport
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Transport chat ID the reply goes back to
    pub chat_id: i64,
    /// Display name of the sender, for logs only
    pub user_name: String,
    /// The message text, untrimmed
    pub text: String,
}

/// How the transport should interpret a reply's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// One outbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub format: TextFormat,
    /// Attach the main-menu reply keyboard
    pub keyboard: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            keyboard: false,
        }
    }

    pub fn with_keyboard(mut self) -> Self {
        self.keyboard = true;
        self
    }
}

/// Outbound side of a chat transport
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<()>;
}

/// Send replies one by one, in order. Stops at the first failed send.
pub async fn deliver(outbox: &dyn Outbox, chat_id: i64, replies: &[Reply]) -> Result<()> {
    for reply in replies {
        outbox.send(chat_id, reply).await?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingOutbox;
    use super::*;

    #[tokio::test]
    async fn test_deliver_keeps_order() {
        let outbox = RecordingOutbox::default();
        let replies = vec![Reply::html("<b>a</b>"), Reply::plain("b"), Reply::plain("c").with_keyboard()];

        deliver(&outbox, 42, &replies).await.unwrap();

        let sent = outbox.sent.lock().await;
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(chat, _)| *chat == 42));
        let sent_replies: Vec<Reply> = sent.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(sent_replies, replies);
    }

    #[tokio::test]
    async fn test_deliver_stops_on_failure() {
        let outbox = RecordingOutbox {
            fail_at: Some(1),
            ..Default::default()
        };
        let replies = vec![Reply::plain("a"), Reply::plain("b"), Reply::plain("c")];

        assert!(deliver(&outbox, 1, &replies).await.is_err());
        assert_eq!(outbox.sent.lock().await.len(), 1);
    }
}
