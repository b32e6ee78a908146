use anyhow::Result;
use teloxide::utils::html;
use tracing::{debug, info};

use crate::menu::Menu;
use crate::platform::{self, IncomingMessage, Outbox, Reply};

/// Items per content message
pub const PAGE_SIZE: usize = 10;

pub const WELCOME_TEXT: &str = "Привет! Я <b>TalkingFine_bot</b> — твой помощник по стилю речи.\n\n\
     Выбирай раздел на клавиатуре → и получай готовые формулировки (по 20 примеров).";
pub const NEXT_SECTION_TEXT: &str = "Выберите следующий раздел:";
pub const FALLBACK_TEXT: &str = "Выбери раздел на клавиатуре 👇";

/// Header announcing a list
fn header(title: &str, total: usize) -> String {
    format!("📌 <b>{}</b> — всего {} примеров.", html::escape(title), total)
}

/// Header message followed by the items in pages of [`PAGE_SIZE`].
/// Numbering is 1-based and continues across pages.
pub fn paginate(title: &str, items: &[String]) -> Vec<Reply> {
    let mut replies = Vec::with_capacity(1 + items.len().div_ceil(PAGE_SIZE));
    replies.push(Reply::html(header(title, items.len())));

    for (page_idx, page) in items.chunks(PAGE_SIZE).enumerate() {
        let offset = page_idx * PAGE_SIZE;
        let text = page
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", offset + i + 1, item))
            .collect::<Vec<_>>()
            .join("\n\n");
        replies.push(Reply::plain(text));
    }

    replies
}

/// Maps incoming text to the replies it should get
pub struct Router {
    menu: Menu,
}

impl Router {
    pub fn new(menu: Menu) -> Self {
        Self { menu }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Reply to /start and /help
    pub fn welcome(&self) -> Vec<Reply> {
        vec![Reply::html(WELCOME_TEXT).with_keyboard()]
    }

    /// Plan the replies for a text message
    pub fn respond(&self, text: &str) -> Vec<Reply> {
        let text = text.trim();

        if let Some(entry) = self.menu.lookup(text) {
            debug!("Section '{}' requested ({} items)", entry.title, entry.items.len());
            let mut replies = paginate(&entry.title, &entry.items);
            replies.push(Reply::plain(NEXT_SECTION_TEXT).with_keyboard());
            return replies;
        }

        if self.menu.is_contacts(text) {
            return vec![Reply::plain(self.menu.contacts().text.clone()).with_keyboard()];
        }

        vec![Reply::plain(FALLBACK_TEXT).with_keyboard()]
    }

    /// Respond to `incoming` through `outbox`
    pub async fn handle(&self, outbox: &dyn Outbox, incoming: &IncomingMessage) -> Result<()> {
        info!(
            "Message from {} in chat {}: {}",
            incoming.user_name, incoming.chat_id, incoming.text
        );
        let replies = self.respond(&incoming.text);
        platform::deliver(outbox, incoming.chat_id, &replies).await
    }
}
