use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::{DeleteWebhookSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatId, KeyboardButton, KeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use crate::menu::Menu;
use crate::platform::{self, IncomingMessage, Outbox, Reply, TextFormat};
use crate::router::Router;

/// Telegram rejects messages over 4096 chars; leave some headroom
const MAX_MESSAGE_LEN: usize = 4000;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    #[command(description = "показать меню")]
    Start,
    #[command(description = "как пользоваться ботом")]
    Help,
}

/// Split long messages for Telegram's message length limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

/// One Telegram API message produced from a [`Reply`]
#[derive(Debug, Clone, PartialEq)]
struct OutgoingChunk {
    text: String,
    html: bool,
    keyboard: bool,
}

/// Split a reply into sendable chunks. Every chunk keeps the reply's parse
/// mode; the keyboard goes on the last chunk only so it stays attached to the
/// end of the reply.
fn plan_chunks(reply: &Reply, max_len: usize) -> Vec<OutgoingChunk> {
    let chunks = split_message(&reply.text, max_len);
    let last = chunks.len().saturating_sub(1);

    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, text)| OutgoingChunk {
            text,
            html: reply.format == TextFormat::Html,
            keyboard: reply.keyboard && idx == last,
        })
        .collect()
}

/// Main-menu reply keyboard
fn menu_keyboard(menu: &Menu) -> KeyboardMarkup {
    let rows = menu
        .keyboard_rows()
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
    KeyboardMarkup::new(rows).resize_keyboard()
}

/// [`Outbox`] backed by the Telegram Bot API
pub struct TelegramOutbox {
    bot: Bot,
    keyboard: KeyboardMarkup,
}

impl TelegramOutbox {
    pub fn new(bot: Bot, menu: &Menu) -> Self {
        Self {
            bot,
            keyboard: menu_keyboard(menu),
        }
    }
}

#[async_trait]
impl Outbox for TelegramOutbox {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        for chunk in plan_chunks(reply, MAX_MESSAGE_LEN) {
            let mut request = self.bot.send_message(ChatId(chat_id), chunk.text);
            if chunk.html {
                request = request.parse_mode(ParseMode::Html);
            }
            if chunk.keyboard {
                request = request.reply_markup(self.keyboard.clone());
            }
            request
                .await
                .with_context(|| format!("Failed to send message to chat {}", chat_id))?;
        }

        Ok(())
    }
}

/// Run the Telegram bot until the dispatcher stops
pub async fn run(router: Arc<Router>, token: &str, skip_pending: bool) -> Result<()> {
    let bot = Bot::new(token);

    info!("Starting Telegram platform...");

    if skip_pending {
        bot.delete_webhook()
            .drop_pending_updates(true)
            .await
            .context("Failed to drop pending updates")?;
        info!("Dropped pending updates");
    }

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let outbox = Arc::new(TelegramOutbox::new(bot.clone(), router.menu()));

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router, outbox])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    router: Arc<Router>,
    outbox: Arc<TelegramOutbox>,
) -> ResponseResult<()> {
    info!("Command {:?} in chat {}", cmd, msg.chat.id.0);

    let replies = match cmd {
        Command::Start | Command::Help => router.welcome(),
    };

    if let Err(e) = platform::deliver(outbox.as_ref(), msg.chat.id.0, &replies).await {
        error!("Failed to answer {:?}: {:#}", cmd, e);
    }

    Ok(())
}

async fn handle_message(
    msg: Message,
    router: Arc<Router>,
    outbox: Arc<TelegramOutbox>,
) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let user_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_default();

    let incoming = IncomingMessage {
        chat_id: msg.chat.id.0,
        user_name,
        text,
    };

    if let Err(e) = router.handle(outbox.as_ref(), &incoming).await {
        error!("Failed to reply in chat {}: {:#}", incoming.chat_id, e);
    }

    Ok(())
}
