//! Telegram sink: every rendered file is sent as a document to one chat.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile},
};

use crate::{DeliveryError, RenderedLedger, Sink, require};

#[derive(Clone, Debug)]
pub struct TelegramSink {
    bot: teloxide::Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub fn new(token: &str, chat_id: i64) -> Result<Self, DeliveryError> {
        require("telegram", "token", token)?;
        if chat_id == 0 {
            return Err(DeliveryError::Config(
                "telegram chat_id is missing".to_string(),
            ));
        }

        Ok(Self {
            bot: teloxide::Bot::new(token.trim()),
            chat_id: ChatId(chat_id),
        })
    }
}

#[async_trait]
impl Sink for TelegramSink {
    fn kind(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, ledger: &RenderedLedger) -> Result<(), DeliveryError> {
        let caption = format!("Usuario: {}\nRuta: {}", ledger.operator, ledger.route);
        for attachment in &ledger.attachments {
            self.bot
                .send_document(
                    self.chat_id,
                    InputFile::memory(attachment.bytes.clone())
                        .file_name(attachment.file_name.clone()),
                )
                .caption(caption.clone())
                .await?;
        }
        Ok(())
    }
}
