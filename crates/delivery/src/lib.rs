//! Ledger delivery.
//!
//! A finalized [`LedgerSnapshot`](engine::LedgerSnapshot) is rendered to CSV
//! and handed to one [`Sink`]. The caller only sees the [`Dispatcher`]; which
//! sink sits behind it is decided by [`SinkConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use email::EmailSink;
pub use error::DeliveryError;
pub use gcs::GcsSink;
pub use render::{Attachment, RenderedLedger, render};
pub use telegram::TelegramSink;

mod dispatcher;
mod email;
mod error;
mod gcs;
mod render;
mod telegram;

/// Somewhere a rendered ledger can be shipped to.
#[async_trait]
pub trait Sink: Send + Sync {
    fn kind(&self) -> &'static str;

    async fn deliver(&self, ledger: &RenderedLedger) -> Result<(), DeliveryError>;
}

/// Which sink to use and its options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    Email {
        api_key: String,
        from: String,
        to: Vec<String>,
        #[serde(default = "default_resend_url")]
        base_url: String,
    },
    Telegram {
        token: String,
        chat_id: i64,
    },
    Gcs {
        bucket: String,
        token: String,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default = "default_gcs_url")]
        base_url: String,
    },
}

fn default_resend_url() -> String {
    email::DEFAULT_RESEND_URL.to_string()
}

fn default_gcs_url() -> String {
    gcs::DEFAULT_GCS_URL.to_string()
}

impl SinkConfig {
    /// Build the configured sink. Blank required options are rejected here.
    pub fn build(&self) -> Result<Arc<dyn Sink>, DeliveryError> {
        let sink: Arc<dyn Sink> = match self {
            SinkConfig::Email {
                api_key,
                from,
                to,
                base_url,
            } => Arc::new(EmailSink::new(api_key, from, to.clone(), base_url)?),
            SinkConfig::Telegram { token, chat_id } => Arc::new(TelegramSink::new(token, *chat_id)?),
            SinkConfig::Gcs {
                bucket,
                token,
                prefix,
                base_url,
            } => Arc::new(GcsSink::new(bucket, token, prefix.clone(), base_url)?),
        };
        Ok(sink)
    }
}

fn require(sink: &str, option: &str, value: &str) -> Result<(), DeliveryError> {
    if value.trim().is_empty() {
        return Err(DeliveryError::Config(format!("{sink} {option} is missing")));
    }
    Ok(())
}
