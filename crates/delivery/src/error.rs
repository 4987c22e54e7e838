use thiserror::Error;

/// Everything that can go wrong handing a ledger to a sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery config error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("sink rejected the ledger ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("delivery timed out after {0} seconds")]
    Timeout(u64),
    #[error("render error: {0}")]
    Render(String),
}

impl DeliveryError {
    /// Whether another attempt may succeed. Client-side rejections and bad
    /// configuration fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Telegram(err) => matches!(
                err,
                teloxide::RequestError::Network(_) | teloxide::RequestError::RetryAfter(_)
            ),
            Self::Config(_) | Self::Render(_) => false,
        }
    }
}
