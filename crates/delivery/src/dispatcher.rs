use std::{sync::Arc, time::Duration};

use engine::LedgerSnapshot;

use crate::{DeliveryError, Sink, render};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Renders a finalized ledger and hands it to the configured sink.
///
/// Each attempt is bounded by `timeout`; a transient failure is retried up
/// to `retries` more times, waiting `backoff * attempt` in between.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn Sink>,
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn sink_kind(&self) -> &'static str {
        self.sink.kind()
    }

    pub async fn deliver(&self, snapshot: &LedgerSnapshot) -> Result<(), DeliveryError> {
        let rendered = render(snapshot)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match tokio::time::timeout(self.timeout, self.sink.deliver(&rendered)).await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(self.timeout.as_secs())),
            };

            match result {
                Ok(()) => {
                    tracing::info!(
                        "delivered {} through {} sink",
                        rendered.key,
                        self.sink.kind()
                    );
                    return Ok(());
                }
                Err(err) if attempt <= self.retries && err.is_transient() => {
                    tracing::warn!(
                        "delivery of {} failed (attempt {attempt}): {err}",
                        rendered.key
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(err) => {
                    tracing::error!("giving up delivery of {}: {err}", rendered.key);
                    return Err(err);
                }
            }
        }
    }
}

#[derive(Default)]
pub struct DispatcherBuilder {
    sink: Option<Arc<dyn Sink>>,
    timeout: Option<Duration>,
    retries: Option<u32>,
    backoff: Option<Duration>,
}

impl DispatcherBuilder {
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> DispatcherBuilder {
        self.sink = Some(sink);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> DispatcherBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> DispatcherBuilder {
        self.retries = Some(retries);
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> DispatcherBuilder {
        self.backoff = Some(backoff);
        self
    }

    pub fn build(self) -> Result<Dispatcher, DeliveryError> {
        let sink = self
            .sink
            .ok_or_else(|| DeliveryError::Config("no delivery sink configured".to_string()))?;

        Ok(Dispatcher {
            sink,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            backoff: self.backoff.unwrap_or(DEFAULT_BACKOFF),
        })
    }
}
