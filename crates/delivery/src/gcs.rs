//! Cloud storage sink: uploads every rendered file as an object in a Google
//! Cloud Storage bucket through the JSON media upload endpoint.

use async_trait::async_trait;
use reqwest::{Client, header};

use crate::{Attachment, DeliveryError, RenderedLedger, Sink, require};

pub const DEFAULT_GCS_URL: &str = "https://storage.googleapis.com";

#[derive(Clone, Debug)]
pub struct GcsSink {
    client: Client,
    base_url: String,
    bucket: String,
    prefix: Option<String>,
}

impl GcsSink {
    pub fn new(
        bucket: &str,
        token: &str,
        prefix: Option<String>,
        base_url: &str,
    ) -> Result<Self, DeliveryError> {
        require("gcs", "bucket", bucket)?;
        require("gcs", "token", token)?;

        let mut auth = header::HeaderValue::try_from(format!("Bearer {}", token.trim()))
            .map_err(|err| DeliveryError::Config(format!("invalid gcs token: {err}")))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        Ok(Self {
            client: Client::builder().default_headers(headers).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.trim().to_string(),
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    fn object_name(&self, attachment: &Attachment) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{}", attachment.file_name),
            None => attachment.file_name.clone(),
        }
    }
}

#[async_trait]
impl Sink for GcsSink {
    fn kind(&self) -> &'static str {
        "gcs"
    }

    async fn deliver(&self, ledger: &RenderedLedger) -> Result<(), DeliveryError> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);
        for attachment in &ledger.attachments {
            let name = self.object_name(attachment);
            let resp = self
                .client
                .post(&url)
                .query(&[("uploadType", "media"), ("name", name.as_str())])
                .header(header::CONTENT_TYPE, Attachment::CONTENT_TYPE)
                .body(attachment.bytes.clone())
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "storage service error".to_string());
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
            tracing::debug!("uploaded {name} to bucket {}", self.bucket);
        }
        Ok(())
    }
}
