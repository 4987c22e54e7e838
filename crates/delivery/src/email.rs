//! Email sink backed by the Resend HTTP API.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::{DeliveryError, RenderedLedger, Sink, require};

pub const DEFAULT_RESEND_URL: &str = "https://api.resend.com";
const SUBJECT: &str = "Registro de vehículos";

#[derive(Debug, Serialize)]
struct EmailAttachment<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: String,
    attachments: Vec<EmailAttachment<'a>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone, Debug)]
pub struct EmailSink {
    client: Client,
    base_url: String,
    from: String,
    to: Vec<String>,
}

impl EmailSink {
    pub fn new(
        api_key: &str,
        from: &str,
        to: Vec<String>,
        base_url: &str,
    ) -> Result<Self, DeliveryError> {
        require("email", "api_key", api_key)?;
        require("email", "from", from)?;
        let to: Vec<String> = to
            .into_iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect();
        if to.is_empty() {
            return Err(DeliveryError::Config("email to is missing".to_string()));
        }

        let mut auth = header::HeaderValue::try_from(format!("Bearer {}", api_key.trim()))
            .map_err(|err| DeliveryError::Config(format!("invalid api key: {err}")))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            from: from.to_string(),
            to,
        })
    }
}

/// Names are typed by operators; keep them from turning into markup.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl Sink for EmailSink {
    fn kind(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, ledger: &RenderedLedger) -> Result<(), DeliveryError> {
        let encoder = base64::prelude::BASE64_STANDARD;
        let payload = EmailPayload {
            from: &self.from,
            to: &self.to,
            subject: SUBJECT,
            html: format!(
                "<p><b>Usuario:</b> {}</p><p><b>Ruta:</b> {}</p><p>Archivos adjuntos.</p>",
                escape_html(&ledger.operator),
                escape_html(&ledger.route)
            ),
            attachments: ledger
                .attachments
                .iter()
                .map(|a| EmailAttachment {
                    filename: &a.file_name,
                    content: encoder.encode(&a.bytes),
                })
                .collect(),
        };

        let resp = self
            .client
            .post(format!("{}/emails", self.base_url))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => "email service error".to_string(),
        };
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
