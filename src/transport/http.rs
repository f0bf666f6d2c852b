//! HTTP responder for bot-API style transports

use super::{Responder, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Sends outbound messages by POSTing to the transport's send endpoint
pub struct HttpResponder {
    client: Client,
    send_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
}

impl HttpResponder {
    pub fn new(base_url: &str, token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", base_url.trim_end_matches('/'), token),
        }
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn send_text(&self, identity: i64, text: &str) -> Result<(), TransportError> {
        let body = SendMessageBody {
            chat_id: identity,
            text,
        };

        let response = self
            .client
            .post(&self.send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Network(format!("Send timeout: {e}"))
                } else {
                    TransportError::Network(format!("Send failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(format!("HTTP {status}: {detail}")));
        }
        Ok(())
    }
}
