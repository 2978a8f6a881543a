use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::configuration::LineSettings;

const PUSH_PATH: &str = "/v2/bot/message/push";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("push rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

pub struct LineClient {
    client: Client,
    channel_access_token: String,
    push_url: String,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    message: String,
}

impl LineClient {
    pub fn new(settings: &LineSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(LineClient::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: &LineSettings) -> Self {
        LineClient {
            client,
            channel_access_token: settings.channel_access_token.clone(),
            push_url: format!(
                "{}{}",
                settings.api_base_url.trim_end_matches('/'),
                PUSH_PATH
            ),
        }
    }

    pub async fn push_text(&self, to: &str, text: &str) -> Result<(), NotifyError> {
        let body = PushRequest {
            to,
            messages: [TextMessage { kind: "text", text }],
        };

        let res = self
            .client
            .post(&self.push_url)
            .bearer_auth(&self.channel_access_token)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let raw = res.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&raw) {
            Ok(json) => json.message,
            Err(_) => raw,
        };

        Err(NotifyError::Rejected { status, message })
    }
}
