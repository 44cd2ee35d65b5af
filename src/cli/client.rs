//! HTTP client for the local meetcost service.

use anyhow::{bail, Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::Config;

const CONNECT_HINT: &str = "Failed to connect to meetcost service. Is it running?";

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the service address in the user's config.
    pub fn from_config() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config.server.base_url()))
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context(CONNECT_HINT)?;
        let status = response.status();
        let json: Value = response
            .json()
            .await
            .context("Service returned an invalid response")?;

        if !status.is_success() {
            bail!("{}", error_message(status, &json));
        }
        Ok(json)
    }
}

fn error_message(status: StatusCode, json: &Value) -> String {
    let message = json
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error");
    match status {
        StatusCode::FORBIDDEN => format!("Upgrade required: {}", message),
        _ => message.to_string(),
    }
}
