//! The Odds API over HTTP

use crate::client::{OddsTransport, TransportError, TransportResponse};
use crate::error::{OddsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "oddsline/0.1";

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OddsError::Internal(format!("failed to build odds HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn classify_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

#[async_trait]
impl OddsTransport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_reqwest)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(TransportResponse::status(status));
        }

        let text = response.text().await.map_err(classify_reqwest)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?
        };

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_paths() {
        let transport = HttpTransport::new("https://api.the-odds-api.com/v4/sports/").unwrap();
        assert_eq!(transport.base_url(), "https://api.the-odds-api.com/v4/sports");
        assert_eq!(transport.url(""), "https://api.the-odds-api.com/v4/sports");
        assert_eq!(transport.url("/"), "https://api.the-odds-api.com/v4/sports/");
        assert_eq!(
            transport.url("/soccer_epl/odds"),
            "https://api.the-odds-api.com/v4/sports/soccer_epl/odds"
        );
    }
}
