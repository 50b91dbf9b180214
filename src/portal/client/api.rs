//! JSON transport shared by every remote call. It attaches the bearer token,
//! applies the 401 policy and turns HTTP failures into [`ClientError`]s with
//! messages fit for the user.

use super::ClientError;
use crate::portal::session::VerificationSession;
use anyhow::{Context, Result};
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub(crate) struct ApiTransport {
    http: Client,
    base_url: String,
}

impl ApiTransport {
    pub(crate) fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported API base URL scheme: {}", parsed.scheme());
        }

        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim().to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post `body` to `path` and decode the JSON reply.
    ///
    /// `fallback` is the message used when a failed response carries nothing
    /// readable.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &mut VerificationSession,
        path: &str,
        body: &B,
        fallback: &'static str,
    ) -> Result<T, ClientError> {
        let url = build_url_with_base(&self.base_url, path);

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = session.auth_token() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let span = info_span!("portal.request", http.method = "POST", url = %url);
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        debug!(%status, path, "remote response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "remote rejected credentials, clearing stored token");
            session.clear_auth_token();
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: error_message(&body, fallback),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Parse(format!("Failed to decode response: {err}")))
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(err.without_url().to_string())
    }
}

/// Prefer the API's `message`, then the raw body, then the caller's fallback.
fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
        {
            return message.chars().take(MAX_ERROR_CHARS).collect();
        }
        return fallback.to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
