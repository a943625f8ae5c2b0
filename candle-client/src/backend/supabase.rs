//! Hosted REST backend.
//!
//! Talks to a Supabase-style project: PostgREST for the `markers` table and
//! rejection log, a rate-limited RPC for candle creation, and GoTrue for
//! anonymous session issuance (optionally gated by a human-verification
//! challenge token).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::traits::*;
use crate::candle::{Candle, NewCandle};
use crate::session::Session;
use crate::sidechannel::RejectionReport;
use crate::stream::{CandleBatch, CandleStream};

/// Rows fetched per page when listing candles.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Supabase-style REST backend.
#[derive(Clone)]
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    page_size: usize,
}

impl SupabaseBackend {
    /// Create a backend for the given project URL and anon key.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let anon_key = anon_key.into();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Ok(value) = header::HeaderValue::from_str(&anon_key) {
            headers.insert(header::HeaderName::from_static("apikey"), value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the listing page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Bearer header value: the session token when present, the anon key otherwise.
    fn bearer(&self, session: Option<&Session>) -> String {
        let token = session
            .map(|s| s.access_token.as_str())
            .unwrap_or(&self.anon_key);
        format!("Bearer {}", token)
    }

    /// Fetch one page of markers.
    async fn fetch_page(&self, offset: usize) -> Result<Vec<Candle>, BackendError> {
        let response = self
            .client
            .get(self.rest_url("markers"))
            .header(header::AUTHORIZATION, self.bearer(None))
            .query(&[
                ("select", "*".to_string()),
                ("order", "id.asc".to_string()),
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

/// GoTrue anonymous signup request.
#[derive(Debug, Serialize)]
struct SignupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    gotrue_meta_security: Option<CaptchaToken>,
}

#[derive(Debug, Serialize)]
struct CaptchaToken {
    captcha_token: String,
}

/// GoTrue anonymous signup response.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    access_token: String,
    expires_in: Option<i64>,
    user: SignupUser,
}

#[derive(Debug, Deserialize)]
struct SignupUser {
    id: String,
}

/// RPC parameters for candle creation.
#[derive(Debug, Serialize)]
struct CreateCandleParams<'a> {
    emotion: &'a str,
    position: [f64; 2],
    user_timestamp: &'a str,
}

/// Map a non-success response to a backend error.
///
/// Rate limiting is recognized by status 429 or by a body mentioning it (the
/// creation RPC raises a plain Postgres error with a message).
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_ms = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|secs| secs * 1000);

    let body = response.text().await.unwrap_or_default();
    let lowered = body.to_lowercase();

    if status == StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("rate limit")
        || lowered.contains("rate_limit")
        || lowered.contains("too many requests")
    {
        debug!(%status, "Submission classified as rate limited");
        return Err(BackendError::RateLimited { retry_after_ms });
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized(format!("HTTP {}: {}", status, body)));
    }

    Err(BackendError::RequestFailed(format!(
        "HTTP {}: {}",
        status, body
    )))
}

#[async_trait]
impl CandleBackend for SupabaseBackend {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.auth_url("health"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn issue_session(&self, challenge: Option<&str>) -> Result<Session, BackendError> {
        let request = SignupRequest {
            gotrue_meta_security: challenge.map(|token| CaptchaToken {
                captcha_token: token.to_string(),
            }),
        };

        let response = self
            .client
            .post(self.auth_url("signup"))
            .header(header::AUTHORIZATION, self.bearer(None))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let response = check_status(response).await?;
        let signup: SignupResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        let issued_at = Utc::now();
        info!(user_id = %signup.user.id, "Anonymous session issued");

        Ok(Session {
            user_id: signup.user.id,
            access_token: signup.access_token,
            issued_at,
            expires_at: signup
                .expires_in
                .map(|secs| issued_at + Duration::seconds(secs)),
        })
    }

    async fn list_candles(&self) -> Result<Vec<Candle>, BackendError> {
        let mut all = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(offset).await?;
            let fetched = page.len();
            all.extend(page);

            debug!(offset, fetched, total = all.len(), "Fetched candle page");

            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }

        Ok(all)
    }

    async fn stream_candles(&self) -> Result<CandleStream, BackendError> {
        let (tx, rx) = mpsc::channel(4);
        let backend = self.clone();

        tokio::spawn(async move {
            let mut offset = 0;
            loop {
                match backend.fetch_page(offset).await {
                    Ok(page) => {
                        let fetched = page.len();
                        let is_final = fetched < backend.page_size;
                        let batch = if is_final {
                            CandleBatch::final_page(page)
                        } else {
                            CandleBatch::page(page)
                        };
                        if tx.send(batch).await.is_err() {
                            break;
                        }
                        if is_final {
                            break;
                        }
                        offset += fetched;
                    }
                    Err(err) => {
                        // End the stream; the consumer keeps whatever loaded.
                        warn!(error = %err, offset, "Candle page fetch failed");
                        break;
                    }
                }
            }
        });

        Ok(CandleStream::new(rx))
    }

    async fn create_candle(
        &self,
        session: &Session,
        candle: &NewCandle,
    ) -> Result<Candle, BackendError> {
        let params = CreateCandleParams {
            emotion: &candle.emotion,
            position: candle.position.into(),
            user_timestamp: &candle.user_timestamp,
        };

        let response = self
            .client
            .post(self.rest_url("rpc/create_candle"))
            .header(header::AUTHORIZATION, self.bearer(Some(session)))
            .json(&params)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }

    async fn delete_candle(&self, session: &Session, id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.rest_url("markers"))
            .header(header::AUTHORIZATION, self.bearer(Some(session)))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let response = check_status(response).await?;
        let deleted: Vec<Candle> = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        // Row-level security silently filters rows the session does not own,
        // so an empty result means the delete did not happen.
        if deleted.is_empty() {
            return Err(BackendError::NotOwner(id.to_string()));
        }
        Ok(())
    }

    async fn log_rejection(&self, report: &RejectionReport) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.rest_url("rejection_logs"))
            .header(header::AUTHORIZATION, self.bearer(None))
            .json(report)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_construction() {
        let backend = SupabaseBackend::new("https://example.supabase.co/", "anon-key")
            .with_page_size(100);
        assert_eq!(backend.id(), "https://example.supabase.co");
        assert_eq!(backend.page_size, 100);
    }

    #[test]
    fn test_bearer_prefers_session_token() {
        let backend = SupabaseBackend::new("https://example.supabase.co", "anon-key");
        assert_eq!(backend.bearer(None), "Bearer anon-key");

        let session = Session {
            user_id: "anon-1".to_string(),
            access_token: "session-token".to_string(),
            issued_at: Utc::now(),
            expires_at: None,
        };
        assert_eq!(backend.bearer(Some(&session)), "Bearer session-token");
    }
}
