//! API Client: the single point of entry for backend REST calls.
//!
//! Implements both collaborator seams of the browser: `ProfileSource` for the
//! initial load and `MatchRecorder` for decision notifications.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::browser::source::{MatchRecorder, ProfileSource};
use crate::errors::ApiError;
use crate::models::{Candidate, MatchRequest, Skill};
use crate::session::Session;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

enum Attempt {
    Done(Response),
    Retry(ApiError),
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at `MAX_RETRY_DELAY`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.checked_mul(factor)
        .unwrap_or(MAX_RETRY_DELAY)
        .min(MAX_RETRY_DELAY)
}

/// Error bodies from DRF use `detail`; the auth views use `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// REST client for the matchmakr backend.
/// Retries 429 and 5xx responses with capped exponential backoff.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    session: Session,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new(session: Session) -> Result<Self, ApiError> {
        Self::with_timeout(session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(session: Session, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            session,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Base delay of the backoff; retry `n` waits `delay * 2^(n-1)`, at most 30s.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.session.endpoint(path))
            .header("Authorization", self.session.authorization())
    }

    /// Sends the request built by `build`, retrying transient failures.
    /// Returns the first successful response, or the last error once the
    /// retries are spent.
    ///
    /// Non-idempotent requests are only retried on 429, where the backend
    /// rejected the call without processing it.
    async fn send<F>(&self, build: F, idempotent: bool) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            let error = match self.attempt(&build, idempotent).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retry(error) => error,
            };

            if attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;

            let delay = backoff_delay(self.retry_delay, attempt);
            warn!(
                "API call attempt {} failed ({}), retrying after {}ms...",
                attempt,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One round trip. `Err` is fatal; `Attempt::Retry` may be tried again.
    async fn attempt<F>(&self, build: &F, idempotent: bool) -> Result<Attempt, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = match build().send().await {
            Ok(r) => r,
            Err(e) if idempotent => return Ok(Attempt::Retry(ApiError::Http(e))),
            Err(e) => return Err(ApiError::Http(e)),
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("API returned {}: {}", status, body);
            let error = ApiError::Api {
                status: status.as_u16(),
                message: body,
            };
            return if idempotent || status.as_u16() == 429 {
                Ok(Attempt::Retry(error))
            } else {
                Err(error)
            };
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.detail.or(e.message))
                .unwrap_or(body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Attempt::Done(response))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(|| self.request(Method::GET, path), true).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Parse)
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, ApiError> {
        let candidates: Vec<Candidate> = self.get_json("profiles/").await?;
        debug!("Fetched {} candidate profiles", candidates.len());
        Ok(candidates)
    }

    async fn fetch_skills(&self) -> Result<Vec<Skill>, ApiError> {
        let skills: Vec<Skill> = self.get_json("skills/").await?;
        debug!("Fetched {} skills", skills.len());
        Ok(skills)
    }
}

#[async_trait]
impl MatchRecorder for ApiClient {
    async fn create_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError> {
        let body = MatchRequest { user_id, job_id };
        // A duplicate match violates the backend's unique (job, candidate)
        // constraint; resending after a 5xx cannot help.
        self.send(|| self.request(Method::POST, "matches/").json(&body), false)
            .await?;
        debug!("Recorded match user={user_id} job={job_id}");
        Ok(())
    }

    async fn delete_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError> {
        let path = format!("matches/{user_id}/{job_id}/");
        self.send(|| self.request(Method::DELETE, &path), true).await?;
        debug!("Deleted match user={user_id} job={job_id}");
        Ok(())
    }
}
