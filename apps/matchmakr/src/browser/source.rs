use async_trait::async_trait;

use crate::errors::ApiError;
use crate::models::{Candidate, Skill};

/// Supplies the candidate pool and skill vocabulary at load time.
///
/// `ApiClient` is the production implementation; tests plug in fixtures.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, ApiError>;

    async fn fetch_skills(&self) -> Result<Vec<Skill>, ApiError>;
}

/// Receives the swiping user's decisions. Calls are fire-and-forget from the
/// browser's point of view.
#[async_trait]
pub trait MatchRecorder: Send + Sync {
    async fn create_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError>;

    async fn delete_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError>;
}
