//! Fixtures shared by the browser tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::source::{MatchRecorder, ProfileSource};
use crate::errors::ApiError;
use crate::models::{Candidate, CandidateUser, Skill};

pub fn skill(id: u64, name: &str) -> Skill {
    Skill {
        id,
        name: name.to_string(),
        description: None,
    }
}

pub fn candidate(id: u64, skills: &[&str]) -> Candidate {
    Candidate {
        id,
        user: CandidateUser {
            id: id * 10,
            username: format!("user{id}"),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            email: format!("user{id}@example.com"),
        },
        current_title: "Engineer".to_string(),
        years_of_experience: 3,
        role_type: "Backend".to_string(),
        location: "Remote".to_string(),
        bio: String::new(),
        image_url: format!("https://img.example.com/{id}.jpg"),
        skills: skills
            .iter()
            .enumerate()
            .map(|(i, name)| skill(i as u64 + 1, name))
            .collect(),
        previous_titles: vec![],
        age: None,
        linkedin_url: None,
        github_url: None,
        portfolio_url: None,
        twitter_url: None,
        personal_website: None,
        resume_url: None,
        created_at: None,
        updated_at: None,
    }
}

fn unavailable() -> ApiError {
    ApiError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

/// In-memory `ProfileSource` with switchable failures per endpoint.
#[derive(Default)]
pub struct FixtureSource {
    pub candidates: Vec<Candidate>,
    pub skills: Vec<Skill>,
    pub fail_candidates: bool,
    pub fail_skills: bool,
    /// Delays before each call resolves (or fails).
    pub candidates_delay: Option<Duration>,
    pub skills_delay: Option<Duration>,
}

impl FixtureSource {
    pub fn new(candidates: Vec<Candidate>, skills: Vec<Skill>) -> Self {
        Self {
            candidates,
            skills,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ProfileSource for FixtureSource {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, ApiError> {
        if let Some(delay) = self.candidates_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_candidates {
            return Err(unavailable());
        }
        Ok(self.candidates.clone())
    }

    async fn fetch_skills(&self) -> Result<Vec<Skill>, ApiError> {
        if let Some(delay) = self.skills_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_skills {
            return Err(unavailable());
        }
        Ok(self.skills.clone())
    }
}

/// `MatchRecorder` that remembers every call.
#[derive(Default)]
pub struct RecordingMatches {
    fail: bool,
    delay: Option<Duration>,
    created: Mutex<Vec<(u64, u64)>>,
    deleted: Mutex<Vec<(u64, u64)>>,
    attempts: Mutex<usize>,
}

impl RecordingMatches {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Every call sleeps for `delay` before being recorded.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<(u64, u64)> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(u64, u64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    fn record(&self, log: &Mutex<Vec<(u64, u64)>>, user_id: u64, job_id: u64) -> Result<(), ApiError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(unavailable());
        }
        log.lock().unwrap().push((user_id, job_id));
        Ok(())
    }
}

#[async_trait]
impl MatchRecorder for RecordingMatches {
    async fn create_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.record(&self.created, user_id, job_id)
    }

    async fn delete_match(&self, user_id: u64, job_id: u64) -> Result<(), ApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.record(&self.deleted, user_id, job_id)
    }
}
