use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A skill tag from the backend vocabulary (`GET /skills/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The Django auth user that owns a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateUser {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviousTitle {
    pub title: String,
    pub company: String,
    /// Free text, e.g. "2020-2022".
    #[serde(default)]
    pub duration: String,
}

/// A candidate profile as served by `GET /profiles/`.
///
/// Immutable once loaded. Skills are unique by name: duplicates in the payload
/// collapse to their first occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: u64,
    pub user: CandidateUser,
    #[serde(default)]
    pub current_title: String,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub role_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, deserialize_with = "unique_skills")]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub previous_titles: Vec<PreviousTitle>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub twitter_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub personal_website: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// "First Last", or the username when the profile has no real name.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.user.first_name.trim(), self.user.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.user.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|s| s.name == name)
    }

    /// All external links that are set, labelled for display.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("LinkedIn", &self.linkedin_url),
            ("GitHub", &self.github_url),
            ("Portfolio", &self.portfolio_url),
            ("Twitter", &self.twitter_url),
            ("Website", &self.personal_website),
            ("Resume", &self.resume_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|u| (label, u)))
        .collect()
    }
}

fn unique_skills<'de, D>(deserializer: D) -> Result<Vec<Skill>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Skill>> = Option::deserialize(deserializer)?;
    let mut skills: Vec<Skill> = Vec::new();
    for skill in raw.unwrap_or_default() {
        if !skills.iter().any(|s| s.name == skill.name) {
            skills.push(skill);
        }
    }
    Ok(skills)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
