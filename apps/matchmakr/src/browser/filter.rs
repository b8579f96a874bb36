//! Filter engine: narrows the candidate pool by single-select dimensions.
//!
//! Active dimensions combine with AND; an inactive dimension passes everything.
//! The output preserves the pool's original order.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::errors::BrowserError;
use crate::models::{Candidate, Skill};

const EXPERIENCE_CHOICES: &[&str] = &["0-2 years", "3-5 years", "5+ years"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Experience,
    RoleType,
    Location,
    Skill,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::Experience,
        FilterDimension::RoleType,
        FilterDimension::Location,
        FilterDimension::Skill,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Experience => "Experience",
            FilterDimension::RoleType => "Role Type",
            FilterDimension::Location => "Location",
            FilterDimension::Skill => "Skills",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterDimension {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experience" | "exp" | "years" => Ok(FilterDimension::Experience),
            "role" | "role_type" | "roletype" | "role-type" => Ok(FilterDimension::RoleType),
            "location" | "loc" => Ok(FilterDimension::Location),
            "skill" | "skills" => Ok(FilterDimension::Skill),
            other => Err(BrowserError::UnknownFilter(other.to_string())),
        }
    }
}

/// At most one selected value per dimension; `None` means inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub experience: Option<String>,
    pub role_type: Option<String>,
    pub location: Option<String>,
    pub skill: Option<String>,
}

impl FilterState {
    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        self.slot(dimension).as_deref()
    }

    pub fn set(&mut self, dimension: FilterDimension, value: Option<String>) {
        *self.slot_mut(dimension) = value;
    }

    pub fn clear_all(&mut self) {
        *self = FilterState::default();
    }

    pub fn is_empty(&self) -> bool {
        FilterDimension::ALL.iter().all(|d| self.get(*d).is_none())
    }

    /// Active selections in display order.
    pub fn active(&self) -> Vec<(FilterDimension, &str)> {
        FilterDimension::ALL
            .iter()
            .filter_map(|d| self.get(*d).map(|v| (*d, v)))
            .collect()
    }

    fn slot(&self, dimension: FilterDimension) -> &Option<String> {
        match dimension {
            FilterDimension::Experience => &self.experience,
            FilterDimension::RoleType => &self.role_type,
            FilterDimension::Location => &self.location,
            FilterDimension::Skill => &self.skill,
        }
    }

    fn slot_mut(&mut self, dimension: FilterDimension) -> &mut Option<String> {
        match dimension {
            FilterDimension::Experience => &mut self.experience,
            FilterDimension::RoleType => &mut self.role_type,
            FilterDimension::Location => &mut self.location,
            FilterDimension::Skill => &mut self.skill,
        }
    }
}

/// Parsed experience bracket: `"3-5 years"` → 3..=5, `"5+ years"` → 5.., inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceBracket {
    pub min: u32,
    pub max: Option<u32>,
}

impl ExperienceBracket {
    /// Returns `None` when the text does not start with a number.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split('-');
        let min = leading_number(tokens.next()?)?;
        let max = tokens.next().and_then(leading_number);
        Some(Self { min, max })
    }

    pub fn contains(&self, years: u32) -> bool {
        match self.max {
            Some(max) => self.min <= years && years <= max,
            None => years >= self.min,
        }
    }
}

/// Integer prefix of a token, ignoring leading whitespace ("10+ years" → 10).
fn leading_number(token: &str) -> Option<u32> {
    let token = token.trim_start();
    let end = token
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    token[..end].parse().ok()
}

/// Per-dimension predicate compiled once per recompute.
struct CompiledFilter<'a> {
    experience: Option<ExperienceBracket>,
    role_type: Option<&'a str>,
    location: Option<&'a str>,
    skill: Option<&'a str>,
}

impl<'a> CompiledFilter<'a> {
    fn compile(state: &'a FilterState) -> Self {
        let experience = state.experience.as_deref().and_then(|text| {
            let bracket = ExperienceBracket::parse(text);
            if bracket.is_none() {
                warn!("Ignoring malformed experience filter '{text}'");
            }
            bracket
        });

        Self {
            experience,
            role_type: state.role_type.as_deref(),
            location: state.location.as_deref(),
            skill: state.skill.as_deref(),
        }
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        self.experience
            .map_or(true, |b| b.contains(candidate.years_of_experience))
            && self.role_type.map_or(true, |r| candidate.role_type == r)
            && self.location.map_or(true, |l| candidate.location == l)
            && self.skill.map_or(true, |s| candidate.has_skill(s))
    }
}

/// Indices into `candidates` of every profile passing `state`, in original order.
pub fn apply_filters(candidates: &[Candidate], state: &FilterState) -> Vec<usize> {
    let filter = CompiledFilter::compile(state);
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| filter.matches(c))
        .map(|(i, _)| i)
        .collect()
}

/// Choices offered for each dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub experience: Vec<String>,
    pub role_type: Vec<String>,
    pub location: Vec<String>,
    pub skill: Vec<String>,
}

impl FilterOptions {
    /// Fixed experience brackets, plus the role types and locations that
    /// occur in `candidates` and the fetched skill names. Every list is
    /// de-duplicated in first-seen order, so each choice matches exactly.
    pub fn from_pool(candidates: &[Candidate], skills: &[Skill]) -> Self {
        Self {
            experience: EXPERIENCE_CHOICES.iter().map(|c| c.to_string()).collect(),
            role_type: distinct(candidates.iter().map(|c| c.role_type.as_str())),
            location: distinct(candidates.iter().map(|c| c.location.as_str())),
            skill: distinct(skills.iter().map(|s| s.name.as_str())),
        }
    }

    pub fn for_dimension(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::Experience => &self.experience,
            FilterDimension::RoleType => &self.role_type,
            FilterDimension::Location => &self.location,
            FilterDimension::Skill => &self.skill,
        }
    }
}

/// Non-blank values in first-seen order, without repeats.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.trim().is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
