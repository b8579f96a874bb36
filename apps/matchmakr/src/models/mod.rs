pub mod candidate;
pub mod matching;

pub use candidate::{Candidate, CandidateUser, PreviousTitle, Skill};
pub use matching::{Decision, MatchRequest};
