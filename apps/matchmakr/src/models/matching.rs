use serde::{Deserialize, Serialize};

/// The swiping user's verdict on the card currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Interested,
    Pass,
}

impl Decision {
    pub fn from_interested(interested: bool) -> Self {
        if interested {
            Decision::Interested
        } else {
            Decision::Pass
        }
    }

    pub fn is_interested(self) -> bool {
        matches!(self, Decision::Interested)
    }
}

/// Body of `POST /matches/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRequest {
    pub user_id: u64,
    pub job_id: u64,
}
