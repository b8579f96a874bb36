use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::browser::source::MatchRecorder;
use crate::errors::{ApiError, BrowserError};
use crate::models::Decision;

/// What a "pass" does on the backend. "Interested" always records a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassPolicy {
    /// Pass records nothing.
    #[default]
    Withhold,
    /// Pass deletes any match previously recorded for the candidate.
    Retract,
}

impl FromStr for PassPolicy {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "withhold" => Ok(PassPolicy::Withhold),
            "retract" | "delete" => Ok(PassPolicy::Retract),
            other => Err(BrowserError::UnknownPassPolicy(other.to_string())),
        }
    }
}

/// A decision taken on a specific candidate, emitted by `BrowserState::decide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionEvent {
    pub candidate_id: u64,
    /// Owning user of the profile; the backend records matches per user.
    pub user_id: u64,
    pub decision: Decision,
}

/// Maps a decision onto recorder calls according to the pass policy.
#[derive(Clone)]
struct MatchNotifier {
    recorder: Arc<dyn MatchRecorder>,
    job_id: u64,
    policy: PassPolicy,
}

impl MatchNotifier {
    async fn notify(&self, event: DecisionEvent) -> Result<(), ApiError> {
        match (event.decision, self.policy) {
            (Decision::Interested, _) => {
                self.recorder.create_match(event.user_id, self.job_id).await
            }
            (Decision::Pass, PassPolicy::Retract) => {
                self.recorder.delete_match(event.user_id, self.job_id).await
            }
            (Decision::Pass, PassPolicy::Withhold) => {
                debug!("Pass on candidate {} not recorded", event.candidate_id);
                Ok(())
            }
        }
    }
}

/// Forwards decisions to a `MatchRecorder` without ever blocking the caller.
///
/// Notifications run as background tasks owned by the dispatcher; call
/// `flush` before shutting the runtime down or in-flight ones are cancelled.
pub struct DecisionDispatcher {
    notifier: MatchNotifier,
    tasks: JoinSet<()>,
}

impl DecisionDispatcher {
    pub fn new(recorder: Arc<dyn MatchRecorder>, job_id: u64, policy: PassPolicy) -> Self {
        Self {
            notifier: MatchNotifier {
                recorder,
                job_id,
                policy,
            },
            tasks: JoinSet::new(),
        }
    }

    /// Spawns the notification and returns immediately. Failures are logged
    /// and swallowed.
    pub fn dispatch(&mut self, event: DecisionEvent) {
        let notifier = self.notifier.clone();
        self.tasks.spawn(async move {
            if let Err(e) = notifier.notify(event).await {
                warn!(
                    "Failed to record {:?} for candidate {}: {e}",
                    event.decision, event.candidate_id
                );
            }
        });
    }

    /// Applies the pass policy and calls the recorder, waiting for the result.
    pub async fn notify(&self, event: DecisionEvent) -> Result<(), ApiError> {
        self.notifier.notify(event).await
    }

    /// Number of dispatched notifications not yet collected by `flush`.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits up to `limit` for every dispatched notification to finish.
    /// Returns how many were still running when the limit expired.
    pub async fn flush(&mut self, limit: Duration) -> usize {
        let tasks = &mut self.tasks;
        let drained = tokio::time::timeout(limit, async {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    warn!("Decision notification task failed: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} decision notification(s) still in flight after {}ms",
                self.tasks.len(),
                limit.as_millis()
            );
        }
        self.tasks.len()
    }
}
