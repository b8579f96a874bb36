//! Candidate browser: owns the candidate pool, the active filters and the
//! cursor into the filtered sequence.
//!
//! All mutation happens through `&mut self` in response to discrete UI events.
//! Decisions advance the cursor synchronously; the presentation layer calls
//! `finish_transition` once its card animation is done.

pub mod decision;
pub mod filter;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

use tracing::{debug, error, info};

use crate::errors::BrowserError;
use crate::models::{Candidate, Decision, Skill};

use self::decision::DecisionEvent;
use self::filter::{apply_filters, FilterDimension, FilterOptions, FilterState};
use self::source::ProfileSource;

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load candidates. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready,
}

/// Guards against overlapping advances from rapid repeated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Deciding,
}

/// What the presentation layer should render right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrowserView<'a> {
    Loading,
    Error { message: &'a str },
    NoMatches,
    Card {
        candidate: &'a Candidate,
        /// 1-based position within the filtered sequence.
        position: usize,
        total: usize,
    },
}

#[derive(Debug)]
pub struct BrowserState {
    candidates: Vec<Candidate>,
    options: FilterOptions,
    filters: FilterState,
    /// Indices into `candidates`, in original order.
    filtered: Vec<usize>,
    cursor: usize,
    phase: Phase,
    load_state: LoadState,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    /// An empty browser waiting for its first `load`.
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            options: FilterOptions::default(),
            filters: FilterState::default(),
            filtered: Vec::new(),
            cursor: 0,
            phase: Phase::Idle,
            load_state: LoadState::Loading,
        }
    }

    /// A ready browser over an already-fetched pool.
    pub fn from_pool(candidates: Vec<Candidate>, skills: &[Skill]) -> Self {
        let mut state = Self::new();
        state.replace_pool(candidates, skills);
        state
    }

    /// Fetches candidates and skills concurrently. Both must succeed; on any
    /// failure the browser enters the error state with no data retained.
    /// Calling it again is the retry path.
    pub async fn load(&mut self, source: &dyn ProfileSource) -> Result<(), BrowserError> {
        self.load_state = LoadState::Loading;
        self.phase = Phase::Idle;

        match tokio::try_join!(source.fetch_candidates(), source.fetch_skills()) {
            Ok((candidates, skills)) => {
                info!(
                    "Loaded {} candidates and {} skills",
                    candidates.len(),
                    skills.len()
                );
                self.replace_pool(candidates, &skills);
                Ok(())
            }
            Err(e) => {
                error!("Error loading data: {e}");
                self.candidates.clear();
                self.options = FilterOptions::default();
                self.recompute();
                self.load_state = LoadState::Failed(LOAD_ERROR_MESSAGE.to_string());
                Err(BrowserError::Load(e))
            }
        }
    }

    /// Swaps in a new candidate pool and skill vocabulary, re-applying the
    /// current filters.
    pub fn replace_pool(&mut self, candidates: Vec<Candidate>, skills: &[Skill]) {
        self.candidates = candidates;
        self.options = FilterOptions::from_pool(&self.candidates, skills);
        self.load_state = LoadState::Ready;
        self.recompute();
    }

    pub fn select_filter(&mut self, dimension: FilterDimension, value: impl Into<String>) {
        let value = value.into();
        debug!("Filter {dimension} = {value}");
        self.filters.set(dimension, Some(value));
        self.recompute();
    }

    pub fn clear_filter(&mut self, dimension: FilterDimension) {
        debug!("Filter {dimension} cleared");
        self.filters.set(dimension, None);
        self.recompute();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = apply_filters(&self.candidates, &self.filters);
        self.cursor = 0;
        debug!(
            "{} of {} candidates match the active filters",
            self.filtered.len(),
            self.candidates.len()
        );
    }

    /// Records a decision on the current card and advances the cursor,
    /// wrapping at the end. Returns the event to forward to the match
    /// recorder, or `None` when there is nothing on screen or a previous
    /// decision is still in flight.
    pub fn decide(&mut self, interested: bool) -> Option<DecisionEvent> {
        if self.phase == Phase::Deciding {
            debug!("Ignoring decision while a transition is in flight");
            return None;
        }

        let candidate = self.current()?;
        let event = DecisionEvent {
            candidate_id: candidate.id,
            user_id: candidate.user.id,
            decision: Decision::from_interested(interested),
        };

        self.cursor = (self.cursor + 1) % self.filtered.len();
        self.phase = Phase::Deciding;
        Some(event)
    }

    /// Marks the card transition as complete so the next decision is accepted.
    pub fn finish_transition(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.filtered
            .get(self.cursor)
            .map(|i| &self.candidates[*i])
    }

    /// The card a decision would reveal next; used to prefetch its image.
    pub fn peek_next(&self) -> Option<&Candidate> {
        if self.filtered.is_empty() {
            return None;
        }
        let next = (self.cursor + 1) % self.filtered.len();
        Some(&self.candidates[self.filtered[next]])
    }

    pub fn filtered(&self) -> Vec<&Candidate> {
        self.filtered.iter().map(|i| &self.candidates[*i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn view(&self) -> BrowserView<'_> {
        match &self.load_state {
            LoadState::Loading => BrowserView::Loading,
            LoadState::Failed(message) => BrowserView::Error { message },
            LoadState::Ready => match self.current() {
                Some(candidate) => BrowserView::Card {
                    candidate,
                    position: self.cursor + 1,
                    total: self.filtered.len(),
                },
                None => BrowserView::NoMatches,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::test_support::{candidate, skill, FixtureSource};
    use std::time::Duration;

    fn ids(state: &BrowserState) -> Vec<u64> {
        state.filtered().iter().map(|c| c.id).collect()
    }

    fn decide_and_settle(state: &mut BrowserState, interested: bool) -> Option<DecisionEvent> {
        let event = state.decide(interested);
        state.finish_transition();
        event
    }

    fn pool_with_years(years: &[u32]) -> Vec<Candidate> {
        years
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let mut c = candidate(i as u64 + 1, &[]);
                c.years_of_experience = *y;
                c
            })
            .collect()
    }

    #[test]
    fn test_new_browser_is_loading() {
        let state = BrowserState::new();
        assert_eq!(state.view(), BrowserView::Loading);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_decide_advances_and_wraps() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 2, 3]), &[]);

        let first = decide_and_settle(&mut state, true).unwrap();
        assert_eq!(first.candidate_id, 1);
        assert_eq!(first.user_id, 10);
        assert_eq!(first.decision, Decision::Interested);
        assert_eq!(state.cursor(), 1);

        let second = decide_and_settle(&mut state, false).unwrap();
        assert_eq!(second.candidate_id, 2);
        assert_eq!(second.decision, Decision::Pass);

        decide_and_settle(&mut state, true);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.current().unwrap().id, 1);
    }

    #[test]
    fn test_n_decisions_leave_cursor_at_n_mod_k() {
        for k in 1..=4usize {
            for n in 0..=9usize {
                let years: Vec<u32> = (0..k as u32).collect();
                let mut state = BrowserState::from_pool(pool_with_years(&years), &[]);
                for i in 0..n {
                    decide_and_settle(&mut state, i % 2 == 0);
                }
                assert_eq!(state.cursor(), n % k, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_decide_on_empty_is_noop() {
        let mut state = BrowserState::from_pool(vec![], &[]);
        assert_eq!(state.view(), BrowserView::NoMatches);

        assert!(state.decide(true).is_none());
        assert!(state.decide(false).is_none());
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_decide_ignored_while_deciding() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 2, 3]), &[]);

        assert!(state.decide(true).is_some());
        assert_eq!(state.phase(), Phase::Deciding);
        assert!(state.decide(true).is_none());
        assert_eq!(state.cursor(), 1);

        state.finish_transition();
        assert!(state.decide(false).is_some());
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn test_select_then_clear_restores_original_order() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 4, 6, 10]), &[]);

        state.select_filter(FilterDimension::Experience, "3-5");
        assert_eq!(ids(&state), vec![2]);

        state.select_filter(FilterDimension::Experience, "5+");
        assert_eq!(ids(&state), vec![3, 4]);

        state.clear_filter(FilterDimension::Experience);
        assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_change_resets_cursor() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 4, 6, 10]), &[]);
        decide_and_settle(&mut state, true);
        decide_and_settle(&mut state, true);
        assert_eq!(state.cursor(), 2);

        state.select_filter(FilterDimension::Experience, "0-20");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_empty_filter_result_shows_no_matches() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 2]), &[]);
        state.select_filter(FilterDimension::Experience, "10+");

        assert_eq!(state.view(), BrowserView::NoMatches);
        assert!(state.current().is_none());
        assert!(state.peek_next().is_none());
        assert!(state.decide(true).is_none());

        state.clear_all_filters();
        assert_eq!(state.filtered_len(), 2);
    }

    #[test]
    fn test_skill_filter_example() {
        let pool = vec![
            candidate(1, &["Python"]),
            candidate(2, &["React"]),
            candidate(3, &["Swift"]),
            candidate(4, &["React Native"]),
            candidate(5, &["AWS", "React"]),
        ];
        let mut state = BrowserState::from_pool(pool, &[skill(1, "React")]);

        state.select_filter(FilterDimension::Skill, "React");
        assert_eq!(ids(&state), vec![2, 5]);
    }

    #[test]
    fn test_peek_next_wraps() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 2]), &[]);
        assert_eq!(state.peek_next().unwrap().id, 2);
        decide_and_settle(&mut state, false);
        assert_eq!(state.peek_next().unwrap().id, 1);
    }

    #[test]
    fn test_card_view_reports_position() {
        let mut state = BrowserState::from_pool(pool_with_years(&[1, 2, 3]), &[]);
        decide_and_settle(&mut state, true);

        match state.view() {
            BrowserView::Card {
                candidate,
                position,
                total,
            } => {
                assert_eq!(candidate.id, 2);
                assert_eq!(position, 2);
                assert_eq!(total, 3);
            }
            other => panic!("expected card, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_populates_pool_and_options() {
        let source = FixtureSource::new(
            vec![candidate(1, &["React"]), candidate(2, &["Go"])],
            vec![skill(1, "React"), skill(2, "Go")],
        );
        let mut state = BrowserState::new();

        state.load(&source).await.unwrap();

        assert_eq!(state.load_state(), &LoadState::Ready);
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.filter_options().skill, vec!["React", "Go"]);
        assert_eq!(state.filter_options().role_type, vec!["Backend"]);
        assert_eq!(state.filter_options().location, vec!["Remote"]);
    }

    #[tokio::test]
    async fn test_skills_failure_enters_error_state() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![skill(1, "React")]);
        source.fail_skills = true;
        let mut state = BrowserState::new();

        let result = state.load(&source).await;

        assert!(matches!(result, Err(BrowserError::Load(_))));
        assert_eq!(
            state.view(),
            BrowserView::Error {
                message: LOAD_ERROR_MESSAGE
            }
        );
        assert!(state.candidates().is_empty());
        assert!(state.current().is_none());
    }

    #[tokio::test]
    async fn test_candidates_failure_enters_error_state() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![]);
        source.fail_candidates = true;
        let mut state = BrowserState::new();

        assert!(state.load(&source).await.is_err());
        assert!(matches!(state.load_state(), LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_reload_discards_previous_pool() {
        let good = FixtureSource::new(vec![candidate(1, &[]), candidate(2, &[])], vec![]);
        let mut bad = FixtureSource::new(vec![], vec![]);
        bad.fail_skills = true;
        let mut state = BrowserState::new();

        state.load(&good).await.unwrap();
        decide_and_settle(&mut state, true);
        assert!(state.load(&bad).await.is_err());

        assert!(state.candidates().is_empty());
        assert_eq!(state.cursor(), 0);
    }

    #[tokio::test]
    async fn test_retry_after_failure_recovers() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![]);
        source.fail_candidates = true;
        let mut state = BrowserState::new();
        assert!(state.load(&source).await.is_err());

        source.fail_candidates = false;
        state.load(&source).await.unwrap();

        assert_eq!(state.load_state(), &LoadState::Ready);
        assert_eq!(state.current().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_load_keeps_active_filters() {
        let mut pool = vec![candidate(1, &[]), candidate(2, &[])];
        pool[1].years_of_experience = 9;
        let source = FixtureSource::new(pool, vec![]);
        let mut state = BrowserState::new();
        state.select_filter(FilterDimension::Experience, "5+");

        state.load(&source).await.unwrap();

        assert_eq!(ids(&state), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_waits_for_both_fetches() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![skill(1, "Rust")]);
        source.skills_delay = Some(Duration::from_secs(5));
        let mut state = BrowserState::new();

        state.load(&source).await.unwrap();

        assert_eq!(state.filter_options().skill, vec!["Rust"]);
        assert_eq!(state.filtered_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_runs_fetches_concurrently() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![skill(1, "Rust")]);
        source.candidates_delay = Some(Duration::from_secs(5));
        source.skills_delay = Some(Duration::from_secs(5));
        let mut state = BrowserState::new();

        let started = tokio::time::Instant::now();
        state.load(&source).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6), "fetches ran one after the other: {elapsed:?}");
        assert_eq!(state.load_state(), &LoadState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_fails_without_waiting_for_slow_fetch() {
        let mut source = FixtureSource::new(vec![candidate(1, &[])], vec![skill(1, "Rust")]);
        source.fail_candidates = true;
        source.skills_delay = Some(Duration::from_secs(5));
        let mut state = BrowserState::new();

        let started = tokio::time::Instant::now();
        assert!(state.load(&source).await.is_err());

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(state.load_state(), LoadState::Failed(_)));
        assert!(state.candidates().is_empty());
    }
}
