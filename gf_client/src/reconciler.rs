//! Daily entry reconciliation.
//!
//! A [`DailyEntryReconciler`] holds the editable inputs for one calendar
//! date and reconciles them with the record saved on the server:
//!
//! ```text
//! Unloaded ──load──▶ Loading ──▶ LoadedEmpty ─┐
//!                              └▶ LoadedFilled ┤◀── save ok
//!                                              ▼
//!                                  edit ──▶ Dirty ──save──▶ Saving
//!                                              ▲               │
//!                                              └── save failed ┘
//! ```
//!
//! Every load and save is tagged with the date and a generation number when
//! it is issued. Its response is applied only if both still match, so a slow
//! response for a date the user already left is discarded as
//! [`Outcome::Stale`].
//!
//! The projected score is recomputed locally from the current inputs and
//! never touches the network. The saved score only changes on load and after
//! a successful save.

use chrono::{Local, NaiveDate};
use greenify::{
    DailyEntryView, DailyInputs,
    scoring::{normalize_miles, sanitize_miles, score},
};
use reqwest::{Method, StatusCode};
use serde_json::json;
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    errors::{ClientError, ClientResult},
    session::{SessionManager, failure_detail},
};

/// Where the reconciler is in its load / edit / save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    /// Nothing fetched for the current date (or not logged in)
    Unloaded,
    /// Fetch in flight
    Loading,
    /// Server has no record for the date
    LoadedEmpty,
    /// Local inputs match the record on the server
    LoadedFilled,
    /// Local inputs have unsaved edits
    Dirty,
    /// Save in flight
    Saving,
}

impl fmt::Display for EntryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unloaded => "not loaded",
            Self::Loading => "loading",
            Self::LoadedEmpty => "nothing saved yet",
            Self::LoadedFilled => "saved",
            Self::Dirty => "unsaved changes",
            Self::Saving => "saving",
        };
        f.write_str(label)
    }
}

/// Result of an operation whose response may have gone stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Response applied to the current date
    Applied(T),
    /// Date or generation moved on while the request was in flight
    Stale,
}

#[derive(Debug)]
struct EntryState {
    date: NaiveDate,
    generation: u64,
    revision: u64,
    inputs: DailyInputs,
    phase: EntryPhase,
    saved_points: Option<u32>,
}

impl EntryState {
    fn fresh(date: NaiveDate, generation: u64) -> Self {
        Self {
            date,
            generation,
            revision: 0,
            inputs: DailyInputs::empty(date),
            phase: EntryPhase::Unloaded,
            saved_points: None,
        }
    }

    fn is_current(&self, date: NaiveDate, generation: u64) -> bool {
        self.date == date && self.generation == generation
    }
}

/// Editable daily entry bound to a session.
///
/// Cloning yields another handle on the same state. The inner lock is
/// never held across an `.await`.
#[derive(Clone)]
pub struct DailyEntryReconciler {
    session: Arc<SessionManager>,
    state: Arc<Mutex<EntryState>>,
}

impl DailyEntryReconciler {
    pub fn new(session: Arc<SessionManager>, date: NaiveDate) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(EntryState::fresh(date, 0))),
        }
    }

    /// Reconciler for the local calendar day
    pub fn for_today(session: Arc<SessionManager>) -> Self {
        Self::new(session, Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.lock().date
    }

    pub fn inputs(&self) -> DailyInputs {
        self.lock().inputs.clone()
    }

    pub fn phase(&self) -> EntryPhase {
        self.lock().phase
    }

    /// Live score of the current, possibly unsaved, inputs
    pub fn projected_points(&self) -> u32 {
        score(&self.lock().inputs)
    }

    /// Score last confirmed by the server, `None` when unknown
    pub fn saved_points(&self) -> Option<u32> {
        self.lock().saved_points
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().phase == EntryPhase::Dirty
    }

    /// Switch to another date, dropping local edits and any in-flight results
    pub fn set_date(&self, date: NaiveDate) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = EntryState::fresh(date, generation);
        log::debug!("Reconciler moved to {}", date);
    }

    /// Fetch the saved record for the current date and seed local inputs
    /// from it.
    ///
    /// Without a session this is a no-op that leaves the phase `Unloaded`.
    /// Read failures of any kind count as "no record".
    pub async fn load(&self) -> Outcome<EntryPhase> {
        let (date, generation) = {
            let mut state = self.lock();
            if !self.session.is_authenticated() {
                state.phase = EntryPhase::Unloaded;
                return Outcome::Applied(EntryPhase::Unloaded);
            }
            state.generation += 1;
            state.phase = EntryPhase::Loading;
            (state.date, state.generation)
        };

        let fetched = self.fetch(date).await;

        let mut state = self.lock();
        if !state.is_current(date, generation) {
            log::debug!("Discarding stale load for {}", date);
            return Outcome::Stale;
        }

        match fetched.and_then(|view| view.raw.map(|raw| (raw, view.points_total))) {
            Some((raw, points_total)) => {
                state.inputs = DailyInputs { date, ..raw };
                state.saved_points = Some(points_total);
                state.phase = EntryPhase::LoadedFilled;
            }
            None => {
                state.inputs = DailyInputs::empty(date);
                state.saved_points = None;
                state.phase = if self.session.is_authenticated() {
                    EntryPhase::LoadedEmpty
                } else {
                    EntryPhase::Unloaded
                };
            }
        }
        state.revision += 1;

        Outcome::Applied(state.phase)
    }

    /// Submit the full inputs for the current date.
    ///
    /// On success the saved points become the server's `pointsTotal`. On
    /// failure the local inputs are kept and the phase returns to `Dirty`.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotAuthenticated` - No session; nothing was sent
    /// * `ClientError::SessionExpired` - Server rejected the token
    /// * `ClientError::SaveFailed` - Server answered with a non-2xx status
    /// * `ClientError::Transport` - Server unreachable
    pub async fn save(&self) -> ClientResult<Outcome<u32>> {
        let (inputs, generation, revision) = {
            let mut state = self.lock();
            if !self.session.is_authenticated() {
                log::warn!("Refusing to save {} without a session", state.date);
                return Err(ClientError::NotAuthenticated);
            }
            state.generation += 1;
            state.phase = EntryPhase::Saving;
            (state.inputs.clone(), state.generation, state.revision)
        };

        let result = self.submit(&inputs).await;

        let mut state = self.lock();
        if !state.is_current(inputs.date, generation) {
            match &result {
                Ok(_) => log::debug!("Discarding stale save response for {}", inputs.date),
                Err(e) => log::warn!(
                    "Save for {} failed after the entry moved on: {}",
                    inputs.date,
                    e
                ),
            }
            return Ok(Outcome::Stale);
        }

        match result {
            Ok(view) => {
                state.saved_points = Some(view.points_total);
                // Edits made while the save was in flight are still unsaved
                state.phase = if state.revision == revision {
                    EntryPhase::LoadedFilled
                } else {
                    EntryPhase::Dirty
                };
                log::info!("Saved {} ({} points)", inputs.date, view.points_total);
                Ok(Outcome::Applied(view.points_total))
            }
            Err(e) => {
                state.phase = EntryPhase::Dirty;
                log::warn!("Saving {} failed: {}", inputs.date, e);
                Err(e)
            }
        }
    }

    /// Clear all inputs locally; the saved points are left alone
    pub fn reset(&self) {
        self.edit(|inputs| *inputs = DailyInputs::empty(inputs.date));
    }

    pub fn increment_trash(&self) {
        self.edit(|inputs| inputs.trash_count = inputs.trash_count.saturating_add(1));
    }

    pub fn decrement_trash(&self) {
        self.edit(|inputs| inputs.trash_count = inputs.trash_count.saturating_sub(1));
    }

    pub fn increment_recycle(&self) {
        self.edit(|inputs| inputs.recycle_count = inputs.recycle_count.saturating_add(1));
    }

    pub fn decrement_recycle(&self) {
        self.edit(|inputs| inputs.recycle_count = inputs.recycle_count.saturating_sub(1));
    }

    pub fn set_trash_count(&self, count: u32) {
        self.edit(|inputs| inputs.trash_count = count);
    }

    pub fn set_recycle_count(&self, count: u32) {
        self.edit(|inputs| inputs.recycle_count = count);
    }

    /// Set the mileage; negative or non-finite values become 0
    pub fn set_miles(&self, miles: f64) {
        self.edit(|inputs| inputs.miles_driven = normalize_miles(miles));
    }

    /// Set the mileage from free text; anything unparsable becomes 0
    pub fn set_miles_text(&self, text: &str) {
        self.edit(|inputs| inputs.miles_driven = sanitize_miles(text));
    }

    pub fn set_reusable_bottle(&self, used: bool) {
        self.edit(|inputs| inputs.reusable_bottle = used);
    }

    pub fn set_reusable_bag(&self, used: bool) {
        self.edit(|inputs| inputs.reusable_bag = used);
    }

    /// One-line description of the day
    ///
    /// e.g. `2025-08-09: 3 trash, 5 recycled, 10.0 mi, bottle no, bag yes | 8 pts projected, 8 pts saved (saved)`
    pub fn summary(&self) -> String {
        let state = self.lock();
        let inputs = &state.inputs;
        let saved = state
            .saved_points
            .map(|points| format!("{} pts saved", points))
            .unwrap_or_else(|| "saved points unknown".to_string());

        format!(
            "{}: {} trash, {} recycled, {:.1} mi, bottle {}, bag {} | {} pts projected, {} ({})",
            state.date,
            inputs.trash_count,
            inputs.recycle_count,
            inputs.miles_driven,
            yes_no(inputs.reusable_bottle),
            yes_no(inputs.reusable_bag),
            score(inputs),
            saved,
            state.phase
        )
    }

    fn edit<F>(&self, apply: F)
    where
        F: FnOnce(&mut DailyInputs),
    {
        let mut state = self.lock();
        apply(&mut state.inputs);
        state.revision += 1;
        if matches!(
            state.phase,
            EntryPhase::LoadedEmpty | EntryPhase::LoadedFilled
        ) {
            state.phase = EntryPhase::Dirty;
        }
    }

    async fn fetch(&self, date: NaiveDate) -> Option<DailyEntryView> {
        let path = format!("/api/daily-entry/{}", date.format("%Y-%m-%d"));
        let response = match self
            .session
            .authenticated_request(Method::GET, &path, None)
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::debug!("No entry for {} (status {})", date, response.status());
                return None;
            }
            Err(e) => {
                log::debug!("Loading {} failed: {}", date, e);
                return None;
            }
        };

        match response.json::<DailyEntryView>().await {
            Ok(view) => Some(view),
            Err(e) => {
                log::debug!("Entry for {} was not understood: {}", date, e);
                None
            }
        }
    }

    async fn submit(&self, inputs: &DailyInputs) -> ClientResult<DailyEntryView> {
        let response = self
            .session
            .authenticated_request(Method::POST, "/api/daily-entry", Some(json!(inputs)))
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            let (status, detail) = failure_detail(response).await;
            return Err(ClientError::SaveFailed { status, detail });
        }

        Ok(response.json::<DailyEntryView>().await?)
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 9).unwrap()
    }

    fn offline_reconciler() -> DailyEntryReconciler {
        let session =
            SessionManager::new("http://127.0.0.1:9", Box::new(MemoryTokenStore::new())).unwrap();
        DailyEntryReconciler::new(Arc::new(session), day())
    }

    #[test]
    fn test_starts_unloaded_with_defaults() {
        let reconciler = offline_reconciler();

        assert_eq!(reconciler.phase(), EntryPhase::Unloaded);
        assert_eq!(reconciler.inputs(), DailyInputs::empty(day()));
        assert_eq!(reconciler.projected_points(), 0);
        assert_eq!(reconciler.saved_points(), None);
    }

    #[test]
    fn test_decrement_saturates() {
        let reconciler = offline_reconciler();

        reconciler.decrement_trash();
        reconciler.decrement_recycle();
        assert_eq!(reconciler.inputs().trash_count, 0);
        assert_eq!(reconciler.inputs().recycle_count, 0);

        reconciler.increment_trash();
        reconciler.decrement_trash();
        reconciler.decrement_trash();
        assert_eq!(reconciler.inputs().trash_count, 0);
    }

    #[test]
    fn test_projection_follows_edits() {
        let reconciler = offline_reconciler();

        for _ in 0..5 {
            reconciler.increment_recycle();
        }
        for _ in 0..3 {
            reconciler.increment_trash();
        }
        reconciler.set_miles_text("10");
        reconciler.set_reusable_bag(true);

        assert_eq!(reconciler.projected_points(), 8);

        reconciler.set_miles(-4.0);
        assert_eq!(reconciler.inputs().miles_driven, 0.0);
        reconciler.set_miles_text("lots");
        assert_eq!(reconciler.inputs().miles_driven, 0.0);
    }

    #[test]
    fn test_reset_is_local() {
        let reconciler = offline_reconciler();
        reconciler.set_recycle_count(7);
        reconciler.set_reusable_bottle(true);

        reconciler.reset();
        assert_eq!(reconciler.inputs(), DailyInputs::empty(day()));
        assert_eq!(reconciler.date(), day());
    }

    #[test]
    fn test_set_date_drops_edits() {
        let reconciler = offline_reconciler();
        reconciler.set_trash_count(4);

        let next = day().succ_opt().unwrap();
        reconciler.set_date(next);

        assert_eq!(reconciler.date(), next);
        assert_eq!(reconciler.inputs(), DailyInputs::empty(next));
        assert_eq!(reconciler.phase(), EntryPhase::Unloaded);
    }

    #[tokio::test]
    async fn test_load_without_session_stays_unloaded() {
        let reconciler = offline_reconciler();
        assert_eq!(
            reconciler.load().await,
            Outcome::Applied(EntryPhase::Unloaded)
        );
        assert_eq!(reconciler.phase(), EntryPhase::Unloaded);
    }

    #[tokio::test]
    async fn test_save_without_session_is_rejected_locally() {
        let reconciler = offline_reconciler();
        reconciler.increment_recycle();

        let result = reconciler.save().await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
        assert_eq!(reconciler.inputs().recycle_count, 1);
    }

    #[test]
    fn test_summary_mentions_unknown_saved_points() {
        let reconciler = offline_reconciler();
        reconciler.set_reusable_bag(true);

        let summary = reconciler.summary();
        assert!(summary.starts_with("2025-08-09:"));
        assert!(summary.contains("3 pts projected"));
        assert!(summary.contains("saved points unknown"));
    }
}
