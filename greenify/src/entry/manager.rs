//! In-memory daily entry manager.

use super::{
    errors::EntryResult,
    models::{DailyEntryView, DailyInputs},
};
use crate::{
    auth::UserId,
    scoring::score,
    streak::{StreakSnapshot, StreakTracker},
};
use chrono::NaiveDate;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// A saved entry together with the points it was worth when saved
#[derive(Debug, Clone)]
struct StoredEntry {
    inputs: DailyInputs,
    points_total: u32,
}

impl StoredEntry {
    fn view(&self) -> DailyEntryView {
        DailyEntryView {
            date: Some(self.inputs.date),
            points_total: self.points_total,
            raw: Some(self.inputs.clone()),
        }
    }
}

/// Daily entry manager
#[derive(Clone)]
pub struct EntryManager {
    entries: Arc<RwLock<HashMap<(UserId, NaiveDate), StoredEntry>>>,
    streaks: StreakTracker,
}

impl EntryManager {
    /// Create a new entry manager
    ///
    /// # Arguments
    ///
    /// * `goal_points` - Points a day needs to count towards a streak
    pub fn new(goal_points: u32) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            streaks: StreakTracker::new(goal_points),
        }
    }

    /// Save a user's inputs for their date, replacing any earlier save
    ///
    /// # Returns
    ///
    /// * `EntryResult<DailyEntryView>` - The stored inputs and their points
    ///
    /// # Errors
    ///
    /// * `EntryError::InvalidMiles` - Mileage is negative or not finite
    pub async fn upsert(&self, user_id: UserId, inputs: DailyInputs) -> EntryResult<DailyEntryView> {
        inputs.validate()?;

        let date = inputs.date;
        let stored = StoredEntry {
            points_total: score(&inputs),
            inputs,
        };
        let view = stored.view();

        let replaced = self
            .entries
            .write()
            .await
            .insert((user_id, date), stored)
            .is_some();

        log::info!(
            "{} entry for user {} on {} ({} points)",
            if replaced { "Replaced" } else { "Saved" },
            user_id,
            date,
            view.points_total
        );

        self.streaks.record(user_id, date, view.points_total).await;

        Ok(view)
    }

    /// Get a user's entry for a date
    ///
    /// Dates without a saved entry produce a view with no `raw` inputs.
    pub async fn get_for_date(&self, user_id: UserId, date: NaiveDate) -> DailyEntryView {
        self.entries
            .read()
            .await
            .get(&(user_id, date))
            .map(StoredEntry::view)
            .unwrap_or_else(|| DailyEntryView::unsaved(date))
    }

    /// Streak statistics for a user
    pub async fn streak(&self, user_id: UserId) -> StreakSnapshot {
        self.streaks.snapshot(user_id).await
    }

    /// Drop every entry and the streak belonging to a user
    pub async fn remove_user(&self, user_id: UserId) {
        self.entries
            .write()
            .await
            .retain(|(owner, _), _| *owner != user_id);
        self.streaks.remove(user_id).await;
    }
}
