//! In-memory streak tracker.

use super::models::{StreakRecord, StreakSnapshot};
use crate::auth::UserId;
use chrono::NaiveDate;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Streak tracker keyed by user
#[derive(Clone)]
pub struct StreakTracker {
    goal_points: u32,
    records: Arc<RwLock<HashMap<UserId, StreakRecord>>>,
}

impl StreakTracker {
    /// Create a tracker where a day qualifies at `goal_points`
    pub fn new(goal_points: u32) -> Self {
        Self {
            goal_points,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Points a day needs to qualify
    pub fn goal_points(&self) -> u32 {
        self.goal_points
    }

    /// Record a saved day's points for a user
    pub async fn record(&self, user_id: UserId, date: NaiveDate, points: u32) -> StreakSnapshot {
        let mut records = self.records.write().await;
        let record = records.entry(user_id).or_default();
        let before = record.current;
        record.apply(date, points, self.goal_points);

        if record.current != before {
            log::debug!(
                "Streak for user {} moved from {} to {} ({} on {})",
                user_id,
                before,
                record.current,
                points,
                date
            );
        }

        record.snapshot(self.goal_points)
    }

    /// Current snapshot for a user; users without any history read as zeros
    pub async fn snapshot(&self, user_id: UserId) -> StreakSnapshot {
        self.records
            .read()
            .await
            .get(&user_id)
            .map(|record| record.snapshot(self.goal_points))
            .unwrap_or_else(|| StreakSnapshot {
                goal: Some(self.goal_points),
                ..StreakSnapshot::default()
            })
    }

    /// Forget a user's streak
    pub async fn remove(&self, user_id: UserId) {
        self.records.write().await.remove(&user_id);
    }
}
