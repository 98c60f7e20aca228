//! Streak data models.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Points a day needs to count towards a streak
pub const DEFAULT_GOAL_POINTS: u32 = 10;

/// Read-only streak statistics for one user.
///
/// Missing `current`/`longest` fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSnapshot {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub longest: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
}

/// Mutable streak state kept by the backend for one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakRecord {
    pub current: u32,
    pub longest: u32,
    pub last_qualifying_date: Option<NaiveDate>,
}

impl StreakRecord {
    /// Fold a saved day's points into the streak.
    ///
    /// Qualifying days extend the streak when they directly follow the last
    /// qualifying day and restart it at 1 otherwise; saving the same
    /// qualifying day again changes nothing. A non-qualifying day resets the
    /// current streak unless it predates the last qualifying day.
    pub fn apply(&mut self, date: NaiveDate, points: u32, goal: u32) {
        if points >= goal {
            match self.last_qualifying_date {
                Some(last) if last.checked_add_days(Days::new(1)) == Some(date) => {
                    self.current += 1;
                }
                Some(last) if last == date => {}
                _ => self.current = 1,
            }
            self.last_qualifying_date = Some(date);
            self.longest = self.longest.max(self.current);
        } else if self.last_qualifying_date.is_none_or(|last| date > last) {
            self.current = 0;
        }
    }

    /// Snapshot for clients
    pub fn snapshot(&self, goal: u32) -> StreakSnapshot {
        StreakSnapshot {
            current: self.current,
            longest: self.longest,
            goal: Some(goal),
            last_date: self.last_qualifying_date,
        }
    }
}
