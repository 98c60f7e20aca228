//! Daily entry API handlers.
//!
//! - `GET /api/daily-entry/{date}` returns the saved entry for a date, with
//!   `raw: null` when nothing was saved
//! - `POST /api/daily-entry` replaces the entry for the payload's date and
//!   returns the stored inputs with their authoritative `pointsTotal`

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use greenify::{
    DailyEntryView, DailyInputs,
    auth::UserId,
    entry::{EntryError, parse_date},
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::metrics;

/// Body of a save request; the date arrives as `YYYY-MM-DD` text
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntryPayload {
    pub date: String,
    #[serde(default)]
    pub trash_count: u32,
    #[serde(default)]
    pub recycle_count: u32,
    #[serde(default)]
    pub miles_driven: f64,
    #[serde(default)]
    pub reusable_bottle: bool,
    #[serde(default)]
    pub reusable_bag: bool,
}

impl TryFrom<SaveEntryPayload> for DailyInputs {
    type Error = EntryError;

    fn try_from(payload: SaveEntryPayload) -> Result<Self, Self::Error> {
        Ok(DailyInputs {
            date: parse_date(&payload.date)?,
            trash_count: payload.trash_count,
            recycle_count: payload.recycle_count,
            miles_driven: payload.miles_driven,
            reusable_bottle: payload.reusable_bottle,
            reusable_bag: payload.reusable_bag,
        })
    }
}

fn entry_error(e: EntryError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.client_message())
}

/// Saved entry for one date.
///
/// # Errors
///
/// - `400 Bad Request`: Date is not `YYYY-MM-DD`
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(date): Path<String>,
) -> Result<Json<DailyEntryView>, ApiError> {
    let date = parse_date(&date).map_err(entry_error)?;
    Ok(Json(state.entry_manager.get_for_date(user_id, date).await))
}

/// Save (full replace) the entry for the payload's date.
///
/// # Errors
///
/// - `400 Bad Request`: Bad date, or negative / non-finite mileage
pub async fn save_entry(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<SaveEntryPayload>,
) -> Result<Json<DailyEntryView>, ApiError> {
    let inputs = DailyInputs::try_from(payload).map_err(entry_error)?;
    let view = state
        .entry_manager
        .upsert(user_id, inputs)
        .await
        .map_err(entry_error)?;

    metrics::entry_saved(view.points_total);
    Ok(Json(view))
}
