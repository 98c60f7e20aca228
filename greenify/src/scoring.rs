//! Point scoring for a day's habit inputs.
//!
//! Both the backend (authoritative `pointsTotal`) and the client (live
//! projection while the user is still editing) call [`score`], so the two can
//! never disagree about what a set of inputs is worth.

use crate::entry::DailyInputs;

/// Points earned per recycling event.
pub const POINTS_PER_RECYCLE: i64 = 2;

/// Points lost per trash disposal.
pub const POINTS_PER_TRASH: i64 = 1;

/// Penalty factor applied to miles driven before rounding.
pub const MILEAGE_PENALTY_FACTOR: f64 = 0.2;

/// Bonus for using a reusable bag.
pub const REUSABLE_BAG_BONUS: i64 = 3;

/// Bonus for using a reusable bottle.
pub const REUSABLE_BOTTLE_BONUS: i64 = 3;

/// Compute the point value of a day's inputs.
///
/// ```text
/// points = recycle * 2 - trash - round(miles * 0.2) + 3 * bag + 3 * bottle
/// ```
///
/// The result is clamped at zero. Mileage that is negative or not finite
/// counts as zero miles.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use greenify::entry::DailyInputs;
/// use greenify::scoring::score;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// let inputs = DailyInputs {
///     trash_count: 3,
///     recycle_count: 5,
///     miles_driven: 10.0,
///     reusable_bag: true,
///     ..DailyInputs::empty(date)
/// };
/// assert_eq!(score(&inputs), 8);
/// ```
pub fn score(inputs: &DailyInputs) -> u32 {
    let mut points: i64 = 0;
    points += i64::from(inputs.recycle_count) * POINTS_PER_RECYCLE;
    points -= i64::from(inputs.trash_count) * POINTS_PER_TRASH;
    points -= mileage_penalty(inputs.miles_driven);
    if inputs.reusable_bag {
        points += REUSABLE_BAG_BONUS;
    }
    if inputs.reusable_bottle {
        points += REUSABLE_BOTTLE_BONUS;
    }

    u32::try_from(points.max(0)).unwrap_or(u32::MAX)
}

/// Whole points deducted for driving `miles`.
///
/// Rounds half away from zero, which for the non-negative mileage accepted
/// here is the same as rounding half up.
pub fn mileage_penalty(miles: f64) -> i64 {
    let miles = normalize_miles(miles);
    // Saturating float-to-int cast.
    (miles * MILEAGE_PENALTY_FACTOR).round() as i64
}

/// Replace negative or non-finite mileage with zero.
pub fn normalize_miles(miles: f64) -> f64 {
    if miles.is_finite() && miles > 0.0 {
        miles
    } else {
        0.0
    }
}

/// Parse free-text mileage as typed by a user.
///
/// Empty, non-numeric, non-finite and negative input all become `0.0`.
pub fn sanitize_miles(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .map(normalize_miles)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn inputs(trash: u32, recycle: u32, miles: f64, bag: bool, bottle: bool) -> DailyInputs {
        DailyInputs {
            date: day(),
            trash_count: trash,
            recycle_count: recycle,
            miles_driven: miles,
            reusable_bottle: bottle,
            reusable_bag: bag,
        }
    }

    #[test]
    fn test_mixed_day() {
        assert_eq!(score(&inputs(3, 5, 10.0, true, false)), 8);
    }

    #[test]
    fn test_empty_day_scores_zero() {
        assert_eq!(score(&DailyInputs::empty(day())), 0);
    }

    #[test]
    fn test_heavy_driving_clamps_to_zero() {
        assert_eq!(score(&inputs(0, 0, 100.0, false, false)), 0);
    }

    #[test]
    fn test_both_reusables() {
        assert_eq!(score(&inputs(0, 0, 0.0, true, true)), 6);
    }

    #[test]
    fn test_penalty_rounds_half_up() {
        // 2.5 * 0.2 = 0.5
        assert_eq!(mileage_penalty(2.5), 1);
        // 12.5 * 0.2 = 2.5
        assert_eq!(mileage_penalty(12.5), 3);
        assert_eq!(mileage_penalty(2.4), 0);
        assert_eq!(mileage_penalty(7.4), 1);
    }

    #[test]
    fn test_invalid_miles_count_as_zero() {
        assert_eq!(mileage_penalty(-40.0), 0);
        assert_eq!(mileage_penalty(f64::NAN), 0);
        assert_eq!(mileage_penalty(f64::INFINITY), 0);
        assert_eq!(score(&inputs(0, 2, f64::NAN, false, false)), 4);
    }

    #[test]
    fn test_sanitize_miles() {
        assert_eq!(sanitize_miles("12.5"), 12.5);
        assert_eq!(sanitize_miles("  7 "), 7.0);
        assert_eq!(sanitize_miles(""), 0.0);
        assert_eq!(sanitize_miles("abc"), 0.0);
        assert_eq!(sanitize_miles("-3"), 0.0);
        assert_eq!(sanitize_miles("inf"), 0.0);
        assert_eq!(sanitize_miles("NaN"), 0.0);
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        assert_eq!(
            score(&inputs(0, u32::MAX, 0.0, true, true)),
            u32::MAX
        );
        assert_eq!(score(&inputs(u32::MAX, 0, 0.0, true, true)), 0);
    }
}
