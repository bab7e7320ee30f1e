//! Calendar keys and season rollover.
//!
//! Seasons are scoped to a calendar month; the season key is the `YYYY-MM`
//! rendering of the current date. Rolling the season zeroes the
//! season-scoped point counter in the same step that rewrites the key, so a
//! partially rolled profile can never be observed.

use chrono::{Datelike, NaiveDate};

use crate::profile::RewardProfile;

/// Calendar-day key used for streak anchoring and seed composition.
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Season key at year + month granularity.
#[must_use]
pub fn season_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Roll the profile into the season containing `today` if it is not already
/// there. Returns whether a rollover happened; the key update and the
/// season-counter reset are a single step.
pub fn roll_season(profile: &mut RewardProfile, today: NaiveDate) -> bool {
    let current = season_key(today);
    if profile.season_id == current {
        return false;
    }
    log::debug!(
        "season rollover {} -> {current} (dropping {} season points)",
        profile.season_id,
        profile.season_points_earned
    );
    profile.season_id = current;
    profile.season_points_earned = 0;
    true
}
