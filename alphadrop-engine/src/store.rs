//! Versioned profile storage.
//!
//! Each profile is owned by exactly one user id and every mutating
//! operation is a read-modify-write transaction: `load` hands out the
//! record with its version, `commit` applies a compare-and-swap on that
//! version. Two racing writers for the same user cannot both succeed;
//! different users never contend.
//!
//! A malformed persisted record is never an error: the store logs it and
//! degrades to a freshly defaulted profile at the stored version, so the
//! next commit simply overwrites the corrupt bytes.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::profile::{RewardProfile, migrate_profile_value};

/// Errors raised by a profile store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed between load and commit; the caller's snapshot is
    /// stale and none of its effects were applied.
    #[error("write conflict for user {user_id}: expected version {expected}, found {found}")]
    VersionConflict {
        user_id: String,
        expected: u64,
        found: u64,
    },
    /// Backend I/O or serialization failure.
    #[error("profile storage failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// A loaded profile together with the version its transaction must commit
/// against.
#[derive(Debug, Clone)]
pub struct VersionedProfile {
    pub profile: RewardProfile,
    pub version: u64,
}

/// Storage abstraction for reward profiles. Platform implementations
/// (database row, browser storage, flat file) provide this.
pub trait ProfileStore {
    /// Load the profile for a user, creating a defaulted one on first
    /// access. Malformed content degrades to defaults instead of failing;
    /// migration has already been applied to whatever is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only for backend failures, never for content.
    fn load(&self, user_id: &str, current_season: &str) -> Result<VersionedProfile, StoreError>;

    /// Persist the profile if the stored version still equals
    /// `expected_version`; returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] when the record moved, or a
    /// backend error.
    fn commit(
        &self,
        user_id: &str,
        profile: &RewardProfile,
        expected_version: u64,
    ) -> Result<u64, StoreError>;
}

/// Parse, migrate and deserialize raw profile JSON; any corruption yields a
/// defaulted profile and a warning.
pub(crate) fn decode_profile(user_id: &str, raw: &str, current_season: &str) -> RewardProfile {
    let mut doc: Value = match serde_json::from_str(raw) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("corrupt profile record for {user_id}, substituting defaults: {err}");
            return RewardProfile::new(current_season);
        }
    };
    if migrate_profile_value(&mut doc, current_season) {
        log::debug!("migrated legacy profile fields for {user_id}");
    }
    match serde_json::from_value(doc) {
        Ok(profile) => profile,
        Err(err) => {
            log::warn!("unreadable profile shape for {user_id}, substituting defaults: {err}");
            RewardProfile::new(current_season)
        }
    }
}

/// In-memory store used by tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: Mutex<HashMap<String, (u64, String)>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record, bypassing the engine (test fixtures, imports).
    pub fn put_raw(&self, user_id: &str, raw: &str) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let version = records.get(user_id).map_or(0, |(v, _)| *v);
        records.insert(user_id.to_string(), (version + 1, raw.to_string()));
    }

    /// Raw persisted JSON for a user, if any.
    #[must_use]
    pub fn raw(&self, user_id: &str) -> Option<String> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(user_id).map(|(_, raw)| raw.clone())
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, user_id: &str, current_season: &str) -> Result<VersionedProfile, StoreError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let loaded = match records.get(user_id) {
            Some((version, raw)) => VersionedProfile {
                profile: decode_profile(user_id, raw, current_season),
                version: *version,
            },
            None => VersionedProfile {
                profile: RewardProfile::new(current_season),
                version: 0,
            },
        };
        Ok(loaded)
    }

    fn commit(
        &self,
        user_id: &str,
        profile: &RewardProfile,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let raw = serde_json::to_string(profile).map_err(anyhow::Error::from)?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let found = records.get(user_id).map_or(0, |(v, _)| *v);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                user_id: user_id.to_string(),
                expected: expected_version,
                found,
            });
        }
        let next = found + 1;
        records.insert(user_id.to_string(), (next, raw));
        Ok(next)
    }
}
