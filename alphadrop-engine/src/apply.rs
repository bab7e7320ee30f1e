//! Translates a resolved loot outcome into profile mutations and events.
//!
//! Application is the only place rewards touch the profile, so every
//! invariant about fragments, history bounds and boost stacking is enforced
//! here, inside the same transaction as the grant.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use smallvec::{SmallVec, smallvec};

use crate::catalog;
use crate::loot::{LootOutcome, Rarity, outcome_rarity};
use crate::profile::{CollectibleItem, RewardEvent, RewardProfile, RewardSource};

/// Bounded reward history length (newest first).
pub const HISTORY_CAP: usize = 50;

/// Complete fragment sets of this size convert into one raffle ticket.
pub const FRAGMENTS_PER_TICKET: u32 = 10;

/// Double-points boost duration.
pub const BOOST_HOURS: i64 = 24;

/// Events produced by one application: the primary event, plus ticket
/// unlocks when a fragment grant overflows.
pub type EventBurst = SmallVec<[RewardEvent; 2]>;

/// Per-transaction context for reward application. `txn_key` is the seed
/// key of the operation, which is unique per transaction and keeps event
/// ids reproducible.
pub struct ApplyContext<'a, R: Rng> {
    pub now: DateTime<Utc>,
    pub source: RewardSource,
    pub box_id: Option<&'a str>,
    pub txn_key: &'a str,
    pub rng: &'a mut R,
    emitted: u32,
}

impl<'a, R: Rng> ApplyContext<'a, R> {
    pub fn new(
        now: DateTime<Utc>,
        source: RewardSource,
        box_id: Option<&'a str>,
        txn_key: &'a str,
        rng: &'a mut R,
    ) -> Self {
        Self {
            now,
            source,
            box_id,
            txn_key,
            rng,
            emitted: 0,
        }
    }

    fn next_event_id(&mut self) -> String {
        let id = format!("{}#{}", self.txn_key, self.emitted);
        self.emitted += 1;
        id
    }

    fn event(&mut self, label: String, rarity: Rarity) -> RewardEvent {
        RewardEvent {
            id: self.next_event_id(),
            at: self.now,
            source: self.source,
            label,
            rarity,
            points: None,
            fragments: None,
            collectible_id: None,
        }
    }
}

/// Credit a point grant, doubled while a boost is running. Counts toward
/// the season total as well.
pub fn grant_points(profile: &mut RewardProfile, base: u64, now: DateTime<Utc>) -> u64 {
    let granted = if profile.boost_active(now) { base * 2 } else { base };
    profile.points += granted;
    profile.season_points_earned += granted;
    granted
}

fn push_event(profile: &mut RewardProfile, event: &RewardEvent) {
    profile.history.insert(0, event.clone());
    profile.history.truncate(HISTORY_CAP);
}

/// Apply a resolved outcome to the profile. Exactly one primary event is
/// recorded per outcome; fragment overflow appends one ticket event per
/// complete set, in the same transaction.
pub fn apply_outcome<R: Rng>(
    profile: &mut RewardProfile,
    outcome: LootOutcome,
    ctx: &mut ApplyContext<'_, R>,
) -> EventBurst {
    let rarity = outcome_rarity(outcome);
    let events: EventBurst = match outcome {
        LootOutcome::Points { amount } => {
            let granted = grant_points(profile, amount, ctx.now);
            let mut event = ctx.event(format!("+{granted} Alpha Points"), rarity);
            event.points = Some(granted);
            smallvec![event]
        }
        LootOutcome::Boost => {
            profile.active_boost_until = Some(ctx.now + Duration::hours(BOOST_HOURS));
            smallvec![ctx.event("2x point boost (24h)".to_string(), rarity)]
        }
        LootOutcome::StreakFreeze => {
            profile.streak_freeze_count += 1;
            smallvec![ctx.event("Streak freeze token".to_string(), rarity)]
        }
        LootOutcome::Fragments { count } => {
            let mut event = ctx.event(
                format!(
                    "+{count} ticket fragment{}",
                    if count == 1 { "" } else { "s" }
                ),
                rarity,
            );
            event.fragments = Some(count);
            let mut events: EventBurst = smallvec![event];

            profile.ticket_fragments += count;
            let tickets = profile.ticket_fragments / FRAGMENTS_PER_TICKET;
            profile.ticket_fragments %= FRAGMENTS_PER_TICKET;
            for _ in 0..tickets {
                events.push(ctx.event("Raffle ticket unlocked".to_string(), Rarity::Epic));
            }
            events
        }
        LootOutcome::Collectible { rarity } => {
            let variant = catalog::pick_variant(&mut *ctx.rng, rarity);
            let item = CollectibleItem {
                id: format!("{}-{}", variant.id, profile.collectibles.len() + 1),
                name: variant.name.to_string(),
                desc: variant.desc.to_string(),
                rarity,
                image: variant.image.to_string(),
                acquired_at: ctx.now,
                box_id: ctx.box_id.unwrap_or("daily").to_string(),
            };
            let mut event = ctx.event(variant.name.to_string(), rarity);
            event.collectible_id = Some(item.id.clone());
            profile.collectibles.push(item);
            smallvec![event]
        }
    };

    for event in &events {
        push_event(profile, event);
    }
    // Keep derived reputation in sync with whatever the grant did.
    profile.recompute_reputation();
    events
}
