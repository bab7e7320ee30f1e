//! Deterministic seeded RNG for the reward path.
//!
//! Every draw that decides a reward comes from a stream derived purely from
//! a string seed key: the same user performing the same action on the same
//! day reproduces the same outcome on any machine. Wall-clock or OS entropy
//! never feeds this path.
//!
//! Seed keys compose the action kind, the calendar-day key, the user id and
//! (for box opens) the per-user per-box open counter, so repeated opens of
//! the same box on the same day still diverge.

use rand::{Error as RandError, RngCore};

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Mix a seed key down to the 32-bit generator seed (FNV-1a).
#[must_use]
pub fn mix_seed(key: &str) -> u32 {
    let mut hash = FNV_OFFSET;
    for b in key.as_bytes() {
        hash = (hash ^ u32::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Seed key for a daily claim: one stream per user per calendar day.
#[must_use]
pub fn daily_seed_key(day_key: &str, user_id: &str) -> String {
    format!("daily:{day_key}:{user_id}")
}

/// Seed key for a box open. `open_count` is the number of times this user
/// has already opened this box, so same-day repeat opens get fresh streams.
#[must_use]
pub fn box_seed_key(box_id: &str, day_key: &str, user_id: &str, open_count: u64) -> String {
    format!("box:{box_id}:{day_key}:{user_id}:{open_count}")
}

/// Counter-based 32-bit generator (mulberry32). Cheap, stateless beyond one
/// word, and stable forever; restartable only by re-deriving from the same
/// seed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootRng {
    state: u32,
}

impl LootRng {
    #[must_use]
    pub const fn from_seed(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Derive a stream from a seed key string.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::from_seed(mix_seed(key))
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut z = self.state;
        z = (z ^ (z >> 15)).wrapping_mul(z | 1);
        z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(z | 61));
        z ^ (z >> 14)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.step()) / (f64::from(u32::MAX) + 1.0)
    }
}

impl RngCore for LootRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.step());
        let hi = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.step().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn identical_keys_produce_identical_streams() {
        let mut a = LootRng::from_key("daily:2024-05-01:user-1");
        let mut b = LootRng::from_key("daily:2024-05-01:user-1");
        for _ in 0..256 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn divergent_keys_diverge() {
        let mut a = LootRng::from_key(&box_seed_key("epic", "2024-05-01", "user-1", 0));
        let mut b = LootRng::from_key(&box_seed_key("epic", "2024-05-01", "user-1", 1));
        let first_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let first_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(first_a, first_b);
    }

    #[test]
    fn mix_seed_is_stable() {
        // Pinned so a refactor cannot silently change every user's rewards.
        assert_eq!(mix_seed(""), 0x811c_9dc5);
        assert_eq!(mix_seed("a"), (0x811c_9dc5u32 ^ 0x61).wrapping_mul(0x0100_0193));
        assert_ne!(mix_seed("user-1"), mix_seed("user-2"));
        assert_eq!(mix_seed("daily:2024-05-01:u"), mix_seed("daily:2024-05-01:u"));
    }

    #[test]
    fn unit_draws_stay_in_range() {
        let mut rng = LootRng::from_key("range-check");
        for _ in 0..10_000 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn plugs_into_rand_trait_plumbing() {
        let mut rng = LootRng::from_key("rand-trait");
        let roll = rng.gen_range(0..10);
        assert!(roll < 10);
        let f: f64 = rng.r#gen();
        assert!((0.0..1.0).contains(&f));
    }
}
