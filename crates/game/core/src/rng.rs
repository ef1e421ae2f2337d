//! Deterministic randomness for seat permutation, role shuffles and policy noise.
//!
//! The generator is stateless: callers derive a fresh seed for every draw with
//! [`compute_seed`] and ask an [`RngOracle`] for a value. Nothing here reads the
//! clock or the OS entropy pool.
//!
//! # Determinism
//!
//! Every draw is a pure function of the session seed and the draw's
//! coordinates (nonce, player, context). Two sessions started from the same
//! seed deal the same roles to the same seats, and automated players make the
//! same choices, which is what replay tests and seeded hosts rely on.

/// Source of deterministic random numbers keyed by an explicit seed.
///
/// Implementations must return the same value for the same seed on every
/// platform.
pub trait RngOracle {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&self, seed: u64, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on empty range");
        (self.next_u32(seed) as usize) % len
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
///
/// Used one step at a time: the seed is the state, so a draw costs one
/// multiply-add and one permutation.
///
/// # Properties
///
/// - Same seed, same output, on every target.
/// - No state to share between sessions, so it is `Copy` and zero-sized.
/// - Statistical quality is far beyond what seat shuffles and tie-breaking
///   noise need.
///
/// See <https://www.pcg-random.org/> for the family.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// LCG multiplier from the reference 64-bit PCG.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// LCG increment from the reference 64-bit PCG. Must be odd.
    const INCREMENT: u64 = 1442695040888963407;

    /// One LCG step: `state * MULTIPLIER + INCREMENT (mod 2^64)`.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// Xorshift the high bits down, then rotate by the top five bits.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the session seed with a nonce, a participant and a draw context.
///
/// # Arguments
///
/// * `game_seed` - Seed the session was started with
/// * `nonce` - Separates unrelated uses of the same seed (role deal, seat
///   permutation, a day's policy noise)
/// * `actor_id` - Player the draw is for, or a shuffle position
/// * `context` - Distinguishes several draws one decision needs, such as
///   one score per candidate
pub fn compute_seed(game_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // SplitMix-style avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Fisher-Yates shuffle driven by [`compute_seed`].
///
/// `salt` separates independent shuffles performed from the same seed.
pub fn shuffle<T, R>(rng: &R, game_seed: u64, salt: u64, items: &mut [T])
where
    R: RngOracle + ?Sized,
{
    for i in (1..items.len()).rev() {
        let seed = compute_seed(game_seed, salt, i as u32, 0);
        let j = rng.pick_index(seed, i + 1);
        items.swap(i, j);
    }
}
