//! Positional hash noise: pure, order-independent randomness keyed by
//! (seed, position). Re-querying a cell during backtracking yields the same
//! value without remembering past draws, and queries are safe to issue from
//! any thread in any order.

use super::mix::splitmix64;
use super::{RandomError, map_to_range, map_to_unit};

const LANE_A_MUL: u64 = 0xD6E8_FD9A_5B89_7A4D;
const LANE_B_MUL: u64 = 0x9FB2_1C65_1E98_DF25;
const ROUND_A_MUL: u64 = 0xFF51_AFD7_ED55_8CCD;
const ROUND_B_MUL: u64 = 0xC4CE_B9FE_1A85_EC53;

/// Stateless noise engine. Copyable and shareable: no query advances any
/// internal state.
#[derive(Clone, Copy, Debug)]
pub struct Noise {
    lane_a: u64,
    lane_b: u64,
}

impl Noise {
    pub fn new(seed: u64) -> Self {
        let mut expander = seed;
        Self { lane_a: splitmix64(&mut expander), lane_b: splitmix64(&mut expander) }
    }

    /// Hash of a single 64-bit position.
    pub fn value(&self, position: u64) -> u64 {
        self.value_2d(position, 0)
    }

    /// Hash of a 2D position: two interleaved 64-bit lanes stirred by
    /// rotate-multiply-xor rounds, folded and finished with an avalanche mix.
    pub fn value_2d(&self, x: u64, y: u64) -> u64 {
        let mut a = self.lane_a ^ x.wrapping_mul(LANE_A_MUL);
        let mut b = self.lane_b ^ y.wrapping_mul(LANE_B_MUL);

        a = (a ^ b.rotate_left(23)).wrapping_mul(ROUND_A_MUL);
        b = (b ^ a.rotate_left(41)).wrapping_mul(ROUND_B_MUL);
        a = (a ^ b.rotate_left(29)).wrapping_mul(ROUND_A_MUL);
        b = (b ^ a.rotate_left(13)).wrapping_mul(ROUND_B_MUL);

        avalanche(a ^ b)
    }

    pub fn int(&self, position: u64) -> i64 {
        self.value(position) as i64
    }

    /// Uniform value in the inclusive range `[min, max]` keyed by position.
    pub fn int_in(&self, position: u64, min: i64, max: i64) -> Result<i64, RandomError> {
        map_to_range(self.value(position), min, max)
    }

    /// Position-keyed value in `[0, 1)`.
    pub fn f64_in(&self, position: u64) -> f64 {
        map_to_unit(self.value(position))
    }
}

fn avalanche(mut value: u64) -> u64 {
    value ^= value >> 33;
    value = value.wrapping_mul(ROUND_A_MUL);
    value ^= value >> 33;
    value = value.wrapping_mul(ROUND_B_MUL);
    value ^ (value >> 33)
}
