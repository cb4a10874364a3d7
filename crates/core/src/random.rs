//! Deterministic randomness for the pipeline: a stateless positional-hash
//! noise engine and a stateful stream generator, both bit-exact functions of
//! a 64-bit seed.

mod mix;
pub mod noise;
pub mod stream;

pub use noise::Noise;
pub use stream::Stream;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandomError {
    #[error("malformed range: min {min} exceeds max {max}")]
    EmptyRange { min: i64, max: i64 },
}

/// Maps one raw 64-bit draw onto the inclusive range `[min, max]` by modulo.
/// `min == max` returns the bound; `min > max` is a domain error. Exactly one
/// raw draw backs every derived value, degenerate ranges included.
pub(crate) fn map_to_range(raw: u64, min: i64, max: i64) -> Result<i64, RandomError> {
    if min > max {
        return Err(RandomError::EmptyRange { min, max });
    }
    let width = (i128::from(max) - i128::from(min) + 1) as u128;
    let offset = (u128::from(raw) % width) as i128;
    Ok((i128::from(min) + offset) as i64)
}

/// Maps one raw 64-bit draw onto `[0, 1)` using the 53 mantissa bits of an
/// `f64`. A plain division by 2^64 can round up to 1.0; this cannot.
pub(crate) fn map_to_unit(raw: u64) -> f64 {
    (raw >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
}
