//! Hierarchical step priorities: variable-length integer tuples compared
//! lexicographically with trailing-zero padding, plus an `INVALID` sentinel
//! that participates in equality but never in ordering.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriorityError {
    #[error("level index {index} is outside the stored bounds (length {stored})")]
    OutOfRange { index: usize, stored: usize },
}

/// An immutable ordering key made of signed integer levels.
///
/// Trailing zero levels are insignificant: `Priority::new(&[2, 1])` equals
/// `Priority::new(&[2, 1, 0])`. The value built from an empty slice is the
/// canonical invalid priority, which equals only itself and is unordered
/// against everything (all of `<`, `>`, `<=`, `>=` evaluate false).
#[derive(Clone, Debug)]
pub struct Priority {
    // `None` marks the invalid sentinel; `Some` always holds >= 1 level.
    levels: Option<Box<[i32]>>,
}

impl Priority {
    pub const INVALID: Self = Self { levels: None };

    pub fn new(levels: &[i32]) -> Self {
        if levels.is_empty() {
            Self::INVALID
        } else {
            Self { levels: Some(levels.into()) }
        }
    }

    pub fn single(level: i32) -> Self {
        Self::new(&[level])
    }

    pub fn is_invalid(&self) -> bool {
        self.levels.is_none()
    }

    /// Trimmed length: one past the last non-zero level, at least 1 for any
    /// valid priority. The invalid sentinel reports 0.
    pub fn len(&self) -> usize {
        match &self.levels {
            None => 0,
            Some(levels) => levels.iter().rposition(|&level| level != 0).map_or(1, |i| i + 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_none()
    }

    /// Level value at `index`, bounded by the stored (untrimmed) sequence.
    /// Reads between the trimmed and stored lengths return the stored zeros.
    pub fn level(&self, index: usize) -> Result<i32, PriorityError> {
        let stored = self.levels.as_deref().unwrap_or(&[]);
        stored
            .get(index)
            .copied()
            .ok_or(PriorityError::OutOfRange { index, stored: stored.len() })
    }

    fn trimmed(&self) -> &[i32] {
        match &self.levels {
            None => &[],
            Some(levels) => &levels[..self.len()],
        }
    }

    /// Total comparison over valid priorities, used by the step collection
    /// once invalid keys have been rejected at insertion.
    pub(crate) fn cmp_valid(&self, other: &Self) -> Ordering {
        debug_assert!(!self.is_invalid() && !other.is_invalid());
        lexicographic(self.trimmed(), other.trimmed())
    }
}

/// Lexicographic order with the shorter operand padded by trailing zeros.
fn lexicographic(a: &[i32], b: &[i32]) -> Ordering {
    let longest = a.len().max(b.len());
    for index in 0..longest {
        let left = a.get(index).copied().unwrap_or(0);
        let right = b.get(index).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        match (&self.levels, &other.levels) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => false,
            (Some(_), Some(_)) => self.trimmed() == other.trimmed(),
        }
    }
}

impl Eq for Priority {}

// A derived impl would hash the stored levels and split equal values like
// `[1]` and `[1, 0]`; hashing must follow the trimmed view instead.
impl Hash for Priority {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.levels {
            None => state.write_u8(0),
            Some(_) => {
                state.write_u8(1);
                self.trimmed().hash(state);
            }
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.levels, &other.levels) {
            (None, None) => Some(Ordering::Equal),
            (None, Some(_)) | (Some(_), None) => None,
            (Some(_), Some(_)) => Some(lexicographic(self.trimmed(), other.trimmed())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trailing_zeros_do_not_affect_equality() {
        assert_eq!(Priority::new(&[0]), Priority::new(&[0, 0]));
        assert_eq!(Priority::new(&[2, 1, 0]), Priority::new(&[2, 1]));
        assert_ne!(Priority::new(&[2, 1]), Priority::new(&[2, 1, 1]));
    }

    #[test]
    fn zero_priority_is_valid_and_distinct_from_invalid() {
        let zero = Priority::new(&[0, 0, 0]);
        assert!(!zero.is_invalid());
        assert_eq!(zero.len(), 1);
        assert_ne!(zero, Priority::INVALID);
    }

    #[test]
    fn comparison_pads_the_shorter_operand_with_zeros() {
        assert!(Priority::new(&[1, 0, 1]) > Priority::new(&[1, 0, 0, 1]));
        assert!(Priority::new(&[1, 0, 0, 1]) < Priority::new(&[1, 0, 1]));
        assert!(Priority::single(-4) < Priority::single(-2));
        assert!(Priority::single(-2) < Priority::single(0));
        assert!(Priority::new(&[1]) < Priority::new(&[1, 1]));
    }

    #[test]
    fn invalid_values_are_mutually_equal() {
        assert_eq!(Priority::new(&[]), Priority::INVALID);
        assert_eq!(Priority::INVALID, Priority::INVALID);
        assert_eq!(Priority::new(&[]).len(), 0);
    }

    #[test]
    fn invalid_is_unordered_against_valid_priorities() {
        let zero = Priority::single(0);
        assert!(!(Priority::INVALID < zero));
        assert!(!(Priority::INVALID > zero));
        assert!(!(Priority::INVALID <= zero));
        assert!(!(Priority::INVALID >= zero));
        assert!(!(zero < Priority::INVALID));
        assert!(!(zero >= Priority::INVALID));
        assert_eq!(Priority::INVALID.partial_cmp(&zero), None);
    }

    #[test]
    fn hashing_is_consistent_with_trimmed_equality() {
        use std::hash::{BuildHasher, RandomState};

        let hasher = RandomState::new();
        assert_eq!(
            hasher.hash_one(Priority::new(&[2, 1])),
            hasher.hash_one(Priority::new(&[2, 1, 0, 0]))
        );
        assert_eq!(hasher.hash_one(Priority::new(&[0, 0])), hasher.hash_one(Priority::single(0)));
        // The sentinel carries its own tag, distinct from the zero priority.
        assert_ne!(hasher.hash_one(Priority::INVALID), hasher.hash_one(Priority::single(0)));
    }

    #[test]
    fn level_reads_are_bounded_by_the_stored_sequence() {
        let fib = Priority::new(&[0, 1, 2, 3, 5, 8, 13]);
        assert_eq!(fib.level(6), Ok(13));
        assert_eq!(fib.level(7), Err(PriorityError::OutOfRange { index: 7, stored: 7 }));
        assert_eq!(fib.len(), 7);

        let padded = Priority::new(&[4, 0, 0]);
        assert_eq!(padded.len(), 1);
        assert_eq!(padded.level(2), Ok(0));
        assert!(padded.level(3).is_err());
    }

    proptest! {
        #[test]
        fn appended_zeros_never_change_equality_or_order(
            left in proptest::collection::vec(-8_i32..=8, 1..6),
            right in proptest::collection::vec(-8_i32..=8, 1..6),
            padding in 0_usize..4
        ) {
            let mut padded = left.clone();
            padded.extend(std::iter::repeat_n(0, padding));

            let a = Priority::new(&left);
            let a_padded = Priority::new(&padded);
            let b = Priority::new(&right);

            prop_assert_eq!(&a, &a_padded);
            prop_assert_eq!(a.partial_cmp(&b), a_padded.partial_cmp(&b));
            prop_assert_eq!(a.partial_cmp(&b).map(Ordering::reverse), b.partial_cmp(&a));
        }
    }
}
