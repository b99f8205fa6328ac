use thiserror::Error;

use super::OrderedIndex;
use crate::Key;

/// A broken red-black or ordering invariant, reported by [`OrderedIndex::validate`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("sentinel is not black")]
    SentinelNotBlack,
    #[error("sentinel links were modified")]
    SentinelLinked,
    #[error("root {key} is not black")]
    RootNotBlack { key: Key },
    #[error("red node {child} has red parent {parent}")]
    RedRed { parent: Key, child: Key },
    #[error("black-height differs below {key}: left {left}, right {right}")]
    BlackHeightMismatch { key: Key, left: usize, right: usize },
    #[error("in-order keys not strictly increasing: {previous} then {next}")]
    OutOfOrder { previous: Key, next: Key },
    #[error("parent link of {key} does not point at its parent")]
    BrokenParentLink { key: Key },
    #[error("index reports {expected} records but holds {actual}")]
    LenMismatch { expected: usize, actual: usize },
}

impl OrderedIndex {
    /// Checks every structural invariant of the tree.
    ///
    /// On success returns the black-height. This walks every record and is
    /// meant for tests and debugging.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::{Key, OrderedIndex, Registration};
    ///
    /// let index: OrderedIndex = (0..100)
    ///     .map(|id| (Key::new(id, "Math"), Registration::default()))
    ///     .collect();
    /// assert_eq!(index.validate(), Ok(index.black_height()));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        self.raw.validate()
    }
}
