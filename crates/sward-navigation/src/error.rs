//! This module defines the error types used by the `sward-navigation` crate.

#![warn(missing_docs)]

use thiserror::Error;

use crate::store::Segment;

/// Error type for navigation operations.
///
/// Every variant returned by a point store mutator means the call was refused
/// and no state was changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A point index at or beyond the store capacity.
    #[error("Point index {index} out of range (capacity {capacity})")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// The store capacity.
        capacity: usize,
    },

    /// A point index that neither restarts the upload nor continues it.
    #[error("Point index {index} is not contiguous, expected 0 or {expected}")]
    NonContiguousIndex {
        /// The rejected index.
        index: usize,
        /// The next index the upload would accept.
        expected: usize,
    },

    /// The segment counts would add up to more points than the store holds.
    #[error("Setting {segment:?} would need {requested} points (capacity {capacity})")]
    CapacityExceeded {
        /// The segment whose count was being changed.
        segment: Segment,
        /// Total points the new layout would need.
        requested: usize,
        /// The store capacity.
        capacity: usize,
    },

    /// An exclusion sub-run index at or beyond the sub-run limit.
    #[error("Exclusion index {index} out of range (max {max})")]
    ExclusionOutOfRange {
        /// The rejected sub-run index.
        index: usize,
        /// The sub-run limit.
        max: usize,
    },

    /// An exclusion sub-run described before the run preceding it.
    #[error("Exclusion run {run} is not contiguous, expected at most {expected}")]
    NonContiguousExclusion {
        /// The rejected sub-run index.
        run: usize,
        /// The next sub-run index that would be accepted.
        expected: usize,
    },

    /// A transit path could not be synthesized because the store is full.
    #[error("No room left for a transit path of {len} points")]
    TransitUnavailable {
        /// Length of the transit path that did not fit.
        len: usize,
    },
}
