//! Error types for the geometry library.

use thiserror::Error;

/// Errors that can occur in geometric calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A pose update was requested with a negative time delta (seconds).
    #[error("Negative time delta: {0} s")]
    NegativeTimeDelta(f32),
}
