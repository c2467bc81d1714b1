//! Domain error types.
//!
//! These errors represent caller contract violations against the
//! itinerary model. They are distinct from API/IO errors.

use std::fmt;

/// Which index of an itinerary operation was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRole {
    SourceDay,
    SourceSpot,
    DestDay,
    DestSpot,
    Day,
    Spot,
}

impl fmt::Display for IndexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexRole::SourceDay => "source day",
            IndexRole::SourceSpot => "source spot",
            IndexRole::DestDay => "destination day",
            IndexRole::DestSpot => "destination spot",
            IndexRole::Day => "day",
            IndexRole::Spot => "spot",
        };
        f.write_str(name)
    }
}

/// Domain-level errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// An index does not address an existing day or spot.
    ///
    /// `bound` is the exclusive upper limit the index had to respect.
    #[error("invalid index: {role} index {index} out of range (must be < {bound})")]
    InvalidIndex {
        role: IndexRole,
        index: usize,
        bound: usize,
    },
}

impl DomainError {
    pub(crate) fn invalid_index(role: IndexRole, index: usize, bound: usize) -> Self {
        DomainError::InvalidIndex { role, index, bound }
    }
}
