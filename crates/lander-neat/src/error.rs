//! Error types for genome construction and evaluation
//!
//! Mutation operators never return these: a mutation that cannot be applied
//! simply reports that nothing changed.

use thiserror::Error;

/// Errors surfaced at the genome boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    /// `evaluate` was given a vector whose length differs from the input count
    #[error("expected {expected} inputs, got {actual}")]
    InvalidInput {
        /// Number of input nodes in the genome
        expected: usize,
        /// Length of the vector that was passed in
        actual: usize,
    },

    /// A requested or observed structure breaks a genome invariant
    #[error("invalid topology: {reason}")]
    InvalidTopology {
        /// Human-readable description of the violated invariant
        reason: String,
    },
}

impl GenomeError {
    pub(crate) fn topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            reason: reason.into(),
        }
    }
}
