//! Session error types.
//!
//! These error types represent failures of the session state machine and of
//! question-bank construction. Defined here so hosting code can classify
//! errors (swallow documented no-ops, surface data errors) without string
//! matching.

use thiserror::Error;

/// Errors produced by the session controller and bank construction.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A mutating call was made after the session was submitted.
    #[error("session already submitted, {operation} rejected")]
    InvalidState {
        /// The rejected operation, for the hosting page's logs.
        operation: &'static str,
    },

    /// The question bank was supplied with zero questions.
    #[error("question bank '{bank_id}' contains no questions")]
    EmptyQuestionBank { bank_id: String },

    /// A question violates its construction-time invariants.
    #[error("invalid question '{id}': {reason}")]
    InvalidQuestion { id: String, reason: String },
}

impl SessionError {
    /// Returns `true` for the terminal-state rejection the forced-expiry
    /// path must swallow rather than surface.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, SessionError::InvalidState { .. })
    }
}
