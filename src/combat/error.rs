//! Combat engine errors
//!
//! Every error here is caller misuse rather than a transient failure: the
//! operation is rejected and nothing it touched has been written.

use thiserror::Error;

use super::EncounterId;

/// Errors returned by combat operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no eligible participants for combat")]
    NoParticipants,

    #[error("missing initiative for {0}")]
    MissingInitiative(String),

    #[error("combat already active for encounter {0}")]
    AlreadyActive(EncounterId),

    #[error("not eligible: {0}")]
    NotEligible(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CombatError>;
