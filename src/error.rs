//! Error types shared by every container and construction.
//!
//! All errors are local and recoverable: the failing operation leaves its
//! container unchanged and repeating the call yields the same error.
//! Identifiers are carried in their `Debug` rendering so the error type does
//! not depend on the caller's state/action/proposition types.

use std::fmt::{self, Debug};

use thiserror::Error;

/// Part of a transition system an element belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TsPart {
    States,
    Actions,
    AtomicPropositions,
}

impl fmt::Display for TsPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsPart::States => write!(f, "state"),
            TsPart::Actions => write!(f, "action"),
            TsPart::AtomicPropositions => write!(f, "atomic proposition"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FvmError {
    #[error("state not found: {0}")]
    StateNotFound(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("atomic proposition not found: {0}")]
    AtomicPropositionNotFound(String),

    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("cannot delete {part} {item}: it is still referenced")]
    DeletionOfAttached { part: TsPart, item: String },

    #[error("unsupported composition: {0}")]
    UnsupportedComposition(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("evaluation error: {0}")]
    Eval(String),
}

impl FvmError {
    pub fn state_not_found(s: &impl Debug) -> Self {
        FvmError::StateNotFound(format!("{:?}", s))
    }

    pub fn action_not_found(a: &impl Debug) -> Self {
        FvmError::ActionNotFound(format!("{:?}", a))
    }

    pub fn deletion_of_attached(part: TsPart, item: &impl Debug) -> Self {
        FvmError::DeletionOfAttached {
            part,
            item: format!("{:?}", item),
        }
    }
}

pub type Result<T> = std::result::Result<T, FvmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = FvmError::state_not_found(&"s0");
        assert_eq!(e.to_string(), "state not found: \"s0\"");

        let e = FvmError::deletion_of_attached(TsPart::Actions, &7);
        assert_eq!(e.to_string(), "cannot delete action 7: it is still referenced");
    }
}
