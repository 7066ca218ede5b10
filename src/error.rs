use std::fmt;

use thiserror::Error;

/// Single-child slots on a message or expander layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSlot {
    ActionArea,
    ExpandedBody,
    CollapsedBody,
}

impl fmt::Display for ChildSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionArea => write!(f, "an action area"),
            Self::ExpandedBody => write!(f, "an expanded body actor"),
            Self::CollapsedBody => write!(f, "a collapsed body actor"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Message is already a member of section {section:?}")]
    DuplicateMember { section: String },

    #[error("Message is not a member of section {section:?}")]
    NotAMember { section: String },

    #[error("Already has {0}")]
    DuplicateChild(ChildSlot),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
