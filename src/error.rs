//! Error types for the confirmation dialog.

use crate::page::ElementKind;

/// Errors raised while showing a confirmation or waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    /// The page has no element with this id.
    #[error("required dialog element not found: {id}")]
    MissingElement { id: String },
    /// The element exists but cannot play the role the dialog needs.
    #[error("dialog element '{id}' is a {found:?}, expected a {expected:?}")]
    WrongElementKind {
        id: String,
        expected: ElementKind,
        found: ElementKind,
    },
    /// A request is already outstanding and the dialog rejects overlaps.
    #[error("confirmation #{request_id} is still waiting for an answer")]
    Busy { request_id: u64 },
    /// A newer request took over the dialog before this one was answered.
    #[error("confirmation #{request_id} was replaced by a newer request")]
    Superseded { request_id: u64 },
    /// Nobody answered before the deadline.
    #[error("confirmation timed out")]
    TimedOut,
    /// Every handle able to answer the request was dropped.
    #[error("confirmation was abandoned before it was answered")]
    Abandoned,
    #[error("invalid dialog configuration: {0}")]
    InvalidConfig(String),
}

impl DialogError {
    pub(crate) fn missing(id: &str) -> Self {
        Self::MissingElement { id: id.to_string() }
    }
}
