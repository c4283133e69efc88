//! Error type shared by every model store and construction.
//!
//! Errors fall into a few families:
//! - referential-integrity violations (unknown or still-referenced items),
//! - unsupported operations,
//! - evaluator failures (unrecognized or ill-typed guard/action text),
//! - parser failures and exploration limits.
//!
//! Items embedded into errors are rendered with [`Debug`], so the error type
//! does not depend on the generic parameters of the model that raised it.

use std::fmt;

use thiserror::Error;

/// The part of a model that still references an item scheduled for removal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ModelPart {
    InitialStates,
    Transitions,
    LabelingFunction,
    InitialLocations,
}

impl fmt::Display for ModelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelPart::InitialStates => "initial states",
            ModelPart::Transitions => "transitions",
            ModelPart::LabelingFunction => "labeling function",
            ModelPart::InitialLocations => "initial locations",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Error {
    #[error("state {0} not found")]
    StateNotFound(String),

    #[error("action {0} not found")]
    ActionNotFound(String),

    #[error("location {0} not found")]
    LocationNotFound(String),

    #[error("cannot make {0} initial: it is not a state of the system")]
    InvalidInitialState(String),

    #[error("invalid transition {0}: endpoints and action must be registered")]
    InvalidTransition(String),

    #[error("invalid label ({state}, {ap}): state or atomic proposition is not registered")]
    InvalidLabel { state: String, ap: String },

    #[error("cannot remove state {item}: still referenced by {part}")]
    DeletionOfAttachedState { item: String, part: ModelPart },

    #[error("cannot remove action {item}: still referenced by {part}")]
    DeletionOfAttachedAction { item: String, part: ModelPart },

    #[error("cannot remove atomic proposition {item}: still referenced by {part}")]
    DeletionOfAttachedAtomicProposition { item: String, part: ModelPart },

    #[error("cannot remove location {item}: still referenced by {part}")]
    DeletionOfAttachedLocation { item: String, part: ModelPart },

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("no evaluator recognizes {text:?}")]
    UnrecognizedSyntax { text: String },

    #[error("evaluation failed: {message}")]
    Evaluation { message: String },

    #[error("parse error at offset {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("state space exceeds the limit of {limit} states")]
    StateLimitExceeded { limit: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    pub(crate) fn state_not_found<S: fmt::Debug>(state: &S) -> Self {
        Error::StateNotFound(format!("{:?}", state))
    }

    pub(crate) fn action_not_found<A: fmt::Debug>(action: &A) -> Self {
        Error::ActionNotFound(format!("{:?}", action))
    }

    pub(crate) fn location_not_found<L: fmt::Debug>(location: &L) -> Self {
        Error::LocationNotFound(format!("{:?}", location))
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation { message: message.into() }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
