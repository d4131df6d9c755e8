//! Interrupted receive handling.
//!
//! A destination that supports resumable receive keeps partial state after an
//! interrupted transfer and reports it as a `receive_resume_token`. Before
//! planning, that state is either continued (the source can send from a
//! token) or discarded (it cannot), since a pending partial receive blocks
//! every other receive into the dataset.

use crate::plan::PlanStep;
use crate::signatures::{RESUME_FAILURE, has_signature};

/// What to do about a pending partial receive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResumeAction {
    /// No partial receive is pending.
    Proceed,
    /// Continue the partial receive from `token`.
    Resume {
        /// Token reported by the destination.
        token: String,
    },
    /// Discard the partial receive.
    Abort,
}

impl ResumeAction {
    /// The step that carries out this action, if any.
    #[must_use]
    pub fn step(&self) -> Option<PlanStep> {
        match self {
            Self::Proceed => None,
            Self::Resume { token } => Some(PlanStep::ResumeSend {
                token: token.clone(),
            }),
            Self::Abort => Some(PlanStep::ResumeAbort),
        }
    }
}

/// Normalizes a `receive_resume_token` property value.
///
/// The snapshot engine prints `-` when no token is set.
#[must_use]
pub fn token_from_property(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != "-")
}

/// Decides how to handle `token` given whether the source can send from it.
#[must_use]
pub fn resolve(token: Option<&str>, source_can_resume: bool) -> ResumeAction {
    match token {
        None => ResumeAction::Proceed,
        Some(token) if source_can_resume => ResumeAction::Resume {
            token: token.to_owned(),
        },
        Some(_) => ResumeAction::Abort,
    }
}

/// How a failed resume send is handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResumeFailure {
    /// The token is unusable; discard the partial receive and plan normally.
    Abort,
    /// Any other failure.
    Fatal,
}

/// Classifies the diagnostic text of a failed resume send.
#[must_use]
pub fn classify_failure(diagnostic: &str) -> ResumeFailure {
    if has_signature(diagnostic, RESUME_FAILURE) {
        ResumeFailure::Abort
    } else {
        ResumeFailure::Fatal
    }
}
