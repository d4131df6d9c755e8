//! Pending partial receives.

use engine::capability::Capability;
use engine::resume::{ResumeFailure, classify_failure, resolve};
use engine::{Dataset, PlanStep};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::executor::{StepExecutor, StepStatus};
use crate::negotiator::FeatureNegotiator;
use crate::options::OptionSet;
use crate::repository::Repository;
use crate::summary::ReplicationSummary;

/// What happened to the destination's partial receive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResumeOutcome {
    /// Nothing was pending, or the destination keeps no partial state.
    Idle,
    /// The interrupted transfer was completed.
    Resumed,
    /// The partial state was discarded.
    Aborted,
}

impl ResumeOutcome {
    /// Returns `true` when a transfer was completed.
    #[must_use]
    pub const fn made_progress(self) -> bool {
        matches!(self, Self::Resumed)
    }
}

/// Clears the way for planning by resuming or discarding a partial receive.
#[derive(Debug)]
pub struct ResumeResolver<'a> {
    source: &'a Dataset,
    destination: &'a Dataset,
    options: &'a OptionSet,
    dry_run: bool,
}

impl<'a> ResumeResolver<'a> {
    /// Creates a resolver for `source -> destination`.
    #[must_use]
    pub const fn new(
        source: &'a Dataset,
        destination: &'a Dataset,
        options: &'a OptionSet,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            destination,
            options,
            dry_run,
        }
    }

    /// Resumes or discards the destination's pending receive, if any.
    ///
    /// A resume that fails because its token can no longer be used falls
    /// back to discarding the partial state.
    ///
    /// # Errors
    ///
    /// [`ClientError::ResumeFailed`] when the resume fails for another
    /// reason or the partial state cannot be discarded; repository errors
    /// when the destination cannot be queried.
    pub fn resolve<R>(
        &self,
        repository: &mut R,
        negotiator: &mut FeatureNegotiator,
        summary: &mut ReplicationSummary,
    ) -> Result<ResumeOutcome, ClientError>
    where
        R: Repository + ?Sized,
    {
        if !self.options.features().resumable_receive {
            return Ok(ResumeOutcome::Idle);
        }
        let Some(token) = repository.resume_token(self.destination)? else {
            return Ok(ResumeOutcome::Idle);
        };
        debug!(target: "zrsync::retry", "{}: resume token {token}", self.destination);

        let source_can_resume =
            negotiator.supports(repository, self.source.host(), Capability::SendResumeToken)?;
        let action = resolve(Some(&token), source_can_resume);
        let mut executor = StepExecutor::new(self.source, self.destination, self.options, self.dry_run);

        if let Some(step @ PlanStep::ResumeSend { .. }) = action.step() {
            match executor.execute(repository, &step, summary)? {
                StepStatus::Completed => return Ok(ResumeOutcome::Resumed),
                StepStatus::Failed { diagnostic } => match classify_failure(&diagnostic) {
                    ResumeFailure::Abort => {
                        warn!(
                            target: "zrsync::resume",
                            "{}: cannot resume ({diagnostic}), discarding partial receive",
                            self.destination
                        );
                    }
                    ResumeFailure::Fatal => return Err(self.failed(diagnostic)),
                },
            }
        }
        match executor.execute(repository, &PlanStep::ResumeAbort, summary)? {
            StepStatus::Completed => Ok(ResumeOutcome::Aborted),
            StepStatus::Failed { diagnostic } => Err(self.failed(diagnostic)),
        }
    }

    fn failed(&self, diagnostic: String) -> ClientError {
        ClientError::ResumeFailed {
            dataset: self.destination.to_string(),
            diagnostic,
        }
    }
}
