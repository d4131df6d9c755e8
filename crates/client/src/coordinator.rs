//! The per-pair attempt loop.
//!
//! Every attempt starts from fresh state: pending receives are resolved, both
//! listings and the encryption context are read again, and a new plan is
//! executed step by step. A step failure after progress in the same attempt
//! means the destination moved, so the pair is planned again; a failure
//! without progress ends the pair.

use engine::retry::{Attempt, AttemptOutcome};
use engine::{EncryptionRules, PlanConstraints, plan};
use tracing::{debug, info};

use crate::catalog::snapshot_set;
use crate::config::ClientConfig;
use crate::encryption::resolve_encryption;
use crate::error::ClientError;
use crate::executor::{StepExecutor, StepStatus};
use crate::negotiator::FeatureNegotiator;
use crate::options::OptionSet;
use crate::repository::Repository;
use crate::resume::ResumeResolver;
use crate::summary::ReplicationSummary;
use crate::walker::DatasetPair;

/// How an attempt ended.
enum AttemptEnd {
    Converged,
    StepFailed { step: String, diagnostic: String },
}

/// Drives one dataset pair to convergence.
#[derive(Debug)]
pub struct RetryCoordinator<'a> {
    pair: &'a DatasetPair,
    config: &'a ClientConfig,
    options: &'a OptionSet,
}

impl<'a> RetryCoordinator<'a> {
    /// Creates a coordinator for `pair`.
    #[must_use]
    pub const fn new(pair: &'a DatasetPair, config: &'a ClientConfig, options: &'a OptionSet) -> Self {
        Self {
            pair,
            config,
            options,
        }
    }

    /// Runs attempts until the pair converges or fails.
    ///
    /// # Errors
    ///
    /// [`ClientError::StepFailed`] when a step fails before anything in its
    /// attempt succeeded (or at all, in a dry run), and any refusal, resume
    /// or repository error raised along the way.
    pub fn run<R>(
        &self,
        repository: &mut R,
        negotiator: &mut FeatureNegotiator,
    ) -> Result<ReplicationSummary, ClientError>
    where
        R: Repository + ?Sized,
    {
        let dry_run = self.config.policy().dry_run();
        let mut summary = ReplicationSummary::default();

        loop {
            let mut attempt = Attempt::new();
            let (step, diagnostic) =
                match self.attempt(repository, negotiator, &mut attempt, &mut summary)? {
                    AttemptEnd::Converged => {
                        debug!(
                            target: "zrsync::retry",
                            "{}: converged after {} steps",
                            self.pair,
                            attempt.completed()
                        );
                        summary.record_pair();
                        return Ok(summary);
                    }
                    AttemptEnd::StepFailed { step, diagnostic } => (step, diagnostic),
                };

            let outcome = attempt.on_failure();
            debug!(
                target: "zrsync::retry",
                "{}: {step} failed after {} completed steps: {outcome:?}",
                self.pair,
                attempt.completed()
            );
            if outcome == AttemptOutcome::PartialRetry && !dry_run {
                info!(
                    target: "zrsync::misc",
                    "{}: {step} failed ({diagnostic}), retrying",
                    self.pair
                );
                summary.record_retry();
                continue;
            }
            return Err(ClientError::StepFailed {
                pair: self.pair.to_string(),
                step,
                diagnostic,
            });
        }
    }

    fn attempt<R>(
        &self,
        repository: &mut R,
        negotiator: &mut FeatureNegotiator,
        attempt: &mut Attempt,
        summary: &mut ReplicationSummary,
    ) -> Result<AttemptEnd, ClientError>
    where
        R: Repository + ?Sized,
    {
        let pair = self.pair;
        let policy = self.config.policy();

        let resumed = ResumeResolver::new(&pair.source, &pair.destination, self.options, policy.dry_run())
            .resolve(repository, negotiator, summary)?;
        if resumed.made_progress() {
            attempt.record_success();
        }

        let source = snapshot_set(repository, &pair.source)?;
        if !source.exists() {
            return Err(ClientError::SourceMissing(pair.source.to_string()));
        }
        let destination = snapshot_set(repository, &pair.destination)?;

        let refused = |error| ClientError::Plan {
            pair: pair.to_string(),
            source: error,
        };
        let context = resolve_encryption(repository, &pair.source, &pair.destination)?;
        let rules = EncryptionRules::evaluate(
            &context,
            &pair.source.to_string(),
            &pair.destination.to_string(),
        )
        .map_err(refused)?;
        let plan = plan(
            &source,
            &destination,
            self.config.filter(),
            policy,
            &context,
            PlanConstraints {
                stream_package: pair.stream_package && self.options.features().stream_package,
            },
        )
        .map_err(refused)?;

        if plan.is_empty() {
            info!(target: "zrsync::misc", "{pair}: up to date");
            return Ok(AttemptEnd::Converged);
        }
        debug!(target: "zrsync::plan", "{pair}: {} steps", plan.len());
        for step in &plan {
            debug!(target: "zrsync::plan", "  {step}");
        }

        let mut executor =
            StepExecutor::new(&pair.source, &pair.destination, self.options, policy.dry_run())
                .with_rules(rules)
                .with_destination_exists(destination.exists());
        for step in &plan {
            match executor.execute(repository, step, summary)? {
                StepStatus::Completed => attempt.record_success(),
                StepStatus::Failed { diagnostic } => {
                    return Ok(AttemptEnd::StepFailed {
                        step: step.to_string(),
                        diagnostic,
                    });
                }
            }
        }
        Ok(AttemptEnd::Converged)
    }
}
