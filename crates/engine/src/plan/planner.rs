//! The reconciliation algorithm.

use std::collections::BTreeSet;

use filters::{SnapshotFilter, allows};
use tracing::debug;

use super::deletion::deletion_candidates;
use super::step::{DeleteTiming, Plan, PlanStep, TransferStep};
use crate::encryption::EncryptionContext;
use crate::error::PlanError;
use crate::policy::ReplicationPolicy;
use crate::snapshot::SnapshotSet;

/// Transport conditions that shape a plan.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlanConstraints {
    /// The source can send replication stream packages and this pair is the
    /// root of a full recursive replication set.
    pub stream_package: bool,
}

/// Computes the steps that bring `destination` in line with `source`.
///
/// The most recent common snapshot (the newest destination snapshot present
/// anywhere in `source`) is the pivot. From there the planner either sends
/// one stream package up to the newest eligible snapshot, or walks forward
/// one eligible snapshot at a time. Stepwise runs under `delete` first remove
/// deletable destination snapshots above the pivot, since an incremental is
/// only received onto the newest destination snapshot. Without a pivot the
/// destination history is replaced, which needs `delete` and, when a filter
/// would hide destination snapshots, `delete_excluded`.
///
/// # Errors
///
/// Returns [`PlanError`] when replicating would silently drop encryption or
/// destroy destination history the policy does not allow destroying.
pub fn plan(
    source: &SnapshotSet,
    destination: &SnapshotSet,
    filter: Option<&SnapshotFilter>,
    policy: &ReplicationPolicy,
    encryption: &EncryptionContext,
    constraints: PlanConstraints,
) -> Result<Plan, PlanError> {
    if encryption.is_downgrade() {
        return Err(PlanError::EncryptionDowngrade {
            source_dataset: source.dataset().to_string(),
            destination: destination.dataset().to_string(),
        });
    }

    let filtered: Vec<&str> = source
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| allows(filter, name))
        .collect();
    let (Some(&newest_eligible), Some(&oldest_eligible)) = (filtered.first(), filtered.last())
    else {
        debug!(target: "zrsync::plan", "{}: no eligible source snapshots", source.dataset());
        return Ok(Plan::default());
    };

    let common = destination.most_recent_common(source);
    debug!(
        target: "zrsync::plan",
        "{}: most recent common snapshot {}",
        destination.dataset(),
        common.unwrap_or("<none>")
    );

    let mut steps = Vec::new();
    let mut consumed = BTreeSet::new();

    if policy.delete_before()
        && let Some(common) = common
    {
        let doomed: Vec<String> =
            deletion_candidates(destination, &filtered, filter, policy, &consumed)
                .into_iter()
                .filter(|name| *name != common)
                .map(str::to_owned)
                .collect();
        if !doomed.is_empty() {
            consumed.extend(doomed.iter().cloned());
            steps.push(PlanStep::Delete {
                snapshots: doomed,
                timing: DeleteTiming::Before,
            });
        }
    }

    let fast_path = filter.is_none() && policy.delete() && constraints.stream_package;

    // An incremental from the pivot is only received onto the pivot, so
    // deletable snapshots above it must go before the first transfer.
    if policy.delete()
        && !fast_path
        && let Some(common) = common
    {
        let newer: Vec<&str> = destination.newer_than(common).collect();
        let stale: Vec<String> =
            deletion_candidates(destination, &filtered, filter, policy, &consumed)
                .into_iter()
                .filter(|name| newer.contains(name))
                .map(str::to_owned)
                .collect();
        if !stale.is_empty() {
            consumed.extend(stale.iter().cloned());
            steps.push(PlanStep::Delete {
                snapshots: stale,
                timing: DeleteTiming::Before,
            });
        }
    }

    let mut used_fast_path = false;
    let mut pivot = common;

    while pivot != Some(newest_eligible) && pivot != source.newest() {
        let target = if let Some(from) = pivot {
            let (to, whole_stream) = if fast_path {
                (newest_eligible, true)
            } else {
                let Some(next) = source.newer_than(from).find(|name| allows(filter, name)) else {
                    break;
                };
                (next, false)
            };
            used_fast_path |= whole_stream;
            steps.push(PlanStep::Transfer(TransferStep {
                from: Some(from.to_owned()),
                to: to.to_owned(),
                whole_stream,
            }));
            to
        } else {
            if !destination.is_empty() && !policy.delete() {
                return Err(PlanError::NoCommonHistory {
                    destination: destination.dataset().to_string(),
                });
            }
            if filter.is_some() && !policy.delete_excluded() {
                let hidden: Vec<String> = destination
                    .names()
                    .iter()
                    .filter(|name| !allows(filter, name))
                    .cloned()
                    .collect();
                if !hidden.is_empty() {
                    return Err(PlanError::ExcludedSnapshotsWouldBeDestroyed {
                        destination: destination.dataset().to_string(),
                        names: hidden,
                    });
                }
            }
            if !destination.is_empty() {
                steps.push(PlanStep::DestroyAll {
                    dataset: destination.dataset().clone(),
                });
                consumed.extend(destination.names().iter().cloned());
            }
            steps.push(PlanStep::Transfer(TransferStep {
                from: None,
                to: oldest_eligible.to_owned(),
                whole_stream: fast_path,
            }));
            oldest_eligible
        };
        pivot = Some(target);
    }

    // The final pivot is the base of the next run's incrementals.
    if !used_fast_path && policy.delete() {
        let doomed: Vec<String> =
            deletion_candidates(destination, &filtered, filter, policy, &consumed)
                .into_iter()
                .filter(|name| Some(*name) != pivot)
                .map(str::to_owned)
                .collect();
        if !doomed.is_empty() {
            steps.push(PlanStep::Delete {
                snapshots: doomed,
                timing: DeleteTiming::After,
            });
        }
    }

    debug!(
        target: "zrsync::plan",
        "{}: {} step(s) planned",
        destination.dataset(),
        steps.len()
    );
    Ok(Plan::new(steps))
}
