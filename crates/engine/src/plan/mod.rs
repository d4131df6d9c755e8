//! Reconciliation plans.
//!
//! A [`Plan`] is the ordered list of actions that moves a destination toward
//! its source. Steps run strictly in order and every step relies on the ones
//! before it having succeeded. Plans are recomputed from fresh listings on
//! every attempt and never stored.

mod deletion;
mod planner;
mod step;


pub use planner::{PlanConstraints, plan};
pub use step::{DeleteTiming, Plan, PlanStep, TransferStep};

/// Maximum number of snapshot names passed to one destroy invocation.
pub const DESTROY_BATCH_LIMIT: usize = 2000;

/// Splits `names` into destroy batches of at most [`DESTROY_BATCH_LIMIT`].
pub fn destroy_batches(names: &[String]) -> impl Iterator<Item = &[String]> {
    names.chunks(DESTROY_BATCH_LIMIT)
}
