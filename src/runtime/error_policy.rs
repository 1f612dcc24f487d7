//! # Error Policy
//!
//! Backoff for reconciliation errors.
//!
//! Backoff state is tracked per resource so one persistently broken resource
//! cannot starve the others. Successful reconciles clear the state (done by
//! the reconciler itself).

use crate::constants;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::Jenkins;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Handle a reconciliation error with per-resource Fibonacci backoff
pub fn error_policy(
    jenkins: Arc<Jenkins>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = jenkins.metadata.name.as_deref().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.as_deref().unwrap_or("default");
    let resource_key = format!("{namespace}/{name}");

    error!("Reconciliation error for {resource_key}: {error:#}");

    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states
                .entry(resource_key.clone())
                .or_insert_with(|| BackoffState {
                    backoff: FibonacciBackoff::new(1, 10),
                    error_count: 0,
                });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff states: {e}, using default requeue");
            (constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, 0)
        }
    };

    info!(
        "Retrying {resource_key} in {backoff_seconds}s (consecutive errors: {error_count})"
    );
    Action::requeue(Duration::from_secs(backoff_seconds))
}
