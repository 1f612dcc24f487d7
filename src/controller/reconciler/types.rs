//! # Reconciler Types
//!
//! The reconciler context shared across reconciles, operator-level timing
//! configuration, and the error taxonomy.

use crate::configuration::user::resolver::ResolveError;
use crate::constants;
use crate::controller::backoff::FibonacciBackoff;
use kube::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Reconciliation errors
///
/// Transient conditions (instance not reachable yet, readiness timeout) do
/// not appear here: the reconciler ends those passes successfully with a
/// short requeue instead of escalating. Errors in this taxonomy reach the
/// error policy and back off per resource.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// The declared spec is invalid (duplicate seed job ids, missing fields).
    /// Retried with backoff so a fixed spec converges without operator help.
    #[error("invalid Jenkins spec: {0}")]
    InvalidSpec(String),
    /// A customization step failed: missing referenced ConfigMap/Secret, or a
    /// script raised an exception in the target. Diagnostic output (including
    /// script console output) is retained in the error chain.
    #[error("user configuration failed: {0:#}")]
    ConfigurationFailed(#[source] anyhow::Error),
    /// Jenkins rejected the operator's credentials
    #[error("Jenkins rejected the operator credentials")]
    Unauthorized,
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl From<ResolveError> for ReconcilerError {
    /// Missing references are configuration errors; API failures during
    /// resolution stay cluster errors so their retry behavior matches every
    /// other Kubernetes call the reconciler makes
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Kube(e) => Self::Kube(e),
            other => Self::ConfigurationFailed(anyhow::Error::new(other)),
        }
    }
}

/// Operator-level timing configuration
///
/// Overridable through environment variables; every wait in the reconciler is
/// an explicit bounded loop parameterized from here, never an ambient
/// suspension, so timeout behavior stays independently testable.
#[derive(Debug, Clone)]
pub struct JenkinsOperatorConfig {
    /// Interval between liveness probes while waiting for Jenkins
    pub ready_poll_interval: Duration,
    /// Per-reconcile budget for waiting on readiness
    pub ready_timeout: Duration,
    /// Requeue delay for transient conditions
    pub transient_requeue: Duration,
    /// Periodic resync interval in steady state
    pub resync_period: Duration,
}

impl Default for JenkinsOperatorConfig {
    fn default() -> Self {
        Self {
            ready_poll_interval: Duration::from_secs(constants::DEFAULT_READY_POLL_INTERVAL_SECS),
            ready_timeout: Duration::from_secs(constants::DEFAULT_READY_TIMEOUT_SECS),
            transient_requeue: Duration::from_secs(constants::DEFAULT_TRANSIENT_REQUEUE_SECS),
            resync_period: Duration::from_secs(constants::DEFAULT_RESYNC_PERIOD_SECS),
        }
    }
}

impl JenkinsOperatorConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ready_poll_interval: env_duration_secs(
                "JENKINS_OPERATOR_READY_POLL_INTERVAL_SECS",
                defaults.ready_poll_interval,
            ),
            ready_timeout: env_duration_secs(
                "JENKINS_OPERATOR_READY_TIMEOUT_SECS",
                defaults.ready_timeout,
            ),
            transient_requeue: env_duration_secs(
                "JENKINS_OPERATOR_TRANSIENT_REQUEUE_SECS",
                defaults.transient_requeue,
            ),
            resync_period: env_duration_secs(
                "JENKINS_OPERATOR_RESYNC_PERIOD_SECS",
                defaults.resync_period,
            ),
        }
    }
}

fn env_duration_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Per-resource backoff bookkeeping
#[derive(Debug)]
pub struct BackoffState {
    /// Backoff sequence for this resource
    pub backoff: FibonacciBackoff,
    /// Consecutive error count
    pub error_count: u32,
}

impl BackoffState {
    /// Record one more consecutive error
    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Shared reconciler context
///
/// Holds only cluster handles and static configuration. Configuration-phase
/// progress is never cached here; the resource status is the sole source of
/// truth for how far reconciliation has progressed.
pub struct Reconciler {
    /// Kubernetes client
    pub client: Client,
    /// Operator timing configuration
    pub config: JenkinsOperatorConfig,
    /// Per-resource backoff state, keyed by `namespace/name`
    pub backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create the reconciler context
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config: JenkinsOperatorConfig::from_env(),
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Drop backoff state for a resource after a successful reconcile
    pub fn clear_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}
