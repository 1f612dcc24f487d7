//! # Jenkins Status
//!
//! Status types for tracking configuration-phase progress.
//!
//! The status fields are the sole durable record of how far reconciliation has
//! progressed for a resource. The operator resumes from these fields after a
//! restart; no component caches phase state in process memory.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of the Jenkins resource
///
/// Tracks the two monotonic configuration milestones together with the
/// identity of the pod they were achieved against.
#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsStatus {
    /// Time base configuration completed (pod provisioned and Jenkins
    /// answered liveness checks). Cleared whenever the master pod is replaced.
    #[serde(default)]
    pub base_configuration_completed_time: Option<String>,
    /// Time user configuration completed (groovy scripts, configuration as
    /// code, and every seed job applied without error). Preserved across safe
    /// restarts that keep the same pod.
    #[serde(default)]
    pub user_configuration_completed_time: Option<String>,
    /// Opaque identity token of the master pod base configuration last
    /// completed against. A mismatch with the live pod means the pod was
    /// recreated out-of-band.
    #[serde(default)]
    pub provisioned_by: Option<String>,
    /// Hash of the resolved customization content and seed job descriptors at
    /// the moment user configuration last completed. A changed hash re-runs
    /// the (idempotent) user configuration sequence.
    #[serde(default)]
    pub user_configuration_hash: Option<String>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Observed generation
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}
