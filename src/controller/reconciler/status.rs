//! # Phase Tracker
//!
//! Persists configuration-phase milestones in the `Jenkins` resource status.
//!
//! Status writes happen only after the corresponding remote step has been
//! confirmed successful, never optimistically before, so a crash between a
//! remote call and the status write can only cause the (idempotent) step to
//! repeat. Unchanged statuses are not re-patched, which keeps watch events
//! from feeding back into reconcile triggers.
//!
//! The patch bodies are built by pure functions so the exact fields each
//! milestone records (and clears) are testable without a cluster.

use crate::constants;
use crate::controller::reconciler::types::Reconciler;
use crate::crd::{Condition, Jenkins};
use kube::api::{Patch, PatchParams};
use kube::Api;
use tracing::{debug, info};

/// Mark base configuration complete against the given pod identity
pub async fn set_base_configuration_completed(
    reconciler: &Reconciler,
    jenkins: &Jenkins,
    pod_identity: &str,
) -> Result<(), kube::Error> {
    let current = jenkins.status.as_ref();
    let already_recorded = current
        .is_some_and(|s| {
            s.base_configuration_completed_time.is_some()
                && s.provisioned_by.as_deref() == Some(pod_identity)
        });
    if already_recorded {
        debug!("Base configuration already recorded for this pod identity, skipping patch");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();
    info!("Base configuration completed at {now}");
    let patch = base_configuration_completed_patch(jenkins, pod_identity, &now);
    patch_status(reconciler, jenkins, patch).await
}

/// Clear base configuration after the tracked pod identity stopped matching
/// the live pod
///
/// Stays cleared until base configuration re-runs successfully against the
/// replacement pod. The customization hash is cleared too: the replacement
/// instance starts blank, so user configuration must re-run even when the
/// declared customization is unchanged and the recovery spans several
/// reconciles. The user configuration completion time is left intact as
/// history.
pub async fn clear_base_configuration(
    reconciler: &Reconciler,
    jenkins: &Jenkins,
) -> Result<(), kube::Error> {
    let nothing_recorded = jenkins.status.as_ref().is_none_or(|s| {
        s.base_configuration_completed_time.is_none()
            && s.provisioned_by.is_none()
            && s.user_configuration_hash.is_none()
    });
    if nothing_recorded {
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();
    info!("Master pod was replaced, clearing base configuration milestone");
    patch_status(reconciler, jenkins, base_configuration_cleared_patch(&now)).await
}

/// Mark user configuration complete with the hash of what was applied
pub async fn set_user_configuration_completed(
    reconciler: &Reconciler,
    jenkins: &Jenkins,
    customization_hash: &str,
) -> Result<(), kube::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    info!("User configuration completed at {now}");
    let patch = user_configuration_completed_patch(jenkins, customization_hash, &now);
    patch_status(reconciler, jenkins, patch).await
}

/// Merge patch recording the base configuration milestone
pub fn base_configuration_completed_patch(
    jenkins: &Jenkins,
    pod_identity: &str,
    now: &str,
) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "baseConfigurationCompletedTime": now,
            "provisionedBy": pod_identity,
            "observedGeneration": jenkins.metadata.generation,
            "lastReconcileTime": now,
            "conditions": [ready_condition(
                "False",
                "BaseConfigurationCompleted",
                "Jenkins is reachable, user configuration pending",
                now,
            )],
        }
    })
}

/// Merge patch un-recording base configuration after pod replacement
///
/// Nulls the pod identity and the customization hash; omits the user
/// configuration completion time so the merge leaves it untouched.
pub fn base_configuration_cleared_patch(now: &str) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "baseConfigurationCompletedTime": null,
            "provisionedBy": null,
            "userConfigurationHash": null,
            "lastReconcileTime": now,
            "conditions": [ready_condition(
                "False",
                "PodReplaced",
                "Master pod was recreated, configuration will re-run",
                now,
            )],
        }
    })
}

/// Merge patch recording the user configuration milestone
pub fn user_configuration_completed_patch(
    jenkins: &Jenkins,
    customization_hash: &str,
    now: &str,
) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "userConfigurationCompletedTime": now,
            "userConfigurationHash": customization_hash,
            "observedGeneration": jenkins.metadata.generation,
            "lastReconcileTime": now,
            "conditions": [ready_condition(
                "True",
                "UserConfigurationCompleted",
                "All customization applied",
                now,
            )],
        }
    })
}

async fn patch_status(
    reconciler: &Reconciler,
    jenkins: &Jenkins,
    patch: serde_json::Value,
) -> Result<(), kube::Error> {
    let api: Api<Jenkins> = Api::namespaced(
        reconciler.client.clone(),
        jenkins.metadata.namespace.as_deref().unwrap_or("default"),
    );
    api.patch_status(
        jenkins.metadata.name.as_deref().unwrap_or_default(),
        &PatchParams::apply(constants::FIELD_MANAGER),
        &Patch::Merge(patch),
    )
    .await?;
    Ok(())
}

fn ready_condition(status: &str, reason: &str, message: &str, now: &str) -> Condition {
    Condition {
        r#type: "Ready".to_string(),
        status: status.to_string(),
        last_transition_time: Some(now.to_string()),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
    }
}
