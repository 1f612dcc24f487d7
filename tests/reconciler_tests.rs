//! # Reconciler Gating Tests
//!
//! Tests for the pure decisions driving the configuration state machine:
//! when a recorded base configuration is invalidated by a replaced pod, which
//! fields each status patch records and clears, and when the user
//! configuration sequence must run. Includes the recovery path where a pod
//! replacement is followed by an interrupted pass, which must still converge
//! to a configured instance.

use jenkins_operator::configuration::user::resolver::ResolveError;
use jenkins_operator::controller::reconciler::status::{
    base_configuration_cleared_patch, base_configuration_completed_patch,
    user_configuration_completed_patch,
};
use jenkins_operator::controller::reconciler::{
    base_configuration_invalidated, needs_user_configuration, ReconcilerError,
};
use jenkins_operator::crd::{Jenkins, JenkinsSpec, JenkinsStatus};

const OLD_POD: &str = "11111111-aaaa/2026-08-01T00:00:00Z";
const NEW_POD: &str = "22222222-bbbb/2026-08-02T00:00:00Z";
const HASH: &str = "d41d8cd98f00b204e9800998ecf8427e";

fn steady_state_status() -> JenkinsStatus {
    JenkinsStatus {
        base_configuration_completed_time: Some("2026-08-01T00:05:00Z".to_string()),
        user_configuration_completed_time: Some("2026-08-01T00:06:00Z".to_string()),
        provisioned_by: Some(OLD_POD.to_string()),
        user_configuration_hash: Some(HASH.to_string()),
        ..Default::default()
    }
}

/// Apply a status merge patch the way the API server would: present keys
/// overwrite, nulls remove, absent keys stay untouched
fn merge_patched(status: &JenkinsStatus, patch: &serde_json::Value) -> JenkinsStatus {
    let mut doc = serde_json::to_value(status).expect("status serializes");
    let target = doc.as_object_mut().expect("status is an object");
    let source = patch["status"].as_object().expect("patch has a status object");
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
    serde_json::from_value(doc).expect("merged status deserializes")
}

#[test]
fn test_unprovisioned_resource_is_not_invalidated() {
    let recorded = JenkinsStatus::default();
    assert!(!base_configuration_invalidated(&recorded, NEW_POD));
}

#[test]
fn test_matching_pod_identity_keeps_base_configuration() {
    let recorded = steady_state_status();
    assert!(!base_configuration_invalidated(&recorded, OLD_POD));
}

#[test]
fn test_replaced_pod_invalidates_base_configuration() {
    let recorded = steady_state_status();
    assert!(base_configuration_invalidated(&recorded, NEW_POD));
}

#[test]
fn test_fresh_resource_needs_user_configuration() {
    let recorded = JenkinsStatus::default();
    assert!(needs_user_configuration(&recorded, false, HASH));
}

#[test]
fn test_steady_state_skips_user_configuration() {
    let recorded = steady_state_status();
    assert!(!needs_user_configuration(&recorded, false, HASH));
}

#[test]
fn test_changed_customization_reruns_user_configuration() {
    let recorded = steady_state_status();
    assert!(needs_user_configuration(&recorded, false, "0123456789abcdef"));
}

#[test]
fn test_base_completion_in_same_pass_forces_user_configuration() {
    // A fresh instance carries nothing even when the recorded hash matches
    let recorded = steady_state_status();
    assert!(needs_user_configuration(&recorded, true, HASH));
}

#[test]
fn test_cleared_patch_removes_identity_and_customization_hash() {
    let patch = base_configuration_cleared_patch("2026-08-02T00:00:05Z");
    let status = patch["status"].as_object().unwrap();
    assert!(status["baseConfigurationCompletedTime"].is_null());
    assert!(status["provisionedBy"].is_null());
    assert!(status["userConfigurationHash"].is_null());
    // The completion time is history and survives the merge untouched
    assert!(!status.contains_key("userConfigurationCompletedTime"));
}

#[test]
fn test_completed_patches_record_milestones() {
    let jenkins = Jenkins::new("example", JenkinsSpec::default());
    let base = base_configuration_completed_patch(&jenkins, NEW_POD, "2026-08-02T00:01:00Z");
    assert_eq!(base["status"]["provisionedBy"], NEW_POD);
    assert_eq!(
        base["status"]["baseConfigurationCompletedTime"],
        "2026-08-02T00:01:00Z"
    );

    let user = user_configuration_completed_patch(&jenkins, HASH, "2026-08-02T00:02:00Z");
    assert_eq!(user["status"]["userConfigurationHash"], HASH);
    assert_eq!(
        user["status"]["userConfigurationCompletedTime"],
        "2026-08-02T00:02:00Z"
    );
}

#[test]
fn test_interrupted_recovery_still_reapplies_user_configuration() {
    // Steady state recorded against the old pod, then the pod is replaced
    let recorded = steady_state_status();
    assert!(base_configuration_invalidated(&recorded, NEW_POD));

    // The replacement clears the base milestone and the hash
    let cleared = merge_patched(&recorded, &base_configuration_cleared_patch("2026-08-02T00:00:05Z"));
    assert!(cleared.base_configuration_completed_time.is_none());
    assert!(cleared.user_configuration_hash.is_none());
    assert!(cleared.user_configuration_completed_time.is_some());

    // Base configuration re-runs against the new pod, but the pass is cut
    // short before user configuration completes. The next pass starts with
    // base complete and nothing completed in-pass; the cleared hash alone
    // must force the user configuration sequence even though the declared
    // customization never changed.
    let recovered = merge_patched(
        &cleared,
        &base_configuration_completed_patch(
            &Jenkins::new("example", JenkinsSpec::default()),
            NEW_POD,
            "2026-08-02T00:01:00Z",
        ),
    );
    assert!(!base_configuration_invalidated(&recovered, NEW_POD));
    assert!(needs_user_configuration(&recovered, false, HASH));
}

#[test]
fn test_missing_configmap_is_a_configuration_error() {
    let error = ReconcilerError::from(ResolveError::ConfigMapNotFound {
        namespace: "default".to_string(),
        name: "jenkins-groovy".to_string(),
    });
    assert!(matches!(error, ReconcilerError::ConfigurationFailed(_)));
    assert!(error.to_string().contains("does not exist"));
}

#[test]
fn test_missing_secret_is_a_configuration_error() {
    let error = ReconcilerError::from(ResolveError::SecretNotFound {
        namespace: "default".to_string(),
        name: "jenkins-secrets".to_string(),
    });
    assert!(matches!(error, ReconcilerError::ConfigurationFailed(_)));
}

#[test]
fn test_api_failure_during_resolution_stays_a_cluster_error() {
    let api_error = kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: "etcdserver: request timed out".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    });
    let error = ReconcilerError::from(ResolveError::Kube(api_error));
    assert!(matches!(error, ReconcilerError::Kube(_)));
}
