//! # Reconciler
//!
//! The orchestrating state machine. Each reconcile inspects the live pod, the
//! persisted phase milestones, and the declared spec, then drives exactly the
//! steps needed to converge:
//!
//! ```text
//! Unprovisioned -> BaseConfigInProgress -> BaseConfigComplete
//!               -> UserConfigInProgress -> UserConfigComplete (steady)
//!
//! any state --(pod identity changed)--> BaseConfigInProgress
//! ```
//!
//! Reconciles for one resource are strictly serialized and pending triggers
//! coalesce (guaranteed by the controller runtime); reconciles for distinct
//! resources run independently.

use crate::client::{JenkinsClient, JenkinsClientError};
use crate::configuration::base;
use crate::configuration::user::{self, resolver, ResolvedCustomization};
use crate::constants;
use crate::crd::{Jenkins, JenkinsStatus};
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod status;
pub mod types;
pub mod validation;

pub use types::{BackoffState, JenkinsOperatorConfig, Reconciler, ReconcilerError};

/// True when recorded base configuration no longer matches the live pod
///
/// An unprovisioned resource has nothing to invalidate.
pub fn base_configuration_invalidated(recorded: &JenkinsStatus, live_identity: &str) -> bool {
    recorded.base_configuration_completed_time.is_some()
        && !base::identity_matches(recorded.provisioned_by.as_deref(), live_identity)
}

/// Decide whether the user configuration sequence must run this pass
///
/// Runs when it never completed, when the customization hash stopped matching
/// (a hash cleared by pod replacement never matches, so an interrupted
/// recovery resumes on the next pass), or when base configuration just
/// completed against a fresh pod.
pub fn needs_user_configuration(
    recorded: &JenkinsStatus,
    base_completed_this_pass: bool,
    customization_hash: &str,
) -> bool {
    base_completed_this_pass
        || recorded.user_configuration_completed_time.is_none()
        || recorded.user_configuration_hash.as_deref() != Some(customization_hash)
}

/// Reconcile one `Jenkins` resource
///
/// Transient conditions (pod still starting, instance not yet answering) end
/// the pass with a short requeue rather than an error; only configuration and
/// cluster errors escalate to the error policy.
pub async fn reconcile(
    jenkins: Arc<Jenkins>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = jenkins.metadata.name.as_deref().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.as_deref().unwrap_or("default");
    let resource_key = format!("{namespace}/{name}");

    // Deletion cancels in-flight work; owned objects are garbage-collected
    // through their owner references
    if jenkins.metadata.deletion_timestamp.is_some() {
        info!("{resource_key} is being deleted, skipping reconcile");
        return Ok(Action::await_change());
    }

    validation::validate_jenkins_spec(&jenkins)
        .map_err(|e| ReconcilerError::InvalidSpec(format!("{e:#}")))?;

    let (user_name, token) = base::ensure_operator_credentials(&ctx.client, &jenkins)
        .await
        .map_err(ReconcilerError::ConfigurationFailed)?;

    let pod = base::ensure_base_resources(&ctx.client, &jenkins).await?;
    let Some(identity) = base::pod_identity(&pod) else {
        debug!("{resource_key}: master pod has no identity yet, requeueing");
        return Ok(Action::requeue(ctx.config.transient_requeue));
    };

    let recorded = jenkins.status.clone().unwrap_or_default();
    let mut base_completed = recorded.base_configuration_completed_time.is_some();

    // Out-of-band pod replacement invalidates base configuration immediately
    if base_configuration_invalidated(&recorded, &identity) {
        warn!(
            "{resource_key}: master pod identity changed (recorded {:?}, live {identity})",
            recorded.provisioned_by
        );
        status::clear_base_configuration(&ctx, &jenkins).await?;
        base_completed = false;
    }

    let jenkins_url = base::jenkins_api_url(&jenkins);
    let client = JenkinsClient::new(&jenkins_url, &user_name, &token)
        .map_err(|e| ReconcilerError::ConfigurationFailed(anyhow::Error::new(e)))?;

    let mut base_completed_this_pass = false;
    if !base_completed {
        if !base::is_pod_running(&pod) {
            debug!("{resource_key}: master pod is not running yet, requeueing");
            return Ok(Action::requeue(ctx.config.transient_requeue));
        }

        match client
            .wait_until_ready(ctx.config.ready_poll_interval, ctx.config.ready_timeout)
            .await
        {
            Ok(()) => {
                status::set_base_configuration_completed(&ctx, &jenkins, &identity).await?;
                base_completed_this_pass = true;
            }
            Err(JenkinsClientError::Unauthorized { .. }) => {
                return Err(ReconcilerError::Unauthorized);
            }
            Err(_) => {
                // Not ready within this pass's budget; retryable, no status
                // mutation
                info!("{resource_key}: Jenkins not ready yet, requeueing");
                return Ok(Action::requeue(ctx.config.transient_requeue));
            }
        }
    }

    // Resolve customization up front: the hash decides whether user
    // configuration needs to run at all. Missing references become
    // configuration errors; other API failures stay cluster errors.
    let groovy_source = resolver::resolve_customization(
        &ctx.client,
        namespace,
        &jenkins.spec.groovy_scripts.customization,
        constants::GROOVY_SCRIPT_KEY,
    )
    .await?;
    let casc_source = resolver::resolve_customization(
        &ctx.client,
        namespace,
        &jenkins.spec.configuration_as_code.customization,
        constants::CONFIGURATION_AS_CODE_KEY,
    )
    .await?;

    let resolved = ResolvedCustomization {
        groovy_source,
        casc_source,
    };
    let hash = user::customization_hash(&resolved, &jenkins.spec.seed_jobs);

    if needs_user_configuration(&recorded, base_completed_this_pass, &hash) {
        info!("{resource_key}: running user configuration sequence");
        if let Err(e) = user::apply_user_configuration(&client, &resolved, &jenkins.spec.seed_jobs).await
        {
            return match e {
                JenkinsClientError::Unreachable(_) | JenkinsClientError::WaitTimedOut(_) => {
                    info!("{resource_key}: Jenkins became unreachable mid-configuration, requeueing");
                    Ok(Action::requeue(ctx.config.transient_requeue))
                }
                JenkinsClientError::Unauthorized { .. } => Err(ReconcilerError::Unauthorized),
                other => Err(ReconcilerError::ConfigurationFailed(anyhow::Error::new(
                    other,
                ))),
            };
        }
        status::set_user_configuration_completed(&ctx, &jenkins, &hash).await?;
    } else {
        debug!("{resource_key}: steady state, customization unchanged");
    }

    ctx.clear_backoff(&resource_key);
    Ok(Action::requeue(ctx.config.resync_period))
}
