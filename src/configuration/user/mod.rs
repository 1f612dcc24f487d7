//! # User Configuration
//!
//! Applies declarative customization against a reachable Jenkins instance,
//! strictly ordered: groovy scripts, then configuration-as-code, then seed
//! jobs. Scripts may establish security or authorization prerequisites the
//! later steps depend on, so the order is never varied.
//!
//! Every step is idempotent, so the whole sequence is safe to repeat on the
//! next reconcile after a partial failure. The completion milestone is only
//! recorded by the caller once every step in one pass has succeeded.

use crate::client::{JenkinsClientError, ScriptExecutor};
use crate::crd::SeedJob;
use tracing::{debug, info};

pub mod groovy;
pub mod resolver;
pub mod seed_jobs;

/// Fully-resolved customization content, ready for the script console
#[derive(Debug, Clone, Default)]
pub struct ResolvedCustomization {
    /// Concatenated, substituted groovy script body
    pub groovy_source: String,
    /// Concatenated, substituted configuration-as-code document
    pub casc_source: String,
}

/// Hash of everything user configuration applies
///
/// Computed over the resolved content rather than the raw references, so an
/// edit inside a referenced ConfigMap or Secret re-triggers application even
/// though the resource spec itself did not change.
pub fn customization_hash(resolved: &ResolvedCustomization, seed_jobs: &[SeedJob]) -> String {
    let descriptors = serde_json::to_string(seed_jobs).unwrap_or_default();
    let content = format!(
        "groovy:{}\ncasc:{}\nseed-jobs:{descriptors}",
        resolved.groovy_source, resolved.casc_source
    );
    format!("{:x}", md5::compute(content))
}

/// Run the user configuration sequence against the instance
///
/// Returns on the first failing step; nothing later in the sequence runs in
/// that pass. Empty customization bodies are skipped, seed jobs apply in
/// declared order.
pub async fn apply_user_configuration(
    executor: &dyn ScriptExecutor,
    resolved: &ResolvedCustomization,
    seed_jobs: &[SeedJob],
) -> Result<(), JenkinsClientError> {
    if resolved.groovy_source.trim().is_empty() {
        debug!("No groovy customization declared, skipping");
    } else {
        info!("Applying groovy script customization");
        executor.execute_script(&resolved.groovy_source).await?;
    }

    if resolved.casc_source.trim().is_empty() {
        debug!("No configuration-as-code customization declared, skipping");
    } else {
        info!("Applying configuration-as-code customization");
        executor
            .execute_script(&groovy::configuration_as_code_script(&resolved.casc_source))
            .await?;
    }

    for seed_job in seed_jobs {
        info!("Applying seed job '{}'", seed_job.id);
        executor
            .execute_script(&seed_jobs::seed_job_script(seed_job))
            .await?;
    }

    Ok(())
}
