//! # Validation
//!
//! Validates `Jenkins` resource specs before any remote work runs.
//!
//! A malformed spec is a configuration error: the reconcile fails with a
//! diagnostic, phase milestones stay unset, and the operator keeps retrying
//! so a fixed spec converges on its own.

use crate::crd::Jenkins;
use anyhow::{bail, Result};
use std::collections::HashSet;

/// Validate a Jenkins spec
pub fn validate_jenkins_spec(jenkins: &Jenkins) -> Result<()> {
    let mut seen_ids = HashSet::new();
    for seed_job in &jenkins.spec.seed_jobs {
        if seed_job.id.trim().is_empty() {
            bail!("seed job with empty id");
        }
        if !seen_ids.insert(seed_job.id.as_str()) {
            bail!(
                "seed job id '{}' is declared more than once; ids must be unique",
                seed_job.id
            );
        }
        if seed_job.repository_url.trim().is_empty() {
            bail!("seed job '{}' has an empty repositoryUrl", seed_job.id);
        }
        if seed_job.repository_branch.trim().is_empty() {
            bail!("seed job '{}' has an empty repositoryBranch", seed_job.id);
        }
        if seed_job.targets.trim().is_empty() {
            bail!("seed job '{}' has an empty targets pattern", seed_job.id);
        }
        if seed_job.credential_type.requires_credential_id()
            && seed_job
                .credential_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            bail!(
                "seed job '{}' declares credential type {:?} but no credentialId",
                seed_job.id,
                seed_job.credential_type
            );
        }
    }

    for reference in jenkins
        .spec
        .groovy_scripts
        .customization
        .configurations
        .iter()
        .chain(
            jenkins
                .spec
                .configuration_as_code
                .customization
                .configurations
                .iter(),
        )
    {
        if reference.name.trim().is_empty() {
            bail!("customization references a ConfigMap with an empty name");
        }
    }

    Ok(())
}
