//! # Custom Resource Definitions
//!
//! CRD types for the Jenkins Operator.
//!
//! This module contains the `Jenkins` Custom Resource Definition and its
//! related types: seed job descriptors, customization references, and the
//! master pod settings the operator passes through to the provisioned pod.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

pub mod status;

pub use status::{Condition, JenkinsStatus};

/// Jenkins Custom Resource Definition
///
/// Declares a desired Jenkins deployment: the master pod settings, seed jobs,
/// and declarative customization (groovy scripts and configuration-as-code)
/// the operator applies against the live instance.
///
/// # Example
///
/// ```yaml
/// apiVersion: jenkins.io/v1alpha2
/// kind: Jenkins
/// metadata:
///   name: example
///   namespace: default
/// spec:
///   master:
///     image: jenkins/jenkins:lts
///   seedJobs:
///     - id: ops
///       targets: "cicd/jobs/*.jenkins"
///       repositoryUrl: https://github.com/example/ops-jobs.git
///       repositoryBranch: master
///   groovyScripts:
///     customization:
///       configurations:
///         - name: jenkins-groovy
///       secret:
///         name: jenkins-secrets
/// ```
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Jenkins",
    group = "jenkins.io",
    version = "v1alpha2",
    namespaced,
    status = "JenkinsStatus",
    shortname = "jk",
    printcolumn = r#"{"name":"BaseConfigured", "type":"string", "jsonPath":".status.baseConfigurationCompletedTime"}, {"name":"UserConfigured", "type":"string", "jsonPath":".status.userConfigurationCompletedTime"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsSpec {
    /// Jenkins master pod settings
    #[serde(default)]
    pub master: JenkinsMaster,
    /// Seed jobs to define inside the instance, applied in declared order.
    /// The `id` of each seed job must be unique within one resource.
    #[serde(default)]
    pub seed_jobs: Vec<SeedJob>,
    /// Groovy script customization applied via the Jenkins script console
    #[serde(default)]
    pub groovy_scripts: GroovyScripts,
    /// Configuration-as-code customization applied via the Jenkins script console
    #[serde(default)]
    pub configuration_as_code: ConfigurationAsCode,
}

/// Jenkins master pod settings
///
/// These are pass-through provisioning parameters: the operator copies them
/// onto the master pod but does not interpret them beyond that.
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsMaster {
    /// Jenkins container image (default: jenkins/jenkins:lts)
    #[serde(default)]
    pub image: Option<String>,
    /// Liveness probe parameters for the master container
    #[serde(default)]
    pub liveness_probe: Option<LivenessProbe>,
    /// Scheduling priority class for the master pod
    #[serde(default)]
    pub priority_class_name: Option<String>,
}

/// HTTP liveness probe parameters, copied onto the master container
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LivenessProbe {
    /// HTTP path to probe (default: /login)
    #[serde(default)]
    pub path: Option<String>,
    /// Seconds to wait before the first probe
    #[serde(default)]
    pub initial_delay_seconds: Option<i32>,
    /// Per-probe timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<i32>,
    /// Seconds between probes
    #[serde(default)]
    pub period_seconds: Option<i32>,
    /// Consecutive failures before the pod is restarted
    #[serde(default)]
    pub failure_threshold: Option<i32>,
    /// Consecutive successes before the probe is considered passing
    #[serde(default)]
    pub success_threshold: Option<i32>,
}

/// Seed job descriptor
///
/// A seed job is a job DSL job that, when built, generates other jobs from
/// definitions stored in a repository. Re-declaring the same `id` replaces the
/// existing seed job inside the instance rather than creating a duplicate.
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedJob {
    /// Unique identifier, stable across reconciliations. Used as the Jenkins
    /// job name, so re-applying updates the existing job in place.
    pub id: String,
    /// Jenkins credential id used to check out the repository
    #[serde(default)]
    pub credential_id: Option<String>,
    /// Type of the bound credential
    #[serde(default)]
    pub credential_type: JenkinsCredentialType,
    /// Git repository holding the job definition files
    pub repository_url: String,
    /// Branch to check out (default: master)
    #[serde(default = "default_repository_branch")]
    pub repository_branch: String,
    /// Glob pattern selecting job definition files inside the repository
    pub targets: String,
    /// Human-readable job description
    #[serde(default)]
    pub description: Option<String>,
    /// Cron spec for SCM polling (unset disables polling)
    #[serde(default)]
    pub poll_scm: Option<String>,
    /// Cron spec for periodic builds (unset disables them)
    #[serde(default)]
    pub build_periodically: Option<String>,
    /// Fail the seed build when a plugin required by a definition is missing
    #[serde(default)]
    pub fail_on_missing_plugin: bool,
    /// Ignore definition files matched by `targets` that do not exist
    #[serde(default)]
    pub ignore_missing_files: bool,
    /// Mark the seed build unstable when deprecated DSL features are used
    #[serde(default)]
    pub unstable_on_deprecation: bool,
    /// Trigger the seed job from GitHub push events
    #[serde(default)]
    pub github_push_trigger: bool,
    /// Additional classpath entries for DSL script execution
    #[serde(default)]
    pub additional_classpath: Option<String>,
}

/// Type of Jenkins credential bound to a seed job
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum JenkinsCredentialType {
    /// No credential; the repository is publicly accessible
    #[default]
    NoCredential,
    /// Username and password credential
    UsernamePassword,
    /// SSH private key credential
    BasicSshUserPrivateKey,
    /// Credential provisioned outside the operator, referenced by id only
    ExternalSecret,
}

impl JenkinsCredentialType {
    /// Whether this credential type requires a `credential_id` to be declared
    pub fn requires_credential_id(&self) -> bool {
        !matches!(self, JenkinsCredentialType::NoCredential)
    }
}

/// Groovy script customization
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroovyScripts {
    /// Script sources and substitution variables
    #[serde(default)]
    pub customization: Customization,
}

/// Configuration-as-code customization
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationAsCode {
    /// Document sources and substitution variables
    #[serde(default)]
    pub customization: Customization,
}

/// Customization: an ordered sequence of ConfigMap references plus at most one
/// Secret reference
///
/// ConfigMap bodies are concatenated in declared order; the Secret's key/value
/// pairs become `${KEY}` substitution variables resolved before execution, so
/// secret values never need to be embedded in the ConfigMap sources.
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    /// ConfigMaps holding script/document bodies, applied in declared order
    #[serde(default)]
    pub configurations: Vec<ConfigMapRef>,
    /// Secret holding substitution variables
    #[serde(default)]
    pub secret: Option<SecretRef>,
}

/// Reference to a ConfigMap in the resource namespace
#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapRef {
    /// ConfigMap name
    pub name: String,
}

/// Reference to a Secret in the resource namespace
#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    /// Secret name
    pub name: String,
}

fn default_repository_branch() -> String {
    "master".to_string()
}
