//! # Constants
//!
//! Well-known names, keys, ports, and timing defaults used across the operator.

/// Field manager name used for status and resource patches
pub const FIELD_MANAGER: &str = "jenkins-operator";

/// Label applied to every resource the operator creates
pub const APP_LABEL_VALUE: &str = "jenkins-operator";

/// Default Jenkins master container image
pub const DEFAULT_JENKINS_IMAGE: &str = "jenkins/jenkins:lts";

/// Name of the Jenkins master container inside the master pod
pub const JENKINS_MASTER_CONTAINER_NAME: &str = "jenkins-master";

/// Jenkins HTTP port (web UI and API)
pub const JENKINS_HTTP_PORT: i32 = 8080;

/// Jenkins agent (inbound/JNLP) listener port
pub const JENKINS_AGENT_PORT: i32 = 50000;

/// ConfigMap key holding a groovy customization script body
pub const GROOVY_SCRIPT_KEY: &str = "script.groovy";

/// ConfigMap key holding a configuration-as-code document
pub const CONFIGURATION_AS_CODE_KEY: &str = "configuration.yaml";

/// Key in the operator credentials secret holding the Jenkins user name
pub const CREDENTIALS_USER_KEY: &str = "user";

/// Key in the operator credentials secret holding the Jenkins API token
pub const CREDENTIALS_TOKEN_KEY: &str = "token";

/// Default Jenkins user the operator authenticates as
pub const DEFAULT_OPERATOR_USER: &str = "jenkins-operator";

/// Interval between liveness probes while waiting for Jenkins to come up
pub const DEFAULT_READY_POLL_INTERVAL_SECS: u64 = 5;

/// Overall per-reconcile budget for waiting on Jenkins readiness.
/// On timeout the reconcile ends and is requeued; it does not fail permanently.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 120;

/// Requeue delay for transient conditions (instance not yet reachable)
pub const DEFAULT_TRANSIENT_REQUEUE_SECS: u64 = 30;

/// Periodic resync interval in steady state
pub const DEFAULT_RESYNC_PERIOD_SECS: u64 = 300;

/// Fallback requeue delay when backoff state is unavailable
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;
