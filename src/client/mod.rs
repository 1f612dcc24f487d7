//! # Jenkins Remote Execution Client
//!
//! Authenticated HTTP client for a live Jenkins instance: script console
//! execution, safe restart, and readiness polling.
//!
//! The client performs no implicit retries; retry policy belongs to the
//! reconciler. Script executions against one instance are serialized so two
//! scripts never interleave their side effects (the script console is a single
//! logical resource per instance).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the Jenkins client
///
/// Script exceptions inside the target surface as `GroovyScriptFailed` with the
/// full console output retained for diagnosis; they are never folded into
/// generic transport errors.
#[derive(Debug, Error)]
pub enum JenkinsClientError {
    /// Instance unreachable (connection refused, timeout, DNS). Retryable.
    #[error("Jenkins is unreachable: {0}")]
    Unreachable(String),
    /// Credentials rejected by Jenkins. A configuration problem, not retried
    /// by the client.
    #[error("authentication rejected by Jenkins (HTTP {status})")]
    Unauthorized { status: u16 },
    /// The submitted script raised an exception inside Jenkins
    #[error("groovy script raised an exception, output:\n{output}")]
    GroovyScriptFailed { output: String },
    /// Jenkins did not become reachable within the allotted time
    #[error("timed out after {0:?} waiting for Jenkins to become ready")]
    WaitTimedOut(Duration),
    /// Any other unexpected API response
    #[error("unexpected Jenkins API response: HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

/// Executes groovy script text against a Jenkins instance
///
/// The user configuration pipeline is written against this trait so it can be
/// exercised with a fake executor in tests.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Execute script text, returning the full console output on success
    async fn execute_script(&self, script: &str) -> Result<String, JenkinsClientError>;
}

/// CSRF crumb issued by Jenkins, echoed back on mutating requests
#[derive(Debug, Deserialize)]
struct Crumb {
    #[serde(rename = "crumbRequestField")]
    field: String,
    crumb: String,
}

/// Authenticated client for one Jenkins instance
#[derive(Debug)]
pub struct JenkinsClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
    /// Serializes script console calls against this instance
    console: tokio::sync::Mutex<()>,
}

impl JenkinsClient {
    /// Create a client for the instance at `base_url` (no trailing slash),
    /// authenticating with the given user and API token.
    pub fn new(base_url: &str, user: &str, token: &str) -> Result<Self, JenkinsClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            token: token.to_string(),
            console: tokio::sync::Mutex::new(()),
        })
    }

    /// Fetch a CSRF crumb. Returns `None` when the crumb issuer is disabled.
    async fn fetch_crumb(&self) -> Result<Option<Crumb>, JenkinsClientError> {
        let url = format!("{}/crumbIssuer/api/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.user, Some(&self.token))
            .send()
            .await
            .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;

        match response.status().as_u16() {
            200 => {
                let crumb: Crumb = response
                    .json()
                    .await
                    .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;
                Ok(Some(crumb))
            }
            // Crumb issuer disabled on this instance
            404 => Ok(None),
            401 | 403 => Err(JenkinsClientError::Unauthorized {
                status: response.status().as_u16(),
            }),
            status => Err(JenkinsClientError::UnexpectedStatus { status }),
        }
    }

    /// Request a graceful restart that drains running work before restarting.
    ///
    /// Previously-applied configuration survives a safe restart; callers poll
    /// [`JenkinsClient::wait_for_restart_completion`] afterwards.
    pub async fn safe_restart(&self) -> Result<(), JenkinsClientError> {
        let crumb = self.fetch_crumb().await?;
        let url = format!("{}/safeRestart", self.base_url);

        let mut request = self
            .http
            .post(&url)
            .basic_auth(&self.user, Some(&self.token));
        if let Some(crumb) = &crumb {
            request = request.header(crumb.field.as_str(), crumb.crumb.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;

        let status = response.status();
        // Jenkins answers the restart request with a redirect; 503 means the
        // restart already began before the response was written
        if status.is_success() || status.is_redirection() || status.as_u16() == 503 {
            debug!("Safe restart accepted by {}", self.base_url);
            Ok(())
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(JenkinsClientError::Unauthorized {
                status: status.as_u16(),
            })
        } else {
            Err(JenkinsClientError::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }

    /// Single reachability probe against the Jenkins API
    ///
    /// `Ok(true)` when the instance answers, `Ok(false)` when it is not up yet
    /// (connection errors, 5xx while starting). Credential rejection is a hard
    /// error so misconfiguration is not retried forever.
    pub async fn is_ready(&self) -> Result<bool, JenkinsClientError> {
        let url = format!("{}/api/json", self.base_url);
        match self
            .http
            .get(&url)
            .basic_auth(&self.user, Some(&self.token))
            .send()
            .await
        {
            Ok(response) => match response.status().as_u16() {
                200 => Ok(true),
                401 | 403 => Err(JenkinsClientError::Unauthorized {
                    status: response.status().as_u16(),
                }),
                _ => Ok(false),
            },
            Err(_) => Ok(false),
        }
    }

    /// Poll the instance at a fixed interval until it answers or the overall
    /// timeout elapses
    pub async fn wait_until_ready(
        &self,
        interval: Duration,
        timeout: Duration,
    ) -> Result<(), JenkinsClientError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_ready().await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(
                    "Jenkins at {} did not become ready within {:?}",
                    self.base_url, timeout
                );
                return Err(JenkinsClientError::WaitTimedOut(timeout));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Poll until the instance is reachable again after a safe restart
    pub async fn wait_for_restart_completion(
        &self,
        timeout: Duration,
    ) -> Result<(), JenkinsClientError> {
        self.wait_until_ready(
            Duration::from_secs(crate::constants::DEFAULT_READY_POLL_INTERVAL_SECS),
            timeout,
        )
        .await
    }
}

#[async_trait]
impl ScriptExecutor for JenkinsClient {
    /// Execute script text via the Jenkins script console
    ///
    /// The script console always answers HTTP 200, even when the script throws:
    /// the exception lands in the textual output. A verifier line is appended
    /// to the submitted script, so an output that does not end with the
    /// verifier token means the script aborted before its last statement.
    async fn execute_script(&self, script: &str) -> Result<String, JenkinsClientError> {
        let _guard = self.console.lock().await;

        let crumb = self.fetch_crumb().await?;
        let token = verification_token(script);
        let submitted = format!("{script}\nprintln '{token}'");

        let url = format!("{}/scriptText", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .basic_auth(&self.user, Some(&self.token))
            .form(&[("script", submitted.as_str())]);
        if let Some(crumb) = &crumb {
            request = request.header(crumb.field.as_str(), crumb.crumb.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let output = response
                    .text()
                    .await
                    .map_err(|e| JenkinsClientError::Unreachable(e.to_string()))?;
                if script_output_verified(&output, &token) {
                    // Hand back the output without the verifier line
                    Ok(strip_verification_token(&output, &token))
                } else {
                    Err(JenkinsClientError::GroovyScriptFailed { output })
                }
            }
            401 | 403 => Err(JenkinsClientError::Unauthorized { status }),
            _ => Err(JenkinsClientError::UnexpectedStatus { status }),
        }
    }
}

/// Verifier token appended to every submitted script
///
/// Content-derived so the same script always carries the same token.
pub fn verification_token(script: &str) -> String {
    format!("jenkins-operator-verify-{:x}", md5::compute(script))
}

/// Whether the console output proves the script ran to completion
pub fn script_output_verified(output: &str, token: &str) -> bool {
    output.trim_end().ends_with(token)
}

/// Remove the trailing verifier line from console output
pub fn strip_verification_token(output: &str, token: &str) -> String {
    let trimmed = output.trim_end();
    trimmed
        .strip_suffix(token)
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}
