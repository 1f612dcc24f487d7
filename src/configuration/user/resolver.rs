//! # Configuration Source Resolver
//!
//! Resolves a [`Customization`](crate::crd::Customization) into a single
//! script/document body: referenced ConfigMap bodies are concatenated in
//! declared order and `${NAME}` placeholders are substituted from the
//! referenced secret's key/value pairs before anything reaches the script
//! console. Secret values therefore never need to be embedded in the
//! ConfigMap sources.
//!
//! Missing references fail loudly; content is never silently dropped.

use crate::crd::Customization;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{Api, Client};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Matches `${NAME}` placeholders with identifier-shaped names
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Resolution failures
///
/// Missing references and malformed content are problems in the declared
/// customization; the user fixes them by correcting the referenced objects.
/// Any other Kubernetes API failure (timeout, server error) passes through
/// as [`ResolveError::Kube`] so callers keep treating it as retryable
/// cluster trouble rather than a broken customization.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A referenced ConfigMap was not found in the namespace
    #[error("referenced ConfigMap {namespace}/{name} does not exist")]
    ConfigMapNotFound { namespace: String, name: String },
    /// A referenced ConfigMap exists but lacks the well-known body key
    #[error("ConfigMap {namespace}/{name} has no '{key}' key")]
    MissingBodyKey {
        namespace: String,
        name: String,
        key: String,
    },
    /// The referenced variables Secret was not found in the namespace
    #[error("referenced Secret {namespace}/{name} does not exist")]
    SecretNotFound { namespace: String, name: String },
    /// A secret value cannot be substituted into text content
    #[error("Secret {namespace}/{name} key '{key}' is not valid UTF-8")]
    InvalidSecretValue {
        namespace: String,
        name: String,
        key: String,
    },
    /// Kubernetes API error other than a missing object
    #[error(transparent)]
    Kube(#[from] kube::Error),
}

/// Resolve a customization into one substituted body
///
/// `body_key` is the well-known ConfigMap key holding the content for this
/// customization kind (groovy script or configuration-as-code document).
pub async fn resolve_customization(
    client: &Client,
    namespace: &str,
    customization: &Customization,
    body_key: &str,
) -> Result<String, ResolveError> {
    let variables = match &customization.secret {
        Some(secret_ref) => fetch_secret_variables(client, namespace, &secret_ref.name).await?,
        None => HashMap::new(),
    };

    let configmaps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let mut bodies = Vec::with_capacity(customization.configurations.len());
    for reference in &customization.configurations {
        let configmap = match configmaps.get(&reference.name).await {
            Ok(configmap) => configmap,
            Err(kube::Error::Api(e)) if e.code == 404 => {
                return Err(ResolveError::ConfigMapNotFound {
                    namespace: namespace.to_string(),
                    name: reference.name.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let Some(body) = configmap.data.as_ref().and_then(|data| data.get(body_key)) else {
            return Err(ResolveError::MissingBodyKey {
                namespace: namespace.to_string(),
                name: reference.name.clone(),
                key: body_key.to_string(),
            });
        };
        debug!(
            "Resolved {} bytes from ConfigMap {namespace}/{}",
            body.len(),
            reference.name
        );
        bodies.push((reference.name.clone(), body.clone()));
    }

    Ok(render_customization(&bodies, &variables))
}

/// Concatenate bodies in declared order and substitute placeholders
///
/// Pure core of the resolver, split out so ordering and substitution are
/// testable without a cluster.
pub fn render_customization(
    bodies: &[(String, String)],
    variables: &HashMap<String, String>,
) -> String {
    let joined = bodies
        .iter()
        .map(|(_, body)| body.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    substitute_placeholders(&joined, variables)
}

/// Replace `${NAME}` placeholders with values from the variable map
///
/// Placeholders without a matching variable are left untouched: groovy
/// GStrings share the `${...}` syntax, so only declared secret keys are
/// substituted. Substitution is a single pass; values are not re-expanded.
pub fn substitute_placeholders(content: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            variables
                .get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fetch the referenced secret and decode it into a flat variable map
async fn fetch_secret_variables(
    client: &Client,
    namespace: &str,
    secret_name: &str,
) -> Result<HashMap<String, String>, ResolveError> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = match secrets.get(secret_name).await {
        Ok(secret) => secret,
        Err(kube::Error::Api(e)) if e.code == 404 => {
            return Err(ResolveError::SecretNotFound {
                namespace: namespace.to_string(),
                name: secret_name.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut variables = HashMap::new();
    if let Some(data) = secret.data {
        for (key, value) in data {
            let Ok(value) = String::from_utf8(value.0) else {
                return Err(ResolveError::InvalidSecretValue {
                    namespace: namespace.to_string(),
                    name: secret_name.to_string(),
                    key,
                });
            };
            variables.insert(key, value);
        }
    }
    Ok(variables)
}
