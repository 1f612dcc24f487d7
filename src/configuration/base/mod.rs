//! # Base Configuration
//!
//! Provisions the Kubernetes objects backing a Jenkins instance and derives
//! the identity token used to detect out-of-band pod replacement.
//!
//! Base configuration is complete once the master pod exists and the instance
//! answers liveness checks; the completion time and pod identity are then
//! persisted in the resource status.

use crate::configuration::base::resources::{
    build_agent_service, build_credentials_secret, build_http_service, build_master_pod,
    credentials_secret_name, http_service_name, master_pod_name,
};
use crate::constants;
use crate::crd::Jenkins;
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Pod, Secret, Service};
use kube::api::PostParams;
use kube::{Api, Client};
use tracing::{debug, info};

pub mod resources;

/// Opaque identity token for one instantiation of the master pod
///
/// A replacement pod gets a new UID and creation timestamp, so a token
/// mismatch against `status.provisionedBy` means the pod was recreated.
/// `None` until the API server has assigned both fields.
pub fn pod_identity(pod: &Pod) -> Option<String> {
    let uid = pod.metadata.uid.as_deref()?;
    let created = pod.metadata.creation_timestamp.as_ref()?;
    Some(format!("{uid}/{}", created.0.to_rfc3339()))
}

/// Whether the recorded identity token still matches the live pod
pub fn identity_matches(recorded: Option<&str>, live: &str) -> bool {
    recorded == Some(live)
}

/// Whether the master pod has been scheduled and started
pub fn is_pod_running(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .is_some_and(|phase| phase == "Running")
}

/// In-cluster URL of the Jenkins API for a resource
pub fn jenkins_api_url(jenkins: &Jenkins) -> String {
    let name = jenkins.metadata.name.as_deref().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.as_deref().unwrap_or("default");
    format!(
        "http://{}.{namespace}.svc:{}",
        http_service_name(name),
        constants::JENKINS_HTTP_PORT
    )
}

/// Ensure the master pod and both services exist, returning the live pod
///
/// Creation is idempotent: existing objects are left untouched (the pod is the
/// unit of replacement; config changes that require a new pod are effected by
/// deleting it, not by in-place mutation).
pub async fn ensure_base_resources(client: &Client, jenkins: &Jenkins) -> Result<Pod, kube::Error> {
    let name = jenkins.metadata.name.as_deref().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.as_deref().unwrap_or("default");

    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod = match pods.get(&master_pod_name(name)).await {
        Ok(existing) => existing,
        Err(kube::Error::Api(e)) if e.code == 404 => {
            info!("Creating Jenkins master pod for {namespace}/{name}");
            pods.create(&PostParams::default(), &build_master_pod(jenkins))
                .await?
        }
        Err(e) => return Err(e),
    };

    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    ensure_service(&services, &http_service_name(name), || {
        build_http_service(jenkins)
    })
    .await?;
    ensure_service(
        &services,
        &resources::agent_service_name(name),
        || build_agent_service(jenkins),
    )
    .await?;

    Ok(pod)
}

async fn ensure_service(
    services: &Api<Service>,
    service_name: &str,
    build: impl FnOnce() -> Service,
) -> Result<(), kube::Error> {
    match services.get(service_name).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(e)) if e.code == 404 => {
            debug!("Creating service {service_name}");
            services.create(&PostParams::default(), &build()).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Ensure the operator credentials secret exists and return its user and token
///
/// The same secret is wired into the master pod environment, so the instance's
/// init scripts and the operator agree on the credentials.
pub async fn ensure_operator_credentials(
    client: &Client,
    jenkins: &Jenkins,
) -> Result<(String, String)> {
    let name = jenkins.metadata.name.as_deref().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.as_deref().unwrap_or("default");

    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret_name = credentials_secret_name(name);

    let secret = match secrets.get(&secret_name).await {
        Ok(existing) => existing,
        Err(kube::Error::Api(e)) if e.code == 404 => {
            info!("Creating operator credentials secret {namespace}/{secret_name}");
            secrets
                .create(&PostParams::default(), &build_credentials_secret(jenkins))
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    let user = read_secret_key(&secret, constants::CREDENTIALS_USER_KEY)
        .with_context(|| format!("credentials secret {secret_name} is missing the user key"))?;
    let token = read_secret_key(&secret, constants::CREDENTIALS_TOKEN_KEY)
        .with_context(|| format!("credentials secret {secret_name} is missing the token key"))?;
    Ok((user, token))
}

fn read_secret_key(secret: &Secret, key: &str) -> Option<String> {
    if let Some(data) = &secret.data {
        if let Some(value) = data.get(key) {
            return String::from_utf8(value.0.clone()).ok();
        }
    }
    // A just-created secret echoes back string_data before the API server
    // encodes it
    secret
        .string_data
        .as_ref()
        .and_then(|d| d.get(key))
        .cloned()
}
