//! # Base Resources
//!
//! Builders for the Kubernetes objects backing one Jenkins instance: the
//! master pod, the http and agent services, and the operator credentials
//! secret. Creation itself goes through the generic Kubernetes API; the
//! operator only declares what the objects look like.

use crate::constants;
use crate::crd::Jenkins;
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, EnvVarSource, HTTPGetAction, Pod, PodSpec, Probe, Secret,
    SecretKeySelector, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Name of the master pod for a Jenkins resource
pub fn master_pod_name(jenkins_name: &str) -> String {
    format!("jenkins-master-{jenkins_name}")
}

/// Name of the http service exposing the Jenkins web UI and API
pub fn http_service_name(jenkins_name: &str) -> String {
    format!("jenkins-http-{jenkins_name}")
}

/// Name of the service exposing the agent listener port
pub fn agent_service_name(jenkins_name: &str) -> String {
    format!("jenkins-agent-{jenkins_name}")
}

/// Name of the secret holding the operator's Jenkins credentials
pub fn credentials_secret_name(jenkins_name: &str) -> String {
    format!("jenkins-operator-credentials-{jenkins_name}")
}

/// Labels shared by every object the operator creates for one resource
pub fn instance_labels(jenkins_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "app.kubernetes.io/managed-by".to_string(),
            constants::APP_LABEL_VALUE.to_string(),
        ),
        ("jenkins-cr".to_string(), jenkins_name.to_string()),
    ])
}

/// Owner reference pointing at the Jenkins resource, so created objects are
/// garbage-collected with it and pod events map back to their owner
fn owner_reference(jenkins: &Jenkins) -> Vec<OwnerReference> {
    let name = jenkins.metadata.name.clone().unwrap_or_default();
    let uid = jenkins.metadata.uid.clone().unwrap_or_default();
    vec![OwnerReference {
        api_version: "jenkins.io/v1alpha2".to_string(),
        kind: "Jenkins".to_string(),
        name,
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    }]
}

/// Build the Jenkins master pod from the resource spec
///
/// Liveness probe and priority class are pass-through provisioning parameters.
/// The operator credentials secret is wired into the container environment so
/// the instance's init scripts can create the operator user.
pub fn build_master_pod(jenkins: &Jenkins) -> Pod {
    let name = jenkins.metadata.name.clone().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.clone();
    let master = &jenkins.spec.master;

    let image = master
        .image
        .clone()
        .unwrap_or_else(|| constants::DEFAULT_JENKINS_IMAGE.to_string());

    let liveness_probe = master.liveness_probe.as_ref().map(|probe| Probe {
        http_get: Some(HTTPGetAction {
            path: Some(probe.path.clone().unwrap_or_else(|| "/login".to_string())),
            port: IntOrString::Int(constants::JENKINS_HTTP_PORT),
            scheme: Some("HTTP".to_string()),
            ..HTTPGetAction::default()
        }),
        initial_delay_seconds: probe.initial_delay_seconds,
        timeout_seconds: probe.timeout_seconds,
        period_seconds: probe.period_seconds,
        failure_threshold: probe.failure_threshold,
        success_threshold: probe.success_threshold,
        ..Probe::default()
    });

    let credentials_secret = credentials_secret_name(&name);
    let env = vec![
        secret_env_var(
            "JENKINS_OPERATOR_USER",
            &credentials_secret,
            constants::CREDENTIALS_USER_KEY,
        ),
        secret_env_var(
            "JENKINS_OPERATOR_TOKEN",
            &credentials_secret,
            constants::CREDENTIALS_TOKEN_KEY,
        ),
    ];

    let container = Container {
        name: constants::JENKINS_MASTER_CONTAINER_NAME.to_string(),
        image: Some(image),
        ports: Some(vec![
            ContainerPort {
                name: Some("http".to_string()),
                container_port: constants::JENKINS_HTTP_PORT,
                ..ContainerPort::default()
            },
            ContainerPort {
                name: Some("agent".to_string()),
                container_port: constants::JENKINS_AGENT_PORT,
                ..ContainerPort::default()
            },
        ]),
        env: Some(env),
        liveness_probe,
        ..Container::default()
    };

    Pod {
        metadata: ObjectMeta {
            name: Some(master_pod_name(&name)),
            namespace,
            labels: Some(instance_labels(&name)),
            owner_references: Some(owner_reference(jenkins)),
            ..ObjectMeta::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            priority_class_name: master.priority_class_name.clone(),
            restart_policy: Some("Always".to_string()),
            ..PodSpec::default()
        }),
        ..Pod::default()
    }
}

fn secret_env_var(name: &str, secret_name: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.to_string(),
                key: key.to_string(),
                optional: Some(false),
            }),
            ..EnvVarSource::default()
        }),
        ..EnvVar::default()
    }
}

/// Build the http service in front of the master pod
pub fn build_http_service(jenkins: &Jenkins) -> Service {
    build_service(
        jenkins,
        &http_service_name(&jenkins.metadata.name.clone().unwrap_or_default()),
        "http",
        constants::JENKINS_HTTP_PORT,
    )
}

/// Build the agent listener service in front of the master pod
pub fn build_agent_service(jenkins: &Jenkins) -> Service {
    build_service(
        jenkins,
        &agent_service_name(&jenkins.metadata.name.clone().unwrap_or_default()),
        "agent",
        constants::JENKINS_AGENT_PORT,
    )
}

fn build_service(jenkins: &Jenkins, service_name: &str, port_name: &str, port: i32) -> Service {
    let name = jenkins.metadata.name.clone().unwrap_or_default();
    Service {
        metadata: ObjectMeta {
            name: Some(service_name.to_string()),
            namespace: jenkins.metadata.namespace.clone(),
            labels: Some(instance_labels(&name)),
            owner_references: Some(owner_reference(jenkins)),
            ..ObjectMeta::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(instance_labels(&name)),
            ports: Some(vec![ServicePort {
                name: Some(port_name.to_string()),
                port,
                target_port: Some(IntOrString::String(port_name.to_string())),
                ..ServicePort::default()
            }]),
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

/// Build the operator credentials secret with a freshly generated API token
pub fn build_credentials_secret(jenkins: &Jenkins) -> Secret {
    let name = jenkins.metadata.name.clone().unwrap_or_default();
    let namespace = jenkins.metadata.namespace.clone().unwrap_or_default();

    // Token derived from resource identity and creation instant; it only needs
    // to be unguessable, not reproducible
    let seed = format!(
        "{namespace}/{name}/{}",
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    );
    let token = format!("{:x}", md5::compute(seed));

    Secret {
        metadata: ObjectMeta {
            name: Some(credentials_secret_name(&name)),
            namespace: jenkins.metadata.namespace.clone(),
            labels: Some(instance_labels(&name)),
            owner_references: Some(owner_reference(jenkins)),
            ..ObjectMeta::default()
        },
        string_data: Some(BTreeMap::from([
            (
                constants::CREDENTIALS_USER_KEY.to_string(),
                constants::DEFAULT_OPERATOR_USER.to_string(),
            ),
            (constants::CREDENTIALS_TOKEN_KEY.to_string(), token),
        ])),
        ..Secret::default()
    }
}
