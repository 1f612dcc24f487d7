//! # Initialization
//!
//! Controller startup: rustls setup, tracing subscriber, Kubernetes client,
//! and the reconciler context.

use crate::controller::reconciler::Reconciler;
use crate::crd::Jenkins;
use anyhow::{Context, Result};
use kube::api::ListParams;
use kube::{Api, Client};
use std::sync::Arc;
use tracing::{info, warn};

/// Components the watch loop runs with
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// API for the Jenkins CRD, across all namespaces
    pub jenkins_api: Api<Jenkins>,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult").finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
pub async fn initialize() -> Result<InitializationResult> {
    // Configure rustls crypto provider FIRST, before any other operations.
    // Required for rustls 0.23+ when no default provider is set via features.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jenkins_operator=info".into()),
        )
        .init();

    info!("Starting Jenkins Operator");

    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    // Watch all namespaces so Jenkins resources can live anywhere
    let jenkins_api: Api<Jenkins> = Api::all(client.clone());

    let reconciler = Arc::new(Reconciler::new(client.clone()));

    // The controller's initial watch lists every existing resource and
    // reconciles it; this check only confirms the CRD is queryable and gives
    // a startup summary
    match jenkins_api.list(&ListParams::default()).await {
        Ok(list) => {
            info!("Found {} existing Jenkins resources", list.items.len());
            for item in &list.items {
                info!(
                    "  {}/{}",
                    item.metadata.namespace.as_deref().unwrap_or("default"),
                    item.metadata.name.as_deref().unwrap_or("unknown")
                );
            }
        }
        Err(e) => {
            warn!("Jenkins CRD is not queryable ({e}); is the CRD installed? Continuing, the watch will retry");
        }
    }

    info!("Controller initialized, starting watch loop");

    Ok(InitializationResult {
        client,
        jenkins_api,
        reconciler,
    })
}
