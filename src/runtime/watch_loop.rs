//! # Watch Loop
//!
//! Runs the controller over `Jenkins` resources. Master pods are owned
//! objects, so pod changes (including out-of-band deletion) re-trigger the
//! owning resource's reconcile. The runtime serializes reconciles per
//! resource and coalesces pending triggers for the same resource into one
//! pass.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::crd::Jenkins;
use crate::runtime::error_policy::error_policy;
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube_runtime::controller::Controller;
use kube_runtime::watcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller until shutdown
pub async fn run_watch_loop(jenkins_api: Api<Jenkins>, reconciler: Arc<Reconciler>) -> Result<()> {
    let pods: Api<Pod> = Api::all(reconciler.client.clone());

    Controller::new(jenkins_api, watcher::Config::default())
        .owns(pods, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, _action)) => debug!("Reconciled {object}"),
                Err(e) => warn!("Reconcile stream error: {e}"),
            }
        })
        .await;

    info!("Watch loop terminated");
    Ok(())
}
