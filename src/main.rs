//! # Jenkins Operator
//!
//! A Kubernetes operator that manages the full lifecycle of Jenkins instances
//! declared as `Jenkins` custom resources.
//!
//! ## Overview
//!
//! The operator watches `Jenkins` resources across all namespaces and drives
//! each instance through base configuration (provision the master pod and
//! services, wait for liveness) and user configuration (groovy scripts,
//! configuration-as-code documents, seed jobs), recovering automatically when
//! the master pod is replaced out-of-band.
//!
//! See the crate documentation in `lib.rs` for the full design.

use anyhow::Result;
use jenkins_operator::runtime::initialization::initialize;
use jenkins_operator::runtime::watch_loop::run_watch_loop;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;
    run_watch_loop(init.jenkins_api, init.reconciler).await
}
