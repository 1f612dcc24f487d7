//! Jenkins Operator Library
//!
//! A Kubernetes operator that manages the full lifecycle of Jenkins instances
//! declared as `Jenkins` custom resources.
//!
//! ## Overview
//!
//! The operator drives each Jenkins instance through an ordered configuration
//! pipeline:
//!
//! 1. **Base configuration** - Provisions the Jenkins master pod and services,
//!    then waits for the instance to answer liveness checks.
//! 2. **User configuration** - Applies declarative customization against the
//!    live instance: groovy scripts, configuration-as-code documents, and
//!    job DSL seed jobs, strictly in that order.
//!
//! Progress through the pipeline is persisted in the resource status
//! (`baseConfigurationCompletedTime`, `userConfigurationCompletedTime`) together
//! with a pod identity token, so any operator replica resumes correctly from
//! persisted state and detects out-of-band pod replacement.
//!
//! ## Features
//!
//! - **Restart recovery**: a replaced master pod invalidates base configuration
//!   and re-runs exactly the steps needed to converge
//! - **Idempotent customization**: every remote step can be safely repeated;
//!   seed jobs update in place and never duplicate
//! - **Safe restarts**: graceful restarts preserve previously-applied
//!   configuration
//! - **Multi-namespace**: watches `Jenkins` resources across all namespaces

pub mod client;
pub mod configuration;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod runtime;

// Re-export CRD types for convenience
pub use crd::*;
