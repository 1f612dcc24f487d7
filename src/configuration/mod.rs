//! # Configuration Pipeline
//!
//! The two configuration phases the operator drives a Jenkins instance
//! through:
//!
//! - [`base`] provisions the master pod and services and waits for the
//!   instance to answer liveness checks
//! - [`user`] applies declarative customization (groovy scripts,
//!   configuration-as-code, seed jobs) against the reachable instance

pub mod base;
pub mod user;
