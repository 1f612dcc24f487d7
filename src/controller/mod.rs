//! # Controller
//!
//! Reconciliation logic for `Jenkins` resources: the state machine, phase
//! tracking through the resource status, spec validation, and retry backoff.

pub mod backoff;
pub mod reconciler;
