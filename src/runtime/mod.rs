//! # Runtime
//!
//! Controller process lifecycle: initialization, the watch loop, and the
//! error policy applied to failed reconciles.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
