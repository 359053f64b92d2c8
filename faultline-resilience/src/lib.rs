//! Resilience primitives for faultline
//!
//! Reconnect backoff policy and cooperative shutdown coordination shared
//! by the worker pool and the supervisor.

pub mod backoff;
pub mod shutdown;

pub use backoff::{apply_jitter, ReconnectBackoff};
pub use shutdown::ShutdownCoordinator;
