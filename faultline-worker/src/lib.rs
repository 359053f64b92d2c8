//! Worker pool driving sustained load against the target database
//!
//! Each worker simulates one application user holding one connection;
//! the supervisor owns spawn order and shutdown draining.

pub mod supervisor;
pub mod worker;

pub use supervisor::Supervisor;
pub use worker::Worker;
