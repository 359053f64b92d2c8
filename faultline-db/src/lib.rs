//! MySQL client adapter for faultline
//!
//! The only crate that talks to sqlx: the connector/session seam the
//! worker is generic over, the production MySQL implementation, error
//! classification into the retry taxonomy, and the one-shot database
//! bootstrap.

pub mod bootstrap;
pub mod error;
pub mod mysql;
pub mod session;

pub use error::{DbError, DbResult};
pub use mysql::{MySqlConnector, MySqlSession};
pub use session::{Connector, Session};
