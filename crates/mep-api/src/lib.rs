//! HTTP surface of the MEP audit viewer: audit runs, LLM proxy, comment and
//! feedback persistence, standards lookup and the static front end.

pub mod audit_runner;
pub mod error;
pub mod extract;
pub mod files;
pub mod handlers;
pub mod manuals;
pub mod routes;
pub mod server;
pub mod state;

pub use audit_runner::{AuditError, AuditRequest, AuditRunner, RESULT_PATH_ENV};
pub use error::*;
pub use extract::ApiJson;
pub use manuals::{ManualError, ManualLibrary};
pub use routes::*;
pub use server::*;
pub use state::*;
