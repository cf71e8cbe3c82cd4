//! plinth-server: HTTP and database base layers
//!
//! Thin glue between axum and sqlx: a uniform response envelope with the
//! exact content-type contract, lenient JSON/XML body extractors, a
//! pluggable authentication middleware, and a generic CRUD model over
//! arbitrary tables.

pub mod config;
pub mod db;
pub mod http;
pub mod trace;

pub use config::ServerConfig;
pub use http::server::{build_router, run_server, AppState};
