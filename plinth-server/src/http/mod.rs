//! HTTP layer: responders, extractors, auth middleware, routing.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod respond;
pub mod routes;
pub mod server;
pub mod xml;
