//! Database layer: the generic CRUD model.

pub mod model;

pub use model::{DbError, Model, Table};
