//! plinth-core: framework-free base types
//!
//! The pieces of the handler/model base layer that do not depend on the
//! web framework or the database driver: the uniform response envelope,
//! pagination types, and the filter/record types that render into
//! parameterized SQL fragments.

pub mod envelope;
pub mod filter;
pub mod pagination;
pub mod validation;

pub use envelope::{Envelope, Status};
pub use filter::{where_clause, Filter, FilterOp, Record, RecordError, SqlValue};
pub use pagination::{Page, PageParams, Paginated};
pub use validation::{validate_identifier, IdentifierError};
