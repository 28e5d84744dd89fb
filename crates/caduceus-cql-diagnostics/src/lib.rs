//! Error handling shared by every stage of the CQL pipeline: `error_code`
//! defines the `CQLxxxx` taxonomy, `span` carries byte/line-column source
//! positions through parsing, and `error` ties both into `CqlError`, the
//! type `caduceus-cql-parser` and `caduceus-cql-eval` ultimately report.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for CQL operations
pub type Result<T> = std::result::Result<T, CqlError>;
