//! The `ModelInfo` document format: `types` holds the parsed type/property
//! tables, `parser` reads them from the XML or JSON an implementation
//! guide ships (e.g. the FHIR `ModelInfo` used to resolve `[Condition:
//! "Diabetes"]` retrieves against `Condition.code`).

pub mod parser;
pub mod types;

pub use parser::*;
pub use types::*;
