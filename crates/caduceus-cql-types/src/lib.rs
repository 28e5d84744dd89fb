//! CQL value and type model
//!
//! Runtime values (`CqlValue`), the static type lattice (`CqlType`) and its
//! subtyping/least-upper-bound rules, the built-in `System` types, and the
//! implicit/explicit conversion table between them. Reference and overload
//! resolution across library boundaries lives in `caduceus-cql-resolver`,
//! not here — this crate only knows about values and types, never about
//! libraries, aliases, or scopes.

pub mod coercion;
pub mod type_system;
pub mod value;

// Re-export main types
pub use coercion::{CoercionError, TypeCoercer};
pub use type_system::{
    ChoiceTypeSpecifier, CqlType, IntervalTypeSpecifier, ListTypeSpecifier, NamedTypeSpecifier,
    TupleElementDefinition, TupleTypeElement, TupleTypeSpecifier, TypeSpecifier,
};
pub use value::{
    CqlCode, CqlConcept, CqlDate, CqlDateTime, CqlInterval, CqlList, CqlQuantity, CqlRatio,
    CqlTime, CqlTuple, CqlValue, DateTimePrecision,
};
