//! Clinical Quality Language (CQL) implementation for Rust
//!
//! This crate provides a complete CQL 1.5 implementation including:
//! - Parsing CQL expressions and libraries
//! - Type checking and semantic analysis
//! - ELM (Expression Logical Model) output
//! - Expression evaluation
//! - Version-agnostic FHIR support
//!
//! # Example
//!
//! ```ignore
//! use caduceus_cql::parse;
//!
//! let cql = r#"
//! library Example version '1.0.0'
//!
//! define InPopulation:
//!     AgeInYears() >= 18
//! "#;
//!
//! let library = parse(cql)?;
//! ```

// Re-export all public APIs from internal crates
pub use caduceus_cql_ir::ast;
pub use caduceus_cql_diagnostics as diagnostics;
pub use caduceus_cql_ir::elm;
pub use caduceus_cql_eval as eval;
pub use caduceus_cql_model as model;
pub use caduceus_cql_parser as parser;
pub use caduceus_cql_resolver as resolver;
pub use caduceus_cql_types as types;

// Convenience re-exports
pub use caduceus_cql_ir::ast::{Expression, Library};
pub use caduceus_cql_diagnostics::{CqlError, Result};
pub use caduceus_cql_parser::parse;
