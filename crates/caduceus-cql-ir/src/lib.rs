//! CQL expression model: the surface AST produced by the parser contract and
//! the executable ELM-style IR the evaluator walks, plus the translation
//! between them and ELM's JSON/XML serialization.
//!
//! `ast` mirrors the CQL grammar closely; `elm` is the typed, query-normal-form
//! tree (ELM: Expression Logical Model) that `caduceus-cql-eval` interprets.
//! `elm::AstToElmConverter` performs the AST -> ELM lowering, including fluent
//! function rewriting and overload-set resolution metadata.

pub mod ast;
pub mod elm;
