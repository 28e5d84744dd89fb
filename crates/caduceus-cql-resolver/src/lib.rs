//! Library include resolution and function overload tables.
//!
//! `Environment` tracks which libraries are included under which local
//! alias and resolves `alias.name` references to the target library's
//! public expression definitions, enforcing that private definitions never
//! cross a library boundary. `FunctionTable` holds the `(name, arity)`
//! keyed overload set a parser uses to pick a function signature and an
//! evaluator uses to bind call arguments to parameter names in a new scope
//! frame.

use caduceus_cql_ir::elm::{AccessModifier, ExpressionDef, Library};
use caduceus_cql_types::{CqlType, TypeCoercer};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("library not included under alias '{0}'")]
    UnknownAlias(String),
    #[error("'{0}' is not defined in library '{1}'")]
    UndefinedInLibrary(String, String),
    #[error("'{0}' is private in library '{1}' and cannot be referenced from another library")]
    PrivateDefinition(String, String),
}

/// Resolves qualified references (`alias.name`) against the set of
/// libraries included by the library currently being evaluated.
#[derive(Default)]
pub struct Environment {
    libraries: HashMap<String, Arc<Library>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library under the local alias its `IncludeDef` declared.
    pub fn include(&mut self, alias: impl Into<String>, library: Arc<Library>) {
        self.libraries.insert(alias.into(), library);
    }

    pub fn resolve_library(&self, alias: &str) -> Option<&Arc<Library>> {
        self.libraries.get(alias)
    }

    /// Resolve `alias.name` to the included library's public expression
    /// definition. Definitions marked `AccessModifier::Private` are never
    /// resolvable from outside their own library.
    pub fn resolve_public_def(
        &self,
        alias: &str,
        name: &str,
    ) -> Result<&ExpressionDef, ResolverError> {
        let library = self
            .libraries
            .get(alias)
            .ok_or_else(|| ResolverError::UnknownAlias(alias.to_string()))?;

        let def = library
            .statements
            .as_ref()
            .and_then(|s| s.defs.iter().find(|d| d.name == name))
            .ok_or_else(|| ResolverError::UndefinedInLibrary(name.to_string(), alias.to_string()))?;

        match def.access_level {
            Some(AccessModifier::Private) => {
                Err(ResolverError::PrivateDefinition(name.to_string(), alias.to_string()))
            }
            _ => Ok(def),
        }
    }
}

/// One candidate signature for an overloaded function or operator.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<(String, CqlType)>,
    pub return_type: CqlType,
    pub fluent: bool,
}

impl FunctionSignature {
    pub fn new(params: Vec<(String, CqlType)>, return_type: CqlType) -> Self {
        Self { params, return_type, fluent: false }
    }

    pub fn fluent(mut self) -> Self {
        self.fluent = true;
        self
    }

    /// Bind positional call arguments to this signature's parameter names,
    /// for the evaluator to push as a new scope frame.
    pub fn bind_params<'a>(&'a self, arg_count: usize) -> impl Iterator<Item = &'a str> {
        self.params.iter().take(arg_count).map(|(name, _)| name.as_str())
    }
}

/// `(name, arity)`-keyed overload set. The parser uses this to pick an
/// overload at lowering time; the evaluator uses the chosen signature to
/// name its arguments.
#[derive(Default)]
pub struct FunctionTable {
    signatures: HashMap<(String, usize), Vec<FunctionSignature>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, signature: FunctionSignature) {
        let arity = signature.params.len();
        self.signatures
            .entry((name.into(), arity))
            .or_default()
            .push(signature);
    }

    pub fn overloads(&self, name: &str, arity: usize) -> &[FunctionSignature] {
        self.signatures
            .get(&(name.to_string(), arity))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Pick the overload that best accepts `arg_types`, trying successively
    /// looser match rules: exact type equality, then subtyping, then
    /// implicit conversion (CQL's overload resolution allows a call to bind
    /// to a signature its arguments merely convert to, not just one they
    /// already are). Among implicit-conversion candidates the one with the
    /// lowest total `TypeCoercer::conversion_cost` wins, so e.g. passing an
    /// `Integer` to a `(Long)`/`(Decimal)` overload pair picks `Long`.
    pub fn resolve(&self, name: &str, arg_types: &[CqlType]) -> Option<&FunctionSignature> {
        let overloads = self.overloads(name, arg_types.len());

        if let Some(sig) = overloads.iter().find(|sig| {
            sig.params.iter().zip(arg_types).all(|((_, pt), at)| pt == at)
        }) {
            return Some(sig);
        }

        if let Some(sig) = overloads.iter().find(|sig| {
            sig.params.iter().zip(arg_types).all(|((_, pt), at)| at.is_subtype_of(pt))
        }) {
            return Some(sig);
        }

        let coercer = TypeCoercer::new();
        overloads
            .iter()
            .filter_map(|sig| {
                let mut total = 0u32;
                for ((_, pt), at) in sig.params.iter().zip(arg_types) {
                    total += coercer.conversion_cost(at, pt)?;
                }
                Some((sig, total))
            })
            .min_by_key(|(_, cost)| *cost)
            .map(|(sig, _)| sig)
    }
}
