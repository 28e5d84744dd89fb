//! Evaluation context for CQL execution
//!
//! Carries everything a running evaluation needs that isn't part of the
//! expression tree itself: the declared context (e.g. `Patient`) and its
//! current value, query-scope bindings (aliases, `let` clauses, the
//! `$this`/`$index`/`$total` specials), parameters, the top-level definition
//! cache, the fixed evaluation timestamp, and the external adapters
//! (data retrieval, terminology, property access on opaque model values).

use caduceus_cql_ir::elm::Library;
use caduceus_cql_resolver::Environment;
use caduceus_cql_types::{CqlDate, CqlDateTime, CqlTime, CqlValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum expression-tree recursion depth before `EvalError::RecursionLimit`.
const DEFAULT_MAX_RECURSION: usize = 500;

/// Caller-supplied run configuration. The evaluation timestamp is always
/// pinned explicitly (never read from the wall clock) so runs are
/// reproducible; `return_private_defs` controls whether
/// `CqlEngine::evaluate_library` includes private definitions in its result
/// map (useful for `cql validate`/debugging, off by default for `cql run`).
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    pub evaluation_timestamp: CqlDateTime,
    pub return_private_defs: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            evaluation_timestamp: CqlDateTime::new(1970, 1, 1, 0, 0, 0, 0, None),
            return_private_defs: false,
        }
    }
}

/// Sync-facing data retrieval contract used by `Retrieve` expressions and by
/// property access on values the core type system doesn't know how to
/// navigate (opaque external model values, e.g. FHIR resources).
///
/// CQL evaluation is synchronous end to end; adapters that wrap an async
/// retrieval backend (e.g. a FHIR server client) bridge with a blocking
/// `tokio::runtime::Handle::block_on` call, the same pattern `TerminologyAdapter`
/// uses for terminology services.
pub trait DataProvider: Send + Sync {
    /// Retrieve resources of `data_type`, optionally filtered by code and date.
    #[allow(clippy::too_many_arguments)]
    fn retrieve(
        &self,
        data_type: &str,
        context_type: Option<&str>,
        context_value: Option<&CqlValue>,
        template_id: Option<&str>,
        code_property: Option<&str>,
        codes: Option<&CqlValue>,
        date_property: Option<&str>,
        date_range: Option<&CqlValue>,
    ) -> Vec<CqlValue>;

    /// Navigate a named property on a value the core type system treats as
    /// opaque (anything that isn't `Tuple`/`List`/`Null`).
    fn get_property(&self, resource: &CqlValue, path: &str) -> Option<CqlValue>;
}

/// Sync-facing terminology contract used by `InValueSet`/`InCodeSystem` and
/// related code/concept operations.
pub trait TerminologyProvider: Send + Sync {
    fn in_value_set(&self, code: &CqlValue, value_set_id: &str) -> Option<bool>;
    fn in_code_system(&self, code: &CqlValue, code_system_id: &str) -> Option<bool>;
    fn expand_value_set(&self, value_set_id: &str) -> Option<Vec<CqlValue>>;
    fn lookup_display(&self, code: &CqlValue) -> Option<String>;
}

/// One frame of query-local bindings. Pushed on `Query`/`ForEach`/`Filter`/
/// etc. entry, popped on exit; lookups walk the stack from the top so inner
/// scopes shadow outer ones, matching CQL's lexical nesting.
#[derive(Default)]
struct Scope {
    aliases: HashMap<String, CqlValue>,
    lets: HashMap<String, CqlValue>,
    specials: HashMap<String, CqlValue>,
}

/// Evaluation context for CQL expression execution.
pub struct EvaluationContext {
    /// Current context type (e.g., "Patient")
    pub context_type: Option<String>,
    /// Current context value (e.g., Patient resource)
    pub context_value: Option<CqlValue>,

    /// Unqualified parameter values (`set_parameter`/`get_parameter`)
    parameters: HashMap<String, CqlValue>,
    /// Parameter values qualified by including-library name
    qualified_parameters: HashMap<(String, String), CqlValue>,

    scopes: Vec<Scope>,
    cache: HashMap<String, CqlValue>,

    main_library: Option<Arc<Library>>,
    environment: Environment,

    data_provider: Option<Arc<dyn DataProvider>>,
    terminology_provider: Option<Arc<dyn TerminologyProvider>>,

    /// The fixed "now" this evaluation run is pinned to. Never read from the
    /// wall clock inside the core: reproducible tests require a caller-supplied
    /// timestamp (spec's determinism requirement).
    evaluation_timestamp: CqlDateTime,

    recursion_depth: usize,
    max_recursion: usize,

    return_private_defs: bool,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    /// Create a new empty context, pinned to a fixed evaluation timestamp.
    pub fn new() -> Self {
        Self {
            context_type: None,
            context_value: None,
            parameters: HashMap::new(),
            qualified_parameters: HashMap::new(),
            scopes: Vec::new(),
            cache: HashMap::new(),
            main_library: None,
            environment: Environment::new(),
            data_provider: None,
            terminology_provider: None,
            evaluation_timestamp: CqlDateTime::new(1970, 1, 1, 0, 0, 0, 0, None),
            recursion_depth: 0,
            max_recursion: DEFAULT_MAX_RECURSION,
            return_private_defs: false,
        }
    }

    /// Build a context from run configuration (evaluation timestamp,
    /// whether private definitions are included in library results).
    pub fn from_options(options: EvaluationOptions) -> Self {
        Self::new()
            .with_evaluation_timestamp(options.evaluation_timestamp)
            .with_return_private_defs(options.return_private_defs)
    }

    /// Pin the "now" this context's `Now()`/`Today()`/`TimeOfDay()` resolve to.
    pub fn with_evaluation_timestamp(mut self, timestamp: CqlDateTime) -> Self {
        self.evaluation_timestamp = timestamp;
        self
    }

    pub fn with_return_private_defs(mut self, return_private_defs: bool) -> Self {
        self.return_private_defs = return_private_defs;
        self
    }

    pub fn return_private_defs(&self) -> bool {
        self.return_private_defs
    }

    /// Set the context type and value
    pub fn with_context(mut self, context_type: impl Into<String>, value: CqlValue) -> Self {
        self.context_type = Some(context_type.into());
        self.context_value = Some(value);
        self
    }

    pub fn with_main_library(mut self, library: Arc<Library>) -> Self {
        self.main_library = Some(library);
        self
    }

    pub fn set_main_library(&mut self, library: Arc<Library>) {
        self.main_library = Some(library);
    }

    pub fn main_library_arc(&self) -> Option<Arc<Library>> {
        self.main_library.clone()
    }

    /// Register an included library under the local alias its `IncludeDef`
    /// declared, making `alias.name` references resolvable.
    pub fn include_library(&mut self, alias: impl Into<String>, library: Arc<Library>) {
        self.environment.include(alias, library);
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn with_data_provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.data_provider = Some(provider);
        self
    }

    pub fn set_data_provider(&mut self, provider: Arc<dyn DataProvider>) {
        self.data_provider = Some(provider);
    }

    pub fn data_provider(&self) -> Option<&dyn DataProvider> {
        self.data_provider.as_deref()
    }

    pub fn with_terminology_provider(mut self, provider: Arc<dyn TerminologyProvider>) -> Self {
        self.terminology_provider = Some(provider);
        self
    }

    pub fn set_terminology_provider(&mut self, provider: Arc<dyn TerminologyProvider>) {
        self.terminology_provider = Some(provider);
    }

    pub fn terminology_provider(&self) -> Option<&dyn TerminologyProvider> {
        self.terminology_provider.as_deref()
    }

    /// The evaluation timestamp as a `DateTime`, for `Now()`.
    pub fn now(&self) -> CqlDateTime {
        self.evaluation_timestamp.clone()
    }

    /// `Today()`: the date component of the evaluation timestamp.
    pub fn today(&self) -> CqlDate {
        CqlDate {
            year: self.evaluation_timestamp.year,
            month: self.evaluation_timestamp.month,
            day: self.evaluation_timestamp.day,
        }
    }

    /// `TimeOfDay()`: the time component of the evaluation timestamp.
    pub fn time_of_day(&self) -> CqlTime {
        CqlTime {
            hour: self.evaluation_timestamp.hour.unwrap_or(0),
            minute: self.evaluation_timestamp.minute,
            second: self.evaluation_timestamp.second,
            millisecond: self.evaluation_timestamp.millisecond,
        }
    }

    // --- parameters ---------------------------------------------------

    pub fn set_parameter(&mut self, name: impl Into<String>, value: CqlValue) {
        self.parameters.insert(name.into(), value);
    }

    pub fn get_parameter(&self, name: &str) -> Option<&CqlValue> {
        self.parameters.get(name)
    }

    pub fn set_parameter_qualified(
        &mut self,
        library_name: impl Into<String>,
        name: impl Into<String>,
        value: CqlValue,
    ) {
        self.qualified_parameters
            .insert((library_name.into(), name.into()), value);
    }

    pub fn get_parameter_qualified(&self, library_name: Option<&str>, name: &str) -> Option<&CqlValue> {
        match library_name {
            Some(lib) => self
                .qualified_parameters
                .get(&(lib.to_string(), name.to_string()))
                .or_else(|| self.parameters.get(name)),
            None => self.parameters.get(name),
        }
    }

    // --- scope stack: aliases / let-bindings / specials ----------------

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn set_alias(&mut self, name: impl Into<String>, value: CqlValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.aliases.insert(name.into(), value);
        } else {
            self.push_scope();
            self.set_alias(name, value);
        }
    }

    pub fn get_alias(&self, name: &str) -> Option<&CqlValue> {
        self.scopes.iter().rev().find_map(|s| s.aliases.get(name))
    }

    pub fn set_let(&mut self, name: impl Into<String>, value: CqlValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.lets.insert(name.into(), value);
        } else {
            self.push_scope();
            self.set_let(name, value);
        }
    }

    pub fn get_let(&self, name: &str) -> Option<&CqlValue> {
        self.scopes.iter().rev().find_map(|s| s.lets.get(name))
    }

    pub fn set_special(&mut self, name: impl Into<String>, value: CqlValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.specials.insert(name.into(), value);
        } else {
            self.push_scope();
            self.set_special(name, value);
        }
    }

    pub fn get_special(&self, name: &str) -> Option<&CqlValue> {
        self.scopes.iter().rev().find_map(|s| s.specials.get(name))
    }

    // --- top-level definition memoization -------------------------------

    pub fn get_cached(&self, key: &str) -> Option<CqlValue> {
        self.cache.get(key).cloned()
    }

    pub fn cache_result(&mut self, key: impl Into<String>, value: CqlValue) {
        self.cache.insert(key.into(), value);
    }

    // --- recursion guard -------------------------------------------------

    /// Enters one level of expression evaluation; returns `false` once the
    /// recursion budget is exhausted (used to fail deeply self-referential
    /// or cyclic expression trees with `EvalError::RecursionLimit` rather
    /// than overflowing the Rust call stack).
    pub fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= self.max_recursion {
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }
}
