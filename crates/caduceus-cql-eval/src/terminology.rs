//! Terminology integration
//!
//! Bridges `caduceus-cql-model`'s async terminology contract into the
//! evaluator's synchronous `TerminologyProvider` for InValueSet/InCodeSystem
//! and related code/concept operations.

use crate::context::TerminologyProvider as EvalTerminologyProvider;
use caduceus_cql_types::{CqlCode, CqlConcept, CqlValue};
use std::sync::Arc;

/// Minimal async terminology service contract: value-set validation,
/// expansion, and display lookup. Implementations typically wrap a FHIR
/// terminology server ($validate-code, $expand, $lookup).
#[async_trait::async_trait]
pub trait AsyncTerminologyProvider: Send + Sync {
    async fn validate_code_vs(
        &self,
        value_set_id: &str,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
    ) -> Result<bool, TerminologyError>;

    async fn expand_value_set(&self, value_set_id: &str) -> Result<Vec<CqlCode>, TerminologyError>;

    async fn lookup_display(
        &self,
        system: &str,
        code: &str,
        version: Option<&str>,
    ) -> Result<Option<String>, TerminologyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TerminologyError {
    #[error("terminology service call failed: {0}")]
    ServiceFailed(String),
}

/// A no-op terminology provider: every probe returns `Ok` with an empty or
/// conservative answer. Useful for evaluation contexts that don't need
/// terminology resolution (or in tests).
pub struct NoOpAsyncTerminologyProvider;

#[async_trait::async_trait]
impl AsyncTerminologyProvider for NoOpAsyncTerminologyProvider {
    async fn validate_code_vs(
        &self,
        _value_set_id: &str,
        _system: Option<&str>,
        _code: &str,
        _display: Option<&str>,
    ) -> Result<bool, TerminologyError> {
        Ok(false)
    }

    async fn expand_value_set(&self, _value_set_id: &str) -> Result<Vec<CqlCode>, TerminologyError> {
        Ok(Vec::new())
    }

    async fn lookup_display(
        &self,
        _system: &str,
        _code: &str,
        _version: Option<&str>,
    ) -> Result<Option<String>, TerminologyError> {
        Ok(None)
    }
}

/// Adapter that wraps an `AsyncTerminologyProvider` to implement the eval
/// crate's synchronous `TerminologyProvider`, blocking on the current tokio
/// runtime when one is available.
pub struct TerminologyAdapter {
    provider: Arc<dyn AsyncTerminologyProvider>,
}

impl TerminologyAdapter {
    pub fn new(provider: Arc<dyn AsyncTerminologyProvider>) -> Self {
        Self { provider }
    }

    pub fn inner(&self) -> &Arc<dyn AsyncTerminologyProvider> {
        &self.provider
    }
}

impl EvalTerminologyProvider for TerminologyAdapter {
    fn in_value_set(&self, code: &CqlValue, value_set_id: &str) -> Option<bool> {
        let cql_code = match code {
            CqlValue::Code(c) => c,
            CqlValue::Concept(concept) => concept.codes.first()?,
            _ => return None,
        };

        let code_str = &cql_code.code;
        let system = Some(cql_code.system.as_str());
        let display = cql_code.display.as_deref();

        log::trace!("checking value set membership: code={code_str} value_set={value_set_id}");

        tokio::runtime::Handle::try_current().ok().and_then(|handle| {
            handle.block_on(async {
                self.provider
                    .validate_code_vs(value_set_id, system, code_str, display)
                    .await
                    .ok()
            })
        })
    }

    fn in_code_system(&self, code: &CqlValue, code_system_id: &str) -> Option<bool> {
        let cql_code = match code {
            CqlValue::Code(c) => c,
            CqlValue::Concept(concept) => concept.codes.first()?,
            _ => return None,
        };

        Some(cql_code.system == code_system_id)
    }

    fn expand_value_set(&self, value_set_id: &str) -> Option<Vec<CqlValue>> {
        let expanded = tokio::runtime::Handle::try_current().ok().and_then(|handle| {
            handle.block_on(async { self.provider.expand_value_set(value_set_id).await.ok() })
        })?;

        Some(expanded.into_iter().map(CqlValue::Code).collect())
    }

    fn lookup_display(&self, code: &CqlValue) -> Option<String> {
        let cql_code = match code {
            CqlValue::Code(c) => c,
            CqlValue::Concept(concept) => concept.codes.first()?,
            _ => return None,
        };

        if let Some(ref display) = cql_code.display {
            return Some(display.clone());
        }

        let system = &cql_code.system;
        let code_str = &cql_code.code;
        let version = cql_code.version.as_deref();

        tokio::runtime::Handle::try_current()
            .ok()
            .and_then(|handle| {
                handle.block_on(async { self.provider.lookup_display(system, code_str, version).await.ok() })
            })
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_creation() {
        let provider = Arc::new(NoOpAsyncTerminologyProvider) as Arc<dyn AsyncTerminologyProvider>;
        let _adapter = TerminologyAdapter::new(provider);
    }

    #[tokio::test]
    async fn test_in_value_set_without_runtime_block_returns_none_outside_handle() {
        let provider = Arc::new(NoOpAsyncTerminologyProvider) as Arc<dyn AsyncTerminologyProvider>;
        let adapter = TerminologyAdapter::new(provider);

        let code = CqlValue::Code(CqlCode {
            system: "http://loinc.org".to_string(),
            version: None,
            code: "8480-6".to_string(),
            display: Some("Systolic blood pressure".to_string()),
        });

        let result = adapter.in_value_set(&code, "http://test.com/vs");
        assert_eq!(result, Some(false));
    }

    #[test]
    fn test_in_code_system_matches_on_system_string() {
        let provider = Arc::new(NoOpAsyncTerminologyProvider) as Arc<dyn AsyncTerminologyProvider>;
        let adapter = TerminologyAdapter::new(provider);

        let code = CqlValue::Code(CqlCode {
            system: "http://loinc.org".to_string(),
            version: None,
            code: "8480-6".to_string(),
            display: None,
        });

        assert_eq!(adapter.in_code_system(&code, "http://loinc.org"), Some(true));
        assert_eq!(adapter.in_code_system(&code, "http://snomed.info/sct"), Some(false));
    }

    #[test]
    fn test_lookup_display_prefers_existing_display() {
        let provider = Arc::new(NoOpAsyncTerminologyProvider) as Arc<dyn AsyncTerminologyProvider>;
        let adapter = TerminologyAdapter::new(provider);

        let concept = CqlValue::Concept(CqlConcept {
            codes: vec![CqlCode {
                system: "http://loinc.org".to_string(),
                version: None,
                code: "8480-6".to_string(),
                display: Some("Systolic blood pressure".to_string()),
            }].into(),
            display: None,
        });

        assert_eq!(
            adapter.lookup_display(&concept),
            Some("Systolic blood pressure".to_string())
        );
    }
}
