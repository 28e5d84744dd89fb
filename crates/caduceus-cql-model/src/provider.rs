//! Data provider traits for CQL evaluation

use crate::model_info::{PropertyInfo, TypeInfo};
use async_trait::async_trait;
use caduceus_cql_types::{CqlCode, CqlInterval, CqlValue};
use serde_json::Value;

/// Trait for providing data to CQL evaluation
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Retrieve data of a given type with optional code filter
    async fn retrieve(
        &self,
        context: &RetrieveContext,
    ) -> Result<Vec<Value>, DataProviderError>;

    /// Get the model name this provider supports (e.g., "FHIR")
    fn model_name(&self) -> &str;

    /// Get the model version
    fn model_version(&self) -> &str;
}

/// Context for a retrieve operation
#[derive(Debug, Clone)]
pub struct RetrieveContext {
    /// Data type to retrieve (e.g., "Condition", "Observation")
    pub data_type: String,
    /// Template ID / profile URL
    pub template_id: Option<String>,
    /// Code path for filtering
    pub code_path: Option<String>,
    /// Codes to filter by
    pub codes: Option<Vec<CodeValue>>,
    /// Date path for filtering
    pub date_path: Option<String>,
    /// Date range for filtering
    pub date_range: Option<DateRange>,
    /// Context value (e.g., Patient ID)
    pub context_value: Option<String>,
}

impl RetrieveContext {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            template_id: None,
            code_path: None,
            codes: None,
            date_path: None,
            date_range: None,
            context_value: None,
        }
    }
}

/// Code value for filtering
#[derive(Debug, Clone)]
pub struct CodeValue {
    /// Code system URI
    pub system: Option<String>,
    /// Code value
    pub code: String,
    /// Display text
    pub display: Option<String>,
}

/// Date range for filtering
#[derive(Debug, Clone)]
pub struct DateRange {
    /// Start date (ISO format)
    pub start: Option<String>,
    /// End date (ISO format)
    pub end: Option<String>,
}

/// Data provider error
#[derive(Debug, thiserror::Error)]
pub enum DataProviderError {
    #[error("Retrieve failed: {0}")]
    RetrieveFailed(String),

    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for querying a data model's shape (types, properties, what's
/// retrievable, and the primary code path used for terminology filtering).
/// Implemented by `ModelRegistry` from a parsed ModelInfo document.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn get_type(&self, type_name: &str) -> Result<Option<TypeInfo>, ModelProviderError>;

    async fn get_property_type(
        &self,
        parent: &str,
        property: &str,
    ) -> Result<Option<PropertyInfo>, ModelProviderError>;

    fn is_retrievable(&self, type_name: &str) -> bool;

    fn get_primary_code_path(&self, type_name: &str) -> Option<String>;
}

/// Model provider error
#[derive(Debug, thiserror::Error)]
pub enum ModelProviderError {
    #[error("Failed to parse ModelInfo: {0}")]
    ParseError(String),

    #[error("I/O error loading ModelInfo: {0}")]
    IoError(String),

    #[error("Type not found: {0}")]
    TypeNotFound(String),
}

/// Trait for the underlying record store a `Retrieve` expression queries
/// (e.g. a FHIR server client, an in-memory bundle, a CDS Hooks prefetch).
/// `caduceus-cql-eval::retrieve::DataRetrieverAdapter` bridges this async
/// trait into the synchronous `DataProvider` the evaluator calls.
#[async_trait]
pub trait DataRetriever: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn retrieve(
        &self,
        context: &str,
        data_type: &str,
        code_path: Option<&str>,
        codes: Option<&[CqlCode]>,
        valueset: Option<&str>,
        date_path: Option<&str>,
        date_range: Option<&CqlInterval>,
    ) -> Result<Vec<CqlValue>, DataRetrieverError>;
}

/// Data retriever error
#[derive(Debug, thiserror::Error)]
pub enum DataRetrieverError {
    #[error("Retrieve failed: {0}")]
    RetrieveFailed(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),
}
