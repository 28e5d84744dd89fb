//! The `CQLxxxx` taxonomy every diagnostic is tagged with. Ranges:
//! - CQL0001-CQL0099: parse errors, raised by `caduceus-cql-parser`
//! - CQL0100-CQL0199: semantic errors (unresolved identifiers, type checks)
//! - CQL0200-CQL0299: evaluation errors, one per `EvalError` variant
//!   (`caduceus-cql-eval::error::EvalError::code`)
//! - CQL0300-CQL0399: model errors (FHIR data model, terminology)
//! - CQL0400-CQL0499: system errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a semantic error (0100-0199)
    pub const fn is_semantic_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a model error (0300-0399)
    pub const fn is_model_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CQL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
    /// Link to documentation
    pub docs_url: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
            docs_url: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

use std::collections::HashMap;
use std::sync::LazyLock;

/// `(code, description, help)` rows backing `ERROR_INFO`. `help` is what
/// `CqlError::to_diagnostic` falls back to when the error itself carries
/// no specific context — kept populated for the codes `EvalError::code`
/// (`caduceus-cql-eval`) actually produces, since those are the ones a
/// user sees without an author having to remember to add context.
const ERROR_TABLE: &[(u16, &str, Option<&str>)] = &[
    // Parse errors (0001-0099)
    (1, "Unexpected token", None),
    (2, "Unexpected end of input", None),
    (3, "Invalid identifier", None),
    (4, "Invalid literal", None),
    (5, "Invalid string escape sequence", None),
    (6, "Unterminated string literal", None),
    (7, "Invalid number format", None),
    (8, "Invalid date/time format", None),
    (9, "Invalid quantity format", None),
    (10, "Missing closing delimiter", None),
    (11, "Missing opening delimiter", None),
    (12, "Expected expression", None),
    (13, "Expected identifier", None),
    (14, "Expected type specifier", None),
    (15, "Invalid operator", None),
    (16, "Invalid keyword usage", None),
    (17, "Invalid library definition", None),
    (18, "Invalid using definition", None),
    (19, "Invalid include definition", None),
    (20, "Invalid parameter definition", None),
    (21, "Invalid codesystem definition", None),
    (22, "Invalid valueset definition", None),
    (23, "Invalid code definition", None),
    (24, "Invalid concept definition", None),
    (25, "Invalid context definition", None),
    (26, "Invalid function definition", None),
    (27, "Invalid query expression", None),
    (28, "Invalid retrieve expression", None),
    (29, "Invalid interval expression", None),
    (30, "Invalid list expression", None),
    (31, "Invalid tuple expression", None),
    (32, "Invalid case expression", None),
    (33, "Invalid if expression", None),
    (34, "Invalid aggregate expression", None),
    (35, "Reserved keyword", None),
    // Semantic errors (0100-0199)
    (100, "Undefined identifier", Some("Check that the identifier is defined in scope")),
    (101, "Undefined function", Some("Check the function name and argument count/types against the library's signature")),
    (102, "Undefined type", None),
    (103, "Undefined library", Some("Check the include statement names a library that was actually loaded")),
    (104, "Undefined codesystem", Some("Declare the codesystem before referencing it, or check its name")),
    (105, "Undefined valueset", Some("Declare the valueset before referencing it, or check its name")),
    (106, "Undefined code", None),
    (107, "Undefined concept", None),
    (108, "Undefined parameter", Some("Declare the parameter or supply it when evaluating the library")),
    (109, "Duplicate definition", None),
    (110, "Type mismatch", None),
    (111, "Invalid argument count", None),
    (112, "Invalid argument type", Some("Check each argument's type against the operator's expected operand types")),
    (113, "Ambiguous function call", None),
    (114, "Circular reference", None),
    (115, "Invalid cast", None),
    (116, "Invalid comparison", None),
    (117, "Invalid operation", Some("This operand combination is not supported by the operator")),
    (118, "Context not established", None),
    (119, "Invalid retrieve", None),
    (120, "Invalid property access", Some("Check the property name exists on the value's type")),
    // Evaluation errors (0200-0299)
    (200, "Evaluation failed", None),
    (201, "Null value error", None),
    (202, "Division by zero", Some("CQL division by zero evaluates to null; check for an explicit divide-by-zero guard if that wasn't expected")),
    (203, "Overflow error", Some("The result exceeded the representable range for this numeric type")),
    (204, "Underflow error", None),
    (205, "Invalid conversion", Some("The source value cannot be converted to the requested type")),
    (206, "Invalid index", Some("List and string indices are zero-based; check the index is within bounds")),
    (207, "Invalid slice", None),
    (208, "Invalid interval operation", None),
    (209, "Invalid list operation", None),
    (210, "Invalid date/time operation", Some("Check both operands have enough precision for this operation")),
    (211, "Invalid quantity operation", Some("Quantity operands must share a unit or be convertible between units")),
    (212, "Invalid string operation", Some("The pattern or argument is not valid for this string operation")),
    (213, "Retrieve failed", Some("The data provider raised an error while resolving this retrieve")),
    (214, "External function failed", None),
    (215, "Timeout", Some("Evaluation exceeded its configured time budget")),
    (216, "Resource limit exceeded", Some("Evaluation hit a configured limit (e.g. recursion depth)")),
    // Model errors (0300-0399)
    (300, "Model not found", None),
    (301, "Invalid model version", None),
    (302, "Type not found in model", None),
    (303, "Property not found", None),
    (304, "Invalid profile", None),
    (305, "ModelInfo load failed", None),
    (306, "Terminology lookup failed", Some("Check the terminology provider is configured and the code/valueset exists")),
    (307, "Code validation failed", None),
    (308, "ValueSet expansion failed", None),
    // System errors (0400-0499)
    (400, "Internal error", None),
    (401, "I/O error", None),
    (402, "Configuration error", None),
    (403, "Network error", None),
    (404, "File not found", None),
    (405, "Permission denied", None),
    (406, "Invalid format", None),
];

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    ERROR_TABLE
        .iter()
        .map(|&(code, description, help)| {
            let mut info = ErrorInfo::new(description);
            if let Some(help) = help {
                info = info.with_help(help);
            }
            (code, info)
        })
        .collect()
});

// Convenient error code constants

// Parse errors
pub const CQL0001: ErrorCode = ErrorCode::new(1);
pub const CQL0002: ErrorCode = ErrorCode::new(2);
pub const CQL0003: ErrorCode = ErrorCode::new(3);
pub const CQL0004: ErrorCode = ErrorCode::new(4);
pub const CQL0005: ErrorCode = ErrorCode::new(5);
pub const CQL0006: ErrorCode = ErrorCode::new(6);
pub const CQL0007: ErrorCode = ErrorCode::new(7);
pub const CQL0008: ErrorCode = ErrorCode::new(8);
pub const CQL0009: ErrorCode = ErrorCode::new(9);
pub const CQL0010: ErrorCode = ErrorCode::new(10);
pub const CQL0011: ErrorCode = ErrorCode::new(11);
pub const CQL0012: ErrorCode = ErrorCode::new(12);
pub const CQL0013: ErrorCode = ErrorCode::new(13);
pub const CQL0014: ErrorCode = ErrorCode::new(14);
pub const CQL0015: ErrorCode = ErrorCode::new(15);
pub const CQL0016: ErrorCode = ErrorCode::new(16);
pub const CQL0017: ErrorCode = ErrorCode::new(17);
pub const CQL0018: ErrorCode = ErrorCode::new(18);
pub const CQL0019: ErrorCode = ErrorCode::new(19);
pub const CQL0020: ErrorCode = ErrorCode::new(20);
pub const CQL0021: ErrorCode = ErrorCode::new(21);
pub const CQL0022: ErrorCode = ErrorCode::new(22);
pub const CQL0023: ErrorCode = ErrorCode::new(23);
pub const CQL0024: ErrorCode = ErrorCode::new(24);
pub const CQL0025: ErrorCode = ErrorCode::new(25);
pub const CQL0026: ErrorCode = ErrorCode::new(26);
pub const CQL0027: ErrorCode = ErrorCode::new(27);
pub const CQL0028: ErrorCode = ErrorCode::new(28);
pub const CQL0029: ErrorCode = ErrorCode::new(29);
pub const CQL0030: ErrorCode = ErrorCode::new(30);
pub const CQL0031: ErrorCode = ErrorCode::new(31);
pub const CQL0032: ErrorCode = ErrorCode::new(32);
pub const CQL0033: ErrorCode = ErrorCode::new(33);
pub const CQL0034: ErrorCode = ErrorCode::new(34);
pub const CQL0035: ErrorCode = ErrorCode::new(35);

// Semantic errors
pub const CQL0100: ErrorCode = ErrorCode::new(100);
pub const CQL0101: ErrorCode = ErrorCode::new(101);
pub const CQL0102: ErrorCode = ErrorCode::new(102);
pub const CQL0103: ErrorCode = ErrorCode::new(103);
pub const CQL0104: ErrorCode = ErrorCode::new(104);
pub const CQL0105: ErrorCode = ErrorCode::new(105);
pub const CQL0106: ErrorCode = ErrorCode::new(106);
pub const CQL0107: ErrorCode = ErrorCode::new(107);
pub const CQL0108: ErrorCode = ErrorCode::new(108);
pub const CQL0109: ErrorCode = ErrorCode::new(109);
pub const CQL0110: ErrorCode = ErrorCode::new(110);
pub const CQL0111: ErrorCode = ErrorCode::new(111);
pub const CQL0112: ErrorCode = ErrorCode::new(112);
pub const CQL0113: ErrorCode = ErrorCode::new(113);
pub const CQL0114: ErrorCode = ErrorCode::new(114);
pub const CQL0115: ErrorCode = ErrorCode::new(115);
pub const CQL0116: ErrorCode = ErrorCode::new(116);
pub const CQL0117: ErrorCode = ErrorCode::new(117);
pub const CQL0118: ErrorCode = ErrorCode::new(118);
pub const CQL0119: ErrorCode = ErrorCode::new(119);
pub const CQL0120: ErrorCode = ErrorCode::new(120);

// Evaluation errors
pub const CQL0200: ErrorCode = ErrorCode::new(200);
pub const CQL0201: ErrorCode = ErrorCode::new(201);
pub const CQL0202: ErrorCode = ErrorCode::new(202);
pub const CQL0203: ErrorCode = ErrorCode::new(203);
pub const CQL0204: ErrorCode = ErrorCode::new(204);
pub const CQL0205: ErrorCode = ErrorCode::new(205);
pub const CQL0206: ErrorCode = ErrorCode::new(206);
pub const CQL0207: ErrorCode = ErrorCode::new(207);
pub const CQL0208: ErrorCode = ErrorCode::new(208);
pub const CQL0209: ErrorCode = ErrorCode::new(209);
pub const CQL0210: ErrorCode = ErrorCode::new(210);
pub const CQL0211: ErrorCode = ErrorCode::new(211);
pub const CQL0212: ErrorCode = ErrorCode::new(212);
pub const CQL0213: ErrorCode = ErrorCode::new(213);
pub const CQL0214: ErrorCode = ErrorCode::new(214);
pub const CQL0215: ErrorCode = ErrorCode::new(215);
pub const CQL0216: ErrorCode = ErrorCode::new(216);

// Model errors
pub const CQL0300: ErrorCode = ErrorCode::new(300);
pub const CQL0301: ErrorCode = ErrorCode::new(301);
pub const CQL0302: ErrorCode = ErrorCode::new(302);
pub const CQL0303: ErrorCode = ErrorCode::new(303);
pub const CQL0304: ErrorCode = ErrorCode::new(304);
pub const CQL0305: ErrorCode = ErrorCode::new(305);
pub const CQL0306: ErrorCode = ErrorCode::new(306);
pub const CQL0307: ErrorCode = ErrorCode::new(307);
pub const CQL0308: ErrorCode = ErrorCode::new(308);

// System errors
pub const CQL0400: ErrorCode = ErrorCode::new(400);
pub const CQL0401: ErrorCode = ErrorCode::new(401);
pub const CQL0402: ErrorCode = ErrorCode::new(402);
pub const CQL0403: ErrorCode = ErrorCode::new(403);
pub const CQL0404: ErrorCode = ErrorCode::new(404);
pub const CQL0405: ErrorCode = ErrorCode::new(405);
pub const CQL0406: ErrorCode = ErrorCode::new(406);
