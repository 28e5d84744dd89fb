//! Parsing test helpers
//!
//! Utilities for testing CQL parsing, including assertion helpers
//! and utilities for working with parse results and diagnostics.

use caduceus_cql_diagnostics::CqlError;
use caduceus_cql_ir::ast::*;

/// Parse a CQL expression and return the result
pub fn parse_expression(input: &str) -> Result<Expression, CqlError> {
    caduceus_cql_parser::parse_expression(input).map(|spanned| spanned.inner)
}

/// Parse a CQL expression and expect success
pub fn parse_expression_ok(input: &str) -> Expression {
    parse_expression(input).unwrap_or_else(|e| panic!("Failed to parse expression '{input}': {e}"))
}

/// Parse a CQL expression and expect an error
pub fn parse_expression_err(input: &str) -> CqlError {
    match parse_expression(input) {
        Ok(_) => panic!("Expected parse error but got success for: {input}"),
        Err(e) => e,
    }
}

/// Parse a CQL library and return the result
pub fn parse_library(input: &str) -> Result<Library, CqlError> {
    caduceus_cql_parser::parse(input)
}

/// Parse a CQL library and expect success
pub fn parse_library_ok(input: &str) -> Library {
    parse_library(input).unwrap_or_else(|e| panic!("Failed to parse library: {e}"))
}

/// Parse a CQL library and expect an error
pub fn parse_library_err(input: &str) -> CqlError {
    match parse_library(input) {
        Ok(_) => panic!("Expected parse error but got success"),
        Err(e) => e,
    }
}

/// Assert that an expression is a literal
#[track_caller]
pub fn assert_literal(expr: &Expression) -> &Literal {
    match &expr.kind {
        ExpressionKind::Literal(lit) => lit,
        _ => panic!("Expected Literal, got: {:?}", expr.kind),
    }
}

/// Assert that an expression is a specific integer literal
#[track_caller]
pub fn assert_integer_literal(expr: &Expression, expected: i64) {
    let lit = assert_literal(expr);
    match lit {
        Literal::Integer(val) => assert_eq!(*val, expected),
        _ => panic!("Expected Integer literal, got: {:?}", lit),
    }
}

/// Assert that an expression is a specific string literal
#[track_caller]
pub fn assert_string_literal(expr: &Expression, expected: &str) {
    let lit = assert_literal(expr);
    match lit {
        Literal::String(val) => assert_eq!(val, expected),
        _ => panic!("Expected String literal, got: {:?}", lit),
    }
}

/// Assert that an expression is a specific boolean literal
#[track_caller]
pub fn assert_boolean_literal(expr: &Expression, expected: bool) {
    let lit = assert_literal(expr);
    match lit {
        Literal::Boolean(val) => assert_eq!(*val, expected),
        _ => panic!("Expected Boolean literal, got: {:?}", lit),
    }
}

/// Assert that an expression is a binary operation
#[track_caller]
pub fn assert_binary_op(expr: &Expression) -> (&Expression, &str, &Expression) {
    match &expr.kind {
        ExpressionKind::BinaryOp { left, op, right } => (left.as_ref(), op.as_str(), right.as_ref()),
        _ => panic!("Expected BinaryOp, got: {:?}", expr.kind),
    }
}

/// Assert that an expression is a unary operation
#[track_caller]
pub fn assert_unary_op(expr: &Expression) -> (&str, &Expression) {
    match &expr.kind {
        ExpressionKind::UnaryOp { op, operand } => (op.as_str(), operand.as_ref()),
        _ => panic!("Expected UnaryOp, got: {:?}", expr.kind),
    }
}

/// Assert that an expression is an identifier reference
#[track_caller]
pub fn assert_identifier(expr: &Expression, expected: &str) {
    match &expr.kind {
        ExpressionKind::Identifier(name) => assert_eq!(name, expected),
        _ => panic!("Expected Identifier, got: {:?}", expr.kind),
    }
}

/// Assert that an expression is a function call
#[track_caller]
pub fn assert_function_call(expr: &Expression) -> (&str, &[Expression]) {
    match &expr.kind {
        ExpressionKind::FunctionCall { name, arguments } => (name.as_str(), arguments.as_slice()),
        _ => panic!("Expected FunctionCall, got: {:?}", expr.kind),
    }
}

/// Assert that an expression is a query
#[track_caller]
pub fn assert_query(expr: &Expression) -> &Query {
    match &expr.kind {
        ExpressionKind::Query(query) => query,
        _ => panic!("Expected Query, got: {:?}", expr.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_literal() {
        let expr = parse_expression_ok("42");
        assert_integer_literal(&expr, 42);
    }

    #[test]
    fn test_parse_string_literal() {
        let expr = parse_expression_ok("'hello'");
        assert_string_literal(&expr, "hello");
    }

    #[test]
    fn test_parse_boolean_literal() {
        let expr = parse_expression_ok("true");
        assert_boolean_literal(&expr, true);
    }

    #[test]
    fn test_parse_binary_op() {
        let expr = parse_expression_ok("1 + 2");
        let (left, op, right) = assert_binary_op(&expr);
        assert_eq!(op, "+");
        assert_integer_literal(left, 1);
        assert_integer_literal(right, 2);
    }

    #[test]
    fn test_parse_identifier() {
        let expr = parse_expression_ok("PatientAge");
        assert_identifier(&expr, "PatientAge");
    }
}
