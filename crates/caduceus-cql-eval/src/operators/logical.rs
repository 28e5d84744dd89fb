//! Logical Operators for CQL
//!
//! Implements: And, Or, Xor, Implies, Not, IsNull, IsTrue, IsFalse, Coalesce, If, Case
//! All logical operators implement three-valued logic per CQL specification

use crate::context::EvaluationContext;
use crate::engine::CqlEngine;
use crate::error::{EvalError, EvalResult};
use caduceus_cql_ir::elm::{BinaryExpression, CaseExpression, IfExpression, NaryExpression, UnaryExpression};
use caduceus_cql_types::CqlValue;

impl CqlEngine {
    /// Evaluate And operator with three-valued logic
    ///
    /// Truth table:
    /// | A     | B     | A and B |
    /// |-------|-------|---------|
    /// | true  | true  | true    |
    /// | true  | false | false   |
    /// | true  | null  | null    |
    /// | false | true  | false   |
    /// | false | false | false   |
    /// | false | null  | false   |
    /// | null  | true  | null    |
    /// | null  | false | false   |
    /// | null  | null  | null    |
    pub fn eval_and(&self, expr: &BinaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let (left, right) = self.eval_binary_operands(expr, ctx)?;

        match (&left, &right) {
            // If either is false, result is false
            (CqlValue::Boolean(false), _) | (_, CqlValue::Boolean(false)) => {
                Ok(CqlValue::Boolean(false))
            }
            // Both true -> true
            (CqlValue::Boolean(true), CqlValue::Boolean(true)) => {
                Ok(CqlValue::Boolean(true))
            }
            // Any null with non-false -> null
            (CqlValue::Null, _) | (_, CqlValue::Null) => {
                Ok(CqlValue::Null)
            }
            // Type error if not boolean
            _ => Err(EvalError::type_mismatch("Boolean", left.get_type().name())),
        }
    }

    /// Evaluate Or operator with three-valued logic
    ///
    /// Truth table:
    /// | A     | B     | A or B  |
    /// |-------|-------|---------|
    /// | true  | true  | true    |
    /// | true  | false | true    |
    /// | true  | null  | true    |
    /// | false | true  | true    |
    /// | false | false | false   |
    /// | false | null  | null    |
    /// | null  | true  | true    |
    /// | null  | false | null    |
    /// | null  | null  | null    |
    pub fn eval_or(&self, expr: &BinaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let (left, right) = self.eval_binary_operands(expr, ctx)?;

        match (&left, &right) {
            // If either is true, result is true
            (CqlValue::Boolean(true), _) | (_, CqlValue::Boolean(true)) => {
                Ok(CqlValue::Boolean(true))
            }
            // Both false -> false
            (CqlValue::Boolean(false), CqlValue::Boolean(false)) => {
                Ok(CqlValue::Boolean(false))
            }
            // Any null with non-true -> null
            (CqlValue::Null, _) | (_, CqlValue::Null) => {
                Ok(CqlValue::Null)
            }
            // Type error if not boolean
            _ => Err(EvalError::type_mismatch("Boolean", left.get_type().name())),
        }
    }

    /// Evaluate Xor (exclusive or) operator
    ///
    /// Returns true if exactly one operand is true
    pub fn eval_xor(&self, expr: &BinaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let (left, right) = self.eval_binary_operands(expr, ctx)?;

        if left.is_null() || right.is_null() {
            return Ok(CqlValue::Null);
        }

        match (&left, &right) {
            (CqlValue::Boolean(a), CqlValue::Boolean(b)) => {
                Ok(CqlValue::Boolean(*a != *b))
            }
            _ => Err(EvalError::type_mismatch("Boolean", left.get_type().name())),
        }
    }

    /// Evaluate Implies operator
    ///
    /// A implies B is equivalent to (not A) or B
    /// Right-associative
    pub fn eval_implies(&self, expr: &BinaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let (left, right) = self.eval_binary_operands(expr, ctx)?;

        match (&left, &right) {
            // false implies anything -> true
            (CqlValue::Boolean(false), _) => Ok(CqlValue::Boolean(true)),
            // true implies B -> B
            (CqlValue::Boolean(true), CqlValue::Boolean(b)) => Ok(CqlValue::Boolean(*b)),
            (CqlValue::Boolean(true), CqlValue::Null) => Ok(CqlValue::Null),
            // null implies true -> true
            (CqlValue::Null, CqlValue::Boolean(true)) => Ok(CqlValue::Boolean(true)),
            // null implies false -> null, null implies null -> null
            (CqlValue::Null, _) => Ok(CqlValue::Null),
            _ => Err(EvalError::type_mismatch("Boolean", left.get_type().name())),
        }
    }

    /// Evaluate Not operator
    ///
    /// not true -> false
    /// not false -> true
    /// not null -> null
    pub fn eval_not(&self, expr: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&expr.operand, ctx)?;

        match &operand {
            CqlValue::Boolean(b) => Ok(CqlValue::Boolean(!b)),
            CqlValue::Null => Ok(CqlValue::Null),
            _ => Err(EvalError::type_mismatch("Boolean", operand.get_type().name())),
        }
    }

    /// Evaluate IsNull operator
    ///
    /// Returns true if operand is null, false otherwise
    /// Never returns null
    pub fn eval_is_null(&self, expr: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&expr.operand, ctx)?;
        Ok(CqlValue::Boolean(operand.is_null()))
    }

    /// Evaluate IsTrue operator
    ///
    /// Returns true if operand is exactly true, false otherwise
    /// Never returns null
    pub fn eval_is_true(&self, expr: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&expr.operand, ctx)?;
        Ok(CqlValue::Boolean(operand.is_true()))
    }

    /// Evaluate IsFalse operator
    ///
    /// Returns true if operand is exactly false, false otherwise
    /// Never returns null
    pub fn eval_is_false(&self, expr: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&expr.operand, ctx)?;
        Ok(CqlValue::Boolean(operand.is_false()))
    }

    /// Evaluate Coalesce operator
    ///
    /// Returns the first non-null value in the list
    /// If all values are null, returns null
    pub fn eval_coalesce(&self, expr: &NaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        for operand in &expr.operand {
            let value = self.evaluate(operand, ctx)?;
            if !value.is_null() {
                return Ok(value);
            }
        }
        Ok(CqlValue::Null)
    }

    /// Evaluate If expression
    ///
    /// if condition then thenExpr else elseExpr
    pub fn eval_if(&self, expr: &IfExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let condition = self.evaluate(&expr.condition, ctx)?;

        match &condition {
            CqlValue::Boolean(true) => self.evaluate(&expr.then, ctx),
            CqlValue::Boolean(false) | CqlValue::Null => self.evaluate(&expr.else_clause, ctx),
            _ => Err(EvalError::type_mismatch("Boolean", condition.get_type().name())),
        }
    }

    /// Evaluate Case expression
    ///
    /// Supports both:
    /// - case when cond1 then expr1 when cond2 then expr2 else elseExpr end
    /// - case comparand when val1 then expr1 when val2 then expr2 else elseExpr end
    pub fn eval_case(&self, expr: &CaseExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        // If there's a comparand, compare each case item to it
        if let Some(comparand_expr) = &expr.comparand {
            let comparand = self.evaluate(comparand_expr, ctx)?;

            for case_item in &expr.case_item {
                let when_value = self.evaluate(&case_item.when, ctx)?;

                // Use equality comparison
                let equal = match (&comparand, &when_value) {
                    (CqlValue::Null, _) | (_, CqlValue::Null) => false,
                    _ => crate::operators::comparison::cql_equal(&comparand, &when_value)?.unwrap_or(false),
                };

                if equal {
                    return self.evaluate(&case_item.then, ctx);
                }
            }
        } else {
            // No comparand - each when clause is a boolean condition
            for case_item in &expr.case_item {
                let condition = self.evaluate(&case_item.when, ctx)?;

                if condition.is_true() {
                    return self.evaluate(&case_item.then, ctx);
                }
            }
        }

        // No case matched - return else clause or null
        if let Some(else_expr) = &expr.else_clause {
            self.evaluate(else_expr, ctx)
        } else {
            Ok(CqlValue::Null)
        }
    }
}
