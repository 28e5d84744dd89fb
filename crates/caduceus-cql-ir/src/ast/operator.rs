//! CQL operator tokens.
//!
//! Precedence and associativity are encoded once, structurally, in the
//! `chumsky` Pratt-parsing layers in `caduceus-cql-parser::expression` —
//! these enums only carry the operator identity and the bits derived from
//! it that other crates actually consult: category (`is_comparison`,
//! `is_logical`) for type inference, and `symbol`/`UnaryOp::symbol` for
//! rendering an operator in a diagnostic instead of its `Debug` name.

use serde::{Deserialize, Serialize};

/// Binary operators in CQL with their precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Precedence 1 (lowest) - right-associative
    /// Logical implication (A implies B)
    Implies,

    // Precedence 2
    /// Logical or
    Or,
    /// Logical exclusive or
    Xor,

    // Precedence 3
    /// Logical and
    And,

    // Precedence 4
    /// Membership test (element in collection)
    In,
    /// Containment test (collection contains element)
    Contains,

    // Precedence 5
    /// Equality
    Equal,
    /// Inequality
    NotEqual,
    /// Equivalence (null-safe equality)
    Equivalent,
    /// Non-equivalence
    NotEquivalent,

    // Precedence 6
    /// Less than
    Less,
    /// Less than or equal
    LessOrEqual,
    /// Greater than
    Greater,
    /// Greater than or equal
    GreaterOrEqual,

    // Precedence 7
    /// Union of collections
    Union,

    // Precedence 8
    /// Type test (is)
    Is,
    /// Type cast (as)
    As,

    // Precedence 9
    /// Addition
    Add,
    /// Subtraction
    Subtract,
    /// String concatenation
    Concatenate,

    // Precedence 10
    /// Multiplication
    Multiply,
    /// Division
    Divide,
    /// Integer division (truncated)
    TruncatedDivide,
    /// Modulo
    Modulo,

    // Precedence 11 (highest for binary)
    /// Power/exponentiation
    Power,
}

impl BinaryOp {
    /// Check if this is a comparison operator
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Equivalent
                | Self::NotEquivalent
                | Self::Less
                | Self::LessOrEqual
                | Self::Greater
                | Self::GreaterOrEqual
        )
    }

    /// Check if this is a logical operator
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor | Self::Implies)
    }

    /// Get the operator symbol, used in diagnostics instead of the
    /// `Debug` variant name (`op.symbol()` reads as `+`, not `Add`)
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Implies => "implies",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::And => "and",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Equivalent => "~",
            Self::NotEquivalent => "!~",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Union => "|",
            Self::Is => "is",
            Self::As => "as",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Concatenate => "&",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::TruncatedDivide => "div",
            Self::Modulo => "mod",
            Self::Power => "^",
        }
    }
}

/// Unary operators in CQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical not
    Not,
    /// Unary plus
    Plus,
    /// Unary minus (negation)
    Negate,
    /// Existence check
    Exists,
    /// Distinct elements
    Distinct,
    /// Flatten nested lists
    Flatten,
    /// Collapse intervals
    Collapse,
    /// Singleton from
    SingletonFrom,
}

impl UnaryOp {
    /// Get the operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Plus => "+",
            Self::Negate => "-",
            Self::Exists => "exists",
            Self::Distinct => "distinct",
            Self::Flatten => "flatten",
            Self::Collapse => "collapse",
            Self::SingletonFrom => "singleton from",
        }
    }
}

/// Interval operators for specialized interval operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalOp {
    /// Properly includes (interval properly includes point/interval)
    ProperlyIncludes,
    /// Properly included in (point/interval is properly included in interval)
    ProperlyIncludedIn,
    /// Includes (interval includes point/interval)
    Includes,
    /// Included in (point/interval is included in interval)
    IncludedIn,
    /// Before (point/interval is before interval)
    Before,
    /// After (point/interval is after interval)
    After,
    /// Meets (intervals meet)
    Meets,
    /// Meets before (first interval meets second before)
    MeetsBefore,
    /// Meets after (first interval meets second after)
    MeetsAfter,
    /// Overlaps (intervals overlap)
    Overlaps,
    /// Overlaps before
    OverlapsBefore,
    /// Overlaps after
    OverlapsAfter,
    /// Starts (first interval starts second)
    Starts,
    /// Ends (first interval ends second)
    Ends,
    /// During (first interval is during second)
    During,
    /// Same as (intervals are the same)
    SameAs,
    /// Same or before
    SameOrBefore,
    /// Same or after
    SameOrAfter,
}

/// Date/time precision for temporal operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalPrecision {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}
