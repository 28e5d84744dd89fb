//! The CQL static type lattice.
//!
//! `CqlType` is the compile-time counterpart to `CqlValue` (see `value.rs`):
//! every runtime value has exactly one `CqlType`, but a `CqlType` can be the
//! *static* type of many values (e.g. `System.Any` describes all of them).
//! Subtyping and least-upper-bound (`common_supertype`) are the two
//! operations the rest of the workspace actually calls — the overload
//! resolver uses `is_subtype_of` to pick a signature, the parser's inference
//! pass uses `common_supertype` to type `if`/`case`/list-literal expressions
//! whose branches disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A type in the CQL type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CqlType {
    /// Supertype of every other type, including itself.
    Any,

    Boolean,
    Integer,
    Long,
    Decimal,
    String,

    Date,
    DateTime,
    Time,

    Quantity,
    Ratio,
    Code,
    Concept,
    Vocabulary,

    #[serde(rename = "List")]
    List(Box<CqlType>),
    #[serde(rename = "Interval")]
    Interval(Box<CqlType>),
    #[serde(rename = "Tuple")]
    Tuple(Vec<TupleTypeElement>),

    /// A union type: a value typed `Choice(Ts)` conforms to whichever of
    /// `Ts` its runtime value actually matches.
    #[serde(rename = "Choice")]
    Choice(Vec<CqlType>),

    /// A model-defined type reference, e.g. `FHIR.Patient`. Anything not
    /// covered by the `System` primitives above ends up here.
    #[serde(rename = "NamedType")]
    Named {
        namespace: Option<String>,
        name: String,
    },
}

/// Where a primitive type sits in the `Integer < Long < Decimal` numeric
/// tower. Kept as a single ranked table rather than duplicating the pairwise
/// comparisons in both `is_subtype_of` and `common_supertype` — adding a
/// numeric type later (e.g. an unsigned kind) only means extending this
/// list, not re-deriving the promotion rules in two places.
pub(crate) const NUMERIC_TOWER: &[CqlType] = &[CqlType::Integer, CqlType::Long, CqlType::Decimal];

pub(crate) fn numeric_rank(ty: &CqlType) -> Option<usize> {
    NUMERIC_TOWER.iter().position(|t| t == ty)
}

impl CqlType {
    pub fn any() -> Self {
        Self::Any
    }

    pub fn list(element_type: CqlType) -> Self {
        Self::List(Box::new(element_type))
    }

    pub fn interval(point_type: CqlType) -> Self {
        Self::Interval(Box::new(point_type))
    }

    pub fn tuple(elements: Vec<TupleTypeElement>) -> Self {
        Self::Tuple(elements)
    }

    pub fn choice(types: Vec<CqlType>) -> Self {
        Self::Choice(types)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Integer | Self::Long | Self::Decimal | Self::String
        )
    }

    pub fn is_numeric(&self) -> bool {
        numeric_rank(self).is_some()
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }

    pub fn is_clinical(&self) -> bool {
        matches!(
            self,
            Self::Quantity | Self::Ratio | Self::Code | Self::Concept | Self::Vocabulary
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Interval(_) | Self::Tuple(_))
    }

    /// Types CQL's comparison operators (`<`, `<=`, `>`, `>=`) accept.
    pub fn is_ordered(&self) -> bool {
        self.is_numeric()
            || matches!(
                self,
                Self::String | Self::Date | Self::DateTime | Self::Time | Self::Quantity
            )
    }

    /// Interval point types are exactly the ordered types: an interval
    /// without a total order on its endpoints can't support `contains`,
    /// `overlaps`, or the other interval predicates.
    pub fn is_interval_point_type(&self) -> bool {
        self.is_ordered()
    }

    /// The namespace a type is known by. Every `System` primitive reports
    /// `"System"` even though the enum doesn't carry that string anywhere —
    /// it's implicit in which variant it is, not a stored field.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Named { namespace, .. } => namespace.as_deref(),
            Self::List(_) | Self::Interval(_) | Self::Tuple(_) | Self::Choice(_) => None,
            _ => Some("System"),
        }
    }

    fn system_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Any => "Any",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Quantity => "Quantity",
            Self::Ratio => "Ratio",
            Self::Code => "Code",
            Self::Concept => "Concept",
            Self::Vocabulary => "Vocabulary",
            _ => return None,
        })
    }

    /// The unqualified name of this type (`"Integer"`, `"List"`, `"Patient"`).
    pub fn name(&self) -> &str {
        if let Some(n) = self.system_name() {
            return n;
        }
        match self {
            Self::List(_) => "List",
            Self::Interval(_) => "Interval",
            Self::Tuple(_) => "Tuple",
            Self::Choice(_) => "Choice",
            Self::Named { name, .. } => name,
            _ => unreachable!("system_name covers every remaining variant"),
        }
    }

    /// The fully qualified name CQL diagnostics print (`"System.Integer"`,
    /// `"List<System.String>"`).
    pub fn qualified_name(&self) -> String {
        if let Some(n) = self.system_name() {
            return format!("System.{n}");
        }
        match self {
            Self::List(elem) => format!("List<{}>", elem.qualified_name()),
            Self::Interval(point) => format!("Interval<{}>", point.qualified_name()),
            Self::Tuple(elements) => {
                let elems: Vec<String> = elements
                    .iter()
                    .map(|e| format!("{}: {}", e.name, e.element_type.qualified_name()))
                    .collect();
                format!("Tuple {{ {} }}", elems.join(", "))
            }
            Self::Choice(types) => {
                let names: Vec<String> = types.iter().map(Self::qualified_name).collect();
                format!("Choice<{}>", names.join(", "))
            }
            Self::Named { namespace, name } => match namespace {
                Some(ns) => format!("{ns}.{name}"),
                None => name.clone(),
            },
            _ => unreachable!("system_name covers every remaining variant"),
        }
    }

    pub fn element_type(&self) -> Option<&CqlType> {
        match self {
            Self::List(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn point_type(&self) -> Option<&CqlType> {
        match self {
            Self::Interval(point) => Some(point),
            _ => None,
        }
    }

    pub fn tuple_elements(&self) -> Option<&[TupleTypeElement]> {
        match self {
            Self::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn choice_types(&self) -> Option<&[CqlType]> {
        match self {
            Self::Choice(types) => Some(types),
            _ => None,
        }
    }

    /// Is `self` usable anywhere `other` is expected?
    ///
    /// `Any` is the top of the lattice; every type, including itself, is a
    /// subtype of it. Below that:
    /// - `Integer <: Long <: Decimal` (see `NUMERIC_TOWER`).
    /// - `List`/`Interval` are covariant in their element/point type.
    /// - A `Choice` on the left is a subtype of `other` only if *every*
    ///   member conforms — a value statically typed as the choice could be
    ///   any of them, so all of them have to satisfy `other`. The symmetric
    ///   case, `other` being a `Choice`, only needs `self` to match one
    ///   member, since that's the one the runtime value will actually be.
    pub fn is_subtype_of(&self, other: &CqlType) -> bool {
        if matches!(other, CqlType::Any) || self == other {
            return true;
        }

        if let CqlType::Choice(members) = self {
            return members.iter().all(|m| m.is_subtype_of(other));
        }

        if let (Some(a), Some(b)) = (numeric_rank(self), numeric_rank(other)) {
            return a <= b;
        }

        match (self, other) {
            (CqlType::List(a), CqlType::List(b)) => a.is_subtype_of(b),
            (CqlType::Interval(a), CqlType::Interval(b)) => a.is_subtype_of(b),
            (_, CqlType::Choice(members)) => members.iter().any(|m| self.is_subtype_of(m)),
            (CqlType::Named { namespace: n1, name: a }, CqlType::Named { namespace: n2, name: b }) => {
                n1 == n2 && a == b
            }
            _ => false,
        }
    }

    pub fn is_supertype_of(&self, other: &CqlType) -> bool {
        other.is_subtype_of(self)
    }

    pub fn is_compatible_with(&self, other: &CqlType) -> bool {
        self.is_subtype_of(other) || other.is_subtype_of(self)
    }

    /// The least upper bound of `self` and `other` in the subtyping
    /// lattice, if one short of `Any` exists. Used to type expressions whose
    /// branches (an `if`'s then/else, a list literal's elements) need a
    /// single static type that covers all of them.
    pub fn common_supertype(&self, other: &CqlType) -> Option<CqlType> {
        if self == other {
            return Some(self.clone());
        }
        if self.is_subtype_of(other) {
            return Some(other.clone());
        }
        if other.is_subtype_of(self) {
            return Some(self.clone());
        }

        if let (Some(a), Some(b)) = (numeric_rank(self), numeric_rank(other)) {
            return Some(NUMERIC_TOWER[a.max(b)].clone());
        }

        match (self, other) {
            (CqlType::List(a), CqlType::List(b)) => a.common_supertype(b).map(CqlType::list),
            (CqlType::Interval(a), CqlType::Interval(b)) => {
                a.common_supertype(b).map(CqlType::interval)
            }
            // No narrower bound exists; falling all the way to `Any` keeps
            // inference total instead of forcing callers to handle `None`
            // for every unrelated pair of concrete types.
            _ => Some(CqlType::Any),
        }
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

impl Default for CqlType {
    fn default() -> Self {
        Self::Any
    }
}

/// A single named slot of a `Tuple` type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleTypeElement {
    pub name: String,
    pub element_type: CqlType,
}

impl TupleTypeElement {
    pub fn new(name: impl Into<String>, element_type: CqlType) -> Self {
        Self {
            name: name.into(),
            element_type,
        }
    }
}

/// The serializable, ELM-shaped counterpart of `CqlType`.
///
/// `CqlType` is what the evaluator and resolver reason about internally;
/// `TypeSpecifier` is the tagged-union shape ELM JSON actually uses for type
/// annotations on declarations and expressions. The two converters below
/// (`to_cql_type`/`from_cql_type`) are the only place that translation
/// happens, so nothing else needs to know ELM's naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeSpecifier {
    #[serde(rename = "NamedTypeSpecifier")]
    Named(NamedTypeSpecifier),
    #[serde(rename = "ListTypeSpecifier")]
    List(ListTypeSpecifier),
    #[serde(rename = "IntervalTypeSpecifier")]
    Interval(IntervalTypeSpecifier),
    #[serde(rename = "TupleTypeSpecifier")]
    Tuple(TupleTypeSpecifier),
    #[serde(rename = "ChoiceTypeSpecifier")]
    Choice(ChoiceTypeSpecifier),
}

/// System type names recognized when a `NamedTypeSpecifier` carries no
/// namespace, or carries `"System"` explicitly. Declared once so
/// `to_cql_type` and the reverse direction in `from_cql_type` can't drift
/// out of sync with each other.
const SYSTEM_TYPE_NAMES: &[(&str, fn() -> CqlType)] = &[
    ("Any", || CqlType::Any),
    ("Boolean", || CqlType::Boolean),
    ("Integer", || CqlType::Integer),
    ("Long", || CqlType::Long),
    ("Decimal", || CqlType::Decimal),
    ("String", || CqlType::String),
    ("Date", || CqlType::Date),
    ("DateTime", || CqlType::DateTime),
    ("Time", || CqlType::Time),
    ("Quantity", || CqlType::Quantity),
    ("Ratio", || CqlType::Ratio),
    ("Code", || CqlType::Code),
    ("Concept", || CqlType::Concept),
    ("Vocabulary", || CqlType::Vocabulary),
];

impl TypeSpecifier {
    pub fn to_cql_type(&self) -> CqlType {
        match self {
            Self::Named(n) => {
                let is_system = n.namespace.is_none() || n.namespace.as_deref() == Some("System");
                if is_system {
                    if let Some((_, make)) = SYSTEM_TYPE_NAMES.iter().find(|(name, _)| *name == n.name) {
                        return make();
                    }
                }
                CqlType::Named {
                    namespace: n.namespace.clone(),
                    name: n.name.clone(),
                }
            }
            Self::List(l) => CqlType::list(l.element_type.to_cql_type()),
            Self::Interval(i) => CqlType::interval(i.point_type.to_cql_type()),
            Self::Tuple(t) => CqlType::tuple(
                t.elements
                    .iter()
                    .map(|e| TupleTypeElement {
                        name: e.name.clone(),
                        element_type: e.element_type.to_cql_type(),
                    })
                    .collect(),
            ),
            Self::Choice(c) => CqlType::choice(c.types.iter().map(Self::to_cql_type).collect()),
        }
    }

    pub fn from_cql_type(cql_type: &CqlType) -> Self {
        if let Some(name) = cql_type.system_name() {
            return Self::Named(NamedTypeSpecifier::system(name));
        }
        match cql_type {
            CqlType::List(elem) => Self::List(ListTypeSpecifier {
                element_type: Box::new(Self::from_cql_type(elem)),
            }),
            CqlType::Interval(point) => Self::Interval(IntervalTypeSpecifier {
                point_type: Box::new(Self::from_cql_type(point)),
            }),
            CqlType::Tuple(elements) => Self::Tuple(TupleTypeSpecifier {
                elements: elements
                    .iter()
                    .map(|e| TupleElementDefinition {
                        name: e.name.clone(),
                        element_type: Self::from_cql_type(&e.element_type),
                    })
                    .collect(),
            }),
            CqlType::Choice(types) => Self::Choice(ChoiceTypeSpecifier {
                types: types.iter().map(Self::from_cql_type).collect(),
            }),
            CqlType::Named { namespace, name } => Self::Named(NamedTypeSpecifier {
                namespace: namespace.clone(),
                name: name.clone(),
            }),
            _ => unreachable!("system_name covers every remaining variant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTypeSpecifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl NamedTypeSpecifier {
    pub fn new(namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self {
            namespace: Some("System".to_string()),
            name: name.into(),
        }
    }

    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTypeSpecifier {
    #[serde(rename = "elementType")]
    pub element_type: Box<TypeSpecifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTypeSpecifier {
    #[serde(rename = "pointType")]
    pub point_type: Box<TypeSpecifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleTypeSpecifier {
    #[serde(rename = "element")]
    pub elements: Vec<TupleElementDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElementDefinition {
    pub name: String,
    #[serde(rename = "elementType")]
    pub element_type: TypeSpecifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceTypeSpecifier {
    #[serde(rename = "choice")]
    pub types: Vec<TypeSpecifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_primitive_numeric_temporal_and_clinical_types() {
        assert!(CqlType::Any.is_any());
        assert!(CqlType::Integer.is_primitive());
        assert!(CqlType::Integer.is_numeric());
        assert!(CqlType::Date.is_temporal());
        assert!(CqlType::Code.is_clinical());
        assert!(CqlType::list(CqlType::Integer).is_collection());
    }

    #[test]
    fn numeric_tower_and_any_subtype_rules_hold() {
        assert!(CqlType::Integer.is_subtype_of(&CqlType::Long));
        assert!(CqlType::Integer.is_subtype_of(&CqlType::Decimal));
        assert!(CqlType::Long.is_subtype_of(&CqlType::Decimal));
        assert!(!CqlType::Decimal.is_subtype_of(&CqlType::Integer));

        assert!(CqlType::Integer.is_subtype_of(&CqlType::Any));
        assert!(CqlType::String.is_subtype_of(&CqlType::Any));
    }

    #[test]
    fn list_and_interval_subtyping_is_covariant() {
        let list_int = CqlType::list(CqlType::Integer);
        let list_decimal = CqlType::list(CqlType::Decimal);
        assert!(list_int.is_subtype_of(&list_decimal));
        assert!(!list_decimal.is_subtype_of(&list_int));

        let interval_int = CqlType::interval(CqlType::Integer);
        let interval_decimal = CqlType::interval(CqlType::Decimal);
        assert!(interval_int.is_subtype_of(&interval_decimal));
    }

    #[test]
    fn choice_on_either_side_follows_all_vs_any_rule() {
        let choice = CqlType::choice(vec![CqlType::Integer, CqlType::String]);

        // A value that could be Integer or String fits where Any is needed.
        assert!(choice.is_subtype_of(&CqlType::Any));
        // Every member has to independently conform for this to hold.
        assert!(!choice.is_subtype_of(&CqlType::Integer));

        // Something known to be an Integer fits a type that merely allows it
        // as one of several choices.
        assert!(CqlType::Integer.is_subtype_of(&choice));
    }

    #[test]
    fn common_supertype_picks_the_numeric_tower_ceiling() {
        assert_eq!(
            CqlType::Integer.common_supertype(&CqlType::Long),
            Some(CqlType::Long)
        );
        assert_eq!(
            CqlType::Integer.common_supertype(&CqlType::Decimal),
            Some(CqlType::Decimal)
        );
        assert_eq!(
            CqlType::String.common_supertype(&CqlType::String),
            Some(CqlType::String)
        );
        assert_eq!(
            CqlType::String.common_supertype(&CqlType::Integer),
            Some(CqlType::Any)
        );
    }

    #[test]
    fn qualified_name_formats_system_and_collection_types() {
        assert_eq!(CqlType::Integer.qualified_name(), "System.Integer");
        assert_eq!(
            CqlType::list(CqlType::String).qualified_name(),
            "List<System.String>"
        );
        assert_eq!(
            CqlType::interval(CqlType::Date).qualified_name(),
            "Interval<System.Date>"
        );
    }

    #[test]
    fn type_specifier_round_trips_through_cql_type() {
        let cql_type = CqlType::list(CqlType::Integer);
        let specifier = TypeSpecifier::from_cql_type(&cql_type);
        let converted = specifier.to_cql_type();
        assert_eq!(cql_type, converted);
    }
}
