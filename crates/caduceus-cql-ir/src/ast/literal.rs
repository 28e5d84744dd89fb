//! Literal AST nodes for CQL.
//!
//! Builders here are real parser output, not convenience sugar: the
//! `combinators` parser calls `DateLiteral::new`/`with_month`/`with_day`
//! (and the `DateTime`/`Time`/`Quantity`/`Ratio` equivalents) incrementally
//! as each optional component is recognized, so a `@2024` literal never
//! constructs a `month`/`day` it didn't see in the source text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A literal value in CQL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Null literal
    Null,
    /// Boolean literal (true/false)
    Boolean(bool),
    /// Integer literal (32-bit signed)
    Integer(i32),
    /// Long literal (64-bit signed, suffix 'L')
    Long(i64),
    /// Decimal literal (arbitrary precision)
    Decimal(Decimal),
    /// String literal
    String(String),
    /// Date literal (@YYYY-MM-DD)
    Date(DateLiteral),
    /// DateTime literal (@YYYY-MM-DDThh:mm:ss.fff(+|-)hh:mm)
    DateTime(DateTimeLiteral),
    /// Time literal (@Thh:mm:ss.fff)
    Time(TimeLiteral),
    /// Quantity literal (number with unit)
    Quantity(QuantityLiteral),
    /// Ratio literal (quantity:quantity)
    Ratio(RatioLiteral),
}

/// Date literal components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLiteral {
    /// Year (required)
    pub year: i32,
    /// Month (optional)
    pub month: Option<u8>,
    /// Day (optional)
    pub day: Option<u8>,
}

impl DateLiteral {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn with_month(mut self, month: u8) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u8) -> Self {
        self.day = Some(day);
        self
    }
}

/// DateTime literal components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeLiteral {
    /// Date portion
    pub date: DateLiteral,
    /// Hour (optional)
    pub hour: Option<u8>,
    /// Minute (optional)
    pub minute: Option<u8>,
    /// Second (optional)
    pub second: Option<u8>,
    /// Millisecond (optional)
    pub millisecond: Option<u16>,
    /// Timezone offset in minutes (optional)
    pub timezone_offset: Option<i16>,
}

impl DateTimeLiteral {
    pub fn new(date: DateLiteral) -> Self {
        Self {
            date,
            hour: None,
            minute: None,
            second: None,
            millisecond: None,
            timezone_offset: None,
        }
    }

    pub fn with_time(mut self, hour: u8, minute: u8) -> Self {
        self.hour = Some(hour);
        self.minute = Some(minute);
        self
    }

    pub fn with_second(mut self, second: u8) -> Self {
        self.second = Some(second);
        self
    }

    pub fn with_millisecond(mut self, millisecond: u16) -> Self {
        self.millisecond = Some(millisecond);
        self
    }

    pub fn with_timezone(mut self, offset_minutes: i16) -> Self {
        self.timezone_offset = Some(offset_minutes);
        self
    }
}

/// Time literal components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLiteral {
    /// Hour (required)
    pub hour: u8,
    /// Minute (optional)
    pub minute: Option<u8>,
    /// Second (optional)
    pub second: Option<u8>,
    /// Millisecond (optional)
    pub millisecond: Option<u16>,
}

impl TimeLiteral {
    pub fn new(hour: u8) -> Self {
        Self {
            hour,
            minute: None,
            second: None,
            millisecond: None,
        }
    }

    pub fn with_minute(mut self, minute: u8) -> Self {
        self.minute = Some(minute);
        self
    }

    pub fn with_second(mut self, second: u8) -> Self {
        self.second = Some(second);
        self
    }

    pub fn with_millisecond(mut self, millisecond: u16) -> Self {
        self.millisecond = Some(millisecond);
        self
    }
}

/// Quantity literal (value with unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityLiteral {
    /// Numeric value
    pub value: Decimal,
    /// Unit string (UCUM)
    pub unit: Option<String>,
}

impl QuantityLiteral {
    pub fn new(value: Decimal) -> Self {
        Self { value, unit: None }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Ratio literal (two quantities)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioLiteral {
    /// Numerator quantity
    pub numerator: QuantityLiteral,
    /// Denominator quantity
    pub denominator: QuantityLiteral,
}

impl RatioLiteral {
    pub fn new(numerator: QuantityLiteral, denominator: QuantityLiteral) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_literal_builder_leaves_unset_fields_none() {
        let year_only = DateLiteral::new(2024);
        assert_eq!(year_only.month, None);
        assert_eq!(year_only.day, None);

        let full = DateLiteral::new(2024).with_month(6).with_day(15);
        assert_eq!(full.month, Some(6));
        assert_eq!(full.day, Some(15));
    }

    #[test]
    fn datetime_literal_builder_threads_through_the_date_portion() {
        let dt = DateTimeLiteral::new(DateLiteral::new(2024).with_month(6))
            .with_time(10, 30)
            .with_second(15)
            .with_millisecond(500)
            .with_timezone(-300);

        assert_eq!(dt.date.year, 2024);
        assert_eq!(dt.hour, Some(10));
        assert_eq!(dt.millisecond, Some(500));
        assert_eq!(dt.timezone_offset, Some(-300));
    }
}
