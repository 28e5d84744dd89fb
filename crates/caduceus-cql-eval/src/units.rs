//! Minimal UCUM-subset unit comparability and canonicalization.
//!
//! CQL quantity comparison and arithmetic only ever needs a small slice of
//! UCUM: the calendar-duration units CQL itself defines (spec.md §3.2), plus
//! the handful of clinical base units that show up in `Quantity` literals.
//! This is not a general UCUM engine; units outside the known table are
//! treated as incomparable rather than guessed at.

/// A unit's dimension (what physical quantity it measures) and its factor
/// relative to the dimension's canonical (SI-ish) unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Time,
    Mass,
    Length,
    Volume,
    Dimensionless,
}

pub struct CanonicalUnit {
    pub dimension: Dimension,
    pub factor: f64,
}

fn lookup(unit: &str) -> Option<CanonicalUnit> {
    use Dimension::*;
    let (dimension, factor) = match unit {
        // time, canonical unit = second
        "s" | "second" | "seconds" => (Time, 1.0),
        "ms" | "millisecond" | "milliseconds" => (Time, 1e-3),
        "min" | "minute" | "minutes" => (Time, 60.0),
        "h" | "hour" | "hours" => (Time, 3600.0),
        "d" | "day" | "days" => (Time, 86_400.0),
        "wk" | "week" | "weeks" => (Time, 604_800.0),
        "mo" | "month" | "months" => (Time, 2_629_800.0), // 365.25d / 12
        "a" | "year" | "years" => (Time, 31_557_600.0),   // 365.25d

        // mass, canonical unit = gram
        "g" | "gram" | "grams" => (Mass, 1.0),
        "kg" | "kilogram" | "kilograms" => (Mass, 1_000.0),
        "mg" | "milligram" | "milligrams" => (Mass, 1e-3),
        "ug" | "microgram" | "micrograms" => (Mass, 1e-6),

        // length, canonical unit = meter
        "m" | "meter" | "meters" => (Length, 1.0),
        "cm" | "centimeter" | "centimeters" => (Length, 1e-2),
        "mm" | "millimeter" | "millimeters" => (Length, 1e-3),
        "km" | "kilometer" | "kilometers" => (Length, 1_000.0),
        "in" | "inch" | "inches" => (Length, 0.0254),
        "[ft_i]" | "ft" | "foot" | "feet" => (Length, 0.3048),

        // volume, canonical unit = liter
        "L" | "l" | "liter" | "liters" => (Volume, 1.0),
        "mL" | "ml" | "milliliter" | "milliliters" => (Volume, 1e-3),

        "1" | "" => (Dimensionless, 1.0),

        _ => return None,
    };
    Some(CanonicalUnit { dimension, factor })
}

/// Are two unit strings dimensionally compatible (convertible via a linear factor)?
pub fn is_comparable(unit_a: &str, unit_b: &str) -> Result<bool, ()> {
    if unit_a == unit_b {
        return Ok(true);
    }
    match (lookup(unit_a), lookup(unit_b)) {
        (Some(a), Some(b)) => Ok(a.dimension == b.dimension),
        _ => Err(()),
    }
}

/// Resolve a unit string to its canonical form for linear comparison/conversion.
pub fn get_canonical_units(unit: &str) -> Result<CanonicalUnit, ()> {
    lookup(unit).ok_or(())
}
