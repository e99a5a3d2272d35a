//! Unit conversion
//!
//! Every unit except temperature is a plain multiplier against the base unit
//! of its category (metre, kilogram, second, byte), so conversions are linear.
//! Temperatures are affine and go through kelvin.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Cannot convert {from} ({from_category}) to {to} ({to_category})")]
    CategoryMismatch {
        from: String,
        from_category: Category,
        to: String,
        to_category: Category,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Length,
    Mass,
    Time,
    DataSize,
    Temperature,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Length,
        Category::Mass,
        Category::Time,
        Category::DataSize,
        Category::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Length => "length",
            Category::Mass => "mass",
            Category::Time => "time",
            Category::DataSize => "data_size",
            Category::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub symbol: &'static str,
    pub name: &'static str,
    pub category: Category,
    /// Multiplier to the category base unit. Unused for temperatures.
    pub factor: f64,
}

const fn unit(symbol: &'static str, name: &'static str, category: Category, factor: f64) -> Unit {
    Unit {
        symbol,
        name,
        category,
        factor,
    }
}

const KB: f64 = 1_000.0;
const KIB: f64 = 1_024.0;

pub const UNITS: &[Unit] = &[
    // Length, base metre
    unit("mm", "millimetre", Category::Length, 0.001),
    unit("cm", "centimetre", Category::Length, 0.01),
    unit("m", "metre", Category::Length, 1.0),
    unit("km", "kilometre", Category::Length, 1_000.0),
    unit("in", "inch", Category::Length, 0.0254),
    unit("ft", "foot", Category::Length, 0.3048),
    unit("yd", "yard", Category::Length, 0.9144),
    unit("mi", "mile", Category::Length, 1_609.344),
    unit("nmi", "nautical mile", Category::Length, 1_852.0),
    // Mass, base kilogram
    unit("mg", "milligram", Category::Mass, 1e-6),
    unit("g", "gram", Category::Mass, 0.001),
    unit("kg", "kilogram", Category::Mass, 1.0),
    unit("t", "tonne", Category::Mass, 1_000.0),
    unit("oz", "ounce", Category::Mass, 0.028_349_523_125),
    unit("lb", "pound", Category::Mass, 0.453_592_37),
    unit("st", "stone", Category::Mass, 6.350_293_18),
    // Time, base second
    unit("ms", "millisecond", Category::Time, 0.001),
    unit("s", "second", Category::Time, 1.0),
    unit("min", "minute", Category::Time, 60.0),
    unit("h", "hour", Category::Time, 3_600.0),
    unit("d", "day", Category::Time, 86_400.0),
    unit("wk", "week", Category::Time, 604_800.0),
    // Data size, base byte
    unit("bit", "bit", Category::DataSize, 0.125),
    unit("kbit", "kilobit", Category::DataSize, KB / 8.0),
    unit("Mbit", "megabit", Category::DataSize, KB * KB / 8.0),
    unit("Gbit", "gigabit", Category::DataSize, KB * KB * KB / 8.0),
    unit("B", "byte", Category::DataSize, 1.0),
    unit("kB", "kilobyte", Category::DataSize, KB),
    unit("MB", "megabyte", Category::DataSize, KB * KB),
    unit("GB", "gigabyte", Category::DataSize, KB * KB * KB),
    unit("TB", "terabyte", Category::DataSize, KB * KB * KB * KB),
    unit("PB", "petabyte", Category::DataSize, KB * KB * KB * KB * KB),
    unit("KiB", "kibibyte", Category::DataSize, KIB),
    unit("MiB", "mebibyte", Category::DataSize, KIB * KIB),
    unit("GiB", "gibibyte", Category::DataSize, KIB * KIB * KIB),
    unit("TiB", "tebibyte", Category::DataSize, KIB * KIB * KIB * KIB),
    unit("PiB", "pebibyte", Category::DataSize, KIB * KIB * KIB * KIB * KIB),
    // Temperature
    unit("C", "celsius", Category::Temperature, 1.0),
    unit("F", "fahrenheit", Category::Temperature, 1.0),
    unit("K", "kelvin", Category::Temperature, 1.0),
];

/// A value expressed in one unit, used for "show every unit" output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub symbol: &'static str,
    pub name: &'static str,
    pub value: f64,
}

/// Find a unit by symbol or name.
///
/// Symbols match exactly first (`kB` before `KB`), then case-insensitively;
/// names (singular or with a trailing `s`) match case-insensitively.
pub fn find_unit(query: &str) -> Result<&'static Unit, UnitError> {
    let trimmed = query.trim();

    if let Some(unit) = UNITS.iter().find(|u| u.symbol == trimmed) {
        return Ok(unit);
    }

    let lower = trimmed.to_lowercase();
    let singular = lower.strip_suffix('s').unwrap_or(&lower);

    UNITS
        .iter()
        .find(|u| u.name == lower || u.name == singular)
        .or_else(|| {
            UNITS
                .iter()
                .find(|u| u.symbol.eq_ignore_ascii_case(trimmed))
        })
        .ok_or_else(|| UnitError::UnknownUnit(trimmed.to_string()))
}

/// Units belonging to a category, in table order
pub fn units_in(category: Category) -> impl Iterator<Item = &'static Unit> {
    UNITS.iter().filter(move |u| u.category == category)
}

fn to_kelvin(value: f64, unit: &Unit) -> f64 {
    match unit.symbol {
        "C" => value + 273.15,
        "F" => (value - 32.0) * 5.0 / 9.0 + 273.15,
        _ => value,
    }
}

fn from_kelvin(kelvin: f64, unit: &Unit) -> f64 {
    match unit.symbol {
        "C" => kelvin - 273.15,
        "F" => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
        _ => kelvin,
    }
}

/// Convert between two resolved units of the same category.
pub fn convert_units(value: f64, from: &Unit, to: &Unit) -> Result<f64, UnitError> {
    if !value.is_finite() {
        return Err(UnitError::InvalidValue(value.to_string()));
    }

    if from.category != to.category {
        return Err(UnitError::CategoryMismatch {
            from: from.symbol.to_string(),
            from_category: from.category,
            to: to.symbol.to_string(),
            to_category: to.category,
        });
    }

    if from.category == Category::Temperature {
        return Ok(from_kelvin(to_kelvin(value, from), to));
    }

    Ok(value * from.factor / to.factor)
}

/// Convert `value` from the unit named `from` to the unit named `to`.
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    let from = find_unit(from)?;
    let to = find_unit(to)?;
    convert_units(value, from, to)
}

/// Express `value` in every unit of `from`'s category.
pub fn convert_all(value: f64, from: &str) -> Result<Vec<Conversion>, UnitError> {
    let from = find_unit(from)?;

    units_in(from.category)
        .map(|to| {
            Ok(Conversion {
                symbol: to.symbol,
                name: to.name,
                value: convert_units(value, from, to)?,
            })
        })
        .collect()
}

/// Parse a user-supplied number, tolerating `_` and `,` digit separators.
pub fn parse_value(input: &str) -> Result<f64, UnitError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err(UnitError::InvalidValue("value is empty".to_string()));
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| UnitError::InvalidValue(input.trim().to_string()))
}

/// Render a byte count using SI (`kB`, `MB`) or IEC (`KiB`, `MiB`) prefixes.
pub fn format_bytes(bytes: u64, binary: bool) -> String {
    let (step, suffixes): (f64, [&str; 6]) = if binary {
        (KIB, ["B", "KiB", "MiB", "GiB", "TiB", "PiB"])
    } else {
        (KB, ["B", "kB", "MB", "GB", "TB", "PB"])
    };

    let mut value = bytes as f64;
    let mut index = 0;
    while value >= step && index < suffixes.len() - 1 {
        value /= step;
        index += 1;
    }

    if index == 0 {
        format!("{} {}", bytes, suffixes[0])
    } else {
        format!("{:.2} {}", value, suffixes[index])
    }
}

/// Format a converted value without trailing zero noise.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if !(1e-6..1e15).contains(&abs) {
        return format!("{:e}", value);
    }

    let formatted = format!("{:.10}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    // ============================================================================
    // find_unit tests
    // ============================================================================

    #[test]
    fn test_find_unit_by_symbol() {
        assert_eq!(find_unit("km").unwrap().name, "kilometre");
    }

    #[test]
    fn test_find_unit_by_name_plural() {
        assert_eq!(find_unit("Miles").unwrap().symbol, "mi");
    }

    #[test]
    fn test_find_unit_symbol_case_is_significant() {
        assert_eq!(find_unit("Mbit").unwrap().name, "megabit");
        assert_eq!(find_unit("MB").unwrap().name, "megabyte");
        assert_eq!(find_unit("MiB").unwrap().name, "mebibyte");
    }

    #[test]
    fn test_find_unit_unknown() {
        assert_eq!(
            find_unit("parsec").unwrap_err(),
            UnitError::UnknownUnit("parsec".to_string())
        );
    }

    // ============================================================================
    // convert tests
    // ============================================================================

    #[test]
    fn test_convert_km_to_mi() {
        assert_close(convert(1.609344, "km", "mi").unwrap(), 1.0);
    }

    #[test]
    fn test_convert_data_sizes() {
        assert_close(convert(1.0, "KiB", "B").unwrap(), 1024.0);
        assert_close(convert(1.0, "kB", "B").unwrap(), 1000.0);
        assert_close(convert(1.0, "B", "bit").unwrap(), 8.0);
        assert_close(convert(1.0, "GiB", "MiB").unwrap(), 1024.0);
    }

    #[test]
    fn test_convert_temperature() {
        assert_close(convert(100.0, "C", "F").unwrap(), 212.0);
        assert_close(convert(32.0, "F", "C").unwrap(), 0.0);
        assert_close(convert(0.0, "K", "C").unwrap(), -273.15);
    }

    #[test]
    fn test_convert_category_mismatch() {
        let err = convert(1.0, "kg", "m").unwrap_err();
        assert!(matches!(err, UnitError::CategoryMismatch { .. }));
        assert_eq!(err.to_string(), "Cannot convert kg (mass) to m (length)");
    }

    #[test]
    fn test_convert_rejects_nan() {
        assert!(matches!(
            convert(f64::NAN, "m", "km"),
            Err(UnitError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_convert_round_trip_every_pair() {
        let values = [0.0, 1.0, 3.75, 1234.5678, -42.0];
        for category in Category::ALL {
            for a in units_in(category) {
                for b in units_in(category) {
                    for v in values {
                        let there = convert_units(v, a, b).unwrap();
                        let back = convert_units(there, b, a).unwrap();
                        assert_close(back, v);
                    }
                }
            }
        }
    }

    #[test]
    fn test_convert_is_linear() {
        for category in Category::ALL {
            if category == Category::Temperature {
                continue;
            }
            for a in units_in(category) {
                for b in units_in(category) {
                    let base = convert_units(2.5, a, b).unwrap();
                    let scaled = convert_units(2.5 * 7.0, a, b).unwrap();
                    assert_close(scaled, base * 7.0);
                }
            }
        }
    }

    #[test]
    fn test_convert_all_covers_category() {
        let conversions = convert_all(1.0, "h").unwrap();
        assert_eq!(conversions.len(), units_in(Category::Time).count());

        let minutes = conversions.iter().find(|c| c.symbol == "min").unwrap();
        assert_close(minutes.value, 60.0);
    }

    // ============================================================================
    // parse_value / formatting tests
    // ============================================================================

    #[test]
    fn test_parse_value_with_separators() {
        assert_eq!(parse_value("1_000").unwrap(), 1000.0);
        assert_eq!(parse_value(" 2,500.5 ").unwrap(), 2500.5);
    }

    #[test]
    fn test_parse_value_invalid() {
        assert!(parse_value("").is_err());
        assert!(parse_value("abc").is_err());
        assert!(parse_value("inf").is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512, true), "512 B");
        assert_eq!(format_bytes(1536, true), "1.50 KiB");
        assert_eq!(format_bytes(1_500_000, false), "1.50 MB");
    }

    #[test]
    fn test_format_value_trims_zeros() {
        assert_eq!(format_value(1.5), "1.5");
        assert_eq!(format_value(60.0), "60");
        assert_eq!(format_value(0.0), "0");
    }
}
