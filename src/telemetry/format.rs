//! # Value Formatting
//!
//! Renders document values as the plain strings that get published.

use super::document::Value;

/// Fraction digits used for floating point readings
pub const FLOAT_PRECISION: usize = 2;

/// Format one value for publishing
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Float(f) => format_float(*f),
    }
}

/// Fixed-width decimal rendering with two fraction digits
///
/// The minimum field width is 2 for magnitudes below 1, otherwise
/// `floor(log10(|v|)) + 4`; shorter renderings are right-aligned with
/// spaces, longer ones are never truncated.
///
/// # Examples
///
/// ```
/// use lora_mqtt_gateway::telemetry::format::format_float;
///
/// assert_eq!(format_float(0.5), "0.50");
/// assert_eq!(format_float(-123.4), "-123.40");
/// ```
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let width = float_width(value);
    format!("{:>width$.prec$}", value, width = width, prec = FLOAT_PRECISION)
}

fn float_width(value: f64) -> usize {
    let magnitude = value.abs();
    if magnitude < 1.0 {
        2
    } else {
        magnitude.log10().floor() as usize + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_small_magnitude() {
        assert_eq!(format_float(0.5), "0.50");
        assert_eq!(format_float(0.0), "0.00");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(0.999), "1.00");
    }

    #[test]
    fn test_format_float_negative_magnitude() {
        assert_eq!(format_float(-123.4), "-123.40");
    }

    #[test]
    fn test_format_float_rounds_to_two_digits() {
        assert_eq!(format_float(3.41), "3.41");
        assert_eq!(format_float(3.416), "3.42");
        assert_eq!(format_float(12.0), "12.00");
        assert_eq!(format_float(1000.5), "1000.50");
    }

    #[test]
    fn test_float_width() {
        assert_eq!(float_width(0.5), 2);
        assert_eq!(float_width(1.0), 4);
        assert_eq!(float_width(9.99), 4);
        assert_eq!(float_width(10.0), 5);
        assert_eq!(float_width(-123.4), 6);
    }

    #[test]
    fn test_format_float_non_finite() {
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_format_value_dispatch() {
        assert_eq!(format_value(&Value::String("YES".to_string())), "YES");
        assert_eq!(format_value(&Value::Int(-47)), "-47");
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_value(&Value::Bool(false)), "false");
        assert_eq!(format_value(&Value::Float(3.41)), "3.41");
    }
}
