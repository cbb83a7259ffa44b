//! Quantity parsing and display formatting.

/// Placeholder rendered for an absent or invalid quantity.
pub const MISSING_QUANTITY: &str = "—";

/// Parse a user-entered quantity. Blank, garbage and non-finite input yield
/// `None`.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Decimal comma is accepted when it is the only separator.
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Collapse non-finite values to zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Integers render without decimals, everything else with exactly two.
pub fn format_quantity(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 {
                // Avoid rendering negative zero as "-0".
                let v = if v == 0.0 { 0.0 } else { v };
                format!("{v:.0}")
            } else {
                format!("{v:.2}")
            }
        }
        _ => MISSING_QUANTITY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_render_without_decimals() {
        assert_eq!(format_quantity(Some(12.0)), "12");
        assert_eq!(format_quantity(Some(0.0)), "0");
        assert_eq!(format_quantity(Some(-0.0)), "0");
        assert_eq!(format_quantity(Some(-5.0)), "-5");
    }

    #[test]
    fn fractions_render_with_two_decimals() {
        assert_eq!(format_quantity(Some(3.5)), "3.50");
        assert_eq!(format_quantity(Some(0.125)), "0.13");
    }

    #[test]
    fn missing_and_non_finite_render_placeholder() {
        assert_eq!(format_quantity(None), MISSING_QUANTITY);
        assert_eq!(format_quantity(Some(f64::NAN)), MISSING_QUANTITY);
        assert_eq!(format_quantity(Some(f64::INFINITY)), MISSING_QUANTITY);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("   "), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("inf"), None);
        assert_eq!(parse_quantity("NaN"), None);
    }

    #[test]
    fn parse_accepts_decimal_comma() {
        assert_eq!(parse_quantity(" 4 "), Some(4.0));
        assert_eq!(parse_quantity("2.5"), Some(2.5));
        assert_eq!(parse_quantity("2,5"), Some(2.5));
        assert_eq!(parse_quantity("-3"), Some(-3.0));
        assert_eq!(parse_quantity("1,000.5"), None);
    }
}
