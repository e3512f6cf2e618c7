//! Currency codec for numeric-as-text columns.
//!
//! Currency values (price, total_amount, unit_price, subtotal) are persisted
//! as fixed two-decimal text to avoid floating-point drift in storage. This
//! module is the only place that textual form exists; everything above the
//! storage layer sees plain numbers.

use anyhow::{Context, Result};

/// Encode a currency amount for a TEXT column
pub fn encode_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Parse a stored currency column back into a number
pub fn decode_amount(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("invalid currency value in storage: {:?}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fixes_two_decimals() {
        assert_eq!(encode_amount(19.99), "19.99");
        assert_eq!(encode_amount(10.0), "10.00");
        assert_eq!(encode_amount(0.1), "0.10");
        assert_eq!(encode_amount(9.999), "10.00");
    }

    #[test]
    fn test_round_trip_preserves_value() {
        for value in [0.0, 0.01, 9.99, 19.99, 1234.56] {
            let decoded = decode_amount(&encode_amount(value)).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        assert_eq!(decode_amount(" 5.25 ").unwrap(), 5.25);
    }

    #[test]
    fn test_decode_rejects_non_numeric_text() {
        assert!(decode_amount("nineteen dollars").is_err());
        assert!(decode_amount("").is_err());
    }
}
