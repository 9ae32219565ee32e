use crate::error::{Result, SimError};
use crate::graph::Value;

/// Width of the signed range accepted for base 2 literals.
///
/// One more bit than the widest lane, so both 0..=0xFFFF and -0x10000..0 fit.
pub const LITERAL_BITS: u32 = 17;

/// Parses `text` as a signed base 2 numeral that fits in [LITERAL_BITS] bits.
///
/// # Example
/// ```
/// # use partsim::parse_binary;
/// assert_eq!(parse_binary("101").unwrap(), 5);
/// assert_eq!(parse_binary("-1").unwrap(), -1);
/// assert!(parse_binary("102").is_err());
/// ```
///
/// # Errors
///
/// [SimError::InvalidBinaryLiteral] if `text` isn't made of base 2 digits or is out of range.
pub fn parse_binary(text: &str) -> Result<Value> {
    let invalid = || SimError::InvalidBinaryLiteral(text.to_owned());
    let value = Value::from_str_radix(text, 2).map_err(|_| invalid())?;

    let limit: Value = 1 << (LITERAL_BITS - 1);
    if value < -limit || value >= limit {
        return Err(invalid());
    }
    Ok(value)
}

/// Reads the decimal digits of `value` as a base 2 numeral, so 1010 becomes 10.
pub fn reinterpret_binary(value: Value) -> Result<Value> {
    parse_binary(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_binary("0").unwrap(), 0);
        assert_eq!(parse_binary("1").unwrap(), 1);
        assert_eq!(parse_binary("0001").unwrap(), 1);
        assert_eq!(parse_binary("1111111111111111").unwrap(), 0xFFFF);
        assert_eq!(parse_binary("-10000000000000000").unwrap(), -0x10000);
    }

    #[test]
    fn test_parse_binary_range() {
        assert!(matches!(
            parse_binary("10000000000000000"),
            Err(SimError::InvalidBinaryLiteral(text)) if text == "10000000000000000"
        ));
        assert!(parse_binary("-10000000000000001").is_err());
    }

    #[test]
    fn test_parse_binary_rejects_garbage() {
        for text in ["", "2", "0b101", "1 0", "ten"] {
            assert!(parse_binary(text).is_err(), "{:?}", text);
        }
    }

    #[test]
    fn test_reinterpret_binary() {
        assert_eq!(reinterpret_binary(1010).unwrap(), 10);
        assert_eq!(reinterpret_binary(0).unwrap(), 0);
        assert_eq!(reinterpret_binary(-11).unwrap(), -3);
        assert!(reinterpret_binary(12).is_err());
    }
}
