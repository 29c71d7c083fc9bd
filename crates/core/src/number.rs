//! Numeric values stored in the document tree

use std::fmt;

/// A number as read from or written to a document
///
/// Integers keep full `i64` and `u64` precision; everything else is a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Integer view of the number, truncating floats toward zero.
    ///
    /// Out of range floats saturate and NaN becomes zero.
    pub fn as_i128(&self) -> i128 {
        match *self {
            Number::Int(i) => i,
            Number::Float(f) => f as i128,
        }
    }

    /// Clamp into `[min, max]` after converting to an integer
    pub fn clamp(&self, min: i128, max: i128) -> i128 {
        self.as_i128().clamp(min, max)
    }

    /// Exact `i64` view, if the number is an integer in range
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => i64::try_from(i).ok(),
            Number::Float(_) => None,
        }
    }

    /// Exact `u64` view, if the number is an integer in range
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(i) => u64::try_from(i).ok(),
            Number::Float(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Int(value as i128)
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Error returned when a string is not a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNumberError {
    input: String,
}

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse '{}' as a number", self.input)
    }
}

impl std::error::Error for ParseNumberError {}

/// Parse a number from text.
///
/// Strings without a decimal point or exponent are integers, everything
/// else must be a finite float. Digit strings too large for `i128` are kept
/// as floats so integer readers clamp them like any other large number.
pub fn parse(input: &str) -> Result<Number, ParseNumberError> {
    let error = || ParseNumberError {
        input: input.to_string(),
    };

    if !input.contains(['.', 'e', 'E']) {
        if let Ok(value) = input.parse::<i128>() {
            return Ok(Number::Int(value));
        }
        let digits = input.strip_prefix(['+', '-']).unwrap_or(input);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(error());
        }
        return input.parse::<f64>().map(Number::Float).map_err(|_| error());
    }

    let unsigned = input.trim_start_matches(['+', '-']);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(error());
    }

    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Number::Float(value)),
        _ => Err(error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse("42").unwrap(), Number::Int(42));
        assert_eq!(parse("-7").unwrap(), Number::Int(-7));
        assert_eq!(parse("+7").unwrap(), Number::Int(7));
        assert_eq!(
            parse("18446744073709551615").unwrap(),
            Number::Int(u64::MAX as i128)
        );
    }

    #[test]
    fn test_parse_beyond_i128() {
        let huge = format!("1{}", "0".repeat(40));
        assert_eq!(parse(&huge).unwrap(), Number::Float(1e40));
        assert_eq!(parse(&format!("-{}", huge)).unwrap(), Number::Float(-1e40));
        assert_eq!(parse(&huge).unwrap().clamp(0, 255), 255);
        assert!(parse("-").is_err());
        assert!(parse("12345678901234567890123456789012345678901x").is_err());
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse("1.5").unwrap(), Number::Float(1.5));
        assert_eq!(parse("-0.25").unwrap(), Number::Float(-0.25));
        assert_eq!(parse("1e3").unwrap(), Number::Float(1000.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("abc").is_err());
        assert!(parse("1.2.3").is_err());
        assert!(parse("NaN").is_err());
        assert!(parse("inf").is_err());
        assert!(parse(" 1").is_err());
        assert_eq!(
            parse("12a").unwrap_err().to_string(),
            "Could not parse '12a' as a number"
        );
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Number::Int(300).clamp(i8::MIN as i128, i8::MAX as i128), 127);
        assert_eq!(Number::Int(-300).clamp(i8::MIN as i128, i8::MAX as i128), -128);
        assert_eq!(Number::Float(3.9).clamp(0, 10), 3);
        assert_eq!(Number::Float(-3.9).clamp(-10, 10), -3);
        assert_eq!(Number::Float(f64::NAN).clamp(-10, 10), 0);
        assert_eq!(Number::Float(1e40).clamp(0, 255), 255);
    }

    #[test]
    fn test_exact_views() {
        assert_eq!(Number::Int(5).as_i64(), Some(5));
        assert_eq!(Number::Int(-5).as_u64(), None);
        assert_eq!(Number::Float(5.0).as_i64(), None);
        assert_eq!(Number::from(2u8), Number::Int(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Int(10).to_string(), "10");
        assert_eq!(Number::Float(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(0.5).to_string(), "0.5");
    }
}
