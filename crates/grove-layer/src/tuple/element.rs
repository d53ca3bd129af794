//! Tuple elements.

use std::fmt;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One typed element of a tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Null.
    Null,
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    String(String),
    /// Integer whose magnitude fits in i64.
    Integer(i64),
    /// Integer outside the i64 range.
    BigInteger(BigInt),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// 128-bit UUID.
    Uuid(Uuid),
    /// Exact decimal.
    Decimal(Decimal),
}

impl Element {
    /// Short name of the element class.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Null => "null",
            Element::Bytes(_) => "bytes",
            Element::String(_) => "string",
            Element::Integer(_) => "integer",
            Element::BigInteger(_) => "big integer",
            Element::Float(_) => "float",
            Element::Double(_) => "double",
            Element::Boolean(_) => "boolean",
            Element::Uuid(_) => "uuid",
            Element::Decimal(_) => "decimal",
        }
    }

    /// Returns true for [`Element::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Element::Null)
    }

    /// Returns the value of an integer element as a big integer.
    pub fn as_big_integer(&self) -> Option<BigInt> {
        match self {
            Element::Integer(i) => Some(BigInt::from(*i)),
            Element::BigInteger(b) => Some(b.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Null => write!(f, "null"),
            Element::Bytes(b) => write!(f, "b'{}'", hex::encode(b)),
            Element::String(s) => write!(f, "'{}'", s),
            Element::Integer(i) => write!(f, "{}", i),
            Element::BigInteger(b) => write!(f, "{}", b),
            Element::Float(v) => write!(f, "{}f", v),
            Element::Double(v) => write!(f, "{}", v),
            Element::Boolean(b) => write!(f, "{}", b),
            Element::Uuid(u) => write!(f, "{}", u),
            Element::Decimal(d) => write!(f, "{}m", d),
        }
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Integer(v)
    }
}

impl From<BigInt> for Element {
    fn from(v: BigInt) -> Self {
        match i64::try_from(&v) {
            Ok(i) => Element::Integer(i),
            Err(_) => Element::BigInteger(v),
        }
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Element::String(v.to_string())
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Element::String(v)
    }
}

impl From<Vec<u8>> for Element {
    fn from(v: Vec<u8>) -> Self {
        Element::Bytes(v)
    }
}

impl From<bool> for Element {
    fn from(v: bool) -> Self {
        Element::Boolean(v)
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Double(v)
    }
}

impl From<Decimal> for Element {
    fn from(v: Decimal) -> Self {
        Element::Decimal(v)
    }
}

impl From<Uuid> for Element {
    fn from(v: Uuid) -> Self {
        Element::Uuid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_integer_narrows() {
        assert_eq!(Element::from(BigInt::from(-5)), Element::Integer(-5));
        let wide = BigInt::from(u64::MAX);
        assert_eq!(Element::from(wide.clone()), Element::BigInteger(wide));
    }

    #[test]
    fn test_display() {
        assert_eq!(Element::from("x").to_string(), "'x'");
        assert_eq!(Element::Bytes(vec![1, 255]).to_string(), "b'01ff'");
        assert_eq!(Element::Null.type_name(), "null");
    }
}
