//! Runtime column values.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 8-bit signed integer.
    TinyInt(i8),
    /// 16-bit signed integer.
    SmallInt(i16),
    /// 32-bit signed integer (also MEDIUMINT).
    Int(i32),
    /// 64-bit signed integer.
    BigInt(i64),
    /// Any unsigned integer.
    Unsigned(u64),
    /// Exact decimal.
    Decimal(Decimal),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// String value.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Date (days since epoch).
    Date(i32),
    /// Time (microseconds since midnight).
    Time(i64),
    /// Timestamp or datetime (microseconds since epoch).
    Timestamp(i64),
    /// Calendar year.
    Year(u16),
    /// GUID value.
    Guid(Uuid),
    /// Reference to a large object stored elsewhere.
    BlobRef(Uuid),
    /// Interval in the unit of its column (months or milliseconds).
    Interval(i64),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value class, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::TinyInt(_) => "tinyint",
            Value::SmallInt(_) => "smallint",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Unsigned(_) => "unsigned",
            Value::Decimal(_) => "decimal",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Year(_) => "year",
            Value::Guid(_) => "guid",
            Value::BlobRef(_) => "blob",
            Value::Interval(_) => "interval",
        }
    }

    /// Returns the value as an i128 if it is any integer.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::TinyInt(v) => Some(i128::from(*v)),
            Value::SmallInt(v) => Some(i128::from(*v)),
            Value::Int(v) => Some(i128::from(*v)),
            Value::BigInt(v) => Some(i128::from(*v)),
            Value::Unsigned(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Converts a numeric value to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => d.to_f64(),
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            other => other.as_i128().map(|i| i as f64),
        }
    }

    /// Returns the string slice of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn class_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::TinyInt(_)
            | Value::SmallInt(_)
            | Value::Int(_)
            | Value::BigInt(_)
            | Value::Unsigned(_)
            | Value::Decimal(_)
            | Value::Float(_)
            | Value::Double(_) => 2,
            Value::String(_) => 3,
            Value::Bytes(_) => 4,
            Value::Date(_) => 5,
            Value::Time(_) => 6,
            Value::Timestamp(_) => 7,
            Value::Year(_) => 8,
            Value::Guid(_) => 9,
            Value::BlobRef(_) => 10,
            Value::Interval(_) => 11,
        }
    }

    /// Total order used for row comparison: NULL first, numbers by value
    /// across widths, strings by code point, then by class.
    pub fn cmp_natural(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Year(a), Value::Year(b)) => a.cmp(b),
            (Value::Guid(a), Value::Guid(b)) | (Value::BlobRef(a), Value::BlobRef(b)) => a.cmp(b),
            (Value::Interval(a), Value::Interval(b)) => a.cmp(b),
            (a, b) if a.class_rank() == 2 && b.class_rank() == 2 => {
                match (a.as_i128(), b.as_i128()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => {
                        let x = a.to_f64().unwrap_or(f64::NAN);
                        let y = b.to_f64().unwrap_or(f64::NAN);
                        x.total_cmp(&y)
                    }
                }
            }
            (a, b) => a.class_rank().cmp(&b.class_rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::TinyInt(i) => write!(f, "{}", i),
            Value::SmallInt(i) => write!(f, "{}", i),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Unsigned(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Date(d) => write!(f, "date({})", d),
            Value::Time(t) => write!(f, "time({})", t),
            Value::Timestamp(t) => write!(f, "timestamp({})", t),
            Value::Year(y) => write!(f, "{}", y),
            Value::Guid(u) => write!(f, "{}", u),
            Value::BlobRef(u) => write!(f, "blob({})", u),
            Value::Interval(i) => write!(f, "interval({})", i),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(Value::Null.cmp_natural(&Value::Int(-5)), Ordering::Less);
        assert_eq!(Value::from("a").cmp_natural(&Value::Null), Ordering::Greater);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_numbers_compare_across_widths() {
        assert_eq!(Value::TinyInt(3).cmp_natural(&Value::BigInt(3)), Ordering::Equal);
        assert_eq!(
            Value::Unsigned(u64::MAX).cmp_natural(&Value::BigInt(i64::MAX)),
            Ordering::Greater
        );
        let d: Decimal = "1.5".parse().unwrap();
        assert_eq!(Value::Decimal(d).cmp_natural(&Value::Int(2)), Ordering::Less);
        assert_eq!(Value::Double(-0.5).cmp_natural(&Value::Float(0.25)), Ordering::Less);
    }

    #[test]
    fn test_same_class() {
        assert_eq!(Value::from("abc").cmp_natural(&Value::from("abd")), Ordering::Less);
        assert_eq!(Value::Date(10).cmp_natural(&Value::Date(2)), Ordering::Greater);
        assert_eq!(Value::from(true).cmp_natural(&Value::from(false)), Ordering::Greater);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(Value::Null.to_string(), "NULL");
        let d: Decimal = "-1.29".parse().unwrap();
        assert_eq!(Value::from(d).to_string(), "-1.29");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Interval(3).type_name(), "interval");
        assert_eq!(Value::Unsigned(1).type_name(), "unsigned");
    }
}
