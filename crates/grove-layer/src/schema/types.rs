//! Column data types.

use std::fmt;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 24-bit signed integer.
    MediumInt,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 8-bit unsigned integer.
    UnsignedTinyInt,
    /// 16-bit unsigned integer.
    UnsignedSmallInt,
    /// 24-bit unsigned integer.
    UnsignedMediumInt,
    /// 32-bit unsigned integer.
    UnsignedInt,
    /// 64-bit unsigned integer.
    UnsignedBigInt,
    /// Exact decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Fixed-length string.
    Char(u32),
    /// Variable-length string.
    Varchar(u32),
    /// Unlimited text.
    Text,
    /// Fixed-length binary.
    Binary(u32),
    /// Variable-length binary.
    Varbinary(u32),
    /// Large object, stored as a reference id.
    Blob,
    /// Days since the epoch.
    Date,
    /// Microseconds since midnight.
    Time,
    /// Microseconds since the epoch, local.
    DateTime,
    /// Microseconds since the epoch, UTC.
    Timestamp,
    /// Calendar year.
    Year,
    /// 128-bit identifier.
    Guid,
    /// Boolean.
    Boolean,
    /// Interval counted in months.
    IntervalMonths,
    /// Interval counted in milliseconds.
    IntervalMillis,
}

impl DataType {
    /// Returns true if values of this type can be stored as tuple elements.
    ///
    /// Interval types are the only ones left out.
    pub fn is_tuple_encodable(&self) -> bool {
        !matches!(self, DataType::IntervalMonths | DataType::IntervalMillis)
    }

    /// Returns true for signed fixed-width integers.
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt
                | DataType::SmallInt
                | DataType::MediumInt
                | DataType::Int
                | DataType::BigInt
        )
    }

    /// Returns true for unsigned fixed-width integers.
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            DataType::UnsignedTinyInt
                | DataType::UnsignedSmallInt
                | DataType::UnsignedMediumInt
                | DataType::UnsignedInt
                | DataType::UnsignedBigInt
        )
    }

    /// Returns true for any fixed-width integer.
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// Returns true for decimals.
    pub fn is_decimal(&self) -> bool {
        matches!(self, DataType::Decimal { .. })
    }

    /// Returns true if this type is a string type.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            DataType::Char(_) | DataType::Varchar(_) | DataType::Text
        )
    }

    /// Returns true for temporal types.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date
                | DataType::Time
                | DataType::DateTime
                | DataType::Timestamp
                | DataType::Year
        )
    }

    /// Inclusive value range of an integer type.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            DataType::TinyInt => (i128::from(i8::MIN), i128::from(i8::MAX)),
            DataType::SmallInt => (i128::from(i16::MIN), i128::from(i16::MAX)),
            DataType::MediumInt => (-(1 << 23), (1 << 23) - 1),
            DataType::Int => (i128::from(i32::MIN), i128::from(i32::MAX)),
            DataType::BigInt => (i128::from(i64::MIN), i128::from(i64::MAX)),
            DataType::UnsignedTinyInt => (0, i128::from(u8::MAX)),
            DataType::UnsignedSmallInt => (0, i128::from(u16::MAX)),
            DataType::UnsignedMediumInt => (0, (1 << 24) - 1),
            DataType::UnsignedInt => (0, i128::from(u32::MAX)),
            DataType::UnsignedBigInt => (0, i128::from(u64::MAX)),
            _ => return None,
        };
        Some(range)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::TinyInt => write!(f, "TINYINT"),
            DataType::SmallInt => write!(f, "SMALLINT"),
            DataType::MediumInt => write!(f, "MEDIUMINT"),
            DataType::Int => write!(f, "INT"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::UnsignedTinyInt => write!(f, "TINYINT UNSIGNED"),
            DataType::UnsignedSmallInt => write!(f, "SMALLINT UNSIGNED"),
            DataType::UnsignedMediumInt => write!(f, "MEDIUMINT UNSIGNED"),
            DataType::UnsignedInt => write!(f, "INT UNSIGNED"),
            DataType::UnsignedBigInt => write!(f, "BIGINT UNSIGNED"),
            DataType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({}, {})", precision, scale)
            }
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Char(len) => write!(f, "CHAR({})", len),
            DataType::Varchar(len) => write!(f, "VARCHAR({})", len),
            DataType::Text => write!(f, "TEXT"),
            DataType::Binary(len) => write!(f, "BINARY({})", len),
            DataType::Varbinary(len) => write!(f, "VARBINARY({})", len),
            DataType::Blob => write!(f, "BLOB"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::DateTime => write!(f, "DATETIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Year => write!(f, "YEAR"),
            DataType::Guid => write!(f, "GUID"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::IntervalMonths => write!(f, "INTERVAL_MONTHS"),
            DataType::IntervalMillis => write!(f, "INTERVAL_MILLIS"),
        }
    }
}
