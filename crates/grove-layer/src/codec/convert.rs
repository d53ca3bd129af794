//! Conversions between column values and tuple elements.

use num_bigint::BigInt;

use grove_common::error::{GroveError, GroveResult};

use crate::row::Value;
use crate::schema::{Column, DataType};
use crate::tuple::Element;

/// Converts a value to the element that stores it.
///
/// Temporal values are stored as integers and large-object references as
/// UUIDs. Interval values have no element form.
pub fn value_to_element(value: &Value) -> GroveResult<Element> {
    let element = match value {
        Value::Null => Element::Null,
        Value::Boolean(b) => Element::Boolean(*b),
        Value::TinyInt(i) => Element::Integer(i64::from(*i)),
        Value::SmallInt(i) => Element::Integer(i64::from(*i)),
        Value::Int(i) => Element::Integer(i64::from(*i)),
        Value::BigInt(i) => Element::Integer(*i),
        Value::Unsigned(u) => Element::from(BigInt::from(*u)),
        Value::Decimal(d) => Element::Decimal(*d),
        Value::Float(f) => Element::Float(*f),
        Value::Double(d) => Element::Double(*d),
        Value::String(s) => Element::String(s.clone()),
        Value::Bytes(b) => Element::Bytes(b.clone()),
        Value::Date(d) => Element::Integer(i64::from(*d)),
        Value::Time(t) | Value::Timestamp(t) => Element::Integer(*t),
        Value::Year(y) => Element::Integer(i64::from(*y)),
        Value::Guid(u) | Value::BlobRef(u) => Element::Uuid(*u),
        Value::Interval(_) => {
            return Err(GroveError::not_supported("tuple encoding of interval values"))
        }
    };
    Ok(element)
}

/// Converts an element back to a value of `column`'s type.
///
/// No coercion happens: the element class must be the one the column type
/// stores, and integers must fit the column's range.
pub fn element_to_value(element: Element, column: &Column) -> GroveResult<Value> {
    if element.is_null() {
        return Ok(Value::Null);
    }
    let data_type = column.data_type;
    let mismatch = |actual: &str| GroveError::TypeMismatch {
        column: column.name.clone(),
        expected: data_type.to_string(),
        actual: actual.to_string(),
    };

    if let Some((min, max)) = data_type.integer_range() {
        let wide = integer_value(&element).ok_or_else(|| mismatch(element.type_name()))?;
        if wide < min || wide > max {
            return Err(mismatch(&format!("integer {} out of range", wide)));
        }
        // Range checked above, the narrowing casts are exact.
        let value = match data_type {
            DataType::TinyInt => Value::TinyInt(wide as i8),
            DataType::SmallInt => Value::SmallInt(wide as i16),
            DataType::MediumInt | DataType::Int => Value::Int(wide as i32),
            DataType::BigInt => Value::BigInt(wide as i64),
            _ => Value::Unsigned(wide as u64),
        };
        return Ok(value);
    }

    let value = match (data_type, element) {
        (DataType::Decimal { scale, .. }, Element::Decimal(mut d)) => {
            // Packing drops trailing zeros; restore the column's scale.
            if d.scale() < u32::from(scale) {
                d.rescale(u32::from(scale));
            }
            Value::Decimal(d)
        }
        (DataType::Float, Element::Float(f)) => Value::Float(f),
        (DataType::Double, Element::Double(d)) => Value::Double(d),
        (DataType::Char(_) | DataType::Varchar(_) | DataType::Text, Element::String(s)) => {
            Value::String(s)
        }
        (DataType::Binary(_) | DataType::Varbinary(_), Element::Bytes(b)) => Value::Bytes(b),
        (DataType::Blob, Element::Uuid(u)) => Value::BlobRef(u),
        (DataType::Guid, Element::Uuid(u)) => Value::Guid(u),
        (DataType::Boolean, Element::Boolean(b)) => Value::Boolean(b),
        (DataType::Date, Element::Integer(i)) => {
            Value::Date(i32::try_from(i).map_err(|_| mismatch("integer out of range"))?)
        }
        (DataType::Time, Element::Integer(i)) => Value::Time(i),
        (DataType::DateTime | DataType::Timestamp, Element::Integer(i)) => Value::Timestamp(i),
        (DataType::Year, Element::Integer(i)) => {
            Value::Year(u16::try_from(i).map_err(|_| mismatch("integer out of range"))?)
        }
        (DataType::IntervalMonths | DataType::IntervalMillis, _) => {
            return Err(GroveError::not_supported("tuple decoding of interval columns"))
        }
        (_, other) => return Err(mismatch(other.type_name())),
    };
    Ok(value)
}

fn integer_value(element: &Element) -> Option<i128> {
    match element {
        Element::Integer(i) => Some(i128::from(*i)),
        Element::BigInteger(b) => i128::try_from(b).ok(),
        _ => None,
    }
}
