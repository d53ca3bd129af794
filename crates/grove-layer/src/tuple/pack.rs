//! Binary layout of tuple elements.
//!
//! Every element starts with a type code and the byte order of two encoded
//! elements matches the order of their values. Integers of any width share
//! one numeric order; the codes around `INT_ZERO` carry the magnitude length.

use std::cmp::Ordering;

use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use uuid::Uuid;

use grove_common::error::{GroveError, GroveResult};

use super::element::Element;

pub(crate) const NULL: u8 = 0x00;
pub(crate) const BYTES: u8 = 0x01;
pub(crate) const STRING: u8 = 0x02;
pub(crate) const NEG_INT_LONG: u8 = 0x0B;
pub(crate) const INT_ZERO: u8 = 0x14;
pub(crate) const POS_INT_LONG: u8 = 0x1D;
pub(crate) const FLOAT: u8 = 0x20;
pub(crate) const DOUBLE: u8 = 0x21;
pub(crate) const FALSE: u8 = 0x26;
pub(crate) const TRUE: u8 = 0x27;
pub(crate) const UUID: u8 = 0x30;
pub(crate) const DECIMAL: u8 = 0x40;

const DECIMAL_NEGATIVE: u8 = 0x01;
const DECIMAL_ZERO: u8 = 0x02;
const DECIMAL_POSITIVE: u8 = 0x03;
const DECIMAL_EXPONENT_BIAS: i32 = 0x80;
const MAX_DECIMAL_SCALE: i32 = 28;

const ESCAPE: u8 = 0xFF;

// =============================================================================
// Encoding
// =============================================================================

/// Appends the encoding of `element` to `buf`.
pub fn encode_element(buf: &mut Vec<u8>, element: &Element) -> GroveResult<()> {
    match element {
        Element::Null => buf.push(NULL),
        Element::Bytes(b) => encode_escaped(buf, BYTES, b),
        Element::String(s) => encode_escaped(buf, STRING, s.as_bytes()),
        Element::Integer(i) => {
            let magnitude = i.unsigned_abs().to_be_bytes();
            encode_integer(buf, *i < 0, strip_leading_zeros(&magnitude))?;
        }
        Element::BigInteger(b) => {
            let (sign, magnitude) = b.to_bytes_be();
            encode_integer(buf, sign == Sign::Minus, strip_leading_zeros(&magnitude))?;
        }
        Element::Float(f) => {
            buf.push(FLOAT);
            buf.extend_from_slice(&order_float_bits(f.to_bits()).to_be_bytes());
        }
        Element::Double(d) => {
            buf.push(DOUBLE);
            buf.extend_from_slice(&order_double_bits(d.to_bits()).to_be_bytes());
        }
        Element::Boolean(false) => buf.push(FALSE),
        Element::Boolean(true) => buf.push(TRUE),
        Element::Uuid(u) => {
            buf.push(UUID);
            buf.extend_from_slice(u.as_bytes());
        }
        Element::Decimal(d) => encode_decimal(buf, d),
    }
    Ok(())
}

fn encode_escaped(buf: &mut Vec<u8>, code: u8, bytes: &[u8]) {
    buf.push(code);
    for &b in bytes {
        buf.push(b);
        if b == 0x00 {
            buf.push(ESCAPE);
        }
    }
    buf.push(0x00);
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn encode_integer(buf: &mut Vec<u8>, negative: bool, magnitude: &[u8]) -> GroveResult<()> {
    let len = magnitude.len();
    if len == 0 {
        buf.push(INT_ZERO);
        return Ok(());
    }
    if len <= 8 {
        // len <= 8 so the cast cannot truncate
        let len = len as u8;
        if negative {
            buf.push(INT_ZERO - len);
            buf.extend(magnitude.iter().map(|b| !b));
        } else {
            buf.push(INT_ZERO + len);
            buf.extend_from_slice(magnitude);
        }
        return Ok(());
    }

    let len = u8::try_from(len).map_err(|_| {
        GroveError::invalid_argument(format!("integer of {} bytes is too wide to encode", len))
    })?;
    if negative {
        buf.push(NEG_INT_LONG);
        buf.push(len ^ 0xFF);
        buf.extend(magnitude.iter().map(|b| !b));
    } else {
        buf.push(POS_INT_LONG);
        buf.push(len);
        buf.extend_from_slice(magnitude);
    }
    Ok(())
}

fn order_float_bits(bits: u32) -> u32 {
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000
    }
}

fn order_double_bits(bits: u64) -> u64 {
    if bits & 0x8000_0000_0000_0000 != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000_0000_0000
    }
}

fn encode_decimal(buf: &mut Vec<u8>, d: &Decimal) {
    buf.push(DECIMAL);
    if d.is_zero() {
        buf.push(DECIMAL_ZERO);
        return;
    }
    let negative = d.is_sign_negative();
    buf.push(if negative { DECIMAL_NEGATIVE } else { DECIMAL_POSITIVE });

    let digits = d.mantissa().unsigned_abs().to_string();
    // The exponent counts the digits before the stripped trailing zeros.
    let exponent = digits.len() as i32 - d.scale() as i32;
    let significant = digits.trim_end_matches('0');

    let start = buf.len();
    buf.push((exponent + DECIMAL_EXPONENT_BIAS) as u8);
    buf.extend(significant.bytes().map(|c| c - b'0' + 1));
    buf.push(0x00);
    if negative {
        for b in &mut buf[start..] {
            *b = !*b;
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Reads elements off a byte slice.
pub struct ElementReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ElementReader<'a> {
    /// Creates a reader at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns true once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Decodes the next element.
    pub fn read(&mut self) -> GroveResult<Element> {
        let start = self.pos;
        let code = self.take_byte()?;
        match code {
            NULL => Ok(Element::Null),
            BYTES => Ok(Element::Bytes(self.read_escaped()?)),
            STRING => {
                let bytes = self.read_escaped()?;
                String::from_utf8(bytes)
                    .map(Element::String)
                    .map_err(|_| GroveError::tuple_decode(start, "string element is not UTF-8"))
            }
            NEG_INT_LONG => {
                let len = self.take_byte()? ^ 0xFF;
                let magnitude: Vec<u8> = self.take(usize::from(len))?.iter().map(|b| !b).collect();
                Ok(integer_element(Sign::Minus, &magnitude))
            }
            0x0C..=0x13 => {
                let len = usize::from(INT_ZERO - code);
                let magnitude: Vec<u8> = self.take(len)?.iter().map(|b| !b).collect();
                Ok(integer_element(Sign::Minus, &magnitude))
            }
            INT_ZERO => Ok(Element::Integer(0)),
            0x15..=0x1C => {
                let len = usize::from(code - INT_ZERO);
                let magnitude = self.take(len)?.to_vec();
                Ok(integer_element(Sign::Plus, &magnitude))
            }
            POS_INT_LONG => {
                let len = self.take_byte()?;
                let magnitude = self.take(usize::from(len))?.to_vec();
                Ok(integer_element(Sign::Plus, &magnitude))
            }
            FLOAT => {
                let raw = self.take_array::<4>()?;
                let bits = u32::from_be_bytes(raw);
                let bits = if bits & 0x8000_0000 != 0 { bits ^ 0x8000_0000 } else { !bits };
                Ok(Element::Float(f32::from_bits(bits)))
            }
            DOUBLE => {
                let raw = self.take_array::<8>()?;
                let bits = u64::from_be_bytes(raw);
                let bits = if bits & 0x8000_0000_0000_0000 != 0 {
                    bits ^ 0x8000_0000_0000_0000
                } else {
                    !bits
                };
                Ok(Element::Double(f64::from_bits(bits)))
            }
            FALSE => Ok(Element::Boolean(false)),
            TRUE => Ok(Element::Boolean(true)),
            UUID => Ok(Element::Uuid(Uuid::from_bytes(self.take_array::<16>()?))),
            DECIMAL => self.read_decimal(start),
            other => Err(GroveError::tuple_decode(
                start,
                format!("unknown type code 0x{:02x}", other),
            )),
        }
    }

    fn take_byte(&mut self) -> GroveResult<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| GroveError::tuple_decode(self.pos, "unexpected end of tuple"))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, len: usize) -> GroveResult<&'a [u8]> {
        let end = self.pos + len;
        if end > self.bytes.len() {
            return Err(GroveError::tuple_decode(
                self.pos,
                format!("need {} bytes, {} left", len, self.bytes.len() - self.pos),
            ));
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> GroveResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_escaped(&mut self) -> GroveResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let b = self.take_byte()?;
            if b != 0x00 {
                out.push(b);
                continue;
            }
            if self.bytes.get(self.pos) == Some(&ESCAPE) {
                self.pos += 1;
                out.push(0x00);
            } else {
                return Ok(out);
            }
        }
    }

    fn read_decimal(&mut self, start: usize) -> GroveResult<Element> {
        let sign = self.take_byte()?;
        let negative = match sign {
            DECIMAL_ZERO => return Ok(Element::Decimal(Decimal::ZERO)),
            DECIMAL_NEGATIVE => true,
            DECIMAL_POSITIVE => false,
            other => {
                return Err(GroveError::tuple_decode(
                    start,
                    format!("bad decimal sign byte 0x{:02x}", other),
                ))
            }
        };
        let flip = |b: u8| if negative { !b } else { b };

        let exponent = i32::from(flip(self.take_byte()?)) - DECIMAL_EXPONENT_BIAS;
        let mut mantissa: i128 = 0;
        let mut ndigits: i32 = 0;
        loop {
            let b = flip(self.take_byte()?);
            if b == 0x00 {
                break;
            }
            if !(1..=10).contains(&b) {
                return Err(GroveError::tuple_decode(start, "bad decimal digit"));
            }
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(b - 1)))
                .ok_or_else(|| GroveError::tuple_decode(start, "decimal has too many digits"))?;
            ndigits += 1;
        }
        if ndigits == 0 {
            return Err(GroveError::tuple_decode(start, "decimal has no digits"));
        }

        let mut scale = ndigits - exponent;
        if scale < 0 {
            let factor = 10i128
                .checked_pow(scale.unsigned_abs())
                .ok_or_else(|| GroveError::tuple_decode(start, "decimal exponent out of range"))?;
            mantissa = mantissa
                .checked_mul(factor)
                .ok_or_else(|| GroveError::tuple_decode(start, "decimal exponent out of range"))?;
            scale = 0;
        }
        if scale > MAX_DECIMAL_SCALE {
            return Err(GroveError::tuple_decode(start, "decimal scale out of range"));
        }
        if negative {
            mantissa = -mantissa;
        }
        Decimal::try_from_i128_with_scale(mantissa, scale as u32)
            .map(Element::Decimal)
            .map_err(|e| GroveError::tuple_decode(start, e.to_string()))
    }
}

fn integer_element(sign: Sign, magnitude: &[u8]) -> Element {
    Element::from(BigInt::from_bytes_be(sign, magnitude))
}

/// Compares two encoded elements the way their values order.
pub fn compare_encoded(a: &Element, b: &Element) -> GroveResult<Ordering> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    encode_element(&mut left, a)?;
    encode_element(&mut right, b)?;
    Ok(left.cmp(&right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(element: Element) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_element(&mut buf, &element).unwrap();
        buf
    }

    fn decode(bytes: &[u8]) -> Element {
        let mut reader = ElementReader::new(bytes);
        let element = reader.read().unwrap();
        assert!(reader.is_at_end());
        element
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_integer_layout() {
        assert_eq!(encode(Element::Integer(0)), vec![0x14]);
        assert_eq!(encode(Element::Integer(1)), vec![0x15, 0x01]);
        assert_eq!(encode(Element::Integer(-1)), vec![0x13, 0xFE]);
        assert_eq!(encode(Element::Integer(256)), vec![0x16, 0x01, 0x00]);
        assert_eq!(
            encode(Element::Integer(i64::MAX)),
            vec![0x1C, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_integer_extremes_decode_narrow() {
        for v in [i64::MIN, i64::MIN + 1, -1, 0, 1, i64::MAX] {
            assert_eq!(decode(&encode(Element::Integer(v))), Element::Integer(v));
        }
    }

    #[test]
    fn test_big_integers() {
        let huge = BigInt::from(u64::MAX) * BigInt::from(1000);
        let bytes = encode(Element::BigInteger(huge.clone()));
        assert_eq!(bytes[0], POS_INT_LONG);
        assert_eq!(decode(&bytes), Element::BigInteger(huge.clone()));

        let neg = -huge;
        let bytes = encode(Element::BigInteger(neg.clone()));
        assert_eq!(bytes[0], NEG_INT_LONG);
        assert_eq!(decode(&bytes), Element::BigInteger(neg));

        let just_over: BigInt = BigInt::from(i64::MAX) + 1;
        assert_eq!(
            decode(&encode(Element::BigInteger(just_over.clone()))),
            Element::BigInteger(just_over)
        );
    }

    #[test]
    fn test_integer_order_across_widths() {
        let values = vec![
            Element::BigInteger(-(BigInt::from(u64::MAX) * 7i32)),
            Element::BigInteger(BigInt::from(i64::MIN) - 1),
            Element::Integer(i64::MIN),
            Element::Integer(-65536),
            Element::Integer(-1),
            Element::Integer(0),
            Element::Integer(255),
            Element::Integer(i64::MAX),
            Element::BigInteger(BigInt::from(u64::MAX)),
            Element::BigInteger(BigInt::from(u64::MAX) * 7),
        ];
        for pair in values.windows(2) {
            assert_eq!(
                compare_encoded(&pair[0], &pair[1]).unwrap(),
                Ordering::Less,
                "{} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_decimal_order() {
        let values = ["-100", "-1.29", "-1.28", "-0.001", "0", "0.0005", "1.27", "1.28", "10", "12.5"];
        for pair in values.windows(2) {
            let a = Element::Decimal(dec(pair[0]));
            let b = Element::Decimal(dec(pair[1]));
            assert_eq!(compare_encoded(&a, &b).unwrap(), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_decimal_round_trip_normalizes() {
        for s in ["1.50", "-1.29", "1200", "0.000", "-0.0001", "79228162514264337593543950335"] {
            let d = dec(s);
            match decode(&encode(Element::Decimal(d))) {
                Element::Decimal(back) => assert_eq!(back, d, "{}", s),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(encode(Element::Decimal(dec("0"))), vec![DECIMAL, 0x02]);
        assert_eq!(encode(Element::Decimal(dec("1.5"))), encode(Element::Decimal(dec("1.500"))));
    }

    #[test]
    fn test_string_escaping() {
        let bytes = encode(Element::Bytes(vec![0x61, 0x00, 0x62]));
        assert_eq!(bytes, vec![BYTES, 0x61, 0x00, 0xFF, 0x62, 0x00]);
        assert_eq!(decode(&bytes), Element::Bytes(vec![0x61, 0x00, 0x62]));

        let a = Element::from("ab");
        let b = Element::from("ab\u{0}");
        let c = Element::from("abc");
        assert_eq!(compare_encoded(&a, &b).unwrap(), Ordering::Less);
        assert_eq!(compare_encoded(&b, &c).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_float_order() {
        let values = [f64::NEG_INFINITY, -2.5, -0.0, 0.0, 1e-300, 3.25, f64::INFINITY];
        for pair in values.windows(2) {
            assert_eq!(
                compare_encoded(&Element::Double(pair[0]), &Element::Double(pair[1])).unwrap(),
                Ordering::Less
            );
        }
        assert_eq!(decode(&encode(Element::Float(-1.5))), Element::Float(-1.5));
        assert_eq!(decode(&encode(Element::Double(-0.0))), Element::Double(-0.0));
    }

    #[test]
    fn test_decode_errors() {
        let mut reader = ElementReader::new(&[0x7F]);
        assert_eq!(
            reader.read().unwrap_err().code(),
            grove_common::ErrorCode::TupleDecode
        );

        let mut reader = ElementReader::new(&[STRING, 0x61]);
        assert!(reader.read().is_err());

        let mut reader = ElementReader::new(&[0x16, 0x01]);
        assert!(reader.read().is_err());

        let mut reader = ElementReader::new(&[STRING, 0xC3, 0x28, 0x00]);
        assert!(reader.read().is_err());
    }

    mod ordering {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_integers_order_like_values(a in any::<i64>(), b in any::<i64>()) {
                let ordering = compare_encoded(&Element::Integer(a), &Element::Integer(b)).unwrap();
                prop_assert_eq!(ordering, a.cmp(&b));
            }

            #[test]
            fn test_bytes_order_like_values(
                a in proptest::collection::vec(prop_oneof![Just(0x00u8), Just(0xFFu8), any::<u8>()], 0..8),
                b in proptest::collection::vec(prop_oneof![Just(0x00u8), Just(0xFFu8), any::<u8>()], 0..8),
            ) {
                let ordering = compare_encoded(&Element::Bytes(a.clone()), &Element::Bytes(b.clone())).unwrap();
                prop_assert_eq!(ordering, a.cmp(&b));
                prop_assert_eq!(decode(&encode(Element::Bytes(a.clone()))), Element::Bytes(a));
            }

            #[test]
            fn test_strings_order_like_values(a in "[a\\x00\\u{e9}]{0,6}", b in "[a\\x00\\u{e9}]{0,6}") {
                let ordering = compare_encoded(&Element::from(a.as_str()), &Element::from(b.as_str())).unwrap();
                prop_assert_eq!(ordering, a.as_bytes().cmp(b.as_bytes()));
            }
        }
    }
}
