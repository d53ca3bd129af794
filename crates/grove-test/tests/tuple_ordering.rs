//! Byte order of packed tuples follows value order.

use num_bigint::BigInt;
use proptest::prelude::*;
use rust_decimal::Decimal;

use grove_layer::tuple::{compare_encoded, Element, Tuple};

fn packed(elements: Vec<Element>) -> Vec<u8> {
    Tuple::from_elements(elements).pack().unwrap()
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..=12).prop_map(|(m, scale)| Decimal::new(m, scale))
}

proptest! {
    #[test]
    fn test_i64_order(a in any::<i64>(), b in any::<i64>()) {
        let ord = compare_encoded(&Element::Integer(a), &Element::Integer(b)).unwrap();
        prop_assert_eq!(ord, a.cmp(&b));
    }

    #[test]
    fn test_wide_integer_order(a in any::<i128>(), b in any::<i128>()) {
        let (x, y) = (BigInt::from(a), BigInt::from(b));
        let ord = compare_encoded(&Element::from(x.clone()), &Element::from(y.clone())).unwrap();
        prop_assert_eq!(ord, x.cmp(&y));
    }

    #[test]
    fn test_wide_integer_round_trip(a in any::<i128>()) {
        let element = Element::from(BigInt::from(a));
        let back = Tuple::unpack(&packed(vec![element.clone()])).unwrap();
        prop_assert_eq!(back.get(0), Some(&element));
    }

    #[test]
    fn test_decimal_order(a in decimal(), b in decimal()) {
        let ord = compare_encoded(&Element::Decimal(a), &Element::Decimal(b)).unwrap();
        prop_assert_eq!(ord, a.cmp(&b));
    }

    #[test]
    fn test_double_order(a in any::<f64>(), b in any::<f64>()) {
        let ord = compare_encoded(&Element::Double(a), &Element::Double(b)).unwrap();
        prop_assert_eq!(ord, a.total_cmp(&b));
    }

    #[test]
    fn test_bytes_order(a in proptest::collection::vec(any::<u8>(), 0..16),
                        b in proptest::collection::vec(any::<u8>(), 0..16)) {
        let ord = compare_encoded(&Element::Bytes(a.clone()), &Element::Bytes(b.clone())).unwrap();
        prop_assert_eq!(ord, a.cmp(&b));
    }

    #[test]
    fn test_tuple_order(a in (any::<i64>(), "[a-c\\x00]{0,4}"), b in (any::<i64>(), "[a-c\\x00]{0,4}")) {
        let left = packed(vec![Element::Integer(a.0), Element::from(a.1.as_str())]);
        let right = packed(vec![Element::Integer(b.0), Element::from(b.1.as_str())]);
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }
}

#[test]
fn test_integer_widths_meet() {
    let narrow = packed(vec![Element::Integer(i64::MAX)]);
    let wide = packed(vec![Element::from(BigInt::from(i64::MAX) + 1)]);
    assert!(narrow < wide);

    let narrow = packed(vec![Element::Integer(i64::MIN)]);
    let wide = packed(vec![Element::from(BigInt::from(i64::MIN) - 1)]);
    assert!(wide < narrow);
}

#[test]
fn test_null_sorts_first() {
    let null = packed(vec![Element::Null]);
    for other in [
        Element::Integer(i64::MIN),
        Element::from(""),
        Element::Bytes(Vec::new()),
        Element::Boolean(false),
    ] {
        assert!(null < packed(vec![other]));
    }
}

#[test]
fn test_prefix_tuples_sort_first() {
    let parent = packed(vec![Element::Integer(1), Element::Integer(5)]);
    let child = packed(vec![Element::Integer(1), Element::Integer(5), Element::Integer(2)]);
    let sibling = packed(vec![Element::Integer(1), Element::Integer(6)]);
    assert!(parent < child);
    assert!(child < sibling);
    assert!(child.starts_with(&parent));
}
