//! Order-preserving tuple encoding.
//!
//! A tuple is a sequence of self-describing elements. Packed tuples compare
//! bytewise in the same order as their elements compare, so a packed tuple
//! is a valid ordered store key.

mod element;
mod pack;

pub use element::Element;
pub use pack::{compare_encoded, encode_element, ElementReader};

use grove_common::error::GroveResult;

/// An ordered sequence of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tuple {
    elements: Vec<Element>,
}

impl Tuple {
    /// Creates an empty tuple.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tuple from elements.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the tuple has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Consumes the tuple, returning its elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// Encodes the tuple.
    ///
    /// # Example
    ///
    /// ```rust
    /// use grove_layer::tuple::{Element, Tuple};
    ///
    /// let tuple = Tuple::from_elements(vec![Element::Integer(1), Element::from("a")]);
    /// let bytes = tuple.pack().unwrap();
    /// assert_eq!(Tuple::unpack(&bytes).unwrap(), tuple);
    /// ```
    pub fn pack(&self) -> GroveResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.elements.len() * 9);
        self.pack_into(&mut buf)?;
        Ok(buf)
    }

    /// Appends the encoding to `buf`.
    pub fn pack_into(&self, buf: &mut Vec<u8>) -> GroveResult<()> {
        for element in &self.elements {
            encode_element(buf, element)?;
        }
        Ok(())
    }

    /// Decodes a whole byte string into a tuple.
    pub fn unpack(bytes: &[u8]) -> GroveResult<Self> {
        let mut reader = ElementReader::new(bytes);
        let mut elements = Vec::new();
        while !reader.is_at_end() {
            elements.push(reader.read()?);
        }
        Ok(Self { elements })
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<Element> for Tuple {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
