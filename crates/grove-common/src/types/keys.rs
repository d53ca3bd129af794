//! Ordered keys and opaque stored values.
//!
//! Keys compare bytewise, which is the only ordering the key-value store
//! knows about. Everything above the store relies on encodings whose byte
//! order matches the logical order of what they encode.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// A store key.
///
/// # Example
///
/// ```rust
/// use grove_common::types::Key;
///
/// let key = Key::from_bytes(&[0x10, 0x15, 0x01]);
/// assert_eq!(key.len(), 3);
/// assert_eq!(key.strinc().unwrap().as_bytes(), &[0x10, 0x15, 0x02]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(Bytes);

impl Key {
    /// Creates an empty key.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Creates a key from a byte slice.
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Creates a key from owned bytes.
    #[inline]
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(Bytes::from(vec))
    }

    /// Returns the length of the key in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the key as a byte slice.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this key starts with the given prefix.
    #[inline]
    #[must_use]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Returns a new key made of this key followed by `suffix`.
    #[must_use]
    pub fn concat(&self, suffix: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(self.len() + suffix.len());
        buf.put_slice(&self.0);
        buf.put_slice(suffix);
        Self(buf.freeze())
    }

    /// Returns the first key that sorts after every key having this key as
    /// a prefix.
    ///
    /// Trailing `0xFF` bytes are dropped and the last remaining byte is
    /// incremented. Returns `None` when the key is empty or all `0xFF`,
    /// since no such key exists.
    #[must_use]
    pub fn strinc(&self) -> Option<Self> {
        let end = self.0.iter().rposition(|&b| b != 0xFF)?;
        let mut bytes = self.0[..=end].to_vec();
        bytes[end] += 1;
        Some(Self::from_vec(bytes))
    }
}

impl Deref for Key {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Key {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for Key {
    #[inline]
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl Ord for Key {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Key {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.0[..self.0.len().min(32)];
        write!(f, "Key(0x{}", hex::encode(shown))?;
        if self.0.len() > 32 {
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}

impl From<&[u8]> for Key {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Key {
    #[inline]
    fn from(vec: Vec<u8>) -> Self {
        Self::from_vec(vec)
    }
}

/// A stored value.
///
/// Values are opaque to the store; the layer writes tuple-encoded rows.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value(Bytes);

impl Value {
    /// Creates an empty value.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Creates a value from a byte slice.
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Creates a value from owned bytes.
    #[inline]
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(Bytes::from(vec))
    }

    /// Returns the length of the value in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value as a byte slice.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Value {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Value {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(vec: Vec<u8>) -> Self {
        Self::from_vec(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let a = Key::from_bytes(b"aaa");
        let b = Key::from_bytes(b"bbb");
        let aa = Key::from_bytes(b"aa");

        assert!(a < b);
        assert!(aa < a);
        assert!(Key::empty() < aa);
    }

    #[test]
    fn test_strinc() {
        let key = Key::from_bytes(b"abc");
        assert_eq!(key.strinc().unwrap().as_bytes(), b"abd");

        let key = Key::from_bytes(&[0x01, 0xFF, 0xFF]);
        assert_eq!(key.strinc().unwrap().as_bytes(), &[0x02]);

        let key = Key::from_bytes(&[0x10, 0xFE]);
        assert_eq!(key.strinc().unwrap().as_bytes(), &[0x10, 0xFF]);
    }

    #[test]
    fn test_strinc_has_no_successor() {
        assert!(Key::empty().strinc().is_none());
        assert!(Key::from_bytes(&[0xFF, 0xFF]).strinc().is_none());
    }

    #[test]
    fn test_strinc_bounds_prefix() {
        let prefix = Key::from_bytes(&[0x10, 0x15, 0x01]);
        let upper = prefix.strinc().unwrap();
        let inside = prefix.concat(&[0xFF, 0xFF, 0x00]);
        assert!(prefix <= inside);
        assert!(inside < upper);
    }

    #[test]
    fn test_key_debug_is_hex() {
        let key = Key::from_bytes(&[0x10, 0xAB]);
        assert_eq!(format!("{key:?}"), "Key(0x10ab)");
    }

    #[test]
    fn test_value_creation() {
        let value = Value::from_bytes(b"hello world");
        assert_eq!(value.len(), 11);
        assert!(!value.is_empty());
        assert!(Value::empty().is_empty());
    }
}
