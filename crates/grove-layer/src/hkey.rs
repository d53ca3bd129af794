//! Hierarchical keys.
//!
//! An hkey names a row by its ancestry: one segment per table from the group
//! root down to the row's own table, each holding the table ordinal and that
//! table's primary-key values. Because a child's encoded hkey starts with its
//! parent's, the keys of a row and all its descendants form one contiguous
//! range with the parent first.

use std::fmt;

use grove_common::error::{GroveError, GroveResult};

use crate::codec::{element_to_value, value_to_element};
use crate::row::{Row, Value};
use crate::schema::{Group, Table, TableId};
use crate::tuple::{Element, ElementReader};

/// One level of an hkey.
#[derive(Debug, Clone, PartialEq)]
pub struct HKeySegment {
    /// Table of this level.
    pub table: TableId,
    /// Primary-key values of that table.
    pub values: Vec<Value>,
}

/// Ancestry-path key of a row in a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HKey {
    segments: Vec<HKeySegment>,
}

impl HKey {
    /// Starts an hkey at the root table.
    pub fn root(table: TableId, values: Vec<Value>) -> Self {
        Self {
            segments: vec![HKeySegment { table, values }],
        }
    }

    /// Extends the hkey by one level.
    pub fn child(mut self, table: TableId, values: Vec<Value>) -> Self {
        self.segments.push(HKeySegment { table, values });
        self
    }

    /// Builds the hkey of `row`, which must belong to `table`.
    pub fn from_row(table: &Table, row: &Row) -> GroveResult<Self> {
        let segments = table
            .hkey_layout()
            .iter()
            .map(|layout| {
                let values = layout
                    .positions
                    .iter()
                    .map(|&p| {
                        row.value(p).cloned().ok_or_else(|| {
                            GroveError::invalid_argument(format!(
                                "row for {} has no value at key position {}",
                                table.name(),
                                p
                            ))
                        })
                    })
                    .collect::<GroveResult<Vec<_>>>()?;
                Ok(HKeySegment {
                    table: layout.table,
                    values,
                })
            })
            .collect::<GroveResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Returns the segments, root first.
    pub fn segments(&self) -> &[HKeySegment] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the hkey has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the table of the row this hkey names.
    pub fn table(&self) -> Option<TableId> {
        self.segments.last().map(|s| s.table)
    }

    /// Returns the hkey of the parent row.
    pub fn parent(&self) -> Option<HKey> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns true if `self` names a proper ancestor of the row `other`
    /// names.
    pub fn is_ancestor_of(&self, other: &HKey) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Encodes the hkey as tuple bytes.
    pub fn encode(&self) -> GroveResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Appends the encoding to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> GroveResult<()> {
        for segment in &self.segments {
            crate::tuple::encode_element(buf, &Element::Integer(i64::from(segment.table.ordinal())))?;
            for value in &segment.values {
                crate::tuple::encode_element(buf, &value_to_element(value)?)?;
            }
        }
        Ok(())
    }

    /// Decodes hkey bytes of `group`.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the bytes do not describe a root-to-leaf path
    /// of the group.
    pub fn decode(group: &Group, bytes: &[u8]) -> GroveResult<Self> {
        let mut reader = ElementReader::new(bytes);
        let mut segments: Vec<HKeySegment> = Vec::new();
        while !reader.is_at_end() {
            let at = reader.position();
            let table = match reader.read()? {
                Element::Integer(i) => u32::try_from(i)
                    .ok()
                    .and_then(|o| group.table(TableId(o)))
                    .ok_or_else(|| {
                        GroveError::corruption(format!("hkey names unknown table ordinal {} at byte {}", i, at))
                    })?,
                other => {
                    return Err(GroveError::corruption(format!(
                        "hkey segment at byte {} starts with {} instead of a table ordinal",
                        at,
                        other.type_name()
                    )))
                }
            };

            let expected_parent = segments.last().map(|s| s.table);
            let actual_parent = table.parent().map(|j| j.parent);
            if expected_parent != actual_parent {
                return Err(GroveError::corruption(format!(
                    "hkey places table {} under {:?}",
                    table.name(),
                    expected_parent
                )));
            }

            let mut values = Vec::with_capacity(table.primary_key().len());
            for &p in table.primary_key() {
                let column = table
                    .column(p)
                    .ok_or_else(|| GroveError::internal(format!("bad key position {}", p)))?;
                values.push(element_to_value(reader.read()?, column)?);
            }
            segments.push(HKeySegment {
                table: table.id(),
                values,
            });
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for HKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:(", segment.table)?;
            for (j, value) in segment.values.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", value)?;
            }
            write!(f, ")")?;
        }
        write!(f, "}}")
    }
}
