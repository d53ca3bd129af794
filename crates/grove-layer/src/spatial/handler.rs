//! Spatial index keys.

use rust_decimal::prelude::ToPrimitive;

use grove_common::error::{GroveError, GroveResult};

use crate::codec::value_to_element;
use crate::row::{Row, Value};
use crate::schema::{DataType, Index, Table};
use crate::tuple::{encode_element, Element};

use super::space::Space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinateKind {
    Decimal,
    Integer,
}

#[derive(Debug, Clone)]
struct Coordinate {
    position: usize,
    column: String,
    kind: CoordinateKind,
}

/// Builds index keys whose spatial fields are folded into one z-value.
///
/// The key fields `first_spatial_field..=last_spatial_field` of the index
/// hold the coordinates; in the key they are replaced by a single integer
/// element at the first spatial position. Other key fields are encoded as
/// usual.
#[derive(Debug, Clone)]
pub struct SpatialIndexHandler {
    index_id: u32,
    key_positions: Vec<usize>,
    first: usize,
    last: usize,
    coordinates: Vec<Coordinate>,
    space: Space,
}

impl SpatialIndexHandler {
    /// Binds a spatial index to its table and space.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the index is not spatial, belongs to another
    ///   table, or its spatial fields do not fit its key or the space.
    /// - `NotSupported` for any dimensionality other than two.
    /// - `SpatialColumnType` for a coordinate column that is neither decimal
    ///   nor an integer.
    pub fn new(index: &Index, table: &Table, space: Space) -> GroveResult<Self> {
        if index.table() != table.id() {
            return Err(GroveError::invalid_argument(format!(
                "index '{}' is not on table {}",
                index.name(),
                table.name()
            )));
        }
        let spec = index.spatial_spec().ok_or_else(|| {
            GroveError::invalid_argument(format!("index '{}' is not spatial", index.name()))
        })?;
        if spec.dimensions != 2 {
            return Err(GroveError::not_supported(format!(
                "spatial index with {} dimensions",
                spec.dimensions
            )));
        }
        if space.dimensions() != spec.dimensions {
            return Err(GroveError::invalid_argument(format!(
                "index '{}' has {} spatial fields but its space has {} dimensions",
                index.name(),
                spec.dimensions,
                space.dimensions()
            )));
        }
        let last = spec.last_spatial_field();
        if last >= index.key_columns().len() {
            return Err(GroveError::invalid_argument(format!(
                "index '{}' declares spatial fields {}..={} over a {}-column key",
                index.name(),
                spec.first_spatial_field,
                last,
                index.key_columns().len()
            )));
        }

        let mut coordinates = Vec::with_capacity(spec.dimensions);
        for field in spec.first_spatial_field..=last {
            let column = &index.key_column_defs()[field];
            let kind = match column.data_type {
                DataType::Decimal { .. } => CoordinateKind::Decimal,
                dt if dt.is_integer() => CoordinateKind::Integer,
                dt => {
                    return Err(GroveError::SpatialColumnType {
                        column: index.qualified_key_columns()[field].clone(),
                        data_type: dt.to_string(),
                    })
                }
            };
            coordinates.push(Coordinate {
                position: index.key_columns()[field],
                column: column.name.clone(),
                kind,
            });
        }

        Ok(Self {
            index_id: index.id(),
            key_positions: index.key_columns().to_vec(),
            first: spec.first_spatial_field,
            last,
            coordinates,
            space,
        })
    }

    /// Returns the index id.
    pub fn index_id(&self) -> u32 {
        self.index_id
    }

    /// Returns the space.
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// True only for the key field that carries the z-value.
    pub fn is_spatial_field(&self, field: usize) -> bool {
        field == self.first
    }

    /// Computes the z-value of `row`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a NULL or missing coordinate.
    pub fn z_value(&self, row: &Row) -> GroveResult<i64> {
        let coords = self
            .coordinates
            .iter()
            .map(|c| self.coordinate(row, c))
            .collect::<GroveResult<Vec<_>>>()?;
        let z = self.space.shuffle(&coords)?;
        if z < 0 {
            return Err(GroveError::internal(format!("negative z-value {}", z)));
        }
        Ok(z)
    }

    fn coordinate(&self, row: &Row, coordinate: &Coordinate) -> GroveResult<f64> {
        let value = row.value(coordinate.position).unwrap_or(&Value::Null);
        let mismatch = || GroveError::TypeMismatch {
            column: coordinate.column.clone(),
            expected: "numeric coordinate".to_string(),
            actual: value.type_name().to_string(),
        };
        match (coordinate.kind, value) {
            (_, Value::Null) => Err(GroveError::invalid_argument(format!(
                "spatial coordinate '{}' is null",
                coordinate.column
            ))),
            (CoordinateKind::Decimal, Value::Decimal(d)) => d.to_f64().ok_or_else(mismatch),
            (CoordinateKind::Integer, v) => v.as_i128().map(|i| i as f64).ok_or_else(mismatch),
            _ => Err(mismatch()),
        }
    }

    /// Appends key field `field` of `row` to `buf`.
    ///
    /// The z-value is written once at the first spatial field; the other
    /// spatial fields write nothing.
    pub fn append_key_field(&self, buf: &mut Vec<u8>, row: &Row, field: usize) -> GroveResult<()> {
        if field == self.first {
            return encode_element(buf, &Element::Integer(self.z_value(row)?));
        }
        if field > self.first && field <= self.last {
            return Ok(());
        }
        let position = *self.key_positions.get(field).ok_or_else(|| {
            GroveError::invalid_argument(format!("index key has no field {}", field))
        })?;
        let value = row.value(position).unwrap_or(&Value::Null);
        encode_element(buf, &value_to_element(value)?)
    }

    /// Encodes every key field of `row`.
    pub fn index_key(&self, row: &Row) -> GroveResult<Vec<u8>> {
        let mut buf = Vec::new();
        for field in 0..self.key_positions.len() {
            self.append_key_field(&mut buf, row, field)?;
        }
        Ok(buf)
    }
}
