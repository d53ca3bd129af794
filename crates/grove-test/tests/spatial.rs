//! Spatial index keys written through the group store.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use grove_common::GroveConfig;
use grove_layer::row::{Row, Value};
use grove_layer::schema::{DataType, Group, GroupBuilder, Index, TableDef};
use grove_layer::spatial::{Space, SpatialIndexHandler};
use grove_layer::store::{index_prefix, GroupStore};
use grove_layer::tuple::{Element, Tuple};
use grove_storage::MemKvStore;

fn places() -> Arc<Group> {
    Arc::new(
        GroupBuilder::new(9, "places")
            .root(
                TableDef::new("geo", "places")
                    .column("pid", DataType::BigInt)
                    .column("lat", DataType::Decimal { precision: 10, scale: 6 })
                    .column("lon", DataType::Decimal { precision: 10, scale: 6 })
                    .column("label", DataType::Varchar(32))
                    .primary_key(&["pid"]),
            )
            .build()
            .unwrap(),
    )
}

fn dec(v: f64) -> Value {
    Value::Decimal(Decimal::from_f64_retain(v).unwrap().round_dp(6))
}

const POINTS: &[(i64, f64, f64, &str)] = &[
    (1, 37.5, -122.25, "san francisco"),
    (2, -33.86, 151.21, "sydney"),
    (3, 51.5, -0.12, "london"),
    (4, 0.0, 0.0, "null island"),
    (5, -45.0, -90.0, "south pacific"),
    (6, 45.0, 90.0, "mongolia"),
];

#[test]
fn test_index_entries_sorted_by_z() {
    let group = places();
    let table = group.root();
    let index = Index::new(40, "places_geo", table, &["lat", "lon"])
        .unwrap()
        .spatial(0, 2);
    let handler = SpatialIndexHandler::new(&index, table, Space::lat_lon()).unwrap();
    let store = GroupStore::new(Arc::new(MemKvStore::new()));

    let mut expected = Vec::new();
    for &(pid, lat, lon, label) in POINTS {
        let row = Row::new(
            table.row_type(),
            vec![Value::BigInt(pid), dec(lat), dec(lon), Value::from(label)],
        );
        store.write_row(&group, row.clone()).unwrap();
        store
            .write_index_row(&group, &index, Some(&handler), &row)
            .unwrap();
        expected.push((handler.z_value(&row).unwrap(), pid));
    }
    expected.sort();

    let prefix = index_prefix(index.id()).unwrap();
    let entries: Vec<(i64, i64)> = store
        .index_keys(&index)
        .unwrap()
        .iter()
        .map(|key| {
            let rest = &key.as_bytes()[prefix.as_bytes().len()..];
            let tuple = Tuple::unpack(rest).unwrap();
            // z-value, then the hkey: table ordinal and pid
            match (tuple.get(0), tuple.get(2)) {
                (Some(Element::Integer(z)), Some(Element::Integer(pid))) => (*z, *pid),
                other => panic!("unexpected index key {:?}", other),
            }
        })
        .collect();
    assert_eq!(entries, expected);

    let z_of = |pid: i64| expected.iter().find(|(_, p)| *p == pid).unwrap().0;
    assert_eq!(z_of(4), 6_917_529_027_641_081_913);
    assert!(z_of(5) < z_of(4));
    assert!(z_of(4) < z_of(6));
}

#[test]
fn test_spatial_index_needs_handler() {
    let group = places();
    let table = group.root();
    let index = Index::new(41, "places_geo", table, &["lat", "lon"])
        .unwrap()
        .spatial(0, 2);
    let store = GroupStore::new(Arc::new(MemKvStore::new()));
    let row = Row::new(
        table.row_type(),
        vec![Value::BigInt(1), dec(1.0), dec(2.0), Value::Null],
    );
    assert!(store.write_index_row(&group, &index, None, &row).is_err());
}

#[test]
fn test_space_from_config() {
    let config = GroveConfig::builder().spatial_bits(10, 12).build();
    let space = Space::from_config(&config.spatial).unwrap();
    assert_eq!(space.total_bits(), 22);
    let z = space.shuffle(&[90.0, 180.0]).unwrap();
    assert_eq!(z, (((1i64 << 22) - 1) << 41) | 22);
}

proptest! {
    #[test]
    fn test_z_order_respects_dominance(
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
        dlat in 0.0f64..30.0,
        dlon in 0.0f64..30.0,
    ) {
        let space = Space::lat_lon();
        let low = space.shuffle(&[lat, lon]).unwrap();
        let high = space.shuffle(&[lat + dlat, lon + dlon]).unwrap();
        prop_assert!(low >= 0);
        prop_assert!(low <= high);
    }
}
