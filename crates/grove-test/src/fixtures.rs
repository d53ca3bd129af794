//! Customer/order/item fixtures shared by the integration tests.

use std::sync::Arc;

use grove_layer::row::{Row, Value};
use grove_layer::schema::{DataType, Group, GroupBuilder, JoinDef, TableDef, TableId};
use grove_layer::store::GroupStore;
use grove_layer::HKey;
use grove_storage::MemKvStore;
use rust_decimal::Decimal;

/// Ordinal of `customers`.
pub const CUSTOMERS: TableId = TableId(1);
/// Ordinal of `orders`.
pub const ORDERS: TableId = TableId(2);
/// Ordinal of `items`.
pub const ITEMS: TableId = TableId(3);
/// Ordinal of `addresses`.
pub const ADDRESSES: TableId = TableId(4);

/// Builds the `coi` group:
///
/// ```text
/// customers(cid)
/// ├── orders(oid, cid)
/// │   └── items(iid, oid, cid, price)
/// └── addresses(aid, cid, city)
/// ```
pub fn coi_group(id: u32) -> Arc<Group> {
    let group = GroupBuilder::new(id, "coi")
        .root(
            TableDef::new("shop", "customers")
                .column("cid", DataType::BigInt)
                .column("name", DataType::Varchar(64))
                .primary_key(&["cid"]),
        )
        .child(
            "customers",
            TableDef::new("shop", "orders")
                .column("oid", DataType::BigInt)
                .column("cid", DataType::BigInt)
                .column("placed", DataType::Date)
                .primary_key(&["oid"]),
            JoinDef::on(&["cid"]),
        )
        .child(
            "orders",
            TableDef::new("shop", "items")
                .column("iid", DataType::BigInt)
                .column("oid", DataType::BigInt)
                .column("cid", DataType::BigInt)
                .column("price", DataType::Decimal { precision: 10, scale: 2 })
                .primary_key(&["iid"]),
            JoinDef::on(&["cid", "oid"]),
        )
        .child(
            "customers",
            TableDef::new("shop", "addresses")
                .column("cid", DataType::BigInt)
                .column("city", DataType::Varchar(32))
                .primary_key(&[]),
            JoinDef::on(&["cid"]),
        )
        .build();
    match group {
        Ok(group) => Arc::new(group),
        Err(e) => panic!("fixture group is invalid: {e}"),
    }
}

/// Shape of the data written by [`populate`].
#[derive(Debug, Clone, Copy)]
pub struct Population {
    /// Customers, with ids `1..=customers`.
    pub customers: i64,
    /// Orders per customer.
    pub orders: i64,
    /// Items per order.
    pub items: i64,
    /// Addresses per customer.
    pub addresses: i64,
}

impl Population {
    /// Rows in the subtree of one customer, the customer included.
    pub fn per_customer(&self) -> usize {
        (1 + self.orders * (1 + self.items) + self.addresses) as usize
    }

    /// Rows in the whole group.
    pub fn total(&self) -> usize {
        self.customers as usize * self.per_customer()
    }
}

impl Default for Population {
    fn default() -> Self {
        Self {
            customers: 3,
            orders: 2,
            items: 2,
            addresses: 1,
        }
    }
}

/// Order id of the `n`th order of `cid`.
pub fn order_id(cid: i64, n: i64) -> i64 {
    cid * 100 + n
}

/// Item id of the `n`th item of `oid`.
pub fn item_id(oid: i64, n: i64) -> i64 {
    oid * 100 + n
}

/// Hkey of customer `cid`.
pub fn customer_hkey(cid: i64) -> HKey {
    HKey::root(CUSTOMERS, vec![Value::BigInt(cid)])
}

/// Hkey of order `oid` of customer `cid`.
pub fn order_hkey(cid: i64, oid: i64) -> HKey {
    customer_hkey(cid).child(ORDERS, vec![Value::BigInt(oid)])
}

/// Writes `population` into `store`, returning nothing but panicking on any
/// write error.
pub fn populate(store: &GroupStore, group: &Group, population: Population) {
    let table = |id: TableId| match group.table(id) {
        Some(t) => t.row_type(),
        None => panic!("fixture table {id} missing"),
    };
    let (customers, orders, items, addresses) =
        (table(CUSTOMERS), table(ORDERS), table(ITEMS), table(ADDRESSES));

    let write = |row: Row| {
        if let Err(e) = store.write_row(group, row) {
            panic!("fixture write failed: {e}");
        }
    };

    for cid in 1..=population.customers {
        write(Row::new(
            Arc::clone(&customers),
            vec![Value::BigInt(cid), Value::from(format!("customer {cid}"))],
        ));
        for n in 0..population.orders {
            let oid = order_id(cid, n);
            write(Row::new(
                Arc::clone(&orders),
                vec![Value::BigInt(oid), Value::BigInt(cid), Value::Date(19_000 + n as i32)],
            ));
            for m in 0..population.items {
                write(Row::new(
                    Arc::clone(&items),
                    vec![
                        Value::BigInt(item_id(oid, m)),
                        Value::BigInt(oid),
                        Value::BigInt(cid),
                        Value::Decimal(Decimal::new(m * 250 + 99, 2)),
                    ],
                ));
            }
        }
        for n in 0..population.addresses {
            write(Row::new(
                Arc::clone(&addresses),
                vec![Value::BigInt(cid), Value::from(format!("city {n}")), Value::Null],
            ));
        }
    }
}

/// Creates a store holding the default population of a fresh `coi` group.
pub fn populated_store(batch_size: usize) -> (Arc<GroupStore>, Arc<Group>, Population) {
    let group = coi_group(1);
    let store = Arc::new(GroupStore::new(Arc::new(MemKvStore::with_batch_size(batch_size))));
    let population = Population::default();
    populate(&store, &group, population);
    (store, group, population)
}
