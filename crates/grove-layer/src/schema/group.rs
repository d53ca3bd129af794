//! Groups: trees of tables sharing one clustered keyspace.
//!
//! Building a group fixes the pre-order ordinal of every table and derives,
//! for each table, which of its own columns supply every hkey segment from
//! the root down. A child can only supply its ancestors' key values through
//! its parent join, so each ancestor key column must be joined ("cascading
//! keys") or the group is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use grove_common::error::{GroveError, GroveResult};

use super::table::{Column, HKeyColumns, Join, JoinColumn, Table, TableDef, TableId};

/// Column mapping of a child to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDef {
    child_columns: Vec<String>,
    parent_columns: Vec<String>,
}

impl JoinDef {
    /// Pairs `child_columns[i]` with `parent_columns[i]`.
    pub fn new(child_columns: &[&str], parent_columns: &[&str]) -> Self {
        Self {
            child_columns: child_columns.iter().map(|c| (*c).to_string()).collect(),
            parent_columns: parent_columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Joins columns that have the same name on both sides.
    pub fn on(columns: &[&str]) -> Self {
        Self::new(columns, columns)
    }
}

#[derive(Debug)]
struct PendingChild {
    parent: String,
    def: TableDef,
    join: JoinDef,
}

/// Builder for [`Group`].
///
/// # Example
///
/// ```rust
/// use grove_layer::schema::{DataType, GroupBuilder, JoinDef, TableDef};
///
/// let group = GroupBuilder::new(7, "customers")
///     .root(TableDef::new("s", "customers").column("cid", DataType::Int).primary_key(&["cid"]))
///     .child(
///         "customers",
///         TableDef::new("s", "orders")
///             .column("cid", DataType::Int)
///             .column("oid", DataType::Int)
///             .primary_key(&["oid"]),
///         JoinDef::on(&["cid"]),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(group.tables().len(), 2);
/// ```
#[derive(Debug)]
pub struct GroupBuilder {
    id: u32,
    name: String,
    root: Option<TableDef>,
    children: Vec<PendingChild>,
}

impl GroupBuilder {
    /// Starts a group with a store-wide id and a name.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            root: None,
            children: Vec::new(),
        }
    }

    /// Sets the root table.
    pub fn root(mut self, def: TableDef) -> Self {
        self.root = Some(def);
        self
    }

    /// Adds a child of the table named `parent` (unqualified).
    pub fn child(mut self, parent: &str, def: TableDef, join: JoinDef) -> Self {
        self.children.push(PendingChild {
            parent: parent.to_string(),
            def,
            join,
        });
        self
    }

    /// Validates the tree and builds the group.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a missing root, a duplicate table, an
    /// unknown parent, a self-join, a join whose column lists differ in
    /// length or name unknown columns, a table unreachable from the root, or
    /// an hkey that cannot be derived through the joins.
    pub fn build(self) -> GroveResult<Group> {
        let root = self
            .root
            .ok_or_else(|| GroveError::invalid_argument(format!("group '{}' has no root", self.name)))?;

        // Index 0 is the root; children follow in declaration order.
        let mut defs: Vec<(TableDef, Option<(String, JoinDef)>)> = vec![(root, None)];
        for child in self.children {
            defs.push((child.def, Some((child.parent, child.join))));
        }

        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (i, (def, _)) in defs.iter().enumerate() {
            if by_name.insert(def.name.table.clone(), i).is_some() {
                return Err(GroveError::invalid_argument(format!(
                    "table {} declared twice in group '{}'",
                    def.name, self.name
                )));
            }
        }

        let mut parent_of: Vec<Option<usize>> = vec![None; defs.len()];
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); defs.len()];
        for (i, (def, link)) in defs.iter().enumerate() {
            let Some((parent, _)) = link else { continue };
            if *parent == def.name.table {
                return Err(GroveError::invalid_argument(format!(
                    "table {} cannot join itself",
                    def.name
                )));
            }
            let parent_idx = *by_name.get(parent).ok_or_else(|| {
                GroveError::invalid_argument(format!(
                    "table {} names unknown parent '{}'",
                    def.name, parent
                ))
            })?;
            parent_of[i] = Some(parent_idx);
            children_of[parent_idx].push(i);
        }

        // Pre-order from the root fixes ordinals; anything not reached hangs
        // off a cycle.
        let mut order = Vec::with_capacity(defs.len());
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(children_of[i].iter().rev());
        }
        if order.len() != defs.len() {
            return Err(GroveError::invalid_argument(format!(
                "group '{}' has tables not connected to its root",
                self.name
            )));
        }

        let mut ordinal_of = vec![0u32; defs.len()];
        for (pos, &i) in order.iter().enumerate() {
            ordinal_of[i] = u32::try_from(pos + 1)
                .map_err(|_| GroveError::invalid_argument("too many tables in group"))?;
        }

        let mut built: Vec<Option<Table>> = (0..defs.len()).map(|_| None).collect();
        let mut columns_of: Vec<Vec<Column>> = vec![Vec::new(); defs.len()];
        let mut layout_of: Vec<Vec<HKeyColumns>> = vec![Vec::new(); defs.len()];
        let mut depth_of = vec![0usize; defs.len()];

        for &i in &order {
            let (def, link) = &defs[i];
            let id = TableId(ordinal_of[i]);

            let mut columns = def.columns.clone();
            let mut primary_key = Vec::with_capacity(def.primary_key.len().max(1));
            if def.primary_key.is_empty() {
                primary_key.push(columns.len());
                columns.push(Column::hidden_pk());
            } else {
                for name in &def.primary_key {
                    primary_key.push(position(&columns, name, def)?);
                }
            }

            let (join, depth, mut layout) = match (link, parent_of[i]) {
                (Some((_, join_def)), Some(parent_idx)) => {
                    let join = resolve_join(
                        join_def,
                        def,
                        &columns,
                        &defs[parent_idx].0,
                        &columns_of[parent_idx],
                        TableId(ordinal_of[parent_idx]),
                    )?;
                    let layout = cascade_layout(&layout_of[parent_idx], &join, def, &columns_of[parent_idx])?;
                    (Some(join), depth_of[parent_idx] + 1, layout)
                }
                _ => (None, 0, Vec::new()),
            };
            layout.push(HKeyColumns {
                table: id,
                positions: primary_key.clone(),
            });

            let children = children_of[i]
                .iter()
                .map(|&c| TableId(ordinal_of[c]))
                .collect();

            columns_of[i] = columns.clone();
            layout_of[i] = layout.clone();
            depth_of[i] = depth;
            built[i] = Some(Table::new(
                id,
                def.name.clone(),
                columns,
                primary_key,
                join,
                children,
                depth,
                layout,
            ));
        }

        let mut tables = Vec::with_capacity(order.len());
        for &i in &order {
            let table = built[i]
                .take()
                .ok_or_else(|| GroveError::internal("table built twice"))?;
            tables.push(Arc::new(table));
        }

        Ok(Group {
            id: self.id,
            name: self.name,
            tables,
        })
    }
}

fn position(columns: &[Column], name: &str, def: &TableDef) -> GroveResult<usize> {
    columns.iter().position(|c| c.name == name).ok_or_else(|| {
        GroveError::invalid_argument(format!("column '{}' not found in table {}", name, def.name))
    })
}

fn resolve_join(
    join_def: &JoinDef,
    child: &TableDef,
    child_columns: &[Column],
    parent: &TableDef,
    parent_columns: &[Column],
    parent_id: TableId,
) -> GroveResult<Join> {
    if join_def.child_columns.len() != join_def.parent_columns.len() {
        return Err(GroveError::invalid_argument(format!(
            "join from {} to {} pairs {} child columns with {} parent columns",
            child.name,
            parent.name,
            join_def.child_columns.len(),
            join_def.parent_columns.len()
        )));
    }
    if join_def.child_columns.is_empty() {
        return Err(GroveError::invalid_argument(format!(
            "join from {} to {} has no columns",
            child.name, parent.name
        )));
    }

    let mut columns = Vec::with_capacity(join_def.child_columns.len());
    for (c, p) in join_def.child_columns.iter().zip(&join_def.parent_columns) {
        columns.push(JoinColumn {
            child: position(child_columns, c, child)?,
            parent: position(parent_columns, p, parent)?,
        });
    }
    Ok(Join {
        parent: parent_id,
        columns,
    })
}

fn cascade_layout(
    parent_layout: &[HKeyColumns],
    join: &Join,
    child: &TableDef,
    parent_columns: &[Column],
) -> GroveResult<Vec<HKeyColumns>> {
    parent_layout
        .iter()
        .map(|segment| {
            let positions = segment
                .positions
                .iter()
                .map(|&p| {
                    join.child_position(p).ok_or_else(|| {
                        GroveError::invalid_argument(format!(
                            "table {} does not join parent key column '{}'; hkey cannot be derived",
                            child.name,
                            parent_columns.get(p).map_or("?", |c| c.name.as_str())
                        ))
                    })
                })
                .collect::<GroveResult<Vec<_>>>()?;
            Ok(HKeyColumns {
                table: segment.table,
                positions,
            })
        })
        .collect()
}

/// A validated tree of tables.
///
/// Tables are stored in pre-order, so a table's descendants are the run of
/// tables that follows it with a greater depth.
#[derive(Debug)]
pub struct Group {
    id: u32,
    name: String,
    tables: Vec<Arc<Table>>,
}

impl Group {
    /// Returns the store-wide group id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the root table.
    pub fn root(&self) -> &Arc<Table> {
        &self.tables[0]
    }

    /// Returns every table in pre-order.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    /// Looks a table up by id.
    pub fn table(&self, id: TableId) -> Option<&Arc<Table>> {
        let idx = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.tables.get(idx)
    }

    /// Looks a table up by unqualified name.
    pub fn table_by_name(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.iter().find(|t| t.name().table == name)
    }

    /// Returns the direct children of a table.
    pub fn children(&self, id: TableId) -> Vec<&Arc<Table>> {
        self.table(id)
            .map(|t| t.children().iter().filter_map(|c| self.table(*c)).collect())
            .unwrap_or_default()
    }

    /// Returns the transitive descendants of a table in pre-order.
    pub fn descendants(&self, id: TableId) -> Vec<TableId> {
        let Some(table) = self.table(id) else {
            return Vec::new();
        };
        self.tables[id.0 as usize..]
            .iter()
            .take_while(|t| t.depth() > table.depth())
            .map(|t| t.id())
            .collect()
    }

    /// Returns true if `ancestor` is a proper ancestor of `descendant`.
    pub fn is_ancestor(&self, ancestor: TableId, descendant: TableId) -> bool {
        let mut current = self.table(descendant).and_then(|t| t.parent().map(|j| j.parent));
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.table(id).and_then(|t| t.parent().map(|j| j.parent));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    fn customers() -> TableDef {
        TableDef::new("s", "customers")
            .column("cid", DataType::BigInt)
            .column("name", DataType::Varchar(20))
            .primary_key(&["cid"])
    }

    fn orders() -> TableDef {
        TableDef::new("s", "orders")
            .column("oid", DataType::BigInt)
            .column("cid", DataType::BigInt)
            .primary_key(&["oid"])
    }

    fn items() -> TableDef {
        TableDef::new("s", "items")
            .column("iid", DataType::BigInt)
            .column("oid", DataType::BigInt)
            .column("cid", DataType::BigInt)
            .primary_key(&["iid"])
    }

    fn addresses() -> TableDef {
        TableDef::new("s", "addresses")
            .column("cid", DataType::BigInt)
            .column("city", DataType::Varchar(20))
    }

    fn coi() -> Group {
        GroupBuilder::new(1, "coi")
            .root(customers())
            .child("customers", orders(), JoinDef::on(&["cid"]))
            .child("orders", items(), JoinDef::on(&["cid", "oid"]))
            .child("customers", addresses(), JoinDef::on(&["cid"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_pre_order_ordinals() {
        let group = coi();
        let names: Vec<_> = group
            .tables()
            .iter()
            .map(|t| (t.id().ordinal(), t.name().table.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                (1, "customers".to_string()),
                (2, "orders".to_string()),
                (3, "items".to_string()),
                (4, "addresses".to_string()),
            ]
        );
        assert_eq!(group.root().depth(), 0);
        assert_eq!(group.table_by_name("items").unwrap().depth(), 2);
    }

    #[test]
    fn test_hkey_layout_cascades() {
        let group = coi();
        let items = group.table_by_name("items").unwrap();
        let layout = items.hkey_layout();
        assert_eq!(layout.len(), 3);
        // customers.cid -> items.cid
        assert_eq!(layout[0].table, TableId(1));
        assert_eq!(layout[0].positions, vec![2]);
        // orders.oid -> items.oid
        assert_eq!(layout[1].table, TableId(2));
        assert_eq!(layout[1].positions, vec![1]);
        assert_eq!(layout[2].positions, vec![0]);
    }

    #[test]
    fn test_hidden_primary_key() {
        let group = coi();
        let addresses = group.table_by_name("addresses").unwrap();
        assert_eq!(addresses.columns().len(), 3);
        assert_eq!(addresses.hidden_pk_position(), Some(2));
        assert!(addresses.columns()[2].internal);
        assert_eq!(addresses.row_type().len(), 3);
        assert_eq!(group.root().hidden_pk_position(), None);
    }

    #[test]
    fn test_descendants_and_ancestry() {
        let group = coi();
        assert_eq!(
            group.descendants(TableId(1)),
            vec![TableId(2), TableId(3), TableId(4)]
        );
        assert_eq!(group.descendants(TableId(2)), vec![TableId(3)]);
        assert!(group.descendants(TableId(4)).is_empty());
        assert!(group.is_ancestor(TableId(1), TableId(3)));
        assert!(!group.is_ancestor(TableId(2), TableId(4)));
        assert_eq!(group.children(TableId(1)).len(), 2);
    }

    #[test]
    fn test_rejects_non_cascading_keys() {
        let err = GroupBuilder::new(1, "coi")
            .root(customers())
            .child("customers", orders(), JoinDef::on(&["cid"]))
            .child("orders", items(), JoinDef::on(&["oid"]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("hkey cannot be derived"));
    }

    #[test]
    fn test_rejects_bad_trees() {
        assert!(GroupBuilder::new(1, "g").build().is_err());

        let dup = GroupBuilder::new(1, "g")
            .root(customers())
            .child("customers", customers(), JoinDef::on(&["cid"]))
            .build();
        assert!(dup.is_err());

        let orphan = GroupBuilder::new(1, "g")
            .root(customers())
            .child("nobody", orders(), JoinDef::on(&["cid"]))
            .build();
        assert!(orphan.is_err());

        let self_join = GroupBuilder::new(1, "g")
            .root(customers())
            .child("orders", orders(), JoinDef::on(&["cid"]))
            .build();
        assert!(self_join.is_err());

        let mismatch = GroupBuilder::new(1, "g")
            .root(customers())
            .child("customers", orders(), JoinDef::new(&["cid", "oid"], &["cid"]))
            .build();
        assert!(mismatch.is_err());
    }

    #[test]
    fn test_rejects_unknown_key_column() {
        let err = GroupBuilder::new(1, "g")
            .root(TableDef::new("s", "t").column("a", DataType::Int).primary_key(&["b"]))
            .build()
            .unwrap_err();
        assert_eq!(err.code(), grove_common::ErrorCode::InvalidArgument);
    }
}
