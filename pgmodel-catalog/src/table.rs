use indexmap::IndexMap;

use crate::ids::{ColumnId, TableId};

/// A named namespace holding tables in insertion order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    tables: IndexMap<String, TableId>,
}

impl Schema {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            tables: IndexMap::new(),
        }
    }

    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.tables.get(name).copied()
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table ids in insertion order.
    pub fn table_ids(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.values().copied()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn insert_table(&mut self, name: String, id: TableId) {
        self.tables.insert(name, id);
    }

    pub(crate) fn remove_table(&mut self, name: &str) -> Option<TableId> {
        self.tables.shift_remove(name)
    }
}

/// A table: named columns in declaration order.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// Name of the owning schema.
    pub schema: String,
    columns: IndexMap<String, ColumnId>,
}

impl Table {
    pub(crate) fn new(id: TableId, name: impl Into<String>, schema: impl Into<String>) -> Self {
        Table {
            id,
            name: name.into(),
            schema: schema.into(),
            columns: IndexMap::new(),
        }
    }

    /// `schema.table`.
    pub fn fq_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn column_id(&self, name: &str) -> Option<ColumnId> {
        self.columns.get(name).copied()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column ids in declaration order.
    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.values().copied()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn insert_column(&mut self, name: String, id: ColumnId) {
        self.columns.insert(name, id);
    }

    pub(crate) fn remove_column(&mut self, name: &str) -> Option<ColumnId> {
        self.columns.shift_remove(name)
    }
}
