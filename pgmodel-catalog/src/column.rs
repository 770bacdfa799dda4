use pgmodel_types::TypeId;

use crate::ids::{ColumnId, TableId};

/// A table column.
#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    /// Owning table.
    pub table: TableId,
    pub name: String,
    /// Handle into the type registry.
    pub ty: TypeId,
    pub attrs: ColumnAttributes,
}

/// Per-column attributes maintained by the semantic analyzer.
///
/// `pkey` is owned by the dependency index: it flips when a primary
/// constraint covering the column is added or removed, and is never set
/// directly from a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAttributes {
    /// Explicit `NOT NULL` declared on the column.
    pub not_null: bool,
    /// Column participates in a live primary key.
    pub pkey: bool,
    /// Column has an implicit serial-driven default.
    pub has_sequence: bool,
    /// `<table>_<column>_seq`; non-empty iff `has_sequence`.
    pub sequence_name: String,
    /// `DEFAULT <expr>` declared on the column.
    pub has_explicit_default: bool,
    /// Canonical string form of the default expression.
    pub column_default: String,
}

impl ColumnAttributes {
    /// The column rejects NULLs, either declared or via a primary key.
    pub fn is_not_null(&self) -> bool {
        self.not_null || self.pkey
    }

    /// The column must be supplied on insert: non-nullable and without any
    /// default, explicit or sequence-driven.
    pub fn is_required(&self) -> bool {
        self.is_not_null() && !(self.has_explicit_default || self.has_sequence)
    }
}
