//! Identifiers shared across the catalog.
//!
//! Ids are allocated monotonically by the [`Catalog`](crate::Catalog) and
//! never reused, so integer equality is object identity even after renames.

/// Unique identifier for a table.
pub type TableId = u32;

/// Unique identifier for a column.
///
/// Column ids are catalog-wide, not per-table, so a constraint can hold
/// columns from both its own table and a referenced table in one list.
pub type ColumnId = u32;

/// Unique identifier for a constraint.
pub type ConstraintId = u32;
