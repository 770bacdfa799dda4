use std::fmt;

use crate::ids::{ColumnId, ConstraintId, TableId};

/// The constraint kinds the catalog materializes. `NOT NULL` and `DEFAULT`
/// are column attributes rather than constraint rows, matching how
/// PostgreSQL itself stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Primary,
    Unique,
    ForeignKey,
    Identity,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Primary => "primary",
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// How a constraint behaves when one of its dependencies is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropBehaviour {
    /// The constraint is dropped along with the object. This is the
    /// behaviour for most constraints.
    #[default]
    Cascade,
    /// The dependency cannot be dropped until the constraint is removed or
    /// the `CASCADE` keyword is used. Foreign keys restrict.
    Restrict,
}

/// A named rule attached to one or more columns.
///
/// `constrains` lists the columns the constraint applies to (on the owning
/// table); `refers` lists the columns a foreign key points at (on the
/// referenced table). Both preserve declaration order.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: ConstraintId,
    /// Owning table.
    pub table: TableId,
    /// Unique within the owning table's schema.
    pub name: String,
    pub kind: ConstraintKind,
    pub constrains: Vec<ColumnId>,
    pub refers: Vec<ColumnId>,
    /// Set for foreign keys only.
    pub refers_table: Option<TableId>,
    pub drop_behaviour: DropBehaviour,
}

impl Constraint {
    /// Every column this constraint depends on, constrained then referred.
    pub fn depends(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.constrains.iter().chain(self.refers.iter()).copied()
    }
}

/// A constraint waiting for the catalog to assign its id and index it.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub table: TableId,
    pub name: String,
    pub kind: ConstraintKind,
    pub constrains: Vec<ColumnId>,
    pub refers: Vec<ColumnId>,
    pub refers_table: Option<TableId>,
    pub drop_behaviour: DropBehaviour,
}

impl ConstraintSpec {
    pub fn primary(table: TableId, name: String, constrains: Vec<ColumnId>) -> Self {
        ConstraintSpec {
            table,
            name,
            kind: ConstraintKind::Primary,
            constrains,
            refers: Vec::new(),
            refers_table: None,
            drop_behaviour: DropBehaviour::Cascade,
        }
    }

    pub fn unique(table: TableId, name: String, constrains: Vec<ColumnId>) -> Self {
        ConstraintSpec {
            kind: ConstraintKind::Unique,
            ..Self::primary(table, name, constrains)
        }
    }

    pub fn identity(table: TableId, name: String, constrains: Vec<ColumnId>) -> Self {
        ConstraintSpec {
            kind: ConstraintKind::Identity,
            ..Self::primary(table, name, constrains)
        }
    }

    pub fn foreign_key(
        table: TableId,
        name: String,
        constrains: Vec<ColumnId>,
        refers: Vec<ColumnId>,
        refers_table: TableId,
    ) -> Self {
        ConstraintSpec {
            table,
            name,
            kind: ConstraintKind::ForeignKey,
            constrains,
            refers,
            refers_table: Some(refers_table),
            drop_behaviour: DropBehaviour::Restrict,
        }
    }
}
