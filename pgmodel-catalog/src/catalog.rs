use std::fmt::Write as _;

use indexmap::IndexMap;
use pgmodel_result::{Error, Result};
use pgmodel_types::{TypeId, TypeRegistry};
use rustc_hash::FxHashMap;

use crate::column::{Column, ColumnAttributes};
use crate::constraint::{Constraint, ConstraintKind, ConstraintSpec};
use crate::depends::DependencyIndex;
use crate::ids::{ColumnId, ConstraintId, TableId};
use crate::table::{Schema, Table};

/// Name of the schema pre-created at catalog construction.
pub const DEFAULT_SCHEMA: &str = "public";

/// The root in-memory mirror of a database's schema universe.
///
/// Schemas are kept in insertion order; tables, columns, and constraints
/// live in catalog-wide arenas keyed by monotonically assigned ids. All
/// structural mutation goes through this type so the [`DependencyIndex`] and
/// the column attributes it maintains (`pkey`) stay consistent.
///
/// Accessors taking an id panic when handed a stale handle; ids are only
/// produced by this catalog and objects only disappear through the explicit
/// removal methods, so a stale id is a caller bug rather than user input.
#[derive(Debug, Clone)]
pub struct Catalog {
    schemas: IndexMap<String, Schema>,
    tables: FxHashMap<TableId, Table>,
    columns: FxHashMap<ColumnId, Column>,
    constraints: FxHashMap<ConstraintId, Constraint>,
    depends: DependencyIndex,
    next_table: TableId,
    next_column: ColumnId,
    next_constraint: ConstraintId,
}

impl Catalog {
    /// Create a catalog holding only the empty `public` schema.
    pub fn new() -> Self {
        let mut catalog = Catalog {
            schemas: IndexMap::new(),
            tables: FxHashMap::default(),
            columns: FxHashMap::default(),
            constraints: FxHashMap::default(),
            depends: DependencyIndex::new(),
            next_table: 0,
            next_column: 0,
            next_constraint: 0,
        };
        catalog.add_schema(DEFAULT_SCHEMA);
        catalog
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    /// Insert an empty schema. Existing schemas are left untouched; the
    /// analyzer decides whether a collision is an error.
    pub fn add_schema(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.schemas
            .entry(name.clone())
            .or_insert_with(|| Schema::new(name));
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Schemas in insertion order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    /// Create an empty table in `schema`.
    pub fn create_table(&mut self, schema: &str, name: &str) -> Result<TableId> {
        let sch = self
            .schemas
            .get_mut(schema)
            .ok_or_else(|| Error::SchemaNotFound(schema.to_string()))?;
        if sch.contains_table(name) {
            return Err(Error::DuplicateTable(name.to_string()));
        }
        let id = self.next_table;
        self.next_table += 1;
        sch.insert_table(name.to_string(), id);
        self.tables.insert(id, Table::new(id, name, schema));
        Ok(id)
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[&id]
    }

    fn table_mut(&mut self, id: TableId) -> &mut Table {
        self.tables.get_mut(&id).expect("stale table id")
    }

    /// Resolve `schema.name` to a table id. The schema is checked first, so
    /// a missing schema reports as such rather than as a missing table.
    pub fn find_table(&self, schema: &str, name: &str) -> Result<TableId> {
        let sch = self
            .schemas
            .get(schema)
            .ok_or_else(|| Error::SchemaNotFound(schema.to_string()))?;
        sch.table_id(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Re-key a table under a new name within its schema. The entry moves to
    /// the end of the schema's insertion order, exactly as a remove/insert
    /// pair would.
    pub fn rename_table(&mut self, id: TableId, new_name: &str) -> Result<()> {
        let (schema_name, old_name) = {
            let table = self.table(id);
            (table.schema.clone(), table.name.clone())
        };
        let schema = self
            .schemas
            .get_mut(&schema_name)
            .expect("table's schema must exist");
        if schema.contains_table(new_name) {
            return Err(Error::DuplicateTable(new_name.to_string()));
        }
        schema.remove_table(&old_name);
        schema.insert_table(new_name.to_string(), id);
        self.table_mut(id).name = new_name.to_string();
        Ok(())
    }

    /// Remove a table and its columns from the catalog. The caller must
    /// already have removed every constraint touching the table's columns;
    /// the dependency index is not consulted here.
    pub fn remove_table(&mut self, id: TableId) {
        let table = self.tables.remove(&id).expect("stale table id");
        for col_id in table.column_ids() {
            self.columns.remove(&col_id);
        }
        let schema = self
            .schemas
            .get_mut(&table.schema)
            .expect("table's schema must exist");
        schema.remove_table(&table.name);
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Append a column to a table.
    pub fn add_column(
        &mut self,
        table: TableId,
        name: &str,
        ty: TypeId,
        attrs: ColumnAttributes,
    ) -> Result<ColumnId> {
        if self.table(table).contains_column(name) {
            return Err(Error::DuplicateColumn(name.to_string()));
        }
        let id = self.next_column;
        self.next_column += 1;
        self.table_mut(table).insert_column(name.to_string(), id);
        self.columns.insert(
            id,
            Column {
                id,
                table,
                name: name.to_string(),
                ty,
                attrs,
            },
        );
        Ok(id)
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[&id]
    }

    pub fn column_mut(&mut self, id: ColumnId) -> &mut Column {
        self.columns.get_mut(&id).expect("stale column id")
    }

    pub fn find_column(&self, table: TableId, name: &str) -> Result<ColumnId> {
        self.table(table)
            .column_id(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Remove a column from its table. The caller must already have removed
    /// every constraint depending on the column.
    pub fn remove_column(&mut self, id: ColumnId) {
        let column = self.columns.remove(&id).expect("stale column id");
        self.table_mut(column.table).remove_column(&column.name);
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    /// Materialize a constraint: assign its id, index it under every column
    /// it touches and under its fully-qualified name, and apply creation
    /// side effects (primary keys mark their columns `pkey`).
    pub fn add_constraint(&mut self, spec: ConstraintSpec) -> ConstraintId {
        let id = self.next_constraint;
        self.next_constraint += 1;
        let constraint = Constraint {
            id,
            table: spec.table,
            name: spec.name,
            kind: spec.kind,
            constrains: spec.constrains,
            refers: spec.refers,
            refers_table: spec.refers_table,
            drop_behaviour: spec.drop_behaviour,
        };
        let fqn = self.constraint_fqn_of(&constraint);
        self.depends.insert(fqn, &constraint);
        if constraint.kind == ConstraintKind::Primary {
            for &col in &constraint.constrains {
                self.column_mut(col).attrs.pkey = true;
            }
        }
        self.constraints.insert(id, constraint);
        id
    }

    /// Unindex and drop a constraint, applying removal side effects
    /// (primary keys clear `pkey` on their columns).
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        let constraint = self.constraints.remove(&id)?;
        let fqn = self.constraint_fqn_of(&constraint);
        self.depends.remove(&fqn, &constraint);
        if constraint.kind == ConstraintKind::Primary {
            for &col in &constraint.constrains {
                self.column_mut(col).attrs.pkey = false;
            }
        }
        Some(constraint)
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        &self.constraints[&id]
    }

    /// `schema.constraint`, composed from the owning table's schema at call
    /// time so renames never leave stale names behind.
    pub fn constraint_fqn(&self, id: ConstraintId) -> String {
        self.constraint_fqn_of(self.constraint(id))
    }

    fn constraint_fqn_of(&self, constraint: &Constraint) -> String {
        let schema = &self.table(constraint.table).schema;
        format!("{schema}.{}", constraint.name)
    }

    pub fn depends(&self) -> &DependencyIndex {
        &self.depends
    }

    /// Look up a constraint id by `schema.name`.
    pub fn constraint_by_name(&self, fqn: &str) -> Option<ConstraintId> {
        self.depends.by_name(fqn)
    }

    /// Constraints owned by `table`, sorted by name for deterministic
    /// iteration.
    pub fn table_constraints(&self, table: TableId) -> Vec<ConstraintId> {
        let mut ids: Vec<ConstraintId> = self
            .constraints
            .values()
            .filter(|c| c.table == table)
            .map(|c| c.id)
            .collect();
        ids.sort_by(|a, b| self.constraints[a].name.cmp(&self.constraints[b].name));
        ids
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Render the whole catalog as a deterministic printable tree.
    pub fn dump(&self, types: &TypeRegistry) -> String {
        let mut out = String::new();
        for schema in self.schemas() {
            let _ = writeln!(out, "schema {}", schema.name);
            for table_id in schema.table_ids() {
                let table = self.table(table_id);
                let _ = writeln!(out, "  table {}", table.name);
                for col_id in table.column_ids() {
                    let column = self.column(col_id);
                    let _ = write!(out, "    column {} {}", column.name, types.name(column.ty));
                    if column.attrs.not_null {
                        out.push_str(" not_null");
                    }
                    if column.attrs.pkey {
                        out.push_str(" pkey");
                    }
                    if column.attrs.has_sequence {
                        let _ = write!(out, " sequence={}", column.attrs.sequence_name);
                    }
                    if column.attrs.has_explicit_default {
                        let _ = write!(out, " default={}", column.attrs.column_default);
                    }
                    out.push('\n');
                }
                for con_id in self.table_constraints(table_id) {
                    let constraint = self.constraint(con_id);
                    let cols = self.join_column_names(&constraint.constrains, ", ");
                    let _ = write!(
                        out,
                        "    constraint {} {} ({cols})",
                        constraint.name, constraint.kind
                    );
                    if let Some(refers_table) = constraint.refers_table {
                        let refs = self.join_column_names(&constraint.refers, ", ");
                        let _ = write!(
                            out,
                            " references {} ({refs})",
                            self.table(refers_table).name
                        );
                    }
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Join the names of `columns` with `sep`, in the order given.
    pub fn join_column_names(&self, columns: &[ColumnId], sep: &str) -> String {
        columns
            .iter()
            .map(|&id| self.column(id).name.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Check the catalog's structural invariants, returning a description of
    /// the first violation found. Intended for tests and debugging.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (col_id, column) in &self.columns {
            let table = self
                .tables
                .get(&column.table)
                .ok_or_else(|| format!("column {} points at a missing table", column.name))?;
            if table.column_id(&column.name) != Some(*col_id) {
                return Err(format!(
                    "column {} is not listed by its table {}",
                    column.name, table.name
                ));
            }
            if column.attrs.has_sequence != !column.attrs.sequence_name.is_empty() {
                return Err(format!(
                    "column {} has inconsistent sequence attributes",
                    column.name
                ));
            }
            let has_primary = self
                .depends
                .constraining(*col_id)
                .iter()
                .any(|cid| self.constraints[cid].kind == ConstraintKind::Primary);
            if column.attrs.pkey != has_primary {
                return Err(format!(
                    "column {} pkey flag disagrees with the dependency index",
                    column.name
                ));
            }
        }
        for constraint in self.constraints.values() {
            for col in &constraint.constrains {
                if self.columns.get(col).map(|c| c.table) != Some(constraint.table) {
                    return Err(format!(
                        "constraint {} constrains a column outside its table",
                        constraint.name
                    ));
                }
            }
            for col in &constraint.refers {
                if self.columns.get(col).map(|c| c.table) != constraint.refers_table {
                    return Err(format!(
                        "constraint {} refers to a column outside its referenced table",
                        constraint.name
                    ));
                }
            }
            let fqn = self.constraint_fqn_of(constraint);
            if self.depends.by_name(&fqn) != Some(constraint.id) {
                return Err(format!("constraint {fqn} is not indexed under its name"));
            }
            for col in constraint.depends() {
                if !self.depends.by_column(col).contains(&constraint.id) {
                    return Err(format!(
                        "constraint {} is missing from a column index",
                        constraint.name
                    ));
                }
            }
        }
        for (col, entries) in self.depends.column_entries() {
            if !self.columns.contains_key(&col) {
                return Err("dependency index references a removed column".to_string());
            }
            for cid in entries {
                let Some(constraint) = self.constraints.get(cid) else {
                    return Err("dependency index references a removed constraint".to_string());
                };
                let fqn = self.constraint_fqn_of(constraint);
                if self.depends.by_name(&fqn) != Some(*cid) {
                    return Err(format!("constraint {fqn} indexed by column but not by name"));
                }
            }
        }
        let mut primaries: FxHashMap<TableId, usize> = FxHashMap::default();
        for constraint in self.constraints.values() {
            if constraint.kind == ConstraintKind::Primary {
                *primaries.entry(constraint.table).or_default() += 1;
            }
        }
        if let Some((table, _)) = primaries.iter().find(|(_, count)| **count > 1) {
            return Err(format!(
                "table {} has more than one primary constraint",
                self.table(*table).name
            ));
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
