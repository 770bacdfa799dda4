//! In-memory catalog model for the pgmodel toolkit.
//!
//! The catalog mirrors the object graph a PostgreSQL server maintains for
//! DDL: schemas own tables, tables own columns, and constraints tie columns
//! together across tables. Object graphs are cyclic in the relational model
//! (a column belongs to a table that lists the column), so this crate stores
//! every object in a catalog-wide arena and hands out integer id handles;
//! handle equality is object identity.
//!
//! The [`DependencyIndex`] keeps the bidirectional column-to-constraint
//! mappings needed to answer "what depends on this?" during `DROP` handling.
//! All mutation entry points live on [`Catalog`] so the index and the column
//! attributes it maintains can never drift apart.

pub mod catalog;
pub mod collections;
pub mod column;
pub mod constraint;
pub mod depends;
pub mod ids;
pub mod table;

pub use catalog::{Catalog, DEFAULT_SCHEMA};
pub use collections::Multimap;
pub use column::{Column, ColumnAttributes};
pub use constraint::{Constraint, ConstraintKind, ConstraintSpec, DropBehaviour};
pub use depends::DependencyIndex;
pub use ids::{ColumnId, ConstraintId, TableId};
pub use table::{Schema, Table};
