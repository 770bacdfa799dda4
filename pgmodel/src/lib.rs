//! pgmodel: a static PostgreSQL DDL compiler.
//!
//! This crate is the primary entrypoint for the pgmodel toolkit. It
//! re-exports the compiler and catalog surfaces from the underlying
//! `pgmodel-*` crates so downstream applications — code generators,
//! migration linters, diff engines — see a single surface.
//!
//! pgmodel accepts a stream of PostgreSQL DDL statements (`CREATE SCHEMA`,
//! `CREATE TABLE`, `ALTER TABLE`, `DROP TABLE`, `ALTER ... RENAME`,
//! `CREATE TYPE ... AS ENUM`) and incrementally builds an in-memory catalog
//! mirroring the object graph a real server would maintain after executing
//! the same statements. It is a purely static model: no queries are
//! executed, no rows are stored, and no live database is contacted.
//!
//! # Crate Topology
//!
//! - [`pgmodel_sql`]: statement dispatch and semantic analysis — the
//!   [`Compiler`] entry point. Parsing is delegated to the external
//!   [`pg_query`](https://docs.rs/pg_query) binding of libpg_query.
//! - [`pgmodel_catalog`]: schemas, tables, columns, constraints, and the
//!   bidirectional column-constraint dependency index.
//! - [`pgmodel_types`]: the PostgreSQL type registry — built-in types,
//!   parameterized spelling patterns, the cast table, serial links, and
//!   user-defined enums.
//! - [`pgmodel_expr`]: reduction of default-value expressions to canonical
//!   strings.
//! - [`pgmodel_result`]: the unified error type.
//!
//! # Example
//!
//! ```
//! use pgmodel::Compiler;
//!
//! let mut compiler = Compiler::new();
//! compiler
//!     .execute("CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL);")
//!     .expect("valid DDL");
//!
//! let catalog = compiler.catalog();
//! let users = catalog.find_table("public", "users").expect("users");
//! assert_eq!(catalog.table(users).column_count(), 2);
//! ```

pub use pgmodel_catalog::{
    Catalog, Column, ColumnAttributes, ColumnId, Constraint, ConstraintId, ConstraintKind,
    DependencyIndex, DropBehaviour, Schema, Table, TableId,
};
pub use pgmodel_expr::expr_to_string;
pub use pgmodel_result::{Error, Result};
pub use pgmodel_sql::Compiler;
pub use pgmodel_types::{PostgresType, TypeId, TypeRegistry};
