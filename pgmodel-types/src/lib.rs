//! PostgreSQL type registry for the pgmodel toolkit.
//!
//! This crate hosts the catalog of built-in PostgreSQL types plus any
//! user-defined enum types registered at runtime, decoupled from the catalog
//! model (`pgmodel-catalog`) and the semantic analyzer (`pgmodel-sql`).
//!
//! Spellings resolve in two steps: an exact lowercased match against simple
//! names and aliases (`bigint`, `int8`), then an ordered scan of anchored,
//! whitespace-tolerant regular expressions for parameterized spellings
//! (`varchar ( 80 )`, `numeric(10,2)`, `time(3) with time zone`).

pub mod builtin;
pub mod registry;

pub use registry::{PostgresType, TypeId, TypeRegistry};
