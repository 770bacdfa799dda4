//! Error types and result definitions for the pgmodel DDL compiler.
//!
//! This crate provides a unified error type ([`Error`]) and result type alias
//! ([`Result<T>`]) used throughout all pgmodel crates. Every operation that can
//! fail returns `Result<T>`, where the error variant carries the names of the
//! objects involved so callers can render precise messages or match on kinds.
//!
//! # Error Categories
//!
//! - **Structural**: missing or duplicated schemas, tables, columns, and types
//! - **Constraint**: violations of constraint lifecycle rules (restricted
//!   drops, illegal casts, missing defaults)
//! - **Parse**: failures reported by the external PostgreSQL parser
//! - **Parse-shape**: an AST node did not have the shape the parser contract
//!   promises ([`Error::UnexpectedNodeShape`]) — treated as fatal
//! - **Internal**: reserved variants for future elaboration

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
