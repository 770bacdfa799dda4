//! DDL statement dispatch and semantic analysis.
//!
//! [`Compiler`] is the entry point of the pgmodel stack: it feeds SQL text
//! through the external PostgreSQL parser (`pg_query`), walks the resulting
//! statement list in order, and applies each DDL statement as a mutation on
//! the in-memory catalog. Statements are applied atomically with respect to
//! each other — the first error stops the stream, and mutations made by
//! earlier statements remain committed.
//!
//! Tokenization and grammar are entirely the parser's concern; this crate
//! only consumes the typed protobuf AST it produces.

pub mod compiler;

pub use compiler::Compiler;
