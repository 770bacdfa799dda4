//! Expression helpers over the PostgreSQL parse tree.
//!
//! The catalog stores column defaults as canonical strings rather than
//! expression trees, so this crate reduces the small AST subset that appears
//! in `DEFAULT` clauses — constants, typed casts, value functions, and
//! function calls — to string form. The rewrite is purely structural: no
//! arithmetic is evaluated and no symbols are resolved, and expression
//! shapes outside the subset reduce to the empty string.
//!
//! Name-list helpers ([`node_text`], [`node_texts`]) for the parser's
//! `String` node lists also live here, shared with the semantic analyzer.

pub mod eval;

pub use eval::{expr_to_string, node_text, node_texts};
