use thiserror::Error;

/// Unified error type for all pgmodel operations.
///
/// This enum covers every failure mode across the pgmodel stack, from type
/// registry lookups to constraint lifecycle rules. Each variant carries the
/// names of the catalog objects involved.
///
/// # Error Handling Strategy
///
/// Errors propagate upward through the call stack using Rust's `?` operator.
/// The statement dispatcher wraps handler failures in [`Error::Statement`] so
/// callers see which statement kind was being applied. Handlers return on the
/// first error; mutations already applied by earlier statements remain
/// committed.
#[derive(Error, Debug)]
pub enum Error {
    /// `CREATE SCHEMA` targeted a schema that already exists (and
    /// `IF NOT EXISTS` was absent).
    #[error("schema already exists: {0}")]
    SchemaExists(String),

    /// An identifier resolved to a schema that is not in the catalog.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// `CREATE TABLE` or `ALTER TABLE ... RENAME` collided with an existing
    /// table in the same schema.
    #[error("table already exists: {0}")]
    DuplicateTable(String),

    /// A table lookup failed after its schema resolved.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A column definition collided with an existing column on the table.
    #[error("column already exists: {0}")]
    DuplicateColumn(String),

    /// A column lookup failed on a resolved table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A type registration collided with an already-registered spelling.
    #[error("type name {spelling} already matches type {existing}")]
    DuplicateType { spelling: String, existing: String },

    /// A type spelling matched neither a simple name nor a pattern in the
    /// registry.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// `DROP CONSTRAINT` named a constraint absent from the dependency index.
    #[error("constraint not found: {0}")]
    ConstraintNotFound(String),

    /// `DROP NOT NULL` targeted a column that participates in a primary key.
    #[error("can't drop not null constraint from primary key column {0}")]
    IsPrimaryKey(String),

    /// `DROP NOT NULL` targeted a column that is already nullable.
    #[error("can't drop not null constraint from nullable column {0}")]
    NotNotNull(String),

    /// `DROP DEFAULT` targeted a column with neither an explicit default nor
    /// a serial sequence.
    #[error("column {0} has no default to drop")]
    NoDefaultToDrop(String),

    /// A drop was refused because a constraint with RESTRICT behaviour
    /// depends on the object and `CASCADE` was not requested.
    #[error("can't drop {object} because constraint {constraint} depends on it")]
    RestrictedByConstraint { object: String, constraint: String },

    /// `ALTER COLUMN ... TYPE` requested a conversion outside the cast table.
    #[error("illegal cast from {from} to {to}")]
    IllegalCast { from: String, to: String },

    /// A constraint kind the analyzer does not model yet.
    #[error("not yet able to process constraint type {0}")]
    UnsupportedConstraint(String),

    /// The AST did not match the shape the parser contract promises. This
    /// indicates a bug in the parser integration rather than bad user input.
    #[error("unexpected node shape: {0}")]
    UnexpectedNodeShape(String),

    /// Reserved for default expressions the evaluator cannot reduce.
    #[error("expression cannot be stringified: {0}")]
    ExpressionNotStringifiable(String),

    /// Failure reported by the external PostgreSQL parser.
    #[error("parse error: {0}")]
    Parse(#[from] pg_query::Error),

    /// Context wrapper added by the statement dispatcher.
    #[error("while {verb}: {source}")]
    Statement {
        verb: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the dispatcher's "while <verb>" context.
    #[inline]
    pub fn while_doing(verb: &'static str) -> impl FnOnce(Error) -> Error {
        move |source| Error::Statement {
            verb,
            source: Box::new(source),
        }
    }

    /// Create an [`Error::UnexpectedNodeShape`] from any displayable detail.
    #[inline]
    pub fn node_shape<D: std::fmt::Display>(detail: D) -> Self {
        Error::UnexpectedNodeShape(detail.to_string())
    }
}
