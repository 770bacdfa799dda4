use pgmodel_result::{Error, Result};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::builtin;

/// Handle into the [`TypeRegistry`]'s arena. Ids are allocated in
/// registration order and never reused, so integer equality is type identity.
pub type TypeId = u32;

/// A single entry in the type registry: one canonical PostgreSQL type plus
/// the spellings that resolve to it.
#[derive(Debug, Clone)]
pub struct PostgresType {
    /// Canonical name, e.g. `character varying`.
    pub name: String,
    /// Alternative names recognized for this type, e.g. `varchar`.
    pub aliases: Vec<String>,
    /// Owning schema for user-defined types; empty for built-ins.
    pub schema: String,
    /// True for the serial family (`smallserial`, `serial`, `bigserial`).
    pub is_serial: bool,
    /// The integer peer a serial column collapses to when its sequence
    /// default is dropped. Always set for serial types.
    pub non_serial: Option<TypeId>,
    /// Enum labels in declaration order; empty for non-enum types.
    pub enum_values: Vec<String>,
    /// Exact lowercased spellings that resolve to this type.
    pub simple_matches: Vec<String>,
    /// Anchored regexes for parameterized spellings, tried in registration
    /// order after simple matches fail.
    pub pattern_matches: Vec<Regex>,
}

impl PostgresType {
    /// Build a user-defined enum type. The spelling used to reference the
    /// type (schema-qualified when declared qualified) becomes its only
    /// simple match.
    pub fn enum_type(schema: &str, name: &str, values: Vec<String>) -> Self {
        PostgresType {
            name: name.to_string(),
            aliases: Vec::new(),
            schema: schema.to_string(),
            is_serial: false,
            non_serial: None,
            enum_values: values,
            simple_matches: vec![name.to_lowercase()],
            pattern_matches: Vec::new(),
        }
    }

    /// True when this entry is a user-defined enum.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// Catalog of PostgreSQL types: built-ins registered at construction plus
/// user-defined enums added at runtime.
///
/// Lookup order mirrors PostgreSQL's own spelling tolerance: the lowercased
/// input is checked against the exact-match table first, then against each
/// registered pattern in order. Unmatched spellings are an error; the
/// registry never invents types.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<PostgresType>,
    simple: FxHashMap<String, TypeId>,
    patterns: Vec<(Regex, TypeId)>,
    casts: FxHashMap<TypeId, Vec<TypeId>>,
}

impl TypeRegistry {
    /// Create a registry pre-populated with the built-in PostgreSQL types,
    /// serial links, and the cast table.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            simple: FxHashMap::default(),
            patterns: Vec::new(),
            casts: FxHashMap::default(),
        };
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Register a type. Fails with [`Error::DuplicateType`] if any of its
    /// simple matches collides with a prior registration; pattern matches are
    /// appended in registration order.
    pub fn register(&mut self, ty: PostgresType) -> Result<TypeId> {
        for spelling in &ty.simple_matches {
            if let Some(&existing) = self.simple.get(spelling.as_str()) {
                return Err(Error::DuplicateType {
                    spelling: spelling.clone(),
                    existing: self.types[existing as usize].name.clone(),
                });
            }
        }
        let id = self.types.len() as TypeId;
        for spelling in &ty.simple_matches {
            self.simple.insert(spelling.clone(), id);
        }
        for pattern in &ty.pattern_matches {
            self.patterns.push((pattern.clone(), id));
        }
        self.types.push(ty);
        Ok(id)
    }

    /// Resolve a type spelling to its registry handle.
    pub fn resolve(&self, spelling: &str) -> Result<TypeId> {
        let lowered = spelling.to_lowercase();
        if let Some(&id) = self.simple.get(lowered.as_str()) {
            return Ok(id);
        }
        for (regex, id) in &self.patterns {
            if regex.is_match(&lowered) {
                return Ok(*id);
            }
        }
        Err(Error::UnknownType(spelling.to_string()))
    }

    /// Fetch a registered type. Ids are only produced by this registry, so
    /// out-of-range handles are a caller bug.
    pub fn get(&self, id: TypeId) -> &PostgresType {
        &self.types[id as usize]
    }

    /// Canonical name of a registered type.
    pub fn name(&self, id: TypeId) -> &str {
        &self.types[id as usize].name
    }

    /// True when `ALTER COLUMN ... TYPE` may convert `from` into `to`.
    ///
    /// The integer/serial family is fully mutually castable (including to
    /// itself); `text` and `bytea` cast to each other; every other pair,
    /// including identity casts outside the table, is refused.
    pub fn can_cast(&self, from: TypeId, to: TypeId) -> bool {
        self.casts
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn link_serial(&mut self, serial: TypeId, base: TypeId) {
        self.types[serial as usize].non_serial = Some(base);
    }

    pub(crate) fn allow_casts(&mut self, from: TypeId, to: &[TypeId]) {
        self.casts.insert(from, to.to_vec());
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_registration_resolves_by_spelling() {
        let mut registry = TypeRegistry::new();
        let id = registry
            .register(PostgresType::enum_type(
                "app",
                "app.status",
                vec!["open".into(), "closed".into()],
            ))
            .expect("register enum");
        assert_eq!(registry.resolve("app.status").expect("resolve"), id);
        assert_eq!(registry.resolve("APP.STATUS").expect("resolve"), id);
        let ty = registry.get(id);
        assert!(ty.is_enum());
        assert_eq!(ty.enum_values, ["open", "closed"]);
        assert_eq!(ty.schema, "app");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register(PostgresType::enum_type("", "text", vec!["a".into()]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateType { spelling, existing }
                if spelling == "text" && existing == "text"
        ));
    }

    #[test]
    fn unknown_spelling_is_an_error() {
        let registry = TypeRegistry::new();
        let err = registry.resolve("mystery_type").unwrap_err();
        assert!(matches!(err, Error::UnknownType(s) if s == "mystery_type"));
    }
}
