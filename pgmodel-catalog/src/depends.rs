use rustc_hash::FxHashMap;

use crate::collections::Multimap;
use crate::constraint::Constraint;
use crate::ids::{ColumnId, ConstraintId};

/// Bidirectional column-to-constraint index.
///
/// `by_column` holds every constraint that touches a column in either role;
/// `constrains` holds only constraints where the column is on the
/// constrained side, `refers` only those where it is the referent. `by_name`
/// maps constraint fully-qualified names (`schema.constraint`) to ids.
///
/// The index is maintained exclusively by [`Catalog`](crate::Catalog)
/// mutations so that every live constraint appears under each of its columns
/// and under its name, and nothing else does.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    by_column: Multimap<ColumnId, ConstraintId>,
    constrains: Multimap<ColumnId, ConstraintId>,
    refers: Multimap<ColumnId, ConstraintId>,
    by_name: FxHashMap<String, ConstraintId>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, fqn: String, constraint: &Constraint) {
        for &col in &constraint.constrains {
            self.by_column.add(col, constraint.id);
            self.constrains.add(col, constraint.id);
        }
        for &col in &constraint.refers {
            self.by_column.add(col, constraint.id);
            self.refers.add(col, constraint.id);
        }
        self.by_name.insert(fqn, constraint.id);
    }

    pub(crate) fn remove(&mut self, fqn: &str, constraint: &Constraint) {
        for &col in &constraint.constrains {
            self.by_column.remove_value(&col, &constraint.id);
            self.constrains.remove_value(&col, &constraint.id);
        }
        for &col in &constraint.refers {
            self.by_column.remove_value(&col, &constraint.id);
            self.refers.remove_value(&col, &constraint.id);
        }
        self.by_name.remove(fqn);
    }

    /// Constraints that touch `col` in any role, in insertion order.
    pub fn by_column(&self, col: ColumnId) -> &[ConstraintId] {
        self.by_column.get(&col)
    }

    /// Constraints where `col` is on the constrained side.
    pub fn constraining(&self, col: ColumnId) -> &[ConstraintId] {
        self.constrains.get(&col)
    }

    /// Constraints that refer to `col` (foreign keys pointing at it).
    pub fn referring_to(&self, col: ColumnId) -> &[ConstraintId] {
        self.refers.get(&col)
    }

    /// Look up a constraint by `schema.name`.
    pub fn by_name(&self, fqn: &str) -> Option<ConstraintId> {
        self.by_name.get(fqn).copied()
    }

    /// Iterate all `(fqn, id)` pairs in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = (&str, ConstraintId)> {
        self.by_name.iter().map(|(fqn, id)| (fqn.as_str(), *id))
    }

    /// Every column-keyed entry in the combined index, in arbitrary key
    /// order. Used by invariant checks.
    pub fn column_entries(&self) -> impl Iterator<Item = (ColumnId, &[ConstraintId])> {
        self.by_column.iter().map(|(col, cons)| (*col, cons))
    }
}
