//! Scored object catalog and per-level point tables.

use std::collections::HashMap;

use cube_push_core::{ObjectKind, MAX_POINTS_COLUMN};

/// Points and identity for one kind of scored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectType {
    /// Type code persisted for objects of this kind.
    pub kind: ObjectKind,
    /// Human-readable label used by hosts.
    pub name: String,
    /// Points awarded per push, indexed by `min(level, 2)`.
    pub points_by_level: Vec<i32>,
}

impl ObjectType {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(kind: ObjectKind, name: impl Into<String>, points_by_level: Vec<i32>) -> Self {
        Self {
            kind,
            name: name.into(),
            points_by_level,
        }
    }

    /// Points awarded for a push performed at the provided level.
    #[must_use]
    pub fn points_at(&self, level: u32) -> i32 {
        let column = usize::try_from(level.min(MAX_POINTS_COLUMN)).unwrap_or(0);
        self.points_by_level.get(column).copied().unwrap_or(0)
    }
}

/// Ordered set of scored object kinds that populate the board.
///
/// Spawn passes walk the entries in declaration order. Kind lookups go through
/// an index resolved once when the catalog is built.
#[derive(Clone, Debug)]
pub struct Catalog {
    entries: Vec<ObjectType>,
    index: HashMap<ObjectKind, usize>,
}

impl Catalog {
    /// Builds a catalog from the provided entries.
    ///
    /// When a kind appears more than once, lookups resolve to its first entry.
    #[must_use]
    pub fn new(entries: Vec<ObjectType>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let _ = index.entry(entry.kind).or_insert(position);
        }
        Self { entries, index }
    }

    /// Entries in spawn order.
    #[must_use]
    pub fn entries(&self) -> &[ObjectType] {
        &self.entries
    }

    /// Number of entries, which is also the number of objects per spawn pass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the entry describing `kind`.
    #[must_use]
    pub fn lookup(&self, kind: ObjectKind) -> Option<&ObjectType> {
        self.index
            .get(&kind)
            .and_then(|position| self.entries.get(*position))
    }

    pub(crate) fn has_duplicates(&self) -> bool {
        self.index.len() != self.entries.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            ObjectType::new(ObjectKind::new(2), "sphere", vec![10, 15, 20]),
            ObjectType::new(ObjectKind::new(3), "capsule", vec![5, 10, 25]),
        ])
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Catalog {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_column_saturates_at_level_two() {
        let entry = ObjectType::new(ObjectKind::new(2), "sphere", vec![1, 2, 3]);
        assert_eq!(entry.points_at(0), 1);
        assert_eq!(entry.points_at(1), 2);
        assert_eq!(entry.points_at(2), 3);
        assert_eq!(entry.points_at(7), 3);
    }

    #[test]
    fn lookup_resolves_known_kinds_only() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.lookup(ObjectKind::new(3)).map(|entry| entry.name.as_str()),
            Some("capsule")
        );
        assert!(catalog.lookup(ObjectKind::new(42)).is_none());
        assert!(!catalog.has_duplicates());
    }

    #[test]
    fn duplicate_kinds_are_detected() {
        let catalog = Catalog::new(vec![
            ObjectType::new(ObjectKind::new(2), "a", vec![1, 1, 1]),
            ObjectType::new(ObjectKind::new(2), "b", vec![2, 2, 2]),
        ]);
        assert!(catalog.has_duplicates());
        assert_eq!(
            catalog.lookup(ObjectKind::new(2)).map(|entry| entry.name.as_str()),
            Some("a")
        );
    }
}
