//! Collection names that an import would duplicate.
//!
//! The scan only reports. Deciding whether a collision stops the merge is up
//! to the caller.

use crate::error::{ErrorKind, Result};
use crate::legacy::LegacyDatabase;
use crate::node::{Collection, NamedCollection};
use exn::ResultExt;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashSet;
use tracing::instrument;

/// Names already present in an existing database.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    top_level: HashSet<String>,
    /// Top-level names plus the names of every nested descendant.
    all: HashSet<String>,
}
impl NameIndex {
    pub fn from_collections<'a>(collections: impl IntoIterator<Item = &'a Collection>) -> Self {
        let mut index = Self::default();
        for collection in collections {
            index.top_level.insert(collection.name().to_string());
            index.all.extend(collection.walk().into_iter().map(|node| node.name().to_string()));
        }
        index
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all.contains(name)
    }

    pub fn contains_top_level(&self, name: &str) -> bool {
        self.top_level.contains(name)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
impl From<&LegacyDatabase> for NameIndex {
    fn from(database: &LegacyDatabase) -> Self {
        let top_level: HashSet<String> = database.names().map(str::to_string).collect();
        Self { all: top_level.clone(), top_level }
    }
}

/// A node of the candidate tree whose name is already taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision<'a> {
    pub collection: &'a Collection,
    /// Names from the candidate root down to the colliding node, joined by `/`.
    pub path: String,
}

/// Runs duplicate scans on a dedicated, bounded worker pool.
///
/// Every child subtree is scanned as its own task and results are joined
/// back in tree order, so the report is deterministic regardless of the
/// number of workers.
pub struct DuplicateScanner {
    pool: ThreadPool,
}

impl DuplicateScanner {
    /// Values of `max_concurrency` below one are treated as one.
    pub fn new(max_concurrency: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_concurrency.max(1))
            .thread_name(|index| format!("osupack-scan-{index}"))
            .build()
            .or_raise(|| ErrorKind::ScanPool)?;
        Ok(Self { pool })
    }

    pub fn max_concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Report every node of `candidate` whose name collides with `existing`.
    ///
    /// The candidate's own name and the names of its extended descendants
    /// are checked against every name in `existing`, nested ones included.
    /// Legacy children are checked against top-level names only.
    #[instrument(skip_all, fields(candidate = candidate.name(), existing = existing.len(), collisions))]
    pub fn scan<'a>(&self, candidate: &'a Collection, existing: &NameIndex) -> Vec<Collision<'a>> {
        let collisions = self.pool.install(|| scan_node(candidate, candidate.name().to_string(), existing));
        tracing::Span::current().record("collisions", collisions.len());
        for collision in &collisions {
            tracing::debug!(path = %collision.path, "Collection name already exists");
        }
        collisions
    }

    pub fn scan_database<'a>(&self, candidate: &'a Collection, database: &LegacyDatabase) -> Vec<Collision<'a>> {
        self.scan(candidate, &NameIndex::from(database))
    }
}

fn scan_node<'a>(node: &'a Collection, path: String, existing: &NameIndex) -> Vec<Collision<'a>> {
    let mut collisions = Vec::new();
    if existing.contains(node.name()) {
        collisions.push(Collision { collection: node, path: path.clone() });
    }
    let children: Vec<Vec<Collision<'a>>> = node
        .children()
        .par_iter()
        .map(|child| {
            let child_path = format!("{path}/{}", child.name());
            match child {
                Collection::Extended(_) => scan_node(child, child_path, existing),
                Collection::Legacy(_) if existing.contains_top_level(child.name()) => {
                    vec![Collision { collection: child, path: child_path }]
                },
                Collection::Legacy(_) => Vec::new(),
            }
        })
        .collect();
    collisions.extend(children.into_iter().flatten());
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ExtendedCollection, LegacyCollection};
    use osupack_beatmap::Digest;
    use rstest::rstest;

    fn extended(name: &str, children: Vec<Collection>) -> Collection {
        ExtendedCollection { children, ..ExtendedCollection::new(name) }.into()
    }

    fn legacy(name: &str) -> Collection {
        LegacyCollection::new(name, vec![Digest::of(name)]).into()
    }

    fn database(names: &[&str]) -> LegacyDatabase {
        let mut database = LegacyDatabase::default();
        database.collections.extend(names.iter().map(|name| LegacyCollection::new(*name, Vec::new())));
        database
    }

    fn paths(collisions: &[Collision<'_>]) -> Vec<String> {
        collisions.iter().map(|collision| collision.path.clone()).collect()
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    fn test_candidate_name_collides_once(#[case] workers: usize) {
        let scanner = DuplicateScanner::new(workers).unwrap();
        let candidate = extended("Foo", vec![extended("A", vec![]), extended("B", vec![]), legacy("C")]);
        let collisions = scanner.scan_database(&candidate, &database(&["Foo", "Bar"]));
        assert_eq!(paths(&collisions), ["Foo"]);
        assert!(std::ptr::eq(collisions[0].collection, &candidate));
    }

    #[test]
    fn test_collision_attributed_to_child() {
        let scanner = DuplicateScanner::new(2).unwrap();
        let candidate = extended("Unique", vec![extended("Other", vec![]), extended("Foo", vec![])]);
        let collisions = scanner.scan_database(&candidate, &database(&["Foo"]));
        assert_eq!(paths(&collisions), ["Unique/Foo"]);
        assert_eq!(collisions[0].collection.name(), "Foo");
    }

    #[test]
    fn test_legacy_child_checked_against_top_level() {
        let scanner = DuplicateScanner::new(2).unwrap();
        let existing = [extended("Outer", vec![legacy("Inner")])];
        let index = NameIndex::from_collections(&existing);
        assert!(index.contains("Inner"));
        assert!(!index.contains_top_level("Inner"));

        let candidate = extended("New", vec![legacy("Inner"), extended("Inner", vec![]), legacy("Outer")]);
        let collisions = scanner.scan(&candidate, &index);
        assert_eq!(paths(&collisions), ["New/Inner", "New/Outer"]);
        assert!(matches!(collisions[0].collection, Collection::Extended(_)));
        assert!(matches!(collisions[1].collection, Collection::Legacy(_)));
    }

    #[test]
    fn test_deep_collisions_in_tree_order() {
        let scanner = DuplicateScanner::new(3).unwrap();
        let candidate = extended(
            "Root",
            vec![
                extended("One", vec![extended("Dup", vec![]), extended("Two", vec![])]),
                extended("Two", vec![extended("Dup", vec![extended("Dup", vec![])])]),
            ],
        );
        let collisions = scanner.scan_database(&candidate, &database(&["Dup", "Two"]));
        assert_eq!(paths(&collisions), ["Root/One/Dup", "Root/One/Two", "Root/Two", "Root/Two/Dup", "Root/Two/Dup/Dup"]);
    }

    #[test]
    fn test_no_collisions() {
        let scanner = DuplicateScanner::new(1).unwrap();
        let candidate = extended("Fresh", vec![legacy("Also fresh")]);
        assert!(scanner.scan_database(&candidate, &database(&[])).is_empty());
        assert!(scanner.scan_database(&candidate, &database(&["Stale"])).is_empty());
    }

    #[test]
    fn test_scan_does_not_mutate() {
        let scanner = DuplicateScanner::new(2).unwrap();
        let candidate = extended("Foo", vec![legacy("Foo")]);
        let before = candidate.clone();
        let existing = database(&["Foo"]);
        let collisions = scanner.scan_database(&candidate, &existing);
        assert_eq!(collisions.len(), 2);
        assert_eq!(candidate, before);
        assert_eq!(existing, database(&["Foo"]));
    }

    #[test]
    fn test_zero_workers_means_one() {
        assert_eq!(DuplicateScanner::new(0).unwrap().max_concurrency(), 1);
    }
}
