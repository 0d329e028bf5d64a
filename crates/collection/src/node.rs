//! The recursive collection tree.
//!
//! A [`Collection`] is either a [`LegacyCollection`] (a name and a flat list
//! of digests, all the game's own database can express) or an
//! [`ExtendedCollection`] that owns beatmap sets, bare beatmaps and child
//! collections by value.

use osupack_beatmap::{BeatmapRecord, Digest};

/// Shared view over both collection variants.
pub trait NamedCollection {
    fn name(&self) -> &str;

    /// Digests owned directly by this collection. Child collections are not
    /// included; they keep their own names and digest lists.
    fn beatmap_hashes(&self) -> Vec<Digest>;
}

/// Beatmap records decoded from one beatmap-set archive.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapSet {
    pub name: String,
    pub records: Vec<BeatmapRecord>,
}
impl BeatmapSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), records: Vec::new() }
    }

    /// Set id of the first record, if any. Every record in a well-formed set
    /// shares it.
    pub fn set_id(&self) -> Option<i32> {
        self.records.first().map(|record| record.beatmap_set_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyCollection {
    pub name: String,
    pub hashes: Vec<Digest>,
}
impl LegacyCollection {
    pub fn new(name: impl Into<String>, hashes: Vec<Digest>) -> Self {
        Self { name: name.into(), hashes }
    }
}
impl NamedCollection for LegacyCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn beatmap_hashes(&self) -> Vec<Digest> {
        self.hashes.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedCollection {
    pub name: String,
    pub sets: Vec<BeatmapSet>,
    /// Beatmaps found outside of any set.
    pub records: Vec<BeatmapRecord>,
    pub children: Vec<Collection>,
}
impl ExtendedCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Every record owned directly by this node: set members first, in set
    /// order, then bare records.
    pub fn records(&self) -> impl Iterator<Item = &BeatmapRecord> {
        self.sets.iter().flat_map(|set| set.records.iter()).chain(self.records.iter())
    }

    pub fn legacy_child_count(&self) -> usize {
        self.children.iter().filter(|child| matches!(child, Collection::Legacy(_))).count()
    }

    pub fn extended_child_count(&self) -> usize {
        self.children.iter().filter(|child| matches!(child, Collection::Extended(_))).count()
    }

    /// This node followed by every extended descendant, depth first.
    pub fn extended_nodes(&self) -> Vec<&ExtendedCollection> {
        let mut nodes = vec![self];
        for child in &self.children {
            if let Collection::Extended(child) = child {
                nodes.extend(child.extended_nodes());
            }
        }
        nodes
    }
}
impl NamedCollection for ExtendedCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn beatmap_hashes(&self) -> Vec<Digest> {
        self.records().map(BeatmapRecord::digest).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Legacy(LegacyCollection),
    Extended(ExtendedCollection),
}
impl Collection {
    pub fn children(&self) -> &[Collection] {
        match self {
            Self::Legacy(_) => &[],
            Self::Extended(node) => &node.children,
        }
    }

    /// The flat name + digests form the legacy database stores.
    pub fn to_legacy(&self) -> LegacyCollection {
        LegacyCollection::new(self.name(), self.beatmap_hashes())
    }

    /// This collection and all of its descendants, parents before children.
    pub fn walk(&self) -> Vec<&Collection> {
        let mut nodes = vec![self];
        for child in self.children() {
            nodes.extend(child.walk());
        }
        nodes
    }
}
impl NamedCollection for Collection {
    fn name(&self) -> &str {
        match self {
            Self::Legacy(node) => node.name(),
            Self::Extended(node) => node.name(),
        }
    }

    fn beatmap_hashes(&self) -> Vec<Digest> {
        match self {
            Self::Legacy(node) => node.beatmap_hashes(),
            Self::Extended(node) => node.beatmap_hashes(),
        }
    }
}
impl From<LegacyCollection> for Collection {
    fn from(node: LegacyCollection) -> Self {
        Self::Legacy(node)
    }
}
impl From<ExtendedCollection> for Collection {
    fn from(node: ExtendedCollection) -> Self {
        Self::Extended(node)
    }
}
