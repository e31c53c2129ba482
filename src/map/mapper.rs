//! Source-to-destination province mapping.
//!
//! Maps a source-map province id to the destination territories it became.
//! A source province may be unmapped (no entry at all) or dropped (an entry
//! that deliberately maps to nothing); callers treat the two differently
//! when deciding whether to retry or discard.

use std::collections::HashMap;

use super::territory::{SourceProvinceId, TerritoryId};

/// Result of looking up a source province.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLookup<'a> {
    /// No mapping entry exists for the province.
    Unmapped,
    /// The province is explicitly mapped to nothing.
    Dropped,
    /// The province maps to these destination candidates.
    Mapped(&'a [TerritoryId]),
}

/// Mapping table from source provinces to destination candidates.
#[derive(Debug, Clone, Default)]
pub struct ProvinceMapper {
    entries: HashMap<SourceProvinceId, Vec<TerritoryId>>,
}

impl ProvinceMapper {
    pub fn new() -> ProvinceMapper {
        ProvinceMapper::default()
    }

    /// Records a mapping to one or more destination territories. An empty
    /// target list is the same as `insert_dropped`.
    pub fn insert(&mut self, source: SourceProvinceId, targets: Vec<TerritoryId>) {
        self.entries.insert(source, targets);
    }

    /// Records a province that was deliberately dropped from the
    /// destination map.
    pub fn insert_dropped(&mut self, source: SourceProvinceId) {
        self.entries.insert(source, Vec::new());
    }

    /// Looks up the destination candidates for a source province.
    pub fn lookup(&self, source: SourceProvinceId) -> MapLookup<'_> {
        match self.entries.get(&source) {
            None => MapLookup::Unmapped,
            Some(targets) if targets.is_empty() => MapLookup::Dropped,
            Some(targets) => MapLookup::Mapped(targets),
        }
    }
}
