//! Province graph and adjacency data for the destination map.
//!
//! `ProvinceGraph` holds the territory table plus the port blacklist and is
//! read-only during allocation. `AdjacencyGraph` records which territories
//! border which; symmetry is not assumed.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::territory::{CountryTag, Territory, TerritoryId};

/// The destination map: every territory keyed by id, plus the set of
/// territories barred from hosting navies regardless of their coastal flag.
///
/// Territories are stored in a `BTreeMap` so that every whole-map scan
/// (expeditionary sourcing, ownership queries) walks ids in ascending order.
#[derive(Debug, Clone, Default)]
pub struct ProvinceGraph {
    territories: BTreeMap<TerritoryId, Territory>,
    port_blacklist: HashSet<TerritoryId>,
}

impl ProvinceGraph {
    /// Builds a graph from a territory list and a port blacklist.
    pub fn new(territories: Vec<Territory>, port_blacklist: Vec<TerritoryId>) -> ProvinceGraph {
        ProvinceGraph {
            territories: territories.into_iter().map(|t| (t.id, t)).collect(),
            port_blacklist: port_blacklist.into_iter().collect(),
        }
    }

    /// Looks up a territory by id.
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Returns the owner of a territory, or None if unknown or unowned.
    pub fn owner_of(&self, id: TerritoryId) -> Option<CountryTag> {
        self.territories.get(&id).and_then(|t| t.owner)
    }

    /// Returns true if the territory may host navies: it must exist, be
    /// coastal, and not appear on the port blacklist.
    pub fn port_eligible(&self, id: TerritoryId) -> bool {
        if self.port_blacklist.contains(&id) {
            return false;
        }
        self.territories.get(&id).map(|t| t.coastal).unwrap_or(false)
    }

    /// Filters a candidate list down to port-eligible territories,
    /// preserving the candidates' order.
    pub fn port_filter(&self, candidates: &[TerritoryId]) -> Vec<TerritoryId> {
        candidates
            .iter()
            .copied()
            .filter(|id| self.port_eligible(*id))
            .collect()
    }

    /// Iterates the territories owned by the given country, ascending by id.
    pub fn owned_by(&self, tag: CountryTag) -> impl Iterator<Item = &Territory> {
        self.territories
            .values()
            .filter(move |t| t.owner == Some(tag))
    }

    /// Number of territories in the graph.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// Returns true if the graph holds no territories.
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }
}

/// Neighbor lists keyed by territory id.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    edges: HashMap<TerritoryId, Vec<TerritoryId>>,
}

impl AdjacencyGraph {
    /// Builds an adjacency graph from directed (from, to) pairs. Each pair
    /// is recorded one-way; callers supply both directions if they want a
    /// symmetric graph.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TerritoryId, TerritoryId)>) -> AdjacencyGraph {
        let mut edges: HashMap<TerritoryId, Vec<TerritoryId>> = HashMap::new();
        for (from, to) in pairs {
            edges.entry(from).or_default().push(to);
        }
        AdjacencyGraph { edges }
    }

    /// Neighbors of a territory, in the order the edges were recorded.
    pub fn neighbors(&self, id: TerritoryId) -> &[TerritoryId] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}
