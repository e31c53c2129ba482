//! Breadth-first search over the adjacency graph.
//!
//! Used when a regiment's preferred home is owned by the wrong country: the
//! search walks outward from the candidate and returns the nearest territory
//! owned by the converting country, or None when the frontier exhausts.

use std::collections::{HashSet, VecDeque};

use super::graph::{AdjacencyGraph, ProvinceGraph};
use super::territory::{CountryTag, TerritoryId};

/// Finds the territory owned by `owner` nearest to `start` under graph
/// distance. The start territory itself is never returned; it is assumed to
/// have already failed the ownership test. Territories absent from the
/// province graph are not traversed. Visits each territory at most once.
pub fn nearest_owned(
    graph: &ProvinceGraph,
    adjacency: &AdjacencyGraph,
    start: TerritoryId,
    owner: CountryTag,
) -> Option<TerritoryId> {
    let mut visited: HashSet<TerritoryId> = HashSet::new();
    let mut frontier: VecDeque<TerritoryId> = VecDeque::new();
    visited.insert(start);
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        for &next in adjacency.neighbors(current) {
            if !visited.insert(next) {
                continue;
            }
            let territory = match graph.get(next) {
                Some(t) => t,
                None => continue,
            };
            if territory.owner == Some(owner) {
                return Some(next);
            }
            frontier.push_back(next);
        }
    }

    None
}
