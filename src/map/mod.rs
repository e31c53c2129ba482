//! Destination-map representation.
//!
//! Contains the territory table, port eligibility, adjacency data, the
//! source-to-destination province mapping, and the ownership search used
//! during home resolution.

pub mod graph;
pub mod mapper;
pub mod search;
pub mod territory;

pub use graph::{AdjacencyGraph, ProvinceGraph};
pub use mapper::{MapLookup, ProvinceMapper};
pub use search::nearest_owned;
pub use territory::{
    CountryTag, SourceProvinceId, Territory, TerritoryId, POP_SIZE_PER_REGIMENT,
};
