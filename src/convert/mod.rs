//! The conversion engine.
//!
//! Turns source armies into destination armies of discrete, homed
//! regiments while conserving total force size through remainder pooling.

pub mod capacity;
pub mod driver;
pub mod naming;
pub mod pool;
pub mod resolver;

pub use capacity::CapacityLedger;
pub use driver::{
    convert_all, convert_country, CostTable, CountryForces, CountryInput, POOL_ATTEMPT_CEILING,
};
pub use naming::{ordinal_suffix, RegimentNamer};
pub use pool::RemainderPool;
pub use resolver::{HomeResolver, Placement};

use crate::map::{AdjacencyGraph, ProvinceGraph, ProvinceMapper};

/// The read-only inputs shared by every country's conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    pub graph: &'a ProvinceGraph,
    pub adjacency: &'a AdjacencyGraph,
    pub mapper: &'a ProvinceMapper,
    pub costs: &'a CostTable,
}
