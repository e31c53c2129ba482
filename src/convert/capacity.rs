//! Soldier-capacity bookkeeping.
//!
//! The province graph is immutable during allocation, so regiments homed in
//! a territory are counted here instead. Available capacity may go negative
//! through forced placement; the ledger records it without complaint.

use std::collections::HashMap;

use crate::map::{ProvinceGraph, TerritoryId};

/// Regiments assigned against each territory's soldier capacity this run.
#[derive(Debug, Default)]
pub struct CapacityLedger {
    assigned: HashMap<TerritoryId, u32>,
}

impl CapacityLedger {
    pub fn new() -> CapacityLedger {
        CapacityLedger::default()
    }

    /// Remaining regiment capacity of a territory: its soldier-pop capacity
    /// minus the regiments already homed there. Unknown territories have
    /// zero capacity.
    pub fn available(&self, graph: &ProvinceGraph, id: TerritoryId) -> i32 {
        let capacity = graph.get(id).map(|t| t.regiment_capacity()).unwrap_or(0);
        let used = self.assigned.get(&id).copied().unwrap_or(0) as i32;
        capacity - used
    }

    /// Records one more regiment homed in the territory.
    pub fn assign(&mut self, id: TerritoryId) {
        *self.assigned.entry(id).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Territory;

    fn graph_with_capacity(pops: Vec<u32>) -> ProvinceGraph {
        ProvinceGraph::new(
            vec![Territory {
                id: TerritoryId(1),
                owner: None,
                coastal: false,
                naval_base: 0,
                was_colony: false,
                was_infidel_conquest: false,
                cultures: Vec::new(),
                soldier_pops: pops,
            }],
            vec![],
        )
    }

    #[test]
    fn available_decreases_with_assignments() {
        let graph = graph_with_capacity(vec![6000]);
        let mut ledger = CapacityLedger::new();
        assert_eq!(ledger.available(&graph, TerritoryId(1)), 2);
        ledger.assign(TerritoryId(1));
        assert_eq!(ledger.available(&graph, TerritoryId(1)), 1);
        ledger.assign(TerritoryId(1));
        assert_eq!(ledger.available(&graph, TerritoryId(1)), 0);
    }

    #[test]
    fn forced_assignment_goes_negative() {
        let graph = graph_with_capacity(vec![]);
        let mut ledger = CapacityLedger::new();
        ledger.assign(TerritoryId(1));
        assert_eq!(ledger.available(&graph, TerritoryId(1)), -1);
    }

    #[test]
    fn unknown_territory_has_zero_capacity() {
        let graph = graph_with_capacity(vec![3000]);
        let ledger = CapacityLedger::new();
        assert_eq!(ledger.available(&graph, TerritoryId(9)), 0);
    }
}
