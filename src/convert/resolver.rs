//! Per-regiment home resolution.
//!
//! Placing one regiment means drawing a source home, mapping it to the
//! destination map, and settling on a concrete territory under port,
//! ownership, and capacity constraints. Every failure either blocks the
//! drawn source home and asks for a retry, or rules the whole (army,
//! category) pair out for good.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::map::{nearest_owned, CountryTag, MapLookup, SourceProvinceId, TerritoryId};
use crate::roster::category::UnitCategory;
use crate::roster::dest::Regiment;
use crate::roster::source::SourceArmy;

use super::capacity::CapacityLedger;
use super::naming::RegimentNamer;
use super::ConversionContext;

/// Backstop on placement retries. Each retry blocks a source home, so the
/// loop already terminates once an army's homes are exhausted; the ceiling
/// only guards against a degenerate home distribution.
const MAX_PLACE_ATTEMPTS: usize = 100;

/// Outcome of a single placement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// The regiment was created and its home recorded.
    Placed(Regiment),
    /// The drawn source home was unusable and has been blocked; a fresh
    /// draw may still succeed.
    Retry,
    /// No draw can ever succeed for this army and category.
    DoNotRetry,
}

/// Resolves homes and names for one country's regiments.
///
/// Owns the run-scoped mutable state (capacity ledger, naming counters);
/// the map data behind `ConversionContext` stays immutable.
pub struct HomeResolver<'a> {
    ctx: &'a ConversionContext<'a>,
    tag: CountryTag,
    adjective: &'a str,
    primary_culture: &'a str,
    ledger: CapacityLedger,
    namer: RegimentNamer,
}

impl<'a> HomeResolver<'a> {
    pub fn new(
        ctx: &'a ConversionContext<'a>,
        tag: CountryTag,
        adjective: &'a str,
        primary_culture: &'a str,
    ) -> HomeResolver<'a> {
        HomeResolver {
            ctx,
            tag,
            adjective,
            primary_culture,
            ledger: CapacityLedger::new(),
            namer: RegimentNamer::new(),
        }
    }

    /// Attempts to place one regiment of `category` for `army`. Naval
    /// categories home in ports; land categories home in owned territory.
    pub fn place(
        &mut self,
        army: &SourceArmy,
        blocked: &mut HashSet<SourceProvinceId>,
        category: UnitCategory,
        rng: &mut impl Rng,
    ) -> Placement {
        let source_home = match army.draw_home(category, blocked, rng) {
            Some(id) => id,
            None => {
                debug!(
                    "army {} has no valid home provinces for {}; dissolving to pool",
                    army.name(),
                    category.name()
                );
                return Placement::DoNotRetry;
            }
        };

        let candidates = match self.ctx.mapper.lookup(source_home) {
            MapLookup::Unmapped => {
                debug!(
                    "{} unit in army {} has unmapped home province {}; dissolving to pool",
                    category.name(),
                    army.name(),
                    source_home
                );
                blocked.insert(source_home);
                return Placement::Retry;
            }
            MapLookup::Dropped => {
                debug!(
                    "{} unit in army {} has dropped home province {}; dissolving to pool",
                    category.name(),
                    army.name(),
                    source_home
                );
                blocked.insert(source_home);
                return Placement::Retry;
            }
            MapLookup::Mapped(candidates) => candidates,
        };

        let home = if category.is_naval() {
            match self.naval_home(candidates, rng) {
                Some(port) => port,
                None => {
                    debug!(
                        "no port home for a {} {} from province {}; dissolving to pool",
                        self.tag,
                        category.name(),
                        source_home
                    );
                    blocked.insert(source_home);
                    return Placement::Retry;
                }
            }
        } else {
            match self.land_home(candidates, category) {
                Some(territory) => territory,
                None => {
                    // All territories behind one source province share an
                    // owner, so the source home itself was bad.
                    blocked.insert(source_home);
                    return Placement::Retry;
                }
            }
        };

        let name = self.name_regiment(Some(home), category);
        Placement::Placed(Regiment {
            category,
            name,
            home: Some(home),
        })
    }

    /// Places a regiment, retrying across source homes until one resolves
    /// or the army runs out of them.
    pub fn place_until_resolved(
        &mut self,
        army: &SourceArmy,
        blocked: &mut HashSet<SourceProvinceId>,
        category: UnitCategory,
        rng: &mut impl Rng,
    ) -> Option<Regiment> {
        for _ in 0..MAX_PLACE_ATTEMPTS {
            match self.place(army, blocked, category, rng) {
                Placement::Placed(regiment) => return Some(regiment),
                Placement::Retry => continue,
                Placement::DoNotRetry => return None,
            }
        }
        None
    }

    /// Ships home in a random port among the candidates; ownership is not
    /// required.
    fn naval_home(&self, candidates: &[TerritoryId], rng: &mut impl Rng) -> Option<TerritoryId> {
        let ports = self.ctx.graph.port_filter(candidates);
        if ports.is_empty() {
            return None;
        }
        Some(ports[rng.gen_range(0..ports.len())])
    }

    /// Land regiments home in the candidate most able to support them,
    /// redirected to the nearest owned territory on an ownership mismatch,
    /// then debited against the capacity ledger.
    fn land_home(&mut self, candidates: &[TerritoryId], category: UnitCategory) -> Option<TerritoryId> {
        let graph = self.ctx.graph;
        let mut sorted: Vec<TerritoryId> = candidates
            .iter()
            .copied()
            .filter(|id| graph.get(*id).is_some())
            .collect();
        if sorted.is_empty() {
            debug!(
                "no valid home for a {} {} regiment; dissolving to pool",
                self.tag,
                category.name()
            );
            return None;
        }

        // Stable sort: equal capacities keep the candidate order.
        let ledger = &self.ledger;
        sorted.sort_by(|a, b| {
            ledger
                .available(graph, *b)
                .cmp(&ledger.available(graph, *a))
        });
        let mut home = sorted[0];

        if graph.owner_of(home) != Some(self.tag) {
            match nearest_owned(graph, self.ctx.adjacency, home, self.tag) {
                Some(owned) => home = owned,
                None => {
                    debug!(
                        "territory {} would home a {} {} regiment but belongs to {}; dissolving to pool",
                        home,
                        self.tag,
                        category.name(),
                        graph
                            .owner_of(home)
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "no one".to_string())
                    );
                    return None;
                }
            }
        }

        if self.ledger.available(graph, home) <= 0 {
            if let Some(expeditionary) = self.expeditionary_source() {
                home = expeditionary;
            }
            // Otherwise force the regiment onto the original home; its
            // capacity goes negative and that is accepted.
        }
        self.ledger.assign(home);
        Some(home)
    }

    /// Scans the country's territories for one fit to raise an
    /// expeditionary regiment: never a colony or an infidel conquest,
    /// majority primary culture, and at least one soldier population.
    /// Greatest spare capacity wins; ties keep the lowest territory id.
    fn expeditionary_source(&self) -> Option<TerritoryId> {
        let mut best: Option<(TerritoryId, i32)> = None;
        for territory in self.ctx.graph.owned_by(self.tag) {
            if territory.was_colony || territory.was_infidel_conquest {
                continue;
            }
            if !territory.has_culture(self.primary_culture, 0.5) {
                continue;
            }
            if !territory.has_soldier_pops() {
                continue;
            }
            let available = self.ledger.available(self.ctx.graph, territory.id);
            match best {
                Some((_, top)) if available <= top => {}
                _ => best = Some((territory.id, available)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Names a regiment from its home territory's counter, or from the
    /// country-wide counter when no home was resolved.
    fn name_regiment(&mut self, home: Option<TerritoryId>, category: UnitCategory) -> String {
        match home {
            Some(id) => self.namer.territory_name(id, self.adjective, category),
            None => self.namer.country_name(self.adjective, category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::driver::CostTable;
    use crate::map::{AdjacencyGraph, ProvinceGraph, ProvinceMapper, Territory};
    use crate::roster::source::SourceUnitGroup;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn territory(id: u32, owner: Option<&str>) -> Territory {
        Territory {
            id: TerritoryId(id),
            owner: owner.and_then(CountryTag::new),
            coastal: false,
            naval_base: 0,
            was_colony: false,
            was_infidel_conquest: false,
            cultures: vec![("north_german".to_string(), 1.0)],
            soldier_pops: vec![30_000],
        }
    }

    fn coastal(id: u32, owner: Option<&str>) -> Territory {
        Territory {
            coastal: true,
            ..territory(id, owner)
        }
    }

    struct Fixture {
        graph: ProvinceGraph,
        adjacency: AdjacencyGraph,
        mapper: ProvinceMapper,
        costs: CostTable,
    }

    impl Fixture {
        fn ctx(&self) -> ConversionContext<'_> {
            ConversionContext {
                graph: &self.graph,
                adjacency: &self.adjacency,
                mapper: &self.mapper,
                costs: &self.costs,
            }
        }
    }

    fn fixture(territories: Vec<Territory>, mapper: ProvinceMapper) -> Fixture {
        Fixture {
            graph: ProvinceGraph::new(territories, vec![]),
            adjacency: AdjacencyGraph::default(),
            mapper,
            costs: CostTable::uniform(1000.0),
        }
    }

    fn infantry_army(home: u32) -> SourceArmy {
        SourceArmy::new(
            "1st Army",
            SourceProvinceId(1),
            vec![SourceUnitGroup {
                category: UnitCategory::Infantry,
                strength: 3000.0,
                home: Some(SourceProvinceId(home)),
            }],
        )
    }

    #[test]
    fn no_source_home_is_do_not_retry() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![territory(1, Some("PRU"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = SourceArmy::new(
            "1st Army",
            SourceProvinceId(1),
            vec![SourceUnitGroup {
                category: UnitCategory::Infantry,
                strength: 3000.0,
                home: None,
            }],
        );
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng);
        assert_eq!(outcome, Placement::DoNotRetry);
    }

    #[test]
    fn unmapped_home_blocks_and_retries() {
        let fx = fixture(vec![territory(1, Some("PRU"))], ProvinceMapper::new());
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng);
        assert_eq!(outcome, Placement::Retry);
        assert!(blocked.contains(&SourceProvinceId(5)));

        // The blocked home can never be drawn again: the next attempt sees
        // an exhausted distribution.
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng);
        assert_eq!(outcome, Placement::DoNotRetry);
    }

    #[test]
    fn dropped_home_blocks_and_retries() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert_dropped(SourceProvinceId(5));
        let fx = fixture(vec![territory(1, Some("PRU"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng);
        assert_eq!(outcome, Placement::Retry);
        assert!(blocked.contains(&SourceProvinceId(5)));
    }

    #[test]
    fn land_regiment_homes_in_owned_territory() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![territory(1, Some("PRU"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "Prussian", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            Placement::Placed(regiment) => {
                assert_eq!(regiment.home, Some(TerritoryId(1)));
                assert_eq!(regiment.name, "1st Prussian Infantry");
            }
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn capacity_sort_prefers_roomier_candidate() {
        let mut rich = territory(2, Some("PRU"));
        rich.soldier_pops = vec![60_000];
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1), TerritoryId(2)]);
        let fx = fixture(vec![territory(1, Some("PRU")), rich], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(2))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn ownership_mismatch_walks_to_owned_neighbor() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let mut fx = fixture(
            vec![territory(1, Some("FRA")), territory(2, Some("PRU"))],
            mapper,
        );
        fx.adjacency = AdjacencyGraph::from_pairs(vec![
            (TerritoryId(1), TerritoryId(2)),
            (TerritoryId(2), TerritoryId(1)),
        ]);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(2))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn ownership_mismatch_without_reachable_territory_retries() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![territory(1, Some("FRA"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng);
        assert_eq!(outcome, Placement::Retry);
        assert!(blocked.contains(&SourceProvinceId(5)));
    }

    #[test]
    fn naval_home_must_be_port_eligible() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1), TerritoryId(2)]);
        let fx = fixture(
            vec![territory(1, Some("PRU")), coastal(2, Some("FRA"))],
            mapper,
        );
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = SourceArmy::new(
            "Home Fleet",
            SourceProvinceId(1),
            vec![SourceUnitGroup {
                category: UnitCategory::HeavyShip,
                strength: 2.0,
                home: Some(SourceProvinceId(5)),
            }],
        );
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::HeavyShip, &mut rng) {
            // Foreign ownership is fine for ships; only the port matters.
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(2))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn naval_home_with_no_port_retries() {
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![territory(1, Some("PRU"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = SourceArmy::new(
            "Home Fleet",
            SourceProvinceId(1),
            vec![SourceUnitGroup {
                category: UnitCategory::HeavyShip,
                strength: 2.0,
                home: Some(SourceProvinceId(5)),
            }],
        );
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::HeavyShip, &mut rng);
        assert_eq!(outcome, Placement::Retry);

        // With the only home blocked, the whole unit dissolves.
        let outcome = resolver.place(&army, &mut blocked, UnitCategory::HeavyShip, &mut rng);
        assert_eq!(outcome, Placement::DoNotRetry);
    }

    #[test]
    fn zero_capacity_home_uses_expeditionary_source() {
        let mut drained = territory(1, Some("PRU"));
        drained.soldier_pops = vec![];
        let heartland = territory(2, Some("PRU"));
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![drained, heartland], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(2))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn forced_placement_when_no_expeditionary_source() {
        let mut drained = territory(1, Some("PRU"));
        drained.soldier_pops = vec![];
        // The only other owned territory is a colony and cannot send
        // expeditionary soldiers.
        let mut colony = territory(2, Some("PRU"));
        colony.was_colony = true;
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![drained, colony], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(1))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn expeditionary_source_rejects_unfit_territories() {
        let mut drained = territory(1, Some("PRU"));
        drained.soldier_pops = vec![];
        let mut infidel = territory(2, Some("PRU"));
        infidel.was_infidel_conquest = true;
        let mut foreign_culture = territory(3, Some("PRU"));
        foreign_culture.cultures = vec![("polish".to_string(), 0.8)];
        let mut popless = territory(4, Some("PRU"));
        popless.soldier_pops = vec![];
        let mut mapper = ProvinceMapper::new();
        mapper.insert(SourceProvinceId(5), vec![TerritoryId(1)]);
        let fx = fixture(vec![drained, infidel, foreign_culture, popless], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = infantry_army(5);
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        match resolver.place(&army, &mut blocked, UnitCategory::Infantry, &mut rng) {
            // No candidate qualifies, so placement is forced on territory 1.
            Placement::Placed(regiment) => assert_eq!(regiment.home, Some(TerritoryId(1))),
            other => panic!("expected placement, got {:?}", other),
        }
    }

    #[test]
    fn place_until_resolved_walks_blocked_homes() {
        // Home 5 is dropped, home 6 maps to an owned territory; the retry
        // loop must land on 6.
        let mut mapper = ProvinceMapper::new();
        mapper.insert_dropped(SourceProvinceId(5));
        mapper.insert(SourceProvinceId(6), vec![TerritoryId(1)]);
        let fx = fixture(vec![territory(1, Some("PRU"))], mapper);
        let ctx = fx.ctx();
        let mut resolver =
            HomeResolver::new(&ctx, CountryTag::new("PRU").unwrap(), "", "north_german");

        let army = SourceArmy::new(
            "1st Army",
            SourceProvinceId(1),
            vec![
                SourceUnitGroup {
                    category: UnitCategory::Infantry,
                    strength: 3000.0,
                    home: Some(SourceProvinceId(5)),
                },
                SourceUnitGroup {
                    category: UnitCategory::Infantry,
                    strength: 3000.0,
                    home: Some(SourceProvinceId(6)),
                },
            ],
        );
        let mut blocked = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let regiment = resolver
            .place_until_resolved(&army, &mut blocked, UnitCategory::Infantry, &mut rng)
            .expect("placement should succeed via the second home");
        assert_eq!(regiment.home, Some(TerritoryId(1)));
    }
}
