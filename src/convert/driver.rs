//! Country-level conversion driver.
//!
//! Runs the two-pass algorithm for each country: a direct pass that turns
//! every source army's aggregate strengths into whole regiments (fractions
//! accumulating in the remainder pool), then a redistribution pass that
//! hands the pooled carry back to the armies with the greatest need.
//! Countries are independent and may be converted in parallel.

use std::collections::HashSet;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::map::{CountryTag, MapLookup, TerritoryId};
use crate::roster::category::{UnitCategory, ALL_CATEGORIES, CATEGORY_COUNT};
use crate::roster::dest::DestinationArmy;
use crate::roster::source::SourceArmy;

use super::pool::RemainderPool;
use super::resolver::{HomeResolver, Placement};
use super::ConversionContext;

/// Maximum placement attempts per category in the redistribution pass.
/// Guarantees termination even when no attempt makes progress.
pub const POOL_ATTEMPT_CEILING: usize = 100;

/// Cost in strength of one regiment, per category.
#[derive(Debug, Clone)]
pub struct CostTable {
    costs: [f64; CATEGORY_COUNT],
}

impl CostTable {
    /// Builds a table from per-category costs. Every cost must be positive.
    pub fn new(costs: [f64; CATEGORY_COUNT]) -> CostTable {
        debug_assert!(costs.iter().all(|c| *c > 0.0), "regiment costs must be positive");
        CostTable { costs }
    }

    /// A table charging the same cost for every category.
    pub fn uniform(cost: f64) -> CostTable {
        CostTable::new([cost; CATEGORY_COUNT])
    }

    pub fn cost(&self, category: UnitCategory) -> f64 {
        self.costs[category as usize]
    }
}

/// One country's input to the conversion.
#[derive(Debug, Clone)]
pub struct CountryInput {
    pub tag: CountryTag,
    /// National adjective for regiment names; may be empty.
    pub adjective: String,
    pub primary_culture: String,
    pub armies: Vec<SourceArmy>,
}

/// One country's converted forces, with diagnostics.
#[derive(Debug)]
pub struct CountryForces {
    pub tag: CountryTag,
    pub armies: Vec<DestinationArmy>,
    /// Whole units that dissolved into the pool instead of becoming
    /// regiments directly.
    pub dissolved_units: u32,
    /// Pool value abandoned when redistribution stopped, per category.
    pub unplaced_remainder: [f64; CATEGORY_COUNT],
}

/// A destination army under construction, tied back to its source.
struct ArmyBuild {
    source_idx: usize,
    blocked: HashSet<crate::map::SourceProvinceId>,
    dest: DestinationArmy,
}

/// Converts a single country's armies. Deterministic for a fixed rng and
/// input order.
pub fn convert_country(
    ctx: &ConversionContext,
    input: &CountryInput,
    rng: &mut impl Rng,
) -> CountryForces {
    let mut pool = RemainderPool::new();
    let mut resolver = HomeResolver::new(ctx, input.tag, &input.adjective, &input.primary_culture);
    let mut builds: Vec<ArmyBuild> = Vec::new();
    let mut dissolved_units: u32 = 0;

    // Direct pass: place whole regiments army by army, fractions to the
    // pool.
    for (source_idx, army) in input.armies.iter().enumerate() {
        let is_navy = army.is_navy();

        // Settle the deployment location first; an army that cannot be
        // placed is discarded whole, before any regiment exists.
        let candidates = match ctx.mapper.lookup(army.location()) {
            MapLookup::Unmapped => {
                debug!(
                    "army or navy {} assigned to unmapped province {}; dissolving to pool",
                    army.name(),
                    army.location()
                );
                dissolved_units += dissolve_army(ctx, army, &mut pool);
                continue;
            }
            MapLookup::Dropped => {
                debug!(
                    "army or navy {} assigned to dropped province {}; dissolving to pool",
                    army.name(),
                    army.location()
                );
                dissolved_units += dissolve_army(ctx, army, &mut pool);
                continue;
            }
            MapLookup::Mapped(candidates) => candidates,
        };

        let candidates: Vec<TerritoryId> = if is_navy {
            let ports = ctx.graph.port_filter(candidates);
            if ports.is_empty() {
                debug!(
                    "navy {} assigned to province {} with no corresponding port territories; dissolving to pool",
                    army.name(),
                    army.location()
                );
                dissolved_units += dissolve_army(ctx, army, &mut pool);
                continue;
            }
            ports
        } else {
            candidates.to_vec()
        };

        let location = candidates[rng.gen_range(0..candidates.len())];
        if is_navy {
            if let Some(territory) = ctx.graph.get(location) {
                if territory.naval_base == 0 {
                    warn!(
                        "assigning navy {} to port {} without a naval base",
                        army.name(),
                        location
                    );
                }
            }
        }

        let mut build = ArmyBuild {
            source_idx,
            blocked: HashSet::new(),
            dest: DestinationArmy::new(army.name(), is_navy, location),
        };

        for category in ALL_CATEGORIES {
            let strength = army.total_strength(category);
            if strength <= 0.0 {
                continue;
            }
            let count = strength / ctx.costs.cost(category);
            let whole = count.floor() as u32;
            let fraction = count - f64::from(whole);
            pool.add(category, fraction);
            build.dest.add_remainder(category, fraction);

            for _ in 0..whole {
                match resolver.place_until_resolved(army, &mut build.blocked, category, rng) {
                    Some(regiment) => build.dest.add_regiment(regiment),
                    None => {
                        // The whole unit converts back into carry, and the
                        // army can never take pooled regiments of this
                        // category either.
                        pool.add(category, 1.0);
                        build.dest.exclude_from_pool(category);
                        dissolved_units += 1;
                    }
                }
            }
        }

        builds.push(build);
    }

    // Redistribution pass: hand pooled carry back to the neediest armies,
    // rounding the last fraction up.
    for category in ALL_CATEGORIES {
        let mut attempts = 0;
        while pool.value(category) > 0.0 && attempts < POOL_ATTEMPT_CEILING {
            attempts += 1;
            let idx = match neediest_army(&builds, &input.armies, category) {
                Some(idx) => idx,
                None => {
                    debug!(
                        "no suitable army or navy found for {}'s pooled {}",
                        input.tag,
                        category.name()
                    );
                    break;
                }
            };
            let build = &mut builds[idx];
            let army = &input.armies[build.source_idx];
            match resolver.place(army, &mut build.blocked, category, rng) {
                Placement::Placed(regiment) => {
                    build.dest.add_regiment(regiment);
                    pool.consume_one(category);
                    build.dest.add_remainder(category, -1.0);
                }
                Placement::Retry => {}
                Placement::DoNotRetry => {
                    debug!(
                        "disqualifying army or navy {} from receiving more pooled {}",
                        build.dest.name,
                        category.name()
                    );
                    build.dest.exclude_from_pool(category);
                }
            }
        }
        if pool.value(category) > 0.0 {
            debug!(
                "abandoning {:.2} pooled {} for {}",
                pool.value(category),
                category.name(),
                input.tag
            );
        }
    }

    CountryForces {
        tag: input.tag,
        armies: builds.into_iter().map(|b| b.dest).collect(),
        dissolved_units,
        unplaced_remainder: pool.values(),
    }
}

/// Converts every country. Countries touch no shared mutable state, so
/// with `threads > 1` they are fanned out on a rayon pool; output order
/// matches input order either way. A `seed` of 0 draws from entropy,
/// otherwise each country gets a deterministic rng derived from its index.
pub fn convert_all(
    ctx: &ConversionContext,
    inputs: &[CountryInput],
    seed: u64,
    threads: usize,
) -> Vec<CountryForces> {
    if threads <= 1 {
        return inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let mut rng = country_rng(seed, i);
                convert_country(ctx, input, &mut rng)
            })
            .collect();
    }

    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("failed to build rayon thread pool");
    pool.install(|| {
        inputs
            .par_iter()
            .enumerate()
            .map(|(i, input)| {
                let mut rng = country_rng(seed, i);
                convert_country(ctx, input, &mut rng)
            })
            .collect()
    })
}

fn country_rng(seed: u64, index: usize) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed.wrapping_add(index as u64))
    }
}

/// Returns the army's total converted strength back to the pool. Used when
/// an army is discarded before conversion. Returns the number of whole
/// units dissolved.
fn dissolve_army(ctx: &ConversionContext, army: &SourceArmy, pool: &mut RemainderPool) -> u32 {
    let mut whole_units = 0;
    for category in ALL_CATEGORIES {
        let strength = army.total_strength(category);
        if strength <= 0.0 {
            continue;
        }
        let count = strength / ctx.costs.cost(category);
        pool.add(category, count);
        whole_units += count.floor() as u32;
    }
    whole_units
}

/// Finds the army most in need of a pooled regiment of this category: the
/// greatest per-army remainder among armies whose source roster carried
/// the category, first-found winning ties. Excluded armies sit far below
/// the baseline and never qualify.
fn neediest_army(
    builds: &[ArmyBuild],
    sources: &[SourceArmy],
    category: UnitCategory,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_remainder = -1000.0;
    for (i, build) in builds.iter().enumerate() {
        if sources[build.source_idx].total_strength(category) <= 0.0 {
            continue;
        }
        if build.dest.remainder(category) > best_remainder {
            best_remainder = build.dest.remainder(category);
            best = Some(i);
        }
    }
    best
}
