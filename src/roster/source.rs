//! Source-side army representation.
//!
//! A source army is an ordered list of unit groups, each carrying an
//! aggregate strength for one category and the source province the group
//! was recruited from. Home draws are weighted by strength so that larger
//! groups anchor more of the converted army's regiments.

use std::collections::HashSet;

use rand::Rng;

use crate::map::SourceProvinceId;

use super::category::UnitCategory;

/// One aggregated block of strength within a source army.
#[derive(Debug, Clone)]
pub struct SourceUnitGroup {
    pub category: UnitCategory,
    /// Total strength, non-negative.
    pub strength: f64,
    /// Recruitment province, if the source data recorded one.
    pub home: Option<SourceProvinceId>,
}

/// An army (or navy) as read from the source save.
#[derive(Debug, Clone)]
pub struct SourceArmy {
    name: String,
    location: SourceProvinceId,
    groups: Vec<SourceUnitGroup>,
}

impl SourceArmy {
    pub fn new(
        name: impl Into<String>,
        location: SourceProvinceId,
        groups: Vec<SourceUnitGroup>,
    ) -> SourceArmy {
        SourceArmy {
            name: name.into(),
            location,
            groups,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> SourceProvinceId {
        self.location
    }

    pub fn groups(&self) -> &[SourceUnitGroup] {
        &self.groups
    }

    /// Returns true if any naval category is present with positive strength.
    pub fn is_navy(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.category.is_naval() && g.strength > 0.0)
    }

    /// Total strength recorded for a category across all groups.
    pub fn total_strength(&self, category: UnitCategory) -> f64 {
        self.groups
            .iter()
            .filter(|g| g.category == category)
            .map(|g| g.strength)
            .sum()
    }

    /// Draws a home province for the category, weighted by group strength.
    ///
    /// Groups without a recorded home, with zero strength, or whose home is
    /// in `blocked` never win the draw. Returns None when no group remains.
    pub fn draw_home(
        &self,
        category: UnitCategory,
        blocked: &HashSet<SourceProvinceId>,
        rng: &mut impl Rng,
    ) -> Option<SourceProvinceId> {
        let candidates: Vec<(SourceProvinceId, f64)> = self
            .groups
            .iter()
            .filter(|g| g.category == category && g.strength > 0.0)
            .filter_map(|g| g.home.map(|home| (home, g.strength)))
            .filter(|(home, _)| !blocked.contains(home))
            .collect();

        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return None;
        }

        let mut roll = rng.gen_range(0.0..total);
        for (home, weight) in &candidates {
            if roll < *weight {
                return Some(*home);
            }
            roll -= weight;
        }
        // Floating-point slack: fall back to the last candidate.
        candidates.last().map(|(home, _)| *home)
    }
}
