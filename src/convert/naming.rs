//! Regiment naming.
//!
//! Every regiment gets an ordinal-qualified name, numbered either from its
//! home territory's own counter or, when no home was resolved, from the
//! country-wide counter. Galleys share the light-ship counter and noun.

use std::collections::HashMap;

use crate::map::TerritoryId;
use crate::roster::category::{UnitCategory, CATEGORY_COUNT};

/// Returns the English ordinal suffix for a cardinal: 1st, 2nd, 3rd, 4th,
/// with 11th through 13th as the usual exceptions.
pub fn ordinal_suffix(n: u32) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Sequential naming counters for one country's conversion.
#[derive(Debug, Default)]
pub struct RegimentNamer {
    country: [u32; CATEGORY_COUNT],
    territory: HashMap<TerritoryId, [u32; CATEGORY_COUNT]>,
}

impl RegimentNamer {
    pub fn new() -> RegimentNamer {
        RegimentNamer::default()
    }

    /// Names a regiment from its home territory's counter.
    pub fn territory_name(
        &mut self,
        home: TerritoryId,
        adjective: &str,
        category: UnitCategory,
    ) -> String {
        let rc = category.counter_alias();
        let counters = self.territory.entry(home).or_insert([0; CATEGORY_COUNT]);
        counters[rc as usize] += 1;
        compose(counters[rc as usize], adjective, rc)
    }

    /// Names a regiment from the country-wide counter.
    pub fn country_name(&mut self, adjective: &str, category: UnitCategory) -> String {
        let rc = category.counter_alias();
        self.country[rc as usize] += 1;
        compose(self.country[rc as usize], adjective, rc)
    }
}

/// Formats "<n><suffix> <adjective> <noun>", dropping the adjective when
/// the country has none.
fn compose(n: u32, adjective: &str, category: UnitCategory) -> String {
    if adjective.is_empty() {
        format!("{}{} {}", n, ordinal_suffix(n), category.noun())
    } else {
        format!("{}{} {} {}", n, ordinal_suffix(n), adjective, category.noun())
    }
}
