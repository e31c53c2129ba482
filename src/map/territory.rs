//! Territory definitions and per-territory capability data.
//!
//! A territory is one province of the destination map: who owns it, whether
//! it touches the sea, its naval-base level, and the population data used to
//! judge how many regiments it can support.

use std::fmt;

/// Number of soldiers one regiment draws from a soldier population.
pub const POP_SIZE_PER_REGIMENT: u32 = 3000;

/// Identifier of a destination-map territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerritoryId(pub u32);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a source-map province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceProvinceId(pub u32);

impl fmt::Display for SourceProvinceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A three-letter country tag, e.g. "PRU".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryTag([u8; 3]);

impl CountryTag {
    /// Parses a tag from a string of exactly three ASCII letters or digits.
    pub fn new(tag: &str) -> Option<CountryTag> {
        let bytes = tag.as_bytes();
        if bytes.len() != 3 {
            return None;
        }
        if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        Some(CountryTag([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for CountryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CountryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryTag({})", self.as_str())
    }
}

/// Static data for one destination territory.
///
/// Territories are loaded once per run and never mutated during allocation;
/// all bookkeeping against them lives elsewhere.
#[derive(Debug, Clone)]
pub struct Territory {
    pub id: TerritoryId,
    /// Owning country, or None for unowned land.
    pub owner: Option<CountryTag>,
    pub coastal: bool,
    /// Naval-base level; 0 means no base.
    pub naval_base: u8,
    pub was_colony: bool,
    pub was_infidel_conquest: bool,
    /// Population share per culture, each in 0.0..=1.0.
    pub cultures: Vec<(String, f64)>,
    /// Sizes of the soldier populations present in this territory.
    pub soldier_pops: Vec<u32>,
}

impl Territory {
    /// Total number of regiments this territory's soldier pops can support.
    pub fn regiment_capacity(&self) -> i32 {
        self.soldier_pops
            .iter()
            .map(|size| (size / POP_SIZE_PER_REGIMENT) as i32)
            .sum()
    }

    /// Returns true if any soldier population exists, regardless of size.
    pub fn has_soldier_pops(&self) -> bool {
        !self.soldier_pops.is_empty()
    }

    /// Population share of the given culture, 0.0 if absent.
    pub fn culture_share(&self, culture: &str) -> f64 {
        self.cultures
            .iter()
            .find(|(name, _)| name == culture)
            .map(|(_, share)| *share)
            .unwrap_or(0.0)
    }

    /// Returns true if the given culture holds at least `min_share` of the
    /// territory's population.
    pub fn has_culture(&self, culture: &str, min_share: f64) -> bool {
        self.culture_share(culture) >= min_share
    }
}
