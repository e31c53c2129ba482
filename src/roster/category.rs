//! Unit categories and their static metadata.
//!
//! The seven categories are a closed enumeration in canonical order; every
//! naval category sorts after every land category. Metadata (display noun,
//! naval flag) is stored in a compile-time lookup table indexed by the
//! `UnitCategory` enum discriminant.

/// The number of unit categories.
pub const CATEGORY_COUNT: usize = 7;

/// A category of military unit, land first, naval from `HeavyShip` on.
///
/// The `#[repr(u8)]` attribute enables use as an array index, and the
/// declaration order is the canonical iteration order of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum UnitCategory {
    Infantry = 0,
    Cavalry = 1,
    Artillery = 2,
    HeavyShip = 3,
    LightShip = 4,
    Transport = 5,
    Galley = 6,
}

/// All category variants in canonical order.
pub const ALL_CATEGORIES: [UnitCategory; CATEGORY_COUNT] = [
    UnitCategory::Infantry,
    UnitCategory::Cavalry,
    UnitCategory::Artillery,
    UnitCategory::HeavyShip,
    UnitCategory::LightShip,
    UnitCategory::Transport,
    UnitCategory::Galley,
];

/// Static metadata for a unit category.
pub struct CategoryInfo {
    pub name: &'static str,
    pub noun: &'static str,
    pub is_naval: bool,
}

/// Compile-time lookup table: index by `UnitCategory as usize`.
pub static CATEGORY_INFO: [CategoryInfo; CATEGORY_COUNT] = [
    // 0: Infantry
    CategoryInfo { name: "infantry", noun: "Infantry", is_naval: false },
    // 1: Cavalry
    CategoryInfo { name: "cavalry", noun: "Cavalry", is_naval: false },
    // 2: Artillery
    CategoryInfo { name: "artillery", noun: "Artillery", is_naval: false },
    // 3: HeavyShip
    CategoryInfo { name: "heavy_ship", noun: "Man'o'war", is_naval: true },
    // 4: LightShip
    CategoryInfo { name: "light_ship", noun: "Frigate", is_naval: true },
    // 5: Transport
    CategoryInfo { name: "transport", noun: "Clipper Transport", is_naval: true },
    // 6: Galley (names and counts as a light ship)
    CategoryInfo { name: "galley", noun: "Frigate", is_naval: true },
];

impl UnitCategory {
    /// Returns the lowercase identifier used in definitions and logs.
    pub const fn name(self) -> &'static str {
        CATEGORY_INFO[self as usize].name
    }

    /// Returns the display noun used in regiment names.
    pub const fn noun(self) -> &'static str {
        CATEGORY_INFO[self as usize].noun
    }

    /// Returns true for ship categories.
    pub const fn is_naval(self) -> bool {
        CATEGORY_INFO[self as usize].is_naval
    }

    /// Returns the category whose naming counter this category shares.
    /// Galleys convert into light ships and are counted with them; every
    /// other category counts as itself.
    pub const fn counter_alias(self) -> UnitCategory {
        match self {
            UnitCategory::Galley => UnitCategory::LightShip,
            other => other,
        }
    }

    /// Parses a category from its lowercase identifier.
    pub fn from_name(name: &str) -> Option<UnitCategory> {
        ALL_CATEGORIES.into_iter().find(|c| c.name() == name)
    }
}
