//! Conversion request loading.
//!
//! A conversion request is a single JSON document carrying everything one
//! run needs: the destination territory table, adjacency pairs, the port
//! blacklist, the source-to-destination province mapping, the per-category
//! regiment costs, and each country's armies. Loading validates the parts
//! the engine cannot tolerate being wrong and builds the typed structures
//! the driver consumes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::convert::{ConversionContext, CostTable, CountryInput};
use crate::map::{
    AdjacencyGraph, CountryTag, ProvinceGraph, ProvinceMapper, SourceProvinceId, Territory,
    TerritoryId,
};
use crate::roster::category::{UnitCategory, ALL_CATEGORIES, CATEGORY_COUNT};
use crate::roster::source::{SourceArmy, SourceUnitGroup};

/// Errors raised while reading or validating a conversion request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate territory id {0}")]
    DuplicateTerritory(u32),

    #[error("invalid country tag: '{0}'")]
    InvalidTag(String),

    #[error("unknown unit category: '{0}'")]
    UnknownCategory(String),

    #[error("missing cost for category '{0}'")]
    MissingCost(&'static str),

    #[error("cost for category '{0}' must be positive, got {1}")]
    NonPositiveCost(&'static str, f64),

    #[error("strength for {0} in army '{1}' must not be negative, got {2}")]
    NegativeStrength(String, String, f64),
}

/// A territory as it appears in the request document.
#[derive(Debug, Deserialize)]
pub struct TerritoryDef {
    pub id: u32,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub coastal: bool,
    #[serde(default)]
    pub naval_base: u8,
    #[serde(default)]
    pub was_colony: bool,
    #[serde(default)]
    pub was_infidel_conquest: bool,
    #[serde(default)]
    pub cultures: Vec<(String, f64)>,
    #[serde(default)]
    pub soldier_pops: Vec<u32>,
}

/// One source-province mapping entry. `dropped` marks provinces that were
/// deliberately left out of the destination map; an empty target list means
/// the same thing.
#[derive(Debug, Deserialize)]
pub struct MappingDef {
    pub source: u32,
    #[serde(default)]
    pub dropped: bool,
    #[serde(default)]
    pub targets: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UnitGroupDef {
    pub category: String,
    pub strength: f64,
    #[serde(default)]
    pub home: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ArmyDef {
    pub name: String,
    pub location: u32,
    pub units: Vec<UnitGroupDef>,
}

#[derive(Debug, Deserialize)]
pub struct CountryDef {
    pub tag: String,
    #[serde(default)]
    pub adjective: String,
    #[serde(default)]
    pub primary_culture: String,
    pub armies: Vec<ArmyDef>,
}

/// The full request document.
#[derive(Debug, Deserialize)]
pub struct ConversionRequest {
    pub territories: Vec<TerritoryDef>,
    #[serde(default)]
    pub adjacencies: Vec<(u32, u32)>,
    #[serde(default)]
    pub port_blacklist: Vec<u32>,
    #[serde(default)]
    pub mappings: Vec<MappingDef>,
    pub costs: HashMap<String, f64>,
    pub countries: Vec<CountryDef>,
}

/// A request after validation, ready to convert.
#[derive(Debug)]
pub struct LoadedRequest {
    pub graph: ProvinceGraph,
    pub adjacency: AdjacencyGraph,
    pub mapper: ProvinceMapper,
    pub costs: CostTable,
    pub countries: Vec<CountryInput>,
}

impl LoadedRequest {
    /// Borrows the read-only conversion inputs as a context.
    pub fn context(&self) -> ConversionContext<'_> {
        ConversionContext {
            graph: &self.graph,
            adjacency: &self.adjacency,
            mapper: &self.mapper,
            costs: &self.costs,
        }
    }
}

impl ConversionRequest {
    /// Reads and parses a request from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<ConversionRequest, RequestError> {
        let text = fs::read_to_string(path)?;
        ConversionRequest::from_json(&text)
    }

    /// Parses a request from a JSON string.
    pub fn from_json(text: &str) -> Result<ConversionRequest, RequestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validates the request and builds the typed conversion inputs.
    pub fn build(self) -> Result<LoadedRequest, RequestError> {
        let mut seen = std::collections::HashSet::new();
        let mut territories = Vec::with_capacity(self.territories.len());
        for def in self.territories {
            if !seen.insert(def.id) {
                return Err(RequestError::DuplicateTerritory(def.id));
            }
            let owner = match def.owner {
                Some(tag) => {
                    Some(CountryTag::new(&tag).ok_or(RequestError::InvalidTag(tag))?)
                }
                None => None,
            };
            territories.push(Territory {
                id: TerritoryId(def.id),
                owner,
                coastal: def.coastal,
                naval_base: def.naval_base,
                was_colony: def.was_colony,
                was_infidel_conquest: def.was_infidel_conquest,
                cultures: def.cultures,
                soldier_pops: def.soldier_pops,
            });
        }
        let graph = ProvinceGraph::new(
            territories,
            self.port_blacklist.into_iter().map(TerritoryId).collect(),
        );

        let adjacency = AdjacencyGraph::from_pairs(
            self.adjacencies
                .into_iter()
                .map(|(from, to)| (TerritoryId(from), TerritoryId(to))),
        );

        let mut mapper = ProvinceMapper::new();
        for def in self.mappings {
            let source = SourceProvinceId(def.source);
            if def.dropped || def.targets.is_empty() {
                mapper.insert_dropped(source);
            } else {
                mapper.insert(source, def.targets.into_iter().map(TerritoryId).collect());
            }
        }

        let costs = build_cost_table(&self.costs)?;

        let mut countries = Vec::with_capacity(self.countries.len());
        for def in self.countries {
            let tag = CountryTag::new(&def.tag).ok_or(RequestError::InvalidTag(def.tag))?;
            let mut armies = Vec::with_capacity(def.armies.len());
            for army in def.armies {
                let mut groups = Vec::with_capacity(army.units.len());
                for unit in army.units {
                    let category = UnitCategory::from_name(&unit.category)
                        .ok_or_else(|| RequestError::UnknownCategory(unit.category.clone()))?;
                    if unit.strength < 0.0 {
                        return Err(RequestError::NegativeStrength(
                            unit.category,
                            army.name.clone(),
                            unit.strength,
                        ));
                    }
                    groups.push(SourceUnitGroup {
                        category,
                        strength: unit.strength,
                        home: unit.home.map(SourceProvinceId),
                    });
                }
                armies.push(SourceArmy::new(
                    army.name,
                    SourceProvinceId(army.location),
                    groups,
                ));
            }
            countries.push(CountryInput {
                tag,
                adjective: def.adjective,
                primary_culture: def.primary_culture,
                armies,
            });
        }

        Ok(LoadedRequest {
            graph,
            adjacency,
            mapper,
            costs,
            countries,
        })
    }
}

/// Turns the name-keyed cost map into a dense table, demanding a positive
/// cost for every category.
fn build_cost_table(costs: &HashMap<String, f64>) -> Result<CostTable, RequestError> {
    for name in costs.keys() {
        if UnitCategory::from_name(name).is_none() {
            return Err(RequestError::UnknownCategory(name.clone()));
        }
    }
    let mut table = [0.0; CATEGORY_COUNT];
    for category in ALL_CATEGORIES {
        let cost = *costs
            .get(category.name())
            .ok_or(RequestError::MissingCost(category.name()))?;
        if cost <= 0.0 {
            return Err(RequestError::NonPositiveCost(category.name(), cost));
        }
        table[category as usize] = cost;
    }
    Ok(CostTable::new(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_request() -> String {
        r#"{
            "territories": [
                {"id": 1, "owner": "PRU", "soldier_pops": [30000],
                 "cultures": [["north_german", 1.0]]},
                {"id": 2, "owner": "PRU", "coastal": true, "naval_base": 1}
            ],
            "adjacencies": [[1, 2], [2, 1]],
            "port_blacklist": [],
            "mappings": [
                {"source": 10, "targets": [1]},
                {"source": 11, "targets": [2]},
                {"source": 12, "dropped": true}
            ],
            "costs": {"infantry": 1000, "cavalry": 1000, "artillery": 1000, "heavy_ship": 1000, "light_ship": 1000, "transport": 1000, "galley": 1000},
            "countries": [
                {"tag": "PRU", "adjective": "Prussian",
                 "primary_culture": "north_german",
                 "armies": [
                    {"name": "1st Army", "location": 10,
                     "units": [{"category": "infantry", "strength": 3000,
                                "home": 10}]}
                 ]}
            ]
        }"#
        .to_string()
    }

    #[test]
    fn minimal_request_builds() {
        let loaded = ConversionRequest::from_json(&minimal_request())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(loaded.graph.len(), 2);
        assert_eq!(loaded.countries.len(), 1);
        assert_eq!(loaded.countries[0].armies.len(), 1);
        assert!(loaded.graph.port_eligible(TerritoryId(2)));
        assert_eq!(
            loaded.costs.cost(UnitCategory::Infantry),
            1000.0
        );
    }

    #[test]
    fn dropped_mapping_round_trips() {
        let loaded = ConversionRequest::from_json(&minimal_request())
            .unwrap()
            .build()
            .unwrap();
        use crate::map::MapLookup;
        assert_eq!(
            loaded.mapper.lookup(SourceProvinceId(12)),
            MapLookup::Dropped
        );
        assert_eq!(
            loaded.mapper.lookup(SourceProvinceId(99)),
            MapLookup::Unmapped
        );
    }

    #[test]
    fn duplicate_territory_rejected() {
        let text = minimal_request().replace("\"id\": 2", "\"id\": 1");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::DuplicateTerritory(1))));
    }

    #[test]
    fn bad_tag_rejected() {
        let text = minimal_request().replace("\"tag\": \"PRU\"", "\"tag\": \"PRUSSIA\"");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::InvalidTag(_))));
    }

    #[test]
    fn unknown_category_rejected() {
        let text = minimal_request().replace("\"category\": \"infantry\"", "\"category\": \"zeppelin\"");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::UnknownCategory(_))));
    }

    #[test]
    fn stray_cost_key_rejected() {
        let text = minimal_request().replace("\"galley\": 1000", "\"zeppelin\": 1000");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::UnknownCategory(_))));
    }

    #[test]
    fn missing_cost_rejected() {
        let text = minimal_request().replace(", \"galley\": 1000", "");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::MissingCost("galley"))));
    }

    #[test]
    fn non_positive_cost_rejected() {
        let text = minimal_request().replace("\"infantry\": 1000", "\"infantry\": 0");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(
            err,
            Err(RequestError::NonPositiveCost("infantry", _))
        ));
    }

    #[test]
    fn negative_strength_rejected() {
        let text = minimal_request().replace("\"strength\": 3000", "\"strength\": -1");
        let err = ConversionRequest::from_json(&text).unwrap().build();
        assert!(matches!(err, Err(RequestError::NegativeStrength(_, _, _))));
    }
}
