//! Species catalog
//!
//! Immutable table of creature templates, loaded once at startup and
//! shared read-only between every task.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{PokecatError, Result};

/// Base stat block of a species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub sp_atk: u32,
    pub sp_def: u32,
}

/// Immutable creature template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    /// Elemental type tags, e.g. `["grass", "poison"]`
    pub types: Vec<String>,
    /// Catalog number
    #[serde(deserialize_with = "number_or_string")]
    pub number: u32,
    pub stats: BaseStats,
    /// Base experience yield
    #[serde(rename = "exp", deserialize_with = "number_or_string")]
    pub base_exp: u32,
}

/// Catalog numbers and exp yields show up both as JSON numbers and as
/// zero-padded strings; an empty string means 0.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse().map_err(serde::de::Error::custom)
        }
    }
}

/// Read-only species table
///
/// Cloning is cheap; all clones share the same storage.
#[derive(Debug, Clone)]
pub struct Catalog {
    species: Arc<[Species]>,
    by_number: Arc<AHashMap<u32, usize>>,
}

impl Catalog {
    /// Build a catalog; fails when `species` is empty or a record is unusable
    pub fn new(species: Vec<Species>) -> Result<Self> {
        if species.is_empty() {
            return Err(PokecatError::EmptyCatalog);
        }

        let mut by_number = AHashMap::with_capacity(species.len());
        for (index, s) in species.iter().enumerate() {
            if s.name.trim().is_empty() {
                return Err(PokecatError::InvalidSpecies {
                    index,
                    reason: "missing name".into(),
                });
            }
            // First record wins on duplicate numbers
            by_number.entry(s.number).or_insert(index);
        }

        Ok(Self {
            species: species.into(),
            by_number: Arc::new(by_number),
        })
    }

    /// Load the catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Parse the catalog from a JSON array of species records
    pub fn parse_json(content: &str) -> Result<Self> {
        let species: Vec<Species> = serde_json::from_str(content)?;
        Self::new(species)
    }

    /// Look a species up by catalog number
    pub fn get(&self, number: u32) -> Option<&Species> {
        self.by_number.get(&number).map(|&i| &self.species[i])
    }

    /// Full species list, in file order
    pub fn all(&self) -> &[Species] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn species(name: &str, number: u32) -> Species {
        Species {
            name: name.into(),
            types: vec!["normal".into()],
            number,
            stats: BaseStats {
                hp: 40,
                attack: 45,
                defense: 40,
                speed: 56,
                sp_atk: 35,
                sp_def: 35,
            },
            base_exp: 50,
        }
    }

    pub(crate) fn catalog_of(names: &[&str]) -> Catalog {
        let species = names
            .iter()
            .enumerate()
            .map(|(i, n)| species(n, i as u32 + 1))
            .collect();
        Catalog::new(species).unwrap()
    }

    const SCRAPED: &str = r#"[
        {
            "name": "Bulbasaur",
            "types": ["grass", "poison"],
            "number": "001",
            "stats": {"hp": 45, "attack": 49, "defense": 49, "speed": 45, "sp_atk": 65, "sp_def": 65},
            "exp": "64"
        },
        {
            "name": "Charmander",
            "types": ["fire"],
            "number": 4,
            "stats": {"hp": 39, "attack": 52, "defense": 43, "speed": 65, "sp_atk": 60, "sp_def": 50},
            "exp": ""
        }
    ]"#;

    #[test]
    fn test_parse_scraped_records() {
        let catalog = Catalog::parse_json(SCRAPED).unwrap();
        assert_eq!(catalog.len(), 2);

        let bulbasaur = catalog.get(1).unwrap();
        assert_eq!(bulbasaur.name, "Bulbasaur");
        assert_eq!(bulbasaur.types, vec!["grass", "poison"]);
        assert_eq!(bulbasaur.base_exp, 64);
        assert_eq!(bulbasaur.stats.sp_atk, 65);

        let charmander = catalog.get(4).unwrap();
        assert_eq!(charmander.base_exp, 0);
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        assert!(matches!(
            Catalog::parse_json("[]"),
            Err(PokecatError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Catalog::parse_json("{\"name\": 1}"),
            Err(PokecatError::SerdeError(_))
        ));
    }

    #[test]
    fn test_nameless_species_rejected() {
        let result = Catalog::new(vec![species("Pidgey", 16), species("  ", 17)]);
        assert!(matches!(
            result,
            Err(PokecatError::InvalidSpecies { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Catalog::load(Path::new("/nonexistent/pokedex.json"));
        assert!(matches!(result, Err(PokecatError::IoError(_))));
    }

    #[test]
    fn test_clones_share_storage() {
        let a = catalog_of(&["Rattata", "Spearow"]);
        let b = a.clone();
        assert!(std::ptr::eq(a.all().as_ptr(), b.all().as_ptr()));
    }
}
