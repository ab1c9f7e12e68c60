use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{ItemCategory, WeightUnit};

/// Curated suggestion for stocking an emergency bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub category: ItemCategory,
    pub description: String,
    pub average_weight: f64,
    pub weight_unit: WeightUnit,
    pub is_essential: bool,
    pub popularity: u32,
}

/// Read-only recommendation catalog, ordered by popularity descending with
/// name as the tiebreak.
#[derive(Debug, Clone)]
pub struct RecommendationCatalog {
    entries: Vec<Recommendation>,
}

impl RecommendationCatalog {
    /// The built-in starter catalog.
    pub fn builtin() -> Self {
        Self::from_entries(builtin_recommendations())
    }

    fn from_entries(mut entries: Vec<Recommendation>) -> Self {
        entries.sort_by(|a, b| {
            b.popularity
                .cmp(&a.popularity)
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { entries }
    }

    /// Load a replacement catalog from CSV. Expected header columns are
    /// `Name`, `Category`, `Description`, `Average Weight`, `Weight Unit`,
    /// `Essential`, and `Popularity`. Unknown weight units fall back to grams
    /// and are counted in the returned import so callers can surface the
    /// substitution.
    pub fn from_reader<R: Read>(reader: R) -> Result<CatalogImport, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();
        let mut assumed_gram_units = 0;

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            // Header occupies the first line of the file.
            let row = index + 2;
            let parsed = record?;

            let name = parsed.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogImportError::EmptyName { row });
            }

            let category = ItemCategory::from_label(&parsed.category).ok_or_else(|| {
                CatalogImportError::UnknownCategory {
                    row,
                    value: parsed.category.clone(),
                }
            })?;

            if !parsed.average_weight.is_finite() || parsed.average_weight <= 0.0 {
                return Err(CatalogImportError::InvalidWeight {
                    row,
                    value: parsed.average_weight,
                });
            }

            let weight_unit = match parsed.weight_unit.as_deref() {
                None => WeightUnit::Grams,
                Some(raw) => {
                    let coerced = WeightUnit::coerce(raw);
                    if coerced.assumed_grams {
                        warn!(row, unit = raw, "unknown weight unit in catalog, assuming grams");
                        assumed_gram_units += 1;
                    }
                    coerced.unit
                }
            };

            entries.push(Recommendation {
                name,
                category,
                description: parsed.description.unwrap_or_default(),
                average_weight: parsed.average_weight,
                weight_unit,
                is_essential: parsed.essential.as_deref().is_some_and(parse_flag),
                popularity: parsed.popularity.unwrap_or(0),
            });
        }

        Ok(CatalogImport {
            catalog: Self::from_entries(entries),
            assumed_gram_units,
        })
    }

    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }

    pub fn by_category(&self, category: ItemCategory) -> Vec<&Recommendation> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .collect()
    }

    pub fn essentials(&self) -> Vec<&Recommendation> {
        self.entries
            .iter()
            .filter(|entry| entry.is_essential)
            .collect()
    }
}

/// Result of a CSV catalog load, with the grams substitution count exposed.
#[derive(Debug)]
pub struct CatalogImport {
    pub catalog: RecommendationCatalog,
    pub assumed_gram_units: usize,
}

/// Error enumeration for catalog CSV loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: item name is empty")]
    EmptyName { row: usize },
    #[error("row {row}: unknown category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: average weight must be a positive number (found {value})")]
    InvalidWeight { row: usize, value: f64 },
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Description", default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(rename = "Average Weight")]
    average_weight: f64,
    #[serde(rename = "Weight Unit", default, deserialize_with = "empty_string_as_none")]
    weight_unit: Option<String>,
    #[serde(rename = "Essential", default, deserialize_with = "empty_string_as_none")]
    essential: Option<String>,
    #[serde(rename = "Popularity", default)]
    popularity: Option<u32>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

fn builtin_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            name: "First Aid Kit".to_string(),
            category: ItemCategory::Medical,
            description: "Basic kit with bandages, antiseptic wipes, gauze, and medical tape."
                .to_string(),
            average_weight: 250.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 10,
        },
        Recommendation {
            name: "Water Bottle".to_string(),
            category: ItemCategory::Water,
            description: "Reusable water bottle, preferably with filter.".to_string(),
            average_weight: 500.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 10,
        },
        Recommendation {
            name: "Emergency Blanket".to_string(),
            category: ItemCategory::Other,
            description: "Compact thermal blanket for warmth in emergencies.".to_string(),
            average_weight: 60.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 9,
        },
        Recommendation {
            name: "Flashlight".to_string(),
            category: ItemCategory::Tools,
            description: "Compact, durable flashlight with extra batteries.".to_string(),
            average_weight: 150.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 9,
        },
        Recommendation {
            name: "Personal Medications".to_string(),
            category: ItemCategory::Medical,
            description: "Any prescription medications you regularly take.".to_string(),
            average_weight: 100.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 9,
        },
        Recommendation {
            name: "Multi-tool".to_string(),
            category: ItemCategory::Tools,
            description: "Compact tool with knife, pliers, screwdrivers, etc.".to_string(),
            average_weight: 250.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 8,
        },
        Recommendation {
            name: "Energy Bars".to_string(),
            category: ItemCategory::Food,
            description: "High-calorie, non-perishable food source.".to_string(),
            average_weight: 50.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 8,
        },
        Recommendation {
            name: "Matches/Lighter".to_string(),
            category: ItemCategory::Tools,
            description: "Waterproof matches or reliable lighter.".to_string(),
            average_weight: 20.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 8,
        },
        Recommendation {
            name: "Emergency Contact List".to_string(),
            category: ItemCategory::Documents,
            description: "List of important phone numbers and contacts.".to_string(),
            average_weight: 5.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 8,
        },
        Recommendation {
            name: "Cash".to_string(),
            category: ItemCategory::Other,
            description: "Small amount of cash in small denominations.".to_string(),
            average_weight: 20.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 8,
        },
        Recommendation {
            name: "Portable Phone Charger".to_string(),
            category: ItemCategory::Electronics,
            description: "Rechargeable battery pack for mobile devices.".to_string(),
            average_weight: 200.0,
            weight_unit: WeightUnit::Grams,
            is_essential: false,
            popularity: 7,
        },
        Recommendation {
            name: "Emergency Whistle".to_string(),
            category: ItemCategory::Tools,
            description: "Loud whistle for signaling during emergencies.".to_string(),
            average_weight: 10.0,
            weight_unit: WeightUnit::Grams,
            is_essential: true,
            popularity: 7,
        },
        Recommendation {
            name: "N95 Mask".to_string(),
            category: ItemCategory::Medical,
            description: "Protective mask for air quality emergencies.".to_string(),
            average_weight: 10.0,
            weight_unit: WeightUnit::Grams,
            is_essential: false,
            popularity: 7,
        },
        Recommendation {
            name: "Hand Sanitizer".to_string(),
            category: ItemCategory::Medical,
            description: "Small bottle of alcohol-based hand sanitizer.".to_string(),
            average_weight: 60.0,
            weight_unit: WeightUnit::Grams,
            is_essential: false,
            popularity: 6,
        },
        Recommendation {
            name: "Rain Poncho".to_string(),
            category: ItemCategory::Clothing,
            description: "Compact, disposable rain poncho for weather protection.".to_string(),
            average_weight: 90.0,
            weight_unit: WeightUnit::Grams,
            is_essential: false,
            popularity: 6,
        },
    ]
}
