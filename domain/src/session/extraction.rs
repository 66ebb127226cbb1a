//! Entity extraction from user queries
//!
//! Pure text pattern matching — no I/O, no session state. The
//! [`EntityExtractor`] trait keeps the strategy pluggable so a model-based
//! extractor can replace the regex one without touching the orchestrator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of domain entities we track in the user profile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    LandSize,
    Cost,
    Production,
    Percentage,
    Crop,
    Location,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::LandSize => "land_size",
            EntityKind::Cost => "cost",
            EntityKind::Production => "production",
            EntityKind::Percentage => "percentage",
            EntityKind::Crop => "crop",
            EntityKind::Location => "location",
        };
        write!(f, "{}", s)
    }
}

/// Entities extracted from a single query, grouped by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedEntities(pub BTreeMap<EntityKind, Vec<String>>);

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, kind: EntityKind) -> &[String] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, kind: EntityKind, value: impl Into<String>) {
        self.0.entry(kind).or_default().push(value.into());
    }

    /// True when any quantitative entity (a value with a unit, a currency
    /// amount, or a percentage) was found — the shape of data specialists
    /// typically ask for.
    pub fn has_quantities(&self) -> bool {
        [
            EntityKind::LandSize,
            EntityKind::Cost,
            EntityKind::Production,
            EntityKind::Percentage,
        ]
        .iter()
        .any(|k| !self.get(*k).is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKind, &Vec<String>)> {
        self.0.iter()
    }
}

/// Strategy for extracting domain entities from free text
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, query: &str) -> ExtractedEntities;
}

/// Regex-based extractor for the quantities and tokens the advisers care
/// about: land sizes, currency/cost amounts, production quantities,
/// percentages, and known crop/location names.
pub struct RegexEntityExtractor {
    land_size: Regex,
    production: Regex,
    percentage: Regex,
    currency: Regex,
    bare_amount: Regex,
    crops: Vec<&'static str>,
    locations: Vec<&'static str>,
}

/// Words that mark a bare number as a money amount rather than noise
const COST_CONTEXT: &[&str] = &["spend", "cost", "expense", "price", "paid", "pay", "invest"];

impl RegexEntityExtractor {
    pub fn new() -> Self {
        // These patterns are compile-time constants; construction cannot fail.
        Self {
            land_size: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(acres?|hectares?)").unwrap(),
            production: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(quintals?|kgs?|tons?|tonnes?)")
                .unwrap(),
            percentage: Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap(),
            currency: Regex::new(r"(?i)(?:₹\s*(\d[\d,]*(?:\.\d+)?))|(?:(\d[\d,]*(?:\.\d+)?)\s*(?:rupees?|rs\b))").unwrap(),
            bare_amount: Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap(),
            crops: vec![
                "wheat", "rice", "paddy", "cotton", "sugarcane", "maize", "barley", "pulses",
                "tomato", "onion", "potato",
            ],
            locations: vec![
                "karnataka",
                "punjab",
                "haryana",
                "gujarat",
                "maharashtra",
                "uttar pradesh",
                "rajasthan",
                "tamil nadu",
                "bihar",
            ],
        }
    }
}

impl Default for RegexEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for RegexEntityExtractor {
    fn extract(&self, query: &str) -> ExtractedEntities {
        let lower = query.to_lowercase();
        let mut entities = ExtractedEntities::default();

        for cap in self.land_size.captures_iter(&lower) {
            entities.insert(EntityKind::LandSize, format!("{} {}", &cap[1], &cap[2]));
        }
        for cap in self.production.captures_iter(&lower) {
            entities.insert(EntityKind::Production, format!("{} {}", &cap[1], &cap[2]));
        }
        for cap in self.percentage.captures_iter(&lower) {
            entities.insert(EntityKind::Percentage, cap[1].to_string());
        }
        for cap in self.currency.captures_iter(&lower) {
            let amount = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str());
            if let Some(amount) = amount {
                entities.insert(EntityKind::Cost, amount.replace(',', ""));
            }
        }
        // Bare numbers become cost amounts only under a spend/cost context,
        // otherwise "5 acres" would also register as money.
        if entities.get(EntityKind::Cost).is_empty()
            && COST_CONTEXT.iter().any(|w| lower.contains(w))
        {
            for m in self.bare_amount.find_iter(&lower) {
                let covered = self.land_size.is_match(&lower)
                    && entities
                        .get(EntityKind::LandSize)
                        .iter()
                        .any(|v| v.starts_with(m.as_str()));
                if !covered {
                    entities.insert(EntityKind::Cost, m.as_str().replace(',', ""));
                }
            }
        }

        for crop in &self.crops {
            if lower.contains(crop) {
                entities.insert(EntityKind::Crop, *crop);
            }
        }
        for location in &self.locations {
            if lower.contains(location) {
                entities.insert(EntityKind::Location, *location);
            }
        }

        entities
    }
}
