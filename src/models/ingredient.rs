use serde::{Deserialize, Serialize};

use crate::models::Nutrient;
use crate::solver::MASS_UNITS_PER_COST_UNIT;

/// A raw blending ingredient with its nutrient fractions and price.
///
/// Nutrient values are mass percentages in [0, 100]. Cost is per ton
/// (1000 kg), so per-kg cost is `cost_per_ton / 1000`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub id: u32,

    pub code: String,

    pub name: String,

    #[serde(default)]
    pub n: f64,

    #[serde(default)]
    pub p: f64,

    #[serde(default)]
    pub k: f64,

    #[serde(default)]
    pub s: f64,

    #[serde(default)]
    pub ca: f64,

    #[serde(default)]
    pub cost_per_ton: f64,

    #[serde(default = "default_available")]
    pub available: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_available() -> bool {
    true
}

impl Ingredient {
    /// Convenience constructor used by tests and CSV import.
    pub fn new(code: &str, name: &str, fractions: [f64; 5], cost_per_ton: f64) -> Self {
        let [n, p, k, s, ca] = fractions;
        Self {
            id: 0,
            code: code.to_string(),
            name: name.to_string(),
            n,
            p,
            k,
            s,
            ca,
            cost_per_ton,
            available: true,
            category: None,
            description: None,
        }
    }

    /// Percentage of `nutrient` in this ingredient.
    #[inline]
    pub fn fraction(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::N => self.n,
            Nutrient::P => self.p,
            Nutrient::K => self.k,
            Nutrient::S => self.s,
            Nutrient::Ca => self.ca,
        }
    }

    /// Cost of one kg.
    #[inline]
    pub fn cost_per_kg(&self) -> f64 {
        self.cost_per_ton / MASS_UNITS_PER_COST_UNIT
    }

    /// Fractions within [0, 100], their sum at most 100, and a non-negative cost.
    pub fn is_valid(&self) -> bool {
        let fractions_ok = Nutrient::ALL
            .into_iter()
            .all(|n| (0.0..=100.0).contains(&self.fraction(n)));
        let total: f64 = Nutrient::ALL.into_iter().map(|n| self.fraction(n)).sum();
        fractions_ok && total <= 100.0 && self.cost_per_ton >= 0.0 && !self.code.trim().is_empty()
    }

    /// Canonical key for lookups (lowercase code).
    pub fn key(&self) -> String {
        self.code.to_lowercase()
    }

    /// Short "N-P-K-S-Ca" grade label, e.g. `46-0-0-0-0`.
    pub fn grade(&self) -> String {
        Nutrient::ALL
            .into_iter()
            .map(|n| format!("{}", self.fraction(n)))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ingredient {}
