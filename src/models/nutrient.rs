use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlendError;

/// Macronutrients tracked per ingredient, as mass percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    N,
    P,
    K,
    S,
    Ca,
}

impl Nutrient {
    /// Fixed iteration order used everywhere a per-nutrient loop runs.
    pub const ALL: [Nutrient; 5] = [
        Nutrient::N,
        Nutrient::P,
        Nutrient::K,
        Nutrient::S,
        Nutrient::Ca,
    ];

    /// Chemical symbol as shown to the user.
    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::N => "N",
            Nutrient::P => "P",
            Nutrient::K => "K",
            Nutrient::S => "S",
            Nutrient::Ca => "Ca",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Nutrient::N => "Nitrogen",
            Nutrient::P => "Phosphorus",
            Nutrient::K => "Potassium",
            Nutrient::S => "Sulfur",
            Nutrient::Ca => "Calcium",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Nutrient {
    type Err = BlendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Nutrient::ALL
            .into_iter()
            .find(|n| n.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| BlendError::InvalidInput(format!("Unknown nutrient: {}", trimmed)))
    }
}

/// A value per nutrient. Used for achieved compositions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub s: f64,
    pub ca: f64,
}

impl NutrientProfile {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::N => self.n,
            Nutrient::P => self.p,
            Nutrient::K => self.k,
            Nutrient::S => self.s,
            Nutrient::Ca => self.ca,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::N => self.n = value,
            Nutrient::P => self.p = value,
            Nutrient::K => self.k = value,
            Nutrient::S => self.s = value,
            Nutrient::Ca => self.ca = value,
        }
    }

    /// Apply `f` to every entry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = Self::default();
        for nutrient in Nutrient::ALL {
            out.set(nutrient, f(self.get(nutrient)));
        }
        out
    }
}
