use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlendError;
use crate::models::Nutrient;

/// Desired percentage per nutrient. `None` or zero means "not targeted".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetComposition {
    #[serde(default)]
    pub n: Option<f64>,
    #[serde(default)]
    pub p: Option<f64>,
    #[serde(default)]
    pub k: Option<f64>,
    #[serde(default)]
    pub s: Option<f64>,
    #[serde(default)]
    pub ca: Option<f64>,
}

impl TargetComposition {
    /// Build a target from (nutrient, percentage) pairs.
    pub fn from_pairs(pairs: &[(Nutrient, f64)]) -> Self {
        let mut target = Self::default();
        for &(nutrient, value) in pairs {
            target.set(nutrient, Some(value));
        }
        target
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::N => self.n,
            Nutrient::P => self.p,
            Nutrient::K => self.k,
            Nutrient::S => self.s,
            Nutrient::Ca => self.ca,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        match nutrient {
            Nutrient::N => self.n = value,
            Nutrient::P => self.p = value,
            Nutrient::K => self.k = value,
            Nutrient::S => self.s = value,
            Nutrient::Ca => self.ca = value,
        }
    }

    /// Targeted nutrients (value > 0) in N, P, K, S, Ca order.
    pub fn targeted(&self) -> Vec<(Nutrient, f64)> {
        Nutrient::ALL
            .into_iter()
            .filter_map(|n| match self.get(n) {
                Some(v) if v > 0.0 => Some((n, v)),
                _ => None,
            })
            .collect()
    }

    /// At least one nutrient targeted with a value > 0.
    pub fn is_valid(&self) -> bool {
        !self.targeted().is_empty()
    }

    /// Compact label such as `N 10 / K 30`.
    pub fn label(&self) -> String {
        let parts: Vec<String> = self
            .targeted()
            .iter()
            .map(|(n, v)| format!("{} {}", n, v))
            .collect();
        if parts.is_empty() {
            "(none)".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

/// Parses `N=10,K=30` (also accepts `:` as separator).
impl FromStr for TargetComposition {
    type Err = BlendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut target = Self::default();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part
                .split_once('=')
                .or_else(|| part.split_once(':'))
                .ok_or_else(|| {
                    BlendError::InvalidInput(format!("Expected NUTRIENT=VALUE, got '{}'", part))
                })?;

            let nutrient: Nutrient = name.parse()?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| {
                    BlendError::InvalidInput(format!(
                        "Invalid percentage for {}: '{}'",
                        nutrient,
                        value.trim()
                    ))
                })?;

            if !(0.0..=100.0).contains(&value) {
                return Err(BlendError::InvalidInput(format!(
                    "Percentage for {} must be between 0 and 100",
                    nutrient
                )));
            }

            target.set(nutrient, Some(value));
        }

        Ok(target)
    }
}
