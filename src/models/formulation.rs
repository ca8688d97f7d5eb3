use serde::{Deserialize, Serialize};

use crate::error::{BlendError, Result};
use crate::models::{BlendResult, TargetComposition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormulationStatus {
    #[default]
    Active,
    Archived,
}

/// A saved blend: header record plus ordered line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formulation {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub target: TargetComposition,
    #[serde(default)]
    pub status: FormulationStatus,
    pub total_cost: f64,
    pub total_mass: f64,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    pub items: Vec<FormulationItem>,
}

/// One ingredient of a saved formulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulationItem {
    pub ingredient_id: u32,
    pub ingredient_code: String,
    pub mass: f64,
    pub percentage: f64,
    /// Ingredient price per ton at the time of saving.
    pub unit_cost: f64,
    pub line_cost: f64,
    /// 1-based position in the mixing sequence.
    pub mixing_order: usize,
}

impl Formulation {
    /// Map a successful result to a persistable record.
    ///
    /// The code is derived from the creation time: `FORM-<millis>`.
    pub fn from_result(
        name: &str,
        target: &TargetComposition,
        result: &BlendResult,
        created_at: u64,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BlendError::InvalidInput("Formulation name is required".to_string()));
        }

        let outcome = result
            .outcome()
            .ok_or_else(|| BlendError::UnsavableResult(result.message()))?;

        let items = outcome
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| FormulationItem {
                ingredient_id: line.ingredient.id,
                ingredient_code: line.ingredient.code.clone(),
                mass: line.mass,
                percentage: line.percentage,
                unit_cost: line.ingredient.cost_per_ton,
                line_cost: line.cost,
                mixing_order: i + 1,
            })
            .collect();

        Ok(Self {
            code: format!("FORM-{}", created_at),
            name: name.to_string(),
            description: None,
            target: *target,
            status: FormulationStatus::Active,
            total_cost: outcome.total_cost,
            total_mass: outcome.total_mass,
            created_at,
            items,
        })
    }

    /// Attach a free-text note. Blank text clears it.
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == FormulationStatus::Active
    }

    /// Retire the formulation. It stays in the history file.
    pub fn archive(&mut self) {
        self.status = FormulationStatus::Archived;
    }
}
