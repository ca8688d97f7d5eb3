use serde::Serialize;
use thiserror::Error;

use crate::models::{Ingredient, Nutrient, NutrientProfile};
use crate::solver::evaluator::round_to;

/// Per-ingredient masses, aligned with the candidate ingredient order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    masses: Vec<f64>,
}

impl Allocation {
    pub fn new(masses: Vec<f64>) -> Self {
        Self { masses }
    }

    /// Every ingredient gets `total_mass / count`.
    pub fn uniform(count: usize, total_mass: f64) -> Self {
        if count == 0 {
            return Self::new(Vec::new());
        }
        Self::new(vec![total_mass / count as f64; count])
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn masses_mut(&mut self) -> &mut [f64] {
        &mut self.masses
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Sum of positive masses, in ingredient order.
    pub fn total(&self) -> f64 {
        self.masses.iter().filter(|&&m| m > 0.0).sum()
    }

    /// Scale every entry so the total equals `total_mass`.
    ///
    /// An empty (all-zero) allocation cannot be scaled and is left untouched.
    pub fn rescale_to(&mut self, total_mass: f64) -> bool {
        let current = self.total();
        if current <= 0.0 {
            return false;
        }
        let factor = total_mass / current;
        for mass in self.masses.iter_mut() {
            *mass *= factor;
        }
        true
    }

    /// Drop entries at or below `threshold`, round the rest to 0.1 and fold the
    /// rounding residue into the largest entry so the total stays on `total_mass`.
    pub fn settled(mut self, total_mass: f64, threshold: f64) -> Self {
        for mass in self.masses.iter_mut() {
            *mass = if *mass > threshold { round_to(*mass, 1) } else { 0.0 };
        }

        let largest = self
            .masses
            .iter()
            .enumerate()
            .filter(|(_, m)| **m > 0.0)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i);

        if let Some(i) = largest {
            let residue = total_mass - self.total();
            self.masses[i] = round_to((self.masses[i] + residue).max(0.0), 1);
        }

        self
    }
}

/// How an accepted blend was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveMethod {
    /// Linear system solved within the tight precision band.
    Exact,
    /// Stochastic refinement within the relaxed precision band.
    Approximate,
}

impl SolveMethod {
    pub fn label(&self) -> &'static str {
        match self {
            SolveMethod::Exact => "linear system",
            SolveMethod::Approximate => "iterative method",
        }
    }
}

/// One itemized row of a blend.
#[derive(Debug, Clone, Serialize)]
pub struct BlendLine {
    pub ingredient: Ingredient,
    /// kg, rounded to 0.1.
    pub mass: f64,
    /// Share of the allocated total mass, 0-100.
    pub percentage: f64,
    pub cost: f64,
}

/// Everything computed for an allocation: lines, achieved composition, totals.
#[derive(Debug, Clone, Serialize)]
pub struct BlendOutcome {
    pub method: SolveMethod,
    pub lines: Vec<BlendLine>,
    /// Achieved percentage per nutrient, rounded to 0.01.
    pub composition: NutrientProfile,
    pub total_cost: f64,
    pub total_mass: f64,
}

impl BlendOutcome {
    /// Allocated mass of the ingredient with this code (case-insensitive), 0 when absent.
    pub fn mass_of(&self, code: &str) -> f64 {
        self.lines
            .iter()
            .find(|l| l.ingredient.code.eq_ignore_ascii_case(code))
            .map(|l| l.mass)
            .unwrap_or(0.0)
    }
}

/// Why a request did not produce an acceptable blend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    #[error("Define at least one target nutrient (N, P, K, S or Ca) greater than zero.")]
    InvalidTarget,

    #[error("Total mass must be a positive number, got {0}.")]
    InvalidMass(f64),

    #[error("Select at least one available ingredient for the calculation.")]
    NoIngredientsSelected,

    #[error("No selected ingredient provides {0}.")]
    MissingNutrientSource(Nutrient),

    #[error("Could not reach sufficient precision. Deviations: {}", format_deviations(.deviations))]
    PrecisionNotAchieved { deviations: Vec<(Nutrient, f64)> },
}

/// `N: 2.3, K: 0.0`
pub fn format_deviations(deviations: &[(Nutrient, f64)]) -> String {
    deviations
        .iter()
        .map(|(n, d)| format!("{}: {:.1}", n, d))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a solve. A failure may still carry the best attempt.
#[derive(Debug, Clone)]
pub enum BlendResult {
    Success {
        outcome: BlendOutcome,
        message: String,
    },
    Failure {
        partial: Option<BlendOutcome>,
        reason: FailureReason,
    },
}

impl BlendResult {
    pub fn failure(reason: FailureReason) -> Self {
        BlendResult::Failure {
            partial: None,
            reason,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BlendResult::Success { .. })
    }

    /// Human-readable diagnostic.
    pub fn message(&self) -> String {
        match self {
            BlendResult::Success { message, .. } => message.clone(),
            BlendResult::Failure { reason, .. } => reason.to_string(),
        }
    }

    /// The accepted outcome; `None` on failure.
    pub fn outcome(&self) -> Option<&BlendOutcome> {
        match self {
            BlendResult::Success { outcome, .. } => Some(outcome),
            BlendResult::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            BlendResult::Success { .. } => None,
            BlendResult::Failure { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_and_total() {
        let alloc = Allocation::uniform(4, 1000.0);
        assert_eq!(alloc.masses(), &[250.0, 250.0, 250.0, 250.0]);
        assert_eq!(alloc.total(), 1000.0);
        assert!(Allocation::uniform(0, 1000.0).is_empty());
    }

    #[test]
    fn test_rescale_to() {
        let mut alloc = Allocation::new(vec![100.0, 300.0]);
        assert!(alloc.rescale_to(1000.0));
        assert_eq!(alloc.masses(), &[250.0, 750.0]);

        let mut empty = Allocation::new(vec![0.0, 0.0]);
        assert!(!empty.rescale_to(1000.0));
    }

    #[test]
    fn test_settled_rounds_and_keeps_total() {
        let alloc = Allocation::new(vec![333.333, 333.333, 333.334]).settled(1000.0, 0.1);
        let total: f64 = alloc.masses().iter().sum();
        assert!((total - 1000.0).abs() < 1e-9);
        for m in alloc.masses() {
            assert!(((m * 10.0).round() - m * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_settled_drops_small_entries() {
        let alloc = Allocation::new(vec![0.05, 0.1, 999.85]).settled(1000.0, 0.1);
        assert_eq!(alloc.masses()[0], 0.0);
        assert_eq!(alloc.masses()[1], 0.0);
        assert_eq!(alloc.masses()[2], 1000.0);
    }

    #[test]
    fn test_failure_messages() {
        let reason = FailureReason::PrecisionNotAchieved {
            deviations: vec![(Nutrient::N, 2.34), (Nutrient::K, 0.0)],
        };
        assert_eq!(
            reason.to_string(),
            "Could not reach sufficient precision. Deviations: N: 2.3, K: 0.0"
        );
        assert_eq!(
            FailureReason::MissingNutrientSource(Nutrient::Ca).to_string(),
            "No selected ingredient provides Ca."
        );
    }
}
