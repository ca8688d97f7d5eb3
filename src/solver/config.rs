use serde::{Deserialize, Serialize};

use crate::solver::constants::*;

/// Every numeric threshold the solver uses.
///
/// Defaults come from [`crate::solver::constants`]. Missing fields in a JSON
/// config fall back to their defaults, so a file may override a single knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub pivot_epsilon: f64,
    pub residual_tolerance: f64,
    pub snap_to_zero: f64,
    pub negative_tolerance: f64,
    pub exact_precision: f64,
    pub fallback_precision: f64,
    pub refine_iterations: usize,
    pub perturbation_fraction: f64,
    pub exact_mass_tolerance: f64,
    pub refine_mass_tolerance: f64,
    pub max_exact_ingredients: usize,
    pub max_exact_nutrients: usize,
    /// Return the lowest-error allocation seen by the refiner instead of the
    /// one present after the last round.
    pub retain_best: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_epsilon: PIVOT_EPSILON,
            residual_tolerance: RESIDUAL_TOLERANCE,
            snap_to_zero: SNAP_TO_ZERO,
            negative_tolerance: NEGATIVE_TOLERANCE,
            exact_precision: EXACT_PRECISION,
            fallback_precision: FALLBACK_PRECISION,
            refine_iterations: REFINE_ITERATIONS,
            perturbation_fraction: PERTURBATION_FRACTION,
            exact_mass_tolerance: EXACT_MASS_TOLERANCE,
            refine_mass_tolerance: REFINE_MASS_TOLERANCE,
            max_exact_ingredients: MAX_EXACT_INGREDIENTS,
            max_exact_nutrients: MAX_EXACT_NUTRIENTS,
            retain_best: true,
        }
    }
}

impl SolverConfig {
    /// Whether the exact method may be attempted for this problem size.
    ///
    /// Needs one row per targeted nutrient plus mass conservation, without
    /// exceeding the ingredient count.
    pub fn exact_eligible(&self, ingredient_count: usize, nutrient_count: usize) -> bool {
        ingredient_count <= self.max_exact_ingredients
            && nutrient_count <= self.max_exact_nutrients
            && nutrient_count < ingredient_count
    }

    /// Format as a compact string for display.
    pub fn display(&self) -> String {
        format!(
            "pivot={:e} resid={:e} snap={} neg={} exact={}pp fallback={}pp iters={} \
             perturb={}% best={}",
            self.pivot_epsilon,
            self.residual_tolerance,
            self.snap_to_zero,
            self.negative_tolerance,
            self.exact_precision,
            self.fallback_precision,
            self.refine_iterations,
            self.perturbation_fraction * 100.0,
            self.retain_best
        )
    }
}
