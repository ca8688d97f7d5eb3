/// Default total blend mass in kg when none is given.
pub const DEFAULT_TOTAL_MASS: f64 = 1000.0;

/// Mass units per cost unit: prices are quoted per ton.
pub const MASS_UNITS_PER_COST_UNIT: f64 = 1000.0;

// ─────────────────────────────────────────────────────────────────────────────
// Linear system
// ─────────────────────────────────────────────────────────────────────────────

/// Pivots smaller than this leave their column undetermined.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Residual tolerance, absolute and relative to the right-hand side.
pub const RESIDUAL_TOLERANCE: f64 = 1e-5;

/// Masses below this (kg) are snapped to zero.
pub const SNAP_TO_ZERO: f64 = 0.1;

/// Negative masses down to this are treated as numerical noise.
pub const NEGATIVE_TOLERANCE: f64 = -0.01;

/// Exact method is attempted with at most this many ingredients.
pub const MAX_EXACT_INGREDIENTS: usize = 5;

/// Exact method is attempted with at most this many targeted nutrients.
pub const MAX_EXACT_NUTRIENTS: usize = 3;

/// Exact solutions off the requested mass by more than this are rescaled.
pub const EXACT_MASS_TOLERANCE: f64 = 0.1;

// ─────────────────────────────────────────────────────────────────────────────
// Precision bands (percentage points)
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum deviation per nutrient for an exact result.
pub const EXACT_PRECISION: f64 = 0.5;

/// Maximum deviation per nutrient for an approximate result.
pub const FALLBACK_PRECISION: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Stochastic refinement
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed number of refinement rounds.
pub const REFINE_ITERATIONS: usize = 1000;

/// Perturbation amplitude as a fraction of the total mass (±5%).
pub const PERTURBATION_FRACTION: f64 = 0.05;

/// Refiner rescales when the mass sum drifts further than this.
pub const REFINE_MASS_TOLERANCE: f64 = 0.01;
