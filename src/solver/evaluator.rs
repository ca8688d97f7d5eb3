use crate::models::{
    Allocation, BlendLine, BlendOutcome, Ingredient, Nutrient, NutrientProfile, SolveMethod,
};

/// Round to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Achieved composition, cost and mass of an allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub composition: NutrientProfile,
    pub total_cost: f64,
    pub total_mass: f64,
}

/// Mass-weighted nutrient percentages, unrounded.
///
/// Sums run in ingredient order so results are reproducible. An empty
/// allocation yields an all-zero composition.
pub fn raw_composition(ingredients: &[Ingredient], allocation: &Allocation) -> NutrientProfile {
    let total_mass = allocation.total();
    if total_mass <= 0.0 {
        return NutrientProfile::default();
    }

    let mut composition = NutrientProfile::default();
    for nutrient in Nutrient::ALL {
        let weighted: f64 = ingredients
            .iter()
            .zip(allocation.masses())
            .filter(|(_, m)| **m > 0.0)
            .map(|(ing, m)| ing.fraction(nutrient) * m)
            .sum();
        composition.set(nutrient, weighted / total_mass);
    }
    composition
}

/// Cost of `mass` kg of `ingredient`.
#[inline]
pub fn line_cost(ingredient: &Ingredient, mass: f64) -> f64 {
    mass * ingredient.cost_per_kg()
}

/// Total cost of an allocation.
pub fn total_cost(ingredients: &[Ingredient], allocation: &Allocation) -> f64 {
    ingredients
        .iter()
        .zip(allocation.masses())
        .filter(|(_, m)| **m > 0.0)
        .map(|(ing, m)| line_cost(ing, *m))
        .sum()
}

/// Composition (rounded to 0.01), total cost and total mass.
pub fn evaluate(ingredients: &[Ingredient], allocation: &Allocation) -> Evaluation {
    Evaluation {
        composition: raw_composition(ingredients, allocation).map(|v| round_to(v, 2)),
        total_cost: total_cost(ingredients, allocation),
        total_mass: allocation.total(),
    }
}

/// Absolute deviation per targeted nutrient.
pub fn deviations(
    targeted: &[(Nutrient, f64)],
    composition: &NutrientProfile,
) -> Vec<(Nutrient, f64)> {
    targeted
        .iter()
        .map(|&(n, target)| (n, (composition.get(n) - target).abs()))
        .collect()
}

/// Every targeted nutrient within `band` percentage points.
pub fn within_band(targeted: &[(Nutrient, f64)], composition: &NutrientProfile, band: f64) -> bool {
    deviations(targeted, composition).iter().all(|(_, d)| *d <= band)
}

/// Sum of squared deviations over the targeted nutrients.
pub fn squared_error(targeted: &[(Nutrient, f64)], composition: &NutrientProfile) -> f64 {
    targeted
        .iter()
        .map(|&(n, target)| {
            let diff = composition.get(n) - target;
            diff * diff
        })
        .sum()
}

/// Itemize an allocation: lines for masses above `min_mass`, plus totals.
pub fn build_outcome(
    ingredients: &[Ingredient],
    allocation: &Allocation,
    method: SolveMethod,
    min_mass: f64,
) -> BlendOutcome {
    let evaluation = evaluate(ingredients, allocation);

    let lines = ingredients
        .iter()
        .zip(allocation.masses())
        .filter(|(_, m)| **m > min_mass)
        .map(|(ing, &mass)| BlendLine {
            ingredient: ing.clone(),
            mass,
            percentage: if evaluation.total_mass > 0.0 {
                mass / evaluation.total_mass * 100.0
            } else {
                0.0
            },
            cost: line_cost(ing, mass),
        })
        .collect();

    BlendOutcome {
        method,
        lines,
        composition: evaluation.composition,
        total_cost: evaluation.total_cost,
        total_mass: evaluation.total_mass,
    }
}
