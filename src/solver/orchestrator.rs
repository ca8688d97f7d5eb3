use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::models::{
    Allocation, BlendOutcome, BlendResult, FailureReason, Ingredient, Nutrient, SolveMethod,
    TargetComposition,
};
use crate::solver::config::SolverConfig;
use crate::solver::evaluator::{build_outcome, deviations, within_band};
use crate::solver::linear::LinearSystem;
use crate::solver::refiner::refine;

/// Solve a blend with default thresholds and an entropy-seeded generator.
pub fn solve(
    ingredients: &[Ingredient],
    target: &TargetComposition,
    total_mass: f64,
) -> BlendResult {
    let mut rng = StdRng::from_entropy();
    solve_with(ingredients, target, total_mass, &SolverConfig::default(), &mut rng)
}

/// Solve a blend.
///
/// Tries the exact linear method when the problem is small enough, and falls
/// back to stochastic refinement when it is not eligible, infeasible, or not
/// precise enough. Request problems come back as [`BlendResult::Failure`].
pub fn solve_with<R: Rng + ?Sized>(
    ingredients: &[Ingredient],
    target: &TargetComposition,
    total_mass: f64,
    config: &SolverConfig,
    rng: &mut R,
) -> BlendResult {
    if !target.is_valid() {
        return BlendResult::failure(FailureReason::InvalidTarget);
    }
    let targeted = target.targeted();
    if ingredients.is_empty() {
        return BlendResult::failure(FailureReason::NoIngredientsSelected);
    }
    if !total_mass.is_finite() || total_mass <= 0.0 {
        return BlendResult::failure(FailureReason::InvalidMass(total_mass));
    }

    info!(
        ingredients = ingredients.len(),
        nutrients = targeted.len(),
        total_mass,
        "solving blend"
    );

    if let Some(outcome) = attempt_exact(ingredients, &targeted, total_mass, config) {
        info!(total_cost = outcome.total_cost, "exact solution accepted");
        return BlendResult::Success {
            outcome,
            message: format!("Blend calculated with {}", SolveMethod::Exact.label()),
        };
    }

    if let Some(nutrient) = missing_source(ingredients, &targeted) {
        warn!(%nutrient, "no candidate ingredient provides a targeted nutrient");
        return BlendResult::failure(FailureReason::MissingNutrientSource(nutrient));
    }

    let refined = refine(ingredients, &targeted, total_mass, config, rng);
    let outcome = build_outcome(
        ingredients,
        &refined.allocation,
        SolveMethod::Approximate,
        config.snap_to_zero,
    );

    if within_band(&targeted, &outcome.composition, config.fallback_precision) {
        info!(
            best_error = refined.best_error,
            total_cost = outcome.total_cost,
            "approximate solution accepted"
        );
        BlendResult::Success {
            outcome,
            message: format!("Blend calculated with {}", SolveMethod::Approximate.label()),
        }
    } else {
        let deviations = deviations(&targeted, &outcome.composition);
        warn!(best_error = refined.best_error, "precision not achieved");
        BlendResult::Failure {
            partial: Some(outcome),
            reason: FailureReason::PrecisionNotAchieved { deviations },
        }
    }
}

/// Phase A. `None` means "fall back".
fn attempt_exact(
    ingredients: &[Ingredient],
    targeted: &[(Nutrient, f64)],
    total_mass: f64,
    config: &SolverConfig,
) -> Option<BlendOutcome> {
    // A lone ingredient has exactly one possible allocation.
    if ingredients.len() == 1 {
        debug!("single ingredient, allocation is forced");
        let allocation = Allocation::new(vec![total_mass]).settled(total_mass, config.snap_to_zero);
        let outcome = build_outcome(
            ingredients,
            &allocation,
            SolveMethod::Exact,
            config.snap_to_zero,
        );
        return within_band(targeted, &outcome.composition, config.exact_precision)
            .then_some(outcome);
    }

    if !config.exact_eligible(ingredients.len(), targeted.len()) {
        debug!(
            ingredients = ingredients.len(),
            nutrients = targeted.len(),
            "exact method not eligible"
        );
        return None;
    }

    let system = LinearSystem::for_blend(ingredients, targeted, total_mass);
    let masses = match system.solve(config) {
        Ok(masses) => masses,
        Err(e) => {
            debug!(error = %e, "linear solve infeasible");
            return None;
        }
    };

    let mut allocation = Allocation::new(masses);
    let allocated = allocation.total();
    if allocated <= 0.0 {
        debug!("linear solve produced an empty allocation");
        return None;
    }
    if (allocated - total_mass).abs() > config.exact_mass_tolerance {
        debug!(allocated, total_mass, "rescaling exact solution");
        allocation.rescale_to(total_mass);
    }

    let allocation = allocation.settled(total_mass, config.snap_to_zero);
    let outcome = build_outcome(ingredients, &allocation, SolveMethod::Exact, config.snap_to_zero);

    if targeted.len() == 1 || within_band(targeted, &outcome.composition, config.exact_precision) {
        Some(outcome)
    } else {
        debug!("exact solution outside precision band");
        None
    }
}

/// First targeted nutrient no candidate contributes to.
fn missing_source(ingredients: &[Ingredient], targeted: &[(Nutrient, f64)]) -> Option<Nutrient> {
    targeted
        .iter()
        .map(|&(n, _)| n)
        .find(|&n| !ingredients.iter().any(|i| i.fraction(n) > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ing(code: &str, fractions: [f64; 5], cost: f64) -> Ingredient {
        Ingredient::new(code, code, fractions, cost)
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn triple_ten_candidates() -> Vec<Ingredient> {
        vec![
            ing("UREA", [46.0, 0.0, 0.0, 0.0, 0.0], 2500.0),
            ing("MAP", [11.0, 52.0, 0.0, 0.0, 0.0], 3800.0),
            ing("KCL", [0.0, 0.0, 60.0, 0.0, 0.0], 3100.0),
            ing("FILL", [0.0, 0.0, 0.0, 0.0, 0.0], 150.0),
        ]
    }

    fn triple_ten() -> TargetComposition {
        TargetComposition::from_pairs(&[
            (Nutrient::N, 10.0),
            (Nutrient::P, 10.0),
            (Nutrient::K, 10.0),
        ])
    }

    /// Method of the accepted outcome, or of the partial attempt on failure.
    fn method_of(result: &BlendResult) -> Option<SolveMethod> {
        match result {
            BlendResult::Success { outcome, .. } => Some(outcome.method),
            BlendResult::Failure { partial, .. } => partial.as_ref().map(|p| p.method),
        }
    }

    fn urea_potash_filler() -> (Vec<Ingredient>, TargetComposition) {
        // Exact answer: urea 497.83, potash 500, filler 2.17.
        let ingredients = vec![
            ing("UREA", [46.0, 0.0, 0.0, 0.0, 0.0], 2500.0),
            ing("KCL", [0.0, 0.0, 60.0, 0.0, 0.0], 3100.0),
            ing("FILL", [0.0, 0.0, 0.0, 0.0, 0.0], 100.0),
        ];
        let target = TargetComposition::from_pairs(&[(Nutrient::N, 22.9), (Nutrient::K, 30.0)]);
        (ingredients, target)
    }

    #[test]
    fn test_missing_source_detection() {
        let ingredients = vec![ing("A", [20.0, 0.0, 0.0, 0.0, 0.0], 0.0)];
        assert_eq!(missing_source(&ingredients, &[(Nutrient::N, 10.0)]), None);
        assert_eq!(
            missing_source(&ingredients, &[(Nutrient::N, 10.0), (Nutrient::S, 5.0)]),
            Some(Nutrient::S)
        );
    }

    #[test]
    fn test_three_ingredients_two_nutrients_exact() {
        // Urea, potash and filler: N 23, K 30 in 1000 kg -> 500 / 500 / 0
        let ingredients = vec![
            ing("UREA", [46.0, 0.0, 0.0, 0.0, 0.0], 2500.0),
            ing("KCL", [0.0, 0.0, 60.0, 0.0, 0.0], 3100.0),
            ing("FILL", [0.0, 0.0, 0.0, 0.0, 0.0], 100.0),
        ];
        let target = TargetComposition::from_pairs(&[(Nutrient::N, 23.0), (Nutrient::K, 30.0)]);
        let config = SolverConfig::default();
        let result = solve_with(&ingredients, &target, 1000.0, &config, &mut seeded());

        let outcome = result.outcome().expect("exact success");
        assert_eq!(outcome.method, SolveMethod::Exact);
        assert_eq!(outcome.mass_of("UREA"), 500.0);
        assert_eq!(outcome.mass_of("KCL"), 500.0);
        assert_eq!(outcome.mass_of("FILL"), 0.0);
        assert_eq!(outcome.composition.n, 23.0);
        assert_eq!(outcome.composition.k, 30.0);
    }

    #[test]
    fn test_triple_ten_exact_by_default() {
        let result = solve_with(
            &triple_ten_candidates(),
            &triple_ten(),
            1000.0,
            &SolverConfig::default(),
            &mut seeded(),
        );
        assert_eq!(method_of(&result), Some(SolveMethod::Exact));
        assert!(result.is_success());
    }

    #[test]
    fn test_default_snap_keeps_small_filler() {
        let (ingredients, target) = urea_potash_filler();
        let config = SolverConfig::default();
        let result = solve_with(&ingredients, &target, 1000.0, &config, &mut seeded());

        let outcome = result.outcome().expect("exact success");
        assert_eq!(outcome.method, SolveMethod::Exact);
        assert_eq!(outcome.mass_of("UREA"), 497.8);
        assert_eq!(outcome.mass_of("KCL"), 500.0);
        assert_eq!(outcome.mass_of("FILL"), 2.2);
    }

    #[test]
    fn test_snapped_entries_rescale_exact_solution() {
        // Filler (2.17 kg) falls under a 5 kg snap; the remaining 997.83 kg is
        // scaled back up to the batch mass.
        let (ingredients, target) = urea_potash_filler();
        let config = SolverConfig {
            snap_to_zero: 5.0,
            ..SolverConfig::default()
        };
        let result = solve_with(&ingredients, &target, 1000.0, &config, &mut seeded());

        let outcome = result.outcome().expect("exact success");
        assert_eq!(outcome.method, SolveMethod::Exact);
        assert_eq!(outcome.mass_of("FILL"), 0.0);
        assert_eq!(outcome.mass_of("UREA"), 498.9);
        assert_eq!(outcome.mass_of("KCL"), 501.1);
        assert_eq!(outcome.composition.n, 22.95);
        assert_eq!(outcome.composition.k, 30.07);
    }

    #[test]
    fn test_mass_tolerance_skips_rescale() {
        // With a 5 kg tolerance the 2.17 kg gap is not rescaled; settling folds
        // it into the largest entry instead.
        let (ingredients, target) = urea_potash_filler();
        let config = SolverConfig {
            snap_to_zero: 5.0,
            exact_mass_tolerance: 5.0,
            ..SolverConfig::default()
        };
        let result = solve_with(&ingredients, &target, 1000.0, &config, &mut seeded());

        let outcome = result.outcome().expect("exact success");
        assert_eq!(outcome.method, SolveMethod::Exact);
        assert_eq!(outcome.mass_of("UREA"), 497.8);
        assert_eq!(outcome.mass_of("KCL"), 502.2);
        assert_eq!(outcome.composition.k, 30.13);
    }

    #[test]
    fn test_tiny_batch_snaps_everything_but_filler() {
        // At 0.5 kg every exact entry is near 0.1 kg; three are snapped and the
        // rescaled answer is pure filler. No 0.1 kg grid allocation is within
        // 1 pp either, so the request fails.
        let result = solve_with(
            &triple_ten_candidates(),
            &triple_ten(),
            0.5,
            &SolverConfig::default(),
            &mut seeded(),
        );

        match result {
            BlendResult::Failure {
                partial: Some(partial),
                reason: FailureReason::PrecisionNotAchieved { deviations },
            } => {
                assert_eq!(partial.method, SolveMethod::Approximate);
                assert_eq!(deviations.len(), 3);
            }
            other => panic!("expected precision failure, got {:?}", other),
        }
    }

    #[test]
    fn test_tight_exact_precision_falls_back() {
        // At 100 kg the 0.1 kg rounding leaves deviations of 0.01-0.02 pp.
        let ingredients = triple_ten_candidates();
        let target = TargetComposition::from_pairs(&[
            (Nutrient::N, 8.0),
            (Nutrient::P, 12.0),
            (Nutrient::K, 14.0),
        ]);

        let config = SolverConfig::default();
        let result = solve_with(&ingredients, &target, 100.0, &config, &mut seeded());
        assert_eq!(method_of(&result), Some(SolveMethod::Exact));

        let strict = SolverConfig {
            exact_precision: 0.005,
            ..SolverConfig::default()
        };
        let result = solve_with(&ingredients, &target, 100.0, &strict, &mut seeded());
        assert_eq!(method_of(&result), Some(SolveMethod::Approximate));
    }

    #[test]
    fn test_ingredient_limit_skips_exact() {
        let config = SolverConfig {
            max_exact_ingredients: 3,
            ..SolverConfig::default()
        };
        let candidates = triple_ten_candidates();
        let result = solve_with(&candidates, &triple_ten(), 1000.0, &config, &mut seeded());
        assert_eq!(method_of(&result), Some(SolveMethod::Approximate));
    }

    #[test]
    fn test_nutrient_limit_skips_exact() {
        let config = SolverConfig {
            max_exact_nutrients: 2,
            ..SolverConfig::default()
        };
        let candidates = triple_ten_candidates();
        let result = solve_with(&candidates, &triple_ten(), 1000.0, &config, &mut seeded());
        assert_eq!(method_of(&result), Some(SolveMethod::Approximate));
    }

    #[test]
    fn test_infeasible_exact_falls_back() {
        // Exact answer would need negative filler; the refiner takes over.
        let ingredients = vec![
            ing("A", [30.0, 0.0, 0.0, 0.0, 0.0], 1000.0),
            ing("B", [10.0, 0.0, 0.0, 0.0, 0.0], 1000.0),
        ];
        let target = TargetComposition::from_pairs(&[(Nutrient::N, 40.0)]);
        let config = SolverConfig::default();
        let result = solve_with(&ingredients, &target, 1000.0, &config, &mut seeded());

        match result {
            BlendResult::Failure {
                partial: Some(partial),
                reason: FailureReason::PrecisionNotAchieved { deviations },
            } => {
                assert_eq!(partial.method, SolveMethod::Approximate);
                assert_eq!(deviations.len(), 1);
                assert!(deviations[0].1 > 1.0);
            }
            other => panic!("expected precision failure, got {:?}", other),
        }
    }
}
