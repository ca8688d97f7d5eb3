use dialoguer::{Confirm, Input, MultiSelect};

use crate::error::{BlendError, Result};
use crate::models::{Ingredient, Nutrient, TargetComposition};
use crate::solver::DEFAULT_TOTAL_MASS;

/// Parse a user-entered number, accepting a decimal comma.
fn parse_number(input: &str) -> Result<f64> {
    input
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| BlendError::InvalidInput(format!("Invalid number: {}", input.trim())))
}

fn parse_percentage(input: &str, nutrient: Nutrient) -> Result<f64> {
    let value = parse_number(input)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(BlendError::InvalidInput(format!(
            "{} must be between 0 and 100",
            nutrient.full_name()
        )));
    }
    Ok(value)
}

/// Prompt for the target percentage of every nutrient. 0 leaves it untargeted.
pub fn prompt_target() -> Result<TargetComposition> {
    let mut target = TargetComposition::default();

    for nutrient in Nutrient::ALL {
        let input: String = Input::new()
            .with_prompt(format!("Target {} ({}) %", nutrient.full_name(), nutrient.symbol()))
            .default("0".to_string())
            .interact_text()?;

        let value = parse_percentage(&input, nutrient)?;
        if value > 0.0 {
            target.set(nutrient, Some(value));
        }
    }

    Ok(target)
}

/// Prompt for the total batch mass in kg.
pub fn prompt_total_mass() -> Result<f64> {
    let input: String = Input::new()
        .with_prompt("Total mass (kg)")
        .default(format!("{}", DEFAULT_TOTAL_MASS))
        .interact_text()?;

    let mass = parse_number(&input)?;
    if mass <= 0.0 {
        return Err(BlendError::InvalidInput(
            "Total mass must be greater than zero".to_string(),
        ));
    }

    Ok(mass)
}

/// Let the user tick candidate ingredients from the available list.
pub fn prompt_ingredient_selection(available: &[&Ingredient]) -> Result<Vec<Ingredient>> {
    if available.is_empty() {
        return Err(BlendError::NoAvailableIngredients);
    }

    let options: Vec<String> = available
        .iter()
        .map(|i| format!("{:<8} {} ({})", i.code, i.name, i.grade()))
        .collect();

    let chosen = MultiSelect::new()
        .with_prompt("Select candidate ingredients (space to toggle, enter to confirm)")
        .items(&options)
        .interact()?;

    Ok(chosen.into_iter().map(|idx| available[idx].clone()).collect())
}

pub fn prompt_formulation_name() -> Result<String> {
    let name: String = Input::new()
        .with_prompt("Formulation name")
        .interact_text()?;
    Ok(name.trim().to_string())
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
