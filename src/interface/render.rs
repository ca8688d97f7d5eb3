use crate::models::{
    BlendOutcome, BlendResult, Formulation, Ingredient, Nutrient, TargetComposition,
};
use crate::solver::round_to;

/// Format an amount as Brazilian real: `R$ 1.234,56`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", round_to(value, 2))
}

pub fn format_mass(value: f64) -> String {
    format!("{:.2} kg", round_to(value, 2))
}

fn display_outcome_table(outcome: &BlendOutcome) {
    let name_width = outcome
        .lines
        .iter()
        .map(|l| l.ingredient.name.len())
        .max()
        .unwrap_or(10)
        .max(10);

    println!(
        "{:>3}  {:<8} {:<width$} {:>12} {:>9} {:>14}",
        "#",
        "Code",
        "Ingredient",
        "Mass",
        "Share",
        "Cost",
        width = name_width
    );

    for (i, line) in outcome.lines.iter().enumerate() {
        println!(
            "{:>3}  {:<8} {:<width$} {:>12} {:>9} {:>14}",
            i + 1,
            line.ingredient.code,
            line.ingredient.name,
            format_mass(line.mass),
            format_percentage(line.percentage),
            format_currency(line.cost),
            width = name_width
        );
    }
}

fn display_comparison(target: &TargetComposition, outcome: &BlendOutcome) {
    println!();
    println!("{:<12} {:>9} {:>9} {:>9}", "Nutrient", "Target", "Achieved", "Dev (pp)");

    for nutrient in Nutrient::ALL {
        let achieved = outcome.composition.get(nutrient);
        match target.get(nutrient).filter(|v| *v > 0.0) {
            Some(wanted) => println!(
                "{:<12} {:>9} {:>9} {:>+9.2}",
                nutrient.full_name(),
                format_percentage(wanted),
                format_percentage(achieved),
                achieved - wanted
            ),
            None if achieved > 0.0 => println!(
                "{:<12} {:>9} {:>9}",
                nutrient.full_name(),
                "-",
                format_percentage(achieved)
            ),
            None => {}
        }
    }
}

/// Display a solve result: table, target vs achieved, totals and message.
pub fn display_blend_result(target: &TargetComposition, result: &BlendResult) {
    println!();

    match result {
        BlendResult::Success { outcome, message } => {
            println!("=== Blend ({}) ===", outcome.method.label());
            println!();
            display_outcome_table(outcome);
            display_comparison(target, outcome);

            println!();
            println!("--- Summary ---");
            println!("Total mass: {}", format_mass(outcome.total_mass));
            println!("Total cost: {}", format_currency(outcome.total_cost));
            if outcome.total_mass > 0.0 {
                println!(
                    "Cost per ton: {}",
                    format_currency(outcome.total_cost / outcome.total_mass * 1000.0)
                );
            }
            println!("{}", message);
        }
        BlendResult::Failure { partial, reason } => {
            println!("Blend not found: {}", reason);
            if let Some(outcome) = partial {
                println!();
                println!("Closest allocation found:");
                println!();
                display_outcome_table(outcome);
                display_comparison(target, outcome);
            }
        }
    }

    println!();
}

/// Display ingredients with their grade, price and availability.
pub fn display_ingredient_list(ingredients: &[&Ingredient], title: &str) {
    if ingredients.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, ingredients.len());
    println!();

    for ingredient in ingredients {
        let flag = if ingredient.available { "" } else { "  [unavailable]" };
        println!(
            "  {:<8} {} - {} - {}/t{}",
            ingredient.code,
            ingredient.name,
            ingredient.grade(),
            format_currency(ingredient.cost_per_ton),
            flag
        );
    }

    println!();
}

/// Display saved formulations, most recent last.
pub fn display_formulations(formulations: &[Formulation]) {
    if formulations.is_empty() {
        println!("No saved formulations.");
        return;
    }

    println!();
    println!("=== Formulations ({}) ===", formulations.len());
    println!();

    for f in formulations {
        let flag = if f.is_active() { "" } else { "  [archived]" };
        println!(
            "  {}  {}  [{}]  {} / {}{}",
            f.code,
            f.name,
            f.target.label(),
            format_mass(f.total_mass),
            format_currency(f.total_cost),
            flag
        );
        if let Some(description) = &f.description {
            println!("      {}", description);
        }
        for item in &f.items {
            println!(
                "      {}. {:<8} {:>12} {:>9}",
                item.mixing_order,
                item.ingredient_code,
                format_mass(item.mass),
                format_percentage(item.percentage)
            );
        }
    }

    println!();
}
