use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use blend_calc_rs::cli::{CalculateArgs, Cli, Command};
use blend_calc_rs::error::Result;
use blend_calc_rs::interface::{
    display_blend_result, display_formulations, display_ingredient_list, prompt_formulation_name,
    prompt_ingredient_selection, prompt_target, prompt_total_mass, prompt_yes_no,
};
use blend_calc_rs::logging::init_tracing;
use blend_calc_rs::models::{Formulation, TargetComposition};
use blend_calc_rs::solver::{solve_with, RequestSequencer, SolverConfig, DEFAULT_TOTAL_MASS};
use blend_calc_rs::state::{
    append_formulation, archive_formulation, export_blend_csv, import_ingredients_csv,
    load_formulations, load_ingredients, load_solver_config, save_ingredients, IngredientCatalog,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => load_solver_config(path)?,
        None => SolverConfig::default(),
    };
    debug!("solver config: {}", config.display());

    let command = cli.command.unwrap_or_default();

    match command {
        Command::Calculate(args) => cmd_calculate(&cli.catalog, &cli.formulations, &config, args),
        Command::List { all } => cmd_list(&cli.catalog, all),
        Command::Import { csv } => cmd_import(&cli.catalog, &csv),
        Command::History { all } => cmd_history(&cli.formulations, all),
        Command::Archive { code } => cmd_archive(&cli.formulations, &code),
        Command::Availability { code, on, off } => cmd_availability(&cli.catalog, &code, on, off),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn load_catalog(file_path: &str) -> Result<Option<IngredientCatalog>> {
    let path = Path::new(file_path);
    if !path.exists() {
        eprintln!("Ingredient catalog not found: {}", file_path);
        eprintln!("Create it or use 'import <csv>' to build one.");
        return Ok(None);
    }
    Ok(Some(IngredientCatalog::new(load_ingredients(path)?)))
}

/// Calculate a blend, then optionally export and save it.
fn cmd_calculate(
    catalog_path: &str,
    formulations_path: &str,
    config: &SolverConfig,
    args: CalculateArgs,
) -> Result<()> {
    let Some(catalog) = load_catalog(catalog_path)? else {
        return Ok(());
    };

    let scripted = args.is_scripted();

    let target: TargetComposition = match &args.target {
        Some(text) => text.parse()?,
        None => prompt_target()?,
    };

    let total_mass = match args.mass {
        Some(mass) => mass,
        None if scripted => DEFAULT_TOTAL_MASS,
        None => prompt_total_mass()?,
    };

    let candidates = if args.ingredients.is_empty() {
        let available = catalog.all_available();
        println!("{} of {} ingredients available", available.len(), catalog.len());
        prompt_ingredient_selection(&available)?
    } else {
        catalog.select(&args.ingredients)?
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let sequencer = RequestSequencer::new();
    let request = sequencer.issue();
    let result = solve_with(&candidates, &target, total_mass, config, &mut rng);
    let Some(result) = sequencer.publish(request, result) else {
        return Ok(());
    };

    display_blend_result(&target, &result);

    let Some(outcome) = result.outcome() else {
        return Ok(());
    };

    if let Some(export_path) = &args.export {
        export_blend_csv(export_path, outcome)?;
        println!("Blend exported to {}", export_path);
    }

    let name = match args.save {
        Some(name) => Some(name),
        None if scripted => None,
        None => {
            if prompt_yes_no("Save this formulation?", false)? {
                Some(prompt_formulation_name()?)
            } else {
                None
            }
        }
    };

    if let Some(name) = name {
        let formulation = Formulation::from_result(&name, &target, &result, now_millis())?
            .with_description(args.description.as_deref());
        let code = formulation.code.clone();
        append_formulation(formulations_path, formulation)?;
        println!("Formulation saved as {}.", code);
    }

    Ok(())
}

/// List catalog ingredients.
fn cmd_list(catalog_path: &str, all: bool) -> Result<()> {
    let Some(catalog) = load_catalog(catalog_path)? else {
        return Ok(());
    };

    if all {
        display_ingredient_list(&catalog.all(), "Ingredients");
    } else {
        display_ingredient_list(&catalog.all_available(), "Available ingredients");
    }
    Ok(())
}

/// Merge a CSV file into the catalog, creating the catalog if needed.
fn cmd_import(catalog_path: &str, csv_path: &str) -> Result<()> {
    let path = Path::new(catalog_path);
    let existing = if path.exists() {
        load_ingredients(path)?
    } else {
        Vec::new()
    };

    let mut catalog = IngredientCatalog::new(existing);
    let imported = import_ingredients_csv(csv_path)?;
    let (added, updated) = catalog.merge(imported);

    save_ingredients(path, &catalog.to_ingredients())?;
    println!(
        "Imported {} new and {} updated ingredients. Catalog now has {}.",
        added,
        updated,
        catalog.len()
    );
    Ok(())
}

/// Show saved formulations, active only unless `all`.
fn cmd_history(formulations_path: &str, all: bool) -> Result<()> {
    let formulations: Vec<Formulation> = load_formulations(formulations_path)?
        .into_iter()
        .filter(|f| all || f.is_active())
        .collect();
    display_formulations(&formulations);
    Ok(())
}

/// Archive one saved formulation.
fn cmd_archive(formulations_path: &str, code: &str) -> Result<()> {
    archive_formulation(formulations_path, code)?;
    println!("Formulation {} archived.", code);
    Ok(())
}

/// Toggle availability of one ingredient.
fn cmd_availability(catalog_path: &str, code: &str, on: bool, off: bool) -> Result<()> {
    if !on && !off {
        println!("Please specify --on or --off.");
        return Ok(());
    }

    let Some(mut catalog) = load_catalog(catalog_path)? else {
        return Ok(());
    };

    catalog.set_available(code, on)?;
    save_ingredients(catalog_path, &catalog.to_ingredients())?;
    println!(
        "{} is now {}.",
        code,
        if on { "available" } else { "unavailable" }
    );
    Ok(())
}
