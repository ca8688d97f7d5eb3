use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BlendError, Result};
use crate::models::{BlendOutcome, Formulation, Ingredient};
use crate::solver::SolverConfig;

/// Deduplicate by lowercase code, keeping the position of the first
/// occurrence and the contents of the last.
fn dedup_by_code(ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Ingredient> = Vec::with_capacity(ingredients.len());

    for ingredient in ingredients {
        match positions.get(&ingredient.key()) {
            Some(&pos) => out[pos] = ingredient,
            None => {
                positions.insert(ingredient.key(), out.len());
                out.push(ingredient);
            }
        }
    }
    out
}

/// Load ingredients from a JSON file.
///
/// Deduplicates by lowercase code (last occurrence wins).
pub fn load_ingredients<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let content = fs::read_to_string(path)?;
    let ingredients: Vec<Ingredient> = serde_json::from_str(&content)?;
    Ok(dedup_by_code(ingredients))
}

/// Save ingredients to a JSON file, deduplicated by lowercase code.
pub fn save_ingredients<P: AsRef<Path>>(path: P, ingredients: &[Ingredient]) -> Result<()> {
    let deduped = dedup_by_code(ingredients.to_vec());
    let json = serde_json::to_string_pretty(&deduped)?;
    fs::write(path, json)?;
    Ok(())
}

/// One row of an ingredient import CSV.
#[derive(Debug, Deserialize)]
struct IngredientRow {
    code: String,
    name: String,
    #[serde(default)]
    n: f64,
    #[serde(default)]
    p: f64,
    #[serde(default)]
    k: f64,
    #[serde(default)]
    s: f64,
    #[serde(default)]
    ca: f64,
    #[serde(default)]
    cost_per_ton: f64,
    #[serde(default)]
    available: Option<bool>,
}

/// Read ingredients from a CSV with header
/// `code,name,n,p,k,s,ca,cost_per_ton,available`.
///
/// Rows failing validation (blank code, fraction outside 0-100, negative
/// cost) are rejected with the offending line number.
pub fn import_ingredients_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut imported = Vec::new();

    for (i, row) in reader.deserialize::<IngredientRow>().enumerate() {
        let row = row?;
        let mut ingredient = Ingredient::new(
            &row.code,
            &row.name,
            [row.n, row.p, row.k, row.s, row.ca],
            row.cost_per_ton,
        );
        ingredient.available = row.available.unwrap_or(true);

        if !ingredient.is_valid() {
            // +2: header line and 1-based numbering
            return Err(BlendError::InvalidInput(format!(
                "invalid ingredient on line {}: {}",
                i + 2,
                row.code
            )));
        }
        imported.push(ingredient);
    }

    info!(count = imported.len(), "imported ingredients from csv");
    Ok(dedup_by_code(imported))
}

/// Load saved formulations. A missing file means no history yet.
pub fn load_formulations<P: AsRef<Path>>(path: P) -> Result<Vec<Formulation>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no formulation history file");
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let formulations: Vec<Formulation> = serde_json::from_str(&content)?;
    Ok(formulations)
}

pub fn save_formulations<P: AsRef<Path>>(path: P, formulations: &[Formulation]) -> Result<()> {
    let json = serde_json::to_string_pretty(formulations)?;
    fs::write(path, json)?;
    Ok(())
}

/// Append one formulation to the history file, creating it when absent.
pub fn append_formulation<P: AsRef<Path>>(path: P, formulation: Formulation) -> Result<()> {
    let path = path.as_ref();
    let mut formulations = load_formulations(path)?;
    info!(code = %formulation.code, "saving formulation");
    formulations.push(formulation);
    save_formulations(path, &formulations)
}

/// Mark the formulation with `code` as archived and rewrite the history file.
pub fn archive_formulation<P: AsRef<Path>>(path: P, code: &str) -> Result<()> {
    let path = path.as_ref();
    let mut formulations = load_formulations(path)?;
    let formulation = formulations
        .iter_mut()
        .find(|f| f.code.eq_ignore_ascii_case(code.trim()))
        .ok_or_else(|| BlendError::FormulationNotFound(code.to_string()))?;

    formulation.archive();
    info!(code = %formulation.code, "archived formulation");
    save_formulations(path, &formulations)
}

/// Write a blend's line items to a CSV file.
pub fn export_blend_csv<P: AsRef<Path>>(path: P, outcome: &BlendOutcome) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "mixing_order",
        "code",
        "name",
        "mass_kg",
        "percentage",
        "cost_per_ton",
        "line_cost",
    ])?;

    for (i, line) in outcome.lines.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            line.ingredient.code.clone(),
            line.ingredient.name.clone(),
            format!("{:.1}", line.mass),
            format!("{:.2}", line.percentage),
            format!("{:.2}", line.ingredient.cost_per_ton),
            format!("{:.2}", line.cost),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Load solver thresholds from JSON. Missing fields keep their defaults.
pub fn load_solver_config<P: AsRef<Path>>(path: P) -> Result<SolverConfig> {
    let content = fs::read_to_string(path)?;
    let config: SolverConfig = serde_json::from_str(&content)?;
    Ok(config)
}
