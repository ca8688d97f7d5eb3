use std::collections::HashMap;

use strsim::jaro_winkler;
use tracing::debug;

use crate::error::{BlendError, Result};
use crate::models::Ingredient;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Manages the ingredient catalog: lookup, availability and candidate selection.
///
/// Ingredients keep their catalog order, which is also the order candidates
/// are handed to the solver.
pub struct IngredientCatalog {
    ingredients: Vec<Ingredient>,
    /// Lowercase code -> position in `ingredients`.
    index: HashMap<String, usize>,
}

impl IngredientCatalog {
    /// Create a catalog, deduplicating by code (last occurrence wins) and
    /// assigning ids to ingredients that have none.
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let mut catalog = Self {
            ingredients: Vec::with_capacity(ingredients.len()),
            index: HashMap::new(),
        };
        for ingredient in ingredients {
            catalog.upsert(ingredient);
        }
        catalog
    }

    fn next_id(&self) -> u32 {
        self.ingredients.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    /// Insert or replace by code. Returns true when a new entry was added.
    pub fn upsert(&mut self, mut ingredient: Ingredient) -> bool {
        match self.index.get(&ingredient.key()) {
            Some(&pos) => {
                if ingredient.id == 0 {
                    ingredient.id = self.ingredients[pos].id;
                }
                self.ingredients[pos] = ingredient;
                false
            }
            None => {
                if ingredient.id == 0 || self.ingredients.iter().any(|i| i.id == ingredient.id) {
                    ingredient.id = self.next_id();
                }
                self.index.insert(ingredient.key(), self.ingredients.len());
                self.ingredients.push(ingredient);
                true
            }
        }
    }

    /// Merge imported ingredients. Returns (added, updated).
    pub fn merge(&mut self, imported: Vec<Ingredient>) -> (usize, usize) {
        let mut added = 0;
        let mut updated = 0;
        for ingredient in imported {
            if self.upsert(ingredient) {
                added += 1;
            } else {
                updated += 1;
            }
        }
        debug!(added, updated, "merged ingredients into catalog");
        (added, updated)
    }

    /// Get an ingredient by code or name (case-insensitive).
    pub fn get(&self, code_or_name: &str) -> Option<&Ingredient> {
        let key = code_or_name.trim().to_lowercase();
        self.index
            .get(&key)
            .map(|&pos| &self.ingredients[pos])
            .or_else(|| self.ingredients.iter().find(|i| i.name.to_lowercase() == key))
    }

    /// Get a mutable reference by code or name (case-insensitive).
    pub fn get_mut(&mut self, code_or_name: &str) -> Option<&mut Ingredient> {
        let key = code_or_name.trim().to_lowercase();
        let pos = self
            .index
            .get(&key)
            .copied()
            .or_else(|| self.ingredients.iter().position(|i| i.name.to_lowercase() == key))?;
        self.ingredients.get_mut(pos)
    }

    /// Toggle availability of an ingredient.
    pub fn set_available(&mut self, code: &str, available: bool) -> Result<()> {
        let ingredient = self
            .get_mut(code)
            .ok_or_else(|| BlendError::IngredientNotFound(code.to_string()))?;
        ingredient.available = available;
        Ok(())
    }

    /// All ingredients marked available, in catalog order.
    pub fn all_available(&self) -> Vec<&Ingredient> {
        self.ingredients.iter().filter(|i| i.available).collect()
    }

    pub fn all(&self) -> Vec<&Ingredient> {
        self.ingredients.iter().collect()
    }

    /// Ingredients close to `query` by code or name, best first.
    pub fn suggest(&self, query: &str) -> Vec<&Ingredient> {
        let query = query.trim().to_lowercase();
        let mut scored: Vec<(&Ingredient, f64)> = self
            .ingredients
            .iter()
            .map(|i| {
                let by_code = jaro_winkler(&i.code.to_lowercase(), &query);
                let by_name = jaro_winkler(&i.name.to_lowercase(), &query);
                (i, by_code.max(by_name))
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(3).map(|(i, _)| i).collect()
    }

    /// Resolve a list of codes/names into solver candidates.
    ///
    /// Unknown names fail with suggestions; unavailable ingredients are rejected.
    pub fn select(&self, codes: &[String]) -> Result<Vec<Ingredient>> {
        let mut selected: Vec<Ingredient> = Vec::with_capacity(codes.len());

        for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            let ingredient = match self.get(code) {
                Some(i) => i,
                None => {
                    let hints: Vec<String> =
                        self.suggest(code).iter().map(|i| i.code.clone()).collect();
                    let msg = if hints.is_empty() {
                        code.to_string()
                    } else {
                        format!("{} (did you mean: {}?)", code, hints.join(", "))
                    };
                    return Err(BlendError::IngredientNotFound(msg));
                }
            };

            if !ingredient.available {
                return Err(BlendError::InvalidInput(format!(
                    "{} is not available",
                    ingredient.code
                )));
            }

            if !selected.contains(ingredient) {
                selected.push(ingredient.clone());
            }
        }

        Ok(selected)
    }

    /// Convert to a list for JSON serialization.
    pub fn to_ingredients(&self) -> Vec<Ingredient> {
        self.ingredients.clone()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ingredients() -> Vec<Ingredient> {
        let mut gypsum = Ingredient::new("GYP", "Gypsum", [0.0, 0.0, 0.0, 15.0, 20.0], 400.0);
        gypsum.available = false;
        vec![
            Ingredient::new("UREA", "Urea", [46.0, 0.0, 0.0, 0.0, 0.0], 2500.0),
            Ingredient::new("MAP", "Monoammonium phosphate", [11.0, 52.0, 0.0, 0.0, 0.0], 3800.0),
            Ingredient::new("KCL", "Potassium chloride", [0.0, 0.0, 60.0, 0.0, 0.0], 3100.0),
            gypsum,
        ]
    }

    #[test]
    fn test_ids_assigned_in_order() {
        let catalog = IngredientCatalog::new(sample_ingredients());
        let ids: Vec<u32> = catalog.all().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_get_by_code_or_name() {
        let catalog = IngredientCatalog::new(sample_ingredients());
        assert!(catalog.get("urea").is_some());
        assert!(catalog.get("KCL").is_some());
        assert_eq!(catalog.get("potassium chloride").map(|i| i.code.as_str()), Some("KCL"));
        assert!(catalog.get("borax").is_none());
    }

    #[test]
    fn test_duplicate_code_last_wins() {
        let mut items = sample_ingredients();
        items.push(Ingredient::new("urea", "Urea (bulk)", [45.0, 0.0, 0.0, 0.0, 0.0], 2300.0));
        let catalog = IngredientCatalog::new(items);

        assert_eq!(catalog.len(), 4);
        let urea = catalog.get("UREA").unwrap();
        assert_eq!(urea.cost_per_ton, 2300.0);
        assert_eq!(urea.id, 1);
    }

    #[test]
    fn test_all_available_and_toggle() {
        let mut catalog = IngredientCatalog::new(sample_ingredients());
        assert_eq!(catalog.all_available().len(), 3);

        catalog.set_available("gyp", true).unwrap();
        assert_eq!(catalog.all_available().len(), 4);
        assert!(catalog.set_available("nope", true).is_err());
    }

    #[test]
    fn test_select_preserves_order_and_dedups() {
        let catalog = IngredientCatalog::new(sample_ingredients());
        let codes = vec!["kcl".to_string(), "UREA".to_string(), "KCL".to_string()];
        let selected = catalog.select(&codes).unwrap();
        let codes: Vec<&str> = selected.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["KCL", "UREA"]);
    }

    #[test]
    fn test_select_rejects_unknown_with_suggestion() {
        let catalog = IngredientCatalog::new(sample_ingredients());
        let err = catalog.select(&["ureaa".to_string()]).unwrap_err();
        assert!(err.to_string().contains("UREA"));
    }

    #[test]
    fn test_select_rejects_unavailable() {
        let catalog = IngredientCatalog::new(sample_ingredients());
        assert!(catalog.select(&["GYP".to_string()]).is_err());
    }

    #[test]
    fn test_merge_counts() {
        let mut catalog = IngredientCatalog::new(sample_ingredients());
        let (added, updated) = catalog.merge(vec![
            Ingredient::new("UREA", "Urea", [46.0, 0.0, 0.0, 0.0, 0.0], 2600.0),
            Ingredient::new("AS", "Ammonium sulfate", [21.0, 0.0, 0.0, 24.0, 0.0], 1900.0),
        ]);
        assert_eq!((added, updated), (1, 1));
        assert_eq!(catalog.get("AS").unwrap().id, 5);
    }
}
