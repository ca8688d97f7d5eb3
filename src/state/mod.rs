mod catalog;
mod persistence;

pub use catalog::IngredientCatalog;
pub use persistence::{
    append_formulation, archive_formulation, export_blend_csv, import_ingredients_csv,
    load_formulations, load_ingredients, load_solver_config, save_formulations, save_ingredients,
};
