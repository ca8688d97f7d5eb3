mod blend;
mod formulation;
mod ingredient;
mod nutrient;
mod target;

pub use blend::{
    format_deviations, Allocation, BlendLine, BlendOutcome, BlendResult, FailureReason, SolveMethod,
};
pub use formulation::{Formulation, FormulationItem, FormulationStatus};
pub use ingredient::Ingredient;
pub use nutrient::{Nutrient, NutrientProfile};
pub use target::TargetComposition;
