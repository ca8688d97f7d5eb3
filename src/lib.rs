pub mod cli;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod solver;
pub mod state;

pub use error::{BlendError, Result};
pub use models::{BlendResult, FailureReason, Ingredient, Nutrient, TargetComposition};
pub use solver::{solve, solve_with, SolverConfig};
