pub mod config;
pub mod constants;
pub mod evaluator;
pub mod linear;
pub mod orchestrator;
pub mod refiner;
pub mod sequencer;

pub use config::SolverConfig;
pub use constants::*;
pub use evaluator::{build_outcome, deviations, evaluate, round_to, within_band, Evaluation};
pub use linear::{LinearSolveError, LinearSystem};
pub use orchestrator::{solve, solve_with};
pub use refiner::{refine, RefineOutcome};
pub use sequencer::{RequestId, RequestSequencer};
