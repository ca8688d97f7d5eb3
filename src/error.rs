use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlendError {
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Formulation not found: {0}")]
    FormulationNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot save an unsuccessful blend: {0}")]
    UnsavableResult(String),

    #[error("No available ingredients")]
    NoAvailableIngredients,
}

pub type Result<T> = std::result::Result<T, BlendError>;
