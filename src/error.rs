use thiserror::Error;

#[derive(Error, Debug)]
pub enum PKError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("Invalid patient parameter: {0}")]
    InvalidParameter(String),
    
    #[error("Invalid dosing regimen: {0}")]
    InvalidRegimen(String),
    
    #[error("Configuration validation error: {0}")]
    Validation(String),
}

pub type PKResult<T> = Result<T, PKError>;
