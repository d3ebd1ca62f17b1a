use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid reference table: {0}")]
    Table(String),

    #[error("Input validation error: {0}")]
    Validation(String),
}

pub type DoseResult<T> = Result<T, DoseError>;
