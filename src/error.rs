use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// The input table cannot be turned into a dataset at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Input table is empty (no header or no data rows).")]
    EmptyInput,

    #[error("Missing required column `date` (found: {})", .columns.join(", "))]
    MissingDateColumn { columns: Vec<String> },
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::new(2, err.to_string())
    }
}

/// Numerical or calendar failure while fitting/extrapolating a trend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Forecast date out of range: {months} month(s) after {from}")]
    DateOutOfRange { from: chrono::NaiveDate, months: u32 },

    #[error("Least-squares solve failed for {points} points")]
    Solver { points: usize },
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(4, err.to_string())
    }
}
