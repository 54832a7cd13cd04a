use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Cannot read {source_name} as tabular data: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Required column '{column}' not found in {table} data")]
    Schema { table: String, column: String },

    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SelectError {
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub type SelectResult<T> = Result<T, SelectError>;
