use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepasoError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Unrecognized header: expected '{expected}', found '{found}'")]
    BadHeader { expected: String, found: String },

    #[error("No usable rows in review data")]
    EmptyDataset,

    #[error("Failed to load file: {0}")]
    FailedToLoadFile(String),

    #[error("RepasoError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for RepasoError {
    fn from(error: std::io::Error) -> Self {
        RepasoError::Io(Box::new(error))
    }
}
