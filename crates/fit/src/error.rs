use std::fmt;

#[derive(Debug)]
pub enum ChartError {
    /// Size chart or product record is not valid JSON for its schema.
    Json(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Json(msg) => write!(f, "size chart error: {msg}"),
        }
    }
}

impl std::error::Error for ChartError {}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::Json(err.to_string())
    }
}
