use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum InferError {
    /// Model could not be loaded or warmed up.
    Init(String),
    /// Frame or model tensor with unexpected dimensions.
    Shape(String),
    Runtime(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Init(msg) => write!(f, "model initialization error: {msg}"),
            InferError::Shape(msg) => write!(f, "shape error: {msg}"),
            InferError::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}
