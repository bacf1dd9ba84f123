use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyDataError {
    #[error("API configuration error")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(String),
    /// The API answered but reported `status: "error"`.
    #[error("{0}")]
    Api(String),
    #[error("Unexpected response: {0}")]
    Deserialize(String),
}
