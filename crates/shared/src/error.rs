use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response body must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("`error` flag must be a boolean, got {0}")]
    InvalidDiscriminant(String),
    #[error("failure response is missing a non-empty `message`")]
    MissingMessage,
    #[error("invalid success payload: {0}")]
    InvalidSuccessPayload(String),
}

impl MalformedResponse {
    pub fn invalid_json(source: &serde_json::Error) -> Self {
        Self::InvalidJson(source.to_string())
    }
}
