use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("unknown status value: {0}")]
    UnknownStatus(String),
    #[error("status payload is not an object")]
    NotAnObject,
    #[error("status payload is missing field `{0}`")]
    MissingField(&'static str),
    #[error("malformed status payload: {0}")]
    Malformed(String),
}
