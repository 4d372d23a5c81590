use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserStoreError {
    #[error("Invalid configuration. Error message: `{0}`")]
    Configuration(String),
    #[error("The user store is not connected, call `connect` first")]
    NotConnected,
    #[error("Unable to find a user with the email: `{0}`")]
    NotFound(String),
    #[error("A user with the email: `{0}` already exists")]
    Conflict(String),
    #[error("Persistence failure. Error message: `{0}`")]
    Persistence(String),
    #[error("Malformed user document. Error message: `{0}`")]
    MalformedDocument(String),
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, UserStoreError>;
