use crate::error::{Result, UserStoreError};
use tracing::info;

const MONGODB_CONNECTION_STRING: &str = "MONGODB_CONNECTION_STRING";
const MONGODB_NAME: &str = "MONGODB_NAME";

#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the MongoDB deployment holding the `users` collection
    pub connection_string: String,
    /// Database to use instead of the one given in the connection string.
    /// When neither is set the driver default `test` is used.
    pub database_name: Option<String>,
}

impl Config {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: None,
        }
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    /// Reads `MONGODB_CONNECTION_STRING` and the optional `MONGODB_NAME`
    pub fn from_env() -> Result<Self> {
        let connection_string = std::env::var(MONGODB_CONNECTION_STRING).map_err(|_| {
            UserStoreError::Configuration(format!(
                "{} env var to be present.",
                MONGODB_CONNECTION_STRING
            ))
        })?;

        let mut config = Self::new(connection_string);
        if let Ok(db_name) = std::env::var(MONGODB_NAME) {
            info!("{} env var was provided, using database: {}", MONGODB_NAME, db_name);
            config = config.with_database_name(db_name);
        }
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.connection_string.trim().is_empty() {
            return Err(UserStoreError::Configuration(
                "Connection string is missing".into(),
            ));
        }
        if let Some(db_name) = &self.database_name {
            if db_name.trim().is_empty() {
                return Err(UserStoreError::Configuration(
                    "Database name cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
