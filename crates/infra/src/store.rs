use crate::config::Config;
use crate::error::{Result, UserStoreError};
use crate::repos::{IUserRepo, InMemoryUserRepo, MongoUserRepo};
use mongodb::{error::ErrorKind, options::ClientOptions, Client, Database};
use std::sync::Arc;
use tracing::{debug, error, info};
use user_store_domain::{NewUser, User, UserUpdate};

/// Used when neither the `Config` nor the connection string names a database
const DEFAULT_DATABASE_NAME: &str = "test";

enum Backend {
    Mongo(Config),
    Repo(Arc<dyn IUserRepo>),
}

struct Connection {
    /// `None` for the inmemory backend
    client: Option<Client>,
    users: Arc<dyn IUserRepo>,
}

/// Stores user accounts in the `users` collection, one account per email.
///
/// `connect` has to be called before any of the other operations,
/// which otherwise fail with `UserStoreError::NotConnected`.
pub struct UserStore {
    backend: Backend,
    connection: Option<Connection>,
}

impl UserStore {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend: Backend::Mongo(config),
            connection: None,
        })
    }

    /// Store that keeps everything in memory, useful for testing.
    /// Users survive `close` and a later `connect`.
    pub fn create_inmemory() -> Self {
        Self {
            backend: Backend::Repo(Arc::new(InMemoryUserRepo::new())),
            connection: None,
        }
    }

    #[cfg(test)]
    fn with_repo(users: Arc<dyn IUserRepo>) -> Self {
        Self {
            backend: Backend::Repo(users),
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the connection and makes sure the unique index on `email` exists
    #[tracing::instrument(name = "Connecting user store", skip(self))]
    pub async fn connect(&mut self) -> Result<()> {
        if self.connection.is_some() {
            debug!("User store is already connected");
            return Ok(());
        }

        let connection = match &self.backend {
            Backend::Mongo(config) => connect_mongodb(config).await.map_err(log_error)?,
            Backend::Repo(repo) => Connection {
                client: None,
                users: repo.clone(),
            },
        };

        // This is also the first round trip to the database, so it
        // verifies that it is reachable and that we are authorized
        info!("Ensuring user indexes ...");
        connection.users.ensure_indexes().await.map_err(log_error)?;
        info!("Ensuring user indexes ... [done]");

        self.connection = Some(connection);
        Ok(())
    }

    #[tracing::instrument(name = "Closing user store", skip(self))]
    pub async fn close(&mut self) {
        match self.connection.take() {
            Some(Connection { client, users }) => {
                drop(users);
                if let Some(client) = client {
                    client.shutdown().await;
                }
                info!("User store connection closed");
            }
            None => debug!("User store is already closed"),
        }
    }

    #[tracing::instrument(name = "Get user by email", skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users()?.find_by_email(email).await.map_err(log_error)
    }

    #[tracing::instrument(name = "Register user", skip(self, user), fields(email = %user.email))]
    pub async fn register_user(&self, user: NewUser) -> Result<User> {
        let user = self.users()?.insert(user).await.map_err(log_error)?;
        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Writes the fields of `update` that differ from the stored user and
    /// returns the user as stored afterwards. Nothing is written when no
    /// field changes.
    ///
    /// The write only succeeds if the changed fields were not modified by
    /// someone else since they were read, otherwise this fails with
    /// `UserStoreError::Persistence` and the caller may retry.
    #[tracing::instrument(name = "Update user", skip(self, update))]
    pub async fn update_user(&self, email: &str, update: UserUpdate) -> Result<User> {
        let users = self.users()?;
        let user = match users.find_by_email(email).await.map_err(log_error)? {
            Some(user) => user,
            None => return Err(log_error(UserStoreError::NotFound(email.to_string()))),
        };

        let diff = update.diff(&user);
        if diff.is_empty() {
            debug!("Update does not change any fields, skipping write");
            return Ok(user);
        }

        let res = users.update(&user, &diff).await.map_err(log_error)?;
        if res.modified_count < 1 {
            return Err(log_error(UserStoreError::Persistence(format!(
                "Unable to update user with email: `{}`, it was changed or removed concurrently",
                email
            ))));
        }

        Ok(user.apply(diff))
    }

    #[tracing::instrument(name = "Delete user", skip(self))]
    pub async fn delete_by_email(&self, email: &str) -> Result<()> {
        let res = self
            .users()?
            .delete_by_email(email)
            .await
            .map_err(log_error)?;
        if res.deleted_count == 0 {
            return Err(log_error(UserStoreError::NotFound(email.to_string())));
        }
        info!("Deleted user");
        Ok(())
    }

    fn users(&self) -> Result<&dyn IUserRepo> {
        match &self.connection {
            Some(connection) => Ok(connection.users.as_ref()),
            None => Err(log_error(UserStoreError::NotConnected)),
        }
    }
}

async fn connect_mongodb(config: &Config) -> Result<Connection> {
    let client_options = ClientOptions::parse(&config.connection_string)
        .await
        .map_err(|e| match e.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => UserStoreError::Configuration(e.to_string()),
            _ => UserStoreError::Database(e),
        })?;
    let client = Client::with_options(client_options)?;
    let db = select_database(&client, config);
    info!("Using database: {}", db.name());

    Ok(Connection {
        users: Arc::new(MongoUserRepo::new(&db)),
        client: Some(client),
    })
}

fn select_database(client: &Client, config: &Config) -> Database {
    match &config.database_name {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE_NAME)),
    }
}

fn log_error(e: UserStoreError) -> UserStoreError {
    error!("User store error: {:?}", e);
    e
}
