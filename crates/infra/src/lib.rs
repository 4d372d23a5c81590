mod config;
mod error;
mod repos;
mod store;

pub use config::Config;
pub use error::{Result, UserStoreError};
pub use repos::{DeleteResult, IUserRepo, InMemoryUserRepo, MongoUserRepo, UpdateResult};
pub use store::UserStore;
