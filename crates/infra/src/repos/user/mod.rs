mod inmemory;
mod mongo;

use crate::error::Result;
use crate::repos::shared::repo::{DeleteResult, UpdateResult};
pub use inmemory::InMemoryUserRepo;
pub use mongo::MongoUserRepo;
use user_store_domain::{NewUser, User, UserUpdate};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    /// Declares the indexes the collection depends on. Safe to call repeatedly.
    async fn ensure_indexes(&self) -> Result<()>;
    /// Fails with `UserStoreError::Conflict` when the email is already taken
    async fn insert(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Sets the fields of `update` on the stored `current` user, but only
    /// if every one of those fields still holds the value in `current`.
    async fn update(&self, current: &User, update: &UserUpdate) -> Result<UpdateResult>;
    async fn delete_by_email(&self, email: &str) -> Result<DeleteResult>;
}
