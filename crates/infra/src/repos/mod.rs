mod shared;
mod user;

pub use shared::repo::{DeleteResult, UpdateResult};
pub use user::{IUserRepo, InMemoryUserRepo, MongoUserRepo};
