mod shared;
mod user;

pub use shared::id::ID;
pub use user::{NewUser, User, UserUpdate};
