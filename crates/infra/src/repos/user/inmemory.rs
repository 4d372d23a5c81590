use super::IUserRepo;
use crate::error::{Result, UserStoreError};
use crate::repos::shared::{
    inmemory_repo::*,
    repo::{DeleteResult, UpdateResult},
};
use user_store_domain::{NewUser, User, UserUpdate, ID};

/// Keeps the same guarantees as the mongo collection: unique emails,
/// set-only conditional updates and single document deletes.
pub struct InMemoryUserRepo {
    users: std::sync::Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    /// Email uniqueness is checked on every insert
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let user = User::from_new(ID::new(), user);
        if insert_unique(user.clone(), &self.users, |u| u.email == user.email) {
            Ok(user)
        } else {
            Err(UserStoreError::Conflict(user.email))
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(find_one_by(&self.users, |u| u.email == email))
    }

    async fn update(&self, current: &User, update: &UserUpdate) -> Result<UpdateResult> {
        let res = update_one_by(
            &self.users,
            |u| u.id == current.id && holds_expected_values(u, current, update),
            |u| *u = u.clone().apply(update.clone()),
        );
        Ok(res)
    }

    async fn delete_by_email(&self, email: &str) -> Result<DeleteResult> {
        Ok(delete_one_by(&self.users, |u| u.email == email))
    }
}

/// Every field touched by `update` must still hold the value it had in `expected`
fn holds_expected_values(stored: &User, expected: &User, update: &UserUpdate) -> bool {
    (update.data.is_none() || stored.data == expected.data)
        && (update.password_hash.is_none() || stored.password_hash == expected.password_hash)
        && (update.totp_key.is_none() || stored.totp_key == expected.totp_key)
        && (update.update_date.is_none() || stored.update_date == expected.update_date)
        && (update.v.is_none() || stored.v == expected.v)
}
