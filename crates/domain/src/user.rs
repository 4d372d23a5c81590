use crate::shared::id::ID;

/// A `User` that has not been persisted yet. The `ID` is assigned
/// by the store when it is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    /// Seed for the time based one time passwords used as second factor
    pub totp_key: String,
    /// Encrypted blob with the rest of the account attributes
    pub data: Option<String>,
    pub create_date: i64,
    pub update_date: i64,
    /// Version of the `data` format, managed by the caller
    pub v: i32,
}

/// A persisted user account, identified by its `email`
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub password_hash: String,
    pub totp_key: String,
    pub data: Option<String>,
    pub create_date: i64,
    pub update_date: i64,
    pub v: i32,
}

impl User {
    pub fn from_new(id: ID, user: NewUser) -> Self {
        Self {
            id,
            email: user.email,
            password_hash: user.password_hash,
            totp_key: user.totp_key,
            data: user.data,
            create_date: user.create_date,
            update_date: user.update_date,
            v: user.v,
        }
    }

    /// The state of this `User` after the given update has been stored
    pub fn apply(mut self, update: UserUpdate) -> Self {
        if let Some(data) = update.data {
            self.data = Some(data);
        }
        if let Some(password_hash) = update.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(totp_key) = update.totp_key {
            self.totp_key = totp_key;
        }
        if let Some(update_date) = update.update_date {
            self.update_date = update_date;
        }
        if let Some(v) = update.v {
            self.v = v;
        }
        self
    }
}

/// The fields of a `User` that are allowed to change after registration.
/// A field set to `None` is left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub data: Option<String>,
    pub password_hash: Option<String>,
    pub totp_key: Option<String>,
    pub update_date: Option<i64>,
    pub v: Option<i32>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.password_hash.is_none()
            && self.totp_key.is_none()
            && self.update_date.is_none()
            && self.v.is_none()
    }

    /// Keeps only the fields that would actually change the given `User`
    pub fn diff(&self, user: &User) -> Self {
        Self {
            data: changed(&self.data, user.data.as_ref()),
            password_hash: changed(&self.password_hash, Some(&user.password_hash)),
            totp_key: changed(&self.totp_key, Some(&user.totp_key)),
            update_date: changed(&self.update_date, Some(&user.update_date)),
            v: changed(&self.v, Some(&user.v)),
        }
    }
}

fn changed<T: PartialEq + Clone>(update: &Option<T>, current: Option<&T>) -> Option<T> {
    match update {
        Some(val) if current != Some(val) => Some(val.clone()),
        _ => None,
    }
}
