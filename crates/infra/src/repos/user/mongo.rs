use super::IUserRepo;
use crate::error::{Result, UserStoreError};
use crate::repos::shared::mongo_repo::{self, MongoDocument};
use crate::repos::shared::repo::{DeleteResult, UpdateResult};
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    Collection, Database,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use user_store_domain::{NewUser, User, UserUpdate, ID};

const USER_COLLECTION: &str = "users";

pub struct MongoUserRepo {
    collection: Collection<Document>,
}

impl MongoUserRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USER_COLLECTION),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for MongoUserRepo {
    async fn ensure_indexes(&self) -> Result<()> {
        mongo_repo::ensure_unique_index(&self.collection, "email").await
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let raw = NewUserMongo::from_domain(&user);
        match mongo_repo::insert(&self.collection, &raw).await {
            Ok(Some(oid)) => Ok(User::from_new(ID::from(oid), user)),
            // Only reachable if the server reports a non `ObjectId` id
            Ok(None) => Err(UserStoreError::Persistence(
                "Unable to insert new user".into(),
            )),
            Err(UserStoreError::Database(e)) if mongo_repo::is_duplicate_key_error(&e) => {
                Err(UserStoreError::Conflict(user.email))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let filter = doc! {
            "email": email
        };
        mongo_repo::find_one_by::<_, UserMongo>(&self.collection, filter).await
    }

    async fn update(&self, current: &User, update: &UserUpdate) -> Result<UpdateResult> {
        let (filter, set) = conditional_update(current, update);
        mongo_repo::update_one(&self.collection, filter, set).await
    }

    async fn delete_by_email(&self, email: &str) -> Result<DeleteResult> {
        let filter = doc! {
            "email": email
        };
        mongo_repo::delete_one_by(&self.collection, filter).await
    }
}

/// Builds the filter and the `$set` document for an update. The filter
/// requires every changed field to still hold the value in `current`, so the
/// server applies the update atomically or matches nothing.
fn conditional_update(current: &User, update: &UserUpdate) -> (Document, Document) {
    let mut filter = doc! {
        "_id": *current.id.inner_ref()
    };
    let mut set = Document::new();

    if let Some(data) = &update.data {
        // `null` also matches documents where the field is missing
        let expected = match &current.data {
            Some(data) => Bson::String(data.clone()),
            None => Bson::Null,
        };
        filter.insert("data", expected);
        set.insert("data", data.clone());
    }
    if let Some(password_hash) = &update.password_hash {
        filter.insert("passwordHash", current.password_hash.clone());
        set.insert("passwordHash", password_hash.clone());
    }
    if let Some(totp_key) = &update.totp_key {
        filter.insert("totpKey", current.totp_key.clone());
        set.insert("totpKey", totp_key.clone());
    }
    if let Some(update_date) = update.update_date {
        filter.insert("updateDate", current.update_date);
        set.insert("updateDate", update_date);
    }
    if let Some(v) = update.v {
        filter.insert("v", current.v);
        set.insert("v", v);
    }

    (filter, set)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewUserMongo<'a> {
    email: &'a str,
    password_hash: &'a str,
    totp_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    create_date: i64,
    update_date: i64,
    v: i32,
}

impl<'a> NewUserMongo<'a> {
    fn from_domain(user: &'a NewUser) -> Self {
        Self {
            email: &user.email,
            password_hash: &user.password_hash,
            totp_key: &user.totp_key,
            data: user.data.as_deref(),
            create_date: user.create_date,
            update_date: user.update_date,
            v: user.v,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserMongo {
    #[serde(rename = "_id")]
    id: ObjectId,
    email: String,
    password_hash: String,
    totp_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(deserialize_with = "deserialize_integer")]
    create_date: i64,
    #[serde(deserialize_with = "deserialize_integer")]
    update_date: i64,
    #[serde(deserialize_with = "deserialize_version")]
    v: i32,
}

impl MongoDocument<User> for UserMongo {
    fn to_domain(self) -> User {
        User {
            id: ID::from(self.id),
            email: self.email,
            password_hash: self.password_hash,
            totp_key: self.totp_key,
            data: self.data,
            create_date: self.create_date,
            update_date: self.update_date,
            v: self.v,
        }
    }
}

/// Numbers written by other drivers may be stored as doubles
/// (e.g. millisecond timestamps that do not fit in an int32).
fn deserialize_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<i64, D::Error> {
    match Bson::deserialize(deserializer)? {
        Bson::Int32(val) => Ok(val as i64),
        Bson::Int64(val) => Ok(val),
        Bson::Double(val) if val.fract() == 0.0 && val.abs() < i64::MAX as f64 => {
            Ok(val as i64)
        }
        other => Err(D::Error::custom(format!(
            "expected an integer, found: {}",
            other
        ))),
    }
}

fn deserialize_version<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<i32, D::Error> {
    let val = deserialize_integer(deserializer)?;
    i32::try_from(val).map_err(|_| D::Error::custom(format!("version out of range: {}", val)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    fn get_user() -> User {
        User {
            id: ID::new(),
            email: "a@x.com".into(),
            password_hash: "h".into(),
            totp_key: "t".into(),
            data: None,
            create_date: 1,
            update_date: 1,
            v: 1,
        }
    }

    #[test]
    fn it_serializes_new_user_with_camel_case_keys() {
        let user = NewUser {
            email: "a@x.com".into(),
            password_hash: "h".into(),
            totp_key: "t".into(),
            data: None,
            create_date: 1,
            update_date: 2,
            v: 1,
        };
        let doc = mongo_repo::to_persistence(&NewUserMongo::from_domain(&user)).unwrap();
        assert_eq!(doc.get_str("passwordHash").unwrap(), "h");
        assert_eq!(doc.get_str("totpKey").unwrap(), "t");
        assert_eq!(doc.get_i64("updateDate").unwrap(), 2);
        assert_eq!(doc.get_i32("v").unwrap(), 1);
        assert!(!doc.contains_key("data"));
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn it_reads_numbers_stored_as_doubles() {
        let oid = ObjectId::new();
        let doc = doc! {
            "_id": oid,
            "email": "a@x.com",
            "passwordHash": "h",
            "totpKey": "t",
            "data": "blob",
            "createDate": 1_600_000_000_000.0_f64,
            "updateDate": 1_600_000_000_001_i64,
            "v": 3.0_f64,
        };
        let user = bson::from_document::<UserMongo>(doc).unwrap().to_domain();
        assert_eq!(user.id.as_string(), oid.to_hex());
        assert_eq!(user.create_date, 1_600_000_000_000);
        assert_eq!(user.update_date, 1_600_000_000_001);
        assert_eq!(user.v, 3);
        assert_eq!(user.data.as_deref(), Some("blob"));
    }

    #[test]
    fn it_rejects_fractional_timestamps() {
        let doc = doc! {
            "_id": ObjectId::new(),
            "email": "a@x.com",
            "passwordHash": "h",
            "totpKey": "t",
            "createDate": 1.5_f64,
            "updateDate": 1,
            "v": 1,
        };
        assert!(bson::from_document::<UserMongo>(doc).is_err());
    }

    #[test]
    fn it_builds_conditional_update_for_changed_fields_only() {
        let user = get_user();
        let update = UserUpdate {
            data: Some("blob".into()),
            v: Some(2),
            ..Default::default()
        };

        let (filter, set) = conditional_update(&user, &update);
        assert_eq!(
            filter,
            doc! {
                "_id": *user.id.inner_ref(),
                "data": Bson::Null,
                "v": 1,
            }
        );
        assert_eq!(
            set,
            doc! {
                "data": "blob",
                "v": 2,
            }
        );
    }
}
