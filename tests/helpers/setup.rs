use user_store_domain::NewUser;
use user_store_infra::{Config, UserStore};
use user_store_utils::create_test_database_name;

/// Connected stores to run a test against. Always contains an inmemory store,
/// and a mongo store using a fresh database when `MONGODB_CONNECTION_STRING` is set.
pub async fn spawn_stores() -> Vec<UserStore> {
    let mut stores = vec![UserStore::create_inmemory()];

    if let Ok(config) = Config::from_env() {
        let config = config.with_database_name(create_test_database_name("user_store_test"));
        stores.push(UserStore::new(config).expect("Valid mongo config"));
    }

    for store in stores.iter_mut() {
        store.connect().await.expect("To connect user store");
    }
    stores
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password_hash: "h".into(),
        totp_key: "t".into(),
        data: None,
        create_date: 1,
        update_date: 1,
        v: 1,
    }
}
