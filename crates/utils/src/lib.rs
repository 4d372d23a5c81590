use rand::{distributions::Alphanumeric, Rng};

/// MongoDB limits database names to 64 bytes
const MAX_DATABASE_NAME_LEN: usize = 63;

pub fn create_random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Creates a unique database name so that every test run
/// gets its own isolated `users` collection.
pub fn create_test_database_name(prefix: &str) -> String {
    let name = format!("{}_{}", prefix, create_random_string(16).to_lowercase());
    name.chars().take(MAX_DATABASE_NAME_LEN).collect()
}
