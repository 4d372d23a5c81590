mod telemetry;

use telemetry::{get_subscriber, init_subscriber};
use tracing::info;
use user_store_infra::{Config, UserStore};

/// Asserts the `users` schema (the unique `email` index) and exits.
/// Run it once on deploy before starting the services using the store.
///
/// `cargo run inmemory` runs against the inmemory store instead.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("user_store".into(), "info".into());
    init_subscriber(subscriber)?;

    let args: Vec<String> = std::env::args().collect();
    let mut store = if args.last().map(String::as_str) == Some("inmemory") {
        info!("Inmemory argument provided. Going to use inmemory store.");
        UserStore::create_inmemory()
    } else {
        UserStore::new(Config::from_env()?)?
    };

    store.connect().await?;
    info!("User store schema is in place");
    store.close().await;

    Ok(())
}
