//! Seeds the greeting table with the stock greeting set.
//!
//! The server itself never writes; this binary is the out-of-band write
//! path. It runs the migrations, then upserts each stock greeting into the
//! configured table, so re-running it is safe. It always targets the
//! Postgres backend regardless of which backend the server is configured to
//! serve from.

use greeting_api::{
    api::greeting::{
        greeting_repository::{GreetingStore, PgGreetingStore},
        greeting_service,
    },
    infra::{config, database, logging},
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let _guard = logging::init_logging();

    let config = config::load_config()?;
    let db = database::init_db(&config.storage.postgres);

    tracing::info!("Running migrations");
    sqlx::migrate!().run(&db).await?;

    tracing::info!("Seeding greetings into table {}", config.storage.table);
    let store = GreetingStore::Postgres(PgGreetingStore::new(db, &config.storage)?);
    let report = greeting_service::seed(&store).await;
    tracing::info!("Seeded {} greetings, {} failed", report.added, report.failed);

    Ok(())
}
