//! Types and functions for storing and loading greetings.
//!
//! Two backends serve the same operations: the Postgres greeting table, and
//! an in-process map preloaded with the stock greetings for local use. The
//! server only reads; writes happen out of band through the seed binary.

use crate::infra::{
    config::{StorageBackend, StorageConfig},
    database::{self, DbPool},
    error::{ApiResult, InternalError},
};
use color_eyre::eyre::bail;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::instrument;
use validator::Validate;

/// A stored greeting, keyed by its language code.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow, Validate)]
pub struct GreetingRecord {
    /// The language code the greeting is stored under, e.g. `fr`.
    /// Lookups are exact, so `FR` names a different key than `fr`.
    #[validate(length(min = 1, max = 16))]
    pub language_code: String,
    /// The language display name, e.g. `French`.
    #[validate(length(min = 1))]
    pub language_name: String,
    /// The localized greeting text.
    #[validate(length(min = 1))]
    pub greeting: String,
}

impl GreetingRecord {
    /// Constructs a new [`GreetingRecord`].
    pub fn new(
        language_code: impl Into<String>,
        language_name: impl Into<String>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            language_name: language_name.into(),
            greeting: greeting.into(),
        }
    }
}

/// The stock greeting set.
///
/// Both the memory backend and the seed binary load this same set, so local
/// lookups and a freshly seeded table answer identically.
pub fn seed_greetings() -> Vec<GreetingRecord> {
    vec![
        GreetingRecord::new("en", "English", "Hello SaaS!"),
        GreetingRecord::new("es", "Spanish", "¡Hola SaaS!"),
        GreetingRecord::new("fr", "French", "Bonjour SaaS!"),
        GreetingRecord::new("de", "German", "Hallo SaaS!"),
        GreetingRecord::new("ja", "Japanese", "こんにちは SaaS!"),
        GreetingRecord::new("zh", "Chinese", "你好 SaaS!"),
        GreetingRecord::new("vi", "Vietnamese", "Xin chào SaaS!"),
        GreetingRecord::new("ru", "Russian", "Привет SaaS!"),
    ]
}

/// A greeting store backend.
#[derive(Clone, Debug)]
pub enum GreetingStore {
    /// Greetings read from the Postgres greeting table.
    Postgres(PgGreetingStore),
    /// Greetings served from an in-process map.
    Memory(MemoryGreetingStore),
}

impl GreetingStore {
    /// Constructs the store selected by the configuration.
    pub fn from_config(config: &StorageConfig) -> color_eyre::Result<Self> {
        let store = match config.backend {
            StorageBackend::Memory => GreetingStore::Memory(MemoryGreetingStore::seeded()),
            StorageBackend::Postgres => {
                let db = database::init_db(&config.postgres);
                GreetingStore::Postgres(PgGreetingStore::new(db, config)?)
            }
        };
        Ok(store)
    }

    /// Looks up the greeting stored under a language code.
    ///
    /// Returns `Ok(None)` for an unknown code; only a failing backend
    /// produces an error.
    #[instrument(skip(self))]
    pub async fn fetch_greeting(&self, language_code: &str) -> ApiResult<Option<GreetingRecord>> {
        tracing::info!("Reading greeting");
        let greeting = match self {
            GreetingStore::Postgres(store) => store.fetch_greeting(language_code).await?,
            GreetingStore::Memory(store) => store.fetch_greeting(language_code)?,
        };
        tracing::info!("Found greeting: {:?}", greeting);
        Ok(greeting)
    }

    /// Lists all stored greetings, ordered by language code.
    #[instrument(skip(self))]
    pub async fn list_greetings(&self) -> ApiResult<Vec<GreetingRecord>> {
        tracing::info!("Listing greetings");
        let greetings = match self {
            GreetingStore::Postgres(store) => store.list_greetings().await?,
            GreetingStore::Memory(store) => store.list_greetings()?,
        };
        Ok(greetings)
    }

    /// Inserts a greeting, overwriting any record under the same code.
    #[instrument(skip(self))]
    pub async fn put_greeting(&self, greeting: &GreetingRecord) -> ApiResult<()> {
        tracing::info!("Storing greeting");
        match self {
            GreetingStore::Postgres(store) => store.put_greeting(greeting).await,
            GreetingStore::Memory(store) => store.put_greeting(greeting),
        }
    }
}

/// The Postgres greeting table.
///
/// Every call runs under the configured timeout so a stuck database turns
/// into an error response instead of a hanging request.
#[derive(Clone, Debug)]
pub struct PgGreetingStore {
    db: DbPool,
    timeout: Duration,
    fetch_sql: String,
    list_sql: String,
    put_sql: String,
}

impl PgGreetingStore {
    /// Constructs a store over the configured greeting table.
    ///
    /// The table name is restricted to plain identifiers since it has to be
    /// embedded into the queries.
    pub fn new(db: DbPool, config: &StorageConfig) -> color_eyre::Result<Self> {
        let table = config.table.as_str();
        if !is_identifier(table) {
            bail!("invalid greeting table name: {table:?}");
        }
        Ok(Self {
            db,
            timeout: config.timeout,
            fetch_sql: format!(
                r#"SELECT language_code, language_name, greeting FROM "{table}" WHERE language_code = $1"#
            ),
            list_sql: format!(
                r#"SELECT language_code, language_name, greeting FROM "{table}" ORDER BY language_code"#
            ),
            put_sql: format!(
                r#"INSERT INTO "{table}" (language_code, language_name, greeting) VALUES ($1, $2, $3) ON CONFLICT (language_code) DO UPDATE SET language_name = EXCLUDED.language_name, greeting = EXCLUDED.greeting"#
            ),
        })
    }

    /// Runs a storage future under the configured timeout.
    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> ApiResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(InternalError::StorageTimeout(self.timeout).into()),
        }
    }

    async fn fetch_greeting(&self, language_code: &str) -> ApiResult<Option<GreetingRecord>> {
        self.with_timeout(
            sqlx::query_as::<_, GreetingRecord>(&self.fetch_sql)
                .bind(language_code)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn list_greetings(&self) -> ApiResult<Vec<GreetingRecord>> {
        self.with_timeout(sqlx::query_as::<_, GreetingRecord>(&self.list_sql).fetch_all(&self.db))
            .await
    }

    async fn put_greeting(&self, greeting: &GreetingRecord) -> ApiResult<()> {
        self.with_timeout(
            sqlx::query(&self.put_sql)
                .bind(&greeting.language_code)
                .bind(&greeting.language_name)
                .bind(&greeting.greeting)
                .execute(&self.db),
        )
        .await?;
        Ok(())
    }
}

/// Whether a table name is a plain identifier.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An in-process greeting store.
///
/// Backs local development and tests without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryGreetingStore {
    greetings: Arc<RwLock<HashMap<String, GreetingRecord>>>,
}

impl MemoryGreetingStore {
    /// Constructs an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a store preloaded with the stock greetings.
    pub fn seeded() -> Self {
        let greetings = seed_greetings()
            .into_iter()
            .map(|greeting| (greeting.language_code.clone(), greeting))
            .collect();
        Self {
            greetings: Arc::new(RwLock::new(greetings)),
        }
    }

    fn fetch_greeting(&self, language_code: &str) -> ApiResult<Option<GreetingRecord>> {
        let greetings = self.greetings.read().map_err(|_| poisoned())?;
        Ok(greetings.get(language_code).cloned())
    }

    fn list_greetings(&self) -> ApiResult<Vec<GreetingRecord>> {
        let greetings = self.greetings.read().map_err(|_| poisoned())?;
        let mut all: Vec<GreetingRecord> = greetings.values().cloned().collect();
        all.sort_by(|a, b| a.language_code.cmp(&b.language_code));
        Ok(all)
    }

    fn put_greeting(&self, greeting: &GreetingRecord) -> ApiResult<()> {
        let mut greetings = self.greetings.write().map_err(|_| poisoned())?;
        greetings.insert(greeting.language_code.clone(), greeting.clone());
        Ok(())
    }
}

fn poisoned() -> InternalError {
    InternalError::Other("greeting map poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::DatabaseConfig;

    fn storage_config(table: &str) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Postgres,
            table: table.to_string(),
            timeout: Duration::from_secs(5),
            postgres: DatabaseConfig {
                username: "postgres".to_string(),
                password: "postgres".to_string(),
                port: 5432,
                database_name: "greetings".to_string(),
                host: "localhost".to_string(),
            },
        }
    }

    #[test]
    fn seed_set_has_unique_valid_records() {
        let greetings = seed_greetings();
        assert_eq!(8, greetings.len());
        let mut codes: Vec<&str> = greetings.iter().map(|g| g.language_code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(8, codes.len());
        for greeting in &greetings {
            greeting.validate().unwrap();
        }
    }

    #[test]
    fn record_with_empty_fields_fails_validation() {
        let record = GreetingRecord::new("", "Nowhere", "");
        assert!(record.validate().is_err());
    }

    #[tokio::test]
    async fn memory_store_finds_seeded_codes() {
        let store = GreetingStore::Memory(MemoryGreetingStore::seeded());
        for code in ["en", "es", "fr", "de", "ja", "zh", "vi", "ru"] {
            let greeting = store.fetch_greeting(code).await.unwrap();
            assert_eq!(code, greeting.unwrap().language_code);
        }
    }

    #[tokio::test]
    async fn memory_store_misses_unknown_code() {
        let store = GreetingStore::Memory(MemoryGreetingStore::seeded());
        assert_eq!(None, store.fetch_greeting("xx").await.unwrap());
    }

    #[tokio::test]
    async fn memory_store_lookup_is_case_sensitive() {
        let store = GreetingStore::Memory(MemoryGreetingStore::seeded());
        assert_eq!(None, store.fetch_greeting("EN").await.unwrap());
        assert_eq!(None, store.fetch_greeting("Fr").await.unwrap());
    }

    #[tokio::test]
    async fn memory_store_lists_in_code_order() {
        let store = GreetingStore::Memory(MemoryGreetingStore::seeded());
        let codes: Vec<String> = store
            .list_greetings()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.language_code)
            .collect();
        assert_eq!(vec!["de", "en", "es", "fr", "ja", "ru", "vi", "zh"], codes);
    }

    #[tokio::test]
    async fn put_overwrites_existing_code() {
        let store = GreetingStore::Memory(MemoryGreetingStore::new());
        store
            .put_greeting(&GreetingRecord::new("en", "English", "Hello SaaS!"))
            .await
            .unwrap();
        store
            .put_greeting(&GreetingRecord::new("en", "English", "Hi SaaS!"))
            .await
            .unwrap();
        let greeting = store.fetch_greeting("en").await.unwrap().unwrap();
        assert_eq!("Hi SaaS!", greeting.greeting);
        assert_eq!(1, store.list_greetings().await.unwrap().len());
    }

    #[test]
    fn table_names_are_restricted_to_identifiers() {
        assert!(is_identifier("greetings"));
        assert!(is_identifier("greetings_v2"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2greetings"));
        assert!(!is_identifier("greetings; drop table users"));
        assert!(!is_identifier("greetings\""));
    }

    #[tokio::test]
    async fn pg_store_rejects_bad_table_name() {
        let config = storage_config("bad table");
        let db = database::init_db(&config.postgres);
        assert!(PgGreetingStore::new(db, &config).is_err());
    }

    #[tokio::test]
    async fn pg_store_accepts_overridden_table_name() {
        let config = storage_config("greetings_eu");
        let db = database::init_db(&config.postgres);
        assert!(PgGreetingStore::new(db, &config).is_ok());
    }
}
