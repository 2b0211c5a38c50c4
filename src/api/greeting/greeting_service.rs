//! Greeting lookup and seeding operations.

use super::greeting_repository::{seed_greetings, GreetingRecord, GreetingStore};
use crate::infra::error::{ApiResult, ClientError};
use tracing::instrument;
use validator::Validate;

/// The language code served when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Resolves which language code to look up.
///
/// A missing or empty parameter falls back to [`DEFAULT_LANGUAGE`]; anything
/// else is used as given, without trimming or case folding.
#[instrument(ret)]
pub fn resolve_language(lang: Option<&str>) -> &str {
    match lang {
        Some(lang) if !lang.is_empty() => lang,
        _ => DEFAULT_LANGUAGE,
    }
}

/// Looks up the greeting for a language code.
///
/// An unknown code is a [`ClientError::LanguageNotFound`], never a storage
/// failure.
#[instrument(skip(store))]
pub async fn lookup(store: &GreetingStore, language_code: &str) -> ApiResult<GreetingRecord> {
    let greeting = store.fetch_greeting(language_code).await?;
    greeting.ok_or_else(|| ClientError::LanguageNotFound.into())
}

/// Lists every stored greeting, ordered by language code.
#[instrument(skip(store))]
pub async fn list(store: &GreetingStore) -> ApiResult<Vec<GreetingRecord>> {
    store.list_greetings().await
}

/// The outcome of a seeding run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Records written.
    pub added: usize,
    /// Records that failed validation or the storage write.
    pub failed: usize,
}

/// Writes the stock greeting set into the store, one record at a time.
///
/// A failing record is logged and skipped; the run continues to the end
/// regardless.
#[instrument(skip(store))]
pub async fn seed(store: &GreetingStore) -> SeedReport {
    let mut report = SeedReport::default();
    for greeting in seed_greetings() {
        match put_greeting(store, &greeting).await {
            Ok(()) => {
                tracing::info!("Added {} greeting", greeting.language_name);
                report.added += 1;
            }
            Err(e) => {
                tracing::error!("Failed to add {} greeting: {}", greeting.language_name, e);
                report.failed += 1;
            }
        }
    }
    tracing::info!("Greeting seeding complete");
    report
}

async fn put_greeting(store: &GreetingStore, greeting: &GreetingRecord) -> ApiResult<()> {
    greeting.validate()?;
    store.put_greeting(greeting).await
}
