//! Implementation of the greeting API. An API that returns a localized
//! greeting based on a language code query parameter.

use super::greeting_repository::{GreetingRecord, GreetingStore};
use super::greeting_service;
use crate::infra::{error::ApiResult, extract::Query, state::AppState};
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

/// The greeting API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/greeting", get(greeting))
        .route("/languages", get(languages))
}

/// A language code query parameter.
#[derive(Deserialize, IntoParams)]
pub struct Lang {
    lang: Option<String>,
}

impl Lang {
    #[cfg(test)]
    pub(crate) fn new(lang: Option<&str>) -> Self {
        Self {
            lang: lang.map(str::to_string),
        }
    }
}

impl Debug for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.lang.fmt(f)
    }
}

/// A localized greeting.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    /// The greeting text.
    #[schema(example = "Bonjour SaaS!")]
    message: String,
    /// The language code the greeting is stored under.
    #[schema(example = "fr")]
    language_code: String,
    /// The language display name.
    #[schema(example = "French")]
    language_name: String,
}

impl Greeting {
    /// The greeting text.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// The language code.
    pub fn language_code(&self) -> &str {
        self.language_code.as_ref()
    }

    /// The language display name.
    pub fn language_name(&self) -> &str {
        self.language_name.as_ref()
    }
}

impl From<GreetingRecord> for Greeting {
    fn from(record: GreetingRecord) -> Self {
        Self {
            message: record.greeting,
            language_code: record.language_code,
            language_name: record.language_name,
        }
    }
}

/// A handler for greeting lookups.
///
/// Looks up the greeting stored under `lang`, falling back to the default
/// language when the parameter is missing or empty.
#[utoipa::path(
    get,
    path = "/api/greeting",
    params(Lang),
    responses(
        (status = 200, description = "Success", body = Greeting),
        (status = 404, description = "Language not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
#[instrument(skip(store))]
pub async fn greeting(
    State(store): State<GreetingStore>,
    Query(lang): Query<Lang>,
) -> ApiResult<Json<Greeting>> {
    let language_code = greeting_service::resolve_language(lang.lang.as_deref());
    let record = greeting_service::lookup(&store, language_code).await?;
    Ok(Json(Greeting::from(record)))
}

/// A language a greeting is stored for.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// The language code.
    #[schema(example = "fr")]
    language_code: String,
    /// The language display name.
    #[schema(example = "French")]
    language_name: String,
}

impl Language {
    /// The language code.
    pub fn language_code(&self) -> &str {
        self.language_code.as_ref()
    }

    /// The language display name.
    pub fn language_name(&self) -> &str {
        self.language_name.as_ref()
    }
}

impl From<GreetingRecord> for Language {
    fn from(record: GreetingRecord) -> Self {
        Self {
            language_code: record.language_code,
            language_name: record.language_name,
        }
    }
}

/// A handler for listing the stored languages.
#[utoipa::path(
    get,
    path = "/api/languages",
    responses(
        (status = 200, description = "Success", body = [Language]),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn languages(State(store): State<GreetingStore>) -> ApiResult<Json<Vec<Language>>> {
    let languages = greeting_service::list(&store)
        .await?
        .into_iter()
        .map(Language::from)
        .collect();
    Ok(Json(languages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::greeting::greeting_repository::MemoryGreetingStore;
    use crate::infra::error::{ApiError, ClientError};

    fn seeded_store() -> GreetingStore {
        GreetingStore::Memory(MemoryGreetingStore::seeded())
    }

    #[tokio::test]
    async fn greeting_without_lang_defaults_to_english() {
        let response = greeting(State(seeded_store()), Query(Lang::new(None)))
            .await
            .unwrap();

        assert_eq!(
            Greeting {
                message: "Hello SaaS!".to_string(),
                language_code: "en".to_string(),
                language_name: "English".to_string(),
            },
            response.0
        );
    }

    #[tokio::test]
    async fn greeting_with_lang_uses_it() {
        let response = greeting(State(seeded_store()), Query(Lang::new(Some("ja"))))
            .await
            .unwrap();

        assert_eq!("こんにちは SaaS!", response.0.message());
        assert_eq!("Japanese", response.0.language_name());
    }

    #[tokio::test]
    async fn greeting_with_unknown_lang_is_not_found() {
        let err = greeting(State(seeded_store()), Query(Lang::new(Some("zz"))))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::ClientError(ClientError::LanguageNotFound)
        ));
    }

    #[tokio::test]
    async fn languages_lists_every_stored_code() {
        let response = languages(State(seeded_store())).await.unwrap();

        let codes: Vec<&str> = response.0.iter().map(Language::language_code).collect();
        assert_eq!(vec!["de", "en", "es", "fr", "ja", "ru", "vi", "zh"], codes);
    }
}
