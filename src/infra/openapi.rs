//! OpenAPI configuration.

use crate::api::{greeting::greeting_api, info::info_api};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    paths(
        info_api::info,
        greeting_api::greeting,
        greeting_api::languages,
    ),
    components(
        schemas(
            info_api::AppInfo,
            greeting_api::Greeting,
            greeting_api::Language,
            crate::infra::error::ErrorBody
        )
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
