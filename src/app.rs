//! REST API implementation.
//!
//! # Examples
//!
//! Greeting API.
//!
//! ```rust
//! # use greeting_api::api::greeting::greeting_api::Greeting;
//! # tokio_test::block_on(async {
//! # let url = greeting_api::app::spawn_app().await;
//! let response = reqwest::get(format!("{}/greeting?lang=fr", url)).await.unwrap();
//! assert_eq!(200, response.status());
//! let greeting = response.json::<Greeting>().await.unwrap();
//! assert_eq!("Bonjour SaaS!", greeting.message());
//! # });
//! ```
//!
//! Greeting API without a language code.
//!
//! ```rust
//! # use greeting_api::api::greeting::greeting_api::Greeting;
//! # tokio_test::block_on(async {
//! # let url = greeting_api::app::spawn_app().await;
//! let response = reqwest::get(format!("{}/greeting", url)).await.unwrap();
//! assert_eq!(200, response.status());
//! let greeting = response.json::<Greeting>().await.unwrap();
//! assert_eq!("en", greeting.language_code());
//! # });
//! ```

use std::time::Duration;

use crate::api::greeting::greeting_repository::GreetingStore;
use crate::infra::error::{InternalError, PanicHandler};
use crate::infra::middleware::MakeRequestIdSpan;
use crate::infra::openapi::ApiDoc;
use crate::infra::state::AppState;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use http::header::{self, HeaderValue};
use http::Method;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e| async move {
            InternalError::Other(format!("Tower middleware failed: {e}")).into_response()
        }))
        .concurrency_limit(500);

    // Browser clients get the permissive set: any origin, GET and OPTIONS,
    // and a Content-Type request header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // The full application with generated API docs and a REST API.
    Router::new()
        .route("/", get(|| async { Redirect::permanent("/api/swagger-ui") }))
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/api/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api/openapi.json").path("/api/rapidoc"))
        .nest("/api", crate::api::api(state))
        // Layers
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(axum::middleware::from_fn(
            crate::infra::middleware::log_request_response,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
        // Outermost, so CORS headers and a content type end up on every
        // response, including preflights and converted panics.
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
}

/// Starts the axum server.
pub async fn run_app(addr: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = app(state).into_make_service();

    let local_addr = addr.local_addr()?;
    tracing::info!("Starting axum on {}", local_addr);
    let exit_result = axum::serve(addr, app)
        .with_graceful_shutdown(crate::shutdown(env!("CARGO_PKG_NAME")))
        .await;

    match &exit_result {
        Ok(_) => tracing::info!("Successfully shut down"),
        Err(e) => tracing::error!("Shutdown failed: {}", e),
    }

    exit_result
}

/// Spawn a server on a random port with the configured greeting store.
pub async fn spawn_app() -> String {
    let config = crate::infra::config::load_config().unwrap();
    let store = GreetingStore::from_config(&config.storage).unwrap();
    spawn_app_with_store(store).await
}

/// Spawn a server on a random port with a custom greeting store.
pub async fn spawn_app_with_store(store: GreetingStore) -> String {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(run_app(listener, AppState::new(store)));
    format!("http://{address}:{port}/api")
}
