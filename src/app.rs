use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::demo_auth;
use crate::auth::Authenticator;
use crate::config::SiteConfig;
use crate::db::repository::PageStore;
use crate::preview::url::PREVIEW_PATH;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub page_store: Arc<dyn PageStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub config: Arc<SiteConfig>,
}

/// All routes of the site. `assets_dir` is served under `/assets` when given.
pub fn build_router(state: AppState, assets_dir: Option<&str>) -> Router {
    let mut router = Router::new()
        .route(PREVIEW_PATH, get(api::preview::preview_handler))
        .route("/next/exit-preview", post(api::preview::exit_preview_handler))
        .route("/api/preview-url", get(api::preview::preview_url_handler))
        .route("/api/users/login", post(demo_auth::login_handler))
        .route("/api/users/me", get(demo_auth::me_handler))
        .route("/api/users/logout", post(demo_auth::logout_handler))
        .route("/", get(api::pages::page_handler))
        .route("/{*slug}", get(api::pages::page_handler));

    if let Some(dir) = assets_dir {
        router = router.nest_service("/assets", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
