use axum::extract::State;
use axum::http::{header, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::error::AppError;
use crate::preview::draft::DraftMode;
use crate::rendering::meta::generate_meta;
use crate::rendering::page::render_document;
use crate::resolver::{
    decode_path_segments, fetch_page, home_static, normalize_segments, page_path,
    query_page_by_slug, HOME_SLUG,
};

/// `GET /` and `GET /{*slug}`: Render the page at the request path.
///
/// A redirect rule registered for the path wins over a page resolved at it.
pub async fn page_handler(
    State(state): State<AppState>,
    uri: Uri,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let draft = DraftMode::from_jar(&jar, &state.config).enabled;
    let segments = decode_path_segments(uri.path())
        .ok_or_else(|| AppError::NotFound(format!("No page at '{}'", uri.path())))?;
    let segments = normalize_segments(&segments);
    let url = page_path(&segments);
    let slug = segments.last().map(String::as_str).unwrap_or(HOME_SLUG);

    let store = state.page_store.as_ref();

    let mut page = fetch_page(store, &segments, draft).await?;
    if page.is_none() && segments == [HOME_SLUG] {
        tracing::debug!("No home page found, serving placeholder");
        page = Some(home_static());
    }

    if let Some(destination) = store
        .find_redirect(&url)
        .await?
        .and_then(|rule| rule.destination())
    {
        tracing::debug!(from = %url, to = %destination, "Redirect rule matched");
        return Ok(Redirect::temporary(&destination).into_response());
    }

    let page = page.ok_or_else(|| AppError::NotFound(format!("No page at '{}'", url)))?;

    let meta_page = query_page_by_slug(store, slug, draft).await?;
    let meta = generate_meta(meta_page.as_ref().or(Some(&page)), &state.config);

    let html = render_document(&page, &meta, draft);

    if draft {
        Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response())
    } else {
        Ok(Html(html).into_response())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::app::{build_router, AppState};
    use crate::auth::token::JwtAuthenticator;
    use crate::config::SiteConfig;
    use crate::db::models::PageStatus;
    use crate::db::testing::{page_at, InMemoryStore};

    fn server(store: InMemoryStore) -> TestServer {
        let state = AppState {
            page_store: Arc::new(store),
            authenticator: Arc::new(JwtAuthenticator::new("unit-test-secret")),
            config: Arc::new(SiteConfig::default()),
        };
        TestServer::builder()
            .build(build_router(state, None))
    }

    #[tokio::test]
    async fn test_encoded_paths_resolve() {
        let server = server(InMemoryStore::new(vec![
            page_at("cafe", "/café", PageStatus::Published),
            page_at("about", "/about us", PageStatus::Published),
            page_at("team", "/about us/team", PageStatus::Published),
        ]));

        server.get("/caf%C3%A9").await.assert_status_ok();
        server.get("/about%20us").await.assert_status_ok();
        server.get("/about%20us/team").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_undecodable_path_is_not_found() {
        let server = server(InMemoryStore::new(vec![page_at(
            "about",
            "/about",
            PageStatus::Published,
        )]));

        server.get("/about%FF").await.assert_status_not_found();
        server.get("/about").await.assert_status_ok();
    }
}
