use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::models::Credentials;
use crate::error::AppError;
use crate::preview::draft::DraftMode;
use crate::preview::{process_preview, DraftChange, PreviewQuery};
use crate::schema::pages::{pages_collection, PAGES_SLUG};

/// `GET /next/preview/id`: Enter draft mode and jump to the document's public page.
pub async fn preview_handler(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let credentials = Credentials::from_request(&headers, &jar, &state.config.token_cookie);

    let outcome = process_preview(
        state.page_store.as_ref(),
        state.authenticator.as_ref(),
        &state.config,
        query,
        &credentials,
    )
    .await;

    let jar = match outcome.draft {
        DraftChange::Unchanged => jar,
        DraftChange::Enable => DraftMode::enable(jar, &state.config),
        DraftChange::Disable => DraftMode::disable(jar),
    };

    match outcome.result {
        Ok(path) => (jar, Redirect::temporary(&path)).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

/// `POST /next/exit-preview`: Leave draft mode.
pub async fn exit_preview_handler(jar: CookieJar) -> (CookieJar, Redirect) {
    (DraftMode::disable(jar), Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub struct PreviewUrlQuery {
    pub collection: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewUrlResponse {
    pub preview: String,
    pub live_preview: String,
}

/// `GET /api/preview-url`: Preview links for a document, as the admin panel shows them.
///
/// Editors only.
pub async fn preview_url_handler(
    State(state): State<AppState>,
    Query(query): Query<PreviewUrlQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<axum::Json<PreviewUrlResponse>, AppError> {
    let credentials = Credentials::from_request(&headers, &jar, &state.config.token_cookie);
    if state.authenticator.authenticate(&credentials).await?.is_none() {
        return Err(AppError::Auth("Not logged in".into()));
    }

    if query.collection != PAGES_SLUG {
        return Err(AppError::NotFound(format!(
            "No preview configured for collection '{}'",
            query.collection
        )));
    }

    let doc = state
        .page_store
        .find_by_id(PAGES_SLUG, &query.id, true)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

    let pages = pages_collection();
    Ok(axum::Json(PreviewUrlResponse {
        preview: pages.preview_url(&state.config, Some(&doc)),
        live_preview: pages.live_preview_url(&state.config, Some(&doc)),
    }))
}
