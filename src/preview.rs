//! Preview authorization: turns a signed preview link into a draft-mode session and a
//! redirect to the document's public path.
//!
//! A request moves through these states, any of which may end in rejection:
//!
//! ```text
//! Unvalidated -> SecretChecked -> AuthChecked -> DocumentFetched -> Redirected
//! ```

pub mod draft;
pub mod url;

use serde::Deserialize;

use crate::auth::models::Credentials;
use crate::auth::Authenticator;
use crate::config::SiteConfig;
use crate::db::models::DocumentSummary;
use crate::db::repository::PageStore;
use crate::error::AppError;
use crate::preview::draft::secrets_match;

const NOT_ALLOWED: &str = "You are not allowed to preview this page";

/// Query parameters of a preview link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewQuery {
    pub id: Option<String>,
    pub collection: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Unvalidated,
    SecretChecked,
    AuthChecked,
    DocumentFetched,
    Redirected,
    Rejected,
}

/// Collections with their own public url scheme. Everything else falls back to
/// `/{collection}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCollection {
    Pages,
    Posts,
    Other(String),
}

impl PreviewCollection {
    pub fn parse(slug: &str) -> Self {
        match slug {
            "pages" => PreviewCollection::Pages,
            "posts" => PreviewCollection::Posts,
            other => PreviewCollection::Other(other.to_string()),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            PreviewCollection::Pages => "pages",
            PreviewCollection::Posts => "posts",
            PreviewCollection::Other(slug) => slug,
        }
    }

    /// Public path of `doc`, the document previewed under `id`.
    pub fn redirect_path(&self, id: &str, doc: &DocumentSummary) -> String {
        match self {
            PreviewCollection::Pages => match doc.breadcrumbs.as_deref() {
                Some(trail) if !trail.is_empty() => doc
                    .canonical_path()
                    .map(String::from)
                    .unwrap_or_else(|| "/".to_string()),
                _ => doc
                    .slug
                    .as_deref()
                    .map(|slug| format!("/{}", slug))
                    .unwrap_or_else(|| "/".to_string()),
            },
            PreviewCollection::Posts => match doc.slug.as_deref() {
                Some(slug) => format!("/posts/{}", slug),
                None => format!("/posts/{}", id),
            },
            PreviewCollection::Other(collection) => format!("/{}/{}", collection, id),
        }
    }
}

/// What the response must do to the draft-mode cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftChange {
    Unchanged,
    Enable,
    Disable,
}

#[derive(Debug)]
pub struct PreviewOutcome {
    pub state: PreviewState,
    pub draft: DraftChange,
    /// Redirect target, or the error to respond with.
    pub result: Result<String, AppError>,
}

impl PreviewOutcome {
    fn rejected(draft: DraftChange, error: AppError) -> Self {
        Self {
            state: PreviewState::Rejected,
            draft,
            result: Err(error),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Run a preview request through the state machine, independent of HTTP.
pub async fn process_preview(
    store: &dyn PageStore,
    authenticator: &dyn Authenticator,
    config: &SiteConfig,
    query: PreviewQuery,
    credentials: &Credentials,
) -> PreviewOutcome {
    let mut state = PreviewState::Unvalidated;
    tracing::debug!(?state, "Preview requested");

    // 1. Shared secret
    let provided = query.secret.as_deref().unwrap_or_default();
    if !secrets_match(provided, &config.preview_secret) {
        tracing::warn!("Preview rejected: secret mismatch");
        return PreviewOutcome::rejected(DraftChange::Unchanged, AppError::Forbidden(NOT_ALLOWED.into()));
    }
    state = PreviewState::SecretChecked;

    // 2. Required parameters
    let (Some(id), Some(collection)) = (non_empty(query.id), non_empty(query.collection)) else {
        return PreviewOutcome::rejected(
            DraftChange::Unchanged,
            AppError::NotFound("Insufficient search params".into()),
        );
    };
    tracing::debug!(?state, %id, %collection, "Preview parameters present");

    // 3. Session
    let user = match authenticator.authenticate(credentials).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Error verifying token for live preview: {}", e);
            return PreviewOutcome::rejected(DraftChange::Disable, AppError::Forbidden(NOT_ALLOWED.into()));
        }
    };
    let Some(user) = user else {
        return PreviewOutcome::rejected(DraftChange::Disable, AppError::Forbidden(NOT_ALLOWED.into()));
    };
    state = PreviewState::AuthChecked;
    tracing::debug!(?state, user = %user.email, "Preview session verified");

    // 4. Document, drafts visible
    let collection = PreviewCollection::parse(&collection);
    let doc = match store.find_by_id(collection.slug(), &id, true).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            return PreviewOutcome::rejected(
                DraftChange::Enable,
                AppError::NotFound("Document not found".into()),
            )
        }
        Err(e) => return PreviewOutcome::rejected(DraftChange::Enable, e),
    };
    state = PreviewState::DocumentFetched;
    tracing::debug!(?state, "Preview document loaded");

    // 5. Redirect
    let path = collection.redirect_path(&id, &doc);
    tracing::info!("Preview of {}/{} by {} redirects to {}", collection.slug(), id, user.email, path);

    PreviewOutcome {
        state: PreviewState::Redirected,
        draft: DraftChange::Enable,
        result: Ok(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AuthenticatedUser;
    use crate::auth::MockAuthenticator;
    use crate::db::models::Breadcrumb;
    use crate::db::repository::MockPageStore;

    fn config() -> SiteConfig {
        SiteConfig {
            preview_secret: "s3cret".to_string(),
            ..SiteConfig::default()
        }
    }

    fn query(id: Option<&str>, collection: Option<&str>, secret: Option<&str>) -> PreviewQuery {
        PreviewQuery {
            id: id.map(String::from),
            collection: collection.map(String::from),
            secret: secret.map(String::from),
        }
    }

    fn editor() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "u1".to_string(),
            email: "editor@example.com".to_string(),
            collection: "users".to_string(),
        }
    }

    fn logged_in() -> MockAuthenticator {
        let mut auth = MockAuthenticator::new();
        auth.expect_authenticate().returning(|_| Ok(Some(editor())));
        auth
    }

    fn crumb(url: &str) -> Breadcrumb {
        Breadcrumb {
            url: Some(url.to_string()),
            label: None,
            doc: None,
        }
    }

    fn summary(id: &str, slug: Option<&str>, breadcrumbs: Option<Vec<Breadcrumb>>) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            slug: slug.map(String::from),
            breadcrumbs,
        }
    }

    #[test]
    fn test_pages_redirect_rules() {
        let pages = PreviewCollection::Pages;
        assert_eq!(
            pages.redirect_path("1", &summary("1", Some("b"), Some(vec![crumb("/a"), crumb("/a/b")]))),
            "/a/b"
        );
        assert_eq!(pages.redirect_path("1", &summary("1", Some("about"), None)), "/about");
        assert_eq!(pages.redirect_path("1", &summary("1", Some("about"), Some(vec![]))), "/about");
        assert_eq!(pages.redirect_path("1", &summary("1", None, None)), "/");

        let malformed = summary("1", Some("about"), Some(vec![Breadcrumb::default()]));
        assert_eq!(pages.redirect_path("1", &malformed), "/");
    }

    #[test]
    fn test_posts_redirect_rules() {
        let posts = PreviewCollection::Posts;
        assert_eq!(posts.redirect_path("7", &summary("7", Some("hello"), None)), "/posts/hello");
        assert_eq!(posts.redirect_path("7", &summary("7", None, None)), "/posts/7");
    }

    #[test]
    fn test_other_collection_redirect_rule() {
        let widgets = PreviewCollection::parse("widgets");
        assert_eq!(widgets, PreviewCollection::Other("widgets".to_string()));
        assert_eq!(widgets.redirect_path("42", &summary("42", Some("ignored"), None)), "/widgets/42");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_forbidden() {
        let store = MockPageStore::new();
        let auth = MockAuthenticator::new();

        let outcome = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("1"), Some("pages"), Some("wrong")),
            &Credentials::default(),
        )
        .await;

        assert_eq!(outcome.state, PreviewState::Rejected);
        assert_eq!(outcome.draft, DraftChange::Unchanged);
        assert!(matches!(outcome.result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_secret_is_forbidden_even_without_params() {
        let store = MockPageStore::new();
        let auth = MockAuthenticator::new();

        let outcome = process_preview(&store, &auth, &config(), query(None, None, None), &Credentials::default()).await;
        assert!(matches!(outcome.result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_secret_rejects_empty_secret() {
        let store = MockPageStore::new();
        let auth = MockAuthenticator::new();
        let config = SiteConfig::default();

        let outcome = process_preview(
            &store,
            &auth,
            &config,
            query(Some("1"), Some("pages"), Some("")),
            &Credentials::default(),
        )
        .await;
        assert!(matches!(outcome.result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_params_is_not_found() {
        let store = MockPageStore::new();
        let auth = MockAuthenticator::new();

        for q in [
            query(None, Some("pages"), Some("s3cret")),
            query(Some("1"), None, Some("s3cret")),
            query(Some(""), Some("pages"), Some("s3cret")),
        ] {
            let outcome = process_preview(&store, &auth, &config(), q, &Credentials::default()).await;
            assert_eq!(outcome.draft, DraftChange::Unchanged);
            assert!(matches!(outcome.result, Err(AppError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_auth_error_is_forbidden_and_disables_draft() {
        let store = MockPageStore::new();
        let mut auth = MockAuthenticator::new();
        auth.expect_authenticate()
            .returning(|_| Err(AppError::Auth("bad token".into())));

        let outcome = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("1"), Some("pages"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;

        assert_eq!(outcome.draft, DraftChange::Disable);
        assert!(matches!(outcome.result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_anonymous_is_forbidden_and_disables_draft() {
        let store = MockPageStore::new();
        let mut auth = MockAuthenticator::new();
        auth.expect_authenticate().returning(|_| Ok(None));

        let outcome = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("1"), Some("pages"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;

        assert_eq!(outcome.draft, DraftChange::Disable);
        assert!(matches!(outcome.result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let mut store = MockPageStore::new();
        store.expect_find_by_id().returning(|_, _, _| Ok(None));
        let auth = logged_in();

        let outcome = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("nope"), Some("pages"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;

        assert!(matches!(outcome.result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_successful_page_preview() {
        let mut store = MockPageStore::new();
        store
            .expect_find_by_id()
            .withf(|collection, id, draft| collection == "pages" && id == "p1" && *draft)
            .returning(|_, id, _| Ok(Some(summary(id, Some("b"), Some(vec![crumb("/a/b")])))));
        let auth = logged_in();

        let outcome = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("p1"), Some("pages"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;

        assert_eq!(outcome.state, PreviewState::Redirected);
        assert_eq!(outcome.draft, DraftChange::Enable);
        assert_eq!(outcome.result.unwrap(), "/a/b");
    }

    #[tokio::test]
    async fn test_successful_post_and_other_previews() {
        let mut store = MockPageStore::new();
        store.expect_find_by_id().returning(|collection, id, _| {
            let slug = (collection == "posts").then_some("hello");
            Ok(Some(summary(id, slug, None)))
        });
        let auth = logged_in();

        let post = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("9"), Some("posts"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;
        assert_eq!(post.result.unwrap(), "/posts/hello");

        let widget = process_preview(
            &store,
            &auth,
            &config(),
            query(Some("42"), Some("widgets"), Some("s3cret")),
            &Credentials::default(),
        )
        .await;
        assert_eq!(widget.result.unwrap(), "/widgets/42");
    }
}
