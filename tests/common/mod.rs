use std::sync::Arc;

use axum::Router;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use folio::app::{build_router, AppState};
use folio::auth::models::{AuthenticatedUser, USERS_COLLECTION};
use folio::auth::token::{issue_token, JwtAuthenticator};
use folio::config::SiteConfig;
use folio::db::repository::MongoPageStore;

pub const PREVIEW_SECRET: &str = "test-preview-secret";
pub const TOKEN_SECRET: &str = "test-token-secret";

/// Holds the running MongoDB container and the router wired to it.
///
/// The container is kept alive for as long as this struct lives.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub store: Arc<MongoPageStore>,
    pub config: Arc<SiteConfig>,
}

impl TestEnv {
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let mongo_db = mongo_client.database("folio_test");
        let store = Arc::new(MongoPageStore::new(&mongo_db));

        let config = Arc::new(SiteConfig {
            server_url: "http://localhost:3000".to_string(),
            preview_secret: PREVIEW_SECRET.to_string(),
            token_secret: TOKEN_SECRET.to_string(),
            mongodb_uri: mongo_uri,
            demo_mode: true,
            ..SiteConfig::default()
        });

        let state = AppState {
            page_store: store.clone(),
            authenticator: Arc::new(JwtAuthenticator::new(TOKEN_SECRET)),
            config: config.clone(),
        };

        Self {
            _mongo: mongo_container,
            router: build_router(state, None),
            store,
            config,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error and
    /// redirect tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    /// Helper: insert the demo page tree.
    pub async fn seed(&self) {
        folio::seed::seed_demo_data(self.store.as_ref(), false)
            .await
            .expect("Failed to seed demo data");
    }

    /// Helper: a valid session token for an editor.
    pub fn editor_token(&self) -> String {
        let user = AuthenticatedUser {
            id: "editor-1".to_string(),
            email: "editor@folio.dev".to_string(),
            collection: USERS_COLLECTION.to_string(),
        };
        issue_token(&user, TOKEN_SECRET, chrono::Duration::hours(1))
            .expect("Failed to issue token")
    }
}
