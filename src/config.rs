use std::fmt;

use serde::Deserialize;

use crate::error::AppError;

/// Signing key used for session tokens when running with demo accounts and no key of
/// its own. Refused outside demo mode.
pub const DEMO_TOKEN_SECRET: &str = "dev-token-secret";

/// Process-wide site configuration.
///
/// Built once at start-up and handed to every component that needs it; nothing reads
/// the environment at request time.
#[derive(Clone, Deserialize)]
pub struct SiteConfig {
    /// Public origin of the site, without trailing slash (e.g. `https://example.com`).
    pub server_url: String,
    /// Shared secret embedded in preview links. Preview is disabled while empty.
    pub preview_secret: String,
    /// HMAC secret used to sign and verify session tokens. Required outside demo mode.
    pub token_secret: String,
    /// Name of the cookie carrying the session token.
    pub token_cookie: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub listen_addr: String,
    /// Slug left out of static route enumeration.
    pub excluded_slug: String,
    /// Appended to page titles in document metadata.
    pub site_name: String,
    /// Enables the built-in demo editor accounts.
    pub demo_mode: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            preview_secret: String::new(),
            token_secret: String::new(),
            token_cookie: "folio-token".to_string(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "folio".to_string(),
            listen_addr: "127.0.0.1:3000".to_string(),
            excluded_slug: "cloud".to_string(),
            site_name: "Folio".to_string(),
            demo_mode: false,
        }
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("server_url", &self.server_url)
            .field("preview_secret", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .field("token_cookie", &self.token_cookie)
            .field("mongodb_uri", &self.mongodb_uri)
            .field("mongodb_database", &self.mongodb_database)
            .field("listen_addr", &self.listen_addr)
            .field("excluded_slug", &self.excluded_slug)
            .field("site_name", &self.site_name)
            .field("demo_mode", &self.demo_mode)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from, in increasing priority:
    ///
    /// 1. built-in defaults
    /// 2. the config file at `path` (or `folio.toml` if present)
    /// 3. `FOLIO_*` environment variables (e.g. `FOLIO_MONGODB_URI`)
    /// 4. `SITE_URL` and `PREVIEW_SECRET`
    #[cfg(feature = "ssr")]
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let defaults = SiteConfig::default();
        let map_err = |e: config::ConfigError| AppError::Config(e.to_string());

        let file = match path {
            Some(path) => config::File::with_name(path),
            None => config::File::with_name("folio").required(false),
        };

        let settings = config::Config::builder()
            .set_default("server_url", defaults.server_url)
            .map_err(map_err)?
            .set_default("preview_secret", defaults.preview_secret)
            .map_err(map_err)?
            .set_default("token_secret", defaults.token_secret)
            .map_err(map_err)?
            .set_default("token_cookie", defaults.token_cookie)
            .map_err(map_err)?
            .set_default("mongodb_uri", defaults.mongodb_uri)
            .map_err(map_err)?
            .set_default("mongodb_database", defaults.mongodb_database)
            .map_err(map_err)?
            .set_default("listen_addr", defaults.listen_addr)
            .map_err(map_err)?
            .set_default("excluded_slug", defaults.excluded_slug)
            .map_err(map_err)?
            .set_default("site_name", defaults.site_name)
            .map_err(map_err)?
            .set_default("demo_mode", defaults.demo_mode)
            .map_err(map_err)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .set_override_option("server_url", std::env::var("SITE_URL").ok())
            .map_err(map_err)?
            .set_override_option("preview_secret", std::env::var("PREVIEW_SECRET").ok())
            .map_err(map_err)?
            .build()
            .map_err(map_err)?;

        let mut site: SiteConfig = settings.try_deserialize().map_err(map_err)?;
        site.server_url = site.server_url.trim_end_matches('/').to_string();
        site.check_token_secret()?;

        if site.preview_secret.is_empty() {
            tracing::warn!("No preview secret configured, preview links are disabled");
        }

        Ok(site)
    }

    /// Reject a missing or publicly known signing key unless demo mode is on, in which
    /// case an empty key falls back to [`DEMO_TOKEN_SECRET`].
    pub fn check_token_secret(&mut self) -> Result<(), AppError> {
        let unset = self.token_secret.is_empty() || self.token_secret == DEMO_TOKEN_SECRET;
        match (unset, self.demo_mode) {
            (false, _) => Ok(()),
            (true, true) => {
                tracing::warn!("Using the demo token secret, sessions can be forged");
                self.token_secret = DEMO_TOKEN_SECRET.to_string();
                Ok(())
            }
            (true, false) => Err(AppError::Config(
                "token_secret must be set to a private value (FOLIO_TOKEN_SECRET)".into(),
            )),
        }
    }

    /// Whether preview links can be honoured at all.
    pub fn preview_enabled(&self) -> bool {
        !self.preview_secret.is_empty()
    }
}
