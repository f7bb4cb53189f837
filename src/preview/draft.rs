use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::config::SiteConfig;

/// Cookie marking a browser as being in draft mode.
pub const DRAFT_COOKIE: &str = "folio_draft";

/// Compare a presented secret with the configured one without short-circuiting on the
/// first differing byte. An empty configured secret never matches.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Value stored in the draft-mode cookie. Derived from the preview secret so it cannot
/// be forged without it, and invalidated when the secret rotates.
pub fn draft_token(config: &SiteConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"folio-draft-mode:");
    hasher.update(config.preview_secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Request-scoped draft-mode flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftMode {
    pub enabled: bool,
}

impl DraftMode {
    /// Draft mode is on when the cookie carries the current draft token.
    pub fn from_cookie_value(value: Option<&str>, config: &SiteConfig) -> Self {
        let enabled = config.preview_enabled()
            && value.is_some_and(|v| secrets_match(v, &draft_token(config)));
        Self { enabled }
    }
}

#[cfg(feature = "ssr")]
mod cookies {
    use axum_extra::extract::cookie::{Cookie, SameSite};
    use axum_extra::extract::CookieJar;

    use super::*;

    impl DraftMode {
        pub fn from_jar(jar: &CookieJar, config: &SiteConfig) -> Self {
            Self::from_cookie_value(jar.get(DRAFT_COOKIE).map(|c| c.value()), config)
        }

        /// Turn draft mode on for subsequent requests from this browser.
        pub fn enable(jar: CookieJar, config: &SiteConfig) -> CookieJar {
            // Live preview runs inside the admin's iframe, which needs a cross-site
            // cookie; browsers only accept that over https.
            let secure = config.server_url.starts_with("https://");
            let same_site = if secure { SameSite::None } else { SameSite::Lax };

            let cookie = Cookie::build((DRAFT_COOKIE, draft_token(config)))
                .path("/")
                .http_only(true)
                .secure(secure)
                .same_site(same_site)
                .build();

            jar.add(cookie)
        }

        pub fn disable(jar: CookieJar) -> CookieJar {
            let cookie = Cookie::build((DRAFT_COOKIE, "")).path("/").removal().build();
            jar.remove(cookie)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> SiteConfig {
        SiteConfig {
            preview_secret: secret.to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abd", "abc"));
        assert!(!secrets_match("", "abc"));
        assert!(!secrets_match("abcd", "abc"));
        assert!(!secrets_match("", ""));
    }

    #[test]
    fn test_draft_token_depends_on_secret() {
        assert_eq!(draft_token(&config("one")), draft_token(&config("one")));
        assert_ne!(draft_token(&config("one")), draft_token(&config("two")));
    }

    #[test]
    fn test_draft_mode_from_cookie_value() {
        let cfg = config("one");
        let token = draft_token(&cfg);

        assert!(DraftMode::from_cookie_value(Some(&token), &cfg).enabled);
        assert!(!DraftMode::from_cookie_value(Some("forged"), &cfg).enabled);
        assert!(!DraftMode::from_cookie_value(None, &cfg).enabled);

        // Rotating the secret invalidates existing cookies.
        assert!(!DraftMode::from_cookie_value(Some(&token), &config("two")).enabled);
    }

    #[test]
    fn test_draft_mode_off_without_secret() {
        let cfg = config("");
        let token = draft_token(&cfg);
        assert!(!DraftMode::from_cookie_value(Some(&token), &cfg).enabled);
    }

    #[cfg(feature = "ssr")]
    #[test]
    fn test_enable_and_disable_cookie() {
        use axum_extra::extract::CookieJar;

        let cfg = config("one");
        let jar = DraftMode::enable(CookieJar::new(), &cfg);
        assert!(DraftMode::from_jar(&jar, &cfg).enabled);

        let jar = DraftMode::disable(jar);
        assert!(!DraftMode::from_jar(&jar, &cfg).enabled);
    }
}
