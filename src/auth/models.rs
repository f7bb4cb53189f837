use serde::{Deserialize, Serialize};

/// Collection that holds editor accounts.
pub const USERS_COLLECTION: &str = "users";

fn default_collection() -> String {
    USERS_COLLECTION.to_string()
}

/// Represents an authenticated editor, extracted from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Unique user identifier.
    pub id: String,
    /// User email address.
    pub email: String,
    /// Auth-enabled collection the user belongs to.
    #[serde(default = "default_collection")]
    pub collection: String,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            collection: claims.collection,
        }
    }
}

/// Session credentials presented with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Token from the `Authorization` header (`JWT <token>` or `Bearer <token>`).
    pub header_token: Option<String>,
    /// Token from the session cookie.
    pub cookie_token: Option<String>,
}

impl Credentials {
    /// The token to verify; the header wins over the cookie.
    pub fn token(&self) -> Option<&str> {
        self.header_token
            .as_deref()
            .or(self.cookie_token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Parse an `Authorization` header value.
    pub fn parse_authorization(value: &str) -> Option<String> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if scheme.eq_ignore_ascii_case("jwt") || scheme.eq_ignore_ascii_case("bearer") {
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_string())
        } else {
            None
        }
    }

    /// Collect credentials from request headers and cookies.
    #[cfg(feature = "ssr")]
    pub fn from_request(
        headers: &axum::http::HeaderMap,
        jar: &axum_extra::extract::CookieJar,
        cookie_name: &str,
    ) -> Self {
        let header_token = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse_authorization);

        let cookie_token = jar.get(cookie_name).map(|c| c.value().to_string());

        Self {
            header_token,
            cookie_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_into_user() {
        let claims = TokenClaims {
            sub: "user-123".to_string(),
            email: "editor@example.com".to_string(),
            collection: "users".to_string(),
            iat: 0,
            exp: 10,
        };
        let user: AuthenticatedUser = claims.into();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.email, "editor@example.com");
        assert_eq!(user.collection, "users");
    }

    #[test]
    fn test_user_collection_defaults() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{ "id": "u1", "email": "a@b.c" }"#).unwrap();
        assert_eq!(user.collection, USERS_COLLECTION);
    }

    #[test]
    fn test_parse_authorization() {
        assert_eq!(Credentials::parse_authorization("JWT abc").as_deref(), Some("abc"));
        assert_eq!(Credentials::parse_authorization("Bearer abc").as_deref(), Some("abc"));
        assert_eq!(Credentials::parse_authorization("bearer  abc ").as_deref(), Some("abc"));
        assert_eq!(Credentials::parse_authorization("Basic abc"), None);
        assert_eq!(Credentials::parse_authorization("JWT"), None);
    }

    #[test]
    fn test_token_prefers_header() {
        let both = Credentials {
            header_token: Some("from-header".to_string()),
            cookie_token: Some("from-cookie".to_string()),
        };
        assert_eq!(both.token(), Some("from-header"));

        let cookie_only = Credentials {
            header_token: None,
            cookie_token: Some("from-cookie".to_string()),
        };
        assert_eq!(cookie_only.token(), Some("from-cookie"));

        let empty = Credentials {
            header_token: None,
            cookie_token: Some(String::new()),
        };
        assert_eq!(empty.token(), None);
        assert_eq!(Credentials::default().token(), None);
    }
}
