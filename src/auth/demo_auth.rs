use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::models::{AuthenticatedUser, Credentials, USERS_COLLECTION};
use crate::auth::token::{issue_token, TOKEN_TTL_HOURS};
use crate::error::AppError;

/// Built-in demo editor definition.
#[derive(Debug, Clone)]
struct DemoUser {
    email: &'static str,
    password: &'static str,
}

/// The hard-coded editors available when demo mode is on.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "demo@folio.dev",
        password: "demo",
    },
    DemoUser {
        email: "admin@folio.dev",
        password: "admin",
    },
];

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: AuthenticatedUser,
    pub token: String,
}

/// Validate demo credentials and return the corresponding editor.
pub fn authenticate_demo_user(email: &str, password: &str) -> Result<AuthenticatedUser, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.email == email && u.password == password)
        .map(|u| AuthenticatedUser {
            id: format!("demo-{}", u.email.split('@').next().unwrap_or_default()),
            email: u.email.to_string(),
            collection: USERS_COLLECTION.to_string(),
        })
        .ok_or_else(|| AppError::Auth("Invalid email or password".into()))
}

/// `POST /api/users/login`: Demo login handler.
///
/// Validates credentials against the built-in editor table. On success, sets the
/// session token cookie and returns the user and token.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    axum::Json(req): axum::Json<LoginRequest>,
) -> Result<(CookieJar, axum::Json<LoginResponse>), AppError> {
    if !state.config.demo_mode {
        return Err(AppError::NotFound("Demo login is disabled".into()));
    }

    let user = authenticate_demo_user(&req.email, &req.password)?;
    let token = issue_token(
        &user,
        &state.config.token_secret,
        chrono::Duration::hours(TOKEN_TTL_HOURS),
    )?;

    let cookie = Cookie::build((state.config.token_cookie.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
        .build();

    tracing::info!("Demo editor '{}' logged in", user.email);

    Ok((
        jar.add(cookie),
        axum::Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
            token,
        }),
    ))
}

/// `GET /api/users/me`: Returns the editor behind the current session.
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<axum::Json<AuthenticatedUser>, AppError> {
    let credentials = Credentials::from_request(&headers, &jar, &state.config.token_cookie);

    state
        .authenticator
        .authenticate(&credentials)
        .await?
        .map(axum::Json)
        .ok_or_else(|| AppError::Auth("Not logged in".into()))
}

/// `POST /api/users/logout`: Clears the session cookie.
pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((state.config.token_cookie.clone(), ""))
        .path("/")
        .removal()
        .build();

    jar.remove(cookie)
}
