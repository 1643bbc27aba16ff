//! Authentication middleware and handlers.
//!
//! Password-based authentication using an Argon2 hashed password. Authentication
//! can be disabled by setting `POCKETLEDGER_PASSWORD_HASH` to
//! `DANGEROUSLY_ALLOW_UNAUTHENTICATED_USERS`, in which case every request acts
//! as the local user.
//!
//! Session tokens are random UUIDs, validated against a server-side session
//! store. Tokens are invalidated on logout or server restart.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::config::AuthMode;
use crate::error::ErrorBody;
use crate::state::AppState;

/// Cookie name for the session token.
const SESSION_COOKIE: &str = "session";

/// User id owning the data in password mode.
pub const OWNER_ID: &str = "owner";

/// User id every request acts as when authentication is disabled.
pub const LOCAL_ID: &str = "local";

/// The user a request acts on behalf of. Every data query is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn local() -> Self {
        Self::new(LOCAL_ID)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The middleware attaches the user; without it the request is local
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_else(CurrentUser::local))
    }
}

/// Form data for login.
#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub password: String,
}

fn is_public_path(path: &str) -> bool {
    path == "/login" || path == "/health"
}

/// Authentication middleware. Attaches the [`CurrentUser`] to authenticated
/// requests, rejects API calls without a session and redirects everything
/// else to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if matches!(state.config.auth_mode, AuthMode::Unauthenticated) {
        request.extensions_mut().insert(CurrentUser::local());
        return next.run(request).await;
    }

    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        if let Some(user) = state.session_user(session_cookie.value()) {
            request.extensions_mut().insert(user);
            return next.run(request).await;
        }
    }

    let path = request.uri().path();

    if is_public_path(path) {
        return next.run(request).await;
    }

    if path.starts_with("/api/") {
        tracing::debug!(path, "Rejecting unauthenticated API request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "Unauthorized".into(),
            }),
        )
            .into_response();
    }

    Redirect::to("/login").into_response()
}

fn login_html(error: Option<&str>) -> Html<String> {
    let error = error
        .map(|msg| format!("<p class=\"error\">{msg}</p>"))
        .unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>Login - PocketLedger</title></head>
<body>
<h1>PocketLedger</h1>
{error}
<form method=\"post\" action=\"/login\">
<input type=\"password\" name=\"password\" autofocus required>
<button type=\"submit\">Log in</button>
</form>
</body>
</html>"
    ))
}

/// Render the login page.
pub async fn login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if matches!(state.config.auth_mode, AuthMode::Unauthenticated) {
        return Redirect::to("/").into_response();
    }

    let logged_in = cookies
        .get(SESSION_COOKIE)
        .and_then(|c| state.session_user(c.value()))
        .is_some();
    if logged_in {
        return Redirect::to("/").into_response();
    }

    login_html(None).into_response()
}

/// Handle login form submission.
pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginFormData>,
) -> Response {
    let password_hash = match &state.config.auth_mode {
        AuthMode::Unauthenticated => return Redirect::to("/").into_response(),
        AuthMode::Password(hash) => hash,
    };

    if !verify_password(&form.password, password_hash) {
        tracing::warn!("Failed login attempt");
        return (StatusCode::UNAUTHORIZED, login_html(Some("Invalid password"))).into_response();
    }

    let session_token = Uuid::new_v4().to_string();
    state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(session_token.clone(), CurrentUser::new(OWNER_ID));
    tracing::info!("User logged in");

    let cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Strict)
        .build();
    cookies.add(cookie);

    Redirect::to("/").into_response()
}

/// Handle logout.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        state
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookies.remove(cookie);

    Redirect::to("/login")
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash format in POCKETLEDGER_PASSWORD_HASH");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
