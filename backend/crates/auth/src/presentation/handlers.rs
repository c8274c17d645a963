//! HTTP Handlers
//!
//! Login handshake endpoints. Failures on the password and federated paths
//! re-render the login view with a fresh nonce instead of an error page.

use axum::Json;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};
use platform::uri::sanitize_uri;

use crate::application::config::AuthConfig;
use crate::application::{
    FederatedLoginUseCase, LoginPageUseCase, SessionService, SignInInput, SignInUseCase,
    SignOutUseCase,
};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::dto::{
    DataResponse, LoginForm, LoginQuery, OidcCallbackQuery, OidcLoginForm,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    /// `None` when federated login is not configured
    pub provider: Option<Arc<P>>,
    pub config: Arc<AuthConfig>,
}

impl<R, P> Clone for AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, P> AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, provider: Option<Arc<P>>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            provider,
            config,
        }
    }

    pub fn sessions(&self) -> SessionService<R> {
        SessionService::new(self.repo.clone(), self.config.clone())
    }
}

// ============================================================================
// Login Page
// ============================================================================

/// GET /login
pub async fn login_page<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Query(query): Query<LoginQuery>,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    render_login(&state.config, &query.next, StatusCode::OK, None)
}

// ============================================================================
// Password Login
// ============================================================================

/// POST /login
pub async fn login<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Form(form): Form<LoginForm>,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.sessions(), state.config.clone());

    let input = SignInInput {
        username: form.username,
        password: form.password,
    };

    match use_case.execute(input).await {
        Ok(output) => {
            let next = state.config.landing_or(sanitize_uri(&form.next));
            let mut response = redirect(&next);
            append_cookie(
                &mut response,
                set_cookie_header(&state.config.session_cookie(), &output.session_token),
            );
            response
        }
        Err(err) => {
            err.log();
            let message = err.message(&state.config.i18n);
            render_login(&state.config, &form.next, err.status_code(), Some(message))
        }
    }
}

// ============================================================================
// Federated Login
// ============================================================================

/// POST /oidc
pub async fn oidc_init<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
    Form(form): Form<OidcLoginForm>,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let nonce = extract_cookie(&headers, &state.config.nonce_cookie_name);

    match federated(&state).initiate(nonce.as_deref(), &form.nonce, &form.next) {
        Ok(url) => redirect(&url),
        Err(err) => err.to_app_error(&state.config.i18n).into_response(),
    }
}

/// GET /oidc/finish
pub async fn oidc_finish<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<OidcCallbackQuery>,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let nonce = extract_cookie(&headers, &state.config.nonce_cookie_name);

    match federated(&state)
        .complete(nonce.as_deref(), &query.code, &query.state)
        .await
    {
        Ok(output) => {
            let mut response = redirect(&output.redirect_to);
            append_cookie(
                &mut response,
                set_cookie_header(&state.config.session_cookie(), &output.session_token),
            );
            response
        }
        Err(err) => {
            err.log();
            let message = err.message(&state.config.i18n);
            render_login(&state.config, &query.state, StatusCode::OK, Some(message))
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/logout
pub async fn logout<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) {
        // Ignore errors - the cookie is cleared either way
        let _ = SignOutUseCase::new(state.sessions()).execute(&token).await;
    }

    let mut response = Json(DataResponse::new(true)).into_response();
    append_cookie(
        &mut response,
        delete_cookie_header(&state.config.session_cookie()),
    );
    response
}

// ============================================================================
// Helper Functions
// ============================================================================

fn federated<R, P>(state: &AuthAppState<R, P>) -> FederatedLoginUseCase<R, R, P>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    FederatedLoginUseCase::new(
        state.repo.clone(),
        state.sessions(),
        state.provider.clone(),
        state.config.clone(),
    )
}

/// Login view with a freshly issued nonce bound to the nonce cookie
fn render_login(
    config: &Arc<AuthConfig>,
    next: &str,
    status: StatusCode,
    error: Option<String>,
) -> Response {
    let view = LoginPageUseCase::new(config.clone()).execute(next, error);
    let cookie = set_cookie_header(&config.nonce_cookie(), &view.nonce);

    let mut response = (status, Json(view)).into_response();
    append_cookie(&mut response, cookie);
    response
}

fn redirect(location: &str) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or(HeaderValue::from_static("/"));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn append_cookie(response: &mut Response, cookie: Option<HeaderValue>) {
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
}
