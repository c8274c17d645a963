//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::{admin, middleware::require_auth};

/// Create the Auth router for any store and identity provider
///
/// Public: the login handshake and logout. Everything under `/api/users`
/// and `/api/profile` goes through [`require_auth`].
pub fn auth_router<R, P>(state: AuthAppState<R, P>) -> Router
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let protected = Router::new()
        .route(
            "/api/users",
            get(admin::get_users::<R, P>).post(admin::create_user::<R, P>),
        )
        .route(
            "/api/users/{id}",
            get(admin::get_user::<R, P>)
                .put(admin::update_user::<R, P>)
                .delete(admin::delete_user::<R, P>),
        )
        .route(
            "/api/profile",
            get(admin::get_profile).put(admin::update_profile::<R, P>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<R, P>,
        ));

    Router::new()
        .route(
            "/login",
            get(handlers::login_page::<R, P>).post(handlers::login::<R, P>),
        )
        .route("/oidc", post(handlers::oidc_init::<R, P>))
        .route("/oidc/finish", get(handlers::oidc_finish::<R, P>))
        .route("/api/logout", post(handlers::logout::<R, P>))
        .merge(protected)
        .with_state(state)
}
