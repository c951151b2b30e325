use std::sync::Arc;
use std::time::Duration;

use auth::scope;
use auth::scope::AuthRequirement;
use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::reset_password::reset_password;
use super::handlers::token_access::token_access;
use super::handlers::token_refresh::token_refresh;
use super::handlers::token_revoke::token_revoke;
use super::handlers::update_password::update_password;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::Guard;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState { user_service };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/user", post(create_user))
        .route("/token/refresh", post(token_refresh));

    let owner_routes = Router::new()
        .route("/user/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/user/:id/password/update", post(update_password))
        .route("/token/revoke/:id", post(token_revoke))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(
                authenticator.clone(),
                AuthRequirement::access(&[scope::ADMIN, scope::USER_ID]),
            ),
            authenticate,
        ));

    let admin_routes = Router::new()
        .route("/user/password/reset", post(reset_password))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(authenticator.clone(), AuthRequirement::access(&[scope::ADMIN])),
            authenticate,
        ));

    let refresh_routes = Router::new()
        .route("/token/access", post(token_access))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(authenticator, AuthRequirement::refresh(&[scope::REFRESH])),
            authenticate,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(owner_routes)
        .merge(admin_routes)
        .merge(refresh_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
