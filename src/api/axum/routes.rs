use axum::routing::post;
use axum::Router;

use super::handlers;
use crate::{AttemptStore, CredentialVerifier, PortcullisConfig, TokenRepository};

#[derive(Clone)]
pub struct AppState<V, T, S> {
    pub verifier: V,
    pub token_repo: T,
    pub attempt_store: S,
    pub config: PortcullisConfig,
}

impl<V, T, S> AppState<V, T, S> {
    /// State with the default config (5 attempts, 24 hour cooldown).
    pub fn new(verifier: V, token_repo: T, attempt_store: S) -> Self {
        Self {
            verifier,
            token_repo,
            attempt_store,
            config: PortcullisConfig::default(),
        }
    }
}

/// `POST /login`, meant to be nested under an auth prefix.
pub fn login_routes<V, T, S>() -> Router<AppState<V, T, S>>
where
    V: CredentialVerifier + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    S: AttemptStore + Clone + 'static,
{
    Router::new().route("/login", post(handlers::login::<V, T, S>))
}
