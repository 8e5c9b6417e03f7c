use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::config::Config;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl()));
        AppState {
            store,
            tokens,
            config,
        }
    }
}
