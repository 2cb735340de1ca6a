//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::AccountStore;
use crate::services::auth::{AuthService, PasswordCodec, TokenIssuer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the account store, credential codecs and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn AccountStore>,
    codec: PasswordCodec,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state with the default Argon2id cost.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Opened account store; the caller closes it after shutdown
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn AccountStore>) -> Self {
        Self::with_codec(config, store, PasswordCodec::default())
    }

    /// Create a new application state with an explicit password codec.
    #[must_use]
    pub fn with_codec(
        config: ServerConfig,
        store: Arc<dyn AccountStore>,
        codec: PasswordCodec,
    ) -> Self {
        let tokens = TokenIssuer::new(&config.jwt.secret, config.jwt.ttl());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                codec,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the account store.
    #[must_use]
    pub fn store(&self) -> &dyn AccountStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Authentication service borrowing this state's store and codecs.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), &self.inner.codec, &self.inner.tokens)
    }
}
