//! Application state shared across request handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::payments::PaymentClient;
use crate::services::media::MediaStore;

/// Shared application state.
///
/// Cheap to clone; all fields live behind a single `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    payments: PaymentClient,
    media: MediaStore,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let payments = PaymentClient::new(config.payments.clone());
        let media = MediaStore::new(&config.media);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                media,
            }),
        }
    }

    /// The application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The payment provider client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// The media store for uploaded images.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}
