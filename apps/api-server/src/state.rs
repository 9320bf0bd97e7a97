//! Application state - shared across all handlers.

use std::sync::Arc;

use publish_core::ports::{Clock, PostRepository, TokenService};
use publish_core::services::{PostService, PublicationService, SchedulerSweep, SweepConfig};
use publish_infra::database::DatabaseConfig;
use publish_infra::{InMemoryPostRepository, JwtTokenService, SystemClock};

#[cfg(feature = "postgres")]
use publish_infra::{DatabaseConnections, PostgresPostRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub publication: PublicationService,
    pub sweep: Arc<SchedulerSweep>,
    pub tokens: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repo = post_repository(config.database.as_ref()).await;
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let state = Self::from_parts(repo, Arc::new(SystemClock), tokens, config.sweep.clone());
        tracing::info!("Application state initialized");
        state
    }

    /// Wire services over the given store, clock and token service.
    pub fn from_parts(
        repo: Arc<dyn PostRepository>,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenService>,
        sweep: SweepConfig,
    ) -> Self {
        let publication = PublicationService::new(repo.clone(), clock.clone());
        let sweep = SchedulerSweep::new(repo.clone(), publication.clone(), clock.clone(), sweep);

        Self {
            posts: PostService::new(repo, clock.clone()),
            publication,
            sweep: Arc::new(sweep),
            tokens,
            clock,
        }
    }
}

#[cfg(feature = "postgres")]
async fn post_repository(db_config: Option<&DatabaseConfig>) -> Arc<dyn PostRepository> {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryPostRepository::new());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => Arc::new(PostgresPostRepository::new(connections.main)),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Arc::new(InMemoryPostRepository::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn post_repository(_db_config: Option<&DatabaseConfig>) -> Arc<dyn PostRepository> {
    tracing::info!("Running without postgres feature - using in-memory repository");
    Arc::new(InMemoryPostRepository::new())
}
