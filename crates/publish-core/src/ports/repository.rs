use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostPatch, PublicationPatch, PublicationStatus};
use crate::error::RepoError;

/// Generic repository trait defining standard persistence operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// Listing filter for posts.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PublicationStatus>,
    pub author_id: Option<Uuid>,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug_id(&self, slug_id: &str) -> Result<Option<Post>, RepoError>;

    async fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<Post>, RepoError>;

    /// Posts matching `query`, newest first. Status is evaluated at `now`.
    async fn list(&self, query: &PostQuery, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Unpublished posts whose `scheduled_at` is at or before `now`.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Overwrite only the publication fields carried by `patch`, as one row
    /// update. Returns the updated post, or `RepoError::NotFound`.
    async fn update_publication(
        &self,
        id: Uuid,
        patch: PublicationPatch,
    ) -> Result<Post, RepoError>;

    /// Write only the columns carried by `patch`, as one row update.
    /// Returns the updated post, or `RepoError::NotFound`.
    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, RepoError>;

    /// Set `published_at = now` only while the post is still due, i.e.
    /// `published_at IS NULL AND scheduled_at <= now`. `None` when no row
    /// matched.
    async fn publish_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;
}
