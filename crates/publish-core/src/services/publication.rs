//! Publication operations: schedule, publish, unpublish.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, Principal, Transition, validate_published_at};
use crate::error::{DomainError, RepoError};
use crate::ports::{Clock, PostRepository};

/// Drives the publication state machine against the post store.
///
/// Each operation is a single conditional row update, so it either applies
/// fully or not at all. Concurrent calls on the same post are last-write-wins.
#[derive(Clone)]
pub struct PublicationService {
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl PublicationService {
    pub fn new(posts: Arc<dyn PostRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }

    /// Overwrite `scheduled_at`. `None` clears the schedule.
    pub async fn schedule(
        &self,
        principal: &Principal,
        id: Uuid,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<Post, DomainError> {
        principal.require_editor("schedule")?;
        self.apply(id, Transition::Schedule(scheduled_at), self.clock.now())
            .await
    }

    /// Set `published_at` to now. `scheduled_at` is left as is.
    pub async fn publish(&self, principal: &Principal, id: Uuid) -> Result<Post, DomainError> {
        principal.require_editor("publish")?;
        self.apply(id, Transition::Publish, self.clock.now()).await
    }

    /// Clear `published_at`. `scheduled_at` is left as is.
    pub async fn unpublish(&self, principal: &Principal, id: Uuid) -> Result<Post, DomainError> {
        principal.require_editor("unpublish")?;
        self.apply(id, Transition::Unpublish, self.clock.now()).await
    }

    /// Publish on behalf of the scheduler, stamping `published_at` with the
    /// sweep's reference time.
    ///
    /// Applies only while the post is still due at `now`. `None` means it was
    /// published, unscheduled or removed since it was selected.
    pub async fn publish_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError> {
        let post = self.posts.publish_if_due(id, now).await?;

        match &post {
            Some(post) => tracing::info!(
                post_id = %id,
                transition = Transition::Publish.name(),
                status = %post.state_at(now).status(),
                "Publication state changed"
            ),
            None => tracing::debug!(post_id = %id, "Post no longer due, skipped"),
        }

        Ok(post)
    }

    /// Guard for callers that set `published_at` directly.
    pub fn validate_published_at(&self, value: DateTime<Utc>) -> Result<(), DomainError> {
        validate_published_at(value, self.clock.now())
    }

    async fn apply(
        &self,
        id: Uuid,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .update_publication(id, transition.patch(now))
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::post_not_found(id),
                other => other.into(),
            })?;

        tracing::info!(
            post_id = %id,
            transition = transition.name(),
            status = %post.state_at(now).status(),
            "Publication state changed"
        );

        Ok(post)
    }
}
