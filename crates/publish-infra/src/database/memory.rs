//! In-memory post store - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use publish_core::domain::{Post, PostPatch, PublicationPatch, Transition};
use publish_core::error::RepoError;
use publish_core::ports::{BaseRepository, PostQuery, PostRepository};

/// Post store backed by a `HashMap` behind an async `RwLock`.
///
/// Enforces the same uniqueness rules as the `posts` table.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    fn matches(post: &Post, query: &PostQuery, now: DateTime<Utc>) -> bool {
        query.status.is_none_or(|s| post.state_at(now).status() == s)
            && query.author_id.is_none_or(|a| post.author_id == a)
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        let clash = store.values().find(|other| {
            other.id != post.id
                && (other.unique_id == post.unique_id || other.slug_id == post.slug_id)
        });
        if let Some(other) = clash {
            let column = if other.unique_id == post.unique_id {
                "unique_id"
            } else {
                "slug_id"
            };
            return Err(RepoError::Constraint(format!("{column} already exists")));
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug_id(&self, slug_id: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.slug_id == slug_id).cloned())
    }

    async fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.unique_id == unique_id).cloned())
    }

    async fn list(&self, query: &PostQuery, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| Self::matches(p, query, now))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().filter(|p| p.is_due(now)).cloned().collect())
    }

    async fn update_publication(
        &self,
        id: Uuid,
        patch: PublicationPatch,
    ) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(&patch);
        Ok(post.clone())
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply_edit(&patch);
        Ok(post.clone())
    }

    async fn publish_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&id) {
            Some(post) if post.is_due(now) => {
                post.apply(&Transition::Publish.patch(now));
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }
}
