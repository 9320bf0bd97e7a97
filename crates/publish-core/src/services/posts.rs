//! Generic post create/update and lookups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Post, PostInput, PostPatch, Principal, PublicationPatch, WriteKind, generate_unique_id,
    sanitize, slugify, validate_published_at,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{Clock, PostQuery, PostRepository};

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a post owned by `principal`.
    ///
    /// Fields the principal may not write are dropped, not rejected.
    pub async fn create(&self, principal: &Principal, input: PostInput) -> Result<Post, DomainError> {
        let now = self.clock.now();
        let input = self.sanitize(principal, WriteKind::Create, input, None);

        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::Validation("title is required".to_string()))?;
        if let Some(Some(published_at)) = input.published_at {
            validate_published_at(published_at, now)?;
        }

        let slug = match input.slug.as_deref().map(slugify) {
            Some(slug) if !slug.is_empty() => slug,
            _ => slugify(&title),
        };
        let unique_id = generate_unique_id();
        let slug_id = match input.slug_id {
            Some(slug_id) => slug_id,
            None if slug.is_empty() => unique_id.clone(),
            None => format!("{slug}-{unique_id}"),
        };

        let mut post = Post::new(
            principal.user_id,
            unique_id,
            slug_id,
            title,
            slug,
            input.body.unwrap_or_default(),
            now,
        );
        post.published_at = input.published_at.flatten();
        post.scheduled_at = input.scheduled_at.flatten();

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, unique_id = %saved.unique_id, "Post created");
        Ok(saved)
    }

    /// Update a post. Authors may only touch their own posts.
    ///
    /// Written as a partial row update: columns the caller did not send, or
    /// may not write, keep whatever the store holds at write time.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let now = self.clock.now();
        let existing = self.get(id).await?;

        if !principal.is_editor() && existing.author_id != principal.user_id {
            return Err(DomainError::Forbidden(
                "authors may only edit their own posts".to_string(),
            ));
        }

        let input = self.sanitize(principal, WriteKind::Update, input, Some(id));
        if let Some(Some(published_at)) = input.published_at {
            validate_published_at(published_at, now)?;
        }

        let title = match input.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(DomainError::Validation("title must not be empty".to_string()));
                }
                Some(title)
            }
            None => None,
        };

        let patch = PostPatch {
            title,
            body: input.body,
            slug: input.slug.as_deref().map(slugify),
            publication: PublicationPatch {
                published_at: input.published_at,
                scheduled_at: input.scheduled_at,
                updated_at: now,
            },
        };

        let saved = self
            .posts
            .update_post(id, patch)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::post_not_found(id),
                other => other.into(),
            })?;
        tracing::debug!(post_id = %saved.id, "Post updated");
        Ok(saved)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list(query, self.clock.now()).await?)
    }

    /// Resolve a slug id to the post id. `None` when nothing matches.
    pub async fn find_id_by_slug_id(&self, slug_id: &str) -> Result<Option<Uuid>, DomainError> {
        Ok(self.posts.find_by_slug_id(slug_id).await?.map(|p| p.id))
    }

    /// Resolve a unique id to the post id. `None` when nothing matches.
    pub async fn find_id_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<Uuid>, DomainError> {
        Ok(self.posts.find_by_unique_id(unique_id).await?.map(|p| p.id))
    }

    fn sanitize(
        &self,
        principal: &Principal,
        kind: WriteKind,
        input: PostInput,
        post_id: Option<Uuid>,
    ) -> PostInput {
        let sanitized = sanitize(principal, kind, input);
        if !sanitized.stripped.is_empty() {
            let fields: Vec<&str> = sanitized.stripped.iter().map(|f| f.wire_name()).collect();
            tracing::info!(
                user_id = %principal.user_id,
                post_id = ?post_id,
                fields = ?fields,
                "Dropped fields the caller may not write"
            );
        }
        sanitized.input
    }
}
