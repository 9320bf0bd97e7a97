use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::publication::{PublicationPatch, PublicationState};

/// Post entity - a blog post with its publication timestamps.
///
/// Publication state is never stored; see [`Post::state_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub unique_id: String,
    pub slug_id: String,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft post.
    pub fn new(
        author_id: Uuid,
        unique_id: String,
        slug_id: String,
        title: String,
        slug: String,
        body: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            unique_id,
            slug_id,
            author_id,
            title,
            slug,
            body,
            published_at: None,
            scheduled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Effective publication state relative to `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> PublicationState {
        PublicationState::derive(self.published_at, self.scheduled_at, now)
    }

    /// Unpublished with a `scheduled_at` that has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_none() && self.scheduled_at.is_some_and(|at| at <= now)
    }

    /// Apply a publication patch, touching only the fields it carries.
    pub fn apply(&mut self, patch: &PublicationPatch) {
        if let Some(published_at) = patch.published_at {
            self.published_at = published_at;
        }
        if let Some(scheduled_at) = patch.scheduled_at {
            self.scheduled_at = scheduled_at;
        }
        self.updated_at = patch.updated_at;
    }

    /// Apply an edit from the generic update path.
    pub fn apply_edit(&mut self, patch: &PostPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(body) = &patch.body {
            self.body = body.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        self.apply(&patch.publication);
    }
}

/// Fields accepted by the generic create/update path.
///
/// The timestamp fields are tri-state: `None` leaves the field alone,
/// `Some(None)` clears it and `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub slug: Option<String>,
    pub slug_id: Option<String>,
    pub published_at: Option<Option<DateTime<Utc>>>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
}

/// Single-row update written by the generic update path.
///
/// Only the columns carried here are written, so a content edit never
/// restores publication fields from an earlier read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub slug: Option<String>,
    pub publication: PublicationPatch,
}

/// Lowercase, ASCII-alphanumeric words joined by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Whether `value` has the shape of a slug id (`[a-z0-9-]+`, no edge dashes).
pub fn is_valid_slug_id(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
