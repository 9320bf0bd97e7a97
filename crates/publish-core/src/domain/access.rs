//! Principals, roles and the field allow-list for post writes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::PostInput;
use crate::error::DomainError;

/// Role name that grants publication rights.
pub const EDITOR_ROLE: &str = "Editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Editor,
    Author,
}

impl Role {
    /// Map a role name from the identity provider. Anything but `Editor` is
    /// treated as a regular author.
    pub fn from_name(name: &str) -> Self {
        if name == EDITOR_ROLE {
            Self::Editor
        } else {
            Self::Author
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => EDITOR_ROLE,
            Self::Author => "Author",
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn editor(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Editor)
    }

    pub fn author(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Author)
    }

    pub fn is_editor(&self) -> bool {
        self.role == Role::Editor
    }

    pub fn require_editor(&self, action: &str) -> Result<(), DomainError> {
        if self.is_editor() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "only editors may {action} posts"
            )))
        }
    }
}

/// Post fields that not every principal may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    PublishedAt,
    ScheduledAt,
    SlugId,
}

impl PostField {
    /// Name of the field on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::PublishedAt => "publishedAt",
            Self::ScheduledAt => "scheduled_at",
            Self::SlugId => "slug_id",
        }
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

/// Fields the principal may not write for this kind of request.
pub fn denied_fields(principal: &Principal, kind: WriteKind) -> &'static [PostField] {
    const AUTHOR: &[PostField] = &[PostField::PublishedAt, PostField::ScheduledAt, PostField::SlugId];
    const EDITOR_CREATE: &[PostField] = &[];
    const EDITOR_UPDATE: &[PostField] = &[PostField::SlugId];

    match (principal.is_editor(), kind) {
        (true, WriteKind::Create) => EDITOR_CREATE,
        (true, WriteKind::Update) => EDITOR_UPDATE,
        (false, _) => AUTHOR,
    }
}

/// A write payload after the allow-list was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub input: PostInput,
    /// Denied fields that were present in the payload and removed.
    pub stripped: Vec<PostField>,
}

/// Remove every field the principal may not write.
pub fn sanitize(principal: &Principal, kind: WriteKind, mut input: PostInput) -> Sanitized {
    let mut stripped = Vec::new();
    for field in denied_fields(principal, kind) {
        let present = match field {
            PostField::PublishedAt => input.published_at.take().is_some(),
            PostField::ScheduledAt => input.scheduled_at.take().is_some(),
            PostField::SlugId => input.slug_id.take().is_some(),
        };
        if present {
            stripped.push(*field);
        }
    }
    Sanitized { input, stripped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn privileged_input() -> PostInput {
        PostInput {
            title: Some("x".to_string()),
            slug_id: Some("custom".to_string()),
            published_at: Some(Some(Utc::now())),
            scheduled_at: Some(None),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_from_name() {
        assert_eq!(Role::from_name("Editor"), Role::Editor);
        assert_eq!(Role::from_name("editor"), Role::Author);
        assert_eq!(Role::from_name("Authenticated"), Role::Author);
    }

    #[test]
    fn test_author_payload_is_stripped() {
        let author = Principal::author(Uuid::new_v4());
        let result = sanitize(&author, WriteKind::Create, privileged_input());

        assert_eq!(result.input.title.as_deref(), Some("x"));
        assert_eq!(result.input.published_at, None);
        assert_eq!(result.input.scheduled_at, None);
        assert_eq!(result.input.slug_id, None);
        assert_eq!(
            result.stripped,
            vec![PostField::PublishedAt, PostField::ScheduledAt, PostField::SlugId]
        );
    }

    #[test]
    fn test_editor_create_keeps_everything() {
        let editor = Principal::editor(Uuid::new_v4());
        let input = privileged_input();
        let result = sanitize(&editor, WriteKind::Create, input.clone());

        assert_eq!(result.input, input);
        assert!(result.stripped.is_empty());
    }

    #[test]
    fn test_slug_id_never_updatable() {
        let editor = Principal::editor(Uuid::new_v4());
        let result = sanitize(&editor, WriteKind::Update, privileged_input());

        assert_eq!(result.input.slug_id, None);
        assert!(result.input.published_at.is_some());
        assert_eq!(result.stripped, vec![PostField::SlugId]);
    }

    #[test]
    fn test_clean_author_payload_reports_nothing() {
        let author = Principal::author(Uuid::new_v4());
        let input = PostInput {
            body: Some("text".to_string()),
            ..Default::default()
        };
        let result = sanitize(&author, WriteKind::Update, input);
        assert!(result.stripped.is_empty());
    }

    #[test]
    fn test_require_editor() {
        assert!(Principal::editor(Uuid::new_v4()).require_editor("publish").is_ok());
        let err = Principal::author(Uuid::new_v4())
            .require_editor("publish")
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
