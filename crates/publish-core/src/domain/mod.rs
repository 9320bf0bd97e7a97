//! Domain entities and rules.

pub mod access;
mod post;
pub mod publication;
mod unique_id;

pub use access::{Principal, Role, WriteKind, sanitize};
pub use post::{Post, PostInput, PostPatch, is_valid_slug_id, slugify};
pub use publication::{
    PublicationPatch, PublicationState, PublicationStatus, Transition, validate_published_at,
};
pub use unique_id::{generate_unique_id, is_valid_unique_id};
