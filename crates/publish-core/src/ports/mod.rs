//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod clock;
mod repository;

pub use auth::{AuthError, TokenService};
pub use clock::Clock;
pub use repository::{BaseRepository, PostQuery, PostRepository};
