//! # Publish Core
//!
//! The domain layer of the publish backend: posts, the publication state
//! machine, and the application services that drive it.
//! Storage, clocks and token verification are reached through the traits in
//! [`ports`]; nothing here depends on a concrete database or web framework.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
