//! # Publish Shared
//!
//! Wire types shared by the API server and its clients.
//! Kept free of domain dependencies so it can be compiled for any consumer.

pub mod dto;
pub mod response;
pub mod timestamp;

pub use response::{DataResponse, ErrorResponse};
