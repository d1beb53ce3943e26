//! Book review module

pub mod models;
pub mod service;

pub use models::{CreateReviewRequest, Review};
pub use service::ReviewService;
