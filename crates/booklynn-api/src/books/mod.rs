//! Book catalog module

pub mod models;
pub mod service;

pub use models::{Book, CreateBookRequest, Language, UpdateBookRequest};
pub use service::BookService;
