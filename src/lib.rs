//! Broadsheet: a small article publishing site
//!
//! Articles live in an in-memory repository. Pages are rendered with Tera,
//! cover images are stored under the uploads directory, and one-shot flash
//! messages travel through a short-lived session cookie.

pub mod article;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod session;
pub mod upload;
pub mod view;

pub use error::AppError;
