//! Request handler module
//!
//! Routing dispatch, article pages and writes, and static asset serving.

pub mod articles;
pub mod router;
pub mod static_files;

pub use router::handle_request;
