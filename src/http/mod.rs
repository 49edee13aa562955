//! HTTP protocol layer module
//!
//! Response builders, cache validation and MIME lookup, decoupled from page logic.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_cached_response,
    build_error_response, build_html_response, build_options_response, build_redirect_response,
    ALLOWED_METHODS,
};
