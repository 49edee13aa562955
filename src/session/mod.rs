//! Flash sessions
//!
//! One-shot success/error messages carried from a write to the next page the
//! same client loads. The cookie holds only an opaque id.

mod cookie;
mod flash;
mod store;

pub use cookie::{build_session_cookie, session_id};
pub use flash::{Flash, FlashMessages};
pub use store::SessionStore;
