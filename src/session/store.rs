// Session store
// Maps session ids to flash slots, expiring idle sessions lazily

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::flash::{Flash, FlashMessages};

#[derive(Debug)]
struct Session {
    flash: Flash,
    last_seen: Instant,
}

/// In-memory session table
///
/// The lock is only held for map operations, never across an `.await`.
#[derive(Debug)]
pub struct SessionStore {
    max_age: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Take the pending messages of a live session
    ///
    /// Unknown or expired ids yield no messages.
    pub fn take_flash(&self, id: Option<&str>) -> FlashMessages {
        let Some(id) = id else {
            return FlashMessages::default();
        };

        let now = Instant::now();
        let mut sessions = self.lock();
        self.sweep(&mut sessions, now);

        sessions.get_mut(id).map_or_else(FlashMessages::default, |session| {
            session.last_seen = now;
            session.flash.take()
        })
    }

    /// Record a success message and return the session id that holds it
    pub fn set_success(&self, id: Option<&str>, message: impl Into<String>) -> String {
        let message = message.into();
        self.stash(id, |flash| flash.set_success(message))
    }

    /// Record an error message and return the session id that holds it
    pub fn set_error(&self, id: Option<&str>, message: impl Into<String>) -> String {
        let message = message.into();
        self.stash(id, |flash| flash.set_error(message))
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        let mut sessions = self.lock();
        self.sweep(&mut sessions, Instant::now());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `update` to the caller's live session, or to a fresh one
    fn stash(&self, id: Option<&str>, update: impl FnOnce(&mut Flash)) -> String {
        let now = Instant::now();
        let mut sessions = self.lock();
        self.sweep(&mut sessions, now);

        let id = match id {
            Some(id) if sessions.contains_key(id) => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let session = sessions.entry(id.clone()).or_insert_with(|| Session {
            flash: Flash::default(),
            last_seen: now,
        });
        session.last_seen = now;
        update(&mut session.flash);

        id
    }

    fn sweep(&self, sessions: &mut HashMap<String, Session>, now: Instant) {
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.max_age);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_is_shown_once() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.set_success(None, "Article created successfully!");

        let first = store.take_flash(Some(&id));
        assert_eq!(
            first.success_message.as_deref(),
            Some("Article created successfully!")
        );
        assert!(store.take_flash(Some(&id)).is_empty());
    }

    #[test]
    fn test_live_session_is_reused() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.set_success(None, "one");
        let again = store.set_error(Some(&id), "two");

        assert_eq!(id, again);
        assert_eq!(store.len(), 1);
        let messages = store.take_flash(Some(&id));
        assert_eq!(messages.success_message.as_deref(), Some("one"));
        assert_eq!(messages.error_message.as_deref(), Some("two"));
    }

    #[test]
    fn test_unknown_id_is_not_adopted() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.set_success(Some("chosen-by-client"), "hello");

        assert_ne!(id, "chosen-by-client");
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(store.take_flash(Some("chosen-by-client")).is_empty());
    }

    #[test]
    fn test_expired_session_drops_flash() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.set_success(None, "gone");

        assert!(store.take_flash(Some(&id)).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_no_cookie_no_messages() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.set_success(None, "someone else's");
        assert!(store.take_flash(None).is_empty());
    }
}
