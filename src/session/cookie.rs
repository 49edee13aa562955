// Session cookie helpers

use std::time::Duration;

use hyper::header::{HeaderMap, COOKIE};

/// Find the value of cookie `name` in the request's `Cookie` headers
pub fn session_id(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying the session id
pub fn build_session_cookie(name: &str, id: &str, max_age: Duration) -> String {
    format!(
        "{name}={id}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        max_age.as_secs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_session_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers, "sid"), None);

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; sid=abc-123"));
        assert_eq!(session_id(&headers, "sid").as_deref(), Some("abc-123"));
        assert_eq!(session_id(&headers, "other"), None);

        headers.append(COOKIE, HeaderValue::from_static("x=1"));
        assert_eq!(session_id(&headers, "sid").as_deref(), Some("abc-123"));

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("sid="));
        assert_eq!(session_id(&empty, "sid"), None);
    }

    #[test]
    fn test_build_session_cookie() {
        assert_eq!(
            build_session_cookie("broadsheet.sid", "abc", Duration::from_secs(60)),
            "broadsheet.sid=abc; Path=/; Max-Age=60; HttpOnly; SameSite=Lax"
        );
    }
}
