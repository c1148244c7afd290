use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "claimguardian_session";
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// The session id from the request cookie, if it is a well-formed UUID.
pub fn session_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
        .map(|id| id.to_string())
}

pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}
