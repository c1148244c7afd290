pub mod session;
pub mod validation;

pub use session::{new_session_id, session_cookie, session_from_jar, SESSION_COOKIE};
pub use validation::{ValidatedJson, ValidatedJsonWithRaw};
