pub mod chat;
pub mod cpt;
pub mod download;
pub mod health;
pub mod history;
pub mod inference;
pub mod workflow;

pub use chat::{chat, chat_status};
pub use cpt::lookup_code;
pub use download::{download_get, download_post};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use history::{get_history, new_session, record_analysis};
pub use inference::{generate, verify_claims};
pub use workflow::{get_results, trigger_flow};
