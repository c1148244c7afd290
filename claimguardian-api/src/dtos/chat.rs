use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(max = 8000, message = "Message is too long"))]
    pub message: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "Conversation history is too long"))]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatStatusResponse {
    pub mode: String,
    pub available: bool,
}
