use crate::config::ChatMode;
use crate::dtos::{ChatMessage, ChatReply, ChatRequest, ChatStatusResponse};
use crate::services::GenerationParams;
use crate::utils::ValidatedJsonWithRaw;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

const SYSTEM_PROMPT: &str = "You are ClaimGuardian, an assistant that helps patients understand \
medical bills, CPT codes and insurance claims. Answer clearly and do not invent prices.";

pub async fn chat_status(State(state): State<AppState>) -> Json<ChatStatusResponse> {
    let mode = state.settings.chat.mode;
    let available = match mode {
        ChatMode::Disabled => false,
        ChatMode::Proxy => state.chat_proxy.is_some(),
        ChatMode::Inference => state.generator.is_some(),
    };

    Json(ChatStatusResponse {
        mode: mode.as_str().to_string(),
        available,
    })
}

/// A disabled chat answers 501 whatever the body holds.
pub async fn chat(
    State(state): State<AppState>,
    request: Result<ValidatedJsonWithRaw<ChatRequest>, AppError>,
) -> Result<Response, AppError> {
    let mode = state.settings.chat.mode;
    if mode == ChatMode::Disabled {
        return Err(AppError::NotImplemented("Chat is not implemented".to_string()));
    }

    let ValidatedJsonWithRaw(request, raw_body) = request?;
    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("message is required"));
    }

    metrics::counter!("claimguardian_chat_requests_total", "mode" => mode.as_str()).increment(1);

    match mode {
        ChatMode::Proxy => {
            let proxy = state.chat_proxy.as_ref().ok_or_else(|| {
                AppError::ServiceUnavailable("Chat proxy is not configured".to_string())
            })?;

            // Forwarded as received so fields we don't model reach the upstream.
            let (status, payload) = proxy.forward(&raw_body).await?;

            tracing::info!(status = %status, "Chat proxied");
            Ok((status, Json(payload)).into_response())
        }
        ChatMode::Inference => {
            let generator = state.generator.as_ref().ok_or_else(|| {
                AppError::ServiceUnavailable("Inference endpoint is not configured".to_string())
            })?;

            let prompt = build_chat_prompt(&request.history, &request.message);
            let reply = generator
                .generate(&prompt, &GenerationParams::default())
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "Chat generation failed");
                    AppError::from(e)
                })?;

            Ok(Json(ChatReply {
                reply: reply.trim().to_string(),
                model: generator.model().to_string(),
            })
            .into_response())
        }
        ChatMode::Disabled => Err(AppError::NotImplemented("Chat is not implemented".to_string())),
    }
}

/// Renders the conversation as alternating `User:` / `Assistant:` turns.
fn build_chat_prompt(history: &[ChatMessage], message: &str) -> String {
    let mut prompt = format!("{}\n\n", SYSTEM_PROMPT);

    for turn in history {
        let speaker = if turn.role.eq_ignore_ascii_case("assistant") {
            "Assistant"
        } else {
            "User"
        };
        prompt.push_str(&format!("{}: {}\n", speaker, turn.content.trim()));
    }

    prompt.push_str(&format!("User: {}\nAssistant:", message.trim()));
    prompt
}
