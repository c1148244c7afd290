use super::{GenerationParams, InferenceError, TextGenerator};
use async_trait::async_trait;
use std::sync::Mutex;

/// Canned generator that records every prompt it receives.
pub struct MockTextGenerator {
    reply: Result<String, fn() -> InferenceError>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> InferenceError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn model(&self) -> &str {
        "mock-billing-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
