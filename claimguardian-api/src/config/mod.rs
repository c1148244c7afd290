use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{load_layered, Environment};
use service_core::error::AppError;

#[derive(Deserialize, Clone, Default)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub chat: ChatSettings,
    /// Key-value store backing analysis history. Absent means demo mode.
    pub kv: Option<KvSettings>,
    /// Workflow orchestration server (Kestra API).
    pub orchestrator: Option<OrchestratorSettings>,
    /// Hosted text-generation endpoint for the fine-tuned billing model.
    pub inference: Option<InferenceSettings>,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Development,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct KvSettings {
    /// Redis connection URL; may carry credentials.
    pub url: Secret<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    "claimguardian".to_string()
}

#[derive(Deserialize, Clone)]
pub struct OrchestratorSettings {
    /// Base URL of the orchestration server, e.g. `http://kestra:8080`.
    pub url: String,
    /// Namespace and flow started by `POST /api/workflow/trigger`.
    pub namespace: String,
    pub flow_id: String,
    /// Tenant path segment for multi-tenant deployments.
    pub tenant: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    #[serde(default = "default_orchestrator_timeout")]
    pub timeout_secs: u64,
}

fn default_orchestrator_timeout() -> u64 {
    30
}

#[derive(Deserialize, Clone)]
pub struct InferenceSettings {
    pub endpoint: String,
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "arungenailab/claimguardian-medical-billing-v2".to_string()
}

fn default_inference_timeout() -> u64 {
    120
}

/// Which of the chat behaviours the `/api/chat` route exposes.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Answer with 501 Not Implemented.
    #[default]
    Disabled,
    /// Forward the request body to `chat.proxy_url`.
    Proxy,
    /// Answer with the configured text-generation model.
    Inference,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Disabled => "disabled",
            ChatMode::Proxy => "proxy",
            ChatMode::Inference => "inference",
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ChatSettings {
    #[serde(default)]
    pub mode: ChatMode,
    pub proxy_url: Option<String>,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            mode: ChatMode::Disabled,
            proxy_url: None,
            timeout_secs: default_chat_timeout(),
        }
    }
}

fn default_chat_timeout() -> u64 {
    30
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Works from the workspace root and from the crate directory.
    let configuration_directory = if base_path.ends_with("claimguardian-api") {
        base_path.join("config")
    } else {
        base_path.join("claimguardian-api").join("config")
    };

    load_layered(&configuration_directory, "APP")
}
