pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::{ChatMode, Settings};
use crate::services::{
    AnalysisStore, ChatProxyClient, HostedModelClient, OrchestratorClient, RedisAnalysisStore,
    TextGenerator,
};
use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Collaborators are optional; handlers degrade when theirs is absent.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Option<Arc<dyn AnalysisStore>>,
    pub orchestrator: Option<Arc<OrchestratorClient>>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub chat_proxy: Option<Arc<ChatProxyClient>>,
}

impl AppState {
    /// State with no collaborators wired; tests attach what they need.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            store: None,
            orchestrator: None,
            generator: None,
            chat_proxy: None,
        }
    }

    /// Connects every collaborator that has a configuration section.
    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let mut state = Self::new(settings.clone());

        if let Some(kv) = &settings.kv {
            let store = RedisAnalysisStore::new(kv)
                .await
                .context("Failed to initialize analysis store")?;
            state.store = Some(Arc::new(store));
        } else {
            tracing::warn!("No key-value store configured, history runs in demo mode");
        }

        if let Some(orchestrator) = settings.orchestrator.clone() {
            tracing::info!(url = %orchestrator.url, flow_id = %orchestrator.flow_id, "Orchestrator configured");
            let client = OrchestratorClient::new(orchestrator)
                .context("Failed to build orchestrator client")?;
            state.orchestrator = Some(Arc::new(client));
        }

        if let Some(inference) = settings.inference.clone() {
            tracing::info!(model = %inference.model, "Inference endpoint configured");
            let client =
                HostedModelClient::new(inference).context("Failed to build inference client")?;
            state.generator = Some(Arc::new(client));
        }

        if settings.chat.mode == ChatMode::Proxy {
            let url = settings
                .chat
                .proxy_url
                .clone()
                .context("chat.mode is proxy but chat.proxy_url is not set")?;
            let client = ChatProxyClient::new(url, settings.chat.timeout_secs)
                .context("Failed to build chat proxy client")?;
            state.chat_proxy = Some(Arc::new(client));
        }

        tracing::info!(chat_mode = state.settings.chat.mode.as_str(), "Application state ready");

        Ok(state)
    }

    pub fn with_store(mut self, store: Arc<dyn AnalysisStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: Arc<OrchestratorClient>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_chat_proxy(mut self, chat_proxy: Arc<ChatProxyClient>) -> Self {
        self.chat_proxy = Some(chat_proxy);
        self
    }

    /// Session cookies are marked `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        self.settings.server.environment.is_production()
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/history",
            get(handlers::get_history).post(handlers::new_session),
        )
        .route("/api/history/analyses", post(handlers::record_analysis))
        .route("/api/chat", get(handlers::chat_status).post(handlers::chat))
        .route("/api/workflow/results", get(handlers::get_results))
        .route("/api/workflow/trigger", post(handlers::trigger_flow))
        .route("/api/cpt/lookup", post(handlers::lookup_code))
        .route("/api/oumi", post(handlers::generate))
        .route("/api/oumi/verify", post(handlers::verify_claims))
        .route(
            "/api/download",
            get(handlers::download_get).post(handlers::download_post),
        );

    let origins: Vec<HeaderValue> = state
        .settings
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(api)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        // Credentials are allowed so the session cookie crosses origins.
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static(REQUEST_ID_HEADER),
                ])
                .allow_credentials(true),
        )
}
