//! W3C Trace Context propagation for outbound calls to collaborators.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::RequestBuilder;
use reqwest::header::HeaderMap;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Writes `traceparent`/`tracestate` for the current span, if it is sampled
/// into a valid OpenTelemetry context. Without an OTLP layer this is a no-op.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return;
    }

    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = traceparent.parse() {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty()
        && let Ok(value) = tracestate.parse()
    {
        headers.insert(TRACESTATE_HEADER, value);
    }
}

/// Request correlation id, as set by `request_id_middleware`.
pub fn extract_request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(crate::middleware::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// A reqwest builder that injects trace headers when sent.
pub struct TracedRequest {
    request: RequestBuilder,
}

impl TracedRequest {
    pub fn new(request: RequestBuilder) -> Self {
        Self { request }
    }

    pub fn header(self, key: &str, value: &str) -> Self {
        Self {
            request: self.request.header(key, value),
        }
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
        }
    }

    pub fn bearer_auth<T: std::fmt::Display>(self, token: T) -> Self {
        Self {
            request: self.request.bearer_auth(token),
        }
    }

    /// Escape hatch for builder options without a dedicated method
    /// (basic auth, multipart bodies, per-request timeouts).
    pub fn configure(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            request: f(self.request),
        }
    }

    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);

        self.request.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced_get(&self, url: &str) -> TracedRequest;
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_get(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.get(url))
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }
}
