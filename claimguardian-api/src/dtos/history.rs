use crate::models::{AnalysisRecord, SessionStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const MAX_HISTORY_LIMIT: usize = 100;

/// `limit` is kept raw so a malformed value never rejects the request.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
}

impl HistoryParams {
    /// Unparseable values fall back to the default, the rest clamp to `1..=100`.
    pub fn limit(&self) -> usize {
        let requested = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT as i64);

        requested.clamp(1, MAX_HISTORY_LIMIT as i64) as usize
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub analyses: Vec<AnalysisRecord>,
    pub stats: SessionStats,
    /// True when no key-value store is configured and the payload is empty.
    pub demo: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordedAnalysisResponse {
    pub analysis: AnalysisRecord,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAnalysisRequest {
    #[validate(length(max = 255, message = "File name is too long"))]
    pub file_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Too many CPT codes"))]
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Billed amount cannot be negative"))]
    pub total_billed: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Savings cannot be negative"))]
    pub potential_savings: f64,
    #[validate(length(max = 32))]
    pub risk_level: Option<String>,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewAnalysisRequest {
    /// Server-assigned fields in `extra` are dropped so they cannot shadow ours.
    pub fn into_record(
        mut self,
        id: String,
        session_id: String,
        created_at: DateTime<Utc>,
    ) -> AnalysisRecord {
        for reserved in ["id", "session_id", "created_at"] {
            self.extra.remove(reserved);
        }

        AnalysisRecord {
            id,
            session_id,
            created_at,
            file_name: self.file_name,
            cpt_codes: self.cpt_codes,
            total_billed: self.total_billed,
            potential_savings: self.potential_savings,
            risk_level: self.risk_level,
            summary: self.summary,
            extra: self.extra,
        }
    }
}
