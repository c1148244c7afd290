use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bill analysis stored against a browser session.
///
/// Fields beyond the ones named here are kept in `extra` and written back
/// unchanged, so records produced by other writers survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub total_billed: f64,
    #[serde(default)]
    pub potential_savings: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Aggregates over every analysis recorded for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_analyses: u64,
    pub total_billed: f64,
    pub total_potential_savings: f64,
    pub last_analysis_at: Option<DateTime<Utc>>,
}

impl SessionStats {
    /// Folds one more analysis into the aggregates.
    pub fn record(&mut self, analysis: &AnalysisRecord) {
        self.total_analyses += 1;
        self.total_billed += analysis.total_billed;
        self.total_potential_savings += analysis.potential_savings;
        self.last_analysis_at = Some(match self.last_analysis_at {
            Some(last) if last > analysis.created_at => last,
            _ => analysis.created_at,
        });
    }
}
