//! Claim verification: checks each claim of an AI-written billing analysis
//! against the source document using the hosted model as the judge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: f64 = 0.7;

#[derive(Debug, Error, PartialEq)]
pub enum VerificationError {
    #[error("Model output did not contain a JSON array of claims")]
    MissingVerdicts,

    #[error("Model output claims were not valid JSON: {0}")]
    InvalidVerdicts(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim: String,
    pub status: String,
    #[serde(default)]
    pub confidence: f64,
}

impl ClaimVerdict {
    pub fn is_supported(&self, threshold: f64) -> bool {
        self.status.eq_ignore_ascii_case("SUPPORTED") && self.confidence >= threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub claims_verified: usize,
    pub claims_supported: usize,
    pub claims_unsupported: usize,
    pub confidence_avg: f64,
    pub threshold: f64,
    pub details: Vec<ClaimVerdict>,
}

pub fn build_prompt(context_document: &str, analysis: &str) -> String {
    format!(
        "<context>\n{context}\n</context>\n\n<claims>\n{claims}\n</claims>\n\n\
         For each claim in the analysis, determine whether it is SUPPORTED or \
         UNSUPPORTED by the context and how confident you are (0 to 1).\n\
         Answer with only a JSON array of objects with the fields \
         \"claim\", \"status\" and \"confidence\".",
        context = context_document.trim(),
        claims = analysis.trim(),
    )
}

/// Finds the outermost JSON array in free-form model output and parses it.
pub fn parse_verdicts(output: &str) -> Result<Vec<ClaimVerdict>, VerificationError> {
    let start = output.find('[').ok_or(VerificationError::MissingVerdicts)?;
    let end = output.rfind(']').ok_or(VerificationError::MissingVerdicts)?;
    if end < start {
        return Err(VerificationError::MissingVerdicts);
    }

    serde_json::from_str(&output[start..=end])
        .map_err(|e| VerificationError::InvalidVerdicts(e.to_string()))
}

pub fn summarize(details: Vec<ClaimVerdict>, threshold: f64) -> VerificationReport {
    let claims_verified = details.len();
    let claims_supported = details.iter().filter(|v| v.is_supported(threshold)).count();
    let confidence_avg = if details.is_empty() {
        0.0
    } else {
        details.iter().map(|v| v.confidence).sum::<f64>() / claims_verified as f64
    };

    VerificationReport {
        claims_verified,
        claims_supported,
        claims_unsupported: claims_verified - claims_supported,
        confidence_avg,
        threshold,
        details,
    }
}
