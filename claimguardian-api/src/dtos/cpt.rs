use crate::services::cpt::CptLookup;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CptLookupRequest {
    #[validate(length(max = 32))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CptLookupResponse {
    pub code: String,
    pub description: String,
    pub category: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

impl From<CptLookup> for CptLookupResponse {
    fn from(lookup: CptLookup) -> Self {
        Self {
            modifier: lookup.code.modifier().map(str::to_string),
            code: lookup.code.to_string(),
            description: lookup.description,
            category: lookup.category,
            found: lookup.found,
        }
    }
}
