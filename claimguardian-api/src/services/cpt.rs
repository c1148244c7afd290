//! Static CPT code reference table.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

static CPT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(-[A-Z0-9]{2})?$").expect("CPT pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid CPT code format: expected 5 digits with an optional -XX modifier, got {0:?}")]
pub struct InvalidCptCode(pub String);

/// A syntactically valid CPT code, e.g. `99214` or `99214-25`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CptCode(String);

impl CptCode {
    /// Trims and upper-cases before checking the format.
    pub fn parse(raw: &str) -> Result<Self, InvalidCptCode> {
        let normalized = raw.trim().to_ascii_uppercase();
        if CPT_CODE_RE.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidCptCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn base(&self) -> &str {
        &self.0[..5]
    }

    pub fn modifier(&self) -> Option<&str> {
        self.0.get(6..)
    }
}

impl fmt::Display for CptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CptEntry {
    pub description: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CptLookup {
    pub code: CptCode,
    pub description: String,
    pub category: String,
    pub found: bool,
}

const EM: &str = "Evaluation and Management";
const RADIOLOGY: &str = "Radiology";
const LAB: &str = "Pathology and Laboratory";
const SURGERY: &str = "Surgery";
const MEDICINE: &str = "Medicine";

const TABLE: &[(&str, &str, &str)] = &[
    ("99202", "Office or other outpatient visit for the evaluation and management of a new patient, straightforward complexity", EM),
    ("99203", "Office or other outpatient visit for the evaluation and management of a new patient, low complexity", EM),
    ("99204", "Office or other outpatient visit for the evaluation and management of a new patient, moderate complexity", EM),
    ("99205", "Office or other outpatient visit for the evaluation and management of a new patient, high complexity", EM),
    ("99211", "Office or other outpatient visit for the evaluation and management of an established patient, minimal problem", EM),
    ("99212", "Office or other outpatient visit for the evaluation and management of an established patient, straightforward complexity", EM),
    ("99213", "Office or other outpatient visit for the evaluation and management of an established patient, low complexity", EM),
    ("99214", "Office or other outpatient visit for the evaluation and management of an established patient, moderate complexity", EM),
    ("99214-25", "Established patient office visit, moderate complexity, significant and separately identifiable from a same-day procedure", EM),
    ("99215", "Office or other outpatient visit for the evaluation and management of an established patient, high complexity", EM),
    ("99281", "Emergency department visit, may not require the presence of a physician", EM),
    ("99282", "Emergency department visit, straightforward medical decision making", EM),
    ("99283", "Emergency department visit, low medical decision making", EM),
    ("99284", "Emergency department visit, moderate medical decision making", EM),
    ("99285", "Emergency department visit, high medical decision making", EM),
    ("99221", "Initial hospital inpatient or observation care, straightforward or low complexity", EM),
    ("99222", "Initial hospital inpatient or observation care, moderate complexity", EM),
    ("99223", "Initial hospital inpatient or observation care, high complexity", EM),
    ("99238", "Hospital inpatient or observation discharge day management, 30 minutes or less", EM),
    ("70450", "CT head or brain without contrast material", RADIOLOGY),
    ("70551", "MRI brain without contrast material", RADIOLOGY),
    ("70553", "MRI brain without contrast material, followed by contrast material and further sequences", RADIOLOGY),
    ("71045", "Radiologic examination, chest, single view", RADIOLOGY),
    ("71046", "Radiologic examination, chest, 2 views", RADIOLOGY),
    ("72148", "MRI lumbar spine without contrast material", RADIOLOGY),
    ("74177", "CT abdomen and pelvis with contrast material", RADIOLOGY),
    ("76700", "Ultrasound, abdominal, complete", RADIOLOGY),
    ("77067", "Screening mammography, bilateral, including computer-aided detection", RADIOLOGY),
    ("80048", "Basic metabolic panel", LAB),
    ("80053", "Comprehensive metabolic panel", LAB),
    ("80061", "Lipid panel", LAB),
    ("83036", "Hemoglobin A1c", LAB),
    ("84443", "Thyroid stimulating hormone (TSH)", LAB),
    ("85025", "Complete blood count with automated differential", LAB),
    ("36415", "Collection of venous blood by venipuncture", SURGERY),
    ("45378", "Colonoscopy, flexible, diagnostic", SURGERY),
    ("45380", "Colonoscopy, flexible, with biopsy, single or multiple", SURGERY),
    ("45385", "Colonoscopy, flexible, with removal of tumor, polyp, or other lesion by snare technique", SURGERY),
    ("43239", "Upper GI endoscopy with biopsy, single or multiple", SURGERY),
    ("29881", "Arthroscopy, knee, surgical, with meniscectomy, medial or lateral", SURGERY),
    ("93000", "Electrocardiogram, routine, with at least 12 leads, with interpretation and report", MEDICINE),
    ("93306", "Echocardiography, transthoracic, complete, with Doppler", MEDICINE),
    ("96372", "Therapeutic, prophylactic, or diagnostic injection, subcutaneous or intramuscular", MEDICINE),
    ("96374", "Therapeutic, prophylactic, or diagnostic injection, intravenous push, single drug", MEDICINE),
    ("90471", "Immunization administration, single vaccine", MEDICINE),
    ("97110", "Therapeutic exercises, each 15 minutes", MEDICINE),
];

static CPT_TABLE: Lazy<HashMap<&'static str, CptEntry>> = Lazy::new(|| {
    TABLE
        .iter()
        .map(|&(code, description, category)| (code, CptEntry { description, category }))
        .collect()
});

/// Exact match first, then the base code for an unlisted modifier, then a
/// generic fallback with category `Unknown`.
pub fn lookup(code: &CptCode) -> CptLookup {
    let entry = CPT_TABLE
        .get(code.as_str())
        .or_else(|| code.modifier().and_then(|_| CPT_TABLE.get(code.base())));

    match entry {
        Some(entry) => CptLookup {
            code: code.clone(),
            description: entry.description.to_string(),
            category: entry.category.to_string(),
            found: true,
        },
        None => CptLookup {
            code: code.clone(),
            description: format!("Procedure code {} (description unavailable)", code),
            category: UNKNOWN_CATEGORY.to_string(),
            found: false,
        },
    }
}
