use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_FILE_STEM: &str = "claimguardian-report";
const MAX_FILE_STEM_LEN: usize = 100;

/// Accepted both as a JSON body and as query parameters.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DownloadRequest {
    pub content: Option<String>,
    pub format: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Text,
    Markdown,
    Json,
    Html,
    Csv,
}

impl DownloadFormat {
    /// Unknown or missing formats fall back to plain text.
    pub fn parse(format: Option<&str>) -> Self {
        match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("json") => Self::Json,
            Some("html") | Some("htm") => Self::Html,
            Some("csv") => Self::Csv,
            _ => Self::Text,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Json => "application/json",
            Self::Html => "text/html; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Html => "html",
            Self::Csv => "csv",
        }
    }
}

/// `{stem}.{ext}` safe to place inside a quoted Content-Disposition value.
pub fn attachment_filename(requested: Option<&str>, format: DownloadFormat) -> String {
    let extension = format.extension();
    let requested = requested.unwrap_or_default().trim();
    let requested = requested
        .strip_suffix(&format!(".{}", extension))
        .unwrap_or(requested);

    let sanitized: String = requested
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_FILE_STEM_LEN)
        .collect();
    let stem = sanitized.trim_start_matches('.');

    if stem.is_empty() || stem.chars().all(|c| c == '-') {
        format!("{}.{}", DEFAULT_FILE_STEM, extension)
    } else {
        format!("{}.{}", stem, extension)
    }
}
