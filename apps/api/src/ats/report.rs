use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub suggestion: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: &str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.to_string(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn error(category: &str, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message, suggestion)
    }

    pub fn warning(
        category: &str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, category, message, suggestion)
    }

    pub fn info(category: &str, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message, suggestion)
    }

    /// Errors and warnings feed the improvements list; info issues do not.
    pub fn is_actionable(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 95 => Grade::APlus,
            s if s >= 85 => Grade::A,
            s if s >= 75 => Grade::B,
            s if s >= 65 => Grade::C,
            s if s >= 50 => Grade::D,
            _ => Grade::F,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatches {
    pub matched: Vec<String>,
    /// First ten unmatched keywords, in job-description order.
    pub missing: Vec<String>,
    pub match_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub score: u8,
    pub grade: Grade,
    pub issues: Vec<Issue>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_matches: Option<KeywordMatches>,
}
