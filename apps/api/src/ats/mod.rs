//! ATS compatibility scanner.
//!
//! Pure and deterministic: a resume (plus optional job description) in, a
//! scored report out. No I/O and no shared mutable state.

pub mod handlers;
pub mod keywords;
pub mod report;
pub mod rules;

use serde_json::Value;

use crate::ats::report::{Grade, ScanReport};
use crate::ats::rules::{default_rules, Rule, ScanContext};
use crate::models::resume::ResumeDocument;

const MAX_IMPROVEMENTS: usize = 5;
const STARTING_SCORE: i64 = 100;

fn non_blank(job_description: Option<&str>) -> Option<&str> {
    job_description.filter(|jd| !jd.trim().is_empty())
}

/// Applies an ordered rule list to a resume.
pub struct AtsScanner {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for AtsScanner {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl AtsScanner {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Scores a typed resume. A blank job description is treated as absent.
    pub fn scan(&self, resume: &ResumeDocument, job_description: Option<&str>) -> ScanReport {
        self.evaluate(ScanContext::new(resume, non_blank(job_description)))
    }

    /// Scores a resume exactly as submitted. Keyword and character-set checks
    /// see every field of `document`; structural rules use its typed view.
    pub fn scan_json(&self, document: &Value, job_description: Option<&str>) -> ScanReport {
        let resume = ResumeDocument::from_value(document);
        self.evaluate(ScanContext::with_source(
            &resume,
            document.to_string(),
            non_blank(job_description),
        ))
    }

    fn evaluate(&self, ctx: ScanContext<'_>) -> ScanReport {
        let mut score = STARTING_SCORE;
        let mut issues = Vec::new();
        let mut strengths = Vec::new();

        for rule in &self.rules {
            let outcome = rule.evaluate(&ctx);
            if outcome.deduction > 0 {
                tracing::debug!(
                    rule = rule.name(),
                    deduction = outcome.deduction,
                    "ATS rule deducted"
                );
            }
            score -= i64::from(outcome.deduction);
            issues.extend(outcome.issues);
            strengths.extend(outcome.strengths);
        }

        let score = score.clamp(0, 100) as u8;
        let improvements = issues
            .iter()
            .filter(|i| i.is_actionable())
            .map(|i| i.suggestion.clone())
            .take(MAX_IMPROVEMENTS)
            .collect();

        ScanReport {
            score,
            grade: Grade::from_score(score),
            issues,
            strengths,
            improvements,
            keyword_matches: ctx.keywords.map(|k| k.matches),
        }
    }
}
