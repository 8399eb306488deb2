//! Job-description keyword extraction and matching against resume text.

use crate::ats::report::KeywordMatches;

/// Keywords kept from a job description.
pub const MAX_KEYWORDS: usize = 50;
/// Unmatched keywords reported back to the caller.
pub const MAX_MISSING: usize = 10;
/// Tokens must be strictly longer than this to count as keywords.
const MIN_KEYWORD_LEN: usize = 3;

/// Result of matching a job description against a resume.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScan {
    pub matches: KeywordMatches,
    /// Unrounded match percentage; thresholds compare against this.
    pub rate: f64,
    pub universe_size: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lower-cases the job description, splits on runs of non-word characters,
/// keeps tokens longer than three characters, de-duplicates in first-seen
/// order and caps the result at fifty.
pub fn extract_keywords(job_description: &str) -> Vec<String> {
    let lowered = job_description.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in lowered.split(|c: char| !is_word_char(c)) {
        if token.len() <= MIN_KEYWORD_LEN {
            continue;
        }
        if keywords.iter().any(|k| k == token) {
            continue;
        }
        keywords.push(token.to_string());
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }

    keywords
}

/// Matches job-description keywords against the serialized resume.
/// A keyword matches when it occurs anywhere in the lower-cased resume text.
pub fn match_keywords(job_description: &str, resume_text: &str) -> KeywordScan {
    let keywords = extract_keywords(job_description);
    let haystack = resume_text.to_lowercase();

    let (matched, missing): (Vec<String>, Vec<String>) = keywords
        .iter()
        .cloned()
        .partition(|k| haystack.contains(k.as_str()));

    let universe_size = keywords.len();
    let rate = if universe_size == 0 {
        0.0
    } else {
        matched.len() as f64 / universe_size as f64 * 100.0
    };

    KeywordScan {
        matches: KeywordMatches {
            matched,
            missing: missing.into_iter().take(MAX_MISSING).collect(),
            match_rate: rate.round() as u32,
        },
        rate,
        universe_size,
    }
}
