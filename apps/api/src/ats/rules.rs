//! ATS rubric expressed as independent rules.
//!
//! Each rule looks at the resume (plus the pre-computed serialized text and
//! keyword scan) and returns a `RuleOutcome`. The scanner applies them in
//! `default_rules()` order and folds the deductions into the running score.

use crate::ats::keywords::{match_keywords, KeywordScan};
use crate::ats::report::Issue;
use crate::models::resume::{is_blank, ResumeDocument};

const ACTION_VERBS: &[&str] = &[
    "achieved",
    "improved",
    "increased",
    "decreased",
    "managed",
    "led",
    "developed",
    "created",
    "implemented",
    "launched",
    "delivered",
    "designed",
    "built",
    "analyzed",
    "optimized",
];

const QUANTIFIER_WORDS: &[&str] = &[
    "increased",
    "decreased",
    "improved",
    "reduced",
    "saved",
    "generated",
];

const SUMMARY_MIN_CHARS: usize = 50;
const SUMMARY_MAX_CHARS: usize = 500;
const SKILLS_MIN: usize = 5;
const SKILLS_MAX: usize = 30;
const ACHIEVEMENTS_PER_ROLE: usize = 3;

/// Everything a rule may inspect. Built once per scan.
pub struct ScanContext<'a> {
    pub resume: &'a ResumeDocument,
    /// Compact JSON text of the resume as submitted, including fields the
    /// typed view does not model. Keyword and character-set checks read this.
    pub serialized: String,
    /// Present only when a job description was supplied.
    pub keywords: Option<KeywordScan>,
}

impl<'a> ScanContext<'a> {
    /// Context for a typed resume with no richer source document.
    pub fn new(resume: &'a ResumeDocument, job_description: Option<&str>) -> Self {
        let serialized = serde_json::to_string(resume).unwrap_or_default();
        Self::with_source(resume, serialized, job_description)
    }

    /// Context whose text checks run over `serialized`, the full submitted
    /// document, while structural rules read the typed `resume`.
    pub fn with_source(
        resume: &'a ResumeDocument,
        serialized: String,
        job_description: Option<&str>,
    ) -> Self {
        let keywords = job_description.map(|jd| match_keywords(jd, &serialized));
        Self {
            resume,
            serialized,
            keywords,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub deduction: u32,
    pub issues: Vec<Issue>,
    pub strengths: Vec<String>,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn penalize(mut self, points: u32, issue: Issue) -> Self {
        self.deduction += points;
        self.issues.push(issue);
        self
    }

    pub fn strength(mut self, strength: impl Into<String>) -> Self {
        self.strengths.push(strength.into());
        self
    }
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome;
}

/// The full rubric in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ContactNameRule),
        Box::new(ContactEmailRule),
        Box::new(ContactPhoneRule),
        Box::new(SummaryRule),
        Box::new(ExperiencePresenceRule),
        Box::new(ExperienceEntriesRule),
        Box::new(QuantifiedAchievementsRule),
        Box::new(ActionVerbsRule),
        Box::new(AchievementDensityRule),
        Box::new(EducationRule),
        Box::new(SkillsRule),
        Box::new(CharacterSetRule),
        Box::new(KeywordMatchRule),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Contact information
// ────────────────────────────────────────────────────────────────────────────

const CONTACT: &str = "Contact Information";

pub struct ContactNameRule;

impl Rule for ContactNameRule {
    fn name(&self) -> &'static str {
        "contact_name"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if is_blank(ctx.resume.personal_info.name.as_deref()) {
            return RuleOutcome::pass().penalize(
                10,
                Issue::error(
                    CONTACT,
                    "Missing name",
                    "Add your full name to ensure ATS can identify your application",
                ),
            );
        }
        RuleOutcome::pass()
    }
}

pub struct ContactEmailRule;

impl Rule for ContactEmailRule {
    fn name(&self) -> &'static str {
        "contact_email"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if is_blank(ctx.resume.personal_info.email.as_deref()) {
            return RuleOutcome::pass().penalize(
                10,
                Issue::error(
                    CONTACT,
                    "Missing email address",
                    "Add a professional email address",
                ),
            );
        }
        RuleOutcome::pass()
    }
}

pub struct ContactPhoneRule;

impl Rule for ContactPhoneRule {
    fn name(&self) -> &'static str {
        "contact_phone"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if is_blank(ctx.resume.personal_info.phone.as_deref()) {
            return RuleOutcome::pass().penalize(
                5,
                Issue::warning(
                    CONTACT,
                    "Missing phone number",
                    "Add a phone number for better reachability",
                ),
            );
        }
        RuleOutcome::pass().strength("Contact information is complete")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

pub struct SummaryRule;

impl Rule for SummaryRule {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        let len = ctx
            .resume
            .summary
            .as_deref()
            .map_or(0, |s| s.chars().count());

        if len < SUMMARY_MIN_CHARS {
            RuleOutcome::pass().penalize(
                8,
                Issue::warning(
                    "Professional Summary",
                    "Professional summary is missing or too short",
                    "Add a compelling 2-3 sentence summary (150-300 characters)",
                ),
            )
        } else if len > SUMMARY_MAX_CHARS {
            RuleOutcome::pass().penalize(
                2,
                Issue::info(
                    "Professional Summary",
                    "Professional summary might be too long",
                    "Keep it concise (150-300 characters for better ATS parsing)",
                ),
            )
        } else {
            RuleOutcome::pass().strength("Professional summary is well-sized")
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Work experience
// ────────────────────────────────────────────────────────────────────────────

const EXPERIENCE: &str = "Work Experience";

pub struct ExperiencePresenceRule;

impl Rule for ExperiencePresenceRule {
    fn name(&self) -> &'static str {
        "experience_presence"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.resume.work_experience.is_empty() {
            return RuleOutcome::pass().penalize(
                20,
                Issue::error(
                    EXPERIENCE,
                    "No work experience listed",
                    "Add at least one work experience entry",
                ),
            );
        }
        RuleOutcome::pass()
    }
}

pub struct ExperienceEntriesRule;

impl Rule for ExperienceEntriesRule {
    fn name(&self) -> &'static str {
        "experience_entries"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass();

        for (index, exp) in ctx.resume.work_experience.iter().enumerate() {
            let n = index + 1;

            if is_blank(exp.company.as_deref()) || is_blank(exp.role.as_deref()) {
                outcome = outcome.penalize(
                    5,
                    Issue::error(
                        EXPERIENCE,
                        format!("Experience #{n} is missing company or role"),
                        "Fill in all required fields for each work experience",
                    ),
                );
            }

            if is_blank(exp.start_date.as_deref()) {
                outcome = outcome.penalize(
                    2,
                    Issue::warning(
                        EXPERIENCE,
                        format!("Experience #{n} is missing start date"),
                        "Add dates to show your work history timeline",
                    ),
                );
            }

            if exp.achievements.is_empty() {
                outcome = outcome.penalize(
                    5,
                    Issue::warning(
                        EXPERIENCE,
                        format!("Experience #{n} has no achievements listed"),
                        "Add 3-5 bullet points highlighting your accomplishments",
                    ),
                );
            }
        }

        outcome
    }
}

/// A bullet is quantified when it carries a digit or a measurable-change word.
pub fn is_quantified(achievement: &str) -> bool {
    if achievement.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    let lower = achievement.to_lowercase();
    QUANTIFIER_WORDS.iter().any(|w| lower.contains(w))
}

pub fn has_action_verb(achievement: &str) -> bool {
    let lower = achievement.to_lowercase();
    ACTION_VERBS.iter().any(|v| lower.contains(v))
}

pub struct QuantifiedAchievementsRule;

impl Rule for QuantifiedAchievementsRule {
    fn name(&self) -> &'static str {
        "quantified_achievements"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.resume.work_experience.is_empty() {
            return RuleOutcome::pass();
        }
        if ctx.resume.achievements().any(is_quantified) {
            return RuleOutcome::pass().strength("Achievements include quantifiable results");
        }
        RuleOutcome::pass().penalize(
            5,
            Issue::info(
                EXPERIENCE,
                "Add more quantifiable achievements",
                "Include numbers, percentages, or metrics (e.g., \"Increased sales by 30%\")",
            ),
        )
    }
}

pub struct ActionVerbsRule;

impl Rule for ActionVerbsRule {
    fn name(&self) -> &'static str {
        "action_verbs"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.resume.work_experience.is_empty() {
            return RuleOutcome::pass();
        }
        if ctx.resume.achievements().any(has_action_verb) {
            return RuleOutcome::pass().strength("Strong action verbs used in achievements");
        }
        RuleOutcome::pass().penalize(
            3,
            Issue::info(
                EXPERIENCE,
                "Use more action verbs",
                "Start bullets with strong verbs like \"Led\", \"Developed\", \"Achieved\"",
            ),
        )
    }
}

pub struct AchievementDensityRule;

impl Rule for AchievementDensityRule {
    fn name(&self) -> &'static str {
        "achievement_density"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        let roles = ctx.resume.work_experience.len();
        if roles == 0 || ctx.resume.total_achievements() >= roles * ACHIEVEMENTS_PER_ROLE {
            return RuleOutcome::pass();
        }
        RuleOutcome::pass().penalize(
            3,
            Issue::info(
                EXPERIENCE,
                "Add more achievement bullets",
                "Aim for 3-5 bullet points per work experience",
            ),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Education and skills
// ────────────────────────────────────────────────────────────────────────────

pub struct EducationRule;

impl Rule for EducationRule {
    fn name(&self) -> &'static str {
        "education"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.resume.education.is_empty() {
            return RuleOutcome::pass().penalize(
                10,
                Issue::warning(
                    "Education",
                    "No education listed",
                    "Add your educational background",
                ),
            );
        }

        let mut outcome = RuleOutcome::pass();
        for (index, edu) in ctx.resume.education.iter().enumerate() {
            if is_blank(edu.degree.as_deref()) || is_blank(edu.institution.as_deref()) {
                outcome = outcome.penalize(
                    3,
                    Issue::warning(
                        "Education",
                        format!("Education #{} is incomplete", index + 1),
                        "Include degree and institution name",
                    ),
                );
            }
        }
        outcome.strength("Education section is present")
    }
}

pub struct SkillsRule;

impl Rule for SkillsRule {
    fn name(&self) -> &'static str {
        "skills"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.resume.skills.is_empty() {
            return RuleOutcome::pass().penalize(
                15,
                Issue::error(
                    "Skills",
                    "No skills listed",
                    "Add relevant technical and soft skills",
                ),
            );
        }

        let total = ctx.resume.total_skill_items();
        if total < SKILLS_MIN {
            RuleOutcome::pass().penalize(
                5,
                Issue::warning(
                    "Skills",
                    "Too few skills listed",
                    "Add at least 8-12 relevant skills for better keyword matching",
                ),
            )
        } else if total > SKILLS_MAX {
            RuleOutcome::pass().penalize(
                2,
                Issue::info(
                    "Skills",
                    "Very long skills list",
                    "Focus on most relevant skills (15-20 is optimal)",
                ),
            )
        } else {
            RuleOutcome::pass().strength(format!("Good number of skills listed ({total})"))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting and job-description fit
// ────────────────────────────────────────────────────────────────────────────

pub struct CharacterSetRule;

impl Rule for CharacterSetRule {
    fn name(&self) -> &'static str {
        "character_set"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        if ctx.serialized.is_ascii() {
            return RuleOutcome::pass();
        }
        RuleOutcome::pass().penalize(
            2,
            Issue::warning(
                "Formatting",
                "Special characters detected",
                "Some ATS systems may have trouble with special characters",
            ),
        )
    }
}

pub struct KeywordMatchRule;

impl Rule for KeywordMatchRule {
    fn name(&self) -> &'static str {
        "keyword_match"
    }

    fn evaluate(&self, ctx: &ScanContext<'_>) -> RuleOutcome {
        let Some(scan) = &ctx.keywords else {
            return RuleOutcome::pass();
        };
        // A job description with no usable keywords says nothing about fit.
        if scan.universe_size == 0 {
            return RuleOutcome::pass();
        }

        let shown = scan.matches.match_rate;
        if scan.rate < 30.0 {
            RuleOutcome::pass().penalize(
                15,
                Issue::error(
                    "Keyword Match",
                    format!("Low keyword match with job description ({shown}%)"),
                    "Incorporate more keywords from the job description",
                ),
            )
        } else if scan.rate < 50.0 {
            RuleOutcome::pass().penalize(
                8,
                Issue::warning(
                    "Keyword Match",
                    format!("Moderate keyword match ({shown}%)"),
                    "Try to include more relevant keywords from the job posting",
                ),
            )
        } else {
            RuleOutcome::pass().strength(format!("Strong keyword match ({shown}%)"))
        }
    }
}
