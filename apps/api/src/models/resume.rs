use serde::{Deserialize, Serialize};
use serde_json::Value;

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn texts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        })
    }

    /// Keeps the entries that parse, drops the rest.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn optional_list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<Value>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(items),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }
}

/// A resume as submitted by the form flow.
///
/// Every field defaults so partially filled documents still deserialize, and
/// each field tolerates loose client typing: numbers where text is expected
/// become text, and values of the wrong shape read as absent. Optional fields
/// are omitted on serialization so the serialized text only carries what the
/// user actually entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(deserialize_with = "lenient::object")]
    pub personal_info: PersonalInfo,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "lenient::list")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "lenient::list")]
    pub skills: Vec<SkillCategory>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_list"
    )]
    pub projects: Option<Vec<Value>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_list"
    )]
    pub certifications: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub phone: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub location: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub linkedin: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub github: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub company: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub role: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub start_date: Option<String>,
    /// `None` for a current position.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub end_date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::texts")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub degree: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub institution: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub location: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub start_date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub end_date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub gpa: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub honors: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillCategory {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub category: String,
    #[serde(deserialize_with = "lenient::texts")]
    pub items: Vec<String>,
}

/// True when an optional text field is absent or whitespace-only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl ResumeDocument {
    /// Typed view of an arbitrary JSON document. Anything that is not an
    /// object yields an empty resume.
    pub fn from_value(document: &Value) -> Self {
        Self::deserialize(document).unwrap_or_default()
    }

    pub fn total_skill_items(&self) -> usize {
        self.skills.iter().map(|s| s.items.len()).sum()
    }

    pub fn total_achievements(&self) -> usize {
        self.work_experience.iter().map(|e| e.achievements.len()).sum()
    }

    /// Iterates every achievement bullet across all experience entries.
    pub fn achievements(&self) -> impl Iterator<Item = &str> {
        self.work_experience
            .iter()
            .flat_map(|e| e.achievements.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_deserializes_with_defaults() {
        let json = r#"{"personalInfo": {"name": "Ada"}}"#;
        let doc: ResumeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.personal_info.name.as_deref(), Some("Ada"));
        assert!(doc.work_experience.is_empty());
        assert!(doc.skills.is_empty());
        assert!(doc.projects.is_none());
    }

    #[test]
    fn test_camel_case_field_names() {
        let json = r#"{
            "workExperience": [{"company": "Acme", "role": "Dev", "startDate": "2020-01", "achievements": ["Built it"]}],
            "skills": [{"category": "Languages", "items": ["Rust", "Go"]}]
        }"#;
        let doc: ResumeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.work_experience[0].start_date.as_deref(), Some("2020-01"));
        assert_eq!(doc.total_skill_items(), 2);
        assert_eq!(doc.total_achievements(), 1);
    }

    #[test]
    fn test_absent_optionals_are_not_serialized() {
        let doc = ResumeDocument::default();
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            text,
            r#"{"personalInfo":{},"workExperience":[],"education":[],"skills":[]}"#
        );
    }

    #[test]
    fn test_numeric_scalars_read_as_text() {
        let json = r#"{
            "personalInfo": {"name": "Ada", "phone": 5550100},
            "education": [{"degree": "BSc", "institution": "MIT", "gpa": 3.8, "endDate": 2012}],
            "skills": [{"category": 7, "items": ["Rust", 42, null, {"x": 1}]}]
        }"#;
        let doc: ResumeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.personal_info.phone.as_deref(), Some("5550100"));
        assert_eq!(doc.education[0].gpa.as_deref(), Some("3.8"));
        assert_eq!(doc.education[0].end_date.as_deref(), Some("2012"));
        assert_eq!(doc.skills[0].category, "7");
        assert_eq!(doc.skills[0].items, vec!["Rust", "42"]);
    }

    #[test]
    fn test_wrong_shapes_read_as_absent() {
        let json = serde_json::json!({
            "personalInfo": "Ada",
            "summary": {"text": "nested"},
            "workExperience": [{"company": "Acme", "achievements": "one line"}, "junk"],
            "education": null,
            "projects": "none"
        });
        let doc = ResumeDocument::from_value(&json);
        assert_eq!(doc.personal_info, PersonalInfo::default());
        assert!(doc.summary.is_none());
        assert_eq!(doc.work_experience.len(), 1);
        assert_eq!(doc.work_experience[0].company.as_deref(), Some("Acme"));
        assert!(doc.work_experience[0].achievements.is_empty());
        assert!(doc.education.is_empty());
        assert!(doc.projects.is_none());
    }

    #[test]
    fn test_non_object_document_is_empty_resume() {
        let doc = ResumeDocument::from_value(&serde_json::json!(["not", "a", "resume"]));
        assert_eq!(doc, ResumeDocument::default());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("x")));
    }
}
