//! Lenient parsing of model output into a Record.
//!
//! Local models wrap JSON in code fences, prepend prose, or hand back
//! skills as a comma string and experience as a quoted number. Everything
//! here tolerates that; only a body with no recoverable JSON object is a
//! ParseError.

use serde::Deserialize;
use serde_json::Value;

use crate::analyzer::{AnalyzeError, ErrorKind};
use crate::models::record::{EducationLevel, Record};

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    summary: Option<String>,
    skills: Option<Value>,
    #[serde(alias = "experience")]
    experience_years: Option<Value>,
    #[serde(alias = "educationLevel")]
    education_level: Option<String>,
    role: Option<String>,
    category: Option<String>,
}

impl RawAnalysis {
    fn into_record(self) -> Record {
        Record {
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            email: self.email.unwrap_or_else(|| "Unknown".to_string()),
            phone: self.phone.unwrap_or_else(|| "Unknown".to_string()),
            summary: self
                .summary
                .unwrap_or_else(|| "Professional with relevant skills and experience.".to_string()),
            skills: self.skills.map(coerce_skills).unwrap_or_default(),
            experience_years: self.experience_years.map(coerce_years).unwrap_or(0.0),
            education_level: self
                .education_level
                .map(|l| EducationLevel::from_label(&l))
                .unwrap_or(EducationLevel::Other),
            role: self.role.unwrap_or_else(|| "Professional".to_string()),
            category: self.category.unwrap_or_else(|| "Professional".to_string()),
        }
        .normalize()
    }
}

/// Parses the text a model tier returned into a normalized Record.
pub fn parse_analysis(body: &str) -> Result<Record, AnalyzeError> {
    let text = strip_json_fences(body);
    let json = extract_json_object(text).ok_or_else(|| {
        AnalyzeError::new(ErrorKind::ParseError, "no JSON object found in model output")
    })?;
    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| {
        AnalyzeError::new(ErrorKind::ParseError, format!("invalid analysis JSON: {e}"))
    })?;
    Ok(raw.into_record())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Slices from the first `{` to the last `}`, tolerating prose around the
/// object.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn coerce_skills(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce_years(value: Value) -> f32 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0) as f32,
        Value::String(s) => s.trim().trim_end_matches('+').parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_json() {
        let body = r#"{"name": "Jane Doe", "skills": ["Python", "AWS"], "experience_years": 5,
                       "education_level": "Master's", "role": "Engineer",
                       "summary": "Seasoned engineer.", "category": "Software Engineering"}"#;
        let record = parse_analysis(body).unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.skills, vec!["Python", "AWS"]);
        assert_eq!(record.experience_years, 5.0);
        assert_eq!(record.education_level, EducationLevel::Masters);
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let body = "Here is the analysis:\n```json\n{\"name\": \"Bob\", \"skills\": []}\n```";
        let record = parse_analysis(body).unwrap();
        assert_eq!(record.name, "Bob");
        assert_eq!(record.email, "Unknown");
    }

    #[test]
    fn test_parse_json_embedded_in_text() {
        let body = "Sure! {\"name\": \"Ann\"} Hope that helps.";
        assert_eq!(parse_analysis(body).unwrap().name, "Ann");
    }

    #[test]
    fn test_parse_no_json_is_parse_error() {
        let err = parse_analysis("I could not process that resume.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }

    #[test]
    fn test_skills_as_comma_string_coerced() {
        let body = r#"{"skills": "Python, AWS , Docker"}"#;
        let record = parse_analysis(body).unwrap();
        assert_eq!(record.skills, vec!["Python", "AWS", "Docker"]);
    }

    #[test]
    fn test_experience_as_string_coerced() {
        let body = r#"{"experience": "7+"}"#;
        assert_eq!(parse_analysis(body).unwrap().experience_years, 7.0);
    }

    #[test]
    fn test_duplicate_skills_normalized_away() {
        let body = r#"{"skills": ["Python", "python", "PYTHON", "Go"]}"#;
        assert_eq!(parse_analysis(body).unwrap().skills, vec!["Python", "Go"]);
    }

    #[test]
    fn test_unknown_education_maps_to_other() {
        let body = r#"{"education_level": "Unknown"}"#;
        assert_eq!(
            parse_analysis(body).unwrap().education_level,
            EducationLevel::Other
        );
    }

    #[test]
    fn test_negative_experience_clamped() {
        let body = r#"{"experience_years": -3}"#;
        assert_eq!(parse_analysis(body).unwrap().experience_years, 0.0);
    }
}
