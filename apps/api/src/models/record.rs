use serde::{Deserialize, Serialize};

/// Highest education level found in a résumé.
///
/// Wire labels match the recruiter-facing strings the analysis backends
/// produce ("Master's", "High School", ...). `Other` covers anything a
/// model returns that we cannot map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "High School", alias = "High school", alias = "high school")]
    HighSchool,
    #[serde(rename = "Associate's", alias = "Associates", alias = "Associate")]
    Associates,
    #[serde(rename = "Bachelor's", alias = "Bachelors", alias = "Bachelor")]
    Bachelors,
    #[serde(rename = "Master's", alias = "Masters", alias = "Master")]
    Masters,
    #[serde(rename = "PhD", alias = "Ph.D.", alias = "Doctorate")]
    PhD,
    Other,
}

impl EducationLevel {
    /// Ordinal rank used by the search filter's >= comparison.
    /// PhD=5 down to HighSchool=1; Other ranks below everything.
    pub fn rank(self) -> u8 {
        match self {
            EducationLevel::PhD => 5,
            EducationLevel::Masters => 4,
            EducationLevel::Bachelors => 3,
            EducationLevel::Associates => 2,
            EducationLevel::HighSchool => 1,
            EducationLevel::Other => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "High School",
            EducationLevel::Associates => "Associate's",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Masters => "Master's",
            EducationLevel::PhD => "PhD",
            EducationLevel::Other => "Other",
        }
    }

    /// Lenient mapping for free-form labels coming back from model tiers.
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_lowercase();
        if l.contains("phd") || l.contains("ph.d") || l.contains("doctor") {
            EducationLevel::PhD
        } else if l.contains("master") || l == "mba" || l == "m.s." || l == "msc" {
            EducationLevel::Masters
        } else if l.contains("bachelor") || l == "b.s." || l == "b.a." || l == "bsc" {
            EducationLevel::Bachelors
        } else if l.contains("associate") {
            EducationLevel::Associates
        } else if l.contains("high school") || l.contains("secondary") {
            EducationLevel::HighSchool
        } else {
            EducationLevel::Other
        }
    }
}

impl Default for EducationLevel {
    fn default() -> Self {
        EducationLevel::Bachelors
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured candidate information extracted from one résumé.
///
/// Every field is always populated: extraction degrades to named defaults
/// rather than absent values, so construction can never fail downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience_years: f32,
    pub education_level: EducationLevel,
    pub role: String,
    pub category: String,
}

impl Record {
    /// Enforces the Record invariants on output from model tiers:
    /// skills are deduplicated case-insensitively (first occurrence wins),
    /// experience is clamped non-negative, and blank identity fields fall
    /// back to "Unknown".
    pub fn normalize(mut self) -> Self {
        let mut seen: Vec<String> = Vec::with_capacity(self.skills.len());
        self.skills.retain(|s| {
            let folded = s.trim().to_lowercase();
            if folded.is_empty() || seen.contains(&folded) {
                false
            } else {
                seen.push(folded);
                true
            }
        });
        for skill in &mut self.skills {
            let trimmed = skill.trim();
            if trimmed.len() != skill.len() {
                *skill = trimmed.to_string();
            }
        }
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            self.experience_years = 0.0;
        }
        for field in [&mut self.name, &mut self.email, &mut self.phone] {
            if field.trim().is_empty() {
                *field = "Unknown".to_string();
            }
        }
        if self.role.trim().is_empty() {
            self.role = "Professional".to_string();
        }
        if self.category.trim().is_empty() {
            self.category = "Professional".to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_rank_ordering() {
        assert!(EducationLevel::PhD.rank() > EducationLevel::Masters.rank());
        assert!(EducationLevel::Masters.rank() > EducationLevel::Bachelors.rank());
        assert!(EducationLevel::Bachelors.rank() > EducationLevel::Associates.rank());
        assert!(EducationLevel::Associates.rank() > EducationLevel::HighSchool.rank());
        assert!(EducationLevel::HighSchool.rank() > EducationLevel::Other.rank());
    }

    #[test]
    fn test_education_serializes_with_apostrophe_labels() {
        let json = serde_json::to_string(&EducationLevel::Masters).unwrap();
        assert_eq!(json, "\"Master's\"");
        let json = serde_json::to_string(&EducationLevel::HighSchool).unwrap();
        assert_eq!(json, "\"High School\"");
    }

    #[test]
    fn test_education_deserializes_aliases() {
        let level: EducationLevel = serde_json::from_str("\"Masters\"").unwrap();
        assert_eq!(level, EducationLevel::Masters);
        let level: EducationLevel = serde_json::from_str("\"Ph.D.\"").unwrap();
        assert_eq!(level, EducationLevel::PhD);
    }

    #[test]
    fn test_from_label_free_form() {
        assert_eq!(
            EducationLevel::from_label("Master of Science"),
            EducationLevel::Masters
        );
        assert_eq!(
            EducationLevel::from_label("Doctorate in Physics"),
            EducationLevel::PhD
        );
        assert_eq!(
            EducationLevel::from_label("bootcamp certificate"),
            EducationLevel::Other
        );
    }

    #[test]
    fn test_normalize_dedupes_skills_case_insensitively() {
        let record = Record {
            name: "A".to_string(),
            email: "a@b.c".to_string(),
            phone: "Unknown".to_string(),
            summary: String::new(),
            skills: vec![
                "Python".to_string(),
                "python".to_string(),
                " AWS ".to_string(),
                "aws".to_string(),
                "Rust".to_string(),
            ],
            experience_years: 3.0,
            education_level: EducationLevel::Bachelors,
            role: "Engineer".to_string(),
            category: "Software Engineering".to_string(),
        };
        let normalized = record.normalize();
        assert_eq!(normalized.skills, vec!["Python", "AWS", "Rust"]);
    }

    #[test]
    fn test_normalize_clamps_experience_and_fills_blanks() {
        let record = Record {
            name: "  ".to_string(),
            email: String::new(),
            phone: String::new(),
            summary: String::new(),
            skills: vec![],
            experience_years: -4.0,
            education_level: EducationLevel::Other,
            role: String::new(),
            category: String::new(),
        };
        let normalized = record.normalize();
        assert_eq!(normalized.name, "Unknown");
        assert_eq!(normalized.email, "Unknown");
        assert_eq!(normalized.experience_years, 0.0);
        assert_eq!(normalized.role, "Professional");
        assert_eq!(normalized.category, "Professional");
    }
}
