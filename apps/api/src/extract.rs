//! Deterministic field extraction. The last-resort analysis tier and the
//! baseline oracle for everything the model tiers produce.
//!
//! Every function here is total: absence of signal degrades to a named
//! default, never an error, so `analyze` can always assemble a full Record.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::record::{EducationLevel, Record};

const NAME_STOPLIST: &[&str] = &[
    "resume", "cv", "curriculum", "vitae", "address", "phone", "email",
];

const TECH_SKILLS: &[&str] = &[
    "python", "javascript", "typescript", "java", "c++", "c#", "ruby", "php", "swift", "kotlin",
    "go", "react", "angular", "vue", "node.js", "express", "django", "flask", "spring", "asp.net",
    "html", "css", "sass", "less", "bootstrap", "tailwind", "material-ui", "jquery", "sql",
    "nosql", "mongodb", "mysql", "postgresql", "oracle", "firebase", "redis", "elasticsearch",
    "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "git", "github", "gitlab",
    "bitbucket", "rest", "graphql", "grpc", "microservices", "serverless", "ci/cd", "devops",
    "mlops", "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy", "matplotlib", "seaborn",
    "machine learning", "deep learning", "natural language processing", "computer vision",
    "data science", "agile", "scrum", "kanban", "jira", "confluence", "trello", "asana",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership", "management", "communication", "teamwork", "problem-solving",
    "critical thinking", "creativity", "time management", "organization", "adaptability",
    "flexibility", "resilience", "emotional intelligence", "conflict resolution", "negotiation",
    "presentation", "public speaking", "customer service", "client relations", "mentoring",
    "coaching", "collaboration", "attention to detail",
];

const DEFAULT_SKILLS: &[&str] = &["Communication", "Problem Solving", "Teamwork"];

const MAX_SKILLS: usize = 15;

const JOB_TITLES: &[&str] = &[
    "software engineer", "software developer", "web developer", "frontend developer",
    "backend developer", "full stack developer", "data scientist", "data analyst",
    "product manager", "project manager", "program manager", "business analyst", "ux designer",
    "ui designer", "graphic designer", "marketing manager", "sales manager", "account manager",
    "customer success manager", "operations manager", "human resources", "hr manager",
    "recruiter", "talent acquisition",
];

const ROLE_LINE_KEYWORDS: &[&str] = &[
    "engineer", "developer", "manager", "analyst", "designer", "specialist", "consultant",
];

const SUMMARY_HEADERS: &[&str] = &[
    "professional summary", "summary", "profile", "objective", "about me", "career objective",
    "professional profile",
];

pub const DEFAULT_SUMMARY_MAX_LEN: usize = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECH_SKILLS
        .iter()
        .chain(SOFT_SKILLS.iter())
        .map(|&skill| {
            let pattern = format!(r"\b{}\b", regex::escape(skill));
            (skill, Regex::new(&pattern).unwrap())
        })
        .collect()
});

static EDUCATION_PATTERNS: Lazy<Vec<(EducationLevel, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .map(|p| Regex::new(&format!(r"\b{p}\b")).unwrap())
            .collect::<Vec<_>>()
    };
    // Priority order: first matching level wins, PhD down to High School.
    vec![
        (
            EducationLevel::PhD,
            compile(&[r"ph\.?d\.?", "doctor of philosophy", "doctorate"]),
        ),
        (
            EducationLevel::Masters,
            compile(&["master", r"m\.s\.", r"m\.a\.", "mba", "msc"]),
        ),
        (
            EducationLevel::Bachelors,
            compile(&["bachelor", r"b\.s\.", r"b\.a\.", "bsc", "undergraduate"]),
        ),
        (
            EducationLevel::Associates,
            compile(&["associate", r"a\.s\.", r"a\.a\."]),
        ),
        (
            EducationLevel::HighSchool,
            compile(&["high school", "secondary", "hs diploma"]),
        ),
    ]
});

static EXPERIENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+)\+?\s*years?\s*(?:of)?\s*experience",
        r"experience\s*(?:of)?\s*(\d+)\+?\s*years?",
        r"worked\s*(?:for)?\s*(\d+)\+?\s*years?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static JOB_TITLE_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "senior", "junior", "lead", "manager", "director", "vp", "chief", "engineer", "developer",
        "analyst", "specialist", "consultant", "coordinator", "associate", "assistant", "head",
        "supervisor",
    ]
    .iter()
    .map(|kw| Regex::new(&format!(r"\b{kw}\b")).unwrap())
    .collect()
});

/// Assembles a full Record from raw résumé text. Infallible.
pub fn analyze(text: &str) -> Record {
    let skills = extract_skills(text);
    let category = derive_category(&skills);
    Record {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
        summary: extract_summary(text, DEFAULT_SUMMARY_MAX_LEN),
        experience_years: extract_experience_years(text),
        education_level: extract_education(text),
        role: extract_role(text),
        skills,
        category,
    }
}

/// Scans the first 5 lines for a short line that is not a document-header
/// keyword. Default "Unknown".
pub fn extract_name(text: &str) -> String {
    for line in text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(5)
    {
        if line.chars().count() >= 40 {
            continue;
        }
        let lower = line.to_lowercase();
        if !NAME_STOPLIST.iter().any(|kw| lower.contains(kw)) {
            return line.to_string();
        }
    }
    "Unknown".to_string()
}

pub fn extract_email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn extract_phone(text: &str) -> String {
    PHONE_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Matches the fixed technical and soft skill vocabularies against the text
/// with word-boundary patterns. Matches are title-cased, deduplicated,
/// sorted, and capped at 15. Never returns an empty list.
pub fn extract_skills(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let mut found = std::collections::BTreeSet::new();
    for (skill, pattern) in SKILL_PATTERNS.iter() {
        if pattern.is_match(&text) {
            found.insert(title_case(skill));
        }
    }
    if found.is_empty() {
        return DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect();
    }
    found.into_iter().take(MAX_SKILLS).collect()
}

/// Returns the highest education level whose pattern matches, checking in
/// PhD-to-HighSchool priority order. Default Bachelors when no signal is
/// found (a deliberate choice, not absence of data).
pub fn extract_education(text: &str) -> EducationLevel {
    let text = text.to_lowercase();
    for (level, patterns) in EDUCATION_PATTERNS.iter() {
        if patterns.iter().any(|p| p.is_match(&text)) {
            return *level;
        }
    }
    EducationLevel::Bachelors
}

/// Looks for an explicit "N years of experience" mention; otherwise
/// estimates from seniority-keyword density as min(count * 2, 15);
/// otherwise 2. Always non-negative.
pub fn extract_experience_years(text: &str) -> f32 {
    let text = text.to_lowercase();
    for pattern in EXPERIENCE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&text) {
            if let Ok(years) = caps[1].parse::<f32>() {
                return years;
            }
        }
    }
    let keyword_count: usize = JOB_TITLE_INDICATORS
        .iter()
        .map(|p| p.find_iter(&text).count())
        .sum();
    if keyword_count > 0 {
        return (keyword_count as f32 * 2.0).min(15.0);
    }
    2.0
}

/// Finds the first known job title appearing in the text; otherwise takes
/// the first of the opening 10 lines that mentions a generic role keyword.
/// Default "Professional".
pub fn extract_role(text: &str) -> String {
    let text = text.to_lowercase();
    for title in JOB_TITLES {
        if text.contains(title) {
            return title_case(title);
        }
    }
    for line in text.lines().take(10) {
        let line = line.trim();
        if ROLE_LINE_KEYWORDS.iter().any(|kw| line.contains(kw)) {
            return title_case(line);
        }
    }
    "Professional".to_string()
}

/// Extracts a summary: an explicit summary/objective section if present,
/// otherwise the opening paragraph, truncated to `max_len` chars on a word
/// boundary. If both come up empty, synthesizes one from role, experience,
/// and top skills.
pub fn extract_summary(text: &str, max_len: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut summary = find_section_after_header(&lines)
        .unwrap_or_else(|| collect_paragraph(lines.iter().take(10).copied()));

    if summary.chars().count() > max_len {
        let truncated: String = summary.chars().take(max_len).collect();
        summary = match truncated.rfind(' ') {
            Some(idx) => format!("{}...", &truncated[..idx]),
            None => format!("{truncated}..."),
        };
    }

    if summary.is_empty() {
        let role = extract_role(text);
        let skills = extract_skills(text);
        let years = format_years(extract_experience_years(text));
        let top_skills: Vec<&str> = skills.iter().take(3).map(String::as_str).collect();
        summary = format!(
            "{role} with {years} years of experience in {}.",
            top_skills.join(", ")
        );
    }

    summary
}

fn find_section_after_header(lines: &[&str]) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        let lower = line.trim().to_lowercase();
        if SUMMARY_HEADERS.iter().any(|h| lower.contains(h)) {
            let end = (i + 5).min(lines.len());
            let section = collect_paragraph(lines[i + 1..end].iter().copied());
            if !section.is_empty() {
                return Some(section);
            }
        }
    }
    None
}

/// Joins contiguous substantial lines (over 10 chars after trimming),
/// stopping at the first break once content has been collected.
fn collect_paragraph<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut collected: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.trim();
        if !line.is_empty() && line.chars().count() > 10 {
            collected.push(line);
        } else if !collected.is_empty() {
            break;
        }
    }
    collected.join(" ")
}

/// Assigns a job category from the skill list by keyword family counts,
/// ties going to "Professional". Single-word keywords match whole tokens
/// of a skill ("r" matches the skill "R", not "React"); multi-word
/// keywords match as phrases.
pub fn derive_category(skills: &[String]) -> String {
    const TECH: &[&str] = &[
        "python", "javascript", "java", "react", "angular", "node", "web", "frontend", "backend",
        "fullstack", "software", "developer", "engineer", "aws", "azure", "gcp", "docker",
        "kubernetes", "devops",
    ];
    const DATA: &[&str] = &[
        "data", "analytics", "analysis", "science", "machine learning", "ai",
        "artificial intelligence", "statistics", "statistical", "python", "r", "sql", "tableau",
        "powerbi",
    ];
    const DESIGN: &[&str] = &[
        "design", "ui", "ux", "user interface", "user experience", "graphic", "adobe",
        "photoshop", "illustrator", "figma", "sketch",
    ];

    let count = |keywords: &[&str]| {
        skills
            .iter()
            .filter(|skill| {
                let lower = skill.to_lowercase();
                keywords.iter().any(|kw| {
                    if kw.contains(' ') {
                        lower.contains(kw)
                    } else {
                        lower.split(|c: char| !c.is_alphanumeric()).any(|t| t == *kw)
                    }
                })
            })
            .count()
    };

    let tech = count(TECH);
    let data = count(DATA);
    let design = count(DESIGN);

    if tech > data && tech > design {
        "Software Engineering".to_string()
    } else if data > tech && data > design {
        "Data Science".to_string()
    } else if design > tech && design > data {
        "Design".to_string()
    } else {
        "Professional".to_string()
    }
}

/// Python-style title casing: uppercase each letter that follows a
/// non-letter, lowercase the rest ("machine learning" -> "Machine
/// Learning", "node.js" -> "Node.Js").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn format_years(years: f32) -> String {
    if years.fract() == 0.0 {
        format!("{}", years as i64)
    } else {
        format!("{years}")
    }
}
