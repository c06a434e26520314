// Prompt constants for the model-backed analysis tiers. Both the remote
// and local backends share one extraction prompt so their outputs parse
// through the same path.

/// System prompt that enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an AI assistant that specializes in resume analysis. \
    Extract key information from resumes accurately. \
    You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object.";

/// Model inputs are truncated to this many characters to respect context
/// limits, matching the bound the analysis backends were tuned for.
pub const MAX_PROMPT_CHARS: usize = 6000;

/// Builds the extraction prompt for a résumé text (pre-truncated by the
/// caller via [`truncate_chars`]).
pub fn analysis_prompt(resume_text: &str) -> String {
    format!(
        "Analyze the following resume text and extract key information.\n\n\
         RESUME TEXT:\n{resume_text}\n\n\
         Based on the resume above, extract and return ONLY the following fields in JSON format:\n\n\
         1. name: The full name of the person\n\
         2. email: Contact email address, or \"Unknown\"\n\
         3. phone: Contact phone number, or \"Unknown\"\n\
         4. summary: A 1-2 sentence professional summary\n\
         5. skills: An array of professional skills mentioned in the resume\n\
         6. experience_years: The years of professional experience (as a number)\n\
         7. education_level: The highest level of education (High School, Associate's, Bachelor's, Master's, PhD, or Other)\n\
         8. role: The primary job role or title\n\
         9. category: The job category that best matches this resume (e.g. Software Engineering, Data Science, Marketing)\n\n\
         Format your response as a valid JSON object with these nine keys. \
         DO NOT include any explanations before or after the JSON."
    )
}

/// Truncates to a character count without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
