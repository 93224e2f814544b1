//! Parsing of model output into a validated [`DocOutline`].
//!
//! Models wrap JSON in markdown fences despite instructions, so the parser
//! strips ```json fences before deserializing, then validates the result:
//! an empty outline or a section without a title is rejected, never written
//! into a document.

use tracing::warn;

use super::{DocOutline, GeneratorError};

/// Strip a surrounding markdown code fence (```json ... ``` or ``` ... ```).
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Parse and validate an outline-generation response.
pub fn parse_outline(response: &str) -> Result<DocOutline, GeneratorError> {
    let json = strip_code_fences(response);
    if json.is_empty() {
        return Err(GeneratorError::MalformedResponse(
            "model returned an empty response".into(),
        ));
    }

    let outline: DocOutline = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "outline response was not valid JSON");
        GeneratorError::JsonParsing(e.to_string())
    })?;

    if outline.sections.is_empty() {
        return Err(GeneratorError::EmptyOutline);
    }
    if outline.sections.iter().any(|s| s.title.trim().is_empty()) {
        return Err(GeneratorError::MalformedResponse(
            "outline contains a section with an empty title".into(),
        ));
    }

    Ok(outline)
}

/// Validate a refinement response: refinement replaces the section body, so
/// blank output would destroy the author's text and is rejected instead.
pub fn parse_refinement(response: &str) -> Result<String, GeneratorError> {
    let text = strip_code_fences(response);
    if text.is_empty() {
        return Err(GeneratorError::MalformedResponse(
            "model returned an empty refinement".into(),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let outline = parse_outline(
            r#"{"sections": [{"title": "1.0 Purpose", "content": "Defines..."}]}"#,
        )
        .unwrap();
        assert_eq!(outline.sections.len(), 1);
        assert_eq!(outline.sections[0].title, "1.0 Purpose");
    }

    #[test]
    fn strips_json_fences() {
        let fenced = "```json\n{\"sections\": [{\"title\": \"2.0 Scope\", \"content\": \"All sites.\"}]}\n```";
        let outline = parse_outline(fenced).unwrap();
        assert_eq!(outline.sections[0].content, "All sites.");
    }

    #[test]
    fn strips_anonymous_fences() {
        let fenced = "```\n{\"sections\": [{\"title\": \"A\", \"content\": \"\"}]}\n```";
        assert!(parse_outline(fenced).is_ok());
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let outline = parse_outline(r#"{"sections": [{"title": "3.0 Records"}]}"#).unwrap();
        assert_eq!(outline.sections[0].content, "");
    }

    #[test]
    fn empty_sections_array_is_rejected() {
        assert!(matches!(
            parse_outline(r#"{"sections": []}"#),
            Err(GeneratorError::EmptyOutline)
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        let res = parse_outline(r#"{"sections": [{"title": "  ", "content": "x"}]}"#);
        assert!(matches!(res, Err(GeneratorError::MalformedResponse(_))));
    }

    #[test]
    fn prose_instead_of_json_is_rejected() {
        assert!(matches!(
            parse_outline("Here is your outline: Purpose, Scope..."),
            Err(GeneratorError::JsonParsing(_))
        ));
    }

    #[test]
    fn empty_response_is_rejected() {
        assert!(parse_outline("").is_err());
        assert!(parse_outline("```json\n```").is_err());
    }

    #[test]
    fn refinement_keeps_text_and_rejects_blank() {
        assert_eq!(parse_refinement("Tightened text.").unwrap(), "Tightened text.");
        assert!(parse_refinement("   ").is_err());
    }
}
