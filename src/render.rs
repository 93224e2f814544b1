//! Template substitution and cross-reference resolution.
//!
//! Resolution is a pure function over the stored text: `{{KEY}}` variable
//! tokens and `[[REF:id]]` document references are replaced at render time
//! only, never in the stored content. The same section therefore re-renders
//! correctly under a different active company profile with no data loss.

use regex::Regex;
use uuid::Uuid;

use crate::models::{Document, VariableProfile};

/// Marker substituted for a `[[REF:id]]` whose target is unknown. A missing
/// reference is a document-integrity defect the author must see and fix, so
/// it renders loudly instead of vanishing or failing the render.
pub const BROKEN_REF_MARKER: &str = "[unresolved reference]";

const REF_PATTERN: &str = r"\[\[REF:(.*?)\]\]";

/// Resolve variable and reference tokens in one section body.
///
/// Variables: every literal `{{KEY}}` occurrence is replaced with the
/// profile's value for KEY, or with the literal key name when the value is
/// empty — a token never silently collapses into blank space. Without a
/// profile, variable tokens pass through unchanged.
///
/// References: `[[REF:<id>]]` becomes "Title (DOC-NO)" for a known document
/// and [`BROKEN_REF_MARKER`] otherwise. Never panics, never drops a token.
pub fn resolve(
    text: &str,
    profile: Option<&VariableProfile>,
    documents: &[Document],
) -> String {
    let mut resolved = text.to_string();

    if let Some(profile) = profile {
        for (key, value) in &profile.variables {
            let token = format!("{{{{{key}}}}}");
            let replacement = if value.is_empty() { key } else { value };
            resolved = resolved.replace(&token, replacement);
        }
    }

    let re = Regex::new(REF_PATTERN).unwrap();
    re.replace_all(&resolved, |caps: &regex::Captures<'_>| {
        let id = &caps[1];
        match Uuid::parse_str(id)
            .ok()
            .and_then(|id| documents.iter().find(|d| d.id == id))
        {
            Some(target) => format!("{} ({})", target.title, target.doc_number),
            None => BROKEN_REF_MARKER.to_string(),
        }
    })
    .into_owned()
}

/// The literal stored form of a variable token, for editor insertion.
/// Stored content keeps the unresolved token; only rendered views resolve.
pub fn variable_token(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

/// The literal stored form of a document reference token.
pub fn reference_token(doc_id: Uuid) -> String {
    format!("[[REF:{doc_id}]]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn profile() -> VariableProfile {
        VariableProfile::new("Default Company")
            .with_variable("COMPANY_NAME", "Example Tech Ltd")
            .with_variable("TAX_ID", "88888888")
            .with_variable("CEO", "")
    }

    fn known_doc() -> Document {
        let mut doc = Document::new_blank("Admin", "iso");
        doc.title = "Quality Manual".into();
        doc.doc_number = "QM-01".into();
        doc
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let text = "No tokens here, just prose.";
        assert_eq!(resolve(text, Some(&profile()), &[]), text);
        // Idempotent on token-free text
        let once = resolve(text, Some(&profile()), &[]);
        assert_eq!(resolve(&once, Some(&profile()), &[]), once);
    }

    #[test]
    fn variables_replace_all_occurrences() {
        let text = "{{COMPANY_NAME}} requires {{COMPANY_NAME}} staff to comply.";
        let out = resolve(text, Some(&profile()), &[]);
        assert_eq!(out, "Example Tech Ltd requires Example Tech Ltd staff to comply.");
        assert!(!out.contains("{{COMPANY_NAME}}"));
    }

    #[test]
    fn empty_value_falls_back_to_literal_key() {
        let out = resolve("Signed by {{CEO}}.", Some(&profile()), &[]);
        assert_eq!(out, "Signed by CEO.");
    }

    #[test]
    fn no_profile_leaves_variable_tokens_intact() {
        let text = "Tax ID: {{TAX_ID}}";
        assert_eq!(resolve(text, None, &[]), text);
    }

    #[test]
    fn unknown_keys_are_untouched() {
        let out = resolve("{{NOT_A_KEY}}", Some(&profile()), &[]);
        assert_eq!(out, "{{NOT_A_KEY}}");
    }

    #[test]
    fn known_reference_renders_title_and_number() {
        let target = known_doc();
        let text = format!("See {} for details.", reference_token(target.id));
        let out = resolve(&text, None, std::slice::from_ref(&target));
        assert_eq!(out, "See Quality Manual (QM-01) for details.");
    }

    #[test]
    fn unknown_reference_renders_broken_marker() {
        let text = format!("See {}.", reference_token(Uuid::new_v4()));
        let out = resolve(&text, None, &[]);
        assert!(out.contains(BROKEN_REF_MARKER));
        assert!(!out.contains("[[REF:"));
    }

    #[test]
    fn malformed_reference_id_renders_broken_marker() {
        let out = resolve("[[REF:not-a-uuid]]", None, &[known_doc()]);
        assert_eq!(out, BROKEN_REF_MARKER);
    }

    #[test]
    fn variables_and_references_resolve_independently() {
        let target = known_doc();
        let text = format!(
            "{{{{COMPANY_NAME}}}} follows {} and {}.",
            reference_token(target.id),
            reference_token(Uuid::new_v4()),
        );
        let out = resolve(&text, Some(&profile()), std::slice::from_ref(&target));
        assert!(out.starts_with("Example Tech Ltd follows Quality Manual (QM-01)"));
        assert!(out.contains(BROKEN_REF_MARKER));
    }

    #[test]
    fn insertion_helpers_emit_literal_syntax() {
        assert_eq!(variable_token("TAX_ID"), "{{TAX_ID}}");
        let id = Uuid::new_v4();
        assert_eq!(reference_token(id), format!("[[REF:{id}]]"));
    }
}
