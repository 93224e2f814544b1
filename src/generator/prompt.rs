//! Prompt construction for outline generation and section refinement.
//!
//! Prompts are deterministic functions of the request, so tests can assert
//! on their content without a live model. Structure rules are keyed off the
//! document level: procedures get a flow diagram, form/record documents get
//! a fill-in table, official correspondence gets a letter skeleton.

use crate::models::{DocLevel, Tone};

use super::{OutlineRequest, RefineAction};

/// JSON shape the model must return. Kept in the prompt verbatim so the
/// parser and the instruction never drift apart.
pub const OUTLINE_SCHEMA: &str =
    r#"{"sections": [{"title": "1.0 Purpose", "content": "..."}]}"#;

fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Standard => {
            "Write in precise, impersonal quality-system language. \
             Use 'shall' for binding requirements."
        }
        Tone::Hr => {
            "Write in clear, approachable language addressed to employees. \
             Prefer 'you' and plain verbs over regulatory phrasing."
        }
        Tone::Official => {
            "Write in formal official-correspondence register suitable for \
             submission to an external authority."
        }
    }
}

fn structure_instruction(level: DocLevel) -> &'static str {
    match level {
        DocLevel::Manual => {
            "Produce top-level manual chapters (Purpose, Scope, Terms, \
             Responsibilities, Quality Policy, and the process chapters the \
             topic calls for). Each section is narrative prose with '## ' \
             subheadings where useful."
        }
        DocLevel::Procedure => {
            "Produce numbered procedure sections (1.0 Purpose, 2.0 Scope, \
             3.0 Responsibilities, 4.0 Procedure, 5.0 Records). In the \
             procedure body, include one fenced ```mermaid flowchart \
             (graph TD) describing the process flow, plus numbered steps."
        }
        DocLevel::WorkInstruction => {
            "Produce short, action-first sections. The core section is a \
             numbered step list ('1. ...') an operator can follow at the \
             workstation. Include a '> ' safety callout where relevant."
        }
        DocLevel::FormRecord => {
            "Produce a fill-in form: one section with a pipe table whose \
             header row names the fields to record (| Item | Result | \
             Checked by | Date |) and empty body rows for entries, plus a \
             short instructions section."
        }
    }
}

/// Build the full outline-generation prompt for one request.
pub fn outline_prompt(request: &OutlineRequest) -> String {
    let mut prompt = format!(
        "You are drafting a controlled quality-system document.\n\
         Document level: {}.\n\
         Category: {}.\n\
         Topic: {}\n\n",
        request.level.label(),
        request.category,
        request.topic,
    );

    if !request.context.trim().is_empty() {
        prompt.push_str("Background and constraints:\n");
        prompt.push_str(request.context.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str(tone_instruction(request.tone));
    prompt.push('\n');
    prompt.push_str(structure_instruction(request.level));
    prompt.push_str(
        "\n\nWhere company identity appears (legal name, tax ID, address, \
         signatory), insert placeholder tokens like {{COMPANY_NAME}} instead \
         of inventing values.\n\n",
    );
    prompt.push_str(&format!(
        "Respond with JSON only, no prose around it, exactly this shape:\n{OUTLINE_SCHEMA}\n\
         Every section needs a non-empty title. Do not return an empty sections array."
    ));

    prompt
}

/// Build the prompt for a single-section refinement.
pub fn refine_prompt(content: &str, action: RefineAction) -> String {
    let instruction = match action {
        RefineAction::Polish => {
            "Fix grammar, spelling and awkward phrasing in the following \
             section. Keep the meaning, the formatting (headings, lists, \
             tables, fenced blocks) and all {{...}} and [[REF:...]] tokens \
             exactly as they are. Return only the revised text."
        }
        RefineAction::Check => {
            "Review the following quality-document section for gaps: missing \
             responsibilities, unmeasurable requirements, undefined terms, \
             absent record-keeping. Return only a '- ' bulleted list of \
             findings, most important first."
        }
        RefineAction::RephraseFormal => {
            "Rewrite the following section in formal official-correspondence \
             register. Keep all {{...}} and [[REF:...]] tokens exactly as \
             they are. Return only the rewritten text."
        }
    };

    format!("{instruction}\n\n---\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(level: DocLevel, tone: Tone) -> OutlineRequest {
        OutlineRequest {
            topic: "Incoming goods inspection".into(),
            level,
            category: "iso".into(),
            tone,
            context: "ISO 9001:2015 clause 8.4 applies.".into(),
        }
    }

    #[test]
    fn outline_prompt_carries_topic_level_and_context() {
        let p = outline_prompt(&request(DocLevel::Procedure, Tone::Standard));
        assert!(p.contains("Incoming goods inspection"));
        assert!(p.contains("Procedure"));
        assert!(p.contains("clause 8.4"));
        assert!(p.contains("mermaid"));
        assert!(p.contains(OUTLINE_SCHEMA));
    }

    #[test]
    fn form_level_asks_for_a_table() {
        let p = outline_prompt(&request(DocLevel::FormRecord, Tone::Standard));
        assert!(p.contains("pipe table"));
        assert!(!p.contains("mermaid"));
    }

    #[test]
    fn blank_context_is_omitted() {
        let mut req = request(DocLevel::Manual, Tone::Hr);
        req.context = "   ".into();
        let p = outline_prompt(&req);
        assert!(!p.contains("Background and constraints"));
        assert!(p.contains("approachable"));
    }

    #[test]
    fn refine_prompts_differ_per_action() {
        let text = "The {{COMPANY_NAME}} shall inspect.";
        let polish = refine_prompt(text, RefineAction::Polish);
        let check = refine_prompt(text, RefineAction::Check);
        let formal = refine_prompt(text, RefineAction::RephraseFormal);
        assert!(polish.contains("Fix grammar"));
        assert!(check.contains("bulleted list"));
        assert!(formal.contains("official-correspondence"));
        for p in [polish, check, formal] {
            assert!(p.ends_with(text));
        }
    }
}
