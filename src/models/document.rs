//! Central document entity and its typed clone constructors.
//!
//! Every way a new `Document` comes into existence (blank, from a template,
//! as a template, spun off as a revision) is an explicit constructor that
//! enumerates which fields carry over and which reset. Implicit whole-object
//! copying is deliberately avoided: the carry/reset decisions are the
//! workflow-critical part of this model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::enums::{DecisionStatus, DocLevel, DocStatus};

/// A titled block of document body text. Order within `Document::sections`
/// is user-controlled and meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSection {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

impl DocSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A named participant who must sign off before final approval.
/// Tracked per document; decisions reset on every new review round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: Uuid,
    pub name: String,
    pub status: DecisionStatus,
    pub decided_on: Option<NaiveDate>,
    pub note: Option<String>,
}

impl Reviewer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: DecisionStatus::Pending,
            decided_on: None,
            note: None,
        }
    }

    /// Drop any recorded decision, returning the reviewer to pending.
    pub fn reset(&mut self) {
        self.status = DecisionStatus::Pending;
        self.decided_on = None;
        self.note = None;
    }
}

/// The single role whose sign-off moves a document to `approved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalApprover {
    pub name: String,
    pub status: DecisionStatus,
    pub decided_on: Option<NaiveDate>,
    pub note: Option<String>,
}

impl FinalApprover {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DecisionStatus::Pending,
            decided_on: None,
            note: None,
        }
    }

    pub fn reset(&mut self) {
        self.status = DecisionStatus::Pending;
        self.decided_on = None;
        self.note = None;
    }
}

/// One append-only history entry recording the version a revision superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub id: Uuid,
    /// Version string the document held immediately before this revision.
    pub version: String,
    pub date: NaiveDate,
    pub description: String,
    pub author: String,
}

/// Written exactly once, at final approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLog {
    pub approver_name: String,
    pub timestamp: DateTime<Utc>,
    /// SHA-256 over the approved title and section contents.
    pub integrity_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    /// User-assigned identifier, unique across non-revision documents.
    pub doc_number: String,
    /// `MAJOR.MINOR` decimal form, e.g. "1.0", "2.3".
    pub version: String,
    pub level: DocLevel,
    /// Must name an entry in the category registry.
    pub category: String,
    pub department: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub status: DocStatus,
    pub sections: Vec<DocSection>,
    pub reviewers: Vec<Reviewer>,
    pub final_approver: FinalApprover,
    /// Append-only; grows only when a revision is spun off.
    pub revisions: Vec<RevisionEntry>,
    pub approval_log: Option<ApprovalLog>,
    pub is_template: bool,
}

/// Placeholder sections seeded into a blank draft.
const BLANK_SECTIONS: &[(&str, &str)] = &[
    ("1.0 Purpose", "Describe the purpose of this document here..."),
    ("2.0 Scope", "Describe the applicable scope here..."),
];

impl Document {
    /// A fresh blank draft with placeholder sections.
    pub fn new_blank(author: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Untitled draft".into(),
            doc_number: "DOC-TEMP".into(),
            version: "1.0".into(),
            level: DocLevel::Procedure,
            category: category.into(),
            department: "Unassigned".into(),
            author: author.into(),
            created_at: Utc::now(),
            status: DocStatus::Draft,
            sections: BLANK_SECTIONS
                .iter()
                .map(|(t, c)| DocSection::new(*t, *c))
                .collect(),
            reviewers: Vec::new(),
            final_approver: FinalApprover::pending("Management Representative"),
            revisions: Vec::new(),
            approval_log: None,
            is_template: false,
        }
    }

    /// A new draft seeded from a template.
    ///
    /// Carries over: title, doc number, level, category, department, sections,
    /// approver name. Resets: id, version ("1.0"), status (draft), reviewers,
    /// approver decision, revision history, approval log, template flag.
    pub fn from_template(template: &Document, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: template.title.clone(),
            doc_number: template.doc_number.clone(),
            version: "1.0".into(),
            level: template.level,
            category: template.category.clone(),
            department: template.department.clone(),
            author: author.into(),
            created_at: Utc::now(),
            status: DocStatus::Draft,
            sections: template.sections.clone(),
            reviewers: Vec::new(),
            final_approver: FinalApprover::pending(template.final_approver.name.clone()),
            revisions: Vec::new(),
            approval_log: None,
            is_template: false,
        }
    }

    /// A reusable template copied from this document.
    ///
    /// Carries over: title, doc number, version, level, category, department,
    /// sections, approver name. Resets: id, status (draft), reviewers,
    /// approver decision, revision history, approval log. Sets the template
    /// flag.
    pub fn as_template(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            doc_number: self.doc_number.clone(),
            version: self.version.clone(),
            level: self.level,
            category: self.category.clone(),
            department: self.department.clone(),
            author: self.author.clone(),
            created_at: Utc::now(),
            status: DocStatus::Draft,
            sections: self.sections.clone(),
            reviewers: Vec::new(),
            final_approver: FinalApprover::pending(self.final_approver.name.clone()),
            revisions: Vec::new(),
            approval_log: None,
            is_template: true,
        }
    }

    /// The low-level revision constructor. Version arithmetic and the
    /// approved-only guard live in `lifecycle`; this enumerates the copy.
    ///
    /// Carries over: title, doc number (revisions share it), level, category,
    /// department, sections, prior history, approver *name*. Resets: id,
    /// reviewers (always empty for a new version), approver decision,
    /// approval log. Appends one history entry referencing the superseded
    /// version.
    pub fn spawn_revision(
        &self,
        next_version: String,
        next_status: DocStatus,
        description: String,
        author: impl Into<String>,
    ) -> Self {
        let author = author.into();
        let mut revisions = self.revisions.clone();
        revisions.push(RevisionEntry {
            id: Uuid::new_v4(),
            version: self.version.clone(),
            date: Utc::now().date_naive(),
            description,
            author: author.clone(),
        });
        Self {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            doc_number: self.doc_number.clone(),
            version: next_version,
            level: self.level,
            category: self.category.clone(),
            department: self.department.clone(),
            author,
            created_at: Utc::now(),
            status: next_status,
            sections: self.sections.clone(),
            reviewers: Vec::new(),
            final_approver: FinalApprover::pending(self.final_approver.name.clone()),
            revisions,
            approval_log: None,
            is_template: false,
        }
    }

    /// The editability predicate: only an approved document is locked.
    /// Content changes to an approved version go through `spawn_revision`.
    pub fn is_locked(&self) -> bool {
        self.status == DocStatus::Approved
    }

    /// A document spun off from an approved one shares its doc number and is
    /// exempt from the duplicate-number check.
    pub fn is_revision(&self) -> bool {
        !self.revisions.is_empty()
    }

    pub fn section(&self, id: Uuid) -> Option<&DocSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: Uuid) -> Option<&mut DocSection> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// SHA-256 over the title and section contents, recorded in the approval
    /// log so a later reader can detect drift from the approved text.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        for section in &self.sections {
            hasher.update([0u8]);
            hasher.update(section.title.as_bytes());
            hasher.update([0u8]);
            hasher.update(section.content.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved_doc() -> Document {
        let mut doc = Document::new_blank("Admin", "iso");
        doc.title = "Quality Manual".into();
        doc.doc_number = "QM-01".into();
        doc.reviewers.push(Reviewer::new("R. Chen"));
        doc.status = DocStatus::Approved;
        doc
    }

    #[test]
    fn blank_draft_starts_in_draft_with_placeholders() {
        let doc = Document::new_blank("User", "iso");
        assert_eq!(doc.status, DocStatus::Draft);
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.sections.len(), 2);
        assert!(doc.reviewers.is_empty());
        assert!(doc.revisions.is_empty());
        assert!(!doc.is_locked());
        assert!(!doc.is_revision());
    }

    #[test]
    fn from_template_resets_workflow_state() {
        let mut tpl = Document::new_blank("Admin", "hr");
        tpl.title = "Leave Policy".into();
        tpl.is_template = true;
        tpl.reviewers.push(Reviewer::new("Someone"));
        tpl.status = DocStatus::Approved;

        let doc = Document::from_template(&tpl, "User");
        assert_ne!(doc.id, tpl.id);
        assert_eq!(doc.title, "Leave Policy");
        assert_eq!(doc.status, DocStatus::Draft);
        assert_eq!(doc.version, "1.0");
        assert!(doc.reviewers.is_empty());
        assert!(!doc.is_template);
        assert_eq!(doc.sections, tpl.sections);
    }

    #[test]
    fn as_template_clears_history_and_sets_flag() {
        let mut doc = approved_doc();
        doc.revisions.push(RevisionEntry {
            id: Uuid::new_v4(),
            version: "1.0".into(),
            date: Utc::now().date_naive(),
            description: "initial".into(),
            author: "Admin".into(),
        });
        let tpl = doc.as_template();
        assert!(tpl.is_template);
        assert_eq!(tpl.status, DocStatus::Draft);
        assert!(tpl.revisions.is_empty());
        assert!(tpl.approval_log.is_none());
        assert!(tpl.reviewers.is_empty());
    }

    #[test]
    fn spawn_revision_appends_history_and_keeps_approver_name() {
        let doc = approved_doc();
        let rev = doc.spawn_revision(
            "2.0".into(),
            DocStatus::Draft,
            "Revision based on version 1.0".into(),
            "User",
        );
        assert_ne!(rev.id, doc.id);
        assert_eq!(rev.doc_number, doc.doc_number);
        assert_eq!(rev.version, "2.0");
        assert!(rev.reviewers.is_empty());
        assert_eq!(rev.final_approver.name, doc.final_approver.name);
        assert_eq!(rev.final_approver.status, DecisionStatus::Pending);
        assert_eq!(rev.revisions.len(), 1);
        assert_eq!(rev.revisions[0].version, "1.0");
        assert!(rev.is_revision());
    }

    #[test]
    fn only_approved_documents_are_locked() {
        let mut doc = Document::new_blank("User", "iso");
        for status in [DocStatus::Draft, DocStatus::Review, DocStatus::Approving] {
            doc.status = status;
            assert!(!doc.is_locked(), "{status} must stay editable");
        }
        doc.status = DocStatus::Approved;
        assert!(doc.is_locked());
    }

    #[test]
    fn content_hash_is_stable_and_content_sensitive() {
        let doc = approved_doc();
        assert_eq!(doc.content_hash(), doc.content_hash());

        let mut changed = doc.clone();
        changed.sections[0].content.push_str(" amended");
        assert_ne!(doc.content_hash(), changed.content_hash());
    }
}
