//! Document lifecycle engine — the approval state machine.
//!
//! Status is never written directly by callers. Every change goes through
//! `apply`, which validates the (state, action) pair and its guards before
//! touching the document, so an illegal combination (e.g. approved with
//! pending reviewers) can never be constructed. Rejection at any stage is a
//! full reset of decision state, not a partial rollback: once the document
//! returns to draft its content may change, and stale sign-offs would no
//! longer mean anything.
//!
//! Revisions spawn a new document from an approved one:
//! - major: version floor(v)+1, full cycle restarts from draft
//! - minor: version v+0.1, fast-tracked straight to final approval

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ApprovalLog, DecisionStatus, DocStatus, Document};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cannot start review without at least one reviewer")]
    EmptyReviewerRoster,

    #[error("Action '{action}' is not valid while the document is {status}")]
    InvalidTransition {
        status: DocStatus,
        action: &'static str,
    },

    #[error("Reviewer {0} is not on this document's roster")]
    ReviewerNotFound(Uuid),

    #[error("Reviewer {0} has already signed off this round")]
    ReviewerAlreadyDecided(Uuid),

    #[error("Submission requires every reviewer to have approved")]
    ReviewersPending,

    #[error("Only approved documents can be revised")]
    SourceNotApproved,
}

/// A sign-off outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// The closed set of workflow commands. Anything not representable here
/// cannot happen to a document's status.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// draft → review. Requires a non-empty reviewer roster.
    StartReview,
    /// Record one reviewer's decision. Approve stays in review;
    /// reject resets every reviewer and returns the document to draft.
    ReviewerSignOff {
        reviewer_id: Uuid,
        decision: Decision,
        note: Option<String>,
    },
    /// review → approving. Requires every reviewer to have approved.
    SubmitForApproval,
    /// Record the final approver's decision. Approve seals the document;
    /// reject resets approver and reviewers and returns to draft.
    ApproverSignOff {
        decision: Decision,
        note: Option<String>,
    },
}

impl WorkflowAction {
    fn name(&self) -> &'static str {
        match self {
            Self::StartReview => "start_review",
            Self::ReviewerSignOff { .. } => "reviewer_sign_off",
            Self::SubmitForApproval => "submit_for_approval",
            Self::ApproverSignOff { .. } => "approver_sign_off",
        }
    }
}

/// Apply a workflow action to a document.
///
/// Guards are checked before any field is written; on error the document is
/// untouched. Undefined (state, action) pairs are rejected outright.
pub fn apply(doc: &mut Document, action: WorkflowAction) -> Result<(), LifecycleError> {
    let invalid = |doc: &Document, action: &WorkflowAction| LifecycleError::InvalidTransition {
        status: doc.status,
        action: action.name(),
    };

    match &action {
        WorkflowAction::StartReview => {
            if doc.status != DocStatus::Draft {
                return Err(invalid(doc, &action));
            }
            if doc.reviewers.is_empty() {
                return Err(LifecycleError::EmptyReviewerRoster);
            }
            // No stale decisions may survive into a fresh round.
            for reviewer in &mut doc.reviewers {
                reviewer.reset();
            }
            doc.status = DocStatus::Review;
            tracing::info!(doc = %doc.id, reviewers = doc.reviewers.len(), "Review started, reviewers notified");
            Ok(())
        }

        WorkflowAction::ReviewerSignOff {
            reviewer_id,
            decision,
            note,
        } => {
            if doc.status != DocStatus::Review {
                return Err(invalid(doc, &action));
            }
            let idx = doc
                .reviewers
                .iter()
                .position(|r| r.id == *reviewer_id)
                .ok_or(LifecycleError::ReviewerNotFound(*reviewer_id))?;

            match decision {
                Decision::Approve => {
                    if doc.reviewers[idx].status != DecisionStatus::Pending {
                        return Err(LifecycleError::ReviewerAlreadyDecided(*reviewer_id));
                    }
                    let reviewer = &mut doc.reviewers[idx];
                    reviewer.status = DecisionStatus::Approved;
                    reviewer.decided_on = Some(Utc::now().date_naive());
                    reviewer.note = note.clone();
                    tracing::info!(doc = %doc.id, reviewer = %reviewer_id, "Reviewer approved");
                }
                Decision::Reject => {
                    for reviewer in &mut doc.reviewers {
                        reviewer.reset();
                    }
                    doc.status = DocStatus::Draft;
                    tracing::info!(doc = %doc.id, reviewer = %reviewer_id, "Reviewer rejected, back to draft");
                }
            }
            Ok(())
        }

        WorkflowAction::SubmitForApproval => {
            if doc.status != DocStatus::Review {
                return Err(invalid(doc, &action));
            }
            if doc
                .reviewers
                .iter()
                .any(|r| r.status != DecisionStatus::Approved)
            {
                return Err(LifecycleError::ReviewersPending);
            }
            doc.status = DocStatus::Approving;
            tracing::info!(doc = %doc.id, approver = %doc.final_approver.name, "Submitted for final approval, approver notified");
            Ok(())
        }

        WorkflowAction::ApproverSignOff { decision, note } => {
            if doc.status != DocStatus::Approving {
                return Err(invalid(doc, &action));
            }
            match decision {
                Decision::Approve => {
                    doc.final_approver.status = DecisionStatus::Approved;
                    doc.final_approver.decided_on = Some(Utc::now().date_naive());
                    doc.final_approver.note = note.clone();
                    doc.approval_log = Some(ApprovalLog {
                        approver_name: doc.final_approver.name.clone(),
                        timestamp: Utc::now(),
                        integrity_hash: doc.content_hash(),
                    });
                    doc.status = DocStatus::Approved;
                    tracing::info!(doc = %doc.id, version = %doc.version, "Document approved and sealed");
                }
                Decision::Reject => {
                    doc.final_approver.reset();
                    for reviewer in &mut doc.reviewers {
                        reviewer.reset();
                    }
                    doc.status = DocStatus::Draft;
                    tracing::info!(doc = %doc.id, "Approver rejected, back to draft");
                }
            }
            Ok(())
        }
    }
}

// ─── Revisions ────────────────────────────────────────────────────────────────

/// Two policies for deriving a new version from an approved one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    /// Content change: floor(v)+1, full review cycle restarts.
    Major,
    /// Typo/formatting fix: v+0.1, fast-tracked to final approval.
    Minor,
}

/// Compute the next version string from a `MAJOR.MINOR` decimal form.
/// Unparseable versions are treated as 0, so e.g. "A.0" majors to "1.0".
pub fn next_version(current: &str, kind: RevisionKind) -> String {
    let v = current.parse::<f64>().unwrap_or(0.0);
    match kind {
        RevisionKind::Major => format!("{:.1}", v.floor() + 1.0),
        RevisionKind::Minor => format!("{:.1}", v + 0.1),
    }
}

/// Spawn a new document as a revision of an approved one.
///
/// Major revisions start over in draft; minor revisions skip the reviewer
/// round and land directly in `approving`, since the content risk of a
/// correction is judged low.
pub fn create_revision(
    source: &Document,
    kind: RevisionKind,
    author: &str,
) -> Result<Document, LifecycleError> {
    if source.status != DocStatus::Approved {
        return Err(LifecycleError::SourceNotApproved);
    }
    let (next_status, description) = match kind {
        RevisionKind::Major => (
            DocStatus::Draft,
            format!("Revision based on version {}", source.version),
        ),
        RevisionKind::Minor => (
            DocStatus::Approving,
            "Administrative correction / typo fix".to_string(),
        ),
    };
    let version = next_version(&source.version, kind);
    tracing::info!(
        source = %source.id,
        from = %source.version,
        to = %version,
        kind = ?kind,
        "Spawning revision"
    );
    Ok(source.spawn_revision(version, next_status, description, author))
}
