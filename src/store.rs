//! In-memory application state: documents, templates, categories, profiles.
//!
//! `DocumentStore` owns every collection behind `RwLock`s so read-heavy
//! callers (listing, rendering) never block each other. Every command
//! validates before it mutates; a failed command leaves the store exactly
//! as it was. The AI bridge is all-or-nothing: generated content reaches a
//! document only after the whole generation round-trip succeeded.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::generator::{ContentGenerator, GeneratorError, OutlineRequest, RefineAction};
use crate::lifecycle::{self, Decision, LifecycleError, RevisionKind, WorkflowAction};
use crate::models::{
    CategoryColor, CategoryDef, DocLevel, DocSection, Document, FinalApprover, Reviewer,
    VariableProfile,
};
use crate::render;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("Document number '{0}' is already in use")]
    DuplicateDocNumber(String),

    #[error("Document is approved and locked against editing")]
    DocumentLocked,

    #[error("Documents enter the store as drafts; workflow state moves only through workflow commands")]
    NonDraftInsert,

    #[error("Section {0} not found")]
    SectionNotFound(Uuid),

    #[error("Reviewer {0} not found")]
    ReviewerNotFound(Uuid),

    #[error("Reviewer roster and approver can only change while in draft")]
    RosterLocked,

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("System categories cannot be deleted")]
    SystemCategoryProtected,

    #[error("Template {0} not found")]
    TemplateNotFound(Uuid),

    #[error("Profile {0} not found")]
    ProfileNotFound(Uuid),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("State lock poisoned")]
    LockPoisoned,
}

/// Partial metadata update; `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct MetadataUpdate {
    pub doc_number: Option<String>,
    pub level: Option<DocLevel>,
    pub category: Option<String>,
    pub department: Option<String>,
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub struct DocumentStore {
    documents: RwLock<Vec<Document>>,
    templates: RwLock<Vec<Document>>,
    categories: RwLock<Vec<CategoryDef>>,
    profiles: RwLock<Vec<VariableProfile>>,
    active_profile: RwLock<Option<Uuid>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// A fresh store with the seeded system categories and a default
    /// company profile whose values the user fills in.
    pub fn new() -> Self {
        let categories = vec![
            CategoryDef::system("iso", "ISO 9001", CategoryColor::Blue),
            CategoryDef::system("hr", "HR & Training", CategoryColor::Purple),
            CategoryDef::system("admin", "Administration", CategoryColor::Amber),
        ];
        let default_profile = VariableProfile::new("Default company")
            .with_variable("COMPANY_NAME", "")
            .with_variable("COMPANY_ADDRESS", "")
            .with_variable("TAX_ID", "")
            .with_variable("CEO_NAME", "");
        let active = default_profile.id;

        Self {
            documents: RwLock::new(Vec::new()),
            templates: RwLock::new(Vec::new()),
            categories: RwLock::new(categories),
            profiles: RwLock::new(vec![default_profile]),
            active_profile: RwLock::new(Some(active)),
        }
    }

    // ─── Lock plumbing ───────────────────────────────────────────────────────

    fn docs_read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>, StoreError> {
        self.documents.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn docs_write(&self) -> Result<RwLockWriteGuard<'_, Vec<Document>>, StoreError> {
        self.documents.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn templates_read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>, StoreError> {
        self.templates.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn categories_read(&self) -> Result<RwLockReadGuard<'_, Vec<CategoryDef>>, StoreError> {
        self.categories.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn profiles_read(&self) -> Result<RwLockReadGuard<'_, Vec<VariableProfile>>, StoreError> {
        self.profiles.read().map_err(|_| StoreError::LockPoisoned)
    }

    // ─── Internal validation ─────────────────────────────────────────────────

    fn assert_category_exists(&self, category: &str) -> Result<(), StoreError> {
        if self.categories_read()?.iter().any(|c| c.id == category) {
            Ok(())
        } else {
            Err(StoreError::UnknownCategory(category.to_string()))
        }
    }

    /// Doc-number uniqueness holds across non-revision documents only; a
    /// revision legitimately carries its predecessor's number.
    fn assert_doc_number_free(
        docs: &[Document],
        doc: &Document,
    ) -> Result<(), StoreError> {
        if doc.is_revision() {
            return Ok(());
        }
        let taken = docs
            .iter()
            .any(|d| d.id != doc.id && !d.is_revision() && d.doc_number == doc.doc_number);
        if taken {
            return Err(StoreError::DuplicateDocNumber(doc.doc_number.clone()));
        }
        Ok(())
    }

    /// Run a mutation against one editable (not approved-locked) document
    /// and return the updated copy.
    fn with_editable<F>(&self, id: Uuid, mutate: F) -> Result<Document, StoreError>
    where
        F: FnOnce(&mut Document) -> Result<(), StoreError>,
    {
        let mut docs = self.docs_write()?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        if doc.is_locked() {
            return Err(StoreError::DocumentLocked);
        }
        mutate(doc)?;
        Ok(doc.clone())
    }

    // ─── Document CRUD ───────────────────────────────────────────────────────

    pub fn create_blank(
        &self,
        author: &str,
        category: &str,
    ) -> Result<Document, StoreError> {
        self.assert_category_exists(category)?;
        let doc = Document::new_blank(author, category);
        info!(id = %doc.id, "created blank draft");
        self.docs_write()?.push(doc.clone());
        Ok(doc)
    }

    pub fn create_from_template(
        &self,
        template_id: Uuid,
        author: &str,
    ) -> Result<Document, StoreError> {
        let doc = {
            let templates = self.templates_read()?;
            let template = templates
                .iter()
                .find(|t| t.id == template_id)
                .ok_or(StoreError::TemplateNotFound(template_id))?;
            Document::from_template(template, author)
        };
        self.assert_category_exists(&doc.category)?;
        let mut docs = self.docs_write()?;
        Self::assert_doc_number_free(&docs, &doc)?;
        info!(id = %doc.id, template = %template_id, "created draft from template");
        docs.push(doc.clone());
        Ok(doc)
    }

    /// Insert-or-replace for content and identification fields only.
    ///
    /// Workflow state (status, reviewer decisions, approver, approval log,
    /// revision history) never flows through a save: on replace those fields
    /// are kept from the stored copy, and an insert is only accepted as a
    /// draft with no approval log. Status moves exclusively through the
    /// workflow commands and `create_revision`.
    pub fn save_document(&self, doc: Document) -> Result<Document, StoreError> {
        self.assert_category_exists(&doc.category)?;
        let mut docs = self.docs_write()?;
        Self::assert_doc_number_free(&docs, &doc)?;

        let saved = match docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => {
                if existing.is_locked()
                    && (doc.title != existing.title || doc.sections != existing.sections)
                {
                    return Err(StoreError::DocumentLocked);
                }
                let mut incoming = doc;
                incoming.status = existing.status;
                incoming.reviewers = existing.reviewers.clone();
                incoming.final_approver = existing.final_approver.clone();
                incoming.approval_log = existing.approval_log.clone();
                incoming.revisions = existing.revisions.clone();
                *existing = incoming.clone();
                incoming
            }
            None => {
                if doc.status != crate::models::DocStatus::Draft || doc.approval_log.is_some() {
                    return Err(StoreError::NonDraftInsert);
                }
                docs.push(doc.clone());
                doc
            }
        };
        info!(id = %saved.id, doc_number = %saved.doc_number, "saved document");
        Ok(saved)
    }

    pub fn delete_document(&self, id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs_write()?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(StoreError::DocumentNotFound(id));
        }
        info!(%id, "deleted document");
        Ok(())
    }

    pub fn document(&self, id: Uuid) -> Result<Document, StoreError> {
        self.docs_read()?
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(StoreError::DocumentNotFound(id))
    }

    pub fn documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs_read()?.clone())
    }

    // ─── Editing ─────────────────────────────────────────────────────────────

    pub fn set_title(&self, id: Uuid, title: &str) -> Result<Document, StoreError> {
        self.with_editable(id, |doc| {
            doc.title = title.to_string();
            Ok(())
        })
    }

    pub fn update_section(
        &self,
        id: Uuid,
        section_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Document, StoreError> {
        self.with_editable(id, |doc| {
            let section = doc
                .section_mut(section_id)
                .ok_or(StoreError::SectionNotFound(section_id))?;
            section.title = title.to_string();
            section.content = content.to_string();
            Ok(())
        })
    }

    pub fn add_section(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Document, StoreError> {
        self.with_editable(id, |doc| {
            doc.sections.push(DocSection::new(title, content));
            Ok(())
        })
    }

    pub fn remove_section(&self, id: Uuid, section_id: Uuid) -> Result<Document, StoreError> {
        self.with_editable(id, |doc| {
            let before = doc.sections.len();
            doc.sections.retain(|s| s.id != section_id);
            if doc.sections.len() == before {
                return Err(StoreError::SectionNotFound(section_id));
            }
            Ok(())
        })
    }

    pub fn set_metadata(&self, id: Uuid, update: MetadataUpdate) -> Result<Document, StoreError> {
        if let Some(category) = &update.category {
            self.assert_category_exists(category)?;
        }
        let mut docs = self.docs_write()?;
        let index = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        if docs[index].is_locked() {
            return Err(StoreError::DocumentLocked);
        }

        let mut updated = docs[index].clone();
        if let Some(doc_number) = update.doc_number {
            updated.doc_number = doc_number;
        }
        if let Some(level) = update.level {
            updated.level = level;
        }
        if let Some(category) = update.category {
            updated.category = category;
        }
        if let Some(department) = update.department {
            updated.department = department;
        }
        Self::assert_doc_number_free(&docs, &updated)?;

        docs[index] = updated.clone();
        Ok(updated)
    }

    // ─── Roster (draft only) ─────────────────────────────────────────────────

    fn with_draft<F>(&self, id: Uuid, mutate: F) -> Result<Document, StoreError>
    where
        F: FnOnce(&mut Document) -> Result<(), StoreError>,
    {
        let mut docs = self.docs_write()?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        if doc.status != crate::models::DocStatus::Draft {
            return Err(StoreError::RosterLocked);
        }
        mutate(doc)?;
        Ok(doc.clone())
    }

    pub fn add_reviewer(&self, id: Uuid, name: &str) -> Result<Document, StoreError> {
        self.with_draft(id, |doc| {
            doc.reviewers.push(Reviewer::new(name));
            Ok(())
        })
    }

    pub fn remove_reviewer(&self, id: Uuid, reviewer_id: Uuid) -> Result<Document, StoreError> {
        self.with_draft(id, |doc| {
            let before = doc.reviewers.len();
            doc.reviewers.retain(|r| r.id != reviewer_id);
            if doc.reviewers.len() == before {
                return Err(StoreError::ReviewerNotFound(reviewer_id));
            }
            Ok(())
        })
    }

    pub fn set_final_approver(&self, id: Uuid, name: &str) -> Result<Document, StoreError> {
        self.with_draft(id, |doc| {
            doc.final_approver = FinalApprover::pending(name);
            Ok(())
        })
    }

    // ─── Workflow ────────────────────────────────────────────────────────────

    fn apply_workflow(&self, id: Uuid, action: WorkflowAction) -> Result<Document, StoreError> {
        let mut docs = self.docs_write()?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        lifecycle::apply(doc, action)?;
        Ok(doc.clone())
    }

    pub fn start_review(&self, id: Uuid) -> Result<Document, StoreError> {
        self.apply_workflow(id, WorkflowAction::StartReview)
    }

    pub fn reviewer_sign_off(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        decision: Decision,
        note: Option<String>,
    ) -> Result<Document, StoreError> {
        self.apply_workflow(
            id,
            WorkflowAction::ReviewerSignOff {
                reviewer_id,
                decision,
                note,
            },
        )
    }

    pub fn submit_for_approval(&self, id: Uuid) -> Result<Document, StoreError> {
        self.apply_workflow(id, WorkflowAction::SubmitForApproval)
    }

    pub fn approver_sign_off(
        &self,
        id: Uuid,
        decision: Decision,
        note: Option<String>,
    ) -> Result<Document, StoreError> {
        self.apply_workflow(id, WorkflowAction::ApproverSignOff { decision, note })
    }

    /// Spawn and store a revision of an approved document. Exempt from the
    /// doc-number uniqueness rule: a revision shares its source's number.
    pub fn create_revision(
        &self,
        id: Uuid,
        kind: RevisionKind,
        author: &str,
    ) -> Result<Document, StoreError> {
        let mut docs = self.docs_write()?;
        let source = docs
            .iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        let revision = lifecycle::create_revision(source, kind, author)?;
        docs.push(revision.clone());
        Ok(revision)
    }

    // ─── Templates ───────────────────────────────────────────────────────────

    pub fn save_as_template(&self, id: Uuid) -> Result<Document, StoreError> {
        let template = self.document(id)?.as_template();
        info!(source = %id, template = %template.id, "saved document as template");
        self.templates
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(template.clone());
        Ok(template)
    }

    pub fn user_templates(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.templates_read()?.clone())
    }

    // ─── Categories ──────────────────────────────────────────────────────────

    pub fn categories(&self) -> Result<Vec<CategoryDef>, StoreError> {
        Ok(self.categories_read()?.clone())
    }

    pub fn add_category(
        &self,
        name: &str,
        color: CategoryColor,
    ) -> Result<CategoryDef, StoreError> {
        let slug = slugify(name);
        let mut categories = self
            .categories
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        if categories.iter().any(|c| c.id == slug) {
            return Err(StoreError::DuplicateCategory(slug));
        }
        let category = CategoryDef::custom(&slug, name, color);
        categories.push(category.clone());
        Ok(category)
    }

    pub fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let category = categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        if category.kind == crate::models::CategoryType::System {
            return Err(StoreError::SystemCategoryProtected);
        }
        categories.retain(|c| c.id != id);
        Ok(())
    }

    // ─── Profiles ────────────────────────────────────────────────────────────

    pub fn profiles(&self) -> Result<Vec<VariableProfile>, StoreError> {
        Ok(self.profiles_read()?.clone())
    }

    pub fn add_profile(&self, profile: VariableProfile) -> Result<VariableProfile, StoreError> {
        self.profiles
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(profile.clone());
        Ok(profile)
    }

    pub fn update_profile(&self, profile: VariableProfile) -> Result<VariableProfile, StoreError> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::LockPoisoned)?;
        let slot = profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or(StoreError::ProfileNotFound(profile.id))?;
        *slot = profile.clone();
        Ok(profile)
    }

    /// Delete a profile. If it was active, activation falls back to the
    /// first remaining profile (or none).
    pub fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let fallback = {
            let mut profiles = self.profiles.write().map_err(|_| StoreError::LockPoisoned)?;
            let before = profiles.len();
            profiles.retain(|p| p.id != id);
            if profiles.len() == before {
                return Err(StoreError::ProfileNotFound(id));
            }
            profiles.first().map(|p| p.id)
        };
        let mut active = self
            .active_profile
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        if *active == Some(id) {
            *active = fallback;
        }
        Ok(())
    }

    pub fn set_active_profile(&self, id: Uuid) -> Result<(), StoreError> {
        if !self.profiles_read()?.iter().any(|p| p.id == id) {
            return Err(StoreError::ProfileNotFound(id));
        }
        *self
            .active_profile
            .write()
            .map_err(|_| StoreError::LockPoisoned)? = Some(id);
        Ok(())
    }

    pub fn active_profile(&self) -> Result<Option<VariableProfile>, StoreError> {
        let active = *self
            .active_profile
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let profiles = self.profiles_read()?;
        Ok(active.and_then(|id| profiles.iter().find(|p| p.id == id).cloned()))
    }

    // ─── AI bridge ───────────────────────────────────────────────────────────

    /// Generate a full outline and replace the document's sections with it.
    /// The network call runs outside any lock; the document is only touched
    /// after generation and parsing fully succeeded.
    pub fn generate_into_document(
        &self,
        generator: &dyn ContentGenerator,
        id: Uuid,
        request: &OutlineRequest,
    ) -> Result<Document, StoreError> {
        if self.document(id)?.is_locked() {
            return Err(StoreError::DocumentLocked);
        }

        let outline = generator.generate_outline(request)?;

        self.with_editable(id, |doc| {
            doc.sections = outline
                .sections
                .iter()
                .map(|s| DocSection::new(s.title.clone(), s.content.clone()))
                .collect();
            doc.level = request.level;
            info!(%id, sections = doc.sections.len(), "replaced sections with generated outline");
            Ok(())
        })
    }

    /// Refine one section. Polish and formal rephrasing replace the body;
    /// a compliance check appends its findings below the existing text.
    /// Any failure leaves the section untouched.
    pub fn refine_section(
        &self,
        generator: &dyn ContentGenerator,
        id: Uuid,
        section_id: Uuid,
        action: RefineAction,
    ) -> Result<Document, StoreError> {
        let current = {
            let doc = self.document(id)?;
            if doc.is_locked() {
                return Err(StoreError::DocumentLocked);
            }
            doc.section(section_id)
                .ok_or(StoreError::SectionNotFound(section_id))?
                .content
                .clone()
        };

        let refined = generator.refine(&current, action)?;

        self.with_editable(id, |doc| {
            let section = doc
                .section_mut(section_id)
                .ok_or(StoreError::SectionNotFound(section_id))?;
            section.content = match action {
                RefineAction::Polish | RefineAction::RephraseFormal => refined,
                RefineAction::Check => format!("{current}\n\n{refined}"),
            };
            Ok(())
        })
    }

    // ─── Rendering ───────────────────────────────────────────────────────────

    /// The document's sections with variables and references resolved
    /// against the active profile and every known document.
    pub fn rendered_sections(&self, id: Uuid) -> Result<Vec<DocSection>, StoreError> {
        let profile = self.active_profile()?;
        let docs = self.docs_read()?;
        let doc = docs
            .iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::DocumentNotFound(id))?;

        Ok(doc
            .sections
            .iter()
            .map(|s| DocSection {
                id: s.id,
                title: render::resolve(&s.title, profile.as_ref(), &docs),
                content: render::resolve(&s.content, profile.as_ref(), &docs),
            })
            .collect())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
