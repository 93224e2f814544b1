//! PDF export: control sheet, rendered content pages, deterministic filenames.
//!
//! Export renders the *resolved* view (variables and references substituted
//! via `render::resolve`), never the raw stored tokens. The first page is a
//! document-control sheet with identification, the signature table and the
//! revision history; content sections follow with block-level formatting.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use printpdf::*;
use thiserror::Error;
use tracing::info;

use crate::blocks::{parse_blocks, Block};
use crate::config;
use crate::models::{DecisionStatus, Document, VariableProfile};
use crate::render::resolve;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Document has no sections to render")]
    NothingToRender,

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Filenames ───────────────────────────────────────────────────────────────

/// Replace filesystem-hostile characters so the name is safe on every
/// platform. Spaces become underscores to keep shell handling painless.
fn sanitize_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '_',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Standard export filename: `<docNumber>_<title>_v<version>_<YYYYMMDD>.pdf`.
/// Deterministic for a given document and date, so re-exporting the same
/// document on the same day overwrites rather than multiplies.
pub fn standard_filename(doc: &Document, date: NaiveDate) -> String {
    format!(
        "{}_{}_v{}_{}.pdf",
        sanitize_component(&doc.doc_number),
        sanitize_component(&doc.title),
        sanitize_component(&doc.version),
        date.format("%Y%m%d"),
    )
}

/// [`standard_filename`] for today's local date.
pub fn standard_filename_today(doc: &Document) -> String {
    standard_filename(doc, Local::now().date_naive())
}

// ─── PDF rendering ───────────────────────────────────────────────────────────

/// Page-aware text cursor. `line` writes one line and advances; when the
/// cursor reaches the bottom margin a fresh page is started automatically.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl PageCursor {
    fn new(
        title: &str,
    ) -> Result<(Self, IndirectFontRef, IndirectFontRef, IndirectFontRef), ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(config::PAGE_WIDTH_MM),
            Mm(config::PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let mono = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        let cursor = Self {
            doc,
            layer,
            y: Mm(config::PAGE_HEIGHT_MM - config::PAGE_MARGIN_MM),
        };
        Ok((cursor, font, bold, mono))
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(config::PAGE_WIDTH_MM),
            Mm(config::PAGE_HEIGHT_MM),
            "Layer 1",
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(config::PAGE_HEIGHT_MM - config::PAGE_MARGIN_MM);
    }

    fn ensure(&mut self, needed: f32) {
        if self.y < Mm(config::PAGE_MARGIN_MM + needed) {
            self.break_page();
        }
    }

    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        self.ensure(advance);
        self.layer.use_text(text, size, Mm(x), self.y, font);
        self.y -= Mm(advance);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        buf.into_inner().map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

/// Word-wrap for PDF text lines. Width is measured in characters, not
/// bytes, so accented titles don't wrap early.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count();
        if width > 0 && width + 1 + word_width > max_chars {
            lines.push(std::mem::take(&mut current));
            width = 0;
        }
        if width > 0 {
            current.push(' ');
            width += 1;
        }
        current.push_str(word);
        width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn decision_label(status: DecisionStatus) -> &'static str {
    match status {
        DecisionStatus::Approved => "APPROVED",
        DecisionStatus::Pending => "pending",
    }
}

const MARGIN: f32 = config::PAGE_MARGIN_MM;
const INDENT: f32 = MARGIN + 5.0;

fn render_control_sheet(
    cur: &mut PageCursor,
    doc: &Document,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    cur.line(&doc.title, 16.0, MARGIN, bold, 9.0);
    cur.line(
        &format!(
            "{}  ·  Version {}  ·  {}",
            doc.doc_number,
            doc.version,
            doc.level.label()
        ),
        10.0,
        MARGIN,
        font,
        5.5,
    );
    cur.line(
        &format!("Category: {}   Status: {}", doc.category, doc.status),
        9.0,
        MARGIN,
        font,
        4.5,
    );
    cur.line(
        &format!(
            "Author: {}   Created: {}",
            doc.author,
            doc.created_at.format("%Y-%m-%d")
        ),
        9.0,
        MARGIN,
        font,
        4.5,
    );
    cur.gap(6.0);

    cur.line("APPROVAL SIGNATURES", 11.0, MARGIN, bold, 6.0);
    for reviewer in &doc.reviewers {
        let decided = reviewer
            .decided_on
            .map(|d| d.to_string())
            .unwrap_or_else(|| "—".into());
        let mut row = format!(
            "  Reviewer: {} — {} — {}",
            reviewer.name,
            decision_label(reviewer.status),
            decided
        );
        if let Some(note) = &reviewer.note {
            row.push_str(&format!(" ({note})"));
        }
        cur.line(&row, 9.0, INDENT, font, 4.5);
    }
    let approver_decided = doc
        .final_approver
        .decided_on
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".into());
    cur.line(
        &format!(
            "  Final approver: {} — {} — {}",
            doc.final_approver.name,
            decision_label(doc.final_approver.status),
            approver_decided
        ),
        9.0,
        INDENT,
        font,
        4.5,
    );
    if let Some(log) = &doc.approval_log {
        cur.line(
            &format!(
                "  Approved by {} at {} — integrity {}",
                log.approver_name,
                log.timestamp.format("%Y-%m-%d %H:%M UTC"),
                &log.integrity_hash[..16.min(log.integrity_hash.len())]
            ),
            8.0,
            INDENT,
            font,
            4.5,
        );
    }
    cur.gap(6.0);

    if !doc.revisions.is_empty() {
        cur.line("REVISION HISTORY", 11.0, MARGIN, bold, 6.0);
        for rev in &doc.revisions {
            cur.line(
                &format!(
                    "  v{} — {} — {} — {}",
                    rev.version, rev.date, rev.description, rev.author
                ),
                9.0,
                INDENT,
                font,
                4.5,
            );
        }
    }
}

fn render_block(
    cur: &mut PageCursor,
    block: &Block,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    mono: &IndirectFontRef,
) {
    match block {
        Block::Heading { level, text } => {
            cur.gap(2.0);
            let size = if *level == 2 { 11.0 } else { 10.0 };
            cur.line(text, size, MARGIN, bold, 6.0);
        }
        Block::Paragraph(text) => {
            for line in wrap_text(text, 95) {
                cur.line(&line, 9.0, MARGIN, font, 4.5);
            }
            cur.gap(2.0);
        }
        Block::Bullet(text) => {
            for (i, line) in wrap_text(text, 90).into_iter().enumerate() {
                let prefix = if i == 0 { "· " } else { "  " };
                cur.line(&format!("{prefix}{line}"), 9.0, INDENT, font, 4.5);
            }
        }
        Block::Numbered { number, text } => {
            for (i, line) in wrap_text(text, 90).into_iter().enumerate() {
                let prefix = if i == 0 {
                    format!("{number}. ")
                } else {
                    "   ".into()
                };
                cur.line(&format!("{prefix}{line}"), 9.0, INDENT, font, 4.5);
            }
        }
        Block::Quote(text) => {
            for line in wrap_text(text, 90) {
                cur.line(&format!("| {line}"), 9.0, INDENT, font, 4.5);
            }
            cur.gap(2.0);
        }
        Block::Table(table) => {
            if let Some(header) = &table.header {
                cur.line(&header.join("  |  "), 8.0, INDENT, bold, 4.0);
            }
            for row in &table.rows {
                cur.line(&row.join("  |  "), 8.0, INDENT, mono, 4.0);
            }
            cur.gap(2.0);
        }
        Block::Diagram(source) => {
            cur.line("[process diagram]", 8.0, INDENT, bold, 4.0);
            for line in source.lines() {
                cur.line(line, 8.0, INDENT, mono, 4.0);
            }
            cur.gap(2.0);
        }
    }
}

/// Render a document to PDF bytes: control sheet first, then each section
/// resolved against the active profile and the reference pool.
pub fn render_pdf(
    doc: &Document,
    profile: Option<&VariableProfile>,
    documents: &[Document],
) -> Result<Vec<u8>, ExportError> {
    if doc.sections.is_empty() {
        return Err(ExportError::NothingToRender);
    }

    let (mut cur, font, bold, mono) = PageCursor::new(&doc.title)?;
    render_control_sheet(&mut cur, doc, &font, &bold);

    cur.break_page();
    for section in &doc.sections {
        cur.line(&section.title, 12.0, MARGIN, &bold, 7.0);
        let resolved = resolve(&section.content, profile, documents);
        for block in parse_blocks(&resolved) {
            render_block(&mut cur, &block, &font, &bold, &mono);
        }
        cur.gap(4.0);
    }

    let bytes = cur.finish()?;
    info!(
        doc_number = %doc.doc_number,
        version = %doc.version,
        bytes = bytes.len(),
        "rendered document PDF"
    );
    Ok(bytes)
}

/// Write PDF bytes under `<root>/exports/<filename>` and return the path.
pub fn export_to_file(
    pdf_bytes: &[u8],
    filename: &str,
    root: &Path,
) -> Result<PathBuf, ExportError> {
    let exports_dir = root.join(config::EXPORT_DIR_NAME);
    std::fs::create_dir_all(&exports_dir)?;

    let path = exports_dir.join(filename);
    std::fs::write(&path, pdf_bytes)?;
    info!(path = %path.display(), "exported PDF");
    Ok(path)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
