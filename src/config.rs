//! Build-time defaults. Anything a deployment may want to change lives
//! here rather than scattered through call sites.

/// Crate version, stamped into exported control sheets.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `RUST_LOG`-style filter when the environment sets none.
pub const DEFAULT_LOG_FILTER: &str = "docsmith=info";

// ─── Content generation ─────────────────────────────────────────────────────

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Hard cap on one generation round-trip. Outline generation for a long
/// manual can take tens of seconds; past this we fail rather than hang.
pub const GENERATOR_TIMEOUT_SECS: u64 = 90;

// ─── Export ──────────────────────────────────────────────────────────────────

/// Directory name for exported PDFs, created under the caller-chosen root.
pub const EXPORT_DIR_NAME: &str = "exports";

/// A4 page geometry in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PAGE_MARGIN_MM: f32 = 20.0;
