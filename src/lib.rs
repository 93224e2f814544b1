//! docsmith — a quality-document authoring engine.
//!
//! Controlled documents (manuals, procedures, work instructions, forms)
//! move through a draft → review → approving → approved lifecycle with
//! per-reviewer sign-off and a sealed approval log. Section bodies carry
//! `{{VARIABLE}}` and `[[REF:id]]` tokens resolved at render time against
//! a company profile and the document pool; approved documents export to
//! PDF with a control sheet. Content generation is delegated to a
//! pluggable [`generator::ContentGenerator`].

pub mod blocks;
pub mod config;
pub mod export;
pub mod generator;
pub mod lifecycle;
pub mod models;
pub mod render;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from `RUST_LOG`, falling back to the built-in filter.
/// Call once at startup; embedding applications may install their own
/// subscriber instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("docsmith v{}", config::APP_VERSION);
}
