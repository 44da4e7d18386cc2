//! Pure SSR logic - no I/O, no async, no side effects.
//!
//! This crate provides:
//! - Script-safe JSON escaping for embedded data
//! - Per-request head metadata and style registry with critical CSS extraction
//! - Asset manifest parsing
//! - Document templates and page assembly
//!
//! # Example
//!
//! ```
//! use folio_ssr_core::{assemble, DefaultDocument, DocumentParts, StyleRegistry, extract_critical};
//!
//! let mut styles = StyleRegistry::new();
//! let class = styles.insert("color:red;");
//! let markup = format!(r#"<h1 class="{class}">Hello</h1>"#);
//!
//! let parts = DocumentParts {
//!     styles: extract_critical(&markup, &styles),
//!     markup,
//!     bootstrap_data: Some(serde_json::json!({"title": "Hello"})),
//!     ..Default::default()
//! };
//!
//! let document = assemble(parts, &DefaultDocument, false).unwrap();
//! assert!(document.markup.starts_with("<!doctype html>"));
//! ```

mod config;
mod document;
mod error;
mod escape;
mod head;
mod manifest;
mod styles;

pub use config::{BootstrapPayload, PipelineConfig};
pub use document::{
    assemble, DefaultDocument, Document, DocumentContext, DocumentParts, DocumentRegistry,
    DocumentTemplate,
};
pub use error::{Result, SsrCoreError, MAX_BOOTSTRAP_DATA_SIZE};
pub use escape::{escape, escape_html, escape_script_json, script_safe_json, unescape};
pub use head::{HeadMetadata, HeadTag};
pub use manifest::AssetManifest;
pub use styles::{extract_critical, CriticalStyles, StyleRegistry};
