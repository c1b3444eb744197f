//! # sheet-forge – Template-driven character sheet and item card generator
//!
//! This crate turns a JSON description of a tabletop character or a magic
//! item into a print-ready HTML document. The pipeline stages are:
//!
//! 1. **Load** – read and validate the input JSON ([`loader`], [`model`])
//! 2. **Derive** – fill display values the input leaves out ([`derived`])
//! 3. **Assemble** – static page schemas and content renderers produce a
//!    fragment tree ([`schema`], [`document`], [`registry`], [`renderers`],
//!    [`sheet_renderers`], [`components`], [`fragment`])
//! 4. **Serialize** – fragment tree → HTML with a print stylesheet ([`html`])
//! 5. **Export** – optional headless-browser PDF and compression ([`export`])
//!
//! Stages 2 and 3 are pure: content defects degrade to visible placeholders
//! instead of failing the document.

pub mod components;
pub mod derived;
pub mod document;
pub mod error;
pub mod export;
pub mod fragment;
pub mod html;
pub mod loader;
pub mod markup;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod renderers;
pub mod samples;
pub mod schema;
pub mod sheet_renderers;

// Re-exports for convenience
pub use error::{ForgeError, Result};
pub use fragment::{Document, Fragment};
pub use model::{ContentBlock, SheetInput};
pub use pipeline::{generate, generate_file, generate_html_from_json, PipelineConfig};
pub use registry::{ContentRenderer, RenderContext, RendererRegistry};
