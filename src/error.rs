//! Error types for the collaborators around the assembly core.
//!
//! The core itself (registry, renderers, assemblers) never fails: defects in
//! content degrade to placeholder fragments. Everything here is raised by
//! loading, serialization to disk, or external tool invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the loader, the pipeline and the export step.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema violation at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("external tool '{tool}' not found (set {hint} or install it)")]
    ToolNotFound { tool: String, hint: String },

    #[error("external tool '{tool}' failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ForgeError {
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        ForgeError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
