//! Template loading and rendering
//!
//! This module provides:
//! - The template manifest (`template.yaml`) listing documents and their placeholders
//! - Template sources (embedded defaults or a local directory)
//! - Literal placeholder substitution and output writing

pub mod manifest;
pub mod renderer;
pub mod source;

use crate::config::SettingKey;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use manifest::{DocumentEntry, TemplateDocument, TemplateManifest};
pub use renderer::{
    check_declared, render, render_document, GeneratedFile, MissingValuePolicy, Rendered,
};
pub use source::TemplateSource;

/// Errors raised while loading templates or writing generated files
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template {}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Built-in template not found: {0}")]
    EmbeddedMissing(String),

    #[error("Failed to parse template manifest")]
    Manifest(#[source] serde_yaml::Error),

    #[error("Template '{document}' declares unrecognized placeholder {token}")]
    UnrecognizedPlaceholder { document: String, token: String },

    #[error(
        "Template '{document}' uses {}, which is not listed in its manifest placeholders",
        key.placeholder()
    )]
    UndeclaredPlaceholder { document: String, key: SettingKey },

    #[error("Template '{document}' needs {key}, which is not set in the configuration")]
    MissingSetting { document: String, key: SettingKey },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
