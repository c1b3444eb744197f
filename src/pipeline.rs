//! Pipeline – ties together loading, assembly, and HTML serialization into a
//! single function call.

use std::fs;
use std::path::Path;

use crate::document::assemble;
use crate::error::{ForgeError, Result};
use crate::fragment::Document;
use crate::html::{render_document, HtmlOptions, StyleConfig};
use crate::loader;
use crate::model::SheetInput;
use crate::registry::{RenderOptions, RendererRegistry};

/// Configuration for the generation pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Document title; replaces the one derived from the input when set.
    pub title: Option<String>,
    /// Colours, fonts and page size.
    pub style: StyleConfig,
    /// Image resolution and embedding.
    pub html: HtmlOptions,
    pub render: RenderOptions,
    /// Record the generation time in the document metadata (default: off,
    /// which keeps output byte-identical across runs).
    pub stamp_generation_time: bool,
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub document: Document,
    pub html: String,
}

impl Generated {
    /// Number of degraded regions in the document.
    pub fn diagnostic_count(&self) -> usize {
        self.document.diagnostics().len()
    }
}

/// Full pipeline: parsed input → fragment tree → HTML.
pub fn generate(input: &SheetInput, registry: &RendererRegistry, config: &PipelineConfig) -> Generated {
    // 1. Assemble the fragment tree
    let mut document = assemble(input, registry, config.render);

    // 2. Metadata
    if let Some(title) = &config.title {
        document.meta.title = title.clone();
    }
    if config.stamp_generation_time {
        document.meta.generated_at = Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    }

    // 3. Serialize
    let html = render_document(&document, &config.style, &config.html);
    log::info!(
        "rendered '{}': {} pages, {} bytes",
        document.meta.title,
        document.pages.len(),
        html.len()
    );
    for diagnostic in document.diagnostics() {
        log::debug!("degraded region: {}", diagnostic.message);
    }

    Generated { document, html }
}

/// Convenience: generate HTML from a JSON string with the built-in renderers.
pub fn generate_html_from_json(json: &str, config: &PipelineConfig) -> Result<String> {
    let input = loader::parse_str(json)?;
    Ok(generate(&input, &RendererRegistry::with_builtins(), config).html)
}

/// Load an input file and generate from it. Relative image paths resolve
/// against the input's directory unless the config names a base path.
pub fn generate_file(path: &Path, registry: &RendererRegistry, config: &PipelineConfig) -> Result<Generated> {
    let input = loader::load_file(path)?;
    if config.html.base_path.is_some() {
        return Ok(generate(&input, registry, config));
    }
    let mut config = config.clone();
    config.html.base_path = path.parent().map(Path::to_path_buf);
    Ok(generate(&input, registry, &config))
}

/// Write `contents` to `path`, creating the parent directory if needed.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source| ForgeError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{
        "type": "item",
        "header": {"name": "Frost Brand"},
        "pages": [{"layout": {"columns": 1}, "sections": [{"content": {"text": "Cold to the touch."}}]}]
    }"#;

    #[test]
    fn pipeline_basic() {
        let html = generate_html_from_json(ITEM, &PipelineConfig::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Frost Brand - Magic Item</title>"));
        assert!(html.contains("Cold to the touch."));
    }

    #[test]
    fn output_is_stable_without_timestamp() {
        let config = PipelineConfig::default();
        let a = generate_html_from_json(ITEM, &config).unwrap();
        let b = generate_html_from_json(ITEM, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn timestamp_and_title_override() {
        let config = PipelineConfig {
            title: Some("Loot".into()),
            stamp_generation_time: true,
            ..PipelineConfig::default()
        };
        let input = loader::parse_str(ITEM).unwrap();
        let generated = generate(&input, &RendererRegistry::with_builtins(), &config);
        assert_eq!(generated.document.meta.title, "Loot");
        assert!(generated.document.meta.generated_at.is_some());
        assert!(generated.html.contains("<meta name=\"generated\""));
        assert_eq!(generated.diagnostic_count(), 0);
    }

    #[test]
    fn schema_errors_surface() {
        let bad = ITEM.replace("\"columns\": 1", "\"columns\": 4");
        assert!(matches!(
            generate_html_from_json(&bad, &PipelineConfig::default()),
            Err(ForgeError::Schema { .. })
        ));
    }

    #[test]
    fn write_output_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sheet.html");
        write_output(&path, b"<html></html>").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<html></html>");
    }
}
