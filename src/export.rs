//! PDF export – drives external tools over a written HTML file.
//!
//! 1. A headless Chromium-family browser prints the HTML to PDF.
//! 2. Optionally, `pdftoppm` rasterizes every page to JPEG and `img2pdf`
//!    recombines them, trading text selectability for a much smaller file.
//!
//! Nothing here is needed to produce HTML; the tools are looked up lazily.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{ForgeError, Result};

/// Browser executables tried, in order, when none is configured.
const BROWSER_CANDIDATES: [&str; 5] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

const BROWSER_ENV: &str = "SHEET_FORGE_BROWSER";

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Browser binary; `None` when none was configured or found on `PATH`.
    pub browser: Option<PathBuf>,
    pub pdftoppm: PathBuf,
    pub img2pdf: PathBuf,
    /// Rasterization resolution for compression (default: 150).
    pub dpi: u32,
    /// JPEG quality for compression, 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            browser: None,
            pdftoppm: PathBuf::from("pdftoppm"),
            img2pdf: PathBuf::from("img2pdf"),
            dpi: 150,
            jpeg_quality: 85,
        }
    }
}

impl ExportConfig {
    /// Load from environment variables, using defaults for missing values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            browser: env::var_os(BROWSER_ENV)
                .map(PathBuf::from)
                .or_else(find_browser),
            pdftoppm: env::var_os("SHEET_FORGE_PDFTOPPM")
                .map(PathBuf::from)
                .unwrap_or(defaults.pdftoppm),
            img2pdf: env::var_os("SHEET_FORGE_IMG2PDF")
                .map(PathBuf::from)
                .unwrap_or(defaults.img2pdf),
            dpi: env_or("SHEET_FORGE_DPI", defaults.dpi),
            jpeg_quality: env_or("SHEET_FORGE_JPEG_QUALITY", defaults.jpeg_quality).clamp(1, 100),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// First browser candidate present on `PATH`.
fn find_browser() -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path).find_map(|dir| {
        BROWSER_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

// ---------------------------------------------------------------------------
// Export steps
// ---------------------------------------------------------------------------

/// Print `html_path` to `pdf_path` with the headless browser.
pub fn html_to_pdf(html_path: &Path, pdf_path: &Path, config: &ExportConfig) -> Result<()> {
    let browser = config.browser.as_ref().ok_or_else(|| ForgeError::ToolNotFound {
        tool: "chromium".into(),
        hint: BROWSER_ENV.into(),
    })?;
    let html_path = html_path.canonicalize().map_err(|source| ForgeError::Read {
        path: html_path.to_path_buf(),
        source,
    })?;
    let url = format!("file://{}", html_path.display());
    let mut print_arg = std::ffi::OsString::from("--print-to-pdf=");
    print_arg.push(pdf_path.as_os_str());

    log::info!("printing '{}' with {}", html_path.display(), browser.display());
    run(
        browser,
        [
            OsStr::new("--headless"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--no-pdf-header-footer"),
            print_arg.as_os_str(),
            OsStr::new(&url),
        ],
        BROWSER_ENV,
    )?;
    if !pdf_path.is_file() {
        return Err(ForgeError::ToolFailed {
            tool: browser.display().to_string(),
            status: "exit 0".into(),
            stderr: format!("no PDF written to '{}'", pdf_path.display()),
        });
    }
    Ok(())
}

/// Rasterize `input` page by page and rebuild it as `output`.
///
/// Pages are written to a scratch directory that is removed afterwards.
pub fn compress_pdf(input: &Path, output: &Path, config: &ExportConfig) -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let prefix = scratch.path().join("page");
    let dpi = config.dpi.to_string();
    let quality = format!("quality={}", config.jpeg_quality);

    log::info!("rasterizing '{}' at {} dpi", input.display(), config.dpi);
    run(
        &config.pdftoppm,
        [
            OsStr::new("-r"),
            OsStr::new(&dpi),
            OsStr::new("-jpeg"),
            OsStr::new("-jpegopt"),
            OsStr::new(&quality),
            input.as_os_str(),
            prefix.as_os_str(),
        ],
        "SHEET_FORGE_PDFTOPPM",
    )?;

    let pages = page_images(scratch.path())?;
    if pages.is_empty() {
        return Err(ForgeError::ToolFailed {
            tool: config.pdftoppm.display().to_string(),
            status: "exit 0".into(),
            stderr: "no page images produced".into(),
        });
    }

    log::info!("recombining {} pages into '{}'", pages.len(), output.display());
    let mut args: Vec<&OsStr> = pages.iter().map(|p| p.as_os_str()).collect();
    args.push(OsStr::new("-o"));
    args.push(output.as_os_str());
    run(&config.img2pdf, args, "SHEET_FORGE_IMG2PDF")?;
    Ok(())
}

/// JPEG files in `dir`, in page order. `pdftoppm` zero-pads page numbers
/// per document, so lexical order is page order.
fn page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "jpg"))
        .collect();
    pages.sort();
    Ok(pages)
}

fn run<I, S>(tool: &Path, args: I, hint: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = tool.display().to_string();
    log::debug!("running {name}");
    let output = Command::new(tool).args(args).output().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ForgeError::ToolNotFound {
            tool: name.clone(),
            hint: hint.to_string(),
        },
        _ => ForgeError::Io(e),
    })?;
    if !output.status.success() {
        return Err(ForgeError::ToolFailed {
            tool: name,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.dpi, 150);
        assert_eq!(config.jpeg_quality, 85);
        assert!(config.browser.is_none());
    }

    #[test]
    fn missing_browser_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("sheet.html");
        fs::write(&html, "<html></html>").unwrap();
        let err = html_to_pdf(&html, &dir.path().join("sheet.pdf"), &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ForgeError::ToolNotFound { ref hint, .. } if hint == BROWSER_ENV));
    }

    #[test]
    fn absent_tool_binary_is_not_found() {
        let config = ExportConfig {
            pdftoppm: PathBuf::from("/nonexistent/pdftoppm-for-tests"),
            ..ExportConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let err = compress_pdf(&dir.path().join("in.pdf"), &dir.path().join("out.pdf"), &config).unwrap_err();
        assert!(matches!(err, ForgeError::ToolNotFound { .. }));
    }

    #[test]
    fn page_images_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-02.jpg", "page-01.jpg", "notes.txt", "page-10.jpg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let pages = page_images(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-01.jpg", "page-02.jpg", "page-10.jpg"]);
    }
}
