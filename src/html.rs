//! HTML serializer – fragment tree → standalone HTML document.
//!
//! Roles become CSS classes, every piece of user text is escaped, and each
//! page is a `<div class="page">` sized by the stylesheet for print. The
//! stylesheet is `styles/sheet.css` (compiled in) prefixed with the CSS
//! variables of a [`StyleConfig`].

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fragment::{
    BoxFragment, Document, DocumentKind, FlexFragment, Fragment, Gap, GridFragment, ImageFragment, Placeholder,
    PlaceholderKind, TableFragment, TitlePosition,
};
use crate::markup::Run;

const BASE_STYLESHEET: &str = include_str!("../styles/sheet.css");

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Visual settings exposed as CSS variables. Loadable from a JSON file; any
/// field left out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub page_width: String,
    pub page_height: String,
    pub page_margin: String,
    pub font_body: String,
    pub font_heading: String,
    pub font_size: String,
    pub accent_primary: String,
    pub accent_secondary: String,
    pub text_color: String,
    pub text_label: String,
    pub border_color: String,
    pub paper_color: String,
    /// Remote stylesheet for the fonts, linked from the document head.
    pub font_stylesheet: Option<String>,
    /// Appended after the built-in rules.
    pub extra_css: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            page_width: "210mm".into(),
            page_height: "297mm".into(),
            page_margin: "8mm".into(),
            font_body: "'Scada', 'Helvetica Neue', Arial, sans-serif".into(),
            font_heading: "'Cinzel', Georgia, serif".into(),
            font_size: "7.5pt".into(),
            accent_primary: "#7a1f1f".into(),
            accent_secondary: "#b08d57".into(),
            text_color: "#1d1a16".into(),
            text_label: "#5c544a".into(),
            border_color: "#3b332b".into(),
            paper_color: "#fdfaf3".into(),
            font_stylesheet: Some(
                "https://fonts.googleapis.com/css2?family=Cinzel:wght@400;600;700&family=Scada:wght@400;700&display=swap"
                    .into(),
            ),
            extra_css: String::new(),
        }
    }
}

impl StyleConfig {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| crate::error::ForgeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }

    fn variables(&self) -> String {
        let vars = [
            ("page-width", &self.page_width),
            ("page-height", &self.page_height),
            ("page-margin", &self.page_margin),
            ("font-body", &self.font_body),
            ("font-heading", &self.font_heading),
            ("font-size", &self.font_size),
            ("accent-primary", &self.accent_primary),
            ("accent-secondary", &self.accent_secondary),
            ("text-color", &self.text_color),
            ("text-label", &self.text_label),
            ("border-color", &self.border_color),
            ("paper-color", &self.paper_color),
        ];
        let mut css = String::from(":root {\n");
        for (name, value) in vars {
            // Values go into a <style> element; keep them from closing it.
            let value = value.replace('<', "").replace(';', "");
            let _ = writeln!(css, "    --{name}: {value};");
        }
        css.push_str("}\n");
        css
    }

    /// The full stylesheet: variables, built-in rules, page size, extras.
    pub fn stylesheet(&self) -> String {
        let mut css = self.variables();
        css.push_str(BASE_STYLESHEET);
        let _ = write!(
            css,
            "\n@page {{ size: {} {}; margin: 0; }}\n",
            self.page_width.replace(['<', ';', '}'], ""),
            self.page_height.replace(['<', ';', '}'], "")
        );
        if !self.extra_css.is_empty() {
            css.push_str(&self.extra_css.replace("</", "<\\/"));
            css.push('\n');
        }
        css
    }
}

/// How images are referenced from the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Directory that relative image paths are resolved against.
    pub base_path: Option<PathBuf>,
    /// Inline images as base64 data URIs instead of linking them.
    pub embed_images: bool,
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Render a complete HTML document.
pub fn render_document(doc: &Document, style: &StyleConfig, options: &HtmlOptions) -> String {
    let mut out = String::with_capacity(64 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    if let Some(generated) = &doc.meta.generated_at {
        let _ = writeln!(out, "<meta name=\"generated\" content=\"{}\">", escape(generated));
    }
    let _ = writeln!(out, "<title>{}</title>", escape(&doc.meta.title));
    if let Some(fonts) = &style.font_stylesheet {
        let _ = writeln!(out, "<link href=\"{}\" rel=\"stylesheet\">", escape(fonts));
    }
    let _ = write!(out, "<style>\n{}</style>\n</head>\n<body>\n", style.stylesheet());

    let kind = match doc.meta.kind {
        DocumentKind::CharacterSheet => "character-sheet",
        DocumentKind::Item => "item",
    };
    let mut writer = HtmlWriter { out, options };
    for page in &doc.pages {
        let _ = writeln!(writer.out, "<div class=\"page page--{kind}\">");
        writer.fragment(page);
        writer.out.push_str("\n</div>\n");
    }
    let mut out = writer.out;
    out.push_str("</body>\n</html>\n");
    out
}

/// Render one fragment subtree, without the document wrapper.
pub fn render_fragment(fragment: &Fragment, options: &HtmlOptions) -> String {
    let mut writer = HtmlWriter {
        out: String::new(),
        options,
    };
    writer.fragment(fragment);
    writer.out
}

struct HtmlWriter<'a> {
    out: String,
    options: &'a HtmlOptions,
}

impl HtmlWriter<'_> {
    fn fragment(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::Box(b) => self.boxed(b),
            Fragment::Row(f) => self.flex("row", f),
            Fragment::Col(f) => self.flex("col", f),
            Fragment::Grid(g) => self.grid(g),
            Fragment::Group(g) => {
                self.open("div", &g.role);
                for child in &g.children {
                    self.fragment(child);
                }
                self.out.push_str("</div>");
            }
            Fragment::Text(t) => {
                let tag = if t.role == "paragraph" { "p" } else { "div" };
                let class = if t.italic {
                    format!("{} text--italic", t.role)
                } else {
                    t.role.clone()
                };
                self.open(tag, &class);
                self.runs(&t.runs);
                let _ = write!(self.out, "</{tag}>");
            }
            Fragment::List(l) => {
                self.open("ul", &l.role);
                for item in &l.items {
                    self.out.push_str("<li>");
                    self.runs(item);
                    self.out.push_str("</li>");
                }
                self.out.push_str("</ul>");
            }
            Fragment::Table(t) => self.table(t),
            Fragment::Image(img) => self.image(img),
            Fragment::Placeholder(p) => self.placeholder(p),
        }
    }

    fn open(&mut self, tag: &str, class: &str) {
        let _ = write!(self.out, "<{tag} class=\"{}\">", escape(class));
    }

    fn runs(&mut self, runs: &[Run]) {
        for run in runs {
            if run.strong {
                let _ = write!(self.out, "<strong>{}</strong>", escape(&run.text));
            } else {
                self.out.push_str(&escape(&run.text));
            }
        }
    }

    fn boxed(&mut self, b: &BoxFragment) {
        let mut class = String::from("box");
        if let Some(role) = &b.role {
            class.push(' ');
            class.push_str(role);
        }
        if b.title.is_some() {
            class.push_str(match b.title_position {
                TitlePosition::Top => " box--label-top",
                TitlePosition::Bottom => " box--label-bottom",
            });
        }
        if b.fill {
            class.push_str(" box--fill");
        }
        if b.centered {
            class.push_str(" box--centered");
        }
        self.open("div", &class);
        if b.title_position == TitlePosition::Top {
            self.box_label(b);
        }
        for child in &b.body {
            self.fragment(child);
        }
        if b.title_position == TitlePosition::Bottom {
            self.box_label(b);
        }
        self.out.push_str("</div>");
    }

    fn box_label(&mut self, b: &BoxFragment) {
        if let Some(title) = &b.title {
            let _ = write!(self.out, "<div class=\"box__label\">{}</div>", escape(title));
        }
    }

    fn flex(&mut self, kind: &str, f: &FlexFragment) {
        let class = match &f.role {
            Some(role) => format!("{kind} {} {role}", gap_class(f.gap)),
            None => format!("{kind} {}", gap_class(f.gap)),
        };
        self.open("div", &class);
        for item in &f.children {
            if item.grow > 0 {
                let _ = write!(self.out, "<div class=\"flex-item\" style=\"flex: {} 1 0\">", item.grow);
                self.fragment(&item.fragment);
                self.out.push_str("</div>");
            } else {
                self.fragment(&item.fragment);
            }
        }
        self.out.push_str("</div>");
    }

    fn grid(&mut self, g: &GridFragment) {
        let columns = g.columns.len();
        let class = match &g.role {
            Some(role) => format!("grid {} {role}", gap_class(g.gap)),
            None => format!("grid {}", gap_class(g.gap)),
        };
        let _ = write!(
            self.out,
            "<div class=\"{}\" style=\"grid-template-columns: repeat({columns}, minmax(0, 1fr))\">",
            escape(&class)
        );
        for column in &g.columns {
            self.out.push_str("<div class=\"grid__column\">");
            for child in column {
                self.fragment(child);
            }
            self.out.push_str("</div>");
        }
        self.out.push_str("</div>");
    }

    fn table(&mut self, t: &TableFragment) {
        self.open("table", &t.role);
        if !t.headers.is_empty() {
            self.out.push_str("<thead><tr>");
            for header in &t.headers {
                let _ = write!(self.out, "<th>{}</th>", escape(header));
            }
            self.out.push_str("</tr></thead>");
        }
        self.out.push_str("<tbody>");
        for row in &t.rows {
            self.out.push_str("<tr>");
            for cell in row {
                self.out.push_str("<td>");
                self.runs(cell);
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>");
        }
        self.out.push_str("</tbody>");
        if let Some(footer) = &t.footer {
            let span = t.headers.len().max(1);
            let _ = write!(
                self.out,
                "<tfoot><tr><td class=\"table-footer\" colspan=\"{span}\">{}</td></tr></tfoot>",
                escape(footer)
            );
        }
        self.out.push_str("</table>");
    }

    fn image(&mut self, img: &ImageFragment) {
        let src = resolve_image(&img.src, self.options);
        let _ = write!(
            self.out,
            "<img class=\"{}\" src=\"{}\" alt=\"{}\">",
            escape(&img.role),
            escape(&src),
            escape(&img.alt)
        );
    }

    fn placeholder(&mut self, p: &Placeholder) {
        let kind = match p.kind {
            PlaceholderKind::UnknownContent => "unknown",
            PlaceholderKind::MalformedContent => "malformed",
            PlaceholderKind::Warning => "warning",
            PlaceholderKind::Unavailable => "unavailable",
            PlaceholderKind::Empty => "empty",
        };
        let _ = write!(
            self.out,
            "<span class=\"placeholder placeholder--{kind}\">{}</span>",
            escape(&p.message)
        );
    }
}

fn gap_class(gap: Gap) -> &'static str {
    match gap {
        Gap::None => "gap-none",
        Gap::Xs => "gap-xs",
        Gap::Sm => "gap-sm",
        Gap::Md => "gap-md",
        Gap::Lg => "gap-lg",
    }
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

fn is_remote(src: &str) -> bool {
    src.starts_with("data:") || src.starts_with("http://") || src.starts_with("https://")
}

/// Resolve an input image path for the output: joined onto the base path,
/// and inlined as a data URI when embedding is on. An image that cannot be
/// embedded falls back to its path.
pub fn resolve_image(src: &str, options: &HtmlOptions) -> String {
    if src.is_empty() || is_remote(src) {
        return src.to_string();
    }
    let path = match &options.base_path {
        Some(base) => base.join(src),
        None => PathBuf::from(src),
    };
    if options.embed_images {
        match data_uri(&path) {
            Ok(uri) => return uri,
            Err(e) => log::warn!("could not embed image '{}': {e}", path.display()),
        }
    }
    path.to_string_lossy().into_owned()
}

fn data_uri(path: &Path) -> std::result::Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let mime = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")) {
        "image/svg+xml"
    } else {
        image::guess_format(&bytes).map_err(|e| e.to_string())?.to_mime_type()
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::DocumentMeta;

    fn doc(pages: Vec<Fragment>) -> Document {
        Document {
            meta: DocumentMeta {
                title: "Test <Sheet>".into(),
                kind: DocumentKind::Item,
                generated_at: None,
            },
            pages,
        }
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render_fragment(&Fragment::text("note", "<script>alert('x')</script> & **bold**"), &HtmlOptions::default());
        assert_eq!(
            html,
            "<div class=\"note\">&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; <strong>bold</strong></div>"
        );
    }

    #[test]
    fn one_page_div_per_page() {
        let html = render_document(
            &doc(vec![Fragment::literal("a", "one"), Fragment::literal("b", "two")]),
            &StyleConfig::default(),
            &HtmlOptions::default(),
        );
        assert_eq!(html.matches("<div class=\"page page--item\">").count(), 2);
        assert!(html.contains("<title>Test &lt;Sheet&gt;</title>"));
        assert!(html.contains("--accent-primary: #7a1f1f;"));
        assert!(!html.contains("name=\"generated\""));
    }

    #[test]
    fn timestamp_only_in_head() {
        let mut d = doc(vec![Fragment::literal("a", "body")]);
        d.meta.generated_at = Some("2026-01-01T00:00:00Z".into());
        let html = render_document(&d, &StyleConfig::default(), &HtmlOptions::default());
        let body = &html[html.find("<body>").unwrap()..];
        assert!(!body.contains("2026-01-01"));
        assert!(html.contains("<meta name=\"generated\" content=\"2026-01-01T00:00:00Z\">"));
    }

    #[test]
    fn box_label_follows_position() {
        let frag = crate::components::BoxBuilder::new()
            .role("combat-stat")
            .title("Speed")
            .title_bottom()
            .child(Fragment::literal("v", "30"))
            .build();
        assert_eq!(
            render_fragment(&frag, &HtmlOptions::default()),
            "<div class=\"box combat-stat box--label-bottom\"><div class=\"v\">30</div><div class=\"box__label\">Speed</div></div>"
        );
    }

    #[test]
    fn table_footer_is_a_trailing_row() {
        let frag = Fragment::Table(TableFragment {
            role: "data-table".into(),
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec![vec![Run::plain("1")], vec![Run::plain("2")]]],
            footer: Some("Totals".into()),
        });
        let html = render_fragment(&frag, &HtmlOptions::default());
        assert!(html.ends_with("<tfoot><tr><td class=\"table-footer\" colspan=\"2\">Totals</td></tr></tfoot></table>"));
    }

    #[test]
    fn images_resolve_against_base_path() {
        let options = HtmlOptions {
            base_path: Some(PathBuf::from("assets")),
            embed_images: false,
        };
        assert_eq!(resolve_image("wolf.png", &options), Path::new("assets").join("wolf.png").to_string_lossy());
        assert_eq!(resolve_image("https://example.com/a.png", &options), "https://example.com/a.png");
    }

    #[test]
    fn missing_image_falls_back_to_path_when_embedding() {
        let options = HtmlOptions {
            base_path: None,
            embed_images: true,
        };
        assert_eq!(resolve_image("does/not/exist.png", &options), "does/not/exist.png");
    }

    #[test]
    fn embeds_png_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        // PNG signature is enough for format sniffing.
        fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
        let options = HtmlOptions {
            base_path: Some(dir.path().to_path_buf()),
            embed_images: true,
        };
        assert!(resolve_image("dot.png", &options).starts_with("data:image/png;base64,"));
    }

    #[test]
    fn style_config_partial_json() {
        let style = StyleConfig::from_json(r##"{"accent_primary": "#123456"}"##).unwrap();
        assert_eq!(style.accent_primary, "#123456");
        assert_eq!(style.page_width, "210mm");
    }
}
