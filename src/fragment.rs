//! Fragment tree – the intermediate representation between document assembly
//! and serialization. This is the "frozen" structure that encodes exactly what
//! goes on each page, without any styling decisions.
//!
//! Nodes carry a `role`: a CSS-agnostic semantic tag (`"property-name"`,
//! `"stat-before"`, …) that the serializer is free to map however it likes.

use serde::{Deserialize, Serialize};

use crate::markup::{self, Run};

/// A fully assembled document ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub meta: DocumentMeta,
    /// Ordered list of pages; each page is one root fragment.
    pub pages: Vec<Fragment>,
}

/// Document metadata. This is the only place a generation timestamp may
/// live – page bodies are a pure function of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: String,
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CharacterSheet,
    Item,
}

/// One node of the output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Fragment {
    Box(BoxFragment),
    Row(FlexFragment),
    Col(FlexFragment),
    Grid(GridFragment),
    Group(GroupFragment),
    Text(TextFragment),
    List(ListFragment),
    Table(TableFragment),
    Image(ImageFragment),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePosition {
    #[default]
    Top,
    Bottom,
}

/// Spacing between children of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gap {
    None,
    Xs,
    #[default]
    Sm,
    Md,
    Lg,
}

/// A titled box around arbitrary content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub title_position: TitlePosition,
    /// Consume the remaining space of the parent container.
    #[serde(default)]
    pub fill: bool,
    #[serde(default)]
    pub centered: bool,
    pub body: Vec<Fragment>,
}

/// A Row or Col container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub gap: Gap,
    pub children: Vec<FlexItem>,
}

/// A flex child. `grow == 0` keeps its natural size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexItem {
    #[serde(default)]
    pub grow: u32,
    pub fragment: Fragment,
}

/// A fixed-column grid; `columns[i]` holds the children placed in column
/// `i + 1`, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub gap: Gap,
    pub columns: Vec<Vec<Fragment>>,
}

/// A semantic grouping with no layout behaviour of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFragment {
    pub role: String,
    pub children: Vec<Fragment>,
}

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub role: String,
    pub runs: Vec<Run>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFragment {
    pub role: String,
    pub items: Vec<Vec<Run>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFragment {
    pub role: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Vec<Run>>>,
    /// Rendered as a distinct trailing row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFragment {
    pub role: String,
    /// Path as written in the input; resolved by the serializer.
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// No renderer is registered for the content tag.
    UnknownContent,
    /// The content body does not have the shape its renderer expects.
    MalformedContent,
    /// The content rendered, but with a definition problem worth flagging.
    Warning,
    /// A derived value could not be computed.
    Unavailable,
    /// An optional slot with no data, rendered as a dash.
    Empty,
}

/// A visibly-marked stand-in for content that could not be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub message: String,
}

impl Placeholder {
    /// Whether this placeholder marks a defect (as opposed to absent data).
    pub fn is_defect(&self) -> bool {
        !matches!(self.kind, PlaceholderKind::Empty)
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl Fragment {
    pub fn text(role: &str, text: &str) -> Self {
        Fragment::Text(TextFragment {
            role: role.to_string(),
            runs: markup::expand_bold(text),
            italic: false,
        })
    }

    /// Text that is shown verbatim, without bold expansion.
    pub fn literal(role: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::plain(text)]
        };
        Fragment::Text(TextFragment {
            role: role.to_string(),
            runs,
            italic: false,
        })
    }

    pub fn group(role: &str, children: Vec<Fragment>) -> Self {
        Fragment::Group(GroupFragment {
            role: role.to_string(),
            children,
        })
    }

    pub fn image(role: &str, src: &str, alt: &str) -> Self {
        Fragment::Image(ImageFragment {
            role: role.to_string(),
            src: src.to_string(),
            alt: alt.to_string(),
        })
    }

    pub fn placeholder(kind: PlaceholderKind, message: impl Into<String>) -> Self {
        Fragment::Placeholder(Placeholder {
            kind,
            message: message.into(),
        })
    }

    pub fn unknown_content(tag: &str) -> Self {
        Self::placeholder(
            PlaceholderKind::UnknownContent,
            format!("[unknown content type: {tag}]"),
        )
    }

    pub fn malformed(tag: &str, reason: impl std::fmt::Display) -> Self {
        Self::placeholder(
            PlaceholderKind::MalformedContent,
            format!("[malformed {tag} content: {reason}]"),
        )
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::placeholder(PlaceholderKind::Warning, message)
    }

    pub fn unavailable() -> Self {
        Self::placeholder(PlaceholderKind::Unavailable, "—")
    }

    pub fn dash() -> Self {
        Self::placeholder(PlaceholderKind::Empty, "—")
    }

    /// Direct child fragments, in document order.
    pub fn children(&self) -> Vec<&Fragment> {
        match self {
            Fragment::Box(b) => b.body.iter().collect(),
            Fragment::Row(f) | Fragment::Col(f) => f.children.iter().map(|c| &c.fragment).collect(),
            Fragment::Grid(g) => g.columns.iter().flatten().collect(),
            Fragment::Group(g) => g.children.iter().collect(),
            Fragment::Text(_)
            | Fragment::List(_)
            | Fragment::Table(_)
            | Fragment::Image(_)
            | Fragment::Placeholder(_) => Vec::new(),
        }
    }

    /// Depth-first, pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Fragment)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Every placeholder marking a defect in this subtree.
    pub fn diagnostics(&self) -> Vec<&Placeholder> {
        let mut found = Vec::new();
        self.visit(&mut |node| {
            if let Fragment::Placeholder(p) = node {
                if p.is_defect() {
                    found.push(p);
                }
            }
        });
        found
    }

    /// Concatenated visible text of this subtree, for tests and debugging.
    pub fn plain_text(&self) -> String {
        let mut out = Vec::new();
        self.visit(&mut |node| match node {
            Fragment::Box(b) => {
                if let Some(title) = &b.title {
                    out.push(title.clone());
                }
            }
            Fragment::Text(t) => out.push(markup::plain_text(&t.runs)),
            Fragment::List(l) => out.extend(l.items.iter().map(|i| markup::plain_text(i))),
            Fragment::Table(t) => {
                out.extend(t.headers.iter().cloned());
                for row in &t.rows {
                    out.extend(row.iter().map(|c| markup::plain_text(c)));
                }
                out.extend(t.footer.iter().cloned());
            }
            Fragment::Placeholder(p) => out.push(p.message.clone()),
            _ => {}
        });
        out.retain(|s| !s.is_empty());
        out.join(" ")
    }
}

impl Document {
    pub fn diagnostics(&self) -> Vec<&Placeholder> {
        self.pages.iter().flat_map(|p| p.diagnostics()).collect()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fragment {
        Fragment::Box(BoxFragment {
            role: Some("section".into()),
            title: Some("Lore".into()),
            title_position: TitlePosition::Top,
            fill: false,
            centered: false,
            body: vec![
                Fragment::text("paragraph", "A **gleaming** blade"),
                Fragment::unknown_content("sparkles"),
                Fragment::dash(),
            ],
        })
    }

    #[test]
    fn diagnostics_skip_empty_dashes() {
        let frag = sample();
        let diags = frag.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, PlaceholderKind::UnknownContent);
        assert_eq!(diags[0].message, "[unknown content type: sparkles]");
    }

    #[test]
    fn plain_text_walks_in_order() {
        assert_eq!(
            sample().plain_text(),
            "Lore A gleaming blade [unknown content type: sparkles] —"
        );
    }

    #[test]
    fn document_json_roundtrip() {
        let doc = Document {
            meta: DocumentMeta {
                title: "Sword".into(),
                kind: DocumentKind::Item,
                generated_at: None,
            },
            pages: vec![sample()],
        };
        let json = doc.to_json();
        assert!(json.contains("\"node\": \"box\""));
        let parsed = Document::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
