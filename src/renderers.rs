//! General content-type renderers.
//!
//! Each renderer decodes its block into a small typed body and builds a
//! fragment from it. Bodies are lenient: every field has a default, so only a
//! field of the wrong JSON type makes a block malformed. Most bodies accept an
//! optional `class` that overrides the role of the outermost fragment.

use serde::Deserialize;
use serde_json::Value;

use crate::fragment::{Fragment, ListFragment, TableFragment, TextFragment};
use crate::markup::{self, Run};
use crate::model::ContentBlock;
use crate::registry::{typed, RenderContext, RendererRegistry};

/// Install every renderer in this module.
pub fn register_builtins(registry: &mut RendererRegistry) {
    registry
        .register("text", render_text)
        .register("text_italic", render_text_italic)
        .register("paragraphs", render_paragraphs)
        .register("bullets", render_bullets)
        .register("styled_list", render_styled_list)
        .register("properties", render_properties)
        .register("table", render_table)
        .register("quote", render_quote)
        .register("comparison", render_comparison)
        .register("tales", render_tales)
        .register("subsections", render_subsections)
        .register("synergy", render_synergy)
        .register("mixed", render_mixed);
}

/// Text of a scalar JSON value: strings verbatim, numbers and booleans via
/// their JSON form, null as empty.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Deserialize a scalar (string, number, bool, null) into its display text.
pub(crate) fn de_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(_) | Value::Object(_) => Err(serde::de::Error::custom("expected a string or number")),
        scalar => Ok(scalar_text(&scalar)),
    }
}

fn role_or<'a>(class: &'a Option<String>, default: &'a str) -> &'a str {
    class.as_deref().unwrap_or(default)
}

fn paragraph_fragments(ctx: &RenderContext<'_>, parts: &[&str], italic: bool) -> Vec<Fragment> {
    parts
        .iter()
        .map(|p| {
            Fragment::Text(TextFragment {
                role: "paragraph".to_string(),
                runs: ctx.runs(p),
                italic,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextBody {
    text: String,
    class: Option<String>,
}

fn render_text(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TextBody| {
        let parts = markup::paragraphs(&body.text);
        Fragment::group(role_or(&body.class, "text"), paragraph_fragments(ctx, &parts, false))
    })
}

fn render_text_italic(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TextBody| {
        let parts = markup::paragraphs(&body.text);
        Fragment::group(role_or(&body.class, "flavor-text"), paragraph_fragments(ctx, &parts, true))
    })
}

fn render_paragraphs(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TextBody| {
        let parts = markup::paragraphs_lenient(&body.text);
        Fragment::group(role_or(&body.class, "paragraphs"), paragraph_fragments(ctx, &parts, false))
    })
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListBody {
    #[serde(deserialize_with = "de_scalar_list")]
    items: Vec<String>,
    class: Option<String>,
}

fn de_scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Scalar(#[serde(deserialize_with = "de_scalar")] String);
    let items: Vec<Scalar> = Vec::deserialize(deserializer)?;
    Ok(items.into_iter().map(|s| s.0).collect())
}

pub(crate) fn bullet_list(ctx: &RenderContext<'_>, role: &str, items: &[String]) -> Fragment {
    Fragment::List(ListFragment {
        role: role.to_string(),
        items: items.iter().map(|i| ctx.runs(i)).collect(),
    })
}

fn render_bullets(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: ListBody| bullet_list(ctx, role_or(&body.class, "bullets"), &body.items))
}

/// Items are shown verbatim: no bold expansion.
fn render_styled_list(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: ListBody| {
        Fragment::List(ListFragment {
            role: role_or(&body.class, "styled-list").to_string(),
            items: body
                .items
                .into_iter()
                .map(|i| if i.is_empty() { Vec::new() } else { vec![Run::plain(i)] })
                .collect(),
        })
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Property {
    icon: String,
    name: String,
    desc: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PropertiesBody {
    items: Vec<Property>,
}

fn render_properties(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: PropertiesBody| {
        let rows = body
            .items
            .iter()
            .map(|p| {
                Fragment::group(
                    "property",
                    vec![
                        Fragment::literal("property-icon", p.icon.as_str()),
                        strong("property-name", &p.name),
                        ctx.text("property-desc", &p.desc),
                    ],
                )
            })
            .collect();
        Fragment::group("property-list", rows)
    })
}

/// A text fragment whose whole content is emphasized.
pub(crate) fn strong(role: &str, text: &str) -> Fragment {
    let runs = if text.is_empty() {
        Vec::new()
    } else {
        vec![Run::strong(text)]
    };
    Fragment::Text(TextFragment {
        role: role.to_string(),
        runs,
        italic: false,
    })
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableBody {
    #[serde(deserialize_with = "de_scalar_list")]
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    footer: Option<String>,
    class: Option<String>,
}

/// Rows whose width differs from the header are kept as-is; a warning
/// placeholder after the table lists them.
fn render_table(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TableBody| {
        let width = body.columns.len();
        let mut mismatched = Vec::new();
        let rows: Vec<Vec<Vec<Run>>> = body
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if width > 0 && row.len() != width {
                    mismatched.push(format!("row {} has {} cells", i + 1, row.len()));
                }
                row.iter().map(|cell| ctx.runs(&scalar_text(cell))).collect()
            })
            .collect();

        let table = Fragment::Table(TableFragment {
            role: role_or(&body.class, "data-table").to_string(),
            headers: body.columns,
            rows,
            footer: body.footer.filter(|f| !f.is_empty()),
        });

        if mismatched.is_empty() {
            return table;
        }
        log::warn!("table rows do not match its {width} columns: {}", mismatched.join(", "));
        Fragment::group(
            "table-block",
            vec![
                table,
                Fragment::warning(format!(
                    "[table expects {width} columns: {}]",
                    mismatched.join("; ")
                )),
            ],
        )
    })
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteBody {
    text: String,
    attribution: Option<String>,
}

fn render_quote(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: QuoteBody| {
        let mut children = vec![ctx.text("quote-text", &body.text)];
        if let Some(attribution) = body.attribution.filter(|a| !a.is_empty()) {
            children.push(Fragment::literal("quote-attribution", attribution));
        }
        Fragment::group("quote", children)
    })
}

// ---------------------------------------------------------------------------
// Comparison / tales / subsections
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Comparison {
    #[serde(deserialize_with = "de_scalar")]
    before: String,
    #[serde(deserialize_with = "de_scalar")]
    after: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparisonBody {
    items: Vec<Comparison>,
}

fn comparison_list(items: &[Comparison]) -> Fragment {
    let rows = items
        .iter()
        .map(|c| {
            Fragment::group(
                "comparison",
                vec![
                    Fragment::literal("stat-before", c.before.as_str()),
                    Fragment::literal("stat-arrow", "→"),
                    Fragment::literal("stat-after", c.after.as_str()),
                ],
            )
        })
        .collect();
    Fragment::group("comparison-list", rows)
}

fn render_comparison(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: ComparisonBody| comparison_list(&body.items))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Tale {
    title: String,
    desc: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TalesBody {
    items: Vec<Tale>,
}

fn render_tales(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TalesBody| {
        let tales = body
            .items
            .iter()
            .map(|t| Fragment::group("tale", vec![strong("tale-title", &t.title), ctx.text("tale-desc", &t.desc)]))
            .collect();
        Fragment::group("tales", tales)
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Subsection {
    name: String,
    #[serde(deserialize_with = "de_scalar_list")]
    bullets: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubsectionsBody {
    items: Vec<Subsection>,
}

fn subsection_list(ctx: &RenderContext<'_>, items: &[Subsection]) -> Vec<Fragment> {
    items
        .iter()
        .map(|s| {
            Fragment::group(
                "subsection",
                vec![strong("subsection-name", &s.name), bullet_list(ctx, "bullets", &s.bullets)],
            )
        })
        .collect()
}

fn render_subsections(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SubsectionsBody| Fragment::group("subsections", subsection_list(ctx, &body.items)))
}

// ---------------------------------------------------------------------------
// Synergy
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SynergyHeader {
    icon: String,
    title: String,
    subtitle: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SynergyBody {
    header: SynergyHeader,
    comparisons: Vec<Comparison>,
    subsections: Vec<Subsection>,
}

/// Header, then comparisons, then subsections.
fn render_synergy(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SynergyBody| {
        let header = Fragment::group(
            "synergy-header",
            vec![
                Fragment::literal("synergy-icon", body.header.icon),
                strong("synergy-title", &body.header.title),
                Fragment::literal("synergy-subtitle", body.header.subtitle),
            ],
        );
        let mut children = vec![header, comparison_list(&body.comparisons)];
        children.extend(subsection_list(ctx, &body.subsections));
        Fragment::group("synergy", children)
    })
}

// ---------------------------------------------------------------------------
// Mixed
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MixedBody {
    blocks: Vec<Value>,
}

/// Each child goes back through the registry. A child that is not a content
/// object degrades on its own; its siblings still render.
fn render_mixed(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: MixedBody| {
        let children = body
            .blocks
            .into_iter()
            .enumerate()
            .map(|(i, value)| match serde_json::from_value::<ContentBlock>(value) {
                Ok(child) => ctx.render_child(&child),
                Err(e) => {
                    log::warn!("mixed block {} is not a content object: {e}", i + 1);
                    Fragment::malformed("mixed", format!("block {} {e}", i + 1))
                }
            })
            .collect();
        Fragment::group("mixed", children)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PlaceholderKind;
    use crate::registry::RenderOptions;
    use serde_json::json;

    fn render(value: serde_json::Value) -> Fragment {
        let registry = RendererRegistry::with_builtins();
        let block: ContentBlock = serde_json::from_value(value).unwrap();
        registry.render_block(&block, RenderOptions::default())
    }

    #[test]
    fn text_splits_paragraphs_and_expands_bold() {
        let frag = render(json!({"type": "text", "text": "First **bold**.\n\nSecond."}));
        let Fragment::Group(g) = &frag else {
            panic!("expected group, got {frag:?}");
        };
        assert_eq!(g.children.len(), 2);
        let Fragment::Text(first) = &g.children[0] else {
            panic!("expected text");
        };
        assert_eq!(first.runs, vec![Run::plain("First "), Run::strong("bold"), Run::plain(".")]);
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let frag = render(json!({"text": "Plain words"}));
        assert_eq!(frag.plain_text(), "Plain words");
        assert!(frag.diagnostics().is_empty());
    }

    #[test]
    fn null_fields_render_empty() {
        let frag = render(json!({"type": "text", "text": null}));
        assert!(frag.diagnostics().is_empty());
        assert_eq!(frag.plain_text(), "");

        let frag = render(json!({"type": "bullets", "items": null, "class": null}));
        let Fragment::List(list) = frag else { panic!("expected list") };
        assert_eq!(list.role, "bullets");
        assert!(list.items.is_empty());
    }

    #[test]
    fn styled_list_items_are_verbatim() {
        let frag = render(json!({"type": "styled_list", "items": ["**Darkvision** 60 ft"]}));
        let Fragment::List(list) = frag else { panic!("expected list") };
        assert_eq!(list.role, "styled-list");
        assert_eq!(list.items, vec![vec![Run::plain("**Darkvision** 60 ft")]]);
    }

    #[test]
    fn italic_text_is_marked() {
        let frag = render(json!({"type": "text_italic", "text": "Whispers."}));
        let Fragment::Group(g) = frag else { panic!("expected group") };
        assert!(matches!(&g.children[0], Fragment::Text(t) if t.italic));
    }

    #[test]
    fn properties_keep_input_order() {
        let frag = render(json!({
            "type": "properties",
            "items": [
                {"icon": "⚔", "name": "Finesse", "desc": "Use DEX"},
                {"icon": "🎯", "name": "Light", "desc": "Two-weapon fighting"},
                {"icon": "🔥", "name": "Flaming", "desc": "+1d6 fire"}
            ]
        }));
        assert_eq!(
            frag.plain_text(),
            "⚔ Finesse Use DEX 🎯 Light Two-weapon fighting 🔥 Flaming +1d6 fire"
        );
        let Fragment::Group(list) = frag else { panic!("expected group") };
        let Fragment::Group(first) = &list.children[0] else { panic!("expected property") };
        assert!(matches!(&first.children[1], Fragment::Text(t) if t.runs.iter().all(|r| r.strong)));
    }

    #[test]
    fn table_with_matching_rows_has_no_warning() {
        let frag = render(json!({
            "type": "table",
            "columns": ["Level", "Damage"],
            "rows": [["1", "1d6"], [5, "2d6"]],
            "footer": "Scales with proficiency"
        }));
        let Fragment::Table(t) = &frag else { panic!("expected table, got {frag:?}") };
        assert_eq!(t.rows.len(), 2);
        assert_eq!(markup::plain_text(&t.rows[1][0]), "5");
        assert_eq!(t.footer.as_deref(), Some("Scales with proficiency"));
    }

    #[test]
    fn table_row_mismatch_keeps_row_and_warns() {
        let frag = render(json!({
            "type": "table",
            "columns": ["A", "B", "C"],
            "rows": [["1", "2", "3"], ["only", "two"]]
        }));
        let Fragment::Group(g) = &frag else { panic!("expected table block, got {frag:?}") };
        let Fragment::Table(t) = &g.children[0] else { panic!("expected table first") };
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1].len(), 2);
        let diags = frag.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, PlaceholderKind::Warning);
        assert!(diags[0].message.contains("row 2 has 2 cells"));
    }

    #[test]
    fn quote_without_attribution() {
        let frag = render(json!({"type": "quote", "text": "Steel remembers."}));
        let Fragment::Group(g) = frag else { panic!("expected group") };
        assert_eq!(g.children.len(), 1);
    }

    #[test]
    fn comparison_values_are_opaque() {
        let frag = render(json!({"type": "comparison", "items": [{"before": "1d8", "after": 12}]}));
        assert_eq!(frag.plain_text(), "1d8 → 12");
    }

    #[test]
    fn synergy_renders_header_comparisons_then_subsections() {
        let frag = render(json!({
            "type": "synergy",
            "header": {"icon": "🐺", "title": "Pack Tactics", "subtitle": "With your wolf"},
            "comparisons": [{"before": "AC 13", "after": "AC 15"}],
            "subsections": [{"name": "Flank", "bullets": ["Advantage on **attacks**"]}]
        }));
        assert_eq!(
            frag.plain_text(),
            "🐺 Pack Tactics With your wolf AC 13 → AC 15 Flank Advantage on attacks"
        );
    }

    #[test]
    fn mixed_preserves_order_and_isolates_failures() {
        let frag = render(json!({
            "type": "mixed",
            "blocks": [
                {"type": "text", "text": "Intro"},
                {"type": "sparkles"},
                "not an object",
                {"type": "bullets", "items": ["one", "two"]}
            ]
        }));
        let Fragment::Group(g) = &frag else { panic!("expected group") };
        assert_eq!(g.children.len(), 4);
        assert_eq!(g.children[0].plain_text(), "Intro");
        assert_eq!(g.children[3].plain_text(), "one two");
        let kinds: Vec<_> = frag.diagnostics().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PlaceholderKind::UnknownContent, PlaceholderKind::MalformedContent]);
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let frag = render(json!({"type": "bullets", "items": "not a list"}));
        let diags = frag.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, PlaceholderKind::MalformedContent);
        assert!(diags[0].message.starts_with("[malformed bullets content:"));
    }

    #[test]
    fn bold_expansion_can_be_disabled() {
        let registry = RendererRegistry::with_builtins();
        let block: ContentBlock = serde_json::from_value(json!({"type": "bullets", "items": ["**x**"]})).unwrap();
        let options = RenderOptions {
            expand_bold: false,
            ..RenderOptions::default()
        };
        let Fragment::List(list) = registry.render_block(&block, options) else {
            panic!("expected list");
        };
        assert_eq!(list.items[0], vec![Run::plain("**x**")]);
    }
}
