//! Renderer registry – maps content tags to the functions that render them.
//!
//! The registry is an explicit value handed to the assemblers; there is no
//! process-wide table. Lookups never fail: an unregistered tag resolves to a
//! fallback renderer that emits an `[unknown content type: …]` placeholder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::fragment::Fragment;
use crate::model::ContentBlock;

/// Nesting limit for recursive content such as `mixed`.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Renders one content block to a fragment. Implementations must be pure:
/// same block and context in, same fragment out.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment;
}

impl<F> ContentRenderer for F
where
    F: Fn(&ContentBlock, &RenderContext<'_>) -> Fragment + Send + Sync,
{
    fn render(&self, block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
        self(block, ctx)
    }
}

/// Knobs that apply to every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Turn `**bold**` spans into emphasized runs.
    pub expand_bold: bool,
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            expand_bold: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What a renderer sees besides its block: the registry (for recursive
/// dispatch), the current nesting depth, and the options.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a RendererRegistry,
    pub depth: usize,
    pub options: RenderOptions,
}

impl<'a> RenderContext<'a> {
    pub fn new(registry: &'a RendererRegistry) -> Self {
        Self {
            registry,
            depth: 0,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Context for rendering a child block one level deeper.
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Render a child block through the registry, one level deeper. Past
    /// the depth limit a warning placeholder is returned instead.
    pub fn render_child(&self, block: &ContentBlock) -> Fragment {
        let child = self.nested();
        if child.depth > self.options.max_depth {
            log::warn!(
                "content nesting exceeds {} levels at '{}'; truncated",
                self.options.max_depth,
                block.tag
            );
            return Fragment::warning(format!(
                "[content nested deeper than {} levels]",
                self.options.max_depth
            ));
        }
        self.registry.render(block, &child)
    }

    /// Inline text in the configured markup mode.
    pub fn text(&self, role: &str, text: &str) -> Fragment {
        if self.options.expand_bold {
            Fragment::text(role, text)
        } else {
            Fragment::literal(role, text)
        }
    }

    pub fn runs(&self, text: &str) -> Vec<crate::markup::Run> {
        if self.options.expand_bold {
            crate::markup::expand_bold(text)
        } else if text.is_empty() {
            Vec::new()
        } else {
            vec![crate::markup::Run::plain(text)]
        }
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("depth", &self.depth)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Decode the block into `T` and hand it to `render`; a body of the wrong
/// shape becomes a malformed-content placeholder.
pub fn typed<T, F>(block: &ContentBlock, render: F) -> Fragment
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fragment,
{
    match block.decode::<T>() {
        Ok(body) => render(body),
        Err(e) => {
            log::warn!("malformed '{}' content: {e}", block.tag);
            Fragment::malformed(&block.tag, e)
        }
    }
}

fn unknown_content(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    log::warn!("no renderer registered for content type '{}'", block.tag);
    Fragment::unknown_content(&block.tag)
}

/// Tag → renderer table.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn ContentRenderer>>,
    fallback: Arc<dyn ContentRenderer>,
}

impl RendererRegistry {
    /// A registry with no renderers at all; every tag hits the fallback.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(unknown_content),
        }
    }

    /// A registry with the general and character-sheet renderers installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        crate::renderers::register_builtins(&mut registry);
        crate::sheet_renderers::register_builtins(&mut registry);
        registry
    }

    /// Install `renderer` for `tag`, replacing any previous one.
    pub fn register(&mut self, tag: &str, renderer: impl ContentRenderer + 'static) -> &mut Self {
        self.register_arc(tag, Arc::new(renderer))
    }

    pub fn register_arc(&mut self, tag: &str, renderer: Arc<dyn ContentRenderer>) -> &mut Self {
        if self.renderers.insert(tag.to_string(), renderer).is_some() {
            log::debug!("replaced renderer for '{tag}'");
        }
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// The renderer for `tag`, or the unknown-content fallback.
    pub fn resolve(&self, tag: &str) -> &dyn ContentRenderer {
        match self.renderers.get(tag) {
            Some(r) => r.as_ref(),
            None => self.fallback.as_ref(),
        }
    }

    pub fn render(&self, block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
        log::debug!("render '{}' at depth {}", block.tag, ctx.depth);
        self.resolve(&block.tag).render(block, ctx)
    }

    /// Render a top-level block with a fresh context.
    pub fn render_block(&self, block: &ContentBlock, options: RenderOptions) -> Fragment {
        let ctx = RenderContext::new(self).with_options(options);
        self.render(block, &ctx)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tags", &self.tags())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PlaceholderKind;
    use serde_json::json;

    fn block(value: serde_json::Value) -> ContentBlock {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_tag_yields_placeholder() {
        let registry = RendererRegistry::with_builtins();
        let frag = registry.render_block(&block(json!({"type": "not_a_real_type"})), RenderOptions::default());
        match frag {
            Fragment::Placeholder(p) => {
                assert_eq!(p.kind, PlaceholderKind::UnknownContent);
                assert_eq!(p.message, "[unknown content type: not_a_real_type]");
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn register_replaces_existing_renderer() {
        let mut registry = RendererRegistry::with_builtins();
        registry.register("text", |_: &ContentBlock, _: &RenderContext<'_>| Fragment::literal("custom", "overridden"));
        let frag = registry.render_block(&block(json!({"type": "text", "text": "hello"})), RenderOptions::default());
        assert_eq!(frag.plain_text(), "overridden");
    }

    #[test]
    fn registering_twice_is_idempotent() {
        let mut once = RendererRegistry::empty();
        once.register("x", |_: &ContentBlock, _: &RenderContext<'_>| Fragment::literal("x", "same"));
        let mut twice = RendererRegistry::empty();
        twice.register("x", |_: &ContentBlock, _: &RenderContext<'_>| Fragment::literal("x", "same"));
        twice.register("x", |_: &ContentBlock, _: &RenderContext<'_>| Fragment::literal("x", "same"));

        let b = block(json!({"type": "x"}));
        assert_eq!(
            once.render_block(&b, RenderOptions::default()),
            twice.render_block(&b, RenderOptions::default())
        );
        assert_eq!(once.tags(), twice.tags());
    }

    #[test]
    fn builtins_cover_general_and_sheet_tags() {
        let registry = RendererRegistry::default();
        for tag in ["text", "bullets", "table", "mixed", "synergy", "ability_scores", "companion", "item_stats"] {
            assert!(registry.contains(tag), "missing builtin '{tag}'");
        }
    }

    #[test]
    fn nesting_beyond_limit_is_cut_off() {
        let registry = RendererRegistry::with_builtins();
        let options = RenderOptions {
            max_depth: 2,
            ..RenderOptions::default()
        };
        let deep = block(json!({
            "type": "mixed",
            "blocks": [{"type": "mixed", "blocks": [{"type": "mixed", "blocks": [{"type": "text", "text": "deep"}]}]}]
        }));
        let frag = registry.render_block(&deep, options);
        let diags = frag.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, PlaceholderKind::Warning);
        assert!(!frag.plain_text().contains("deep"));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RendererRegistry>();
    }
}
