use crate::block::Block;
use crate::error::{RenderError, RenderResult};
use std::collections::HashMap;

pub type RenderFn = Box<dyn Fn(&Block) -> RenderResult<String> + Send + Sync>;

/// Explicit map from block type to renderer. Populated once at startup and
/// read-only afterwards; `register`/`unregister` are administrative calls,
/// never ambient mutation during a render.
#[derive(Default)]
pub struct BlockRegistry {
    renderers: HashMap<String, RenderFn>,
}

/// Result of rendering a whole page: an unknown or failing block is
/// reported and skipped, never fatal to its siblings.
#[derive(Debug, Default)]
pub struct RenderOutput {
    pub html: String,
    pub errors: Vec<RenderError>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the stock block renderers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("hero", Box::new(render_hero));
        registry.register("text", Box::new(render_text));
        registry.register("image", Box::new(render_image));
        registry.register("cta", Box::new(render_cta));
        registry
    }

    pub fn register(&mut self, block_type: impl Into<String>, renderer: RenderFn) {
        self.renderers.insert(block_type.into(), renderer);
    }

    pub fn unregister(&mut self, block_type: &str) -> bool {
        self.renderers.remove(block_type).is_some()
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.renderers.contains_key(block_type)
    }

    pub fn render(&self, block: &Block) -> RenderResult<String> {
        let renderer = self
            .renderers
            .get(&block.block_type)
            .ok_or_else(|| RenderError::UnknownBlock(block.block_type.clone()))?;
        renderer(block)
    }

    /// Render every block in order. Failures become comment placeholders
    /// plus collected errors; the remaining siblings still render.
    pub fn render_all(&self, blocks: &[Block]) -> RenderOutput {
        let mut output = RenderOutput::default();
        for block in blocks {
            match self.render(block) {
                Ok(html) => {
                    output.html.push_str(&html);
                    output.html.push('\n');
                }
                Err(err) => {
                    tracing::warn!(block_type = %block.block_type, error = %err, "block failed to render");
                    output
                        .html
                        .push_str(&format!("<!-- block error: {} -->\n", block.block_type));
                    output.errors.push(err);
                }
            }
        }
        output
    }
}

fn render_hero(block: &Block) -> RenderResult<String> {
    let title = block.require_str("title")?;
    let mut html = format!(
        "<section class=\"hero\">\n  <h1>{}</h1>\n",
        escape_html(title)
    );
    if let Some(subtitle) = block.prop_str("subtitle") {
        html.push_str(&format!("  <p>{}</p>\n", escape_html(subtitle)));
    }
    html.push_str("</section>");
    Ok(html)
}

fn render_text(block: &Block) -> RenderResult<String> {
    let content = block.require_str("content")?;
    Ok(format!(
        "<section class=\"text\">\n  <p>{}</p>\n</section>",
        escape_html(content)
    ))
}

fn render_image(block: &Block) -> RenderResult<String> {
    let src = block.require_str("src")?;
    let alt = block.prop_str("alt").unwrap_or("");
    Ok(format!(
        "<figure class=\"image\">\n  <img src=\"{}\" alt=\"{}\" />\n</figure>",
        escape_html(src),
        escape_html(alt)
    ))
}

fn render_cta(block: &Block) -> RenderResult<String> {
    let label = block.require_str("label")?;
    let href = block.require_str("href")?;
    Ok(format!(
        "<a class=\"cta\" href=\"{}\">{}</a>",
        escape_html(href),
        escape_html(label)
    ))
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(block_type: &str, props: serde_json::Value) -> Block {
        Block {
            block_type: block_type.to_string(),
            props,
        }
    }

    #[test]
    fn test_renders_known_blocks() {
        let registry = BlockRegistry::with_builtins();
        let html = registry
            .render(&block(
                "hero",
                serde_json::json!({ "title": "Welcome", "subtitle": "Hi" }),
            ))
            .unwrap();
        assert!(html.contains("<h1>Welcome</h1>"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_unknown_block_degrades_and_siblings_still_render() {
        let registry = BlockRegistry::with_builtins();
        let blocks = vec![
            block("hero", serde_json::json!({ "title": "First" })),
            block("carousel", serde_json::json!({})),
            block("text", serde_json::json!({ "content": "Last" })),
        ];
        let output = registry.render_all(&blocks);
        assert!(output.html.contains("First"));
        assert!(output.html.contains("Last"));
        assert!(output.html.contains("<!-- block error: carousel -->"));
        assert_eq!(
            output.errors,
            vec![RenderError::UnknownBlock("carousel".to_string())]
        );
    }

    #[test]
    fn test_unregister_removes_renderer() {
        let mut registry = BlockRegistry::with_builtins();
        assert!(registry.contains("cta"));
        assert!(registry.unregister("cta"));
        let err = registry
            .render(&block("cta", serde_json::json!({})))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownBlock(_)));
    }

    #[test]
    fn test_text_content_is_escaped() {
        let registry = BlockRegistry::with_builtins();
        let html = registry
            .render(&block(
                "text",
                serde_json::json!({ "content": "a < b & c" }),
            ))
            .unwrap();
        assert!(html.contains("a &lt; b &amp; c"));
    }
}
