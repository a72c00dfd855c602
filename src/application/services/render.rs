//! HTML export: turns a template into standalone, email-client-safe markup.
//!
//! Layout uses tables for multi-column rows and inline `style` attributes
//! everywhere; no stylesheet is emitted.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{Content, Node, Style, Template};

/// Document-level settings for the exported page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Contents of `<title>`
    pub title: String,
    /// Max width of the centered body wrapper, in px
    pub content_width: u32,
    /// Page background outside the wrapper
    pub background_color: String,
    /// Background of the wrapper itself
    pub content_background: String,
    pub font_family: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Email".to_string(),
            content_width: 600,
            background_color: "#f4f4f4".to_string(),
            content_background: "#ffffff".to_string(),
            font_family: "Arial, Helvetica, sans-serif".to_string(),
        }
    }
}

/// Serializes templates to HTML. Never mutates its input and never fails.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Full document: boilerplate around the root children in order.
    #[instrument(level = "debug", skip_all, fields(nodes = tree.node_count()))]
    pub fn render_document(&self, tree: &Template) -> String {
        let body = tree.children().iter().map(render_node).join("\n");
        let o = &self.options;
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>{title}</title>\n\
             </head>\n\
             <body style=\"margin: 0; padding: 0; background-color: {background};\">\n\
             <div style=\"max-width: {width}px; margin: 0 auto; background-color: {content_background}; font-family: {font};\">\n\
             {body}\n\
             </div>\n\
             </body>\n\
             </html>\n",
            title = escape_html(&o.title),
            background = escape_html(&o.background_color),
            width = o.content_width,
            content_background = escape_html(&o.content_background),
            font = escape_html(&o.font_family),
            body = body,
        )
    }
}

/// Render a template with default document settings.
pub fn render(tree: &Template) -> String {
    HtmlRenderer::default().render_document(tree)
}

/// Render one node and its subtree as an HTML fragment.
pub fn render_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    let style = style_attr(node.style());
    match node.content() {
        Content::Header(text) => {
            out.push_str(&format!("<h1{}>{}</h1>", style, escape_text(text)));
        }
        Content::Text(text) => {
            out.push_str(&format!("<p{}>{}</p>", style, escape_text(text)));
        }
        Content::Image(image) => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"{} />",
                escape_html(&image.src),
                escape_html(&image.alt),
                style
            ));
        }
        Content::Button(button) => {
            out.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\"{}>{}</a>",
                escape_html(&button.url),
                style,
                escape_html(&button.text)
            ));
        }
        Content::Divider => out.push_str(&format!("<hr{} />", style)),
        Content::Spacer => out.push_str(&format!("<div{}>&nbsp;</div>", style)),
        Content::Section(children) => {
            out.push_str(&format!("<div{}>", style));
            children.iter().for_each(|child| write_node(child, out));
            out.push_str("</div>");
        }
        Content::Columns(columns) => {
            out.push_str(&format!(
                "<table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\" width=\"100%\"{}><tr>",
                style
            ));
            columns.iter().for_each(|column| write_node(column, out));
            out.push_str("</tr></table>");
        }
        Content::Column(children) => {
            out.push_str(&format!("<td valign=\"top\"{}>", style));
            children.iter().for_each(|child| write_node(child, out));
            out.push_str("</td>");
        }
        Content::Unsupported { kind, .. } => {
            out.push_str(&format!(
                "<div style=\"border: 1px dashed #d93025; color: #d93025; font-family: monospace; padding: 8px;\">Unsupported element: {}</div>",
                escape_html(kind)
            ));
        }
    }
}

/// ` style="k: v; ..."` or nothing for an empty style. Keys that are not
/// plain CSS property names are skipped.
fn style_attr(style: &Style) -> String {
    let declarations = style
        .iter()
        .filter(|(key, _)| is_property_name(key))
        .map(|(key, value)| format!("{}: {};", key, escape_html(value.trim())))
        .join(" ");
    if declarations.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", declarations)
    }
}

fn is_property_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped text with line breaks kept.
fn escape_text(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}
