//! Conversion of block-structured rich text (as stored in JSONB) into plain
//! text and HTML for email bodies.

use std::fmt;

use serde_json::Value;

pub const CONVERSION_PLACEHOLDER: &str = "[Error processing message content]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextError(String);

impl fmt::Display for RichTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed rich text: {}", self.0)
    }
}

impl std::error::Error for RichTextError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    Text(Span),
    Link { url: String, children: Vec<Span> },
}

/// `Ok(None)` means the input was not a block array at all.
fn parse_paragraphs(value: &Value) -> Result<Option<Vec<Vec<Inline>>>, RichTextError> {
    let Some(blocks) = value.as_array() else {
        return Ok(None);
    };

    let mut paragraphs = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        let node = block
            .as_object()
            .ok_or_else(|| RichTextError(format!("block {} is not an object", index)))?;

        if node.get("type").and_then(Value::as_str) != Some("paragraph") {
            continue;
        }

        let children = node
            .get("children")
            .and_then(Value::as_array)
            .ok_or_else(|| RichTextError(format!("paragraph {} has no children array", index)))?;

        let inlines = children
            .iter()
            .map(parse_inline)
            .collect::<Result<Vec<_>, _>>()?;
        paragraphs.push(inlines);
    }

    Ok(Some(paragraphs))
}

fn parse_inline(node: &Value) -> Result<Inline, RichTextError> {
    if node.get("type").and_then(Value::as_str) == Some("link") {
        let url = node
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| RichTextError("link without url".to_string()))?;
        let children = node
            .get("children")
            .and_then(Value::as_array)
            .ok_or_else(|| RichTextError("link without children".to_string()))?
            .iter()
            .map(parse_span)
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Inline::Link {
            url: url.to_string(),
            children,
        });
    }

    parse_span(node).map(Inline::Text)
}

fn parse_span(node: &Value) -> Result<Span, RichTextError> {
    let text = node
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| RichTextError("text node without string text".to_string()))?;
    let flag = |name: &str| node.get(name).and_then(Value::as_bool).unwrap_or(false);

    Ok(Span {
        text: text.to_string(),
        bold: flag("bold"),
        italic: flag("italic"),
        underline: flag("underline"),
    })
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_attribute(input: &str) -> String {
    escape_html(input).replace('"', "&quot;")
}

fn span_html(span: &Span) -> String {
    let mut html = escape_html(&span.text);
    if span.bold {
        html = format!("<strong>{}</strong>", html);
    }
    if span.italic {
        html = format!("<em>{}</em>", html);
    }
    if span.underline {
        html = format!("<u>{}</u>", html);
    }
    html
}

/// Paragraph text joined by blank lines. Non-array input yields `""`.
pub fn to_plain_text(value: &Value) -> Result<String, RichTextError> {
    let Some(paragraphs) = parse_paragraphs(value)? else {
        return Ok(String::new());
    };

    let text = paragraphs
        .iter()
        .map(|inlines| {
            inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Text(span) => span.text.clone(),
                    Inline::Link { children, .. } => {
                        children.iter().map(|s| s.text.as_str()).collect()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(text)
}

/// One `<p>` per paragraph. Non-array input yields `"<p></p>"`.
pub fn to_html(value: &Value) -> Result<String, RichTextError> {
    let Some(paragraphs) = parse_paragraphs(value)? else {
        return Ok("<p></p>".to_string());
    };

    let html = paragraphs
        .iter()
        .map(|inlines| {
            let body: String = inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Text(span) => span_html(span),
                    Inline::Link { url, children } => format!(
                        "<a href=\"{}\">{}</a>",
                        escape_attribute(url),
                        children.iter().map(span_html).collect::<String>()
                    ),
                })
                .collect();
            format!("<p>{}</p>", body)
        })
        .collect();

    Ok(html)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub text: String,
    pub html: String,
}

/// Render for an email body. Conversion failures are logged and replaced by
/// a fixed placeholder so the email still goes out.
pub fn render_for_email(value: &Value) -> RenderedText {
    match (to_plain_text(value), to_html(value)) {
        (Ok(text), Ok(html)) => RenderedText { text, html },
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Failed to convert rich text message");
            RenderedText {
                text: CONVERSION_PLACEHOLDER.to_string(),
                html: format!("<p>{}</p>", CONVERSION_PLACEHOLDER),
            }
        }
    }
}

/// Wrap plain text as a single paragraph block.
pub fn paragraph_from_text(text: &str) -> Value {
    serde_json::json!([{
        "type": "paragraph",
        "children": [{ "type": "text", "text": text }],
    }])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn converts_bold_paragraph() {
        let value = json!([{
            "type": "paragraph",
            "children": [{ "text": "Hello", "bold": true }]
        }]);

        assert_eq!(to_plain_text(&value).unwrap(), "Hello");
        assert_eq!(to_html(&value).unwrap(), "<p><strong>Hello</strong></p>");
    }

    #[test]
    fn joins_paragraphs_and_ignores_other_blocks() {
        let value = json!([
            { "type": "heading", "level": 2, "children": [{ "text": "Title" }] },
            { "type": "paragraph", "children": [{ "text": "First " }, { "text": "line" }] },
            { "type": "paragraph", "children": [{ "text": "Second" }] },
        ]);

        assert_eq!(to_plain_text(&value).unwrap(), "First line\n\nSecond");
        assert_eq!(to_html(&value).unwrap(), "<p>First line</p><p>Second</p>");
    }

    #[test]
    fn wraps_styles_bold_then_italic_then_underline() {
        let value = json!([{
            "type": "paragraph",
            "children": [{ "text": "x", "bold": true, "italic": true, "underline": true }]
        }]);

        assert_eq!(to_html(&value).unwrap(), "<p><u><em><strong>x</strong></em></u></p>");
    }

    #[test]
    fn escapes_markup_in_text() {
        let value = json!([{ "type": "paragraph", "children": [{ "text": "a < b & c > d" }] }]);

        assert_eq!(to_html(&value).unwrap(), "<p>a &lt; b &amp; c &gt; d</p>");
        assert_eq!(to_plain_text(&value).unwrap(), "a < b & c > d");
    }

    #[test]
    fn renders_links() {
        let value = json!([{
            "type": "paragraph",
            "children": [
                { "text": "See " },
                {
                    "type": "link",
                    "url": "https://x.test/?a=1&b=\"2\"",
                    "children": [{ "text": "here" }]
                }
            ]
        }]);

        assert_eq!(to_plain_text(&value).unwrap(), "See here");
        assert_eq!(
            to_html(&value).unwrap(),
            "<p>See <a href=\"https://x.test/?a=1&amp;b=&quot;2&quot;\">here</a></p>"
        );
    }

    #[test]
    fn non_array_input_is_empty() {
        let value = json!({ "type": "paragraph" });

        assert_eq!(to_plain_text(&value).unwrap(), "");
        assert_eq!(to_html(&value).unwrap(), "<p></p>");
        assert_eq!(to_plain_text(&Value::Null).unwrap(), "");
    }

    #[test]
    fn malformed_blocks_are_errors() {
        let value = json!([{ "type": "paragraph", "children": "oops" }]);
        assert!(to_plain_text(&value).is_err());

        let value = json!([{ "type": "paragraph", "children": [{ "text": 42 }] }]);
        assert!(to_html(&value).is_err());
    }

    #[test]
    fn email_rendering_substitutes_placeholder_on_error() {
        let value = json!([{ "type": "paragraph", "children": [{ "bold": true }] }]);

        let rendered = render_for_email(&value);

        assert_eq!(rendered.text, CONVERSION_PLACEHOLDER);
        assert_eq!(rendered.html, "<p>[Error processing message content]</p>");
    }

    #[test]
    fn paragraph_from_text_round_trips() {
        let value = paragraph_from_text("Need 200 straps");

        assert_eq!(to_plain_text(&value).unwrap(), "Need 200 straps");
        assert_eq!(to_html(&value).unwrap(), "<p>Need 200 straps</p>");
    }
}
