//! Rendering of doc-comment prose to HTML.
//!
//! Summaries, bodies and tag descriptions are written in Markdown.  Inline
//! `{@link Foo}` / `{@see Foo}` tags are turned into code spans first so
//! they survive rendering.

/// Render Markdown text to HTML.  Returns `None` for blank input.
pub fn render(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let html = markdown::to_html(&rewrite_inline_tags(text));
    let html = html.trim();
    (!html.is_empty()).then(|| html.to_string())
}

/// Replace `{@link X}`, `{@see X}` and `{@link X description}` with a code
/// span holding the target.
fn rewrite_inline_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{@") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let inner = &after[..end];
        let mut words = inner.split_whitespace();
        match (words.next(), words.next()) {
            (Some("link" | "see"), Some(target)) => {
                out.push('`');
                out.push_str(target);
                out.push('`');
            }
            _ => {
                out.push_str("{@");
                out.push_str(inner);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_renders_to_nothing() {
        assert_eq!(render("   \n  "), None);
    }

    #[test]
    fn paragraph_is_wrapped() {
        assert_eq!(render("Saves the *model*."), Some("<p>Saves the <em>model</em>.</p>".to_string()));
    }

    #[test]
    fn inline_link_becomes_code() {
        assert_eq!(rewrite_inline_tags("See {@link Model::save()} now"), "See `Model::save()` now");
        assert_eq!(rewrite_inline_tags("{@inheritDoc}"), "{@inheritDoc}");
    }
}
