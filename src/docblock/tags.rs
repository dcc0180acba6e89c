//! Doc-comment scanning and tag extraction.
//!
//! A doc comment is split into its description lines and a list of raw
//! tags (`@name content`, with continuation lines folded into the
//! content).  Each supported tag is then turned into its typed form.

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::error::MalformedType;
use crate::resolution::get_doc_type;
use crate::types::{AliasTable, Author, TypeRef, TypedTag};

use super::markup;
use super::types::{split_type_token, variable_name};

/// A tag as written: name without `@`, and its (possibly multi-line) content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTag {
    pub name: String,
    pub content: String,
}

/// Strip the comment delimiters and the leading `*` gutter.
///
/// Leading and trailing blank lines are dropped; indentation after the
/// gutter is kept so that indented code blocks survive.
pub(crate) fn comment_lines(raw: &str) -> Vec<&str> {
    let inner = raw.trim();
    let inner = inner.strip_prefix("/**").unwrap_or(inner);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let mut lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end()
        })
        .collect();

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

fn tag_start(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('@')?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\'))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some((&rest[..end], rest[end..].trim()))
}

/// Split comment lines into description lines and raw tags.
pub(crate) fn split_tags<'a>(lines: &[&'a str]) -> (Vec<&'a str>, Vec<RawTag>) {
    let mut description = Vec::new();
    let mut tags: Vec<RawTag> = Vec::new();

    for line in lines {
        if let Some((name, content)) = tag_start(line) {
            tags.push(RawTag {
                name: name.to_string(),
                content: content.to_string(),
            });
        } else if let Some(tag) = tags.last_mut() {
            let line = line.trim();
            if !line.is_empty() {
                if !tag.content.is_empty() {
                    tag.content.push('\n');
                }
                tag.content.push_str(line);
            }
        } else {
            description.push(*line);
        }
    }
    (description, tags)
}

/// Split the description into summary and body.
///
/// The summary ends at the first blank line or at the first line that ends
/// with a full stop, whichever comes first.
pub(crate) fn split_summary(description: &[&str]) -> (String, String) {
    let mut summary_end = description.len();
    for (i, line) in description.iter().enumerate() {
        if line.trim().is_empty() {
            summary_end = i;
            break;
        }
        if line.trim_end().ends_with('.') {
            summary_end = i + 1;
            break;
        }
    }
    let summary = description[..summary_end]
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");
    let body = description[summary_end..].join("\n");
    (summary, body.trim_matches('\n').to_string())
}

/// Whether text is an inherit-doc token (`{@inheritDoc}` or `@inheritDoc`).
pub(crate) fn is_inherit_token(text: &str) -> bool {
    let t = text.trim();
    let t = t
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(t);
    t.eq_ignore_ascii_case("@inheritdoc")
}

pub(crate) fn is_inherit_tag(tag: &RawTag) -> bool {
    tag.name.eq_ignore_ascii_case("inheritdoc")
}

/// The first word of a tag's content, used for `@since` / `@deprecated`.
pub(crate) fn parse_version(content: &str) -> Option<String> {
    let word = content.split_whitespace().next()?;
    word.trim_start_matches(['v', 'V'])
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| word.to_string())
}

/// `@author Jane Doe <jane@example.com>`
pub(crate) fn parse_author(content: &str) -> Option<Author> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    match content.split_once('<') {
        Some((name, rest)) => {
            let email = rest.split('>').next().unwrap_or(rest).trim();
            Some(Author {
                name: name.trim().to_string(),
                email: (!email.is_empty()).then(|| email.to_string()),
            })
        }
        None => Some(Author {
            name: content.to_string(),
            email: None,
        }),
    }
}

/// The fallback for a tag whose type cannot be understood: `mixed`, with
/// the raw tag text as its description.
fn malformed_tag(content: &str, err: &MalformedType) -> TypedTag {
    tracing::trace!("{err}; falling back to mixed");
    TypedTag {
        type_ref: TypeRef::mixed(),
        summary: Some(content.trim().to_string()),
    }
}

/// `@return Type description`, `@throws Type description`, `@var Type [$name] description`.
pub(crate) fn parse_typed_tag(content: &str, namespace: &str, aliases: &AliasTable) -> TypedTag {
    let (type_token, rest) = split_type_token(content);
    // `@var $name Type` and friends are not worth supporting; a leading
    // variable means the type was omitted.
    if type_token.is_empty() || variable_name(type_token).is_some() {
        return TypedTag {
            type_ref: TypeRef::mixed(),
            summary: markup::render(content.trim_start().strip_prefix(type_token).unwrap_or(content)),
        };
    }
    match get_doc_type(type_token, namespace, aliases) {
        Ok(type_ref) => {
            let rest = rest.trim_start();
            // Skip an optional variable name (`@var Foo $foo`).
            let rest = match rest.split_once(char::is_whitespace) {
                Some((first, tail)) if variable_name(first).is_some() => tail,
                None if variable_name(rest).is_some() => "",
                _ => rest,
            };
            TypedTag {
                type_ref,
                summary: markup::render(rest),
            }
        }
        Err(err) => malformed_tag(content, &err),
    }
}

/// `@param Type $name description` (type optional).  Returns `None` when
/// no variable name can be found, since the tag cannot be keyed.
pub(crate) fn parse_param_tag(
    content: &str,
    namespace: &str,
    aliases: &AliasTable,
) -> Option<(String, TypedTag)> {
    let (first, rest) = split_type_token(content);
    if let Some(name) = variable_name(first) {
        return Some((
            name.to_string(),
            TypedTag {
                type_ref: TypeRef::mixed(),
                summary: markup::render(rest),
            },
        ));
    }

    let (var_token, summary) = split_type_token(rest);
    let name = variable_name(var_token)?;
    let tag = match get_doc_type(first, namespace, aliases) {
        Ok(type_ref) => TypedTag {
            type_ref,
            summary: markup::render(summary),
        },
        Err(err) => malformed_tag(content, &err),
    };
    Some((name.to_string(), tag))
}

/// Look up the docblock comment (if any) for a node and return its raw
/// text.
///
/// This uses the program's trivia list to find the `/** ... */` comment that
/// immediately precedes the given AST node.  Only whitespace and ordinary
/// comments may sit between the docblock and the node.
pub fn get_docblock_text_for_node<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node: &impl HasSpan,
) -> Option<&'a str> {
    let node_start = node.span().start.offset;
    let candidate_idx = trivia.partition_point(|t| t.span.start.offset < node_start);
    if candidate_idx == 0 {
        return None;
    }

    let content_bytes = content.as_bytes();
    let mut covered_from = node_start;

    for t in trivia[..candidate_idx].iter().rev() {
        let gap = content_bytes
            .get(t.span.end.offset as usize..covered_from as usize)
            .unwrap_or(&[]);
        if !gap.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match t.kind {
            TriviaKind::DocBlockComment => return Some(t.value),
            TriviaKind::WhiteSpace
            | TriviaKind::SingleLineComment
            | TriviaKind::MultiLineComment
            | TriviaKind::HashComment => {
                covered_from = t.span.start.offset;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gutter_and_delimiters_are_stripped() {
        let lines = comment_lines("/**\n * Summary.\n *\n *     code\n * @since 1.0\n */");
        assert_eq!(lines, vec!["Summary.", "", "    code", "@since 1.0"]);
    }

    #[test]
    fn continuation_lines_fold_into_tag() {
        let lines = vec!["Intro", "@param string $a first", "  line two", "@return void"];
        let (description, tags) = split_tags(&lines);
        assert_eq!(description, vec!["Intro"]);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].content, "string $a first\nline two");
        assert_eq!(tags[1].name, "return");
    }

    #[test]
    fn summary_stops_at_full_stop() {
        let (summary, body) = split_summary(&["Saves it.", "More text", "", "Para"]);
        assert_eq!(summary, "Saves it.");
        assert_eq!(body, "More text\n\nPara");
    }

    #[test]
    fn author_with_and_without_email() {
        assert_eq!(
            parse_author("Jane Doe <jane@example.com>"),
            Some(Author {
                name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string())
            })
        );
        assert_eq!(parse_author("Team").map(|a| a.email), Some(None));
    }

    #[test]
    fn inherit_tokens() {
        assert!(is_inherit_token("{@inheritDoc}"));
        assert!(is_inherit_token("@inheritdoc"));
        assert!(!is_inherit_token("Inherit docs"));
    }

    #[test]
    fn version_needs_a_digit() {
        assert_eq!(parse_version("1.2.0 added"), Some("1.2.0".to_string()));
        assert_eq!(parse_version("v2"), Some("v2".to_string()));
        assert_eq!(parse_version("use save() instead"), None);
    }
}
