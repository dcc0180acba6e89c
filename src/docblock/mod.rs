//! PHPDoc block parsing.
//!
//! This module turns a raw `/** ... */` comment into a typed [`DocBlock`]:
//! a rendered summary and body plus the `@since`, `@deprecated`,
//! `@author`, `@var`, `@param`, `@return` and `@throws` tags.  Types in
//! tags are resolved against the unit's namespace and import table.
//!
//! An inherit-doc marker (`{@inheritDoc}` as the summary, or a bare
//! `@inheritDoc` tag) short-circuits everything else and yields
//! [`DocBlock::inherit_marker`].
//!
//! # Submodules
//!
//! - [`tags`]: comment scanning, tag splitting, per-tag parsing and the
//!   trivia lookup that finds the docblock belonging to an AST node.
//! - [`markup`]: Markdown rendering of prose.
//! - [`types`]: type-token helpers for tag content.

pub(crate) mod markup;
pub(crate) mod tags;
pub(crate) mod types;

pub use tags::get_docblock_text_for_node;

use crate::types::{AliasTable, DocBlock};

use tags::{
    comment_lines, is_inherit_tag, is_inherit_token, parse_author, parse_param_tag,
    parse_typed_tag, parse_version, split_summary, split_tags,
};

/// Parse a doc comment.  Returns `None` when there is no comment.
pub fn parse_docblock(raw: Option<&str>, namespace: &str, aliases: &AliasTable) -> Option<DocBlock> {
    let raw = raw?;
    let lines = comment_lines(raw);
    let (description, tags) = split_tags(&lines);
    let (summary, body) = split_summary(&description);

    if is_inherit_token(&summary) || tags.iter().any(is_inherit_tag) {
        return Some(DocBlock::inherit_marker());
    }

    let mut doc = DocBlock {
        summary: markup::render(&summary),
        body: markup::render(&body),
        ..DocBlock::default()
    };

    for tag in &tags {
        match tag.name.to_ascii_lowercase().as_str() {
            "since" => {
                if doc.since.is_none() {
                    doc.since = parse_version(&tag.content);
                }
            }
            "deprecated" => {
                if doc.deprecated.is_none() {
                    doc.deprecated = Some(parse_version(&tag.content).unwrap_or_default());
                }
            }
            "author" => doc.authors.extend(parse_author(&tag.content)),
            "var" => {
                if doc.var.is_none() {
                    doc.var = Some(parse_typed_tag(&tag.content, namespace, aliases));
                }
            }
            "param" => match parse_param_tag(&tag.content, namespace, aliases) {
                Some((name, param)) => {
                    doc.params.entry(name).or_insert(param);
                }
                None => tracing::trace!("skipping @param without a variable: {}", tag.content),
            },
            "return" | "returns" => {
                if doc.returns.is_none() {
                    doc.returns = Some(parse_typed_tag(&tag.content, namespace, aliases));
                }
            }
            "throws" | "throw" => {
                doc.throws.push(parse_typed_tag(&tag.content, namespace, aliases));
            }
            _ => {}
        }
    }

    Some(doc)
}
