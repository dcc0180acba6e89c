/// Parser adapter and declaration extraction.
///
/// This module wraps the mago_syntax parser.  One source unit is parsed
/// into an arena-backed AST, checked for syntax errors, and immediately
/// walked to produce an owned [`ClassRecord`]; nothing that borrows the
/// arena escapes.
///
/// Sub-modules:
/// - [`classes`]: class, interface and trait extraction
/// - [`use_statements`]: `use` statement and namespace extraction
/// - [`literals`]: constant expression evaluation
mod classes;
mod literals;
pub(crate) mod use_statements;

use std::panic;
use std::path::Path;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::error::ParseError;
use crate::types::{ClassRecord, LineRange, Visibility};

/// Byte offsets of line starts, for turning spans into line numbers.
pub(crate) struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr::memchr_iter(b'\n', content.as_bytes()).map(|i| i as u32 + 1));
        LineIndex { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.starts.partition_point(|&s| s <= offset) as u32
    }

    pub fn range_of(&self, node: &impl HasSpan) -> LineRange {
        let span = node.span();
        LineRange {
            start: self.line_of(span.start.offset),
            end: self.line_of(span.end.offset.saturating_sub(1).max(span.start.offset)),
        }
    }
}

/// Everything extraction needs besides the AST itself: the trivia list
/// (for doc comments), the raw source, and a line index.
pub(crate) struct DocblockCtx<'a> {
    pub trivias: &'a [Trivia<'a>],
    pub content: &'a str,
    pub lines: LineIndex,
}

impl<'a> DocblockCtx<'a> {
    /// The doc comment directly preceding `node`, if any.
    pub fn docblock_for(&self, node: &impl HasSpan) -> Option<&'a str> {
        crate::docblock::get_docblock_text_for_node(self.trivias, self.content, node)
    }

    /// Source text covered by `node`.
    pub fn text_of(&self, node: &impl HasSpan) -> &'a str {
        let span = node.span();
        self.content
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }
}

/// Extract visibility from a set of modifiers.
/// Defaults to `Public` if no visibility modifier is present.
pub(crate) fn extract_visibility<'a>(modifiers: impl Iterator<Item = &'a Modifier<'a>>) -> Visibility {
    for m in modifiers {
        if m.is_private() {
            return Visibility::Private;
        }
        if m.is_protected() {
            return Visibility::Protected;
        }
        if m.is_public() {
            return Visibility::Public;
        }
    }
    Visibility::Public
}

/// Parse one source unit and extract its single class-like declaration.
///
/// The mago-syntax parser can panic on some malformed input (e.g.
/// half-written heredocs), so the whole parse + extraction runs under
/// `catch_unwind`; a panic only fails this unit.  The caller logs it
/// along with every other failed path.
pub fn parse_unit(path: &Path, content: &str) -> Result<ClassRecord, ParseError> {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| parse_unit_inner(path, content)));

    match result {
        Ok(record) => record,
        Err(_) => Err(ParseError::ParserPanicked),
    }
}

fn parse_unit_inner(path: &Path, content: &str) -> Result<ClassRecord, ParseError> {
    let arena = Bump::new();
    let file_id = mago_database::file::FileId::new(&path.to_string_lossy());
    let program = parse_file_content(&arena, file_id, content);

    if let Some(error) = program.errors.iter().next() {
        return Err(ParseError::Syntax {
            message: error.to_string(),
        });
    }

    let ctx = DocblockCtx {
        trivias: program.trivia.as_slice(),
        content,
        lines: LineIndex::new(content),
    };

    classes::extract_declaration(program.statements.as_slice(), &ctx, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
    }
}
