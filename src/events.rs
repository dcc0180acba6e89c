//! Event-trigger discovery.
//!
//! A method documents the events it fires with a doc comment placed
//! directly above the firing call:
//!
//! ```php
//! /**
//!  * Fired after the model is saved.
//!  *
//!  * @event model.afterSave
//!  * @param Model $model The saved model.
//!  */
//! $this->fireEvent('model.afterSave', [$this]);
//! ```
//!
//! The `@event` line names the event; the rest of the comment is parsed
//! as an ordinary doc block, and its `@param` tags become the event's
//! documented parameters.  The call's actual arguments are not looked at.
//!
//! The comment belongs to the statement, and the statement counts as a
//! trigger when any expression it evaluates contains a call: a condition
//! (`if ($e = $this->fire(...))`), an argument, or the body of a closure
//! it defines.  Closure bodies are scanned for their own comments too.

use std::iter::once;

use memchr::memmem;
use mago_syntax::ast::*;

use crate::docblock::parse_docblock;
use crate::parser::DocblockCtx;
use crate::types::{AliasTable, EventParameter, EventRecord};

const EVENT_TAG: &str = "@event";

/// Collect the documented event triggers in a method body.
pub(crate) fn scan_events<'a>(
    statements: &'a [Statement<'a>],
    ctx: &DocblockCtx<'a>,
    method: &str,
    namespace: &str,
    aliases: &AliasTable,
) -> Vec<EventRecord> {
    let mut scanner = Scanner {
        ctx,
        method,
        namespace,
        aliases,
        events: Vec::new(),
    };
    scanner.statements(statements.iter());
    scanner.events
}

struct Scanner<'s, 'a> {
    ctx: &'s DocblockCtx<'a>,
    method: &'s str,
    namespace: &'s str,
    aliases: &'s AliasTable,
    events: Vec<EventRecord>,
}

impl<'a> Scanner<'_, 'a> {
    fn statements(&mut self, statements: impl Iterator<Item = &'a Statement<'a>>) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &'a Statement<'a>) {
        let heads = head_expressions(statement);
        if let Some(call) = heads.iter().copied().find_map(first_call) {
            self.candidate(statement, call);
        }
        for expression in heads {
            self.closures(expression);
        }

        match statement {
            Statement::Block(block) => self.statements(block.statements.iter()),
            Statement::If(if_stmt) => match &if_stmt.body {
                IfBody::Statement(body) => {
                    self.statement(body.statement);
                    for else_if in body.else_if_clauses.iter() {
                        self.closures(else_if.condition);
                        self.statement(else_if.statement);
                    }
                    if let Some(else_clause) = &body.else_clause {
                        self.statement(else_clause.statement);
                    }
                }
                IfBody::ColonDelimited(body) => {
                    self.statements(body.statements.iter());
                    for else_if in body.else_if_clauses.iter() {
                        self.closures(else_if.condition);
                        self.statements(else_if.statements.iter());
                    }
                    if let Some(else_clause) = &body.else_clause {
                        self.statements(else_clause.statements.iter());
                    }
                }
            },
            Statement::Foreach(foreach) => {
                for inner in foreach.body.statements() {
                    self.statement(inner);
                }
            }
            Statement::For(for_stmt) => match &for_stmt.body {
                ForBody::Statement(inner) => self.statement(inner),
                ForBody::ColonDelimited(body) => self.statements(body.statements.iter()),
            },
            Statement::While(while_stmt) => match &while_stmt.body {
                WhileBody::Statement(inner) => self.statement(inner),
                WhileBody::ColonDelimited(body) => self.statements(body.statements.iter()),
            },
            Statement::DoWhile(dw) => self.statement(dw.statement),
            Statement::Try(try_stmt) => {
                self.statements(try_stmt.block.statements.iter());
                for catch in try_stmt.catch_clauses.iter() {
                    self.statements(catch.block.statements.iter());
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.statements(finally.block.statements.iter());
                }
            }
            Statement::Switch(switch) => match &switch.body {
                SwitchBody::BraceDelimited(body) => {
                    for case in body.cases.iter() {
                        self.statements(case.statements().iter());
                    }
                }
                SwitchBody::ColonDelimited(body) => {
                    for case in body.cases.iter() {
                        self.statements(case.statements().iter());
                    }
                }
            },
            _ => {}
        }
    }

    /// Scan the bodies of closures defined anywhere in `expression`.
    fn closures(&mut self, expression: &'a Expression<'a>) {
        match expression {
            Expression::Closure(closure) => self.statements(closure.body.statements.iter()),
            _ => {
                for inner in sub_expressions(expression) {
                    self.closures(inner);
                }
            }
        }
    }

    /// A statement evaluating `call`; record it if its doc comment
    /// carries `@event`.
    fn candidate(&mut self, statement: &Statement<'_>, call: &Expression<'_>) {
        let Some(raw) = self.ctx.docblock_for(statement) else {
            return;
        };
        let Some((name, stripped)) = split_event_tag(raw) else {
            return;
        };

        let docs = parse_docblock(Some(&stripped), self.namespace, self.aliases);
        let parameters = docs
            .as_ref()
            .map(|d| {
                d.params
                    .iter()
                    .map(|(name, tag)| EventParameter {
                        name: name.clone(),
                        type_ref: tag.type_ref.clone(),
                        summary: tag.summary.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        tracing::trace!("found event {name} in {}()", self.method);
        self.events.push(EventRecord {
            name,
            method: self.method.to_string(),
            parameters,
            docs,
            lines: self.ctx.lines.range_of(call),
        });
    }
}

/// Expressions a statement evaluates itself, outside any nested body.
fn head_expressions<'e>(statement: &'e Statement<'e>) -> Vec<&'e Expression<'e>> {
    match statement {
        Statement::Expression(expr_stmt) => vec![expr_stmt.expression],
        Statement::Return(ret) => ret.value.into_iter().collect(),
        Statement::Echo(echo) => echo.values.iter().copied().collect(),
        Statement::If(if_stmt) => vec![if_stmt.condition],
        Statement::While(while_stmt) => vec![while_stmt.condition],
        Statement::DoWhile(dw) => vec![dw.condition],
        Statement::For(for_stmt) => for_stmt
            .initializations
            .iter()
            .chain(for_stmt.conditions.iter())
            .chain(for_stmt.increments.iter())
            .copied()
            .collect(),
        Statement::Foreach(foreach) => vec![foreach.expression],
        Statement::Switch(switch) => vec![switch.expression],
        _ => Vec::new(),
    }
}

/// The first call `expression` evaluates, looking through operators,
/// arguments and conditions, and into the top-level statements of any
/// closure it defines.
fn first_call<'e>(expression: &'e Expression<'e>) -> Option<&'e Expression<'e>> {
    match expression {
        Expression::Call(_) => Some(expression),
        Expression::Closure(closure) => closure
            .body
            .statements
            .iter()
            .flat_map(head_expressions)
            .find_map(first_call),
        _ => sub_expressions(expression).into_iter().find_map(first_call),
    }
}

/// Direct operands of an expression.  Closure bodies are statements and
/// are not included.
fn sub_expressions<'e>(expression: &'e Expression<'e>) -> Vec<&'e Expression<'e>> {
    match expression {
        Expression::Parenthesized(p) => vec![p.expression],
        Expression::Assignment(assignment) => vec![assignment.lhs, assignment.rhs],
        Expression::Binary(binary) => vec![binary.lhs, binary.rhs],
        Expression::UnaryPrefix(u) => vec![u.operand],
        Expression::UnaryPostfix(u) => vec![u.operand],
        Expression::Conditional(c) => once(c.condition)
            .chain(c.then)
            .chain(once(c.r#else))
            .collect(),
        Expression::Array(array) => element_values(array.elements.iter()),
        Expression::LegacyArray(array) => element_values(array.elements.iter()),
        Expression::ArrayAccess(access) => vec![access.array, access.index],
        Expression::Match(m) => once(m.expression)
            .chain(m.arms.iter().map(|arm| arm.expression()))
            .collect(),
        Expression::ArrowFunction(arrow) => vec![arrow.expression],
        Expression::Yield(Yield::Value(y)) => y.value.into_iter().collect(),
        Expression::Yield(Yield::Pair(y)) => vec![y.key, y.value],
        Expression::Yield(Yield::From(y)) => vec![y.iterator],
        Expression::Throw(t) => vec![t.exception],
        Expression::Clone(c) => vec![c.object],
        Expression::Pipe(pipe) => vec![pipe.input, pipe.callable],
        Expression::Instantiation(inst) => once(inst.class)
            .chain(inst.argument_list.iter().flat_map(|list| arguments(list)))
            .collect(),
        Expression::Call(call) => {
            let (target, list) = match call {
                Call::Function(fc) => (fc.function, &fc.argument_list),
                Call::Method(mc) => (mc.object, &mc.argument_list),
                Call::NullSafeMethod(mc) => (mc.object, &mc.argument_list),
                Call::StaticMethod(sc) => (sc.class, &sc.argument_list),
            };
            once(target).chain(arguments(list)).collect()
        }
        Expression::Access(Access::Property(access)) => vec![access.object],
        Expression::Access(Access::NullSafeProperty(access)) => vec![access.object],
        _ => Vec::new(),
    }
}

fn arguments<'e>(list: &'e ArgumentList<'e>) -> impl Iterator<Item = &'e Expression<'e>> {
    list.arguments.iter().map(|argument| match argument {
        Argument::Positional(arg) => arg.value,
        Argument::Named(arg) => arg.value,
    })
}

fn element_values<'e>(
    elements: impl Iterator<Item = &'e ArrayElement<'e>>,
) -> Vec<&'e Expression<'e>> {
    let mut values = Vec::new();
    for element in elements {
        match element {
            ArrayElement::KeyValue(kv) => values.extend([kv.key, kv.value]),
            ArrayElement::Value(v) => values.push(v.value),
            ArrayElement::Variadic(v) => values.push(v.value),
            ArrayElement::Missing(_) => {}
        }
    }
    values
}

/// Pull the event name out of a doc comment and return the comment with
/// the `@event` line removed.  `None` when there is no `@event` tag or it
/// carries no name.
pub(crate) fn split_event_tag(raw: &str) -> Option<(String, String)> {
    memmem::find(raw.as_bytes(), EVENT_TAG.as_bytes())?;

    let mut name = None;
    let mut kept = Vec::new();
    for line in raw.lines() {
        if name.is_none()
            && let Some(pos) = line.find(EVENT_TAG)
        {
            let rest = &line[pos + EVENT_TAG.len()..];
            // `@events` and friends are other tags.
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                name = rest
                    .split_whitespace()
                    .next()
                    .map(|n| n.trim_end_matches("*/").to_string())
                    .filter(|n| !n.is_empty());
                if name.is_some() {
                    if line.trim_start().starts_with("/**") {
                        kept.push("/**");
                    }
                    if line.trim_end().ends_with("*/") {
                        kept.push(" */");
                    }
                    continue;
                }
            }
        }
        kept.push(line);
    }

    Some((name?, kept.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_line_is_removed() {
        let raw = "/**\n * Fired after saving.\n * @event my.test.fired\n * @param string $id\n */";
        let (name, stripped) = split_event_tag(raw).unwrap();
        assert_eq!(name, "my.test.fired");
        assert!(!stripped.contains("@event"));
        assert!(stripped.contains("Fired after saving."));
        assert!(stripped.contains("@param string $id"));
    }

    #[test]
    fn comments_without_event_are_ignored() {
        assert_eq!(split_event_tag("/** Just a comment. */"), None);
        assert_eq!(split_event_tag("/** @events foo */"), None);
        assert_eq!(split_event_tag("/** @event */"), None);
    }

    #[test]
    fn single_line_comment_keeps_its_terminator() {
        let (name, stripped) = split_event_tag("/** @event app.boot */").unwrap();
        assert_eq!(name, "app.boot");
        assert_eq!(stripped, "/**\n */");
    }
}
