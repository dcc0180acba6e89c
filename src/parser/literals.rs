/// Evaluation of constant expressions.
///
/// Class constant values, property defaults and parameter defaults are
/// evaluated from their expression nodes into a [`Literal`].  Only
/// literal forms are supported: numbers, strings, booleans, `null`,
/// arrays of those, unary minus, and class-constant references
/// (`self::A`, `Foo::BAR`, `Foo::class`).  Anything else is a
/// [`ConstExprError`]; callers decide what an unevaluated value becomes.
use mago_syntax::ast::{
    Access, ArrayElement, ClassLikeConstantSelector, Expression, UnaryPrefixOperator,
};
use mago_syntax::ast::Literal as Token;

use crate::error::ConstExprError;
use crate::resolution::{normalize_fqn, resolve_name};
use crate::types::{AliasTable, ArrayEntry, Literal};

use super::DocblockCtx;

pub(super) struct Evaluator<'c, 'a> {
    pub ctx: &'c DocblockCtx<'a>,
    pub namespace: &'c str,
    pub aliases: &'c AliasTable,
}

impl Evaluator<'_, '_> {
    pub fn evaluate(&self, expr: &Expression<'_>) -> Result<Literal, ConstExprError> {
        match expr {
            Expression::Parenthesized(p) => self.evaluate(p.expression),
            Expression::Literal(token) => self.token(token),
            Expression::ConstantAccess(access) => {
                match access.name.value().trim_start_matches('\\').to_ascii_lowercase().as_str() {
                    "true" => Ok(Literal::Bool(true)),
                    "false" => Ok(Literal::Bool(false)),
                    "null" => Ok(Literal::Null),
                    _ => Err(self.unsupported(expr)),
                }
            }
            Expression::UnaryPrefix(prefix) => {
                let operand = self.evaluate(prefix.operand)?;
                match (&prefix.operator, operand) {
                    (UnaryPrefixOperator::Negation(_), Literal::Int(i)) => Ok(Literal::Int(-i)),
                    (UnaryPrefixOperator::Negation(_), Literal::Float(f)) => Ok(Literal::Float(-f)),
                    (UnaryPrefixOperator::Plus(_), n @ (Literal::Int(_) | Literal::Float(_))) => {
                        Ok(n)
                    }
                    _ => Err(self.unsupported(expr)),
                }
            }
            Expression::Array(array) => self.array(array.elements.iter()),
            Expression::LegacyArray(array) => self.array(array.elements.iter()),
            Expression::Access(Access::ClassConstant(cca)) => {
                let ClassLikeConstantSelector::Identifier(member) = &cca.constant else {
                    return Err(self.unsupported(expr));
                };
                let class = match cca.class {
                    Expression::Self_(_) => "self".to_string(),
                    Expression::Static(_) => "static".to_string(),
                    Expression::Parent(_) => "parent".to_string(),
                    Expression::Identifier(ident) => {
                        normalize_fqn(&resolve_name(ident.value(), self.namespace, self.aliases))
                            .to_string()
                    }
                    _ => return Err(self.unsupported(expr)),
                };
                if member.value.eq_ignore_ascii_case("class") {
                    return Ok(Literal::String(class));
                }
                Ok(Literal::ClassConstant {
                    class,
                    name: member.value.to_string(),
                })
            }
            _ => Err(self.unsupported(expr)),
        }
    }

    fn token(&self, token: &Token<'_>) -> Result<Literal, ConstExprError> {
        match token {
            Token::String(s) => Ok(Literal::String(match s.value {
                Some(value) => value.to_string(),
                None => strip_quotes(s.raw).to_string(),
            })),
            Token::Integer(i) => match i.value.map(i64::try_from) {
                Some(Ok(value)) => Ok(Literal::Int(value)),
                // Integer overflow turns into a float, like the runtime does.
                _ => i
                    .raw
                    .replace('_', "")
                    .parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| ConstExprError::InvalidNumber(i.raw.to_string())),
            },
            Token::Float(f) => Ok(Literal::Float(f.value.0)),
            Token::True(_) => Ok(Literal::Bool(true)),
            Token::False(_) => Ok(Literal::Bool(false)),
            Token::Null(_) => Ok(Literal::Null),
        }
    }

    fn array<'e>(
        &self,
        elements: impl Iterator<Item = &'e ArrayElement<'e>>,
    ) -> Result<Literal, ConstExprError> {
        let mut entries = Vec::new();
        for element in elements {
            let entry = match element {
                ArrayElement::KeyValue(kv) => ArrayEntry {
                    key: Some(self.evaluate(kv.key)?),
                    value: self.evaluate(kv.value)?,
                },
                ArrayElement::Value(v) => ArrayEntry {
                    key: None,
                    value: self.evaluate(v.value)?,
                },
                ArrayElement::Variadic(v) => return Err(self.unsupported(v.value)),
                ArrayElement::Missing(_) => continue,
            };
            entries.push(entry);
        }
        Ok(Literal::Array(entries))
    }

    fn unsupported(&self, expr: &Expression<'_>) -> ConstExprError {
        ConstExprError::Unsupported(self.ctx.text_of(expr).trim().to_string())
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix(['\'', '"'])
        .and_then(|s| s.strip_suffix(['\'', '"']))
        .unwrap_or(raw)
}
