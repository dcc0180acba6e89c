/// Class, interface and trait extraction.
///
/// A unit must contain exactly one class-like declaration (enums and
/// functions are ignored).  This module finds it, builds the unit's
/// import table, and extracts the declaration's members with their
/// modifiers, native types, evaluated values and parsed doc comments.
/// Event triggers inside concrete method bodies are collected on the
/// way through.
use std::path::Path;

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::docblock::parse_docblock;
use crate::error::ParseError;
use crate::events::scan_events;
use crate::resolution::{get_doc_type, normalize_fqn, resolve_name};
use crate::types::{
    AliasTable, ClassRecord, ConstantInfo, DeclarationKind, DocBlock, GLOBAL_NAMESPACE,
    LineRange, Literal, MethodInfo, ParameterInfo, PropertyInfo, TypeRef,
};

use super::literals::Evaluator;
use super::use_statements::{extract_use_statements, namespace_name};
use super::{DocblockCtx, extract_visibility};

/// Find the single declaration in `statements` and extract it.
pub(super) fn extract_declaration<'a>(
    statements: &'a [Statement<'a>],
    ctx: &DocblockCtx<'a>,
    path: &Path,
) -> Result<ClassRecord, ParseError> {
    let mut declarations = Vec::new();
    collect_declarations(statements.iter(), None, &mut declarations);

    let (namespace, declaration) = match declarations.len() {
        0 => return Err(ParseError::NoDeclaration),
        1 => declarations.remove(0),
        count => return Err(ParseError::AmbiguousDeclaration { count }),
    };

    let mut aliases = AliasTable::new();
    extract_use_statements(statements.iter(), &mut aliases);

    let extractor = Extractor {
        ctx,
        namespace: namespace.unwrap_or_else(|| GLOBAL_NAMESPACE.to_string()),
        aliases,
    };
    Ok(extractor.record(declaration, path))
}

enum Declaration<'a> {
    Class(&'a Class<'a>),
    Interface(&'a Interface<'a>),
    Trait(&'a Trait<'a>),
}

/// Top-level class-like declarations, paired with the namespace they sit
/// in.  Both the braced and the statement form of `namespace` are handled.
fn collect_declarations<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    namespace: Option<String>,
    out: &mut Vec<(Option<String>, Declaration<'a>)>,
) {
    for statement in statements {
        match statement {
            Statement::Class(class) => out.push((namespace.clone(), Declaration::Class(class))),
            Statement::Interface(iface) => {
                out.push((namespace.clone(), Declaration::Interface(iface)));
            }
            Statement::Trait(trait_def) => {
                out.push((namespace.clone(), Declaration::Trait(trait_def)));
            }
            Statement::Namespace(ns) => {
                collect_declarations(ns.statements().iter(), namespace_name(ns), out);
            }
            _ => {}
        }
    }
}

struct Extractor<'c, 'a> {
    ctx: &'c DocblockCtx<'a>,
    namespace: String,
    aliases: AliasTable,
}

impl Extractor<'_, '_> {
    fn record(self, declaration: Declaration<'_>, path: &Path) -> ClassRecord {
        let (name, kind) = match &declaration {
            Declaration::Class(class) => (class.name.value, DeclarationKind::Class),
            Declaration::Interface(iface) => (iface.name.value, DeclarationKind::Interface),
            Declaration::Trait(trait_def) => (trait_def.name.value, DeclarationKind::Trait),
        };

        let fqn = if self.namespace == GLOBAL_NAMESPACE {
            name.to_string()
        } else {
            format!("{}\\{}", self.namespace, name)
        };

        let mut record = ClassRecord {
            name: name.to_string(),
            fqn,
            kind,
            file: path.to_path_buf(),
            namespace: self.namespace.clone(),
            aliases: AliasTable::new(),
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            is_final: false,
            is_abstract: false,
            docs: None,
            lines: LineRange::default(),
            constants: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
        };

        match declaration {
            Declaration::Class(class) => {
                record.parent = class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first())
                    .map(|ident| self.class_ref(ident.value()));
                record.interfaces = class
                    .implements
                    .as_ref()
                    .map(|imp| imp.types.iter().map(|ident| self.class_ref(ident.value())).collect())
                    .unwrap_or_default();
                record.is_final = class.modifiers.contains_final();
                record.is_abstract = class.modifiers.contains_abstract();
                record.docs = self.docs_for(class);
                record.lines = self.ctx.lines.range_of(class);
                self.members(class.members.iter(), &mut record);
            }
            // Interfaces contribute only their own members; whatever they
            // extend is not tracked.
            Declaration::Interface(iface) => {
                record.docs = self.docs_for(iface);
                record.lines = self.ctx.lines.range_of(iface);
                self.members(iface.members.iter(), &mut record);
            }
            Declaration::Trait(trait_def) => {
                record.docs = self.docs_for(trait_def);
                record.lines = self.ctx.lines.range_of(trait_def);
                self.members(trait_def.members.iter(), &mut record);
            }
        }

        record.aliases = self.aliases;
        record
    }

    fn docs_for(&self, node: &impl HasSpan) -> Option<DocBlock> {
        parse_docblock(self.ctx.docblock_for(node), &self.namespace, &self.aliases)
    }

    /// A reference to a class named in `extends`, `implements` or `use`.
    fn class_ref(&self, written: &str) -> TypeRef {
        let resolved = resolve_name(written, &self.namespace, &self.aliases);
        TypeRef::reference(written, normalize_fqn(&resolved))
    }

    /// Classify a native type hint.  Hints are rendered from source and
    /// go through the same classification as documented types.
    fn hint_type(&self, hint: &Hint<'_>) -> Option<TypeRef> {
        let text = self.ctx.text_of(hint);
        match get_doc_type(text, &self.namespace, &self.aliases) {
            Ok(type_ref) => Some(type_ref),
            Err(err) => {
                tracing::trace!("ignoring native hint: {err}");
                None
            }
        }
    }

    fn literal(&self, expr: &Expression<'_>) -> Option<Literal> {
        let evaluator = Evaluator {
            ctx: self.ctx,
            namespace: &self.namespace,
            aliases: &self.aliases,
        };
        evaluator
            .evaluate(expr)
            .inspect_err(|err| tracing::trace!("value not evaluated: {err}"))
            .ok()
    }

    fn members<'m>(
        &self,
        members: impl Iterator<Item = &'m ClassLikeMember<'m>>,
        record: &mut ClassRecord,
    ) {
        for member in members {
            match member {
                ClassLikeMember::Method(method) => self.method(method, record),
                ClassLikeMember::Property(property) => {
                    let docs = self.docs_for(member);
                    let visibility = extract_visibility(property.modifiers().iter());
                    let is_static = property.modifiers().iter().any(|m| m.is_static());
                    let is_readonly = property
                        .modifiers()
                        .iter()
                        .any(|m| matches!(m, Modifier::Readonly(_)));
                    let native = property.hint().and_then(|h| self.hint_type(h));
                    let has_native_type = native.is_some();
                    let type_ref = native.or_else(|| var_type(docs.as_ref()));
                    let lines = self.ctx.lines.range_of(property);

                    for item in property_items(property) {
                        let default = match item {
                            PropertyItem::Concrete(concrete) => self.literal(concrete.value),
                            PropertyItem::Abstract(_) => None,
                        };
                        record.properties.push(PropertyInfo {
                            name: item.variable().name.trim_start_matches('$').to_string(),
                            visibility,
                            is_static,
                            is_readonly,
                            type_ref: type_ref.clone(),
                            has_native_type,
                            default,
                            docs: docs.clone(),
                            lines,
                            inherited: None,
                            docs_from: None,
                        });
                    }
                }
                ClassLikeMember::Constant(constant) => {
                    let docs = self.docs_for(member);
                    let visibility = extract_visibility(constant.modifiers.iter());
                    let is_final = constant
                        .modifiers
                        .iter()
                        .any(|m| matches!(m, Modifier::Final(_)));
                    let native = constant.hint.as_ref().and_then(|h| self.hint_type(h));
                    let lines = self.ctx.lines.range_of(constant);

                    for item in constant.items.iter() {
                        let value = self.literal(item.value);
                        // Native hint, then `@var`, then whatever the value is.
                        let type_ref = native
                            .clone()
                            .or_else(|| var_type(docs.as_ref()))
                            .or_else(|| {
                                value.as_ref().and_then(Literal::scalar_type).map(TypeRef::scalar)
                            });
                        record.constants.push(ConstantInfo {
                            name: item.name.value.to_string(),
                            visibility,
                            is_final,
                            type_ref,
                            value,
                            docs: docs.clone(),
                            lines,
                            inherited: None,
                            docs_from: None,
                        });
                    }
                }
                ClassLikeMember::TraitUse(trait_use) => {
                    if record.kind == DeclarationKind::Interface {
                        continue;
                    }
                    for ident in trait_use.trait_names.iter() {
                        record.traits.push(self.class_ref(ident.value()));
                    }
                }
                ClassLikeMember::EnumCase(_) => {}
            }
        }
    }

    fn method(&self, method: &Method<'_>, record: &mut ClassRecord) {
        let name = method.name.value.to_string();
        let docs = self.docs_for(method);

        let mut parameters = Vec::new();
        for param in method.parameter_list.parameters.iter() {
            let param_name = param.variable.name.trim_start_matches('$').to_string();
            let native = param.hint.as_ref().and_then(|h| self.hint_type(h));
            let default = param.default_value.as_ref().and_then(|d| self.literal(d.value));
            let is_variadic = param.ellipsis.is_some();

            if param.is_promoted_property() {
                let tag = docs.as_ref().and_then(|d| d.params.get(&param_name));
                record.properties.push(PropertyInfo {
                    name: param_name.clone(),
                    visibility: extract_visibility(param.modifiers.iter()),
                    is_static: false,
                    is_readonly: param
                        .modifiers
                        .iter()
                        .any(|m| matches!(m, Modifier::Readonly(_))),
                    type_ref: native.clone().or_else(|| tag.map(|t| t.type_ref.clone())),
                    has_native_type: native.is_some(),
                    default: None,
                    docs: tag.map(|t| DocBlock {
                        summary: t.summary.clone(),
                        var: Some(t.clone()),
                        ..DocBlock::default()
                    }),
                    lines: self.ctx.lines.range_of(param),
                    inherited: None,
                    docs_from: None,
                });
            }

            parameters.push(ParameterInfo {
                name: param_name,
                has_native_type: native.is_some(),
                type_ref: native,
                is_optional: param.default_value.is_some() || is_variadic,
                default,
                is_variadic,
                is_reference: param.ampersand.is_some(),
                is_promoted: param.is_promoted_property(),
                summary: None,
            });
        }

        let return_type = method
            .return_type_hint
            .as_ref()
            .and_then(|rth| self.hint_type(&rth.hint));

        if let MethodBody::Concrete(block) = &method.body {
            record.events.extend(scan_events(
                block.statements.as_slice(),
                self.ctx,
                &name,
                &self.namespace,
                &self.aliases,
            ));
        }

        let mut info = MethodInfo {
            name,
            visibility: extract_visibility(method.modifiers.iter()),
            is_static: method.modifiers.iter().any(|m| m.is_static()),
            is_final: method.modifiers.iter().any(|m| matches!(m, Modifier::Final(_))),
            is_abstract: method
                .modifiers
                .iter()
                .any(|m| matches!(m, Modifier::Abstract(_))),
            parameters,
            has_native_return: return_type.is_some(),
            return_type,
            docs,
            lines: self.ctx.lines.range_of(method),
            inherited: None,
            docs_from: None,
        };
        info.merge_docs_into_signature();
        record.methods.push(info);
    }
}

fn var_type(docs: Option<&DocBlock>) -> Option<TypeRef> {
    docs.and_then(|d| d.var.as_ref()).map(|v| v.type_ref.clone())
}

fn property_items<'p>(property: &'p Property<'p>) -> Vec<&'p PropertyItem<'p>> {
    match property {
        Property::Plain(plain) => plain.items.iter().collect(),
        Property::Hooked(hooked) => vec![&hooked.item],
    }
}
