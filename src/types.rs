//! Data types produced by the API parser.
//!
//! This module contains the "model" structs and enums that represent
//! extracted PHP declarations (classes, interfaces, traits), their members
//! (constants, properties, methods), parsed documentation, resolved types
//! and discovered event triggers.  Everything is owned so that nothing
//! depends on the parser's arena lifetime, and everything serialises to
//! the JSON document model consumed by renderers and indexers.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Namespace recorded for declarations that live in the global scope.
pub const GLOBAL_NAMESPACE: &str = "__GLOBAL__";

/// Per-unit mapping from an imported short name (or alias) to the
/// fully-qualified name it stands for.
pub type AliasTable = HashMap<String, String>;

/// Visibility of a class member.
///
/// Members without an explicit visibility modifier default to `Public`.
/// The derived ordering (`Public < Protected < Private`) is the rank used
/// when sorting members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// The kind of class-like declaration a [`ClassRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
}

/// A resolved type.
///
/// `Reference::linked` is only ever set by the linking pass, once the
/// referenced name is known to exist in the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "definition", rename_all = "lowercase")]
pub enum TypeRef {
    Scalar {
        #[serde(rename = "type")]
        name: String,
    },
    Reference {
        /// The name as written (possibly with `[]` / generic suffix).
        #[serde(rename = "type")]
        name: String,
        /// Fully-qualified class name, without the leading `\`.
        fqn: String,
        linked: bool,
    },
    Union {
        types: Vec<TypeRef>,
    },
}

impl TypeRef {
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeRef::Scalar { name: name.into() }
    }

    /// The fallback type for anything that could not be understood.
    pub fn mixed() -> Self {
        TypeRef::scalar("mixed")
    }

    pub fn reference(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        TypeRef::Reference {
            name: name.into(),
            fqn: fqn.into(),
            linked: false,
        }
    }

    /// Visit every `Reference` in this type, including union branches.
    pub fn for_each_reference_mut(&mut self, f: &mut impl FnMut(&mut String, &mut String, &mut bool)) {
        match self {
            TypeRef::Scalar { .. } => {}
            TypeRef::Reference { name, fqn, linked } => f(name, fqn, linked),
            TypeRef::Union { types } => {
                for t in types {
                    t.for_each_reference_mut(f);
                }
            }
        }
    }
}

/// An `@author` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A tag carrying a type and an optional rendered description:
/// `@var`, `@param`, `@return` and `@throws` all share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedTag {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Parsed documentation of a single declaration.
///
/// The record is sparse: anything absent or empty is `None` / empty and
/// is left out of the serialised form.  When `inherit` is set every other
/// field is empty; the documentation is to be copied from the nearest
/// ancestor that declares the same member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocBlock {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inherit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// `Some("")` for a bare `@deprecated` tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<TypedTag>,
    /// Keyed by parameter name without the `$` prefix, in tag order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, TypedTag>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypedTag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypedTag>,
}

impl DocBlock {
    pub fn inherit_marker() -> Self {
        DocBlock {
            inherit: true,
            ..DocBlock::default()
        }
    }

    /// Mutable access to every type carried by the tags.
    pub fn types_mut(&mut self) -> impl Iterator<Item = &mut TypeRef> {
        self.var
            .iter_mut()
            .chain(self.params.values_mut())
            .chain(self.returns.iter_mut())
            .chain(self.throws.iter_mut())
            .map(|tag| &mut tag.type_ref)
    }
}

/// Whether a member's docs still ask to be copied from an ancestor.
pub fn wants_inherited_docs(docs: Option<&DocBlock>) -> bool {
    docs.is_some_and(|d| d.inherit)
}

/// 1-based, inclusive source line range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// Provenance of a member that was merged in from an ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inherited {
    pub from_class: String,
    pub from_name: String,
}

/// Serialise `None` as `false`, matching the document model where a
/// member is either `inherited: false` or carries its provenance.
fn serialize_inherited<S: Serializer>(
    inherited: &Option<Inherited>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match inherited {
        Some(from) => from.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// A literal value evaluated from a constant expression.
///
/// Expressions that cannot be evaluated are represented by the *absence*
/// of a literal (`Option::None`), which is distinct from `Literal::Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ArrayEntry>),
    ClassConstant { class: String, name: String },
}

impl Literal {
    /// The scalar type name a literal of this kind has, if any.
    pub fn scalar_type(&self) -> Option<&'static str> {
        match self {
            Literal::Null => Some("null"),
            Literal::Bool(_) => Some("bool"),
            Literal::Int(_) => Some("int"),
            Literal::Float(_) => Some("float"),
            Literal::String(_) => Some("string"),
            Literal::Array(_) => Some("array"),
            Literal::ClassConstant { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Literal>,
    pub value: Literal,
}

/// Which member list a member lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Constant,
    Property,
    Method,
}

/// A class constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_final: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocBlock>,
    pub lines: LineRange,
    #[serde(serialize_with = "serialize_inherited")]
    pub inherited: Option<Inherited>,
    /// Class whose documentation `{@inheritDoc}` copied onto this member.
    #[serde(skip)]
    pub docs_from: Option<String>,
}

/// A class property (declared, or promoted from a constructor parameter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    /// The property name WITHOUT the `$` prefix.
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(skip)]
    pub has_native_type: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocBlock>,
    pub lines: LineRange,
    #[serde(serialize_with = "serialize_inherited")]
    pub inherited: Option<Inherited>,
    /// Class whose documentation `{@inheritDoc}` copied onto this member.
    #[serde(skip)]
    pub docs_from: Option<String>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    /// The parameter name WITHOUT the `$` prefix.
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    /// Whether the parameter has a default value or is variadic.
    pub is_optional: bool,
    pub is_variadic: bool,
    pub is_reference: bool,
    pub is_promoted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Whether `type_ref` came from the native hint rather than `@param`.
    #[serde(skip)]
    pub has_native_type: bool,
}

/// A class method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub parameters: Vec<ParameterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(skip)]
    pub has_native_return: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocBlock>,
    pub lines: LineRange,
    #[serde(serialize_with = "serialize_inherited")]
    pub inherited: Option<Inherited>,
    /// Class whose documentation `{@inheritDoc}` copied onto this member.
    #[serde(skip)]
    pub docs_from: Option<String>,
}

impl MethodInfo {
    /// Fill parameter and return types/summaries from the doc block.
    ///
    /// Native hints always win over documented types; documented
    /// summaries are taken whenever present.
    pub fn merge_docs_into_signature(&mut self) {
        let Some(docs) = self.docs.as_ref() else {
            return;
        };
        for param in &mut self.parameters {
            let Some(tag) = docs.params.get(&param.name) else {
                continue;
            };
            if !param.has_native_type {
                param.type_ref = Some(tag.type_ref.clone());
            }
            if tag.summary.is_some() {
                param.summary = tag.summary.clone();
            }
        }
        if !self.has_native_return
            && let Some(ret) = &docs.returns
        {
            self.return_type = Some(ret.type_ref.clone());
        }
    }
}

/// A member's type references, split by the class whose imports they
/// were written against.
pub struct MemberTypes<'m> {
    /// Native hints and anything parsed with the member itself.
    pub declared: Vec<&'m mut TypeRef>,
    /// Documentation types, plus signature types filled from them.
    pub documented: Vec<&'m mut TypeRef>,
}

/// Shared behaviour of constants, properties and methods needed by the
/// inheritance, linking and sorting passes.
pub trait Member: Clone {
    const KIND: MemberKind;

    fn name(&self) -> &str;
    fn visibility(&self) -> Visibility;
    fn inherited(&self) -> Option<&Inherited>;
    fn set_inherited(&mut self, inherited: Option<Inherited>);
    fn docs(&self) -> Option<&DocBlock>;
    fn docs_from(&self) -> Option<&str>;
    /// Take documentation written in `from_class`, re-applying any
    /// signature merge.
    fn inherit_docs(&mut self, docs: DocBlock, from_class: &str);
    fn types_mut(&mut self) -> MemberTypes<'_>;

    /// The class whose imports this member's documentation was written
    /// against, given that the member sits in `holder`.
    fn docs_origin<'s>(&'s self, holder: &'s str) -> &'s str {
        self.docs_from()
            .or_else(|| self.inherited().map(|i| i.from_class.as_str()))
            .unwrap_or(holder)
    }
}

impl Member for ConstantInfo {
    const KIND: MemberKind = MemberKind::Constant;

    fn name(&self) -> &str {
        &self.name
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn inherited(&self) -> Option<&Inherited> {
        self.inherited.as_ref()
    }
    fn set_inherited(&mut self, inherited: Option<Inherited>) {
        self.inherited = inherited;
    }
    fn docs(&self) -> Option<&DocBlock> {
        self.docs.as_ref()
    }
    fn docs_from(&self) -> Option<&str> {
        self.docs_from.as_deref()
    }
    fn inherit_docs(&mut self, docs: DocBlock, from_class: &str) {
        self.docs = Some(docs);
        self.docs_from = Some(from_class.to_string());
    }
    fn types_mut(&mut self) -> MemberTypes<'_> {
        MemberTypes {
            declared: self.type_ref.iter_mut().collect(),
            documented: self.docs.iter_mut().flat_map(|d| d.types_mut()).collect(),
        }
    }
}

impl Member for PropertyInfo {
    const KIND: MemberKind = MemberKind::Property;

    fn name(&self) -> &str {
        &self.name
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn inherited(&self) -> Option<&Inherited> {
        self.inherited.as_ref()
    }
    fn set_inherited(&mut self, inherited: Option<Inherited>) {
        self.inherited = inherited;
    }
    fn docs(&self) -> Option<&DocBlock> {
        self.docs.as_ref()
    }
    fn docs_from(&self) -> Option<&str> {
        self.docs_from.as_deref()
    }
    fn inherit_docs(&mut self, docs: DocBlock, from_class: &str) {
        // A property without a native hint takes the inherited `@var`.
        if !self.has_native_type
            && let Some(var) = docs.var.as_ref()
        {
            self.type_ref = Some(var.type_ref.clone());
        }
        self.docs = Some(docs);
        self.docs_from = Some(from_class.to_string());
    }
    fn types_mut(&mut self) -> MemberTypes<'_> {
        let type_from_docs = self.docs_from.is_some()
            && !self.has_native_type
            && self.docs.as_ref().is_some_and(|d| d.var.is_some());
        let mut types = MemberTypes {
            declared: Vec::new(),
            documented: self.docs.iter_mut().flat_map(|d| d.types_mut()).collect(),
        };
        if type_from_docs {
            types.documented.extend(self.type_ref.iter_mut());
        } else {
            types.declared.extend(self.type_ref.iter_mut());
        }
        types
    }
}

impl Member for MethodInfo {
    const KIND: MemberKind = MemberKind::Method;

    fn name(&self) -> &str {
        &self.name
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn inherited(&self) -> Option<&Inherited> {
        self.inherited.as_ref()
    }
    fn set_inherited(&mut self, inherited: Option<Inherited>) {
        self.inherited = inherited;
    }
    fn docs(&self) -> Option<&DocBlock> {
        self.docs.as_ref()
    }
    fn docs_from(&self) -> Option<&str> {
        self.docs_from.as_deref()
    }
    fn inherit_docs(&mut self, docs: DocBlock, from_class: &str) {
        self.docs = Some(docs);
        self.docs_from = Some(from_class.to_string());
        self.merge_docs_into_signature();
    }
    fn types_mut(&mut self) -> MemberTypes<'_> {
        // Signature types filled by `merge_docs_into_signature` belong to
        // whichever class wrote the docs.
        let merged = self.docs_from.is_some();
        let docs = self.docs.as_ref();
        let param_from_docs: Vec<bool> = self
            .parameters
            .iter()
            .map(|p| {
                merged
                    && !p.has_native_type
                    && docs.is_some_and(|d| d.params.contains_key(&p.name))
            })
            .collect();
        let return_from_docs =
            merged && !self.has_native_return && docs.is_some_and(|d| d.returns.is_some());

        let mut types = MemberTypes {
            declared: Vec::new(),
            documented: self.docs.iter_mut().flat_map(|d| d.types_mut()).collect(),
        };
        for (param, from_docs) in self.parameters.iter_mut().zip(param_from_docs) {
            if from_docs {
                types.documented.extend(param.type_ref.iter_mut());
            } else {
                types.declared.extend(param.type_ref.iter_mut());
            }
        }
        if return_from_docs {
            types.documented.extend(self.return_type.iter_mut());
        } else {
            types.declared.extend(self.return_type.iter_mut());
        }
        types
    }
}

/// A parameter documented on an event trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A documented "fires this event" call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Dotted event name, e.g. `model.afterSave`.
    pub name: String,
    /// Name of the method containing the call.
    pub method: String,
    pub parameters: Vec<EventParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocBlock>,
    pub lines: LineRange,
}

/// One parsed class, interface or trait.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    /// Short name (e.g. `"User"`).
    pub name: String,
    /// Fully-qualified name without the leading `\` (e.g. `"App\Models\User"`).
    pub fqn: String,
    pub kind: DeclarationKind,
    pub file: PathBuf,
    /// The declaring namespace, or [`GLOBAL_NAMESPACE`].
    pub namespace: String,
    /// The unit's import table; only needed while the passes run.
    #[serde(skip)]
    pub aliases: AliasTable,
    /// The `extends` clause.  Always `None` for interfaces and traits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub traits: Vec<TypeRef>,
    pub is_final: bool,
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocBlock>,
    pub lines: LineRange,
    pub constants: Vec<ConstantInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
    pub events: Vec<EventRecord>,
}

impl ClassRecord {
    /// Fully-qualified names of every direct ancestor, in merge precedence
    /// order: used traits, then the parent class, then interfaces.
    pub fn ancestor_names(&self) -> Vec<String> {
        self.traits
            .iter()
            .chain(self.parent.iter())
            .chain(self.interfaces.iter())
            .filter_map(|t| match t {
                TypeRef::Reference { fqn, .. } => Some(fqn.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_ancestors(&self) -> bool {
        self.parent.is_some() || !self.traits.is_empty() || !self.interfaces.is_empty()
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantInfo> {
        self.constants.iter().find(|c| c.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A unit that could not be turned into a [`ClassRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPath {
    pub path: PathBuf,
    pub error: String,
}
