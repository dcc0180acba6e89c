//! The symbol table and the views built from it.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::{ClassRecord, Member, TypeRef};

/// Every parsed class, interface and trait, keyed by fully-qualified name
/// in discovery order.
pub type SymbolTable = IndexMap<String, ClassRecord>;

/// One level of the class map: a namespace segment maps either to the
/// next level or, at the leaves, to a fully-qualified class name.
pub type ClassMap = BTreeMap<String, ClassMapNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ClassMapNode {
    Namespace(ClassMap),
    Class(String),
}

/// Build the namespace tree of all classes, sorted at every level.
///
/// A name that is both a class and a namespace prefix (`App\Foo` next to
/// `App\Foo\Bar`) keeps whichever was inserted first.
pub(crate) fn build_class_map(table: &SymbolTable) -> ClassMap {
    let mut map = ClassMap::new();

    'classes: for fqn in table.keys() {
        let mut segments: Vec<&str> = fqn.split('\\').collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };

        let mut level = &mut map;
        for segment in segments {
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| ClassMapNode::Namespace(ClassMap::new()));
            match node {
                ClassMapNode::Namespace(children) => level = children,
                ClassMapNode::Class(existing) => {
                    tracing::warn!("class map: {fqn} is shadowed by class {existing}");
                    continue 'classes;
                }
            }
        }

        if level.contains_key(leaf) {
            tracing::warn!("class map: {fqn} collides with a namespace of the same name");
            continue;
        }
        level.insert(leaf.to_string(), ClassMapNode::Class(fqn.clone()));
    }

    map
}

/// Order members by own-before-inherited, then visibility, then name.
/// Used traits are ordered by name.
pub(crate) fn sort_definitions(table: &mut SymbolTable) {
    for record in table.values_mut() {
        sort_members(&mut record.constants);
        sort_members(&mut record.properties);
        sort_members(&mut record.methods);
        if record.traits.len() > 1 {
            record.traits.sort_by(|a, b| type_name(a).cmp(type_name(b)));
        }
    }
}

fn sort_members<M: Member>(members: &mut [M]) {
    members.sort_by(|a, b| {
        (a.inherited().is_some(), a.visibility(), a.name()).cmp(&(
            b.inherited().is_some(),
            b.visibility(),
            b.name(),
        ))
    });
}

fn type_name(t: &TypeRef) -> &str {
    match t {
        TypeRef::Reference { fqn, .. } => fqn,
        TypeRef::Scalar { name } => name,
        TypeRef::Union { .. } => "",
    }
}
