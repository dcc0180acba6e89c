/// Class inheritance resolution.
///
/// This module flattens the symbol table: every class and trait ends up
/// holding the members it declares plus every member it inherits, each
/// inherited copy annotated with the class that declared it.  Precedence
/// follows the language rules:
///
///   own members > used traits > parent chain > interfaces
///
/// Interfaces never inherit.  Ancestors missing from the table (external
/// base classes and the like) are skipped silently.
///
/// Documentation marked `{@inheritDoc}` is copied from the nearest
/// ancestor that declares the same member with real documentation.  The
/// first pass resolves what it can while merging; requests it could not
/// satisfy (because the ancestor had not been processed yet) are handed
/// to [`second_pass_inherited_docs`].
use std::collections::HashSet;

use serde::Serialize;

use crate::symbols::SymbolTable;
use crate::types::{
    ClassRecord, DeclarationKind, DocBlock, Inherited, Member, MemberKind, wants_inherited_docs,
};

/// A member whose documentation still has to be copied from an ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDoc {
    /// Fully-qualified name of the class holding the member.
    pub class: String,
    pub kind: MemberKind,
    pub member: String,
}

/// First pass: merge ancestor members into every class and trait.
///
/// Returns the doc-inherit requests that are still open afterwards.
/// Classes without any ancestor never contribute requests.
pub(crate) fn resolve_inheritance(table: &mut SymbolTable) -> Vec<PendingDoc> {
    let mut pending = Vec::new();
    let names: Vec<String> = table.keys().cloned().collect();

    for fqn in names {
        let Some(record) = table.get(&fqn) else {
            continue;
        };
        if record.kind == DeclarationKind::Interface || !record.has_ancestors() {
            continue;
        }

        let mut merged = record.clone();
        let mut requests = own_doc_requests(&merged);
        let mut visited = HashSet::from([fqn.clone()]);
        let ancestors = merged.ancestor_names();
        merge_ancestors(&mut merged, &ancestors, table, &mut requests, &mut visited);

        pending.extend(marked_members(&merged));
        table.insert(fqn, merged);
    }

    tracing::debug!("{} doc-inherit requests left after first pass", pending.len());
    pending
}

/// Second pass: retry every open request now that all classes are merged.
///
/// Returns the requests no ancestor could satisfy.
pub(crate) fn second_pass_inherited_docs(
    table: &mut SymbolTable,
    pending: Vec<PendingDoc>,
) -> Vec<PendingDoc> {
    let mut unresolved = Vec::new();

    for request in pending {
        let docs = table
            .get(&request.class)
            .and_then(|record| find_ancestor_docs(record, request.kind, &request.member, table));

        match docs {
            Some((docs, from_class)) => {
                if let Some(record) = table.get_mut(&request.class) {
                    apply_docs(record, request.kind, &request.member, docs, &from_class);
                }
            }
            None => {
                tracing::trace!(
                    "no ancestor documents {}::{}",
                    request.class,
                    request.member
                );
                unresolved.push(request);
            }
        }
    }

    unresolved
}

fn merge_ancestors(
    child: &mut ClassRecord,
    ancestors: &[String],
    table: &SymbolTable,
    requests: &mut Vec<(MemberKind, String)>,
    visited: &mut HashSet<String>,
) {
    for name in ancestors {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(ancestor) = table.get(name) else {
            tracing::trace!("{}: ancestor {} is not in the table", child.fqn, name);
            continue;
        };

        merge_members(&mut child.constants, &ancestor.constants, &ancestor.fqn, requests);
        merge_members(&mut child.properties, &ancestor.properties, &ancestor.fqn, requests);
        merge_members(&mut child.methods, &ancestor.methods, &ancestor.fqn, requests);

        // Transitive: the ancestor's own ancestors are merged into the
        // child directly, so the result does not depend on whether the
        // ancestor itself has been flattened yet.
        merge_ancestors(child, &ancestor.ancestor_names(), table, requests, visited);
    }
}

/// Add every ancestor member the child does not have yet, and satisfy
/// doc-inherit requests from the ancestor's documentation.
fn merge_members<M: Member>(
    own: &mut Vec<M>,
    ancestor: &[M],
    ancestor_fqn: &str,
    requests: &mut Vec<(MemberKind, String)>,
) {
    for member in ancestor {
        if let Some(pos) = requests
            .iter()
            .position(|(kind, name)| *kind == M::KIND && name == member.name())
            && let Some(docs) = member.docs().filter(|d| !d.inherit)
        {
            if let Some(target) = own.iter_mut().find(|m| m.name() == member.name()) {
                target.inherit_docs(docs.clone(), member.docs_origin(ancestor_fqn));
            }
            requests.remove(pos);
        }

        // Local (or earlier merged) definitions always win.
        if own.iter().any(|m| m.name() == member.name()) {
            continue;
        }

        let mut copy = member.clone();
        // An already inherited member keeps pointing at its declaring class.
        if copy.inherited().is_none() {
            copy.set_inherited(Some(Inherited {
                from_class: ancestor_fqn.to_string(),
                from_name: member.name().to_string(),
            }));
        }
        own.push(copy);
    }
}

/// The class's own members that ask for inherited documentation.
fn own_doc_requests(record: &ClassRecord) -> Vec<(MemberKind, String)> {
    fn collect<M: Member>(members: &[M], out: &mut Vec<(MemberKind, String)>) {
        out.extend(
            members
                .iter()
                .filter(|m| m.inherited().is_none() && wants_inherited_docs(m.docs()))
                .map(|m| (M::KIND, m.name().to_string())),
        );
    }

    let mut requests = Vec::new();
    collect(&record.constants, &mut requests);
    collect(&record.properties, &mut requests);
    collect(&record.methods, &mut requests);
    requests
}

/// Every member (own or inherited) whose docs are still an inherit marker.
fn marked_members(record: &ClassRecord) -> Vec<PendingDoc> {
    fn collect<M: Member>(class: &str, members: &[M], out: &mut Vec<PendingDoc>) {
        out.extend(
            members
                .iter()
                .filter(|m| wants_inherited_docs(m.docs()))
                .map(|m| PendingDoc {
                    class: class.to_string(),
                    kind: M::KIND,
                    member: m.name().to_string(),
                }),
        );
    }

    let mut pending = Vec::new();
    collect(&record.fqn, &record.constants, &mut pending);
    collect(&record.fqn, &record.properties, &mut pending);
    collect(&record.fqn, &record.methods, &mut pending);
    pending
}

/// Depth-first search through the ancestors, in merge precedence order,
/// for the nearest real documentation of a member, along with the class
/// it was written in.
fn find_ancestor_docs(
    record: &ClassRecord,
    kind: MemberKind,
    member: &str,
    table: &SymbolTable,
) -> Option<(DocBlock, String)> {
    fn search(
        ancestors: Vec<String>,
        kind: MemberKind,
        member: &str,
        table: &SymbolTable,
        visited: &mut HashSet<String>,
    ) -> Option<(DocBlock, String)> {
        for fqn in ancestors {
            if !visited.insert(fqn.clone()) {
                continue;
            }
            let Some(ancestor) = table.get(&fqn) else {
                continue;
            };
            if let Some((docs, origin)) =
                member_docs(ancestor, kind, member).filter(|(d, _)| !d.inherit)
            {
                return Some((docs.clone(), origin.to_string()));
            }
            if let Some(found) = search(ancestor.ancestor_names(), kind, member, table, visited) {
                return Some(found);
            }
        }
        None
    }

    let mut visited = HashSet::from([record.fqn.clone()]);
    search(record.ancestor_names(), kind, member, table, &mut visited)
}

fn member_docs<'r>(
    record: &'r ClassRecord,
    kind: MemberKind,
    name: &str,
) -> Option<(&'r DocBlock, &'r str)> {
    fn with_origin<'r, M: Member>(
        member: &'r M,
        holder: &'r str,
    ) -> Option<(&'r DocBlock, &'r str)> {
        Some((member.docs()?, member.docs_origin(holder)))
    }

    match kind {
        MemberKind::Constant => with_origin(record.constant(name)?, &record.fqn),
        MemberKind::Property => with_origin(record.property(name)?, &record.fqn),
        MemberKind::Method => with_origin(record.method(name)?, &record.fqn),
    }
}

fn apply_docs(
    record: &mut ClassRecord,
    kind: MemberKind,
    name: &str,
    docs: DocBlock,
    from_class: &str,
) {
    fn apply<M: Member>(members: &mut [M], name: &str, docs: DocBlock, from_class: &str) {
        if let Some(member) = members.iter_mut().find(|m| m.name() == name) {
            member.inherit_docs(docs, from_class);
        }
    }

    match kind {
        MemberKind::Constant => apply(&mut record.constants, name, docs, from_class),
        MemberKind::Property => apply(&mut record.properties, name, docs, from_class),
        MemberKind::Method => apply(&mut record.methods, name, docs, from_class),
    }
}
