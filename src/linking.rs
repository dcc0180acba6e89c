//! Context pass: link type references to known symbols.
//!
//! Every `Reference` in the table is re-checked against the alias table
//! of the class that *declared* it (an inherited member carries its
//! ancestor's context, not the child's), then marked `linked` when its
//! fully-qualified name is itself a parsed class.  Documentation copied by
//! `{@inheritDoc}` is linked in the context of the class that wrote it.

use std::collections::{HashMap, HashSet};

use crate::resolution::{base_name, normalize_fqn};
use crate::symbols::SymbolTable;
use crate::types::{AliasTable, Member, TypeRef};

pub(crate) fn link_references(table: &mut SymbolTable) {
    let known: HashSet<String> = table.keys().cloned().collect();
    let contexts: HashMap<String, AliasTable> = table
        .iter()
        .map(|(fqn, record)| (fqn.clone(), record.aliases.clone()))
        .collect();
    let empty = AliasTable::new();

    let mut linked = 0usize;
    for (fqn, record) in table.iter_mut() {
        let own = contexts.get(fqn).unwrap_or(&empty);
        let mut linker = Linker {
            known: &known,
            linked: &mut linked,
        };

        for t in record
            .parent
            .iter_mut()
            .chain(record.interfaces.iter_mut())
            .chain(record.traits.iter_mut())
        {
            linker.link(t, own);
        }
        if let Some(docs) = record.docs.as_mut() {
            for t in docs.types_mut() {
                linker.link(t, own);
            }
        }

        linker.members(&mut record.constants, own, &contexts);
        linker.members(&mut record.properties, own, &contexts);
        linker.members(&mut record.methods, own, &contexts);

        for event in &mut record.events {
            for param in &mut event.parameters {
                linker.link(&mut param.type_ref, own);
            }
            if let Some(docs) = event.docs.as_mut() {
                for t in docs.types_mut() {
                    linker.link(t, own);
                }
            }
        }
    }

    tracing::debug!("linked {linked} type references");
}

struct Linker<'l> {
    known: &'l HashSet<String>,
    linked: &'l mut usize,
}

impl Linker<'_> {
    fn members<M: Member>(
        &mut self,
        members: &mut [M],
        own: &AliasTable,
        contexts: &HashMap<String, AliasTable>,
    ) {
        for member in members {
            let declared = member
                .inherited()
                .and_then(|from| contexts.get(&from.from_class))
                .unwrap_or(own);
            let documented = member
                .docs_from()
                .and_then(|from| contexts.get(from))
                .unwrap_or(declared);
            let types = member.types_mut();
            for t in types.declared {
                self.link(t, declared);
            }
            for t in types.documented {
                self.link(t, documented);
            }
        }
    }

    fn link(&mut self, type_ref: &mut TypeRef, aliases: &AliasTable) {
        type_ref.for_each_reference_mut(&mut |name, fqn, linked| {
            let base = base_name(name);
            if !base.starts_with('\\')
                && let Some(target) = aliases.get(base)
            {
                *fqn = normalize_fqn(target).to_string();
            }
            *linked = self.known.contains(fqn.as_str());
            if *linked {
                *self.linked += 1;
            }
        });
    }
}
