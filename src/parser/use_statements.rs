/// `use` statement and namespace extraction.
///
/// Builds a unit's [`AliasTable`] from its class imports and finds the
/// namespace a declaration lives in.
use mago_syntax::ast::*;

use crate::types::AliasTable;

/// Walk statements and collect every class import into `aliases`.
///
/// Imports inside namespace bodies are included.
pub(crate) fn extract_use_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    aliases: &mut AliasTable,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => extract_use_items(&use_stmt.items, aliases),
            Statement::Namespace(namespace) => {
                extract_use_statements(namespace.statements().iter(), aliases);
            }
            _ => {}
        }
    }
}

/// Register the items of one `use` statement.
///
/// Handles:
///   - Simple use: `use Foo\Bar;`
///   - Aliased use: `use Foo\Bar as Baz;`
///   - Grouped use: `use Foo\{Bar, Baz as Qux};` (every entry gets the
///     group prefix)
///   - Mixed grouped use: `use Foo\{Bar, function baz, const QUX};`
///     (function and const imports are skipped; they never name a class)
pub(crate) fn extract_use_items(items: &UseItems, aliases: &mut AliasTable) {
    match items {
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                register_use_item(item, None, aliases);
            }
        }
        UseItems::TypedSequence(seq) => {
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, aliases);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), aliases);
            }
        }
        UseItems::MixedList(list) => {
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), aliases);
            }
        }
    }
}

/// Register one imported name.  The alias key is the explicit alias or
/// the last segment of the imported name.
fn register_use_item(item: &UseItem, group_prefix: Option<&str>, aliases: &mut AliasTable) {
    let item_name = item.name.value().trim_start_matches('\\');

    let fqn = match group_prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_matches('\\'), item_name),
        None => item_name.to_string(),
    };

    let alias = match &item.alias {
        Some(alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    aliases.insert(alias, fqn);
}

/// Last segment of a namespaced name.
fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// The name of a namespace statement, if it has a non-empty one.
pub(crate) fn namespace_name(namespace: &Namespace) -> Option<String> {
    let ident = namespace.name.as_ref()?;
    let name = ident.value().trim_matches('\\');
    (!name.is_empty()).then(|| name.to_string())
}
