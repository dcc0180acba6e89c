/// Name and type resolution.
///
/// Converts names as written in a source unit (or in one of its doc
/// comments) into fully-qualified names, and classifies type expressions
/// into [`TypeRef`] values.
///
/// # Name resolution ([`resolve_name`])
///
/// Rules, in priority order:
///
///   1. Scalar / built-in keywords (`int`, `string`, `null`, …) are
///      returned unchanged and never namespace-qualified.
///   2. A name whose (first segment) matches an import is expanded to the
///      imported fully-qualified name.
///   3. Fully-qualified names (`\Foo\Bar`) are returned as-is.
///   4. Relative names (`Bar`, `Sub\Bar`, `namespace\Bar`) are prefixed
///      with the current namespace.
///   5. Anything else (names in the global namespace) is returned verbatim.
use crate::error::MalformedType;
use crate::types::{AliasTable, GLOBAL_NAMESPACE, TypeRef};

/// Built-in type keywords.  These can never name a class.
pub const SCALAR_TYPES: &[&str] = &[
    "bool", "boolean", "int", "integer", "float", "double", "string", "array", "object",
    "callable", "iterable", "resource", "null", "mixed", "void", "never", "true", "false",
    "self", "static", "parent", "$this", "scalar", "numeric", "list",
];

/// Check whether a bare name is a built-in type keyword.
///
/// PHPStan/Psalm pseudo types (`class-string`, `non-empty-array`, …) are
/// recognised by their dash.
pub fn is_scalar(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SCALAR_TYPES.contains(&lower.as_str()) || (lower.contains('-') && !lower.contains('\\'))
}

/// Strip the root marker from a fully-qualified name.
pub fn normalize_fqn(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

/// Resolve a class name to its fully-qualified form.
pub fn resolve_name(name: &str, namespace: &str, aliases: &AliasTable) -> String {
    if is_scalar(name) {
        return name.to_string();
    }

    if let Some(fqn) = aliases.get(name) {
        return fqn.clone();
    }

    if name.starts_with('\\') {
        return name.to_string();
    }

    // Qualified name whose first segment is an import: `Models\User`
    // with `use App\Models;` becomes `App\Models\User`.
    if let Some((first, rest)) = name.split_once('\\') {
        if first.eq_ignore_ascii_case("namespace") {
            return qualify(rest, namespace);
        }
        if let Some(fqn) = aliases.get(first) {
            return format!("{}\\{}", fqn, rest);
        }
    }

    qualify(name, namespace)
}

fn qualify(name: &str, namespace: &str) -> String {
    if namespace.is_empty() || namespace == GLOBAL_NAMESPACE {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Classify a type expression (a native hint rendered to text, or the type
/// part of a doc tag) into a [`TypeRef`].
///
/// Unions keep their source order; intersections are flattened into the
/// same list.  `?T` becomes `T|null`.  Generic and array suffixes are kept
/// in the written name while the base name is what gets resolved, so
/// `Collection<int, User>` is a reference to `Collection`.
pub fn get_doc_type(
    expression: &str,
    namespace: &str,
    aliases: &AliasTable,
) -> Result<TypeRef, MalformedType> {
    let mut types = Vec::new();
    collect_branches(expression.trim(), namespace, aliases, &mut types)?;
    Ok(if types.len() == 1 {
        types.remove(0)
    } else {
        TypeRef::Union { types }
    })
}

fn collect_branches(
    expression: &str,
    namespace: &str,
    aliases: &AliasTable,
    out: &mut Vec<TypeRef>,
) -> Result<(), MalformedType> {
    let malformed = |reason| MalformedType {
        expression: expression.to_string(),
        reason,
    };

    if expression.is_empty() {
        return Err(malformed("empty type"));
    }

    for branch in split_top_level(expression).map_err(malformed)? {
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(malformed("empty union branch"));
        }

        if let Some(inner) = branch.strip_prefix('?') {
            collect_branches(inner.trim(), namespace, aliases, out)?;
            out.push(TypeRef::scalar("null"));
        } else if let Some(inner) = strip_wrapping_parens(branch) {
            collect_branches(inner.trim(), namespace, aliases, out)?;
        } else {
            out.push(classify_atom(branch, namespace, aliases).map_err(malformed)?);
        }
    }
    Ok(())
}

/// Split on `|` and `&` at nesting depth zero.
fn split_top_level(s: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut stack: Vec<char> = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '<' | '(' | '{' | '[' => stack.push(c),
            '>' | ')' | '}' | ']' => {
                let open = match c {
                    '>' => '<',
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                if stack.pop() != Some(open) {
                    return Err("unbalanced brackets");
                }
            }
            '|' | '&' if stack.is_empty() => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !stack.is_empty() || quote.is_some() {
        return Err("unbalanced brackets");
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// `(A|B)` → `A|B`, only when the parentheses wrap the whole branch.
fn strip_wrapping_parens(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

fn classify_atom(atom: &str, namespace: &str, aliases: &AliasTable) -> Result<TypeRef, &'static str> {
    // Literal types: `'foo'`, `"bar"`, `42`, `-1`, `1.5`.
    if atom.starts_with('\'') || atom.starts_with('"') {
        return Ok(TypeRef::scalar(atom));
    }
    if atom
        .trim_start_matches('-')
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        return if atom.trim_start_matches('-').chars().all(|c| c.is_ascii_digit() || c == '.' || c == '_') {
            Ok(TypeRef::scalar(atom))
        } else {
            Err("invalid literal type")
        };
    }

    let base = base_name(atom);
    if base.is_empty() {
        return Err("missing type name");
    }
    if !base
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\\' | '-' | '$') || !c.is_ascii())
    {
        return Err("invalid character in type name");
    }
    if base.ends_with('\\') || base.contains("\\\\") {
        return Err("invalid namespace separator");
    }

    if is_scalar(base) {
        return Ok(TypeRef::scalar(atom));
    }

    let resolved = resolve_name(base, namespace, aliases);
    Ok(TypeRef::reference(atom, normalize_fqn(&resolved)))
}

/// The leading name of a type atom, before any generic or array suffix.
pub fn base_name(atom: &str) -> &str {
    let end = atom.find(['<', '{', '[', '(']).unwrap_or(atom.len());
    atom[..end].trim()
}
