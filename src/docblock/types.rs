//! Token helpers for the type part of doc tags.

/// Split off the first type token from `s`, respecting `<…>`, `(…)` and
/// `{…}` nesting so that `array<int, string> $x` yields the whole
/// `array<int, string>`.
///
/// Returns `(type_token, remainder)`.
pub(crate) fn split_type_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => {
                // `int | string` is still one type.
                let before = s[..i].trim_end();
                let after = s[i..].trim_start();
                if before.ends_with(['|', '&']) || after.starts_with(['|', '&']) {
                    continue;
                }
                return (&s[..i], &s[i..]);
            }
            _ => {}
        }
    }
    (s, "")
}

/// The variable name of a token (`$x`, `...$x`, `&$x`, `&...$x`),
/// without sigils.
pub(crate) fn variable_name(token: &str) -> Option<&str> {
    let t = token.trim_start_matches('&').trim_start_matches("...");
    let name = t.strip_prefix('$')?;
    let name = name.trim_end_matches([',', '.', ';']);
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_type_with_spaces_is_one_token() {
        assert_eq!(
            split_type_token("array<int, string> $map the map"),
            ("array<int, string>", " $map the map")
        );
    }

    #[test]
    fn spaced_union_is_one_token() {
        assert_eq!(split_type_token("int | null $x"), ("int | null", " $x"));
    }

    #[test]
    fn variable_sigils_are_stripped() {
        assert_eq!(variable_name("...$args"), Some("args"));
        assert_eq!(variable_name("&$out,"), Some("out"));
        assert_eq!(variable_name("string"), None);
        assert_eq!(variable_name("$"), None);
    }
}
