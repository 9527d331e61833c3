// Template engine: `{name}` placeholders replaced by literal values.

/// Replace every `{name}` in `template` with the matching value.
///
/// Only names present in `values` are touched; other placeholders are left
/// as written. Values are inserted verbatim and the output is not scanned
/// again, so a value that itself looks like a placeholder stays literal.
pub fn render<K, V>(template: &str, values: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .map(|(_, value)| (value.as_ref(), close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [(&str, &str); 0] = [];

    #[test]
    fn test_replaces_every_occurrence() {
        let out = render("{a}-{b}-{a}", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn test_unknown_placeholders_stay_literal() {
        let out = render("{known} {unknown}", &[("known", "yes")]);
        assert_eq!(out, "yes {unknown}");
    }

    #[test]
    fn test_second_pass_with_empty_mapping_is_noop() {
        let once = render("<p>{code}</p>{other}", &[("code", "x")]);
        assert_eq!(render(&once, &NONE), once);
    }

    #[test]
    fn test_values_are_literal_text() {
        let out = render("{v}", &[("v", "$1 \\d+ {v} (.*)")]);
        assert_eq!(out, "$1 \\d+ {v} (.*)");
    }

    #[test]
    fn test_namespaced_names() {
        let out = render(
            "{soundcloud::full_title}!",
            &[("soundcloud::full_title", "Song by bob")],
        );
        assert_eq!(out, "Song by bob!");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(render("{ {x", &[("x", "y")]), "{ {x");
        assert_eq!(render("a}b{", &[("x", "y")]), "a}b{");
        assert_eq!(render("{{x}}", &[("x", "y")]), "{y}");
    }
}
