//! URI template expansion
//!
//! Discovery documents use RFC 6570 templates up to level 2:
//! - `{name}` simple expansion, everything outside the unreserved set is
//!   percent-encoded
//! - `{+name}` and `{#name}` reserved expansion, reserved characters such as
//!   `/` and `:` are kept (`#` also prefixes the result with `#`)
//!
//! A comma-separated variable list (`{a,b}`) expands to the values joined by
//! commas. Every variable must resolve; an unresolved variable is an error,
//! never an empty substitution.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters left alone by simple expansion (RFC 3986 unreserved)
const SIMPLE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters left alone by reserved expansion (unreserved + reserved)
const RESERVED: &AsciiSet = &SIMPLE
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'%');

/// Template expansion failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template variable '{0}' has no value")]
    Unresolved(String),

    #[error("Unterminated expression in template '{0}'")]
    Unterminated(String),
}

/// Names of all variables referenced by a template, in order of appearance
pub fn variables(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let (_, vars) = split_operator(&rest[start + 1..start + len]);
        names.extend(vars.split(',').map(|v| v.trim().to_string()));
        rest = &rest[start + len + 1..];
    }
    names
}

/// Expand `template`, looking up each variable with `lookup`
pub fn expand<F>(template: &str, lookup: F) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let len = rest[start..]
            .find('}')
            .ok_or_else(|| TemplateError::Unterminated(template.to_string()))?;
        let (operator, vars) = split_operator(&rest[start + 1..start + len]);

        let encode_set = match operator {
            Some('+') | Some('#') => RESERVED,
            _ => SIMPLE,
        };
        if operator == Some('#') {
            out.push('#');
        }

        for (i, name) in vars.split(',').map(str::trim).enumerate() {
            let value = lookup(name).ok_or_else(|| TemplateError::Unresolved(name.to_string()))?;
            if i > 0 {
                out.push(',');
            }
            out.extend(utf8_percent_encode(&value, encode_set));
        }

        rest = &rest[start + len + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn split_operator(expression: &str) -> (Option<char>, &str) {
    match expression.chars().next() {
        Some(op @ ('+' | '#')) => (Some(op), &expression[1..]),
        _ => (None, expression),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_expansion() {
        let values = vars(&[("id", "42")]);
        let expanded = expand("items/{id}", |n| values.get(n).cloned()).unwrap();
        assert_eq!(expanded, "items/42");
    }

    #[test]
    fn test_simple_expansion_encodes_reserved() {
        let values = vars(&[("unitName", "a b/c@d.service")]);
        let expanded = expand("units/{unitName}", |n| values.get(n).cloned()).unwrap();
        assert_eq!(expanded, "units/a%20b%2Fc%40d.service");
    }

    #[test]
    fn test_reserved_expansion_keeps_slashes() {
        let values = vars(&[("bucket", "b1"), ("object", "dir/file name.txt")]);
        let expanded = expand("b/{bucket}/o/{+object}", |n| values.get(n).cloned()).unwrap();
        assert_eq!(expanded, "b/b1/o/dir/file%20name.txt");
    }

    #[test]
    fn test_fragment_and_lists() {
        let values = vars(&[("x", "1"), ("y", "2")]);
        assert_eq!(
            expand("p{#x}", |n| values.get(n).cloned()).unwrap(),
            "p#1"
        );
        assert_eq!(
            expand("map/{x,y}", |n| values.get(n).cloned()).unwrap(),
            "map/1,2"
        );
    }

    #[test]
    fn test_unresolved_variable() {
        let result = expand("items/{id}", |_| None);
        assert_eq!(result, Err(TemplateError::Unresolved("id".to_string())));
    }

    #[test]
    fn test_unterminated_expression() {
        let result = expand("items/{id", |_| Some("1".to_string()));
        assert!(matches!(result, Err(TemplateError::Unterminated(_))));
    }

    #[test]
    fn test_no_expressions() {
        assert_eq!(expand("machines", |_| None).unwrap(), "machines");
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            variables("b/{bucket}/o/{+object}{#frag}/{x,y}"),
            vec!["bucket", "object", "frag", "x", "y"]
        );
        assert!(variables("machines").is_empty());
    }
}
