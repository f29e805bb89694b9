//! Message template rendering.
//!
//! Notification rule bodies contain `{{variable}}` placeholders that are
//! substituted against a variables map just before dispatch. Placeholders
//! without a matching variable are left as literal text so a misconfigured
//! template never fails a send.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder regex is valid");
}

/// Renders a template by substituting `{{name}}` placeholders from `vars`.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Lists the placeholder names referenced by a template, in order of first use.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_variables() {
        let rendered = render(
            "Hi {{tenantName}}, rent for {{unitName}} is due.",
            &vars(&[("tenantName", "Ada"), ("unitName", "A-101")]),
        );
        assert_eq!(rendered, "Hi Ada, rent for A-101 is due.");
    }

    #[test]
    fn test_render_tolerates_whitespace() {
        let rendered = render("Hello {{ tenantName }}!", &vars(&[("tenantName", "Ada")]));
        assert_eq!(rendered, "Hello Ada!");
    }

    #[test]
    fn test_render_leaves_unresolved_placeholders() {
        let rendered = render("Hi {{tenantName}}, due {{dueDate}}.", &vars(&[("tenantName", "Ada")]));
        assert_eq!(rendered, "Hi Ada, due {{dueDate}}.");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let rendered = render("{{name}} and {{name}}", &vars(&[("name", "x")]));
        assert_eq!(rendered, "x and x");
    }

    #[test]
    fn test_render_no_placeholders() {
        let rendered = render("plain text", &vars(&[]));
        assert_eq!(rendered, "plain text");
    }

    #[test]
    fn test_placeholders_listing() {
        let names = placeholders("{{a}} {{b}} {{a}}");
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
