//! Keeps an operation's path parameters in step with its path template.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::model::{Parameter, ParameterLocation};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern compiles"));

/// Placeholder names in a path template, in order of appearance.
///
/// A name repeated in the template is reported once.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Reconcile `existing` parameters against a (new) path template.
///
/// The result lists path parameters in placeholder order, keeping the
/// metadata of those that survive and adding fresh required string
/// parameters for new placeholders, followed by every non-path parameter
/// in its original order. Path parameters whose placeholder is gone are
/// dropped.
pub fn sync(existing: &[Parameter], template: &str) -> Vec<Parameter> {
    let mut result: Vec<Parameter> = placeholders(template)
        .into_iter()
        .map(|name| {
            existing
                .iter()
                .find(|p| p.location == ParameterLocation::Path && p.name == name)
                .cloned()
                .unwrap_or_else(|| Parameter::path(name))
        })
        .collect();

    result.extend(
        existing
            .iter()
            .filter(|p| p.location != ParameterLocation::Path)
            .cloned(),
    );

    result
}
