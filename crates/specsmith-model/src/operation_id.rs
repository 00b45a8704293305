//! Operation identifier derivation.

/// Derive an operation id from a method and a path template.
///
/// Only the last literal path segment contributes: its hyphen-separated
/// words are capitalized and appended to the lower-case method name.
/// Placeholder segments (`{id}`) are ignored, so a path made only of
/// placeholders yields the bare method name.
pub fn generate(method: &str, path_template: &str) -> String {
    let mut id = method.to_lowercase();

    let last = path_template
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .next_back();

    if let Some(segment) = last {
        for word in segment.split('-') {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                id.extend(first.to_uppercase());
                id.push_str(chars.as_str());
            }
        }
    }

    id
}
