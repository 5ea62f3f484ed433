//! Field splitting for robot-protocol payloads.

/// Splits a record payload on commas that are not inside a double-quoted
/// field, then strips the surrounding quotes from each field.
///
/// Quotes are a plain delimiter pair; there is no escape sequence.
pub fn split_fields(payload: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in payload.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(unquote(&current).to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(unquote(&current).to_string());
    fields
}

/// Removes one pair of surrounding double quotes, if present.
pub fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
