//! Scope-path helpers.
//!
//! A scope path locates a value inside the data object (`order[lines][0][sku]`)
//! and doubles as the seed for DOM identifiers and template parameter names.

use serde_json::Value;

// "../" segments survive id generation untouched; this placeholder protects
// them from the bracket/dot substitutions below.
const PARENT_GUARD: &str = "-@-";

/// Generate a DOM-legal identifier from a scope path.
///
/// Lower-cases the path, then rewrites `[` to `--`, drops `]`, and maps `.`
/// and spaces to `-`. Literal `../` prefixes are preserved verbatim. The
/// result contains no `[`, `]`, `.` or space characters and is deterministic
/// for a given path.
pub fn generate_id(scope: &str) -> String {
    scope
        .to_lowercase()
        .replace("../", PARENT_GUARD)
        .replace('[', "--")
        .replace(']', "")
        .replace('.', "-")
        .replace(' ', "-")
        .replace(PARENT_GUARD, "../")
}

/// Build a child scope path: `parent[key]`, or the bare key at the root.
pub fn child_scope(parent: Option<&str>, key: &str) -> String {
    match parent {
        Some(p) => format!("{p}[{key}]"),
        None => key.to_string(),
    }
}

/// Convert a bracketed scope path to dot syntax (`a[b][0]` -> `a.b.0`).
pub fn dot_syntax(name: &str) -> String {
    segments(name).join(".")
}

/// The raw (un-prefixed) property name: the last path segment.
pub fn raw_name(name: &str) -> String {
    segments(name).last().cloned().unwrap_or_default()
}

/// The name with its outermost numeric index bracket stripped
/// (`items[0][street]` -> `items[street]`), used for nested-array inner
/// binding. Names without a numeric index are returned unchanged.
pub fn inner_name(name: &str) -> String {
    let Some(open) = find_numeric_bracket(name) else {
        return name.to_string();
    };
    let close = match name[open..].find(']') {
        Some(rel) => open + rel,
        None => return name.to_string(),
    };
    format!("{}{}", &name[..open], &name[close + 1..])
}

/// Look up a value in the data object by dotted/bracketed path
/// (`a.b[0].c`, `order[lines][2][sku]`). Read-only; absent paths yield `None`.
pub fn lookup_value<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = data;
    for seg in segments(path) {
        current = match current {
            Value::Object(map) => map.get(&seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn find_numeric_bracket(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while let Some(rel) = name[i..].find('[') {
        let open = i + rel;
        let close = name[open..].find(']').map(|c| open + c)?;
        let body = &bytes[open + 1..close];
        if !body.is_empty() && body.iter().all(u8::is_ascii_digit) {
            return Some(open);
        }
        i = close + 1;
    }
    None
}

fn segments(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '[' if !in_bracket => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                in_bracket = true;
            }
            ']' if in_bracket => {
                out.push(std::mem::take(&mut current));
                in_bracket = false;
            }
            '.' if !in_bracket => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/scope.rs"]
mod tests;
