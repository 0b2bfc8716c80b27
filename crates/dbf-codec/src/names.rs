//! Field name collision resolution.

use std::collections::{HashMap, HashSet};

use crate::codepage::CodePage;
use crate::types::{FieldDescriptor, MAX_NAME_BYTES};

/// Make names unique by suffixing repeats with `_1`, `_2`, ...
///
/// The first occurrence keeps its name. Matching is case-sensitive and the
/// input order is preserved. A generated name that is already taken keeps
/// counting up (`A`, `A_1`, `A` becomes `A`, `A_1`, `A_2`).
#[must_use]
pub fn resolve_field_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        if seen.insert(name) {
            resolved.push(name.to_string());
            continue;
        }

        let counter = counters.entry(name).or_insert(0);
        let candidate = loop {
            *counter += 1;
            let candidate = format!("{name}_{counter}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(candidate.clone());
        resolved.push(candidate);
    }

    resolved
}

/// Shorten names to the 10-byte header slot, keeping them distinct.
///
/// Each name is cut to the longest prefix that fits once encoded under
/// `code_page`. When that prefix is already taken, the name is cut further
/// to make room for a `_1`, `_2`, ... suffix (`ADDRESS_LINE1`,
/// `ADDRESS_LINE2` become `ADDRESS_LI`, `ADDRESS__1`). Names are compared
/// as encoded bytes, so two characters the code page maps to `?` collide.
#[must_use]
pub fn fit_field_names<S: AsRef<str>>(names: &[S], code_page: &CodePage) -> Vec<String> {
    let mut taken: HashSet<Vec<u8>> = HashSet::new();
    let mut fitted = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let short = fit_prefix(name, code_page, MAX_NAME_BYTES);
        if taken.insert(code_page.encode(&short)) {
            fitted.push(short);
            continue;
        }

        let mut counter = 0usize;
        let candidate = loop {
            counter += 1;
            let suffix = format!("_{counter}");
            let room = MAX_NAME_BYTES.saturating_sub(suffix.len());
            let candidate = format!("{}{suffix}", fit_prefix(name, code_page, room));
            if taken.insert(code_page.encode(&candidate)) {
                break candidate;
            }
        };
        fitted.push(candidate);
    }

    fitted
}

/// Longest prefix of `name` whose encoding fits in `max_bytes`.
fn fit_prefix(name: &str, code_page: &CodePage, max_bytes: usize) -> String {
    let mut prefix = String::new();
    for ch in name.chars() {
        prefix.push(ch);
        if code_page.encode(&prefix).len() > max_bytes {
            prefix.pop();
            break;
        }
    }
    prefix
}

/// Apply [`resolve_field_names`] to a descriptor list in place.
pub fn dedupe_fields(fields: &mut [FieldDescriptor]) {
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let resolved = resolve_field_names(&names);
    for (field, name) in fields.iter_mut().zip(resolved) {
        field.name = name;
    }
}
