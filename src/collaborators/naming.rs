//! Name derivation for generated classes and methods.

use crate::model::Contract;

/// Joins the alphanumeric runs of `text`, capitalizing every run after the
/// first. The first run keeps its case: `should-return user` becomes
/// `shouldReturnUser`.
pub fn camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, part) in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .enumerate()
    {
        if idx == 0 {
            out.push_str(part);
        } else {
            out.push_str(&capitalize(part));
        }
    }
    out
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// File name without its directory or last extension.
pub fn file_stem(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// `validate_` plus the camel-cased contract name, falling back to the
/// contract file name. Unnamed contracts with an order get `_<order>` so
/// several contracts from one file stay distinct.
pub fn method_name(contract: &Contract) -> String {
    match contract.name.as_deref().map(camel_case).filter(|n| !n.is_empty()) {
        Some(name) => format!("validate_{}", name),
        None => {
            let base = format!("validate_{}", camel_case(file_stem(&contract.file_name)));
            match contract.order {
                Some(order) => format!("{}_{}", base, order),
                None => base,
            }
        }
    }
}

/// Path segments of a contract group's relative path.
pub fn path_segments(relative_path: &str) -> Vec<&str> {
    relative_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// A package-name segment: lower-case alphanumerics, other characters
/// become `_`, and a leading digit is prefixed with `_`.
pub fn package_segment(segment: &str) -> String {
    let mut out: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
