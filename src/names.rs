//! Name normalization shared by the lookup tables.

/// Key used by the ellipsoid, datum, unit and prime-meridian tables:
/// lower-cased with whitespace, `_`, `-`, `/` and parentheses removed.
pub(crate) fn loose_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '/' | '(' | ')'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Key used by the projection registry: lower-cased, parentheses dropped,
/// `-` and whitespace turned into `_`, runs of `_` collapsed.
pub(crate) fn projection_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '(' | ')' => {}
            '-' | '_' => push_underscore(&mut out),
            c if c.is_whitespace() => push_underscore(&mut out),
            c => out.extend(c.to_lowercase()),
        }
    }
    out.trim_matches('_').to_string()
}

fn push_underscore(out: &mut String) {
    if !out.ends_with('_') {
        out.push('_');
    }
}
