//! URL identifiers derived from titles.

/// Lowercase the input and collapse every run of non-alphanumeric characters
/// into a single hyphen, trimming hyphens at both ends. Only ASCII letters and
/// digits survive, so the result is always safe inside a URL path.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// True when `identifier` is already in slug form.
pub fn is_slug(identifier: &str) -> bool {
    !identifier.is_empty() && slugify(identifier) == identifier
}
