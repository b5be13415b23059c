//! URL slug generation

/// Turn a display name into a lowercase, hyphen-separated slug.
///
/// Non-alphanumeric runs collapse into a single hyphen and leading or
/// trailing hyphens are trimmed. Returns `None` when nothing usable remains.
pub fn slugify(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    let mut prev_hyphen = true;
    for ch in name.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
