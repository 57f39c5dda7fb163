use uuid::Uuid;

/// Lowercases `input` and joins its alphanumeric runs with `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// A slug that will not collide with an existing row: the slugified name
/// followed by a short random suffix.
pub fn unique_slug(input: &str) -> String {
    let base = slugify(input);
    let id = Uuid::new_v4().simple().to_string();
    let suffix = &id[..8];
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Ferris  Mug!"), "ferris-mug");
        assert_eq!(slugify("  Rust -- Sticker Pack "), "rust-sticker-pack");
        assert_eq!(slugify("Électro Shop"), "électro-shop");
    }

    #[test]
    fn unique_slug_keeps_the_readable_prefix() {
        let slug = unique_slug("Axum Hoodie");
        assert!(slug.starts_with("axum-hoodie-"));
        assert_eq!(slug.len(), "axum-hoodie-".len() + 8);
        assert_ne!(slug, unique_slug("Axum Hoodie"));
    }

    #[test]
    fn unique_slug_of_symbols_is_just_the_suffix() {
        assert_eq!(unique_slug("!!!").len(), 8);
    }
}
