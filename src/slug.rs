/// Convert free text (titles, category names) into a URL-safe identifier.
///
/// The output only ever contains `[a-z0-9-]`, never starts or ends with a
/// hyphen, and `slugify(slugify(x)) == slugify(x)`. Accented characters are
/// dropped rather than transliterated so existing URLs keep resolving.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_hyphen = true;
        }
    }

    slug
}

/// True when `candidate` is already in canonical slug form.
pub fn is_slug(candidate: &str) -> bool {
    !candidate.is_empty() && slugify(candidate) == candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples() {
        assert_eq!(slugify("Casa Inteligente"), "casa-inteligente");
        assert_eq!(slugify("  Beleza & Autocuidado "), "beleza-autocuidado");
    }

    #[test]
    fn test_accented_characters_are_stripped() {
        assert_eq!(slugify("Eletrônicos"), "eletrnicos");
        assert_eq!(slugify("Café da Manhã"), "caf-da-manh");
    }

    #[test]
    fn test_hyphens_and_underscores_collapse() {
        assert_eq!(slugify("--robo--aspirador--"), "robo-aspirador");
        assert_eq!(slugify("fone_bluetooth  2024"), "fone-bluetooth-2024");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("&&& ###"), "");
    }

    #[test]
    fn test_output_alphabet_and_idempotence() {
        let samples = [
            "Casa Inteligente",
            "  Beleza & Autocuidado ",
            "Top 10: Melhores Air Fryers (2024)!",
            "ÁGUA   gelada\t\npara\u{00a0}todos",
            "already-a-slug",
            "-leading and trailing-",
            "emoji 🚀 rocket",
            "MiXeD_CaSe__Name",
        ];

        for sample in samples {
            let slug = slugify(sample);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected character in {slug:?}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
            assert_eq!(slugify(&slug), slug);
        }
    }

    #[test]
    fn test_is_slug() {
        assert!(is_slug("casa-inteligente"));
        assert!(!is_slug("Casa Inteligente"));
        assert!(!is_slug(""));
    }
}
