//! Hebrew text normalization.
//!
//! Pure, idempotent, character-level functions shared by the analyzer
//! pipeline, the query compiler's wildcard path, and the snippet locator.

pub mod analyzer;

/// Remove every maximal run matching `<...>` (no embedded `<` or `>`),
/// replacing each with a single space. Never fails.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => {
                in_tag = false;
            }
            _ if in_tag => {}
            _ => out.push(c),
        }
    }

    out
}

/// Is `c` a Hebrew diacritic (nikud or te'amim) as defined by the D-set:
/// `[U+0591..U+05AF] ∪ [U+05B0..U+05BD] ∪ {U+05BF, U+05C1, U+05C2, U+05C4, U+05C5, U+05C7}`.
pub fn is_diacritic(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0x0591..=0x05AF | 0x05B0..=0x05BD)
        || matches!(cp, 0x05BF | 0x05C1 | 0x05C2 | 0x05C4 | 0x05C5 | 0x05C7)
}

/// Remove every code point in the D-set; all other characters pass through
/// unchanged. `remove_diacritics ∘ remove_diacritics == remove_diacritics`.
pub fn remove_diacritics(s: &str) -> String {
    if !s.chars().any(is_diacritic) {
        return s.to_string();
    }
    s.chars().filter(|c| !is_diacritic(*c)).collect()
}

/// `normalize(s) = remove_diacritics(strip_markup(s))`.
pub fn normalize(s: &str) -> String {
    remove_diacritics(&strip_markup(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markup_replaces_tags_with_single_space() {
        assert_eq!(strip_markup("a<b>c</b>d"), "a c d");
        assert_eq!(strip_markup("no tags here"), "no tags here");
        assert_eq!(strip_markup("<br/>"), " ");
    }

    #[test]
    fn strip_markup_never_panics_on_unbalanced_input() {
        assert_eq!(strip_markup("a<b"), "a ");
        assert_eq!(strip_markup("a>b"), "a>b");
    }

    #[test]
    fn remove_diacritics_strips_nikud() {
        // בְּרֵאשִׁית with nikud should reduce to בראשית
        let with_nikud = "בְּרֵאשִׁית";
        let without = remove_diacritics(with_nikud);
        assert_eq!(without, "בראשית");
    }

    #[test]
    fn remove_diacritics_is_idempotent() {
        let s = "בָּרָא אֱלֹהִים";
        let once = remove_diacritics(s);
        let twice = remove_diacritics(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn remove_diacritics_is_identity_without_matches() {
        let s = "hello world 123 שלום";
        assert_eq!(remove_diacritics(s), s);
    }

    #[test]
    fn normalize_never_lengthens_the_string() {
        let s = "<p>בְּרֵאשִׁית</p>";
        assert!(normalize(s).chars().count() <= s.chars().count());
    }

    #[test]
    fn normalize_combines_both_passes() {
        let s = "<i>בָּרָא</i>";
        assert_eq!(normalize(s), " ברא ");
    }
}
