//! Property tests for identifier slug derivation.

use proptest::prelude::*;
use taskboard_model::slug::slugify;

fn is_slug_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | 'а'..='я' | 'ё' | '-')
}

proptest! {
    #[test]
    fn slugify_is_idempotent(input in "\\PC*") {
        let once = slugify(&input);
        prop_assert_eq!(slugify(&once), once);
    }

    #[test]
    fn output_uses_slug_charset_only(input in "\\PC*") {
        let slug = slugify(&input);
        prop_assert!(slug.chars().all(is_slug_char), "bad chars in {slug:?}");
    }

    #[test]
    fn output_never_has_edge_hyphens(input in "\\PC*") {
        let slug = slugify(&input);
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
    }

    #[test]
    fn output_never_has_hyphen_runs(input in "\\PC*") {
        let slug = slugify(&input);
        prop_assert!(!slug.contains("--"), "hyphen run in {slug:?}");
    }

    #[test]
    fn plain_words_survive(word in "[a-z0-9]{1,20}") {
        prop_assert_eq!(slugify(&word), word);
    }

    #[test]
    fn separators_become_single_hyphens(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
        sep in "[ \\t-]{1,4}",
    ) {
        let input = format!("{a}{sep}{b}");
        prop_assert_eq!(slugify(&input), format!("{a}-{b}"));
    }
}
