use unicode_normalization::UnicodeNormalization;

use crate::types::{Overlap, WordId};
use crate::word_list::WordList;

/// Normalize a raw word-list entry: trim surrounding whitespace, decompose it (NFKD), drop any
/// combining marks left over from the decomposition, and upper-case the result. Grid rendering
/// prints words exactly as normalized here.
#[must_use]
pub fn normalize_entry(raw: &str) -> String {
    raw.trim()
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Can `word_id` sit in one variable while `other_word_id` sits in a variable it overlaps?
/// The shared cell has to agree, and the same word can't be used in two places. A word too short
/// to reach the shared cell is never compatible.
#[inline]
#[must_use]
pub fn is_compatible(
    word_list: &WordList,
    word_id: WordId,
    other_word_id: WordId,
    overlap: Overlap,
) -> bool {
    let letter = word_list.word(word_id).chars.get(overlap.index);
    word_id != other_word_id
        && letter.is_some()
        && letter == word_list.word(other_word_id).chars.get(overlap.other_index)
}

#[cfg(test)]
mod tests {
    use crate::types::Overlap;
    use crate::util::{is_compatible, normalize_entry};
    use crate::word_list::WordList;

    #[test]
    fn test_normalize_entry() {
        assert_eq!(normalize_entry("  cat \r"), "CAT");
        assert_eq!(normalize_entry("Café"), "CAFE");
        assert_eq!(normalize_entry("ﬁne"), "FINE");
        assert_eq!(normalize_entry("   "), "");
    }

    #[test]
    fn test_is_compatible() {
        let word_list = WordList::from_words(["cat", "ate", "dog"]);
        let cat = word_list.word_id("CAT").unwrap();
        let ate = word_list.word_id("ATE").unwrap();
        let dog = word_list.word_id("DOG").unwrap();

        let middles = Overlap {
            index: 1,
            other_index: 1,
        };
        let first_to_last = Overlap {
            index: 0,
            other_index: 2,
        };

        assert!(!is_compatible(&word_list, cat, ate, middles));
        assert!(is_compatible(&word_list, cat, ate, Overlap { index: 1, other_index: 0 }));
        assert!(!is_compatible(&word_list, dog, dog, middles));
        assert!(!is_compatible(&word_list, cat, dog, first_to_last));
        assert!(is_compatible(&word_list, ate, cat, Overlap { index: 0, other_index: 1 }));
    }

    #[test]
    fn test_is_compatible_with_short_word() {
        let word_list = WordList::from_words(["cat", "a"]);
        let cat = word_list.word_id("cat").unwrap();
        let a = word_list.word_id("a").unwrap();

        let middles = Overlap {
            index: 1,
            other_index: 1,
        };
        assert!(!is_compatible(&word_list, cat, a, middles));
        assert!(!is_compatible(&word_list, a, cat, middles));
    }
}
