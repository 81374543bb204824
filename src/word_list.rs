//! Loading and indexing of the vocabulary that slots are filled from.
//!
//! A word list is read from one-word-per-line text, either from a file on disk or from contents
//! that were fetched some other way (which is what the WebAssembly entry point does). Entries are
//! normalized with `util::normalize_entry`, blank lines are skipped, and duplicates are collapsed.
//! The surviving words are sorted so that word ids, and therefore the order in which the search
//! tries candidates, don't depend on the order of lines in the source.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::WordId;
use crate::util::normalize_entry;
use crate::MAX_SLOT_LENGTH;

/// A single normalized vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub normalized_string: String,

    /// The entry split into characters, so that overlap checks can index by position instead of
    /// walking UTF-8 bytes.
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(normalized_string: String) -> Word {
        let chars = normalized_string.chars().collect();
        Word {
            normalized_string,
            chars,
        }
    }

    /// The length of the word in characters (not bytes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WordListError {
    #[error("Failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The full vocabulary, indexed by `WordId`.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    pub words: Vec<Word>,
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Build a word list from individual entries.
    pub fn from_words<I, S>(entries: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = entries
            .into_iter()
            .map(|entry| normalize_entry(entry.as_ref()))
            .filter(|entry| !entry.is_empty())
            .collect();

        normalized.sort();
        normalized.dedup();

        let word_id_by_string = normalized
            .iter()
            .enumerate()
            .map(|(word_id, string)| (string.clone(), word_id))
            .collect();

        let words = normalized.into_iter().map(Word::new).collect();

        WordList {
            words,
            word_id_by_string,
        }
    }

    /// Build a word list from file contents with one entry per line.
    #[must_use]
    pub fn from_str_contents(contents: &str) -> WordList {
        WordList::from_words(contents.lines())
    }

    /// Read a word list from a file with one entry per line.
    pub fn from_dict_file(path: &Path) -> Result<WordList, WordListError> {
        let contents = fs::read_to_string(path).map_err(|source| WordListError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let word_list = WordList::from_str_contents(&contents);
        log::debug!(
            "Loaded {} distinct words from {}",
            word_list.len(),
            path.display()
        );

        Ok(word_list)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up the id of an entry, normalizing it first.
    #[must_use]
    pub fn word_id(&self, entry: &str) -> Option<WordId> {
        self.word_id_by_string.get(&normalize_entry(entry)).copied()
    }

    #[must_use]
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    #[must_use]
    pub fn word_len(&self, word_id: WordId) -> usize {
        self.words[word_id].len()
    }

    #[inline]
    #[must_use]
    pub fn char_at(&self, word_id: WordId, cell_idx: usize) -> char {
        self.words[word_id].chars[cell_idx]
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{WordList, WordListError};
    use indoc::indoc;
    use std::io::Write;
    use std::path::Path;

    /// A small dictionary shared by tests in other modules.
    pub const TEST_WORDS: &str = indoc! {"
        cat
        ate
        dog
        tea
        eat
        act
        tab
        bat
        oat
        toe
        ode
        dot
        cot
        tad
        ace
        bee
        ebb
        are
        era
        ear
        tar
        rat
        art
        sea
        sat
        set
        tee
        one
        ten
        net
        nod
        don
    "};

    #[must_use]
    pub fn test_word_list() -> WordList {
        WordList::from_str_contents(TEST_WORDS)
    }

    #[test]
    fn test_from_str_contents_normalizes_and_dedupes() {
        let word_list = WordList::from_str_contents(indoc! {"
            cat
            CAT

              dog
            Cat
            éclair
        "});

        assert_eq!(word_list.len(), 3);
        assert_eq!(
            word_list
                .words
                .iter()
                .map(|word| word.normalized_string.as_str())
                .collect::<Vec<_>>(),
            vec!["CAT", "DOG", "ECLAIR"]
        );
        assert_eq!(word_list.word_id("cat"), Some(0));
        assert_eq!(word_list.word_id("Dog"), Some(1));
        assert_eq!(word_list.word_id("bird"), None);
    }

    #[test]
    fn test_word_ids_ignore_source_order() {
        let forward = WordList::from_words(["ant", "bee", "cow"]);
        let backward = WordList::from_words(["cow", "bee", "ant"]);

        assert_eq!(forward.word_id_by_string, backward.word_id_by_string);
    }

    #[test]
    fn test_lengths_count_chars_not_bytes() {
        let word_list = WordList::from_words(["ñandu"]);
        let word_id = word_list.word_id("ñandu").unwrap();

        assert_eq!(word_list.word_len(word_id), 5);
        assert_eq!(word_list.char_at(word_id, 1), 'A');
    }

    #[test]
    fn test_from_dict_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tea").unwrap();
        writeln!(file, "eat").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "ate").unwrap();

        let word_list = WordList::from_dict_file(file.path()).unwrap();

        assert_eq!(word_list.len(), 3);
        assert!(word_list.word_id("eat").is_some());
    }

    #[test]
    fn test_from_dict_file_missing() {
        let result = WordList::from_dict_file(Path::new("/definitely/not/a/word/list.txt"));

        assert!(matches!(result, Err(WordListError::Io { .. })));
    }
}
