//! The domain store: the candidate words still available to each variable.

use crate::grid_config::GridConfig;
use crate::types::{VariableId, WordId};
use crate::word_list::WordList;

/// Per-variable candidate lists. Each list is kept in ascending `WordId` order, and the only
/// ways to change a list are to remove words from it, so domains never grow. Search branches
/// that want to prune further take a `clone()` and throw it away when they backtrack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<Vec<WordId>>,
}

impl Domains {
    /// Give every variable the full vocabulary.
    #[must_use]
    pub fn full(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_word_ids: Vec<WordId> = (0..word_list.len()).collect();
        Domains {
            options: vec![all_word_ids; config.variable_count()],
        }
    }

    /// Build domains from explicit candidate lists.
    #[must_use]
    pub fn from_options(mut options: Vec<Vec<WordId>>) -> Domains {
        for variable_options in &mut options {
            variable_options.sort_unstable();
            variable_options.dedup();
        }
        Domains { options }
    }

    #[must_use]
    pub fn options(&self, variable_id: VariableId) -> &[WordId] {
        &self.options[variable_id]
    }

    #[must_use]
    pub fn len(&self, variable_id: VariableId) -> usize {
        self.options[variable_id].len()
    }

    #[must_use]
    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.options[variable_id].is_empty()
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.options.len()
    }

    /// The total number of candidates across all variables.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.options.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.options[variable_id].binary_search(&word_id).is_ok()
    }

    /// Keep only the candidates matching `keep`, returning how many were removed.
    pub fn retain<F>(&mut self, variable_id: VariableId, keep: F) -> usize
    where
        F: FnMut(&WordId) -> bool,
    {
        let before = self.options[variable_id].len();
        self.options[variable_id].retain(keep);
        before - self.options[variable_id].len()
    }

    /// Remove a single candidate, returning whether it was present.
    pub fn remove_word(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        match self.options[variable_id].binary_search(&word_id) {
            Ok(idx) => {
                self.options[variable_id].remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Narrow a domain down to a single word. If the word wasn't a candidate, the domain ends up
    /// empty.
    pub fn restrict_to(&mut self, variable_id: VariableId, word_id: WordId) {
        self.retain(variable_id, |&candidate| candidate == word_id);
    }
}
