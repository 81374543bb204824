//! Partial and complete mappings from variables to chosen words.

use std::collections::{BTreeMap, HashSet};

use crate::grid_config::GridConfig;
use crate::types::{Variable, VariableId, WordId};
use crate::util::is_compatible;
use crate::word_list::WordList;

/// A (possibly partial) assignment of words to variables, stored densely by `VariableId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a puzzle with `variable_count` variables.
    #[must_use]
    pub fn new(variable_count: usize) -> Assignment {
        Assignment {
            word_ids: vec![None; variable_count],
            assigned_count: 0,
        }
    }

    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.word_ids[variable_id]
    }

    #[must_use]
    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.word_ids[variable_id].is_some()
    }

    pub fn assign(&mut self, variable_id: VariableId, word_id: WordId) {
        if self.word_ids[variable_id].replace(word_id).is_none() {
            self.assigned_count += 1;
        }
    }

    /// Remove the word assigned to `variable_id`, if any, returning it.
    pub fn unassign(&mut self, variable_id: VariableId) -> Option<WordId> {
        let previous = self.word_ids[variable_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    /// How many variables currently have a word.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Iterate over `(variable_id, word_id)` for assigned variables, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, WordId)> + '_ {
        self.word_ids
            .iter()
            .enumerate()
            .filter_map(|(variable_id, word_id)| word_id.map(|word_id| (variable_id, word_id)))
    }

    /// Does every variable have a word drawn from the vocabulary?
    #[must_use]
    pub fn is_complete(&self, word_list: &WordList) -> bool {
        self.word_ids
            .iter()
            .all(|word_id| word_id.is_some_and(|word_id| word_id < word_list.len()))
    }

    /// Check that assigning `word_id` to `variable_id` agrees with everything already assigned:
    /// the length matches, no other variable holds the same word, and every crossing with an
    /// assigned variable shares the same letter. Assumes the rest of the assignment is already
    /// consistent.
    #[must_use]
    pub fn is_consistent_with(
        &self,
        config: &GridConfig,
        word_list: &WordList,
        variable_id: VariableId,
        word_id: WordId,
    ) -> bool {
        if word_list.word_len(word_id) != config.variables[variable_id].length {
            return false;
        }

        if self
            .iter()
            .any(|(other_variable_id, other_word_id)| {
                other_variable_id != variable_id && other_word_id == word_id
            })
        {
            return false;
        }

        config
            .crossings(variable_id)
            .iter()
            .all(|&(other_variable_id, overlap)| match self.get(other_variable_id) {
                Some(other_word_id) => is_compatible(word_list, word_id, other_word_id, overlap),
                None => true,
            })
    }

    /// Check the whole assignment from scratch. Lengths are checked for every variable before
    /// any crossing letters are compared.
    #[must_use]
    pub fn is_consistent(&self, config: &GridConfig, word_list: &WordList) -> bool {
        if self.iter().any(|(variable_id, word_id)| {
            word_list.word_len(word_id) != config.variables[variable_id].length
        }) {
            return false;
        }

        let mut used = HashSet::with_capacity(self.assigned_count);

        for (variable_id, word_id) in self.iter() {
            if !used.insert(word_id) {
                return false;
            }
            for &(other_variable_id, overlap) in config.crossings(variable_id) {
                if let Some(other_word_id) = self.get(other_variable_id) {
                    if !is_compatible(word_list, word_id, other_word_id, overlap) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Resolve the assignment into variables and their words.
    #[must_use]
    pub fn to_words(&self, config: &GridConfig, word_list: &WordList) -> BTreeMap<Variable, String> {
        self.iter()
            .map(|(variable_id, word_id)| {
                (
                    config.variables[variable_id],
                    word_list.word(word_id).normalized_string.clone(),
                )
            })
            .collect()
    }
}
