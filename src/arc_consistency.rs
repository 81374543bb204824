//! This module contains the consistency engine that prunes domains before (and optionally
//! during) the search. Two kinds of consistency are enforced:
//!
//! - Node consistency: every candidate for a variable has exactly the variable's length.
//!
//! - Arc consistency: for every pair of crossing variables `x` and `y`, every candidate for `x`
//!   has at least one candidate for `y` that puts the same letter in the shared cell and isn't
//!   the same word (since one word can't fill two slots). This is the AC-3 algorithm: a
//!   worklist of directed arcs is processed until no more eliminations are possible, or until
//!   some domain is wiped out.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{DirectedArc, VariableId, WordId};
use crate::word_list::WordList;

/// Result from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many calls to `revise` removed at least one candidate.
    pub revisions: usize,

    /// How many candidates were removed in total.
    pub removals: usize,
}

/// Result from a failed call to `enforce_arc_consistency`: the domain of `variable_id` was
/// wiped out, so no complete assignment can exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub variable_id: VariableId,
}

/// Result from a call to `enforce_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every candidate whose length differs from its variable's length. Returns the number
/// of candidates removed. Running this twice is the same as running it once.
pub fn enforce_node_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
) -> usize {
    let removed: usize = config
        .variables
        .iter()
        .enumerate()
        .map(|(variable_id, variable)| {
            domains.retain(variable_id, |&word_id| {
                word_list.word_len(word_id) == variable.length
            })
        })
        .sum();

    log::debug!("Node consistency removed {removed} candidates");

    removed
}

/// Make `x` arc-consistent with `y`, removing every candidate for `x` that has no compatible
/// candidate for `y`. Returns whether anything was removed. If the variables don't cross, this
/// is a no-op.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: VariableId,
    y: VariableId,
) -> bool {
    revise_counting(config, word_list, domains, x, y) > 0
}

/// Like `revise`, but returns how many candidates were removed.
fn revise_counting(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: VariableId,
    y: VariableId,
) -> usize {
    let Some(overlap) = config.overlap(x, y) else {
        return 0;
    };

    // Count how many of `y`'s candidates put each letter in the shared cell, so each candidate
    // for `x` can be checked in constant time.
    let mut support_counts: HashMap<char, usize> = HashMap::new();
    for &other_word_id in domains.options(y) {
        if let Some(letter) = letter_at(word_list, other_word_id, overlap.other_index) {
            *support_counts.entry(letter).or_default() += 1;
        }
    }

    let unsupported: Vec<WordId> = domains
        .options(x)
        .iter()
        .copied()
        .filter(|&word_id| {
            let Some(letter) = letter_at(word_list, word_id, overlap.index) else {
                return true;
            };
            let matching = support_counts.get(&letter).copied().unwrap_or(0);

            // If this very word is one of `y`'s matching candidates, it can't count as its own
            // support.
            let matches_itself = domains.contains(y, word_id)
                && letter_at(word_list, word_id, overlap.other_index) == Some(letter);

            matching <= usize::from(matches_itself)
        })
        .collect();

    if unsupported.is_empty() {
        return 0;
    }

    log::trace!(
        "Revising ({x}, {y}) removed {} of {} candidates",
        unsupported.len(),
        domains.len(x)
    );

    domains.retain(x, |word_id| unsupported.binary_search(word_id).is_err())
}

fn letter_at(word_list: &WordList, word_id: WordId, cell_idx: usize) -> Option<char> {
    word_list.word(word_id).chars.get(cell_idx).copied()
}

/// Establish arc consistency over `domains` using AC-3. If `arcs` is `None`, the worklist
/// starts with every directed arc between crossing variables; otherwise it starts with the
/// given arcs only. Fails as soon as any domain becomes empty.
pub fn enforce_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<DirectedArc>>,
) -> ArcConsistencyResult {
    let initial_arcs = arcs.unwrap_or_else(|| config.all_arcs());

    let mut queued: HashSet<DirectedArc> = HashSet::with_capacity(initial_arcs.len());
    let mut worklist: VecDeque<DirectedArc> = VecDeque::with_capacity(initial_arcs.len());
    for arc in initial_arcs {
        if queued.insert(arc) {
            worklist.push_back(arc);
        }
    }

    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = worklist.pop_front() {
        queued.remove(&(x, y));

        let removed = revise_counting(config, word_list, domains, x, y);
        if removed == 0 {
            continue;
        }

        success.revisions += 1;
        success.removals += removed;

        if domains.is_empty(x) {
            log::debug!("Arc consistency wiped out the domain of variable {x}");
            return Err(ArcConsistencyFailure { variable_id: x });
        }

        // Shrinking `x` may have taken away the only support some candidate of another
        // neighbor had, so those neighbors need to be checked against `x` again.
        for z in config.neighbors(x) {
            if z != y && queued.insert((z, x)) {
                worklist.push_back((z, x));
            }
        }
    }

    log::debug!(
        "Arc consistency made {} revisions, removing {} candidates",
        success.revisions,
        success.removals
    );

    Ok(success)
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{
        enforce_arc_consistency, enforce_node_consistency, revise, ArcConsistencyFailure,
    };
    use crate::domains::Domains;
    use crate::grid_config::{generate_grid_config_from_template_string, GridConfig};
    use crate::types::{Direction, Overlap, Variable};
    use crate::util::is_compatible;
    use crate::word_list::tests::test_word_list;
    use crate::word_list::WordList;
    use indoc::indoc;

    fn ring_config() -> GridConfig {
        generate_grid_config_from_template_string(indoc! {"
            ___
            _#_
            ___
        "})
        .unwrap()
    }

    fn node_consistent_domains(config: &GridConfig, word_list: &WordList) -> Domains {
        let mut domains = Domains::full(config, word_list);
        enforce_node_consistency(config, word_list, &mut domains);
        domains
    }

    fn assert_arc_consistent(config: &GridConfig, word_list: &WordList, domains: &Domains) {
        for (x, y) in config.all_arcs() {
            let overlap = config.overlap(x, y).unwrap();
            for &word_id in domains.options(x) {
                assert!(
                    domains
                        .options(y)
                        .iter()
                        .any(|&other_word_id| is_compatible(
                            word_list,
                            word_id,
                            other_word_id,
                            overlap
                        )),
                    "{} in variable {x} has no support in variable {y}",
                    word_list.word(word_id).normalized_string,
                );
            }
        }
    }

    #[test]
    fn test_node_consistency() {
        let config = generate_grid_config_from_template_string(indoc! {"
            ____
            #__#
        "})
        .unwrap();
        let word_list = WordList::from_words(["be", "bee", "beet", "on", "onto"]);
        let mut domains = Domains::full(&config, &word_list);

        let removed = enforce_node_consistency(&config, &word_list, &mut domains);

        for (variable_id, variable) in config.variables.iter().enumerate() {
            for &word_id in domains.options(variable_id) {
                assert_eq!(word_list.word_len(word_id), variable.length);
            }
        }
        assert_eq!(removed, 20 - domains.total_len());

        let after_first = domains.clone();
        assert_eq!(enforce_node_consistency(&config, &word_list, &mut domains), 0);
        assert_eq!(domains, after_first);
    }

    #[test]
    fn test_revise_without_overlap_is_noop() {
        let config = generate_grid_config_from_template_string(indoc! {"
            ___
            ###
            ___
        "})
        .unwrap();
        let word_list = test_word_list();
        let mut domains = node_consistent_domains(&config, &word_list);
        let before = domains.clone();

        assert!(!revise(&config, &word_list, &mut domains, 0, 1));
        assert_eq!(domains, before);
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let config = ring_config();
        let word_list = WordList::from_words(["cat", "cot", "ace", "oat"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        // Variable 0 is the top row and variable 1 is the left column; they share their first
        // letter.
        assert_eq!(config.variables[0], Variable::new(0, 0, Direction::Across, 3));
        assert_eq!(config.variables[1], Variable::new(0, 0, Direction::Down, 3));

        domains.restrict_to(1, word_list.word_id("oat").unwrap());
        assert!(revise(&config, &word_list, &mut domains, 0, 1));
        assert!(!revise(&config, &word_list, &mut domains, 0, 1));

        // Only words starting with O could be supported, and OAT is taken by variable 1.
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_revise_rejects_identical_support() {
        let config = GridConfig::from_parts(
            3,
            3,
            vec![
                Variable::new(0, 0, Direction::Across, 3),
                Variable::new(0, 0, Direction::Down, 3),
            ],
            &[(
                0,
                1,
                Overlap {
                    index: 0,
                    other_index: 0,
                },
            )],
        )
        .unwrap();
        let word_list = WordList::from_words(["eve", "ewe"]);
        let eve = word_list.word_id("eve").unwrap();
        let ewe = word_list.word_id("ewe").unwrap();

        let mut domains = Domains::from_options(vec![vec![eve, ewe], vec![eve]]);

        assert!(revise(&config, &word_list, &mut domains, 0, 1));
        assert_eq!(domains.options(0), &[ewe]);
    }

    #[test]
    fn test_arc_consistency_reaches_fixpoint() {
        let config = ring_config();
        let word_list = test_word_list();
        let mut domains = node_consistent_domains(&config, &word_list);
        let before = domains.clone();

        let success = enforce_arc_consistency(&config, &word_list, &mut domains, None)
            .expect("ring grid should be arc-consistent");

        assert_arc_consistent(&config, &word_list, &domains);
        assert_eq!(success.removals, before.total_len() - domains.total_len());

        // Domains never grow.
        for variable_id in 0..config.variable_count() {
            assert!(domains
                .options(variable_id)
                .iter()
                .all(|&word_id| before.contains(variable_id, word_id)));
        }

        // Running again changes nothing.
        let after_first = domains.clone();
        let second = enforce_arc_consistency(&config, &word_list, &mut domains, None).unwrap();
        assert_eq!(second.revisions, 0);
        assert_eq!(domains, after_first);
    }

    #[test]
    fn test_arc_consistency_propagates_along_chains() {
        // Three slots in a zigzag: 0 crosses 1, and 1 crosses 2, but 0 and 2 don't cross.
        let config = generate_grid_config_from_template_string(indoc! {"
            ___##
            #_###
            #___#
        "})
        .unwrap();
        assert_eq!(config.variable_count(), 3);

        let word_list = WordList::from_words(["bad", "box", "art", "oak", "toe", "key"]);
        let mut domains = node_consistent_domains(&config, &word_list);
        enforce_arc_consistency(&config, &word_list, &mut domains, None).unwrap();

        let (top, down, bottom) = (0, 1, 2);
        assert_eq!(config.neighbors(top).collect::<Vec<_>>(), vec![down]);
        assert_eq!(config.neighbors(bottom).collect::<Vec<_>>(), vec![down]);
        assert_eq!(domains.len(bottom), 2);

        // Fixing the top slot should reach the bottom slot through the middle one, even though
        // the worklist only starts with the arc pointing at the top slot.
        domains.restrict_to(top, word_list.word_id("bad").unwrap());
        enforce_arc_consistency(&config, &word_list, &mut domains, Some(vec![(down, top)]))
            .unwrap();

        assert_eq!(domains.options(down), &[word_list.word_id("art").unwrap()]);
        assert_eq!(domains.options(bottom), &[word_list.word_id("toe").unwrap()]);
        assert_arc_consistent(&config, &word_list, &domains);
    }

    #[test]
    fn test_arc_consistency_failure() {
        let config = ring_config();
        let word_list = WordList::from_words(["abc", "def", "ghi", "jkl"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        let result = enforce_arc_consistency(&config, &word_list, &mut domains, None);

        let Err(ArcConsistencyFailure { variable_id }) = result else {
            panic!("expected a domain wipeout, got {result:?}");
        };
        assert!(domains.is_empty(variable_id));
    }
}
