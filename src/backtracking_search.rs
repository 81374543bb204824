//! This module implements grid-filling as a depth-first backtracking search over partial
//! assignments. Domains are first pruned with node consistency and AC-3; after that, each step
//! picks the unassigned variable with the fewest remaining candidates (breaking ties by degree),
//! tries its candidates in least-constraining-value order, and backtracks when a variable runs
//! out of consistent candidates.
//!
//! The search uses an explicit stack with one frame per assigned variable, so deep grids can't
//! exhaust the call stack. When look-ahead is enabled, each frame also owns a pruned copy of the
//! domains; the copy is dropped when the frame's choice is undone, so sibling branches never see
//! each other's eliminations.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use instant::Instant;

use crate::arc_consistency::{enforce_arc_consistency, enforce_node_consistency};
use crate::assignment::Assignment;
use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{VariableId, WordId};
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// How many states do we visit between checks of the deadline and the abort flag?
pub const INTERRUPT_FREQUENCY: usize = 10;

/// How do we choose between variables that are tied on both remaining values and degree?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Take the tied variable with the lowest id. Repeated solves of the same input always
    /// produce the same assignment.
    #[default]
    LowestId,

    /// Take a tied variable at random, using an RNG seeded with the given value. Repeated solves
    /// with the same seed produce the same assignment.
    Seeded(u64),
}

/// Knobs for a single solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    pub tie_break: TieBreak,

    /// Re-establish arc consistency after every tentative assignment, on a copy of the domains
    /// owned by that search branch. This only prunes the search; it never turns a solvable grid
    /// into an unsolvable one or vice versa.
    pub look_ahead: bool,

    /// Give up with `FillFailure::Timeout` once this much time has passed.
    pub timeout: Option<Duration>,

    /// Give up with `FillFailure::ExceededStateLimit` after visiting this many states.
    pub max_states: Option<usize>,

    /// Give up with `FillFailure::Abort` once this flag is set.
    pub abort: Option<&'a AtomicBool>,
}

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub node_consistency_removals: usize,
    pub arc_consistency_revisions: usize,
    pub arc_consistency_removals: usize,
    pub look_ahead_wipeouts: usize,
    pub total_time: Duration,
}

/// A struct representing the results of a successful fill.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// Every possibility was ruled out; the grid has no valid fill.
    HardFailure,

    /// The deadline passed before the search finished.
    Timeout,

    /// The abort flag was set before the search finished.
    Abort,

    /// The search visited more states than it was allowed to.
    ExceededStateLimit(usize),
}

impl FillFailure {
    /// Was the grid proven unfillable, as opposed to the search being cut short?
    #[must_use]
    pub fn is_unsolvable(&self) -> bool {
        matches!(self, FillFailure::HardFailure)
    }
}

/// One level of the search stack: the variable chosen at this depth, its candidates in the
/// order we'll try them, and how far through them we've gotten.
struct Frame {
    variable_id: VariableId,
    candidates: Vec<WordId>,
    next_candidate_idx: usize,
}

/// Choose the unassigned variable with the fewest remaining candidates, preferring variables
/// that cross more other variables when there's a tie. Returns `None` if every variable is
/// assigned.
pub fn select_unassigned_variable(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    rng: Option<&mut SmallRng>,
) -> Option<VariableId> {
    let priority =
        |variable_id: VariableId| (domains.len(variable_id), Reverse(config.degree(variable_id)));

    let best_priority = (0..config.variable_count())
        .filter(|&variable_id| !assignment.is_assigned(variable_id))
        .map(priority)
        .min()?;

    let tied: Vec<VariableId> = (0..config.variable_count())
        .filter(|&variable_id| {
            !assignment.is_assigned(variable_id) && priority(variable_id) == best_priority
        })
        .collect();

    match rng {
        Some(rng) => tied.choose(rng).copied(),
        None => tied.first().copied(),
    }
}

/// Order the candidates for `variable_id` so that the ones ruling out the fewest candidates from
/// unassigned crossing variables come first. Candidates that rule out the same number keep
/// their `WordId` order.
#[must_use]
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    variable_id: VariableId,
) -> Vec<WordId> {
    // For each unassigned neighbor, count how many of its candidates put each letter in the
    // shared cell.
    let neighbor_letter_counts: Vec<(VariableId, usize, usize, HashMap<char, usize>)> = config
        .crossings(variable_id)
        .iter()
        .filter(|&&(other_variable_id, _)| !assignment.is_assigned(other_variable_id))
        .map(|&(other_variable_id, overlap)| {
            let mut letter_counts: HashMap<char, usize> = HashMap::new();
            for &other_word_id in domains.options(other_variable_id) {
                *letter_counts
                    .entry(word_list.char_at(other_word_id, overlap.other_index))
                    .or_default() += 1;
            }
            (other_variable_id, overlap.index, overlap.other_index, letter_counts)
        })
        .collect();

    let ruled_out = |word_id: WordId| -> usize {
        neighbor_letter_counts
            .iter()
            .map(|(other_variable_id, index, other_index, letter_counts)| {
                let letter = word_list.char_at(word_id, *index);
                let mut compatible = letter_counts.get(&letter).copied().unwrap_or(0);
                if domains.contains(*other_variable_id, word_id)
                    && word_list.char_at(word_id, *other_index) == letter
                {
                    compatible -= 1;
                }
                domains.len(*other_variable_id) - compatible
            })
            .sum()
    };

    let mut candidates = domains.options(variable_id).to_vec();
    candidates.sort_by_cached_key(|&word_id| (ruled_out(word_id), word_id));
    candidates
}

/// Build the pruned domains for a branch where `variable_id` has just been given `word_id`, or
/// return `None` if that choice wipes out some domain.
fn look_ahead(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    variable_id: VariableId,
    word_id: WordId,
) -> Option<Domains> {
    let mut pruned = domains.clone();
    pruned.restrict_to(variable_id, word_id);

    for other_variable_id in 0..config.variable_count() {
        if other_variable_id == variable_id || assignment.is_assigned(other_variable_id) {
            continue;
        }
        if pruned.remove_word(other_variable_id, word_id) && pruned.is_empty(other_variable_id) {
            return None;
        }
    }

    let arcs = config
        .neighbors(variable_id)
        .filter(|&other_variable_id| !assignment.is_assigned(other_variable_id))
        .map(|other_variable_id| (other_variable_id, variable_id))
        .collect();

    enforce_arc_consistency(config, word_list, &mut pruned, Some(arcs))
        .ok()
        .map(|_| pruned)
}

/// Search for a complete, consistent assignment using the given domains, which must already be
/// node-consistent (every candidate has its variable's length).
pub fn search(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    options: &SearchOptions,
) -> Result<FillSuccess, FillFailure> {
    search_with_statistics(config, word_list, domains, options, Statistics::default(), Instant::now())
}

fn search_with_statistics(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    options: &SearchOptions,
    mut statistics: Statistics,
    start: Instant,
) -> Result<FillSuccess, FillFailure> {
    let deadline = options.timeout.map(|timeout| start + timeout);
    let mut rng: Option<SmallRng> = match options.tie_break {
        TieBreak::LowestId => None,
        TieBreak::Seeded(seed) => Some(SmallRng::seed_from_u64(seed)),
    };

    let mut assignment = Assignment::new(config.variable_count());
    let mut frames: Vec<Frame> = Vec::with_capacity(config.variable_count());

    // The bottom entry is the domains we were given. With look-ahead, every assigned variable
    // pushes its own pruned copy, which is popped when that assignment is undone.
    let mut domain_stack: Vec<Domains> = vec![domains.clone()];

    // Each pass through the outer loop is one state: pick a variable, then find the next
    // candidate that works for it (or for some shallower variable, after backtracking).
    'search: loop {
        if statistics.states % INTERRUPT_FREQUENCY == 0 {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(FillFailure::Timeout);
                }
            }
            if let Some(abort) = options.abort {
                if abort.load(Ordering::Relaxed) {
                    return Err(FillFailure::Abort);
                }
            }
        }

        statistics.states += 1;

        if let Some(max_states) = options.max_states {
            if statistics.states > max_states {
                return Err(FillFailure::ExceededStateLimit(statistics.states));
            }
        }

        let current_domains = domain_stack.last().unwrap_or(domains);

        let Some(variable_id) =
            select_unassigned_variable(config, current_domains, &assignment, rng.as_mut())
        else {
            // If there are no more variables to fill, we're done.
            if CHECK_INVARIANTS
                && !(assignment.is_complete(word_list) && assignment.is_consistent(config, word_list))
            {
                panic!("Search finished with an invalid assignment: {assignment:?}");
            }

            statistics.total_time = start.elapsed();
            return Ok(FillSuccess {
                statistics,
                assignment,
            });
        };

        frames.push(Frame {
            variable_id,
            candidates: order_domain_values(
                config,
                word_list,
                current_domains,
                &assignment,
                variable_id,
            ),
            next_candidate_idx: 0,
        });

        loop {
            let depth = frames.len();
            let Some(frame) = frames.last_mut() else {
                // We've run out of candidates for the first variable, so nothing works.
                return Err(FillFailure::HardFailure);
            };

            // If this frame already has a word, we're coming back because everything below it
            // failed, so undo it (and drop the domains that were pruned for it).
            if assignment.unassign(frame.variable_id).is_some() {
                statistics.backtracks += 1;
                if options.look_ahead {
                    domain_stack.pop();
                }
            }

            let mut chosen_word_id = None;
            while let Some(&word_id) = frame.candidates.get(frame.next_candidate_idx) {
                frame.next_candidate_idx += 1;

                if !assignment.is_consistent_with(config, word_list, frame.variable_id, word_id) {
                    continue;
                }

                if options.look_ahead {
                    let current_domains = domain_stack.last().unwrap_or(domains);
                    match look_ahead(
                        config,
                        word_list,
                        current_domains,
                        &assignment,
                        frame.variable_id,
                        word_id,
                    ) {
                        Some(pruned) => domain_stack.push(pruned),
                        None => {
                            statistics.look_ahead_wipeouts += 1;
                            continue;
                        }
                    }
                }

                chosen_word_id = Some(word_id);
                break;
            }

            if let Some(word_id) = chosen_word_id {
                log::trace!(
                    "Depth {depth}: variable {} = {}",
                    frame.variable_id,
                    word_list.word(word_id).normalized_string
                );
                assignment.assign(frame.variable_id, word_id);
                continue 'search;
            }

            // This variable has no candidates left, so backtrack to the previous one.
            frames.pop();
        }
    }
}

/// Fill the grid from scratch: give every variable the whole vocabulary, enforce node and arc
/// consistency, then search. A grid that can't be filled yields `FillFailure::HardFailure`.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: &SearchOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::full(config, word_list);
    statistics.node_consistency_removals =
        enforce_node_consistency(config, word_list, &mut domains);

    if let Some(variable_id) =
        (0..config.variable_count()).find(|&variable_id| domains.is_empty(variable_id))
    {
        log::debug!(
            "No words fit variable {variable_id} {}",
            config.variables[variable_id]
        );
        return Err(FillFailure::HardFailure);
    }

    // Establish initial arc consistency. If we can't even do that, we're obviously not going to
    // be able to find a fill.
    match enforce_arc_consistency(config, word_list, &mut domains, None) {
        Ok(success) => {
            statistics.arc_consistency_revisions = success.revisions;
            statistics.arc_consistency_removals = success.removals;
        }
        Err(failure) => {
            log::debug!(
                "Initial arc consistency failed at variable {}",
                failure.variable_id
            );
            return Err(FillFailure::HardFailure);
        }
    }

    let result = search_with_statistics(config, word_list, &domains, options, statistics, start);

    match &result {
        Ok(success) => log::debug!("Found fill: {:?}", success.statistics),
        Err(failure) => log::debug!("Fill failed: {failure:?}"),
    }

    result
}
