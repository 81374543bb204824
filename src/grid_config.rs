//! The structural model of a puzzle: which cells are open, which variables (slots) exist, and
//! where pairs of variables cross. Everything here is computed once before solving and is only
//! read afterwards.

use smallvec::SmallVec;
use std::collections::HashMap;

use crate::assignment::Assignment;
use crate::types::{Direction, Overlap, Variable, VariableId};
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// Characters that mark an open cell in a template; anything else is a blocked cell.
pub const OPEN_CELL_CHARS: [char; 2] = ['_', '.'];

/// How a blocked cell is drawn by `render_grid`.
pub const BLOCKED_CELL_GLYPH: char = '█';

/// The neighbors of a single variable, along with where each one crosses it. A slot can't have
/// more crossings than it has cells.
pub type Crossings = SmallVec<[(VariableId, Overlap); MAX_SLOT_LENGTH]>;

/// Structural problems with a puzzle description. These are reported before any solving
/// starts, since node consistency and overlap checks aren't well-defined without a valid model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("Grid must have at least one row")]
    EmptyGrid,

    #[error("Variable {variable_id} has zero length")]
    ZeroLength { variable_id: VariableId },

    #[error("Variable {variable_id} extends outside the {width}x{height} grid")]
    OutOfBounds {
        variable_id: VariableId,
        width: usize,
        height: usize,
    },

    #[error("Variable {variable_id} is a duplicate of variable {other_variable_id}")]
    DuplicateVariable {
        variable_id: VariableId,
        other_variable_id: VariableId,
    },

    #[error("Variables {variable_id} and {other_variable_id} run in the same direction through a shared cell")]
    CollidingVariables {
        variable_id: VariableId,
        other_variable_id: VariableId,
    },

    #[error("Overlap refers to unknown variable {variable_id}")]
    UnknownVariable { variable_id: VariableId },

    #[error("Variable {variable_id} can't overlap itself")]
    SelfOverlap { variable_id: VariableId },

    #[error("Overlap index {index} is out of bounds for variable {variable_id} of length {length}")]
    OverlapIndexOutOfBounds {
        variable_id: VariableId,
        index: usize,
        length: usize,
    },

    #[error("Variables {variable_id} and {other_variable_id} have conflicting overlaps")]
    ConflictingOverlap {
        variable_id: VariableId,
        other_variable_id: VariableId,
    },
}

/// A validated structural model.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Row-major flags for whether each cell is open.
    pub open_cells: Vec<bool>,

    pub variables: Vec<Variable>,

    /// For each variable, the other variables it crosses. Symmetric: if `y` appears in `x`'s
    /// list with overlap `o`, `x` appears in `y`'s list with `o.flipped()`.
    crossings: Vec<Crossings>,
}

impl GridConfig {
    /// Build a model from variable geometry, deriving the overlap relation from shared cells.
    pub fn from_variables(
        width: usize,
        height: usize,
        variables: Vec<Variable>,
    ) -> Result<GridConfig, StructureError> {
        validate_variables(width, height, &variables)?;

        let mut occupant_by_cell: HashMap<(Direction, usize, usize), (VariableId, usize)> =
            HashMap::new();
        let mut crossings: Vec<Crossings> = vec![SmallVec::new(); variables.len()];

        for (variable_id, variable) in variables.iter().enumerate() {
            for (cell_idx, (row, col)) in variable.cells().enumerate() {
                if let Some(&(other_variable_id, _)) =
                    occupant_by_cell.get(&(variable.direction, row, col))
                {
                    return Err(StructureError::CollidingVariables {
                        variable_id,
                        other_variable_id,
                    });
                }
                occupant_by_cell.insert((variable.direction, row, col), (variable_id, cell_idx));
            }
        }

        for (variable_id, variable) in variables.iter().enumerate() {
            if variable.direction != Direction::Across {
                continue;
            }
            for (cell_idx, (row, col)) in variable.cells().enumerate() {
                if let Some(&(other_variable_id, other_cell_idx)) =
                    occupant_by_cell.get(&(Direction::Down, row, col))
                {
                    let overlap = Overlap {
                        index: cell_idx,
                        other_index: other_cell_idx,
                    };
                    crossings[variable_id].push((other_variable_id, overlap));
                    crossings[other_variable_id].push((variable_id, overlap.flipped()));
                }
            }
        }

        for variable_crossings in &mut crossings {
            variable_crossings.sort_by_key(|&(other_variable_id, _)| other_variable_id);
        }

        Ok(GridConfig {
            width,
            height,
            open_cells: build_open_cells(width, height, &variables),
            variables,
            crossings,
        })
    }

    /// Build a model from variable geometry plus an overlap relation computed elsewhere. Each
    /// overlap may be given from either side (or both, as long as they agree).
    pub fn from_parts(
        width: usize,
        height: usize,
        variables: Vec<Variable>,
        overlaps: &[(VariableId, VariableId, Overlap)],
    ) -> Result<GridConfig, StructureError> {
        validate_variables(width, height, &variables)?;

        let mut crossings: Vec<Crossings> = vec![SmallVec::new(); variables.len()];

        for &(variable_id, other_variable_id, overlap) in overlaps {
            for id in [variable_id, other_variable_id] {
                if id >= variables.len() {
                    return Err(StructureError::UnknownVariable { variable_id: id });
                }
            }
            if variable_id == other_variable_id {
                return Err(StructureError::SelfOverlap { variable_id });
            }
            for (id, index) in [
                (variable_id, overlap.index),
                (other_variable_id, overlap.other_index),
            ] {
                if index >= variables[id].length {
                    return Err(StructureError::OverlapIndexOutOfBounds {
                        variable_id: id,
                        index,
                        length: variables[id].length,
                    });
                }
            }

            let existing = crossings[variable_id]
                .iter()
                .find(|&&(id, _)| id == other_variable_id)
                .map(|&(_, existing)| existing);

            match existing {
                Some(existing) if existing == overlap => {}
                Some(_) => {
                    return Err(StructureError::ConflictingOverlap {
                        variable_id,
                        other_variable_id,
                    });
                }
                None => {
                    crossings[variable_id].push((other_variable_id, overlap));
                    crossings[other_variable_id].push((variable_id, overlap.flipped()));
                }
            }
        }

        for variable_crossings in &mut crossings {
            variable_crossings.sort_by_key(|&(other_variable_id, _)| other_variable_id);
        }

        Ok(GridConfig {
            width,
            height,
            open_cells: build_open_cells(width, height, &variables),
            variables,
            crossings,
        })
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// The overlap between `variable_id` and `other_variable_id`, from the former's side.
    #[must_use]
    pub fn overlap(&self, variable_id: VariableId, other_variable_id: VariableId) -> Option<Overlap> {
        self.crossings[variable_id]
            .iter()
            .find(|&&(id, _)| id == other_variable_id)
            .map(|&(_, overlap)| overlap)
    }

    /// All variables crossing `variable_id`, with the overlap seen from `variable_id`'s side.
    #[must_use]
    pub fn crossings(&self, variable_id: VariableId) -> &[(VariableId, Overlap)] {
        &self.crossings[variable_id]
    }

    pub fn neighbors(&self, variable_id: VariableId) -> impl Iterator<Item = VariableId> + '_ {
        self.crossings[variable_id].iter().map(|&(id, _)| id)
    }

    /// How many other variables cross this one.
    #[must_use]
    pub fn degree(&self, variable_id: VariableId) -> usize {
        self.crossings[variable_id].len()
    }

    /// Every ordered pair of overlapping variables.
    #[must_use]
    pub fn all_arcs(&self) -> Vec<(VariableId, VariableId)> {
        (0..self.variables.len())
            .flat_map(|variable_id| {
                self.neighbors(variable_id)
                    .map(move |other_variable_id| (variable_id, other_variable_id))
            })
            .collect()
    }

    #[must_use]
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.open_cells[row * self.width + col]
    }

    /// The letters placed by an assignment, indexed by `[row][col]`. Cells that are blocked or
    /// not covered by an assigned variable are `None`.
    #[must_use]
    pub fn letter_grid(&self, word_list: &WordList, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; self.width]; self.height];

        for (variable_id, word_id) in assignment.iter() {
            let word = word_list.word(word_id);
            for ((row, col), &letter) in self.variables[variable_id].cells().zip(word.chars.iter()) {
                letters[row][col] = Some(letter);
            }
        }

        letters
    }
}

fn validate_variables(
    width: usize,
    height: usize,
    variables: &[Variable],
) -> Result<(), StructureError> {
    let mut variable_id_by_variable: HashMap<Variable, VariableId> = HashMap::new();

    for (variable_id, variable) in variables.iter().enumerate() {
        if variable.length == 0 {
            return Err(StructureError::ZeroLength { variable_id });
        }

        let (row_step, col_step) = variable.direction.step();
        let last_row = variable.row + (variable.length - 1) * row_step;
        let last_col = variable.col + (variable.length - 1) * col_step;
        if last_row >= height || last_col >= width {
            return Err(StructureError::OutOfBounds {
                variable_id,
                width,
                height,
            });
        }

        if let Some(&other_variable_id) = variable_id_by_variable.get(variable) {
            return Err(StructureError::DuplicateVariable {
                variable_id,
                other_variable_id,
            });
        }
        variable_id_by_variable.insert(*variable, variable_id);
    }

    Ok(())
}

fn build_open_cells(width: usize, height: usize, variables: &[Variable]) -> Vec<bool> {
    let mut open_cells = vec![false; width * height];
    for variable in variables {
        for (row, col) in variable.cells() {
            open_cells[row * width + col] = true;
        }
    }
    open_cells
}

/// Parse a template where each line is a row, `_` or `.` marks an open cell, and anything else
/// is blocked. Surrounding whitespace on each line is ignored, and short rows are padded with
/// blocked cells. Every maximal run of two or more open cells (across or down) becomes a
/// variable.
pub fn generate_grid_config_from_template_string(
    template: &str,
) -> Result<GridConfig, StructureError> {
    let rows: Vec<Vec<bool>> = template
        .trim()
        .lines()
        .map(|line| line.trim().chars().map(|c| OPEN_CELL_CHARS.contains(&c)).collect())
        .collect();

    let height = rows.len();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(StructureError::EmptyGrid);
    }

    let is_open = |row: usize, col: usize| rows[row].get(col).copied().unwrap_or(false);

    let run_length = |row: usize, col: usize, direction: Direction| {
        let (row_step, col_step) = direction.step();
        (0..)
            .take_while(|&idx| {
                let (r, c) = (row + idx * row_step, col + idx * col_step);
                r < height && c < width && is_open(r, c)
            })
            .count()
    };

    let mut variables = vec![];
    for row in 0..height {
        for col in 0..width {
            if !is_open(row, col) {
                continue;
            }

            if col == 0 || !is_open(row, col - 1) {
                let length = run_length(row, col, Direction::Across);
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Across, length));
                }
            }

            if row == 0 || !is_open(row - 1, col) {
                let length = run_length(row, col, Direction::Down);
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Down, length));
                }
            }
        }
    }

    let mut config = GridConfig::from_variables(width, height, variables)?;

    // Open cells that don't belong to any slot still need to render as open.
    for (row, row_cells) in rows.iter().enumerate() {
        for (col, &open) in row_cells.iter().enumerate() {
            if open {
                config.open_cells[row * width + col] = true;
            }
        }
    }

    log::debug!(
        "Parsed {}x{} grid with {} variables",
        width,
        height,
        config.variables.len()
    );

    Ok(config)
}

/// Render an assignment as text, one line per row. Blocked cells are drawn as
/// `BLOCKED_CELL_GLYPH` and open cells without a letter as a space.
#[must_use]
pub fn render_grid(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> String {
    let letters = config.letter_grid(word_list, assignment);

    letters
        .iter()
        .enumerate()
        .map(|(row, row_letters)| {
            row_letters
                .iter()
                .enumerate()
                .map(|(col, letter)| {
                    if config.is_open(row, col) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCKED_CELL_GLYPH
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
