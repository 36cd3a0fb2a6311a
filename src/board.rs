use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array2;
use strum::VariantArray;

use crate::cell::Cell;
use crate::location::Location;
use crate::puzzle::{ParseError, Puzzle};
use crate::shape::Step;
use crate::solution::Solution;

/// A solved puzzle drawn as a grid of [`Cell`]s.
///
/// Printed with [`Display`], each row goes on its own line with cells separated by single spaces. Islands keep
/// their number, empty cells are `0`, and each cell a bridge passes over shows one of `-`, `=` (one or two
/// horizontal bridges) or `|`, `$` (one or two vertical bridges).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// Draw `solution` over the islands of `puzzle`.
    pub fn render(puzzle: &Puzzle, solution: &Solution) -> Self {
        let mut cells = puzzle.grid().map(|required| match *required {
            0 => Cell::Empty,
            required => Cell::Island { required },
        });

        for placed in solution.bridges() {
            for location in puzzle.bridges()[placed.id].span() {
                cells[location.as_index()] = Cell::Bridge { orientation: placed.orientation, count: placed.count };
            }
        }

        Self { cells }
    }

    /// The cells, indexed by `(row, column)`.
    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Count the bridge ends at each island from the symbols drawn next to it, islands in row-major order.
    ///
    /// Islands placed directly next to each other have no cell between them to draw on, so bridges between them
    /// are not seen here.
    pub fn island_counts(&self) -> Vec<usize> {
        self.cells.indexed_iter()
            .filter(|(_, cell)| matches!(cell, Cell::Island { .. }))
            .map(|(index, _)| {
                let location = Location::from(index);
                Step::VARIANTS.iter()
                    .filter_map(|step| match self.cells.get(step.attempt_from(location).as_index()) {
                        Some(Cell::Bridge { orientation, count }) if *orientation == step.orientation() => {
                            Some(usize::from(*count))
                        }
                        _ => None,
                    })
                    .sum::<usize>()
            })
            .collect_vec()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.rows() {
            writeln!(f, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseError;

    /// Read back a grid printed by [`Display`]. Blank lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                line.split_whitespace()
                    .enumerate()
                    .map(|(column, token)| token.parse::<Cell>().map_err(|_| ParseError::InvalidCell {
                        line: index + 1,
                        column: column + 1,
                        token: token.to_string(),
                    }))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|cells| (index + 1, cells))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let width = rows.first().map_or(0, |(_, cells)| cells.len());
        if let Some((line, cells)) = rows.iter().find(|(_, cells)| cells.len() != width) {
            return Err(ParseError::RaggedRow { line: *line, found: cells.len(), expected: width });
        }

        Ok(Self {
            cells: Array2::from_shape_fn((rows.len(), width), |(row, column)| rows[row].1[column]),
        })
    }
}
