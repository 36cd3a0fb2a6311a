use std::cmp::{max, min};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use itertools::Itertools;
use log::debug;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;
use unordered_pair::UnorderedPair;
use varisat::Var;

use crate::location::{Coord, Location};
use crate::shape::{Orientation, Step};

/// Index of an island in [`Puzzle::islands`], which lists islands in row-major order.
pub type IslandId = usize;
/// Index of a candidate bridge in [`Puzzle::bridges`].
pub type BridgeId = usize;

/// Reasons a grid could not be read.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input file could not be read at all.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that was asked for.
        path: PathBuf,
        /// Why reading it failed.
        #[source]
        source: std::io::Error,
    },
    /// A cell is not a non-negative integer small enough to be an island requirement.
    #[error("line {line}, column {column}: {token:?} is not a valid cell value")]
    InvalidCell {
        /// 1-based line of the input.
        line: usize,
        /// 1-based position of the token within its line.
        column: usize,
        /// The offending text.
        token: String,
    },
    /// Rows of the grid disagree on their length.
    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        /// 1-based line of the input.
        line: usize,
        /// Cells on that line.
        found: usize,
        /// Cells on the first row.
        expected: usize,
    },
}

/// A numbered cell that bridges must connect to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Island {
    /// Where the island sits on the grid.
    pub location: Location,
    /// Total number of bridge ends this island must be touched by.
    pub required: u8,
}

/// A pair of islands that see each other along a row or column with nothing in between.
///
/// Between zero and two parallel bridges may be drawn along a candidate; this is modelled by two
/// variables, see [`Self::has_one`] and [`Self::has_two`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CandidateBridge {
    /// Position in [`Puzzle::bridges`]. Horizontal candidates are numbered before vertical ones.
    pub id: BridgeId,
    /// The axis the candidate runs along.
    pub orientation: Orientation,
    /// Locations of the two islands joined.
    pub endpoints: UnorderedPair<Location>,
    /// The islands at [`Self::low`] and [`Self::high`], in that order.
    pub islands: (IslandId, IslandId),
}

impl CandidateBridge {
    /// The endpoint closer to the top left corner.
    pub fn low(&self) -> Location {
        min(self.endpoints.0, self.endpoints.1)
    }

    /// The endpoint closer to the bottom right corner.
    pub fn high(&self) -> Location {
        max(self.endpoints.0, self.endpoints.1)
    }

    /// The variable stating that at least one bridge is drawn here.
    #[inline]
    pub fn has_one(&self) -> Var {
        Var::from_index(2 * self.id)
    }

    /// The variable stating that a second, parallel bridge is drawn here.
    #[inline]
    pub fn has_two(&self) -> Var {
        Var::from_index(2 * self.id + 1)
    }

    /// Whether `island` is one of the endpoints.
    pub fn touches(&self, island: IslandId) -> bool {
        self.islands.0 == island || self.islands.1 == island
    }

    /// The cells strictly between the two endpoints, which a drawn bridge occupies.
    pub fn span(&self) -> impl Iterator<Item = Location> {
        let (low, high) = (self.low(), self.high());
        let (rows, columns): (Vec<Coord>, Vec<Coord>) = match self.orientation {
            Orientation::Horizontal => (vec![low.row()], (low.column() + 1..high.column()).collect()),
            Orientation::Vertical => ((low.row() + 1..high.row()).collect(), vec![low.column()]),
        };

        rows.into_iter()
            .cartesian_product(columns)
            .map(Location::from)
    }

    /// Whether a drawn `self` and a drawn `other` would intersect.
    ///
    /// Only a horizontal and a vertical candidate can cross; they do when the horizontal row lies strictly between
    /// the vertical endpoints and the vertical column lies strictly between the horizontal endpoints.
    pub fn crosses(&self, other: &CandidateBridge) -> bool {
        let (horizontal, vertical) = match (self.orientation, other.orientation) {
            (Orientation::Horizontal, Orientation::Vertical) => (self, other),
            (Orientation::Vertical, Orientation::Horizontal) => (other, self),
            _ => return false,
        };

        let row = horizontal.low().row();
        let column = vertical.low().column();

        vertical.low().row() < row && row < vertical.high().row()
            && horizontal.low().column() < column && column < horizontal.high().column()
    }
}

/// A parsed puzzle: the grid, its islands, and every candidate bridge between them.
#[derive(Clone, Debug)]
pub struct Puzzle {
    grid: Array2<u8>,
    islands: Vec<Island>,
    island_ids: Array2<Option<IslandId>>,
    bridges: Vec<CandidateBridge>,
    crossings: Vec<(BridgeId, BridgeId)>,
    graph: UnGraphMap<Location, BridgeId>,
}

impl Puzzle {
    /// Build a puzzle from a grid of requirements, where 0 marks an empty cell.
    pub fn new(grid: Array2<u8>) -> Self {
        let islands = grid.indexed_iter()
            .filter(|(_, required)| **required > 0)
            .map(|(index, required)| Island { location: Location::from(index), required: *required })
            .collect_vec();

        let mut island_ids = Array2::from_elem(grid.raw_dim(), None);
        for (id, island) in islands.iter().enumerate() {
            island_ids[island.location.as_index()] = Some(id);
        }

        let mut graph = UnGraphMap::with_capacity(islands.len(), 2 * islands.len());
        for island in &islands {
            graph.add_node(island.location);
        }

        let mut bridges = Vec::new();
        for step in Step::FORWARD_VARIANTS {
            for (id, island) in islands.iter().enumerate() {
                let mut cursor = step.attempt_from(island.location);
                // walk until we either fall off the grid or meet the next island
                while let Some(cell) = island_ids.get(cursor.as_index()) {
                    if let Some(other) = cell {
                        let bridge = CandidateBridge {
                            id: bridges.len(),
                            orientation: step.orientation(),
                            endpoints: UnorderedPair::from((island.location, cursor)),
                            islands: (id, *other),
                        };
                        graph.add_edge(island.location, cursor, bridge.id);
                        bridges.push(bridge);
                        break;
                    }
                    cursor = step.attempt_from(cursor);
                }
            }
        }

        let crossings = bridges.iter()
            .filter(|bridge| bridge.orientation == Orientation::Horizontal)
            .cartesian_product(bridges.iter().filter(|bridge| bridge.orientation == Orientation::Vertical))
            .filter(|(h, v)| h.crosses(v))
            .map(|(h, v)| (h.id, v.id))
            .collect_vec();

        debug!("parsed {} islands, {} candidate bridges, {} crossing pairs", islands.len(), bridges.len(), crossings.len());

        Self {
            grid,
            islands,
            island_ids,
            bridges,
            crossings,
            graph,
        }
    }

    /// Read a puzzle from a file in the format accepted by [`Puzzle::from_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?
            .parse()
    }

    /// `(rows, columns)`
    pub fn dims(&self) -> (usize, usize) {
        self.grid.dim()
    }

    /// Requirements as read, 0 for empty cells.
    pub fn grid(&self) -> &Array2<u8> {
        &self.grid
    }

    /// Every island, in row-major order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Every candidate bridge, indexed by [`BridgeId`].
    pub fn bridges(&self) -> &[CandidateBridge] {
        &self.bridges
    }

    /// Every `(horizontal, vertical)` pair of candidates that would intersect if both were drawn.
    pub fn crossings(&self) -> &[(BridgeId, BridgeId)] {
        &self.crossings
    }

    /// The id of the island at `location`, if there is one.
    pub fn island_id_at(&self, location: Location) -> Option<IslandId> {
        self.island_ids.get(location.as_index()).copied().flatten()
    }

    /// The island at `location`, if there is one.
    pub fn island_at(&self, location: Location) -> Option<&Island> {
        self.island_id_at(location).map(|id| &self.islands[id])
    }

    /// Candidate bridges with `location` as an endpoint. Empty if there is no island at `location`.
    pub fn incident_bridges(&self, location: Location) -> impl Iterator<Item = &CandidateBridge> + '_ {
        self.graph.edges(location).map(move |(_, _, id)| &self.bridges[*id])
    }
}

impl FromStr for Puzzle {
    type Err = ParseError;

    /// Parse one grid row per line, cells separated by whitespace and/or commas. Blank lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines()
            .enumerate()
            .map(|(index, line)| {
                let cells = line.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .enumerate()
                    .map(|(column, token)| token.parse::<u8>().map_err(|_| ParseError::InvalidCell {
                        line: index + 1,
                        column: column + 1,
                        token: token.to_string(),
                    }))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, ParseError>((index + 1, cells))
            })
            .filter_ok(|(_, cells)| !cells.is_empty())
            .collect::<Result<Vec<_>, ParseError>>()?;

        let width = rows.first().map_or(0, |(_, cells)| cells.len());
        if let Some((line, cells)) = rows.iter().find(|(_, cells)| cells.len() != width) {
            return Err(ParseError::RaggedRow { line: *line, found: cells.len(), expected: width });
        }

        Ok(Self::new(Array2::from_shape_fn((rows.len(), width), |(row, column)| rows[row].1[column])))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn parses_commas_and_blank_lines() {
        let puzzle: Puzzle = "1,0,1\n\n0 0 0\n".parse().unwrap();
        assert_eq!(puzzle.dims(), (2, 3));
        assert_eq!(puzzle.islands().len(), 2);
        assert_eq!(puzzle.bridges().len(), 1);
    }

    #[test]
    fn rejects_ragged_rows() {
        assert!(matches!(
            "1 0 1\n0 0\n".parse::<Puzzle>(),
            Err(ParseError::RaggedRow { line: 2, found: 2, expected: 3 })
        ));
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(matches!(
            "1 x 1".parse::<Puzzle>(),
            Err(ParseError::InvalidCell { line: 1, column: 2, .. })
        ));
        assert!("1 -1".parse::<Puzzle>().is_err());
        assert!("1 300".parse::<Puzzle>().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            Puzzle::from_path("/definitely/not/a/puzzle.txt"),
            Err(ParseError::Io { .. })
        ));
    }

    #[test]
    fn empty_grid_has_no_islands() {
        let puzzle: Puzzle = "".parse().unwrap();
        assert!(puzzle.islands().is_empty());
        assert!(puzzle.bridges().is_empty());
    }

    #[test]
    fn candidates_link_nearest_islands_only() {
        let puzzle = Puzzle::new(array![
            [1, 0, 2, 0, 1],
            [0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0],
        ]);

        // horizontal candidates come first
        let endpoints = puzzle.bridges().iter().map(|b| (b.orientation, b.low(), b.high())).collect_vec();
        assert_eq!(endpoints, vec![
            (Orientation::Horizontal, Location(0, 0), Location(0, 2)),
            (Orientation::Horizontal, Location(0, 2), Location(0, 4)),
            (Orientation::Vertical, Location(0, 0), Location(2, 0)),
        ]);

        assert_eq!(puzzle.incident_bridges(Location(0, 0)).count(), 2);
        assert_eq!(puzzle.incident_bridges(Location(0, 2)).count(), 2);
        assert_eq!(puzzle.incident_bridges(Location(1, 1)).count(), 0);
        assert_eq!(puzzle.island_at(Location(0, 2)).map(|island| island.required), Some(2));
    }

    #[test]
    fn detects_crossings() {
        let puzzle = Puzzle::new(array![
            [0, 1, 0],
            [1, 0, 1],
            [0, 1, 0],
        ]);

        assert_eq!(puzzle.bridges().len(), 2);
        assert_eq!(puzzle.crossings(), &[(0, 1)]);
        assert!(puzzle.bridges()[0].crosses(&puzzle.bridges()[1]));
        assert_eq!(puzzle.bridges()[0].span().collect_vec(), vec![Location(1, 1)]);
    }

    #[test]
    fn touching_spans_do_not_cross() {
        // the vertical bridge ends on the horizontal bridge's row, so they only share an island
        let puzzle = Puzzle::new(array![
            [1, 0, 1],
            [0, 0, 0],
            [1, 0, 0],
        ]);
        assert!(puzzle.crossings().is_empty());
    }
}
