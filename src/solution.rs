use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Dfs;
use thiserror::Error;

use crate::formula::Assignment;
use crate::location::Location;
use crate::puzzle::{BridgeId, Puzzle};
use crate::shape::Orientation;

/// A candidate bridge that is actually drawn, with one or two parallel bridges.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PlacedBridge {
    /// The candidate this bridge is drawn along.
    pub id: BridgeId,
    /// The axis it runs along.
    pub orientation: Orientation,
    /// Endpoint locations, the one closer to the top left first.
    pub endpoints: (Location, Location),
    /// 1 or 2.
    pub count: u8,
}

/// Ways a set of bridges can break the rules of a puzzle.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Violation {
    /// An island is touched by the wrong number of bridges.
    #[error("island at {location} requires {required} bridges but is touched by {found}")]
    Degree {
        /// Where the island is.
        location: Location,
        /// Bridges it requires.
        required: u8,
        /// Bridges drawn to it.
        found: usize,
    },
    /// Two drawn bridges intersect.
    #[error("horizontal bridge {horizontal} crosses vertical bridge {vertical}")]
    Crossing {
        /// The horizontal candidate.
        horizontal: BridgeId,
        /// The vertical candidate.
        vertical: BridgeId,
    },
}

/// The bridges drawn in a solved puzzle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Solution {
    bridges: Vec<PlacedBridge>,
}

impl Solution {
    /// Read the drawn bridges off an assignment. Unassigned variables count as false.
    pub fn reconstruct(puzzle: &Puzzle, assignment: &Assignment) -> Self {
        let bridges = puzzle.bridges().iter()
            .filter_map(|bridge| {
                let count = if assignment.is_true(bridge.has_two()) {
                    2
                } else if assignment.is_true(bridge.has_one()) {
                    1
                } else {
                    return None;
                };

                Some(PlacedBridge {
                    id: bridge.id,
                    orientation: bridge.orientation,
                    endpoints: (bridge.low(), bridge.high()),
                    count,
                })
            })
            .collect_vec();

        Self { bridges }
    }

    /// Drawn bridges in candidate order.
    pub fn bridges(&self) -> &[PlacedBridge] {
        &self.bridges
    }

    /// Whether no bridge is drawn at all.
    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// How many bridges are drawn along candidate `id`.
    pub fn count_of(&self, id: BridgeId) -> u8 {
        self.bridges.iter()
            .find(|placed| placed.id == id)
            .map_or(0, |placed| placed.count)
    }

    /// Bridge ends touching each island, indexed like [`Puzzle::islands`].
    pub fn incident_counts(&self, puzzle: &Puzzle) -> Vec<usize> {
        let mut counts = vec![0; puzzle.islands().len()];
        for placed in &self.bridges {
            let (low, high) = puzzle.bridges()[placed.id].islands;
            counts[low] += usize::from(placed.count);
            counts[high] += usize::from(placed.count);
        }
        counts
    }

    /// Verify that every island is touched by exactly as many bridges as it requires and that no two bridges
    /// cross. Connectivity is not checked here, see [`Self::is_connected`].
    pub fn check(&self, puzzle: &Puzzle) -> Result<(), Violation> {
        let counts = self.incident_counts(puzzle);
        if let Some((island, found)) = puzzle.islands().iter()
            .zip(counts)
            .find(|(island, found)| usize::from(island.required) != *found) {
            return Err(Violation::Degree { location: island.location, required: island.required, found });
        }

        if let Some((horizontal, vertical)) = puzzle.crossings().iter()
            .find(|(h, v)| self.count_of(*h) > 0 && self.count_of(*v) > 0) {
            return Err(Violation::Crossing { horizontal: *horizontal, vertical: *vertical });
        }

        Ok(())
    }

    /// Whether the drawn bridges link every island into one network.
    pub fn is_connected(&self, puzzle: &Puzzle) -> bool {
        let mut graph: UnGraphMap<Location, u8> = UnGraphMap::with_capacity(puzzle.islands().len(), self.bridges.len());
        for island in puzzle.islands() {
            graph.add_node(island.location);
        }
        for placed in &self.bridges {
            graph.add_edge(placed.endpoints.0, placed.endpoints.1, placed.count);
        }

        let Some(start) = puzzle.islands().first() else {
            return true;
        };

        let mut reached = 0;
        let mut dfs = Dfs::new(&graph, start.location);
        while dfs.next(&graph).is_some() {
            reached += 1;
        }

        reached == graph.node_count()
    }
}
