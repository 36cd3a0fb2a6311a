use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use log::{debug, trace};
use varisat::Var;

use crate::formula::{Assignment, Formula};
use crate::puzzle::{CandidateBridge, Puzzle};
use crate::solver::Strategy;

/// Best-first search over partial assignments, guided by how far each island is from its requirement.
///
/// # Search
/// A node is a partial assignment closed under unit propagation. Its cost so far `g` is the number of assigned
/// variables and its estimate `h` is the total distance, summed over islands, between the bridges already drawn
/// at an island and the number it requires. Nodes are expanded in order of lowest `g + h`, deeper nodes first
/// on ties.
///
/// Nodes that can no longer lead to a solution are pruned as soon as they are generated: an island already
/// touched by too many bridges, an island which cannot reach its requirement with the candidates still open, or
/// two crossing candidates both drawn.
///
/// Branching prefers completing a single bridge into a double one, then the candidate whose islands are missing
/// the most bridges, then the variable occurring in the most clauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicSearch;

impl Strategy for HeuristicSearch {
    fn find_assignment(&self, formula: &Formula, puzzle: &Puzzle) -> Option<Assignment> {
        let mut start = Assignment::new(formula.var_count());
        eliminate_pure_literals(formula, &mut start);
        if formula.propagate(&mut start).is_err() {
            debug!("heuristic search: conflict before the first decision");
            return None;
        }
        if !is_viable(puzzle, &start) {
            debug!("heuristic search: start state already violates an island");
            return None;
        }

        let activity = formula.occurrences();
        let mut search = Search::default();
        search.enqueue(puzzle, start);

        while let Some(Node { assignment, f, g, .. }) = search.open.pop() {
            search.expanded += 1;
            trace!("expanding f = {}, g = {}", f, g);

            if assignment.is_complete() {
                if formula.is_satisfied_by(&assignment) {
                    debug!("heuristic search found a model after expanding {} states", search.expanded);
                    return Some(assignment);
                }
                continue;
            }

            let Some(var) = choose(puzzle, &assignment, &activity) else {
                continue;
            };

            for value in [true, false] {
                let mut successor = assignment.clone();
                successor.set(var, value);
                if formula.propagate(&mut successor).is_ok() && is_viable(puzzle, &successor) {
                    search.enqueue(puzzle, successor);
                }
            }
        }

        debug!("heuristic search exhausted after expanding {} states", search.expanded);
        None
    }
}

/// The open set plus every state ever queued.
///
/// `f` is a function of the assignment alone, so a state queued once never needs queueing again, and being
/// queued once it is expanded at most once.
#[derive(Debug, Default)]
struct Search {
    open: BinaryHeap<Node>,
    seen: HashSet<Assignment>,
    expanded: usize,
}

impl Search {
    /// Queue `assignment` unless it has been queued before. Returns whether it was queued.
    fn enqueue(&mut self, puzzle: &Puzzle, assignment: Assignment) -> bool {
        if self.seen.contains(&assignment) {
            return false;
        }

        self.seen.insert(assignment.clone());
        self.open.push(Node::new(puzzle, assignment, self.seen.len()));
        true
    }
}

/// An entry of the open set.
#[derive(Debug)]
struct Node {
    f: usize,
    g: usize,
    /// Insertion order, so that equally ranked nodes come out first in, first out.
    seq: usize,
    assignment: Assignment,
}

impl Node {
    fn new(puzzle: &Puzzle, assignment: Assignment, seq: usize) -> Self {
        let g = assignment.assigned_count();
        let f = g + distance(puzzle, &assignment);
        Self { f, g, seq, assignment }
    }

    fn rank(&self) -> (Reverse<usize>, usize, Reverse<usize>) {
        (Reverse(self.f), self.g, Reverse(self.seq))
    }
}

// BinaryHeap pops the greatest node, which is the one with the lowest f.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Node {}

/// Bridges already drawn along `bridge`.
fn drawn(bridge: &CandidateBridge, assignment: &Assignment) -> usize {
    if assignment.is_true(bridge.has_two()) {
        2
    } else if assignment.is_true(bridge.has_one()) {
        1
    } else {
        0
    }
}

/// The most bridges that could still end up drawn along `bridge`.
fn potential(bridge: &CandidateBridge, assignment: &Assignment) -> usize {
    match (assignment.get(bridge.has_one()), assignment.get(bridge.has_two())) {
        (_, Some(true)) => 2,
        (Some(false), _) => 0,
        (_, Some(false)) => 1,
        (_, None) => 2,
    }
}

/// `(drawn, potential)` bridge counts for every island, indexed like [`Puzzle::islands`].
fn island_counts(puzzle: &Puzzle, assignment: &Assignment) -> Vec<(usize, usize)> {
    let mut counts = vec![(0, 0); puzzle.islands().len()];
    for bridge in puzzle.bridges() {
        let (drawn, potential) = (drawn(bridge, assignment), potential(bridge, assignment));
        for island in [bridge.islands.0, bridge.islands.1] {
            counts[island].0 += drawn;
            counts[island].1 += potential;
        }
    }
    counts
}

/// Total distance of every island from its requirement.
fn distance(puzzle: &Puzzle, assignment: &Assignment) -> usize {
    puzzle.islands().iter()
        .zip(island_counts(puzzle, assignment))
        .map(|(island, (drawn, _))| usize::from(island.required).abs_diff(drawn))
        .sum()
}

/// Whether `assignment` could still be extended to a solution as far as the islands and crossings can tell.
fn is_viable(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    let degrees_fit = puzzle.islands().iter()
        .zip(island_counts(puzzle, assignment))
        .all(|(island, (drawn, potential))| {
            let required = usize::from(island.required);
            drawn <= required && required <= potential
        });

    degrees_fit && !puzzle.crossings().iter().any(|(h, v)| {
        assignment.is_true(puzzle.bridges()[*h].has_one()) && assignment.is_true(puzzle.bridges()[*v].has_one())
    })
}

/// Pick the variable to branch on, or [`None`] if every variable is assigned.
fn choose(puzzle: &Puzzle, assignment: &Assignment, activity: &[usize]) -> Option<Var> {
    let upgrade = puzzle.bridges().iter()
        .find(|bridge| assignment.is_true(bridge.has_one()) && assignment.get(bridge.has_two()).is_none());
    if let Some(bridge) = upgrade {
        return Some(bridge.has_two());
    }

    let counts = island_counts(puzzle, assignment);
    let unmet = |island: usize| usize::from(puzzle.islands()[island].required).saturating_sub(counts[island].0);

    puzzle.bridges().iter()
        .filter(|bridge| assignment.get(bridge.has_one()).is_none())
        // first bridge wins among equals
        .min_by_key(|bridge| Reverse((
            unmet(bridge.islands.0) + unmet(bridge.islands.1),
            activity[bridge.has_one().index()],
        )))
        .map(CandidateBridge::has_one)
        .or_else(|| assignment.unassigned().next())
}

/// Fix every variable occurring in only one polarity to the value making all its occurrences true.
fn eliminate_pure_literals(formula: &Formula, assignment: &mut Assignment) {
    // (occurs positively, occurs negatively)
    let mut polarities = vec![(false, false); formula.var_count()];
    for lit in formula.clauses().iter().flatten() {
        let seen = &mut polarities[lit.var().index()];
        if lit.is_positive() {
            seen.0 = true;
        } else {
            seen.1 = true;
        }
    }

    for (index, seen) in polarities.into_iter().enumerate() {
        match seen {
            (true, false) => assignment.set(Var::from_index(index), true),
            (false, true) => assignment.set(Var::from_index(index), false),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::encoder::encode;
    use crate::solution::Solution;

    fn solve(puzzle: &Puzzle) -> Option<Solution> {
        HeuristicSearch.solve(&encode(puzzle), puzzle)
    }

    #[test]
    fn lowest_f_then_deepest_first() {
        let node = |f, g, seq| Node { f, g, seq, assignment: Assignment::new(0) };

        let mut open = BinaryHeap::from(vec![node(5, 1, 0), node(3, 1, 1), node(3, 2, 2), node(3, 2, 3)]);
        let order = std::iter::from_fn(|| open.pop()).map(|node| node.seq).collect::<Vec<_>>();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test]
    fn states_are_queued_once() {
        let puzzle = Puzzle::new(array![[1, 0, 1]]);
        let mut assignment = Assignment::new(2);
        assignment.set(Var::from_index(0), true);

        let mut search = Search::default();
        assert!(search.enqueue(&puzzle, assignment.clone()));
        assert!(!search.enqueue(&puzzle, assignment.clone()));
        assert_eq!(search.open.len(), 1);
        assert_eq!(search.seen.len(), 1);

        assignment.set(Var::from_index(1), false);
        assert!(search.enqueue(&puzzle, assignment));
        assert_eq!(search.open.len(), 2);
    }

    #[test]
    fn potential_counts() {
        let puzzle = Puzzle::new(array![[1, 0, 1]]);
        let bridge = &puzzle.bridges()[0];
        let mut assignment = Assignment::new(2);
        assert_eq!(potential(bridge, &assignment), 2);

        assignment.set(bridge.has_two(), false);
        assert_eq!(potential(bridge, &assignment), 1);
        assert_eq!(drawn(bridge, &assignment), 0);

        assignment.set(bridge.has_one(), false);
        assert_eq!(potential(bridge, &assignment), 0);
    }

    #[test]
    fn prunes_overfull_and_crossing() {
        let puzzle = Puzzle::new(array![[1, 0, 1]]);
        let mut assignment = Assignment::new(2);
        assignment.set(Var::from_index(0), true);
        assignment.set(Var::from_index(1), true);
        assert!(!is_viable(&puzzle, &assignment));

        let puzzle = Puzzle::new(array![
            [0, 2, 0],
            [2, 0, 2],
            [0, 2, 0],
        ]);
        let mut assignment = Assignment::new(4);
        assignment.set(puzzle.bridges()[0].has_one(), true);
        assert!(is_viable(&puzzle, &assignment));
        assignment.set(puzzle.bridges()[1].has_one(), true);
        assert!(!is_viable(&puzzle, &assignment));
    }

    #[test]
    fn prunes_unreachable_requirements() {
        let puzzle = Puzzle::new(array![[2, 0, 2]]);
        let mut assignment = Assignment::new(2);
        assignment.set(puzzle.bridges()[0].has_two(), false);
        assert!(!is_viable(&puzzle, &assignment));
    }

    #[test]
    fn completes_single_bridges_first() {
        let puzzle = Puzzle::new(array![[1, 0, 3, 0, 2]]);
        let mut assignment = Assignment::new(4);
        assignment.set(puzzle.bridges()[1].has_one(), true);
        assert_eq!(choose(&puzzle, &assignment, &[0; 4]), Some(puzzle.bridges()[1].has_two()));
    }

    #[test]
    fn prefers_the_most_demanding_bridge() {
        let puzzle = Puzzle::new(array![[1, 0, 3, 0, 2]]);
        let assignment = Assignment::new(4);
        // 1 + 3 against 3 + 2
        assert_eq!(choose(&puzzle, &assignment, &[0; 4]), Some(puzzle.bridges()[1].has_one()));
    }

    #[test]
    fn solves_a_chain() {
        let puzzle = Puzzle::new(array![[1, 0, 3, 0, 2]]);
        let solution = solve(&puzzle).unwrap();
        assert_eq!(solution.check(&puzzle), Ok(()));
        assert_eq!(solution.count_of(0), 1);
        assert_eq!(solution.count_of(1), 2);
    }

    #[test]
    fn reports_unsatisfiable() {
        assert_eq!(solve(&Puzzle::new(array![[1, 0, 2]])), None);
        assert_eq!(solve(&Puzzle::new(array![[3]])), None);
    }

    #[test]
    fn empty_puzzle_has_empty_solution() {
        assert_eq!(solve(&Puzzle::new(array![[0, 0]])), Some(Solution::default()));
    }
}
