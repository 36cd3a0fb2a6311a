//! Translation of a [`Puzzle`] into a CNF [`Formula`].

use itertools::Itertools;
use log::{debug, warn};
use varisat::Lit;

use crate::formula::Formula;
use crate::logic::{at_least, binomial, exactly};
use crate::puzzle::Puzzle;

/// Upper bound on the number of clauses spent on the connectivity condition.
///
/// The condition is expressed as one clause per subset of candidate bridges, which quickly explodes on larger
/// grids; past this bound it is left out of the formula.
pub const CONNECTIVITY_CLAUSE_LIMIT: usize = 100_000;

/// Translate the rules of `puzzle` into CNF.
///
/// # Logical setup
/// Every candidate bridge B owns two variables: `one(B)` (at least one bridge is drawn) and `two(B)` (a second
/// bridge is drawn alongside it). Bridge `i` uses variables `2i + 1` and `2i + 2` in DIMACS numbering.
///
/// Clauses are emitted in this order:
/// 1. `two(B) => one(B)`, i.e. `!two(B) + one(B)`.
/// 2. For every pair of candidates H, V which would cross: `!one(H) + !one(V)`.
/// 3. For every island I requiring `k` bridge ends, exactly `k` of the variables of the candidates touching I are
///    true. Each drawn bridge contributes one true variable and a double bridge two.
/// 4. With N islands, at least N - 1 of the `one` variables are true. A connected network needs at least that
///    many edges, but this alone does not make the network connected.
pub fn encode(puzzle: &Puzzle) -> Formula {
    let mut formula = Formula::new(2 * puzzle.bridges().len());

    for bridge in puzzle.bridges() {
        formula.add_clause(vec![bridge.has_two().negative(), bridge.has_one().positive()]);
    }

    for (h, v) in puzzle.crossings() {
        formula.add_clause(vec![
            puzzle.bridges()[*h].has_one().negative(),
            puzzle.bridges()[*v].has_one().negative(),
        ]);
    }

    for island in puzzle.islands() {
        let incident = puzzle.incident_bridges(island.location)
            .flat_map(|bridge| [bridge.has_one().positive(), bridge.has_two().positive()])
            .collect_vec();

        if incident.is_empty() && island.required > 0 {
            debug!("island at {} requires {} but has no candidate bridges", island.location, island.required);
        }

        exactly(&incident, island.required.into()).into_iter()
            .for_each(|clause| formula.add_clause(clause));
    }

    add_connectivity(puzzle, &mut formula);

    debug!("encoded {} clauses over {} variables", formula.len(), formula.var_count());
    formula
}

fn add_connectivity(puzzle: &Puzzle, formula: &mut Formula) {
    let island_count = puzzle.islands().len();
    if island_count <= 1 {
        return;
    }

    let lits: Vec<Lit> = puzzle.bridges().iter()
        .map(|bridge| bridge.has_one().positive())
        .collect_vec();
    let needed = island_count - 1;

    if needed <= lits.len() {
        let clause_count = binomial(lits.len(), lits.len() - needed + 1);
        if clause_count > CONNECTIVITY_CLAUSE_LIMIT {
            warn!(
                "skipping the connectivity condition: it needs {} clauses, more than the limit of {}",
                clause_count, CONNECTIVITY_CLAUSE_LIMIT
            );
            return;
        }
    }

    at_least(&lits, needed).into_iter()
        .for_each(|clause| formula.add_clause(clause));
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use varisat::Var;

    use super::*;
    use crate::formula::Assignment;

    fn lit(dimacs: isize) -> Lit {
        Lit::from_dimacs(dimacs)
    }

    #[test]
    fn double_bridge_implies_single_first() {
        let puzzle = Puzzle::new(array![[1, 0, 1]]);
        let formula = encode(&puzzle);

        assert_eq!(formula.var_count(), 2);
        assert_eq!(formula.clauses()[0], vec![lit(-2), lit(1)]);
    }

    #[test]
    fn crossing_clauses_follow_implications() {
        let puzzle = Puzzle::new(array![
            [0, 1, 0],
            [1, 0, 1],
            [0, 1, 0],
        ]);
        let formula = encode(&puzzle);

        assert_eq!(formula.clauses()[0], vec![lit(-2), lit(1)]);
        assert_eq!(formula.clauses()[1], vec![lit(-4), lit(3)]);
        assert_eq!(formula.clauses()[2], vec![lit(-1), lit(-3)]);
    }

    #[test]
    fn island_without_candidates_is_contradictory() {
        let formula = encode(&Puzzle::new(array![[3]]));
        assert_eq!(formula.var_count(), 0);
        assert!(formula.has_contradiction());
    }

    #[test]
    fn lone_empty_island_is_trivial() {
        let formula = encode(&Puzzle::new(array![[0, 0], [0, 0]]));
        assert!(formula.is_empty());
    }

    #[test]
    fn requirement_above_capacity_is_contradictory() {
        // a corner island touches at most two candidates, so at most four bridge ends
        let formula = encode(&Puzzle::new(array![
            [5, 0, 1],
            [0, 0, 0],
            [1, 0, 0],
        ]));
        assert!(formula.has_contradiction());
    }

    #[test]
    fn too_few_candidates_to_connect() {
        let formula = encode(&Puzzle::new(array![
            [1, 0, 1],
            [0, 0, 0],
            [1, 0, 1],
        ]));
        assert!(!formula.has_contradiction());

        // four islands but only two candidates, so three edges can never be found
        let formula = encode(&Puzzle::new(array![
            [1, 1, 0, 0],
            [0, 0, 1, 1],
        ]));
        assert!(formula.has_contradiction());
    }

    #[test]
    fn oversized_connectivity_is_left_out() {
        // every cell an island: 16 islands, 24 candidates
        let puzzle = Puzzle::new(Array2::from_elem((4, 4), 1));
        let (islands, bridges) = (puzzle.islands().len(), puzzle.bridges().len());
        assert!(binomial(bridges, bridges - islands + 2) > CONNECTIVITY_CLAUSE_LIMIT);

        let degree_clauses: usize = puzzle.islands().iter()
            .map(|island| {
                let incident = puzzle.incident_bridges(island.location)
                    .flat_map(|bridge| [bridge.has_one().positive(), bridge.has_two().positive()])
                    .collect_vec();
                exactly(&incident, island.required.into()).len()
            })
            .sum();

        let formula = encode(&puzzle);
        assert_eq!(formula.len(), bridges + puzzle.crossings().len() + degree_clauses);
        assert!(!formula.has_contradiction());
    }

    #[test]
    fn degree_constraints_pin_down_a_chain() {
        let puzzle = Puzzle::new(array![[1, 0, 2, 0, 1]]);
        let formula = encode(&puzzle);

        // both bridges single is the only model
        for mask in 0..16usize {
            let mut assignment = Assignment::new(4);
            for index in 0..4 {
                assignment.set(Var::from_index(index), mask & (1 << index) != 0);
            }
            assert_eq!(formula.is_satisfied_by(&assignment), mask == 0b0101, "mask = {mask:04b}");
        }
    }
}
