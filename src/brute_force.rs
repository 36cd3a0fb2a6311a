use itertools::Itertools;
use log::debug;
use varisat::Var;

use crate::formula::{Assignment, Conflict, Formula};
use crate::puzzle::Puzzle;
use crate::solver::Strategy;

/// Try every total assignment in turn.
///
/// Assignments are enumerated with variable 1 most significant and `true` before `false`, so the result is the
/// first satisfying assignment in that order. Each candidate is run through unit propagation, which rejects it at
/// the first falsified clause; every candidate agreeing with it up to the highest variable of that clause fails
/// the same way and is skipped without being built.
///
/// This is exponential in the number of variables and only meant as a baseline on small puzzles.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl Strategy for BruteForce {
    fn find_assignment(&self, formula: &Formula, _puzzle: &Puzzle) -> Option<Assignment> {
        let var_count = formula.var_count();
        // the highest variable index of each clause, None for the empty clause
        let reach = formula.clauses().iter()
            .map(|clause| clause.iter().map(|lit| lit.var().index()).max())
            .collect_vec();

        let mut values = vec![true; var_count];
        let mut checked: u64 = 0;

        loop {
            checked += 1;
            let mut assignment = Assignment::new(var_count);
            for (index, value) in values.iter().enumerate() {
                assignment.set(Var::from_index(index), *value);
            }

            let prefix = match formula.propagate(&mut assignment) {
                Ok(()) if formula.is_satisfied_by(&assignment) => {
                    debug!("brute force found a model after {} candidates", checked);
                    return Some(assignment);
                }
                Ok(()) => var_count.checked_sub(1),
                Err(Conflict { clause }) => reach[clause],
            };

            if !prefix.is_some_and(|position| advance(&mut values, position)) {
                debug!("brute force exhausted the search space after {} candidates", checked);
                return None;
            }
        }
    }
}

/// Step `values` to the next assignment in enumeration order that differs from it somewhere in `..=position`.
///
/// Returns `false` when there is no such assignment.
fn advance(values: &mut [bool], position: usize) -> bool {
    let Some(flip) = values[..=position].iter().rposition(|value| *value) else {
        return false;
    };

    values[flip] = false;
    values[flip + 1..].fill(true);
    true
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use varisat::Lit;

    use super::*;

    fn formula(var_count: usize, clauses: &[&[isize]]) -> Formula {
        let mut formula = Formula::new(var_count);
        for clause in clauses {
            formula.add_clause(clause.iter().map(|dimacs| Lit::from_dimacs(*dimacs)).collect_vec());
        }
        formula
    }

    fn empty_puzzle() -> Puzzle {
        Puzzle::new(array![[0]])
    }

    #[test]
    fn enumeration_order() {
        let mut values = vec![true, true];
        let mut seen = vec![values.clone()];
        while advance(&mut values, 1) {
            seen.push(values.clone());
        }
        assert_eq!(seen, vec![
            vec![true, true],
            vec![true, false],
            vec![false, true],
            vec![false, false],
        ]);
    }

    #[test]
    fn advancing_a_prefix_skips_its_suffixes() {
        let mut values = vec![true, true, true];
        assert!(advance(&mut values, 0));
        assert_eq!(values, vec![false, true, true]);
        assert!(!advance(&mut values, 0));
    }

    #[test]
    fn finds_first_model_in_order() {
        // models: (F, T) and (T, F); the second comes first
        let formula = formula(2, &[&[1, 2], &[-1, -2]]);
        let assignment = BruteForce.find_assignment(&formula, &empty_puzzle()).unwrap();
        assert_eq!(assignment.get(Var::from_dimacs(1)), Some(true));
        assert_eq!(assignment.get(Var::from_dimacs(2)), Some(false));
    }

    #[test]
    fn exhausts_unsatisfiable() {
        let formula = formula(3, &[&[1, 2], &[1, -2], &[-1, 3], &[-1, -3]]);
        assert_eq!(BruteForce.find_assignment(&formula, &empty_puzzle()), None);
    }

    #[test]
    fn empty_clause_prunes_everything() {
        let formula = formula(4, &[&[]]);
        assert_eq!(BruteForce.find_assignment(&formula, &empty_puzzle()), None);
    }
}
