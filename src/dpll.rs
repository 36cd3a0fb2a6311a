use std::cmp::Reverse;

use itertools::Itertools;
use log::{debug, trace};
use varisat::{Lit, Var};

use crate::formula::{Assignment, Formula};
use crate::puzzle::Puzzle;
use crate::solver::Strategy;

type Clauses = Vec<Vec<Lit>>;

/// Davis–Putnam–Logemann–Loveland search: unit propagation, pure literal elimination, then a recursive split on
/// the most frequently occurring variable, trying `true` before `false`.
///
/// Backtracking is purely chronological; nothing is learned from conflicts. Recursion depth is bounded by the
/// number of variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dpll;

impl Strategy for Dpll {
    fn find_assignment(&self, formula: &Formula, _puzzle: &Puzzle) -> Option<Assignment> {
        let occurrences = formula.occurrences();
        let mut search = Search {
            order: (0..formula.var_count())
                .map(Var::from_index)
                .sorted_by_key(|var| Reverse(occurrences[var.index()]))
                .collect_vec(),
            decisions: 0,
        };

        let result = search.dpll(formula.clauses().to_vec(), Assignment::new(formula.var_count()));
        debug!("dpll made {} decisions, {}", search.decisions, if result.is_some() { "satisfiable" } else { "unsatisfiable" });
        result
    }
}

struct Search {
    /// Decision order, fixed once from occurrence counts in the original formula.
    order: Vec<Var>,
    decisions: usize,
}

impl Search {
    /// `clauses` holds only the clauses not yet satisfied by `assignment`, with falsified literals removed.
    fn dpll(&mut self, clauses: Clauses, mut assignment: Assignment) -> Option<Assignment> {
        let clauses = unit_propagate(clauses, &mut assignment)?;
        let clauses = eliminate_pure_literals(clauses, &mut assignment);

        if clauses.is_empty() {
            return Some(assignment);
        }

        let var = self.choose(&clauses)?;
        self.decisions += 1;

        for value in [true, false] {
            let lit = var.lit(value);
            let mut branch = assignment.clone();
            branch.assign(lit);
            if let Some(found) = self.dpll(simplify(&clauses, lit), branch) {
                return Some(found);
            }
        }

        trace!("both values of {} failed, backtracking", var.to_dimacs());
        None
    }

    /// The first variable in decision order that still occurs in `clauses`.
    fn choose(&self, clauses: &[Vec<Lit>]) -> Option<Var> {
        let mut occurs = vec![false; self.order.len()];
        for lit in clauses.iter().flatten() {
            occurs[lit.var().index()] = true;
        }

        self.order.iter()
            .copied()
            .find(|var| occurs[var.index()])
    }
}

/// Make `lit` true: drop the clauses it satisfies and remove its negation from the rest.
fn simplify(clauses: &[Vec<Lit>], lit: Lit) -> Clauses {
    clauses.iter()
        .filter(|clause| !clause.contains(&lit))
        .map(|clause| clause.iter().copied().filter(|other| *other != !lit).collect_vec())
        .collect_vec()
}

/// Assign unit clauses until none are left. [`None`] on an empty clause, i.e. a conflict.
fn unit_propagate(mut clauses: Clauses, assignment: &mut Assignment) -> Option<Clauses> {
    loop {
        if clauses.iter().any(Vec::is_empty) {
            return None;
        }

        let Some(lit) = clauses.iter().find(|clause| clause.len() == 1).map(|clause| clause[0]) else {
            return Some(clauses);
        };

        if assignment.lit_value(lit) == Some(false) {
            return None;
        }
        assignment.assign(lit);
        clauses = simplify(&clauses, lit);
    }
}

/// Assign every variable that occurs with only one polarity so that all its occurrences are true.
fn eliminate_pure_literals(clauses: Clauses, assignment: &mut Assignment) -> Clauses {
    // (occurs positively, occurs negatively)
    let mut polarities = vec![(false, false); assignment.var_count()];
    for lit in clauses.iter().flatten() {
        let seen = &mut polarities[lit.var().index()];
        if lit.is_positive() {
            seen.0 = true;
        } else {
            seen.1 = true;
        }
    }

    polarities.into_iter()
        .enumerate()
        .filter_map(|(index, seen)| match seen {
            (true, false) => Some(Var::from_index(index).positive()),
            (false, true) => Some(Var::from_index(index).negative()),
            _ => None,
        })
        .fold(clauses, |clauses, lit| {
            assignment.assign(lit);
            simplify(&clauses, lit)
        })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn lit(dimacs: isize) -> Lit {
        Lit::from_dimacs(dimacs)
    }

    fn formula(var_count: usize, clauses: &[&[isize]]) -> Formula {
        let mut formula = Formula::new(var_count);
        for clause in clauses {
            formula.add_clause(clause.iter().map(|dimacs| lit(*dimacs)).collect_vec());
        }
        formula
    }

    fn empty_puzzle() -> Puzzle {
        Puzzle::new(array![[0]])
    }

    #[test]
    fn simplify_drops_satisfied_and_falsified() {
        let clauses = vec![vec![lit(1), lit(2)], vec![lit(-1), lit(3)], vec![lit(2)]];
        assert_eq!(simplify(&clauses, lit(1)), vec![vec![lit(3)], vec![lit(2)]]);
    }

    #[test]
    fn conflicting_units_fail() {
        let mut assignment = Assignment::new(1);
        assert_eq!(unit_propagate(vec![vec![lit(1)], vec![lit(-1)]], &mut assignment), None);
    }

    #[test]
    fn pure_literals_are_assigned() {
        let mut assignment = Assignment::new(2);
        let remaining = eliminate_pure_literals(vec![vec![lit(1), lit(2)], vec![lit(1), lit(-2)]], &mut assignment);
        assert!(remaining.is_empty());
        assert_eq!(assignment.get(Var::from_dimacs(1)), Some(true));
    }

    #[test]
    fn pure_literals_never_empty_a_clause() {
        let mut assignment = Assignment::new(3);
        let remaining = eliminate_pure_literals(
            vec![vec![lit(1), lit(2)], vec![lit(-2), lit(3)], vec![lit(2), lit(-3)]],
            &mut assignment,
        );
        assert_eq!(remaining, vec![vec![lit(-2), lit(3)], vec![lit(2), lit(-3)]]);
        assert!(remaining.iter().all(|clause| !clause.is_empty()));
    }

    #[test]
    fn needs_to_backtrack() {
        // x1 is tried true first and fails
        let formula = formula(3, &[&[-1, 2], &[-1, -2], &[1, 3], &[-3, 2]]);
        let assignment = Dpll.find_assignment(&formula, &empty_puzzle());
        assert!(assignment.is_some_and(|assignment| formula.is_satisfied_by(&assignment)));
    }

    #[test]
    fn detects_unsatisfiable() {
        let formula = formula(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        assert_eq!(Dpll.find_assignment(&formula, &empty_puzzle()), None);
    }

    #[test]
    fn empty_formula_is_satisfied() {
        assert_eq!(Dpll.find_assignment(&Formula::new(0), &empty_puzzle()), Some(Assignment::new(0)));
    }
}
