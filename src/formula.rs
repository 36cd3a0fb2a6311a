use std::fmt::Write;

use itertools::Itertools;
use varisat::{CnfFormula, Lit, Var};

/// A formula in conjunctive normal form over the variables `1..=var_count` (in DIMACS numbering).
///
/// The empty clause is allowed and makes the formula unsatisfiable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Formula {
    clauses: Vec<Vec<Lit>>,
    var_count: usize,
}

impl Formula {
    /// A formula over `var_count` variables without any clauses.
    pub fn new(var_count: usize) -> Self {
        Self {
            clauses: Vec::new(),
            var_count,
        }
    }

    /// Append a clause. Every literal must be over one of the formula's variables.
    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        debug_assert!(clause.iter().all(|lit| lit.var().index() < self.var_count));
        self.clauses.push(clause);
    }

    /// Clauses in the order they were added.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Variables are numbered `1..=var_count` in DIMACS terms.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there are no clauses, so any assignment satisfies the formula.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether the formula contains the empty clause.
    pub fn has_contradiction(&self) -> bool {
        self.clauses.iter().any(Vec::is_empty)
    }

    /// How often each variable occurs across all clauses, in either polarity.
    pub fn occurrences(&self) -> Vec<usize> {
        let mut counts = vec![0; self.var_count];
        for lit in self.clauses.iter().flatten() {
            counts[lit.var().index()] += 1;
        }
        counts
    }

    /// Whether every clause has a literal made true by `assignment`. Unassigned literals do not count.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.clauses.iter()
            .all(|clause| clause.iter().any(|lit| assignment.lit_value(*lit) == Some(true)))
    }

    /// Repeatedly assign the last open literal of every unit clause until nothing changes.
    ///
    /// Fails with the first clause whose literals are all false. On a complete assignment this reduces to checking
    /// that no clause is falsified.
    pub fn propagate(&self, assignment: &mut Assignment) -> Result<(), Conflict> {
        let mut changed = true;
        while changed {
            changed = false;
            for (index, clause) in self.clauses.iter().enumerate() {
                match ClauseState::of(clause, assignment) {
                    ClauseState::Satisfied | ClauseState::Open => {}
                    ClauseState::Falsified => return Err(Conflict { clause: index }),
                    ClauseState::Unit(lit) => {
                        assignment.assign(lit);
                        changed = true;
                    }
                }
            }
        }

        Ok(())
    }

    /// Render in DIMACS CNF format.
    pub fn to_dimacs(&self) -> String {
        let mut out = String::with_capacity(16 * (self.clauses.len() + 1));
        // writing into a String cannot fail
        let _ = writeln!(out, "p cnf {} {}", self.var_count, self.clauses.len());
        for clause in &self.clauses {
            let _ = writeln!(out, "{} 0", clause.iter().map(|lit| lit.to_dimacs()).join(" "));
        }
        out
    }
}

impl From<&Formula> for CnfFormula {
    fn from(formula: &Formula) -> Self {
        let mut cnf = CnfFormula::from(formula.clauses.iter().map(Vec::as_slice));
        cnf.set_var_count(formula.var_count);
        cnf
    }
}

/// A clause found with every literal false.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Conflict {
    /// Index of the offending clause in [`Formula::clauses`].
    pub clause: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ClauseState {
    Satisfied,
    Falsified,
    /// Exactly one literal is unassigned and all others are false.
    Unit(Lit),
    Open,
}

impl ClauseState {
    pub(crate) fn of(clause: &[Lit], assignment: &Assignment) -> Self {
        let mut open = None;
        let mut open_count = 0;
        for lit in clause {
            match assignment.lit_value(*lit) {
                Some(true) => return Self::Satisfied,
                Some(false) => {}
                None => {
                    open = Some(*lit);
                    open_count += 1;
                }
            }
        }

        match (open_count, open) {
            (0, _) => Self::Falsified,
            (1, Some(lit)) => Self::Unit(lit),
            _ => Self::Open,
        }
    }
}

/// A partial or total truth assignment, stored flat and indexed by variable.
///
/// Cloning is the branching mechanism; equal assignments hash equally, so an assignment is its own canonical
/// state key.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Assignment {
    values: Vec<Option<bool>>,
}

impl Assignment {
    /// An assignment with every one of `var_count` variables unassigned.
    pub fn new(var_count: usize) -> Self {
        Self {
            values: vec![None; var_count],
        }
    }

    /// A total assignment reading each variable's value from the literal for it in `model`.
    /// Variables missing from `model` are false.
    pub fn from_model(var_count: usize, model: &[Lit]) -> Self {
        let mut assignment = Self {
            values: vec![Some(false); var_count],
        };
        for lit in model.iter().filter(|lit| lit.var().index() < var_count) {
            assignment.assign(*lit);
        }
        assignment
    }

    /// Number of variables covered, assigned or not.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }

    /// The value of `var`, [`None`] if unassigned.
    #[inline]
    pub fn get(&self, var: Var) -> Option<bool> {
        self.values.get(var.index()).copied().flatten()
    }

    /// Whether `var` is assigned true. Unassigned reads as false.
    #[inline]
    pub fn is_true(&self, var: Var) -> bool {
        self.get(var) == Some(true)
    }

    /// Give `var` a value, replacing any earlier one.
    #[inline]
    pub fn set(&mut self, var: Var, value: bool) {
        self.values[var.index()] = Some(value);
    }

    /// Make `lit` true.
    #[inline]
    pub fn assign(&mut self, lit: Lit) {
        self.set(lit.var(), lit.is_positive());
    }

    /// `Some(true)` if `lit` is satisfied, `Some(false)` if falsified, `None` if its variable is unassigned.
    #[inline]
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.get(lit.var()).map(|value| value == lit.is_positive())
    }

    /// Number of variables with a value.
    pub fn assigned_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Whether every variable has a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Variables without a value, in ascending order.
    pub fn unassigned(&self) -> impl Iterator<Item = Var> + '_ {
        self.values.iter()
            .positions(Option::is_none)
            .map(Var::from_index)
    }
}
