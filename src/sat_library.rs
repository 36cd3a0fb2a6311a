use log::{debug, error};
use varisat::{CnfFormula, Solver};

use crate::formula::{Assignment, Formula};
use crate::puzzle::Puzzle;
use crate::solver::Strategy;

/// Hand the formula to [`varisat`], a conflict driven clause learning solver.
///
/// Much faster than the other strategies on anything but tiny puzzles, which makes it the reference the others
/// are checked against.
#[derive(Clone, Copy, Debug, Default)]
pub struct SatLibrary;

impl Strategy for SatLibrary {
    fn find_assignment(&self, formula: &Formula, _puzzle: &Puzzle) -> Option<Assignment> {
        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(formula));

        match solver.solve() {
            Ok(true) => {
                let model = solver.model()?;
                debug!("varisat found a model");
                Some(Assignment::from_model(formula.var_count(), &model))
            }
            Ok(false) => {
                debug!("varisat proved the formula unsatisfiable");
                None
            }
            Err(err) => {
                error!("varisat failed: {}", err);
                None
            }
        }
    }
}
