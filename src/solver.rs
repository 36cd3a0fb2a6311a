use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::info;
use strum::{Display, EnumString, VariantArray};

use crate::brute_force::BruteForce;
use crate::dpll::Dpll;
use crate::encoder;
use crate::formula::{Assignment, Formula};
use crate::heuristic::HeuristicSearch;
use crate::puzzle::{ParseError, Puzzle};
use crate::sat_library::SatLibrary;
use crate::solution::Solution;

/// A way of finding a satisfying assignment for an encoded puzzle.
///
/// Implementations keep no state between calls, so one value can solve any number of puzzles.
pub trait Strategy {
    /// Search for an assignment satisfying every clause of `formula`, which must be the encoding of `puzzle`.
    ///
    /// The assignment may be partial; variables left unassigned are read as false.
    fn find_assignment(&self, formula: &Formula, puzzle: &Puzzle) -> Option<Assignment>;

    /// Solve `puzzle`, returning the bridges to draw, or [`None`] if no assignment exists.
    fn solve(&self, formula: &Formula, puzzle: &Puzzle) -> Option<Solution> {
        self.find_assignment(formula, puzzle)
            .map(|assignment| Solution::reconstruct(puzzle, &assignment))
    }
}

/// Every built-in [`Strategy`], selectable by name.
#[derive(Copy, Clone, Debug, Display, EnumString, VariantArray, Eq, PartialEq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum SolverKind {
    /// See [`Dpll`].
    Dpll,
    /// See [`BruteForce`].
    BruteForce,
    /// See [`HeuristicSearch`].
    Heuristic,
    /// See [`SatLibrary`].
    SatLibrary,
}

impl Strategy for SolverKind {
    fn find_assignment(&self, formula: &Formula, puzzle: &Puzzle) -> Option<Assignment> {
        match self {
            Self::Dpll => Dpll.find_assignment(formula, puzzle),
            Self::BruteForce => BruteForce.find_assignment(formula, puzzle),
            Self::Heuristic => HeuristicSearch.find_assignment(formula, puzzle),
            Self::SatLibrary => SatLibrary.find_assignment(formula, puzzle),
        }
    }
}

/// Drives one [`Strategy`] over one puzzle file: parse it, encode it, solve it.
#[derive(Debug)]
pub struct HashiSolver<S> {
    input: PathBuf,
    strategy: S,
    puzzle: Option<Puzzle>,
    formula: Option<Formula>,
    solution: Option<Solution>,
}

impl<S: Strategy> HashiSolver<S> {
    /// Nothing is read until [`Self::parse`], [`Self::solve`] or [`Self::run`].
    pub fn new(input: impl AsRef<Path>, strategy: S) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            strategy,
            puzzle: None,
            formula: None,
            solution: None,
        }
    }

    /// The puzzle file.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Read the input file and encode it. Any previous solution is discarded.
    pub fn parse(&mut self) -> Result<&Puzzle, ParseError> {
        let puzzle = Puzzle::from_path(&self.input)?;
        info!(
            "parsed {}: {} islands, {} candidate bridges",
            self.input.display(),
            puzzle.islands().len(),
            puzzle.bridges().len()
        );

        self.formula = Some(encoder::encode(&puzzle));
        self.solution = None;
        Ok(&*self.puzzle.insert(puzzle))
    }

    /// Run the strategy, parsing first if that has not happened yet.
    ///
    /// `Ok(None)` means the puzzle has no solution.
    pub fn solve(&mut self) -> Result<Option<&Solution>, ParseError> {
        if self.puzzle.is_none() {
            self.parse()?;
        }

        self.solution = match (&self.puzzle, &self.formula) {
            (Some(puzzle), Some(formula)) => self.strategy.solve(formula, puzzle),
            _ => None,
        };
        Ok(self.solution.as_ref())
    }

    /// Parse, then solve, returning the time spent solving.
    pub fn run(&mut self) -> Result<Duration, ParseError> {
        self.parse()?;
        let start = Instant::now();
        let found = self.solve()?.is_some();
        let elapsed = start.elapsed();

        info!(
            "{} in {:.4}s",
            if found { "solved" } else { "no solution found" },
            elapsed.as_secs_f64()
        );
        Ok(elapsed)
    }

    /// The last puzzle parsed.
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// The encoding of [`Self::puzzle`].
    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    /// The solution from the last call to [`Self::solve`], if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
