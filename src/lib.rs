#![warn(missing_docs)]

//! # `hashi`
//!
//! A solver for [Hashiwokakero](https://en.wikipedia.org/wiki/Hashiwokakero) ("build bridges") puzzles.
//! Read a grid with [`Puzzle::from_path`] or [`str::parse`], encode it with [`encoder::encode`], then hand the
//! formula to any [`Strategy`]. The resulting [`Solution`] can be verified with [`Solution::check`] and drawn with
//! [`Board::render`]. [`HashiSolver`] bundles these steps for a single input file.
//!
//! # Internals
//! The puzzle is expressed as a Boolean satisfiability problem in conjunctive normal form (a "CNF"), which is then
//! solved by one of several interchangeable engines, from a naive enumeration of assignments up to a full CDCL
//! solver.
//!
//! A high level overview is as follows:
//!
//! Every pair of islands that can see each other along a row or column with nothing in between is a candidate
//! bridge, carrying zero, one or two bridges. Each candidate owns two variables: one for "at least one bridge" and
//! one for "a second bridge". See [`encoder::encode`] for the clauses built over them.
//!
//! Solving yields a truth assignment, which [`Solution::reconstruct`] reads back as bridge counts. Every strategy
//! shares that last step, so they differ only in how the assignment is found:
//! 1. [`Dpll`]: recursive splitting with unit propagation and pure literal elimination.
//! 2. [`BruteForce`]: ordered enumeration of total assignments.
//! 3. [`HeuristicSearch`]: best-first search guided by the distance of each island from its requirement.
//! 4. [`SatLibrary`]: [`varisat`].
//!
//! The encoding only requires enough bridges to connect the islands, not that they actually do; a returned
//! solution may split into several networks. [`Solution::is_connected`] tells.

pub use board::Board;
pub use brute_force::BruteForce;
pub use cell::{Cell, InvalidCellToken};
pub use dpll::Dpll;
pub use formula::{Assignment, Conflict, Formula};
pub use heuristic::HeuristicSearch;
pub use location::Location;
pub use puzzle::{BridgeId, CandidateBridge, Island, IslandId, ParseError, Puzzle};
pub use sat_library::SatLibrary;
pub use shape::{Orientation, Step};
pub use solution::{PlacedBridge, Solution, Violation};
pub use solver::{HashiSolver, SolverKind, Strategy};

pub(crate) mod board;
pub(crate) mod brute_force;
pub(crate) mod cell;
pub(crate) mod dpll;
pub mod encoder;
pub(crate) mod formula;
pub(crate) mod heuristic;
pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod puzzle;
pub(crate) mod sat_library;
pub(crate) mod shape;
pub(crate) mod solution;
pub(crate) mod solver;
