mod result;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use hashi::{Board, HashiSolver, Puzzle, Solution, SolverKind};
use log::{error, info, warn, LevelFilter};
use strum::VariantArray;

use result::{HashiError, HashiResult};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Puzzle file with one grid row per line, cells separated by whitespace or commas and 0 for empty cells.
    instance_path: PathBuf,

    /// One of dpll, brute-force, heuristic or sat-library.
    #[arg(short = 's', long = "strategy", default_value_t = SolverKind::Dpll)]
    strategy: SolverKind,

    /// Run every strategy in turn instead of only the selected one.
    #[arg(short = 'a', long = "all", default_value_t = false)]
    all: bool,

    /// Also write the output to this file.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write the encoded formula to this file in DIMACS format.
    #[arg(long = "dump-cnf")]
    dump_cnf: Option<PathBuf>,

    #[arg(long = "verify", default_value_t = false)]
    verify: bool,

    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stderr)
        .init();
    info!("Logging successfully configured");
}

fn write_file(path: &Path, contents: &str) -> HashiResult<()> {
    fs::write(path, contents).map_err(|source| HashiError::Write { path: path.to_path_buf(), source })
}

fn verify(puzzle: &Puzzle, solution: &Solution) -> HashiResult<()> {
    solution.check(puzzle)?;
    if !solution.is_connected(puzzle) {
        warn!("the bridges do not connect every island");
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> HashiResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose);

    let kinds = if args.all {
        SolverKind::VARIANTS.to_vec()
    } else {
        vec![args.strategy]
    };

    let mut report = String::new();
    for (index, kind) in kinds.into_iter().enumerate() {
        let mut solver = HashiSolver::new(&args.instance_path, kind);
        let elapsed = solver.run()?;

        if let (0, Some(path), Some(formula)) = (index, &args.dump_cnf, solver.formula()) {
            write_file(path, &formula.to_dimacs())?;
            info!("wrote {} clauses to {}", formula.len(), path.display());
        }

        if args.all {
            report.push_str(&format!("{} ({:.4}s)\n", kind, elapsed.as_secs_f64()));
        }

        match (solver.puzzle(), solver.solution()) {
            (Some(puzzle), Some(solution)) => {
                if args.verify {
                    verify(puzzle, solution)?;
                }
                report.push_str(&Board::render(puzzle, solution).to_string());
            }
            _ => report.push_str("no solution\n"),
        }
    }

    print!("{report}");
    if let Some(path) = &args.output {
        write_file(path, &report)?;
    }
    Ok(())
}
