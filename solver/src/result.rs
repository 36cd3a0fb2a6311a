use std::path::PathBuf;

use hashi::{ParseError, Violation};
use thiserror::Error;

pub(crate) type HashiResult<T> = Result<T, HashiError>;

#[derive(Error, Debug)]
pub(crate) enum HashiError {
    #[error("Failed to read the puzzle, more details: {0}")]
    Parse(#[from] ParseError),
    #[error("Failed to write {}, more details: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The solution breaks the rules: {0}")]
    InvalidSolution(#[from] Violation),
}
