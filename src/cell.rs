use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use crate::shape::Orientation;

/// One cell of a rendered grid.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Cell {
    /// An island, shown as the number of bridges it requires.
    Island {
        /// Bridge ends the island needs.
        required: u8,
    },
    /// A cell crossed by `count` parallel bridges.
    Bridge {
        /// The axis the bridges run along.
        orientation: Orientation,
        /// 1 or 2.
        count: u8,
    },
    /// Shown as `0`.
    #[default]
    Empty,
}

/// A token in a rendered grid that is neither a number nor a bridge symbol.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised cell token {0:?}")]
pub struct InvalidCellToken(pub String);

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Island { required } => write!(f, "{required}"),
            Cell::Bridge { orientation, count } => write!(f, "{}", orientation.symbol(*count)),
            Cell::Empty => write!(f, "0"),
        }
    }
}

impl FromStr for Cell {
    type Err = InvalidCellToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "-" => Cell::Bridge { orientation: Orientation::Horizontal, count: 1 },
            "=" => Cell::Bridge { orientation: Orientation::Horizontal, count: 2 },
            "|" => Cell::Bridge { orientation: Orientation::Vertical, count: 1 },
            "$" => Cell::Bridge { orientation: Orientation::Vertical, count: 2 },
            _ => match token.parse::<u8>() {
                Ok(0) => Cell::Empty,
                Ok(required) => Cell::Island { required },
                Err(_) => return Err(InvalidCellToken(token.to_string())),
            },
        })
    }
}
