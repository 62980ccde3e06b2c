//! A1-style address helpers.
//!
//! All row and column numbers in this workspace are 1-based, matching what a
//! user sees in a spreadsheet application. Column `1` is `A`, `27` is `AA`.

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest column Excel accepts (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
/// Largest row Excel accepts.
pub const MAX_ROW: u32 = 1_048_576;

/// Errors raised while parsing textual references.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum A1ParseError {
    Empty,
    MissingColumn(String),
    MissingRow(String),
    OutOfBounds(String),
    RangeOrder(String),
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            A1ParseError::Empty => write!(f, "empty cell reference"),
            A1ParseError::MissingColumn(s) => write!(f, "reference `{s}` has no column letters"),
            A1ParseError::MissingRow(s) => write!(f, "reference `{s}` has no row number"),
            A1ParseError::OutOfBounds(s) => write!(f, "reference `{s}` is outside the sheet"),
            A1ParseError::RangeOrder(s) => {
                write!(f, "range `{s}` must start above/left of its end")
            }
        }
    }
}

impl Error for A1ParseError {}

/// Convert a 1-based column number into letters (`1` -> `A`).
pub fn column_to_letters(col: u32) -> String {
    debug_assert!(col >= 1, "columns are 1-based");
    let mut col = col.saturating_sub(1);
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Convert column letters into a 1-based column number (`A` -> `1`).
/// Lowercase letters are accepted.
pub fn letters_to_column(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in s.bytes() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let val = (ch.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col.checked_mul(26)?.checked_add(val)?;
    }
    (col <= MAX_COLUMN).then_some(col)
}

/// A single cell position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn parse(s: &str) -> Result<Self, A1ParseError> {
        let s = s.trim().trim_start_matches('$');
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }
        let split = s
            .find(|c: char| c == '$' || c.is_ascii_digit())
            .ok_or_else(|| A1ParseError::MissingRow(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        let digits = digits.trim_start_matches('$');
        let col = letters_to_column(letters)
            .ok_or_else(|| A1ParseError::MissingColumn(s.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| A1ParseError::MissingRow(s.to_string()))?;
        if row == 0 || row > MAX_ROW {
            return Err(A1ParseError::OutOfBounds(s.to_string()));
        }
        Ok(Self { row, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row)
    }
}

/// Inclusive rectangular block of cells.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start: CellRef::new(start_row, start_col),
            end: CellRef::new(end_row, end_col),
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start.row && row <= self.end.row && col >= self.start.col && col <= self.end.col
    }

    pub fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Parse `A1:C1`, or a single `A1` as a one-cell range.
    pub fn parse(s: &str) -> Result<Self, A1ParseError> {
        let (start, end) = match s.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(s)?;
                (cell, cell)
            }
        };
        if start.row > end.row || start.col > end.col {
            return Err(A1ParseError::RangeOrder(s.to_string()));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
