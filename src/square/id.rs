//! Square identifier parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::{RenderError, Result};

/// Column letters of the world map, west to east.
pub const COLUMNS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Last row of the world map (rows start at 1).
pub const MAX_ROW: u8 = 12;

// == Square Id ==
/// A validated map square address such as `H8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SquareId {
    column: char,
    row: u8,
}

impl SquareId {
    /// Parses free-form input into a square id.
    ///
    /// Input is trimmed and uppercased, then must be one letter `A`-`J`
    /// followed by a row `1`-`12` written without leading zeros.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        let invalid = || RenderError::InvalidSquare(input.trim().to_string());

        let mut chars = normalized.chars();
        let column = chars.next().ok_or_else(invalid)?;
        if !COLUMNS.contains(&column) {
            return Err(invalid());
        }

        let digits = chars.as_str();
        let well_formed = match digits.len() {
            1 => digits.as_bytes()[0].is_ascii_digit() && digits != "0",
            2 => digits.starts_with('1') && digits.as_bytes()[1].is_ascii_digit(),
            _ => false,
        };
        if !well_formed {
            return Err(invalid());
        }

        let row: u8 = digits.parse().map_err(|_| invalid())?;
        if !(1..=MAX_ROW).contains(&row) {
            return Err(invalid());
        }

        Ok(Self { column, row })
    }

    /// Column letter (`A`-`J`).
    pub fn column(&self) -> char {
        self.column
    }

    /// Row number (1-12).
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Iterates every square of the map, column-major.
    pub fn all() -> impl Iterator<Item = SquareId> {
        COLUMNS
            .iter()
            .flat_map(|&column| (1..=MAX_ROW).map(move |row| SquareId { column, row }))
    }
}

impl FromStr for SquareId {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SquareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let square = SquareId::parse("H8").unwrap();
        assert_eq!(square.column(), 'H');
        assert_eq!(square.row(), 8);
        assert_eq!(square.to_string(), "H8");
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(SquareId::parse("  j12 ").unwrap().to_string(), "J12");
        assert_eq!("a1".parse::<SquareId>().unwrap().to_string(), "A1");
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        for bad in ["K1", "A0", "A13", "A20", "", "A", "8H", "A01", "A1x", "AA1", "A-1", "A+1"] {
            assert!(
                matches!(SquareId::parse(bad), Err(RenderError::InvalidSquare(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_all_squares() {
        let all: Vec<_> = SquareId::all().collect();
        assert_eq!(all.len(), 120);
        assert_eq!(all.first().unwrap().to_string(), "A1");
        assert_eq!(all.last().unwrap().to_string(), "J12");
    }
}
