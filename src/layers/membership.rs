//! Static square membership tables for conditional layers.
//!
//! A conditional layer is only requested for the squares listed here.

/// Squares touched by the blight.
pub const BLIGHT_SQUARES: &[&str] = &[
    "C4", "C5", "D3", "D4", "D5", "D6", "E5", "E6", "F6", "F7", "G7", "G8", "H7", "H8", "H9", "I9",
];

/// Squares crossed by the Path of Scarlet Leaves.
pub const PSL_SQUARES: &[&str] = &[
    "G6", "G7", "G8", "H4", "H5", "H6", "H7", "H8", "I3", "I4",
];

/// Squares crossed by Leaf Dew Way.
pub const LDW_SQUARES: &[&str] = &[
    "C9", "C10", "D8", "D9", "E7", "E8", "F7", "F8", "G8", "H8",
];

/// Squares with minor trails.
pub const OTHER_PATH_SQUARES: &[&str] = &[
    "A5", "A6", "B5", "B6", "B7", "C7", "E2", "E3", "F3", "F4", "H10", "H11", "I11", "J11",
];

/// Squares inside the Rudania village rings only.
pub const RUDANIA_CIRCLE_SQUARES: &[&str] = &["H4", "H5", "I4", "I5"];

/// Squares inside the Inariko village rings only.
pub const INARIKO_CIRCLE_SQUARES: &[&str] = &["G2", "G3", "H2", "H3"];

/// Squares where the Rudania and Vhintl rings overlap.
pub const SHARED_CIRCLE_SQUARES: &[&str] = &["F9", "F10", "G9", "G10"];

/// Linear membership test against a fixed table.
pub fn contains(table: &[&str], square: &str) -> bool {
    table.iter().any(|&s| s == square)
}
