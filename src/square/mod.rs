//! Square Module
//!
//! Square identifiers and the quadrant geometry and statuses within a square.

mod id;
mod quadrant;


pub use id::{SquareId, COLUMNS, MAX_ROW};
pub use quadrant::{QuadrantId, QuadrantRect, QuadrantStatus, QuadrantStatuses};
