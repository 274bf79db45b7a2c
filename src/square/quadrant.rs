//! Quadrant geometry and exploration statuses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

// == Quadrant Id ==
/// One quarter of a square, numbered in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuadrantId {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl QuadrantId {
    /// All quadrants in reading order.
    pub const ALL: [QuadrantId; 4] = [QuadrantId::Q1, QuadrantId::Q2, QuadrantId::Q3, QuadrantId::Q4];

    /// The digit drawn on this quadrant's badge.
    pub fn number(self) -> u8 {
        match self {
            QuadrantId::Q1 => 1,
            QuadrantId::Q2 => 2,
            QuadrantId::Q3 => 3,
            QuadrantId::Q4 => 4,
        }
    }

    /// Pixel rectangle owned by this quadrant in a `width` x `height` square.
    ///
    /// The left/top halves get `width / 2` and `height / 2`; the right/bottom
    /// halves take the remainder, so odd sizes still tile exactly.
    pub fn rect(self, width: u32, height: u32) -> QuadrantRect {
        let half_w = width / 2;
        let half_h = height / 2;
        let (x, w) = match self {
            QuadrantId::Q1 | QuadrantId::Q3 => (0, half_w),
            QuadrantId::Q2 | QuadrantId::Q4 => (half_w, width - half_w),
        };
        let (y, h) = match self {
            QuadrantId::Q1 | QuadrantId::Q2 => (0, half_h),
            QuadrantId::Q3 | QuadrantId::Q4 => (half_h, height - half_h),
        };
        QuadrantRect {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

impl FromStr for QuadrantId {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(QuadrantId::Q1),
            "Q2" => Ok(QuadrantId::Q2),
            "Q3" => Ok(QuadrantId::Q3),
            "Q4" => Ok(QuadrantId::Q4),
            _ => Err(RenderError::InvalidQuadrant(s.trim().to_string())),
        }
    }
}

impl fmt::Display for QuadrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

// == Quadrant Rect ==
/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl QuadrantRect {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

// == Quadrant Status ==
/// Exploration state of a quadrant as reported by the exploration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadrantStatus {
    Inaccessible,
    #[default]
    Unexplored,
    Explored,
    Secured,
}

impl QuadrantStatus {
    /// Lenient parse: unknown or malformed values become `Unexplored`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inaccessible" => QuadrantStatus::Inaccessible,
            "explored" => QuadrantStatus::Explored,
            "secured" => QuadrantStatus::Secured,
            _ => QuadrantStatus::Unexplored,
        }
    }

    /// Whether a quadrant in this state is hidden from a viewer who is not in it.
    pub fn is_hidden(self) -> bool {
        matches!(self, QuadrantStatus::Unexplored | QuadrantStatus::Inaccessible)
    }
}

impl<'de> Deserialize<'de> for QuadrantStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Numbers, objects and the like normalize too instead of failing the record
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .map(QuadrantStatus::parse_lenient)
            .unwrap_or_default())
    }
}

// == Quadrant Statuses ==
/// Status of all four quadrants of a square; every quadrant always has a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantStatuses {
    statuses: BTreeMap<QuadrantId, QuadrantStatus>,
}

impl QuadrantStatuses {
    /// All four quadrants set to `status`.
    pub fn uniform(status: QuadrantStatus) -> Self {
        Self {
            statuses: QuadrantId::ALL.iter().map(|&q| (q, status)).collect(),
        }
    }

    pub fn get(&self, quadrant: QuadrantId) -> QuadrantStatus {
        self.statuses.get(&quadrant).copied().unwrap_or_default()
    }

    pub fn set(&mut self, quadrant: QuadrantId, status: QuadrantStatus) {
        self.statuses.insert(quadrant, status);
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuadrantId, QuadrantStatus)> + '_ {
        self.statuses.iter().map(|(&q, &s)| (q, s))
    }
}

impl Default for QuadrantStatuses {
    fn default() -> Self {
        Self::uniform(QuadrantStatus::Unexplored)
    }
}
