//! Fundamental geometric and simulation types.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::Row;

/// Entity center in world space (logical pixels).
/// x grows toward the defended base, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// Velocity in logical pixels per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Bearing to another position in radians (`atan2(dy, dx)`).
    pub fn bearing_to(&self, other: &Position) -> f64 {
        let d = other.0 - self.0;
        d.y.atan2(d.x)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Velocity of magnitude `speed` along `angle` (radians).
    pub fn from_angle(angle: f64, speed: f64) -> Self {
        Self(DVec2::new(angle.cos(), angle.sin()) * speed)
    }

    pub fn speed(&self) -> f64 {
        self.0.length()
    }
}

/// Axis-aligned rectangle described by its center and half extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: DVec2,
    pub half_extents: DVec2,
}

impl Rect {
    pub fn new(center: DVec2, half_extents: DVec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn min(&self) -> DVec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> DVec2 {
        self.center + self.half_extents
    }

    /// Point of the rectangle closest to `point` (the point itself when inside).
    pub fn closest_point(&self, point: DVec2) -> DVec2 {
        point.clamp(self.min(), self.max())
    }

    pub fn distance_to_point(&self, point: DVec2) -> f64 {
        self.closest_point(point).distance(point)
    }

    pub fn contains(&self, point: DVec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Half of the rectangle's diagonal.
    pub fn half_diagonal(&self) -> f64 {
        self.half_extents.length()
    }

    /// Largest side length.
    pub fn max_side(&self) -> f64 {
        2.0 * self.half_extents.x.max(self.half_extents.y)
    }
}

/// World bounds used to discard stray projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Stable identifier handed out to towers when they are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerId(pub u32);

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tower#{}", self.0)
    }
}

/// Grid cell address. Serialized as `"<row>:<index>"`, e.g. `"top:3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    pub row: Row,
    pub index: u8,
}

impl CellId {
    pub fn new(row: Row, index: u8) -> Self {
        Self { row, index }
    }

    /// Cells are adjacent when they share a row and their indices differ by one.
    pub fn is_adjacent(&self, other: &CellId) -> bool {
        self.row == other.row && self.index.abs_diff(other.index) == 1
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row.as_str(), self.index)
    }
}

/// Error returned when a cell identifier string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellIdError(pub String);

impl fmt::Display for ParseCellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell id `{}`", self.0)
    }
}

impl std::error::Error for ParseCellIdError {}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellIdError(s.to_string());
        let (row, index) = s.split_once(':').ok_or_else(err)?;
        let row = match row {
            "top" => Row::Top,
            "bottom" => Row::Bottom,
            _ => return Err(err()),
        };
        let index = index.parse::<u8>().map_err(|_| err())?;
        Ok(Self { row, index })
    }
}

impl TryFrom<String> for CellId {
    type Error = ParseCellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(value: CellId) -> Self {
        value.to_string()
    }
}
