//! World-space position and dimension identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a host dimension (e.g. `minecraft:overworld`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(String);

impl DimensionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DimensionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A point in block coordinates (one block = one meter)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance. Prefer this for comparisons.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Inclusive range test: a player exactly `radius` away is in range.
    pub fn within(&self, other: &Position, radius: f64) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

/// Position qualified by the dimension it lives in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub dimension: DimensionId,
    pub position: Position,
}

impl Location {
    pub fn new(dimension: impl Into<DimensionId>, position: Position) -> Self {
        Self {
            dimension: dimension.into(),
            position,
        }
    }

    /// Same dimension and within `radius` blocks.
    pub fn within(&self, other: &Location, radius: f64) -> bool {
        self.dimension == other.dimension && self.position.within(&other.position, radius)
    }
}
