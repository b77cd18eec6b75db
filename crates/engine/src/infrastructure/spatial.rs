//! Dimension-partitioned uniform grid over online player positions.
//!
//! The grid is rebuilt from the player directory once per simulation tick and
//! swapped in whole, so readers always query one consistent snapshot. Cells are
//! keyed on the horizontal plane (x, z); the final distance test is full 3D.

use std::collections::HashMap;
use std::sync::Arc;

use parties_domain::{DimensionId, OnlinePlayer, PlayerId, Position};
use tokio::sync::watch;

use crate::infrastructure::ports::SpatialQuery;

/// Default cell edge in blocks.
pub const DEFAULT_CELL_SIZE: f64 = 32.0;

type CellKey = (i64, i64);

#[derive(Debug, Default)]
struct GridSnapshot {
    dimensions: HashMap<DimensionId, HashMap<CellKey, Vec<(PlayerId, Position)>>>,
    players: usize,
}

pub struct GridSpatialIndex {
    cell_size: f64,
    snapshot: watch::Sender<Arc<GridSnapshot>>,
}

impl GridSpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size >= 1.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        let (snapshot, _rx) = watch::channel(Arc::new(GridSnapshot::default()));
        Self {
            cell_size,
            snapshot,
        }
    }

    /// Replace the indexed positions with `players`.
    pub fn rebuild(&self, players: &[OnlinePlayer]) {
        let mut grid = GridSnapshot {
            dimensions: HashMap::new(),
            players: players.len(),
        };
        for player in players {
            grid.dimensions
                .entry(player.dimension().clone())
                .or_default()
                .entry(self.cell_of(player.position()))
                .or_default()
                .push((player.id, *player.position()));
        }
        self.snapshot.send_replace(Arc::new(grid));
    }

    /// Number of players in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.borrow().players
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell_of(&self, position: &Position) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.z / self.cell_size).floor() as i64,
        )
    }
}

impl Default for GridSpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialQuery for GridSpatialIndex {
    fn players_within(
        &self,
        dimension: &DimensionId,
        center: &Position,
        radius: f64,
    ) -> Vec<PlayerId> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let snapshot = self.snapshot.borrow().clone();
        let Some(cells) = snapshot.dimensions.get(dimension) else {
            return Vec::new();
        };

        let reach = (radius / self.cell_size).ceil() as i64;
        let span = reach.saturating_mul(2).saturating_add(1);
        let visits = span.saturating_mul(span);

        let mut found: Vec<PlayerId> = if visits > cells.len() as i64 {
            // Radius covers more cells than are occupied; walk occupied cells.
            cells
                .values()
                .flatten()
                .filter(|(_, pos)| pos.within(center, radius))
                .map(|(id, _)| *id)
                .collect()
        } else {
            let (cx, cz) = self.cell_of(center);
            let mut hits = Vec::new();
            for x in cx - reach..=cx + reach {
                for z in cz - reach..=cz + reach {
                    if let Some(bucket) = cells.get(&(x, z)) {
                        hits.extend(
                            bucket
                                .iter()
                                .filter(|(_, pos)| pos.within(center, radius))
                                .map(|(id, _)| *id),
                        );
                    }
                }
            }
            hits
        };
        found.sort_unstable();
        found
    }
}
