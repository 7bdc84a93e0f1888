//! Tower grid: two fixed rows of placement cells.

use glam::DVec2;

use chroma_core::config::{GameConfig, GridConfig};
use chroma_core::enums::Row;
use chroma_core::types::{Bounds, CellId, TowerId};

#[derive(Debug, Clone)]
pub struct Cell {
    pub id: CellId,
    /// Top-left corner.
    pub origin: DVec2,
    pub size: DVec2,
    pub tower: Option<TowerId>,
}

impl Cell {
    pub fn occupied(&self) -> bool {
        self.tower.is_some()
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct TowerGrid {
    cells: Vec<Cell>,
}

impl TowerGrid {
    pub fn new(config: &GridConfig) -> Self {
        let mut cells = Vec::with_capacity(config.top_offsets.len() + config.bottom_offsets.len());
        for (row, origin, offsets) in [
            (Row::Top, config.top_origin, &config.top_offsets),
            (Row::Bottom, config.bottom_origin, &config.bottom_offsets),
        ] {
            for (index, offset) in offsets.iter().enumerate() {
                cells.push(Cell {
                    id: CellId::new(row, index as u8),
                    origin: origin + *offset,
                    size: config.cell_size,
                    tower: None,
                });
            }
        }
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    /// Cells of one row, ordered by index.
    pub fn row(&self, row: Row) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.id.row == row)
    }

    pub fn tower_at(&self, id: CellId) -> Option<TowerId> {
        self.cell(id).and_then(|c| c.tower)
    }

    pub fn bind(&mut self, id: CellId, tower: TowerId) -> bool {
        match self.cells.iter_mut().find(|c| c.id == id) {
            Some(cell) if cell.tower.is_none() => {
                cell.tower = Some(tower);
                true
            }
            _ => false,
        }
    }

    /// Clear a cell and return the tower that was bound to it.
    pub fn vacate(&mut self, id: CellId) -> Option<TowerId> {
        self.cells
            .iter_mut()
            .find(|c| c.id == id)
            .and_then(|c| c.tower.take())
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.tower = None;
        }
    }

    /// Playfield bounds: every cell, the base, and the spawn point, padded by
    /// a margin that grows with the largest projectile radius.
    pub fn world_bounds(&self, config: &GameConfig) -> Bounds {
        let base = &config.world.base;
        let spawn = config.enemies.default_spawn;
        let mut min = spawn.min(DVec2::new(base.x, base.y));
        let mut max = spawn.max(DVec2::new(base.x + base.width, base.y + base.height));
        for cell in &self.cells {
            min = min.min(cell.origin);
            max = max.max(cell.origin + cell.size);
        }

        let p = &config.projectiles;
        let largest_radius = (p.base_radius + p.radius_per_level * 2.0)
            .max(config.weapons.rocket.hit_radius);
        let margin = config
            .world
            .bounds_min_margin
            .max(config.world.projectile_radius_factor * largest_radius);
        Bounds {
            min: min - DVec2::splat(margin),
            max: max + DVec2::splat(margin),
        }
    }
}
