//! Tile map boundary
//!
//! The simulation reads and writes tiles through [`TileMap`] and never owns
//! the storage type. [`GridMap`] is a plain in-memory implementation.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::fixed::wrap;

/// One map cell.
///
/// Low four bits link the cell to its neighbours (a pipe network); `CORE`
/// marks a base core; `HARD` marks plain wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile(pub u16);

impl Tile {
    pub const SPACE: Tile = Tile(0);

    pub const U: u16 = 0x01;
    pub const R: u16 = 0x02;
    pub const D: u16 = 0x04;
    pub const L: u16 = 0x08;
    pub const LINKS: u16 = 0x0f;
    pub const CORE: u16 = 0x10;
    pub const HARD: u16 = 0x20;

    #[inline]
    pub fn is_space(self) -> bool {
        self.0 == 0
    }

    /// Blocks ships and bolts
    #[inline]
    pub fn is_solid(self) -> bool {
        !self.is_space()
    }

    #[inline]
    pub fn is_core(self) -> bool {
        self.0 & Self::CORE != 0
    }

    #[inline]
    pub fn is_hard(self) -> bool {
        self.0 & Self::HARD != 0
    }

    #[inline]
    pub fn links(self) -> u16 {
        self.0 & Self::LINKS
    }

    /// Part of a pipe network (core or pipe section)
    pub fn is_pipe(self) -> bool {
        !self.is_hard() && self.links() != 0
    }

    /// Dead end of a pipe: where a cannon sits
    pub fn is_pipe_end(self) -> bool {
        self.is_pipe() && !self.is_core() && self.links().count_ones() == 1
    }

    pub fn has_link(self, dir: u8) -> bool {
        self.links() & link_bit(dir) != 0
    }
}

/// Link bit for an orthogonal compass direction (1 up, 3 right, 5 down, 7 left).
pub fn link_bit(dir: u8) -> u16 {
    match dir {
        1 => Tile::U,
        3 => Tile::R,
        5 => Tile::D,
        7 => Tile::L,
        _ => 0,
    }
}

/// Orthogonal directions in link-bit order.
pub const LINK_DIRS: [u8; 4] = [1, 3, 5, 7];

/// Tile offset for an orthogonal direction.
pub fn link_step(dir: u8) -> IVec2 {
    match dir {
        1 => IVec2::new(0, -1),
        3 => IVec2::new(1, 0),
        5 => IVec2::new(0, 1),
        7 => IVec2::new(-1, 0),
        _ => IVec2::ZERO,
    }
}

/// Tile storage owned by the host. Coordinates wrap.
pub trait TileMap {
    /// Size in tiles. Both edges must be powers of two, and the map must be
    /// at least 64 pixels across once multiplied by the tile size; any other
    /// size gets a world grid that wraps onto the map more than once.
    fn size(&self) -> IVec2;
    fn tile(&self, x: i32, y: i32) -> Tile;
    fn set_tile(&mut self, x: i32, y: i32, tile: Tile);
}

/// Dense tile grid; both edges are powers of two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl GridMap {
    pub fn new(width: i32, height: i32) -> Self {
        let width = (width.clamp(1, 1024) as u32).next_power_of_two() as i32;
        let height = (height.clamp(1, 1024) as u32).next_power_of_two() as i32;
        Self {
            width,
            height,
            tiles: vec![Tile::SPACE; (width * height) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (wrap(y, self.height) * self.width + wrap(x, self.width)) as usize
    }

    /// Lay out a base: a core at `center`, four straight pipe arms of length
    /// `arm`, and a cannon end on each arm.
    pub fn build_base(&mut self, center: IVec2, arm: i32) {
        let arm = arm.max(1);
        self.set_tile(center.x, center.y, Tile(Tile::CORE | Tile::LINKS));
        for dir in LINK_DIRS {
            let step = link_step(dir);
            let back = link_bit(super::fixed::opposite(dir));
            for i in 1..=arm {
                let p = center + step * i;
                let bits = if i == arm { back } else { back | link_bit(dir) };
                self.set_tile(p.x, p.y, Tile(bits));
            }
        }
    }

    /// Fill a rectangle with hard wall.
    pub fn build_wall(&mut self, from: IVec2, size: IVec2) {
        for y in 0..size.y.max(0) {
            for x in 0..size.x.max(0) {
                self.set_tile(from.x + x, from.y + y, Tile(Tile::HARD));
            }
        }
    }

    /// Tiles matching a predicate, row-major.
    pub fn find(&self, pred: impl Fn(Tile) -> bool) -> Vec<IVec2> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if pred(self.tile(x, y)) {
                    out.push(IVec2::new(x, y));
                }
            }
        }
        out
    }
}

impl TileMap for GridMap {
    fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    fn tile(&self, x: i32, y: i32) -> Tile {
        self.tiles[self.index(x, y)]
    }

    fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        let i = self.index(x, y);
        self.tiles[i] = tile;
    }
}
