//! Simulation context and core state types
//!
//! [`Sim`] is the one place mutable simulation state lives. The tick driver
//! and every kind operation receive it by `&mut`; there are no globals.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, ActorTable};
use super::fixed::{Topology, vec_fx, vec_to_px};
use super::kinds::KindId;
use super::map::{Tile, TileMap};
use super::motion::ViewPoints;
use super::pool::{ObjectPool, SimObject};
use super::ship::{self, Bolt, Ship};
use super::spawn;
use super::tick::{TickInput, tick};
use crate::audio::{AudioQueue, SoundEffect};
use crate::consts::MAX_BOLTS;
use crate::settings::SimSettings;

/// Things the host reacts to (score, HUD, map redraw)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Score { amount: u32 },
    /// Positions are world pixels
    ActorKilled { kind: KindId, x: i32, y: i32 },
    /// Pool or actor table exhausted
    SpawnDropped { kind: KindId },
    ShipDamaged { amount: i32, health: i32 },
    ShipDestroyed { x: i32, y: i32 },
    /// Tile coordinates; the host should redraw the tile
    TileChanged { x: i32, y: i32 },
    BaseDestroyed { x: i32, y: i32 },
}

/// Complete simulation state (deterministic given seed and inputs)
pub struct Sim {
    pub settings: SimSettings,
    pub topo: Topology,
    pub pool: ObjectPool,
    pub actors: ActorTable,
    pub ship: Ship,
    pub bolts: [Option<Bolt>; MAX_BOLTS],
    pub views: ViewPoints,
    pub map: Box<dyn TileMap>,
    pub rng: Pcg32,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Logic tick counter
    pub tick: u64,
    pub score: u64,
    pub events: Vec<GameEvent>,
    pub audio: AudioQueue,
}

impl Sim {
    /// Create a simulation over `map` with the ship at the world centre.
    pub fn new(settings: SimSettings, map: Box<dyn TileMap>, seed: u64) -> Self {
        let settings = settings.sanitized();
        let tiles = map.size();
        let topo = Topology::new(
            tiles.x.saturating_mul(settings.tile_size),
            tiles.y.saturating_mul(settings.tile_size),
            settings.tile_size,
        );
        if !topo.matches_tiles(tiles) {
            log::warn!(
                "map is {}x{} tiles but the world grid is {}x{}; map tiles will repeat",
                tiles.x,
                tiles.y,
                topo.tiles().x,
                topo.tiles().y
            );
        }
        let mut sim = Self {
            pool: ObjectPool::new(settings.object_capacity),
            actors: ActorTable::new(settings.actor_capacity),
            settings,
            topo,
            ship: Ship::default(),
            bolts: [None; MAX_BOLTS],
            views: ViewPoints::default(),
            map,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            tick: 0,
            score: 0,
            events: Vec::new(),
            audio: AudioQueue::new(),
        };
        let start = vec_fx(IVec2::new(topo.width() / 2, topo.height() / 2));
        ship::spawn_ship(&mut sim, start);
        log::debug!(
            "sim: {}x{} px world, {} objects, {} actor slots, seed {}",
            topo.width(),
            topo.height(),
            sim.pool.capacity(),
            sim.actors.capacity(),
            seed
        );
        sim
    }

    /// Tile under a pixel position.
    pub fn tile_at(&self, pos_px: IVec2) -> Tile {
        let t = self.topo.tile_of(pos_px);
        self.map.tile(t.x, t.y)
    }

    /// Tile at tile coordinates (wrapped).
    pub fn tile(&self, t: IVec2) -> Tile {
        let t = self.topo.wrap_tile(t);
        self.map.tile(t.x, t.y)
    }

    /// Write a tile and tell the host to redraw it.
    pub fn set_tile(&mut self, t: IVec2, tile: Tile) {
        let t = self.topo.wrap_tile(t);
        self.map.set_tile(t.x, t.y, tile);
        self.events.push(GameEvent::TileChanged { x: t.x, y: t.y });
    }

    pub fn object(&self, id: ActorId) -> Option<&SimObject> {
        self.actors.get(id)?.obj.and_then(|h| self.pool.get(h))
    }

    pub fn object_mut(&mut self, id: ActorId) -> Option<&mut SimObject> {
        let h = self.actors.get(id)?.obj?;
        self.pool.get_mut(h)
    }

    /// Actor position, fixed point.
    pub fn actor_pos(&self, id: ActorId) -> Option<IVec2> {
        self.object(id).map(|o| o.motion.pos)
    }

    pub fn actor_pos_px(&self, id: ActorId) -> Option<IVec2> {
        self.actor_pos(id).map(vec_to_px)
    }

    pub fn actor_vel(&self, id: ActorId) -> Option<IVec2> {
        self.object(id).map(|o| o.motion.vel)
    }

    /// Ship position, fixed point; `None` once destroyed.
    pub fn ship_pos(&self) -> Option<IVec2> {
        if !self.ship.alive {
            return None;
        }
        self.ship.obj.and_then(|h| self.pool.get(h)).map(|o| o.motion.pos)
    }

    pub fn ship_pos_px(&self) -> Option<IVec2> {
        self.ship_pos().map(vec_to_px)
    }

    /// Score sink: one event per award.
    pub fn add_score(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.score = self.score.saturating_add(amount as u64);
        self.events.push(GameEvent::Score { amount });
    }

    pub fn play_at(&mut self, effect: SoundEffect, pos_px: IVec2) {
        self.audio.play(effect, pos_px.x, pos_px.y);
    }

    /// Hand queued events to the host.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot of the gameplay-relevant state.
    pub fn checkpoint(&self) -> Checkpoint {
        let actors = self
            .actors
            .iter()
            .filter_map(|(id, a)| {
                let kind = a.kind?;
                let obj = self.object(id)?;
                Some(ActorSnapshot {
                    slot: id.index() as u32,
                    kind,
                    pos: obj.motion.pos,
                    vel: obj.motion.vel,
                    health: a.health,
                })
            })
            .collect();
        Checkpoint {
            tick: self.tick,
            score: self.score,
            ship_alive: self.ship.alive,
            ship_pos: self.ship_pos().unwrap_or(IVec2::ZERO),
            ship_health: self.ship.health,
            actors,
        }
    }
}

/// One live actor in a [`Checkpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub slot: u32,
    pub kind: KindId,
    pub pos: IVec2,
    pub vel: IVec2,
    pub health: i32,
}

/// Per-tick state used to check bit-exact replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub tick: u64,
    pub score: u64,
    pub ship_alive: bool,
    pub ship_pos: IVec2,
    pub ship_health: i32,
    /// In actor slot order
    pub actors: Vec<ActorSnapshot>,
}

/// Run a fresh level-one simulation over an input log, one checkpoint per tick.
pub fn replay(settings: SimSettings, map: Box<dyn TileMap>, seed: u64, inputs: &[TickInput]) -> Vec<Checkpoint> {
    let mut sim = Sim::new(settings, map, seed);
    spawn::populate_level(&mut sim, 1);
    replay_from(&mut sim, inputs)
}

/// Continue an existing simulation over an input log.
pub fn replay_from(sim: &mut Sim, inputs: &[TickInput]) -> Vec<Checkpoint> {
    inputs
        .iter()
        .map(|input| {
            tick(sim, input);
            sim.events.clear();
            sim.audio.drain();
            sim.checkpoint()
        })
        .collect()
}
