//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep and 24.8 fixed-point arithmetic only
//! - Seeded RNG only
//! - Stable iteration order (by actor slot, never by pool slot)
//! - No rendering or platform dependencies

pub mod actor;
pub mod behaviors;
pub mod collision;
pub mod damage;
pub mod dispatch;
pub mod fixed;
pub mod kinds;
pub mod map;
pub mod motion;
pub mod pool;
pub mod ship;
pub mod spawn;
pub mod state;
pub mod tick;

pub use actor::{Actor, ActorId, ActorState, ActorTable, CollisionProfile, Contact, Splash};
pub use collision::{can_hit_tile, elastic_response, in_range};
pub use damage::{apply_damage, damage_ship, damage_tile, falloff, splash_damage};
pub use dispatch::{kill, make, realize_pending, reap, remove, update_all};
pub use fixed::Topology;
pub use kinds::{ActorKind, KindId};
pub use map::{GridMap, Tile, TileMap};
pub use motion::{MotionPoint, ViewPoint, ViewPoints};
pub use pool::{Layer, ObjectHandle, ObjectPool, SimObject};
pub use ship::{Bolt, Ship};
pub use state::{ActorSnapshot, Checkpoint, GameEvent, Sim, replay, replay_from};
pub use tick::{TickInput, tick};
