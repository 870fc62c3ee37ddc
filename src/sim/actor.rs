//! Actor slots
//!
//! An actor is the behavioural half of an enemy, projectile or effect: kind
//! reference, AI registers, health and collision profile. Its pooled
//! [`SimObject`](super::pool::SimObject) carries motion and animation.
//!
//! Lifecycle: `Unused -> Reserved -> Moving`, plus the implicit dead state
//! where `kind` is `None`. A dead slot only becomes `Unused` again when
//! [`reap`](super::dispatch::reap) releases its object.

use std::ops::{Index, IndexMut};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::kinds::KindId;
use super::pool::ObjectHandle;
use crate::audio::VoiceHandle;

/// Health value that absorbs any damage.
pub const HEALTH_INDESTRUCTIBLE: i32 = i32::MAX;

/// Index into the [`ActorTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    #[default]
    Unused,
    /// Spawned, not yet visible to the update sweep
    Reserved,
    Moving,
}

/// What touching the ship does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    Harmless,
    /// Hurts the ship; the actor takes ram damage
    Damage,
    /// Hurts the ship and destroys the actor
    Detonate,
}

/// How an actor takes part in collision.
///
/// Map-attached actors are found by tile queries only, free ones by range
/// queries only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionProfile {
    /// Never collides
    Ghost,
    Free {
        shootable: bool,
        /// Bounces off the ship instead of overlapping it
        physics: bool,
        contact: Contact,
    },
    MapAttached { shootable: bool },
}

impl CollisionProfile {
    pub fn shootable(self) -> bool {
        match self {
            CollisionProfile::Ghost => false,
            CollisionProfile::Free { shootable, .. } => shootable,
            CollisionProfile::MapAttached { shootable } => shootable,
        }
    }

    pub fn receives_splash(self) -> bool {
        matches!(self, CollisionProfile::Free { shootable: true, .. })
    }

    pub fn is_map_attached(self) -> bool {
        matches!(self, CollisionProfile::MapAttached { .. })
    }

    pub fn uses_physics(self) -> bool {
        matches!(self, CollisionProfile::Free { physics: true, .. })
    }

    pub fn contact(self) -> Contact {
        match self {
            CollisionProfile::Free { contact, .. } => contact,
            _ => Contact::Harmless,
        }
    }
}

/// Area damage dealt when the actor goes off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splash {
    /// Pixels
    pub radius: i32,
    pub amount: i32,
}

impl Splash {
    pub const NONE: Splash = Splash { radius: 0, amount: 0 };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub state: ActorState,
    /// `None` while unused or dead
    pub kind: Option<KindId>,
    pub obj: Option<ObjectHandle>,
    /// 8-way heading (0 = none)
    pub di: u8,
    /// AI scratch registers; meaning depends on the kind
    pub a: i32,
    pub b: i32,
    pub count: i32,
    /// Map tile for map-attached and pipe-walking kinds
    pub tile: IVec2,
    pub health: i32,
    /// Damage dealt to the ship on contact
    pub damage: i32,
    pub splash: Splash,
    pub profile: CollisionProfile,
    /// Hit radius in pixels; `None` cannot be hit
    pub hit_size: Option<i32>,
    /// Wrapped pixel distance to the ship, refreshed before each update sweep
    pub dist_to_player: i32,
    pub spawned_tick: u64,
    pub last_update_tick: Option<u64>,
    pub voice: Option<VoiceHandle>,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            state: ActorState::Unused,
            kind: None,
            obj: None,
            di: 0,
            a: 0,
            b: 0,
            count: 0,
            tile: IVec2::ZERO,
            health: 0,
            damage: 0,
            splash: Splash::NONE,
            profile: CollisionProfile::Ghost,
            hit_size: None,
            dist_to_player: i32::MAX,
            spawned_tick: 0,
            last_update_tick: None,
            voice: None,
        }
    }
}

impl Actor {
    /// Live: has a kind and has been realized.
    pub fn is_moving(&self) -> bool {
        self.state == ActorState::Moving && self.kind.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.state != ActorState::Unused && self.kind.is_none()
    }
}

/// Fixed-capacity actor slots.
///
/// Slots are searched lowest-first, so which slot an actor lands in depends
/// only on simulation history, never on the object pool's free-list order.
#[derive(Debug, Clone)]
pub struct ActorTable {
    slots: Vec<Actor>,
    high_water: usize,
}

impl ActorTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Actor::default(); capacity],
            high_water: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// One past the highest slot that was in use at the last realize pass.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn set_high_water(&mut self, high_water: usize) {
        self.high_water = high_water.min(self.slots.len());
    }

    pub fn find_unused(&self) -> Option<ActorId> {
        self.slots
            .iter()
            .position(|a| a.state == ActorState::Unused)
            .map(ActorId::new)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots.get(id.index())
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots.iter().enumerate().map(|(i, a)| (ActorId::new(i), a))
    }

    /// Live actors in slot order.
    pub fn iter_moving(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.iter().filter(|(_, a)| a.is_moving())
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|a| a.kind.is_some()).count()
    }

    pub fn count_kind(&self, kind: KindId) -> usize {
        self.slots.iter().filter(|a| a.kind == Some(kind)).count()
    }
}

impl Index<ActorId> for ActorTable {
    type Output = Actor;

    fn index(&self, id: ActorId) -> &Actor {
        &self.slots[id.index()]
    }
}

impl IndexMut<ActorId> for ActorTable {
    fn index_mut(&mut self, id: ActorId) -> &mut Actor {
        &mut self.slots[id.index()]
    }
}
