//! Static actor kind table
//!
//! Each [`KindId`] maps to one immutable [`ActorKind`] record: sprite and
//! layer, collision profile, stats, sounds and the three behaviour
//! operations. The table is never mutated; any number of actors share a
//! record.

use serde::{Deserialize, Serialize};

use super::actor::{ActorId, CollisionProfile, Contact, HEALTH_INDESTRUCTIBLE, Splash};
use super::behaviors::{bases, effects, enemies, hazards, noop, projectiles};
use super::pool::Layer;
use super::state::Sim;
use crate::audio::SoundEffect;

/// A behaviour operation: runs with the actor as context and may freely
/// mutate the simulation.
pub type KindOp = fn(&mut Sim, ActorId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindId {
    // Projectiles
    Beam,
    RedBullet,
    BlueBullet,
    // Effects
    Explosion,
    SmallExplosion,
    BoltSpark,
    RockDebris,
    RingBurst,
    BombDetonation,
    // Hazards
    Bomb,
    SeekerBomb,
    Rock,
    Ring,
    // Map sentries and pipe walkers
    Cannon,
    Core,
    PipeIn,
    PipeOut,
    // Enemies
    Drone,
    Chaser,
    Dasher,
    Orbiter,
    Sniper,
    Splitter,
    MineLayer,
    MotherDrone,
    MotherChaser,
    MotherDasher,
    Fortress,
}

impl KindId {
    pub const COUNT: usize = 28;
    pub const ALL: [KindId; KindId::COUNT] = [
        KindId::Beam,
        KindId::RedBullet,
        KindId::BlueBullet,
        KindId::Explosion,
        KindId::SmallExplosion,
        KindId::BoltSpark,
        KindId::RockDebris,
        KindId::RingBurst,
        KindId::BombDetonation,
        KindId::Bomb,
        KindId::SeekerBomb,
        KindId::Rock,
        KindId::Ring,
        KindId::Cannon,
        KindId::Core,
        KindId::PipeIn,
        KindId::PipeOut,
        KindId::Drone,
        KindId::Chaser,
        KindId::Dasher,
        KindId::Orbiter,
        KindId::Sniper,
        KindId::Splitter,
        KindId::MineLayer,
        KindId::MotherDrone,
        KindId::MotherChaser,
        KindId::MotherDasher,
        KindId::Fortress,
    ];

    #[inline]
    pub fn def(self) -> &'static ActorKind {
        &KINDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

/// Sounds a kind triggers at fixed points of its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSounds {
    /// Played by the kind when it fires or launches something
    pub launch: Option<SoundEffect>,
    /// Damage that does not kill
    pub hit: Option<SoundEffect>,
    pub death: Option<SoundEffect>,
}

impl KindSounds {
    pub const SILENT: KindSounds = KindSounds {
        launch: None,
        hit: None,
        death: None,
    };
}

/// Immutable archetype record.
#[derive(Debug, Clone, Copy)]
pub struct ActorKind {
    pub id: KindId,
    pub name: &'static str,
    /// Added to the score when destroyed (not when removed silently)
    pub score: u32,
    /// Hit radius in pixels; `None` cannot be hit
    pub hit_size: Option<i32>,
    /// Sprite bounding size in pixels
    pub size: i32,
    pub health: i32,
    /// Damage dealt to the ship on contact
    pub damage: i32,
    pub splash: Splash,
    pub bank: u16,
    pub frame: u16,
    pub frames: u16,
    /// Ticks per animation frame; 0 holds the first frame
    pub frame_ticks: u16,
    pub layer: Layer,
    /// Movement speed, fixed point. Projectiles leave their launcher at their
    /// own kind's speed.
    pub launch_speed: i32,
    pub sounds: KindSounds,
    pub profile: CollisionProfile,
    pub make: KindOp,
    pub update: KindOp,
    pub kill: KindOp,
}

// Sprite banks
const BANK_SHOTS: u16 = 0;
const BANK_FX: u16 = 1;
const BANK_HAZARDS: u16 = 2;
const BANK_BASES: u16 = 3;
const BANK_ENEMIES: u16 = 4;
const BANK_BOSS: u16 = 5;

const BASE: ActorKind = ActorKind {
    id: KindId::Beam,
    name: "",
    score: 0,
    hit_size: None,
    size: 8,
    health: 1,
    damage: 0,
    splash: Splash::NONE,
    bank: 0,
    frame: 0,
    frames: 1,
    frame_ticks: 0,
    layer: Layer::Fx,
    launch_speed: 0,
    sounds: KindSounds::SILENT,
    profile: CollisionProfile::Ghost,
    make: noop,
    update: noop,
    kill: noop,
};

const SHOT: ActorKind = ActorKind {
    hit_size: Some(3),
    size: 6,
    damage: 10,
    bank: BANK_SHOTS,
    frames: 2,
    frame_ticks: 4,
    layer: Layer::Bullets,
    launch_speed: 3 * 256,
    profile: CollisionProfile::Free {
        shootable: false,
        physics: false,
        contact: Contact::Detonate,
    },
    make: projectiles::bullet_make,
    update: projectiles::bullet_update,
    kill: projectiles::bullet_kill,
    ..BASE
};

const EFFECT: ActorKind = ActorKind {
    size: 16,
    bank: BANK_FX,
    frames: 4,
    frame_ticks: 3,
    layer: Layer::Fx,
    update: effects::effect_update,
    ..BASE
};

const HAZARD: ActorKind = ActorKind {
    hit_size: Some(6),
    size: 12,
    health: 10,
    damage: 20,
    bank: BANK_HAZARDS,
    layer: Layer::Enemies,
    sounds: KindSounds {
        launch: None,
        hit: Some(SoundEffect::MetalHit),
        death: Some(SoundEffect::SmallExplosion),
    },
    profile: CollisionProfile::Free {
        shootable: true,
        physics: false,
        contact: Contact::Detonate,
    },
    update: hazards::drift_update,
    ..BASE
};

const SENTRY: ActorKind = ActorKind {
    hit_size: Some(8),
    size: 16,
    bank: BANK_BASES,
    layer: Layer::Bases,
    sounds: KindSounds {
        launch: None,
        hit: Some(SoundEffect::MetalHit),
        death: Some(SoundEffect::LargeExplosion),
    },
    profile: CollisionProfile::MapAttached { shootable: true },
    ..BASE
};

const PIPE: ActorKind = ActorKind {
    size: 0,
    bank: BANK_BASES,
    layer: Layer::Fx,
    make: bases::pipe_make,
    ..BASE
};

const ENEMY: ActorKind = ActorKind {
    hit_size: Some(7),
    size: 16,
    health: 20,
    damage: 20,
    bank: BANK_ENEMIES,
    frames: 2,
    frame_ticks: 8,
    layer: Layer::Enemies,
    launch_speed: 256,
    sounds: KindSounds {
        launch: None,
        hit: Some(SoundEffect::EnemyHit),
        death: Some(SoundEffect::SmallExplosion),
    },
    profile: CollisionProfile::Free {
        shootable: true,
        physics: false,
        contact: Contact::Damage,
    },
    make: enemies::roam_make,
    update: enemies::drone_update,
    kill: enemies::enemy_kill,
    ..BASE
};

const MOTHER: ActorKind = ActorKind {
    score: 500,
    hit_size: Some(12),
    size: 32,
    health: 80,
    damage: 40,
    frame_ticks: 12,
    launch_speed: 128,
    sounds: KindSounds {
        launch: Some(SoundEffect::Launch),
        hit: Some(SoundEffect::MetalHit),
        death: Some(SoundEffect::LargeExplosion),
    },
    update: enemies::mother_update,
    ..ENEMY
};

pub static KINDS: [ActorKind; KindId::COUNT] = [
    ActorKind {
        id: KindId::Beam,
        name: "beam",
        frame: 0,
        launch_speed: 4 * 256,
        ..SHOT
    },
    ActorKind {
        id: KindId::RedBullet,
        name: "red bullet",
        frame: 2,
        damage: 15,
        ..SHOT
    },
    ActorKind {
        id: KindId::BlueBullet,
        name: "blue bullet",
        frame: 4,
        launch_speed: 2 * 256,
        update: projectiles::homing_update,
        ..SHOT
    },
    ActorKind {
        id: KindId::Explosion,
        name: "explosion",
        size: 32,
        frames: 8,
        ..EFFECT
    },
    ActorKind {
        id: KindId::SmallExplosion,
        name: "small explosion",
        frame: 8,
        ..EFFECT
    },
    ActorKind {
        id: KindId::BoltSpark,
        name: "bolt spark",
        size: 8,
        frame: 12,
        frames: 3,
        frame_ticks: 2,
        ..EFFECT
    },
    ActorKind {
        id: KindId::RockDebris,
        name: "rock debris",
        size: 8,
        frame: 15,
        frame_ticks: 6,
        ..EFFECT
    },
    ActorKind {
        id: KindId::RingBurst,
        name: "ring burst",
        size: 24,
        frame: 19,
        frames: 6,
        ..EFFECT
    },
    ActorKind {
        id: KindId::BombDetonation,
        name: "bomb detonation",
        size: 48,
        frame: 25,
        frames: 6,
        splash: Splash {
            radius: 64,
            amount: 60,
        },
        update: effects::detonation_update,
        ..EFFECT
    },
    ActorKind {
        id: KindId::Bomb,
        name: "bomb",
        score: 10,
        frame: 0,
        frames: 2,
        frame_ticks: 10,
        update: hazards::bomb_update,
        kill: hazards::bomb_kill,
        ..HAZARD
    },
    ActorKind {
        id: KindId::SeekerBomb,
        name: "seeker bomb",
        score: 25,
        frame: 2,
        frames: 2,
        frame_ticks: 6,
        launch_speed: 2 * 256,
        update: hazards::seeker_update,
        kill: hazards::bomb_kill,
        ..HAZARD
    },
    ActorKind {
        id: KindId::Rock,
        name: "rock",
        hit_size: Some(10),
        size: 24,
        health: HEALTH_INDESTRUCTIBLE,
        damage: 10,
        frame: 4,
        launch_speed: 128,
        profile: CollisionProfile::Free {
            shootable: true,
            physics: true,
            contact: Contact::Damage,
        },
        make: hazards::drift_make,
        kill: hazards::rock_kill,
        ..HAZARD
    },
    ActorKind {
        id: KindId::Ring,
        name: "ring",
        score: 50,
        hit_size: Some(9),
        size: 20,
        health: 30,
        damage: 10,
        frame: 5,
        frames: 4,
        frame_ticks: 5,
        launch_speed: 192,
        profile: CollisionProfile::Free {
            shootable: true,
            physics: true,
            contact: Contact::Damage,
        },
        make: hazards::drift_make,
        kill: hazards::ring_kill,
        ..HAZARD
    },
    ActorKind {
        id: KindId::Cannon,
        name: "cannon",
        score: 200,
        health: 30,
        frame: 0,
        frames: 8,
        sounds: KindSounds {
            launch: Some(SoundEffect::CannonFire),
            hit: Some(SoundEffect::MetalHit),
            death: Some(SoundEffect::LargeExplosion),
        },
        make: bases::cannon_make,
        update: bases::cannon_update,
        kill: bases::cannon_kill,
        ..SENTRY
    },
    ActorKind {
        id: KindId::Core,
        name: "core",
        score: 1000,
        hit_size: Some(12),
        size: 24,
        health: 200,
        frame: 8,
        frames: 4,
        frame_ticks: 10,
        sounds: KindSounds {
            launch: Some(SoundEffect::CoreFire),
            hit: Some(SoundEffect::MetalHit),
            death: Some(SoundEffect::BaseDestroyed),
        },
        make: bases::core_make,
        update: bases::core_update,
        kill: bases::core_kill,
        ..SENTRY
    },
    ActorKind {
        id: KindId::PipeIn,
        name: "pipe in",
        damage: 50,
        update: bases::pipe_in_update,
        ..PIPE
    },
    ActorKind {
        id: KindId::PipeOut,
        name: "pipe out",
        damage: 1000,
        update: bases::pipe_out_update,
        ..PIPE
    },
    ActorKind {
        id: KindId::Drone,
        name: "drone",
        score: 100,
        frame: 0,
        ..ENEMY
    },
    ActorKind {
        id: KindId::Chaser,
        name: "chaser",
        score: 150,
        frame: 2,
        launch_speed: 384,
        update: enemies::chaser_update,
        ..ENEMY
    },
    ActorKind {
        id: KindId::Dasher,
        name: "dasher",
        score: 200,
        frame: 4,
        health: 30,
        update: enemies::dasher_update,
        ..ENEMY
    },
    ActorKind {
        id: KindId::Orbiter,
        name: "orbiter",
        score: 250,
        frame: 6,
        launch_speed: 3 * 256,
        make: enemies::orbiter_make,
        update: enemies::orbiter_update,
        ..ENEMY
    },
    ActorKind {
        id: KindId::Sniper,
        name: "sniper",
        score: 300,
        frame: 8,
        health: 40,
        launch_speed: 192,
        sounds: KindSounds {
            launch: Some(SoundEffect::EnemyShot),
            hit: Some(SoundEffect::EnemyHit),
            death: Some(SoundEffect::SmallExplosion),
        },
        update: enemies::sniper_update,
        ..ENEMY
    },
    ActorKind {
        id: KindId::Splitter,
        name: "splitter",
        score: 150,
        frame: 10,
        health: 30,
        kill: enemies::splitter_kill,
        ..ENEMY
    },
    ActorKind {
        id: KindId::MineLayer,
        name: "mine layer",
        score: 200,
        frame: 12,
        health: 40,
        launch_speed: 192,
        sounds: KindSounds {
            launch: Some(SoundEffect::BombDrop),
            hit: Some(SoundEffect::EnemyHit),
            death: Some(SoundEffect::SmallExplosion),
        },
        update: enemies::mine_layer_update,
        ..ENEMY
    },
    ActorKind {
        id: KindId::MotherDrone,
        name: "drone mother",
        frame: 14,
        ..MOTHER
    },
    ActorKind {
        id: KindId::MotherChaser,
        name: "chaser mother",
        frame: 16,
        ..MOTHER
    },
    ActorKind {
        id: KindId::MotherDasher,
        name: "dasher mother",
        frame: 18,
        ..MOTHER
    },
    ActorKind {
        id: KindId::Fortress,
        name: "fortress",
        score: 5000,
        hit_size: Some(20),
        size: 48,
        health: 400,
        damage: 60,
        bank: BANK_BOSS,
        frame: 0,
        frames: 4,
        frame_ticks: 6,
        launch_speed: 96,
        sounds: KindSounds {
            launch: Some(SoundEffect::EnemyShot),
            hit: Some(SoundEffect::MetalHit),
            death: Some(SoundEffect::LargeExplosion),
        },
        make: enemies::fortress_make,
        update: enemies::fortress_update,
        kill: enemies::fortress_kill,
        ..ENEMY
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_ids() {
        for (i, kind) in KindId::ALL.iter().enumerate() {
            assert_eq!(KINDS[i].id, *kind, "slot {i} holds {}", KINDS[i].name);
            assert_eq!(*kind as usize, i);
        }
    }

    #[test]
    fn test_names_unique_and_set() {
        let mut names: Vec<_> = KINDS.iter().map(|k| k.name).collect();
        assert!(names.iter().all(|n| !n.is_empty()));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KindId::COUNT);
    }

    #[test]
    fn test_map_attached_kinds_are_sentries() {
        for kind in &KINDS {
            if kind.profile.is_map_attached() {
                assert_eq!(kind.layer, Layer::Bases, "{}", kind.name);
            }
            if kind.profile.shootable() {
                assert!(kind.hit_size.is_some(), "{} is shootable without a hit box", kind.name);
            }
        }
    }

    #[test]
    fn test_frames_never_zero() {
        assert!(KINDS.iter().all(|k| k.frames >= 1));
    }
}
