//! Player ship and bolts
//!
//! The ship and its bolts are pooled objects like everything else but are
//! driven directly by player input instead of by a kind.

use glam::IVec2;

use super::fixed::{dir_vector, opposite, scale, vec_fx, vec_to_px};
use super::kinds::KindId;
use super::pool::{AnimState, Layer, ObjectHandle, Owner};
use super::state::{GameEvent, Sim};
use super::tick::TickInput;
use super::{dispatch, spawn};
use crate::audio::SoundEffect;

/// Sprite bank for ship and bolts
const BANK_PLAYER: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ship {
    pub obj: Option<ObjectHandle>,
    pub health: i32,
    pub alive: bool,
    /// Last non-zero steering direction; bolts fire along it
    pub facing: u8,
    /// Ticks until the next volley
    pub cooldown: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bolt {
    pub obj: ObjectHandle,
    /// Ticks left
    pub life: u32,
    pub dir: u8,
}

/// Put a fresh ship into the world at `pos` (fixed point).
pub fn spawn_ship(sim: &mut Sim, pos: IVec2) {
    if let Some(old) = sim.ship.obj.take() {
        sim.pool.release(old);
    }
    let Some(h) = sim.pool.acquire() else {
        log::warn!("ship: object pool exhausted");
        return;
    };
    let topo = sim.topo;
    if let Some(o) = sim.pool.get_mut(h) {
        o.motion.place(pos, &topo);
        o.size = sim.settings.ship_radius * 2;
        o.anim = AnimState::new(BANK_PLAYER, 0, 8, 0);
        o.flags.visible = true;
        o.owner = Some(Owner::Ship);
    }
    sim.pool.attach(h, Layer::Player);
    sim.ship = Ship {
        obj: Some(h),
        health: sim.settings.ship_health,
        alive: true,
        facing: 1,
        cooldown: 0,
    };
    let half_view = IVec2::new(sim.settings.view_width, sim.settings.view_height) / 2;
    sim.views.snap(pos - vec_fx(half_view), &topo);
}

/// Apply one tick of input: velocity from the stick, volley on fire.
pub fn steer(sim: &mut Sim, input: &TickInput) {
    if !sim.ship.alive {
        return;
    }
    let Some(h) = sim.ship.obj else {
        return;
    };
    let dir = input.dir.min(8);
    if dir != 0 {
        sim.ship.facing = dir;
    }
    let speed = sim.settings.ship_speed;
    let facing = sim.ship.facing;
    if let Some(o) = sim.pool.get_mut(h) {
        o.motion.vel = scale(dir_vector(dir), speed);
        o.anim.set_frame(facing as u16 - 1);
    }

    sim.ship.cooldown = sim.ship.cooldown.saturating_sub(1);
    if input.fire && sim.ship.cooldown == 0 {
        fire_volley(sim);
        sim.ship.cooldown = sim.settings.fire_interval;
    }
}

/// Two bolts: one along the facing, one straight behind.
fn fire_volley(sim: &mut Sim) {
    let Some(pos) = sim.ship_pos() else {
        return;
    };
    let facing = sim.ship.facing;
    let mut fired = false;
    for dir in [facing, opposite(facing)] {
        fired |= fire_bolt(sim, pos, dir);
    }
    if fired {
        sim.play_at(SoundEffect::BoltFire, vec_to_px(pos));
    }
}

fn fire_bolt(sim: &mut Sim, pos: IVec2, dir: u8) -> bool {
    let Some(slot) = sim.bolts.iter().position(Option::is_none) else {
        return false;
    };
    let Some(h) = sim.pool.acquire() else {
        log::debug!("bolt dropped: object pool exhausted");
        return false;
    };
    let topo = sim.topo;
    if let Some(o) = sim.pool.get_mut(h) {
        o.motion.place(pos, &topo);
        o.motion.vel = scale(dir_vector(dir), sim.settings.bolt_speed);
        o.size = 4;
        o.anim = AnimState::new(BANK_PLAYER, 8, 8, 0);
        o.anim.set_frame(dir.saturating_sub(1) as u16);
        o.flags.visible = true;
        o.owner = Some(Owner::Bolt);
    }
    sim.pool.attach(h, Layer::Bullets);
    sim.bolts[slot] = Some(Bolt {
        obj: h,
        life: sim.settings.bolt_lifetime,
        dir,
    });
    true
}

/// Release a bolt slot and its object.
pub fn retire_bolt(sim: &mut Sim, slot: usize) {
    if let Some(bolt) = sim.bolts.get_mut(slot).and_then(Option::take) {
        sim.pool.release(bolt.obj);
    }
}

/// Post-integration fixups: walls stop the ship, bolts age.
pub fn after_motion(sim: &mut Sim) {
    if let Some(pos) = sim.ship_pos_px() {
        if sim.tile_at(pos).is_solid() {
            if let Some(o) = sim.ship.obj.and_then(|h| sim.pool.get_mut(h)) {
                o.motion.revert();
            }
        }
    }

    for slot in 0..sim.bolts.len() {
        let expired = match sim.bolts[slot].as_mut() {
            Some(bolt) => {
                bolt.life = bolt.life.saturating_sub(1);
                bolt.life == 0
            }
            None => false,
        };
        if expired {
            retire_bolt(sim, slot);
        }
    }
}

/// Ship health hits zero: explode, drop every bolt, tell the host.
pub fn destroy_ship(sim: &mut Sim) {
    if !sim.ship.alive {
        return;
    }
    let pos = sim.ship_pos().unwrap_or(IVec2::ZERO);
    sim.ship.alive = false;
    if let Some(h) = sim.ship.obj {
        sim.pool.detach(h);
        if let Some(o) = sim.pool.get_mut(h) {
            o.flags.visible = false;
            o.motion.vel = IVec2::ZERO;
        }
    }
    for slot in 0..sim.bolts.len() {
        retire_bolt(sim, slot);
    }
    let px = vec_to_px(pos);
    sim.play_at(SoundEffect::ShipExplode, px);
    sim.events.push(GameEvent::ShipDestroyed { x: px.x, y: px.y });
    spawn::ring(sim, KindId::SmallExplosion, pos, 6, 256, 0);
    dispatch::make(sim, KindId::Explosion, pos, IVec2::ZERO, 0);
    log::info!("ship destroyed at tick {}", sim.tick);
}
