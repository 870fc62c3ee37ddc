//! Per-kind behaviour operations
//!
//! Every function here has the [`KindOp`](super::kinds::KindOp) shape and is
//! bound to one or more kinds in the kind table. The helpers below are the
//! vocabulary they share.
//!
//! Register conventions: `a` is the main countdown (fire, fuse, step),
//! `b` a secondary timer, `count` a tally (children launched, volleys fired).

pub mod bases;
pub mod effects;
pub mod enemies;
pub mod hazards;
pub mod projectiles;

use glam::IVec2;
use rand::Rng;

use super::actor::ActorId;
use super::dispatch::make;
use super::fixed::{aim, dir_towards, dir_vector, scale, vec_to_px};
use super::kinds::KindId;
use super::state::Sim;

/// Behaviour that does nothing.
pub fn noop(_sim: &mut Sim, _id: ActorId) {}

pub(crate) fn pos(sim: &Sim, id: ActorId) -> IVec2 {
    sim.actor_pos(id).unwrap_or(IVec2::ZERO)
}

pub(crate) fn pos_px(sim: &Sim, id: ActorId) -> IVec2 {
    vec_to_px(pos(sim, id))
}

pub(crate) fn vel(sim: &Sim, id: ActorId) -> IVec2 {
    sim.actor_vel(id).unwrap_or(IVec2::ZERO)
}

pub(crate) fn set_vel(sim: &mut Sim, id: ActorId, vel: IVec2) {
    if let Some(o) = sim.object_mut(id) {
        o.motion.vel = vel;
    }
}

pub(crate) fn set_acc(sim: &mut Sim, id: ActorId, acc: IVec2) {
    if let Some(o) = sim.object_mut(id) {
        o.motion.acc = acc;
    }
}

/// Teleport to a fixed-point position.
pub(crate) fn place(sim: &mut Sim, id: ActorId, at: IVec2) {
    let topo = sim.topo;
    if let Some(o) = sim.object_mut(id) {
        o.motion.place(at, &topo);
    }
}

/// Movement speed of the actor's own kind.
pub(crate) fn speed(sim: &Sim, id: ActorId) -> i32 {
    sim.actors[id].kind.map_or(0, |k| k.def().launch_speed)
}

/// Wrapped pixel offset from the actor to the ship.
pub(crate) fn to_player(sim: &Sim, id: ActorId) -> Option<IVec2> {
    let ship = sim.ship_pos_px()?;
    Some(sim.topo.delta_px(pos_px(sim, id), ship))
}

pub(crate) fn random_dir(sim: &mut Sim) -> u8 {
    sim.rng.random_range(1..=8)
}

pub(crate) fn heading(dir: u8, speed: i32) -> IVec2 {
    scale(dir_vector(dir), speed)
}

/// Count `a` down; when it runs out, reload it and report ready.
pub(crate) fn fire_ready(sim: &mut Sim, id: ActorId, reload: i32) -> bool {
    let a = &mut sim.actors[id].a;
    if *a > 0 {
        *a -= 1;
        false
    } else {
        *a = reload;
        true
    }
}

/// Flip velocity components that would carry the actor into a solid tile.
pub(crate) fn bounce_off_walls(sim: &mut Sim, id: ActorId) -> bool {
    let Some(o) = sim.object(id) else {
        return false;
    };
    let (p, v) = (o.motion.pos, o.motion.vel);
    let mut out = v;
    if sim.tile_at(vec_to_px(IVec2::new(p.x.wrapping_add(v.x), p.y))).is_solid() {
        out.x = v.x.saturating_neg();
    }
    if sim.tile_at(vec_to_px(IVec2::new(p.x, p.y.wrapping_add(v.y)))).is_solid() {
        out.y = v.y.saturating_neg();
    }
    if out == v {
        return false;
    }
    set_vel(sim, id, out);
    true
}

/// Play the actor's launch sound at its position.
pub(crate) fn launch_sound(sim: &mut Sim, id: ActorId) {
    let effect = sim.actors[id].kind.and_then(|k| k.def().sounds.launch);
    if let Some(effect) = effect {
        let at = pos_px(sim, id);
        sim.play_at(effect, at);
    }
}

/// Fire a projectile of `kind` at the ship.
pub(crate) fn fire_at_player(sim: &mut Sim, id: ActorId, kind: KindId) -> bool {
    let Some(d) = to_player(sim, id) else {
        return false;
    };
    let vel = aim(d, kind.def().launch_speed);
    let at = pos(sim, id);
    if make(sim, kind, at, vel, dir_towards(d)).is_none() {
        return false;
    }
    launch_sound(sim, id);
    true
}

/// Drop a stationary effect where the actor is.
pub(crate) fn burst(sim: &mut Sim, id: ActorId, kind: KindId) {
    let at = pos(sim, id);
    make(sim, kind, at, IVec2::ZERO, 0);
}
