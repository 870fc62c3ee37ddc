//! Actor behaviour dispatch
//!
//! The driver knows nothing about individual kinds. It moves actors through
//! `Unused -> Reserved -> Moving -> dead`, calls the kind's operations at the
//! right moments, and keeps the two sweeps of a tick separate: anything
//! spawned during the update sweep stays `Reserved` until the next realize
//! pass and so is never updated in the tick that created it.

use glam::IVec2;

use super::actor::{Actor, ActorId, ActorState};
use super::fixed::vec_to_px;
use super::kinds::KindId;
use super::pool::{AnimState, Owner};
use super::state::{GameEvent, Sim};

/// Spawn an actor of `kind` at `pos` moving at `vel` (both fixed point).
///
/// Needs a free actor slot and a free pool object; when either is exhausted
/// the request is dropped and `None` returned. The kind's make operation
/// runs before this returns; the actor becomes visible on the next realize
/// pass.
pub fn make(sim: &mut Sim, kind: KindId, pos: IVec2, vel: IVec2, dir: u8) -> Option<ActorId> {
    let Some(id) = sim.actors.find_unused() else {
        return dropped(sim, kind, "actor table full");
    };
    let Some(obj) = sim.pool.acquire() else {
        return dropped(sim, kind, "object pool exhausted");
    };
    let def = kind.def();
    let topo = sim.topo;
    if let Some(o) = sim.pool.get_mut(obj) {
        o.motion.place(pos, &topo);
        o.motion.vel = vel;
        o.size = def.size;
        o.anim = AnimState::new(def.bank, def.frame, def.frames, def.frame_ticks);
        o.flags.visible = def.size > 0;
        o.flags.animated = def.frame_ticks > 0;
        o.owner = Some(Owner::Actor(kind));
    }
    sim.actors[id] = Actor {
        state: ActorState::Reserved,
        kind: Some(kind),
        obj: Some(obj),
        di: dir.min(8),
        tile: topo.tile_of(vec_to_px(pos)),
        health: def.health,
        damage: def.damage,
        splash: def.splash,
        profile: def.profile,
        hit_size: def.hit_size,
        spawned_tick: sim.tick,
        ..Actor::default()
    };
    (def.make)(sim, id);
    Some(id)
}

fn dropped(sim: &mut Sim, kind: KindId, why: &str) -> Option<ActorId> {
    log::debug!("spawn of {} dropped at tick {}: {}", kind.name(), sim.tick, why);
    sim.events.push(GameEvent::SpawnDropped { kind });
    None
}

/// First sweep: link every reserved actor into its layer and recompute the
/// live high-water mark.
pub fn realize_pending(sim: &mut Sim) {
    let mut high_water = 0;
    for i in 0..sim.actors.capacity() {
        let actor = &mut sim.actors[ActorId::new(i)];
        if actor.state == ActorState::Reserved {
            if let (Some(kind), Some(obj)) = (actor.kind, actor.obj) {
                actor.state = ActorState::Moving;
                sim.pool.attach(obj, kind.def().layer);
            }
        }
        if actor.state != ActorState::Unused {
            high_water = i + 1;
        }
    }
    sim.actors.set_high_water(high_water);
}

/// Cache each live actor's wrapped distance to the ship.
pub fn refresh_player_distance(sim: &mut Sim) {
    let ship = sim.ship_pos_px();
    for i in 0..sim.actors.high_water() {
        let id = ActorId::new(i);
        let dist = match (ship, sim.actor_pos_px(id)) {
            (Some(s), Some(p)) => sim.topo.distance_px(s, p),
            _ => i32::MAX,
        };
        sim.actors[id].dist_to_player = dist;
    }
}

/// Second sweep: run every live actor's update operation once.
///
/// The range is fixed before the sweep starts. An actor killed by its own or
/// another actor's update is skipped from then on.
pub fn update_all(sim: &mut Sim) {
    let end = sim.actors.high_water();
    for i in 0..end {
        let id = ActorId::new(i);
        let actor = &sim.actors[id];
        if actor.state != ActorState::Moving {
            continue;
        }
        let Some(kind) = actor.kind else {
            continue;
        };
        sim.actors[id].last_update_tick = Some(sim.tick);
        (kind.def().update)(sim, id);

        // Gone: the slot is off limits for the rest of the tick
        if sim.actors[id].kind.is_none() {
            continue;
        }
        if let Some(o) = sim.object_mut(id) {
            if o.flags.animated {
                o.anim.advance();
            }
        }
    }
}

/// Destroy an actor: score, event, death sound, the kind's kill operation,
/// then release of the kind. Runs at most once per actor.
pub fn kill(sim: &mut Sim, id: ActorId) {
    let Some(kind) = sim.actors.get(id).and_then(|a| a.kind) else {
        return;
    };
    match sim.object_mut(id) {
        Some(o) if o.flags.dying => return,
        Some(o) => o.flags.dying = true,
        None => {}
    }
    if let Some(a) = sim.actors.get_mut(id) {
        a.health = a.health.min(0);
    }
    let def = kind.def();
    let pos = sim.actor_pos_px(id).unwrap_or(IVec2::ZERO);
    sim.events.push(GameEvent::ActorKilled {
        kind,
        x: pos.x,
        y: pos.y,
    });
    sim.add_score(def.score);
    if let Some(effect) = def.sounds.death {
        sim.play_at(effect, pos);
    }
    (def.kill)(sim, id);
    release_kind(sim, id);
}

/// Remove an actor without scoring or running its kill operation
/// (expired shots, finished effects).
pub fn remove(sim: &mut Sim, id: ActorId) {
    release_kind(sim, id);
}

/// Null the kind and unlink the object. The slot stays dead until [`reap`].
fn release_kind(sim: &mut Sim, id: ActorId) {
    let Some(actor) = sim.actors.get_mut(id) else {
        return;
    };
    if actor.kind.take().is_none() {
        return;
    }
    let voice = actor.voice.take();
    if let Some(obj) = actor.obj {
        sim.pool.detach(obj);
        if let Some(o) = sim.pool.get_mut(obj) {
            o.owner = None;
            o.flags.visible = false;
        }
    }
    if let Some(voice) = voice {
        sim.audio.stop(voice);
    }
}

/// Return dead slots' objects to the pool and mark the slots unused.
pub fn reap(sim: &mut Sim) {
    for i in 0..sim.actors.capacity() {
        let actor = &mut sim.actors[ActorId::new(i)];
        if !actor.is_dead() {
            continue;
        }
        if let Some(obj) = actor.obj.take() {
            sim.pool.release(obj);
        }
        *actor = Actor::default();
    }
}
