//! Free-roaming enemies, their mothers and the fortress

use glam::IVec2;
use rand::Rng;

use super::{
    bounce_off_walls, burst, fire_at_player, fire_ready, heading, launch_sound, pos, pos_px, random_dir,
    set_acc, set_vel, speed, to_player, vel,
};
use crate::audio::{AudioChannel, SoundEffect};
use crate::sim::actor::ActorId;
use crate::sim::dispatch::make;
use crate::sim::fixed::{ANGLE_STEPS, aim, angle_vector, dir_towards, fx, length, scale, turn_towards};
use crate::sim::kinds::KindId;
use crate::sim::spawn;
use crate::sim::state::Sim;

/// Ticks between random course changes
const TURN_INTERVAL: i32 = 60;
/// Ticks between chaser course corrections
const CHASE_INTERVAL: i32 = 12;

const DASH_RANGE: i32 = 300;
const DASH_TICKS: i32 = 20;
const DASH_REST: i32 = 60;
const DASH_THRUST: i32 = 32;
/// Per-tick velocity retention while resting, 24.8
const DRAG: i32 = 240;

const ORBIT_RADIUS: i32 = 96;
/// Ticks per fine-compass step around the orbit
const ORBIT_RATE: i32 = 4;

const SNIPER_NEAR: i32 = 130;
const SNIPER_FAR: i32 = 170;
const SNIPER_RANGE: i32 = 320;
const SNIPER_DELAY: i32 = 120;

const MINE_DELAY: i32 = 150;

const MOTHER_DELAY: i32 = 200;
/// Children a mother launches over its life
const MOTHER_BROOD: i32 = 6;

const FORTRESS_RANGE: i32 = 400;
const FORTRESS_DELAY: i32 = 90;
const FORTRESS_RING: usize = 12;
const FORTRESS_FAN: usize = 5;

/// Start moving along the given heading, or a random one.
pub fn roam_make(sim: &mut Sim, id: ActorId) {
    let di = match sim.actors[id].di {
        0 => random_dir(sim),
        d => d,
    };
    let fire = sim.rng.random_range(30..90);
    let turn = sim.rng.random_range(0..TURN_INTERVAL);
    let actor = &mut sim.actors[id];
    actor.di = di;
    actor.a = fire;
    actor.b = turn;
    let v = heading(di, speed(sim, id));
    set_vel(sim, id, v);
}

/// Pick a new heading every so often; keep off the walls.
fn wander(sim: &mut Sim, id: ActorId) {
    if sim.actors[id].b > 0 {
        sim.actors[id].b -= 1;
    } else {
        sim.actors[id].b = TURN_INTERVAL;
        let di = random_dir(sim);
        sim.actors[id].di = di;
        let v = heading(di, speed(sim, id));
        set_vel(sim, id, v);
    }
    if bounce_off_walls(sim, id) {
        sim.actors[id].di = dir_towards(vel(sim, id));
    }
}

pub fn drone_update(sim: &mut Sim, id: ActorId) {
    wander(sim, id);
}

/// Swing one compass step toward the ship at a fixed cadence.
pub fn chaser_update(sim: &mut Sim, id: ActorId) {
    if sim.actors[id].b > 0 {
        sim.actors[id].b -= 1;
    } else if let Some(d) = to_player(sim, id) {
        sim.actors[id].b = CHASE_INTERVAL;
        let di = turn_towards(sim.actors[id].di, dir_towards(d));
        sim.actors[id].di = di;
        let v = heading(di, speed(sim, id));
        set_vel(sim, id, v);
    } else {
        wander(sim, id);
        return;
    }
    if bounce_off_walls(sim, id) {
        sim.actors[id].di = dir_towards(vel(sim, id));
    }
}

/// Wander until the ship is close, then burn toward it and coast to a stop.
///
/// `count` holds the dash ticks left, `b` the rest ticks left.
pub fn dasher_update(sim: &mut Sim, id: ActorId) {
    let actor = &sim.actors[id];
    let (dashing, resting) = (actor.count, actor.b);
    if dashing > 0 {
        sim.actors[id].count -= 1;
        let cap = speed(sim, id) * 4;
        let v = vel(sim, id);
        if length(v) > cap {
            set_vel(sim, id, aim(v, cap));
        }
        if dashing == 1 {
            set_acc(sim, id, IVec2::ZERO);
            sim.actors[id].b = DASH_REST;
        }
    } else if resting > 0 {
        sim.actors[id].b -= 1;
        let v = scale(vel(sim, id), DRAG);
        set_vel(sim, id, v);
    } else {
        let close = sim.actors[id].dist_to_player <= DASH_RANGE;
        match to_player(sim, id) {
            Some(d) if close => {
                set_acc(sim, id, aim(d, DASH_THRUST));
                sim.actors[id].count = DASH_TICKS;
                sim.actors[id].di = dir_towards(d);
            }
            _ => wander(sim, id),
        }
    }
    bounce_off_walls(sim, id);
}

pub fn orbiter_make(sim: &mut Sim, id: ActorId) {
    roam_make(sim, id);
    sim.actors[id].count = sim.rng.random_range(0..ANGLE_STEPS * ORBIT_RATE);
}

/// Circle the ship at a fixed radius.
pub fn orbiter_update(sim: &mut Sim, id: ActorId) {
    let Some(ship) = sim.ship_pos() else {
        wander(sim, id);
        return;
    };
    let actor = &mut sim.actors[id];
    actor.count = (actor.count + 1) % (ANGLE_STEPS * ORBIT_RATE);
    let angle = actor.count / ORBIT_RATE;
    let target = ship + scale(angle_vector(angle), fx(ORBIT_RADIUS));
    let delta = sim.topo.delta_fx(pos(sim, id), target);
    let top = speed(sim, id);
    let v = if length(delta) <= top { delta } else { aim(delta, top) };
    set_vel(sim, id, v);
    sim.actors[id].di = dir_towards(v);
}

/// Hold a firing distance from the ship and take potshots.
pub fn sniper_update(sim: &mut Sim, id: ActorId) {
    let Some(d) = to_player(sim, id) else {
        wander(sim, id);
        return;
    };
    let dist = sim.actors[id].dist_to_player;
    let top = speed(sim, id);
    let v = if dist < SNIPER_NEAR {
        aim(-d, top)
    } else if dist > SNIPER_FAR {
        aim(d, top)
    } else {
        IVec2::ZERO
    };
    set_vel(sim, id, v);
    sim.actors[id].di = dir_towards(d);
    bounce_off_walls(sim, id);

    let reload = sim.settings.fire_delay(SNIPER_DELAY);
    if fire_ready(sim, id, reload) && dist <= SNIPER_RANGE {
        fire_at_player(sim, id, KindId::RedBullet);
    }
}

pub fn splitter_kill(sim: &mut Sim, id: ActorId) {
    enemy_kill(sim, id);
    let at = pos(sim, id);
    let di = sim.actors[id].di;
    spawn::pair(sim, KindId::Drone, at, di, KindId::Drone.def().launch_speed);
}

/// Wander and drop a bomb now and then.
pub fn mine_layer_update(sim: &mut Sim, id: ActorId) {
    wander(sim, id);
    let reload = sim.settings.fire_delay(MINE_DELAY);
    if fire_ready(sim, id, reload) {
        let at = pos(sim, id);
        if make(sim, KindId::Bomb, at, IVec2::ZERO, 0).is_some() {
            launch_sound(sim, id);
        }
    }
}

fn brood(kind: Option<KindId>) -> KindId {
    match kind {
        Some(KindId::MotherChaser) => KindId::Chaser,
        Some(KindId::MotherDasher) => KindId::Dasher,
        _ => KindId::Drone,
    }
}

/// Wander and launch children until the brood is spent.
pub fn mother_update(sim: &mut Sim, id: ActorId) {
    wander(sim, id);
    let reload = sim.settings.fire_delay(MOTHER_DELAY);
    if !fire_ready(sim, id, reload) || sim.actors[id].count >= MOTHER_BROOD {
        return;
    }
    let child = brood(sim.actors[id].kind);
    let di = random_dir(sim);
    let at = pos(sim, id);
    let v = heading(di, child.def().launch_speed);
    if make(sim, child, at, v, di).is_some() {
        sim.actors[id].count += 1;
        launch_sound(sim, id);
    }
}

pub fn fortress_make(sim: &mut Sim, id: ActorId) {
    roam_make(sim, id);
    let at = pos_px(sim, id);
    let voice = sim.audio.start(SoundEffect::FortressHum, at.x, at.y);
    sim.actors[id].voice = Some(voice);
}

/// Creep toward the ship, alternating bullet rings with aimed fans. The
/// engine hum follows the fortress and rises in pitch as the ship closes in.
pub fn fortress_update(sim: &mut Sim, id: ActorId) {
    let target = to_player(sim, id);
    if let Some(d) = target {
        let v = aim(d, speed(sim, id));
        set_vel(sim, id, v);
    }
    bounce_off_walls(sim, id);

    let dist = sim.actors[id].dist_to_player;
    if let Some(voice) = sim.actors[id].voice {
        let at = pos_px(sim, id);
        sim.audio.move_to(voice, at.x, at.y);
        let pitch = 256 + (FORTRESS_RANGE - dist.min(FORTRESS_RANGE)) / 4;
        if pitch != sim.actors[id].b {
            sim.actors[id].b = pitch;
            sim.audio.control(voice, AudioChannel::Pitch, pitch);
        }
    }

    let reload = sim.settings.fire_delay(FORTRESS_DELAY);
    let Some(d) = target else {
        return;
    };
    if !fire_ready(sim, id, reload) || dist > FORTRESS_RANGE {
        return;
    }
    let at = pos(sim, id);
    let volley = sim.actors[id].count;
    let fired = if volley % 2 == 0 {
        let speed = KindId::BlueBullet.def().launch_speed;
        spawn::ring(sim, KindId::BlueBullet, at, FORTRESS_RING, speed, volley * 2)
    } else {
        let speed = KindId::RedBullet.def().launch_speed;
        spawn::fan(sim, KindId::RedBullet, at, d, FORTRESS_FAN, 3, speed)
    };
    if fired > 0 {
        sim.actors[id].count += 1;
        launch_sound(sim, id);
    }
}

pub fn fortress_kill(sim: &mut Sim, id: ActorId) {
    let at = pos(sim, id);
    spawn::ring(sim, KindId::Explosion, at, 6, fx(1), 0);
    burst(sim, id, KindId::Explosion);
}

/// Leave an explosion sized to the enemy.
pub fn enemy_kill(sim: &mut Sim, id: ActorId) {
    let size = sim.object(id).map_or(0, |o| o.size);
    let effect = if size >= 32 {
        KindId::Explosion
    } else {
        KindId::SmallExplosion
    };
    burst(sim, id, effect);
}
