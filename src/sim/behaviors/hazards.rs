//! Bombs, seeker bombs, rocks and rings

use glam::IVec2;
use rand::Rng;

use super::{bounce_off_walls, burst, pos, set_acc, set_vel, speed, to_player, vel};
use crate::sim::actor::ActorId;
use crate::sim::dispatch::{make, remove};
use crate::sim::fixed::{ANGLE_STEPS, aim, angle_vector, length, scale};
use crate::sim::kinds::KindId;
use crate::sim::spawn;
use crate::sim::state::Sim;

/// Ticks before an untouched bomb goes off by itself
const BOMB_FUSE: i32 = 600;
/// Pixels within which a seeker bomb homes
const SEEK_RANGE: i32 = 160;
/// Seeker thrust, fixed point per tick
const SEEK_THRUST: i32 = 16;
/// Per-tick velocity retention, 24.8
const DRAG: i32 = 240;

/// Random heading at the kind's speed.
pub fn drift_make(sim: &mut Sim, id: ActorId) {
    let angle = sim.rng.random_range(0..ANGLE_STEPS);
    let v = scale(angle_vector(angle), speed(sim, id));
    set_vel(sim, id, v);
}

pub fn drift_update(sim: &mut Sim, id: ActorId) {
    bounce_off_walls(sim, id);
}

/// Bombs drift to a stop and go off when the fuse burns down.
pub fn bomb_update(sim: &mut Sim, id: ActorId) {
    let actor = &mut sim.actors[id];
    actor.a += 1;
    if actor.a >= BOMB_FUSE {
        detonate(sim, id);
        return;
    }
    let v = scale(vel(sim, id), DRAG);
    set_vel(sim, id, v);
    bounce_off_walls(sim, id);
}

/// Home in on a nearby ship, capped at the kind's speed.
pub fn seeker_update(sim: &mut Sim, id: ActorId) {
    let near = sim.actors[id].dist_to_player <= SEEK_RANGE;
    match to_player(sim, id) {
        Some(d) if near => {
            set_acc(sim, id, aim(d, SEEK_THRUST));
            let v = vel(sim, id);
            let cap = speed(sim, id);
            if length(v) > cap {
                set_vel(sim, id, aim(v, cap));
            }
        }
        _ => {
            set_acc(sim, id, IVec2::ZERO);
            let v = scale(vel(sim, id), DRAG);
            set_vel(sim, id, v);
        }
    }
    bounce_off_walls(sim, id);
}

/// Replace the bomb with its blast without scoring.
fn detonate(sim: &mut Sim, id: ActorId) {
    let at = pos(sim, id);
    make(sim, KindId::BombDetonation, at, IVec2::ZERO, 0);
    remove(sim, id);
}

pub fn bomb_kill(sim: &mut Sim, id: ActorId) {
    burst(sim, id, KindId::BombDetonation);
}

pub fn rock_kill(sim: &mut Sim, id: ActorId) {
    let at = pos(sim, id);
    spawn::ring(sim, KindId::RockDebris, at, 4, 192, 8);
}

pub fn ring_kill(sim: &mut Sim, id: ActorId) {
    burst(sim, id, KindId::RingBurst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimSettings;
    use crate::sim::dispatch::{kill, realize_pending, refresh_player_distance, update_all};
    use crate::sim::fixed::vec_fx;
    use crate::sim::map::GridMap;

    fn sim() -> Sim {
        Sim::new(SimSettings::default(), Box::new(GridMap::new(64, 64)), 9)
    }

    #[test]
    fn test_drift_make_uses_kind_speed() {
        let mut sim = sim();
        let id = make(&mut sim, KindId::Ring, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        let v = vel(&sim, id);
        let s = KindId::Ring.def().launch_speed;
        assert!((length(v) - s).abs() <= 3, "{v:?}");
    }

    #[test]
    fn test_bomb_fuse_detonates_without_score() {
        let mut sim = sim();
        let id = make(&mut sim, KindId::Bomb, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        sim.actors[id].a = BOMB_FUSE - 1;
        update_all(&mut sim);
        assert!(sim.actors[id].is_dead());
        assert_eq!(sim.score, 0);
        assert_eq!(sim.actors.count_kind(KindId::BombDetonation), 1);
    }

    #[test]
    fn test_killed_bomb_leaves_detonation() {
        let mut sim = sim();
        let id = make(&mut sim, KindId::SeekerBomb, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        kill(&mut sim, id);
        assert_eq!(sim.actors.count_kind(KindId::BombDetonation), 1);
        assert_eq!(sim.score, KindId::SeekerBomb.def().score as u64);
    }

    #[test]
    fn test_seeker_accelerates_toward_ship() {
        let mut sim = sim();
        let id = make(&mut sim, KindId::SeekerBomb, vec_fx(IVec2::new(412, 512)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        refresh_player_distance(&mut sim);
        update_all(&mut sim);
        let acc = sim.object(id).unwrap().motion.acc;
        assert_eq!(acc, IVec2::new(SEEK_THRUST, 0));
    }

    #[test]
    fn test_rock_breaks_into_debris() {
        let mut sim = sim();
        let id = make(&mut sim, KindId::Rock, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        kill(&mut sim, id);
        assert_eq!(sim.actors.count_kind(KindId::RockDebris), 4);
    }
}
