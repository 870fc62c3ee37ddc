//! Enemy shots: beams, red bullets, homing blue bullets

use super::{burst, pos_px, set_vel, speed, to_player};
use crate::sim::actor::ActorId;
use crate::sim::dispatch::remove;
use crate::sim::fixed::aim;
use crate::sim::kinds::KindId;
use crate::sim::state::Sim;

/// Ticks a shot lives
const SHOT_LIFE: i32 = 90;
/// Ticks between homing corrections
const HOMING_INTERVAL: i32 = 8;

pub fn bullet_make(sim: &mut Sim, id: ActorId) {
    sim.actors[id].a = SHOT_LIFE;
}

/// Age out, or die against a wall.
pub fn bullet_update(sim: &mut Sim, id: ActorId) {
    let actor = &mut sim.actors[id];
    actor.a -= 1;
    if actor.a <= 0 {
        remove(sim, id);
        return;
    }
    if sim.tile_at(pos_px(sim, id)).is_solid() {
        burst(sim, id, KindId::BoltSpark);
        remove(sim, id);
    }
}

/// Re-aim at the ship every few ticks.
pub fn homing_update(sim: &mut Sim, id: ActorId) {
    let actor = &mut sim.actors[id];
    actor.b += 1;
    if actor.b % HOMING_INTERVAL == 0 {
        if let Some(d) = to_player(sim, id) {
            let v = aim(d, speed(sim, id));
            set_vel(sim, id, v);
        }
    }
    bullet_update(sim, id);
}

pub fn bullet_kill(sim: &mut Sim, id: ActorId) {
    burst(sim, id, KindId::BoltSpark);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimSettings;
    use crate::sim::dispatch::{make, realize_pending, update_all};
    use crate::sim::fixed::vec_fx;
    use crate::sim::map::{GridMap, Tile, TileMap};
    use glam::IVec2;

    fn sim(map: GridMap) -> Sim {
        Sim::new(SimSettings::default(), Box::new(map), 2)
    }

    #[test]
    fn test_shot_expires_silently() {
        let mut sim = sim(GridMap::new(64, 64));
        let id = make(&mut sim, KindId::RedBullet, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        sim.actors[id].a = 1;
        sim.drain_events();
        update_all(&mut sim);
        assert!(sim.actors[id].is_dead());
        assert_eq!(sim.score, 0);
        assert!(sim.events.is_empty());
    }

    #[test]
    fn test_shot_stops_at_wall() {
        let mut map = GridMap::new(64, 64);
        map.set_tile(6, 6, Tile(Tile::HARD));
        let mut sim = sim(map);
        let id = make(&mut sim, KindId::Beam, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 0).unwrap();
        realize_pending(&mut sim);
        update_all(&mut sim);
        assert!(sim.actors[id].is_dead());
        assert_eq!(sim.actors.count_kind(KindId::BoltSpark), 1);
    }

    #[test]
    fn test_blue_bullet_homes() {
        let mut sim = sim(GridMap::new(64, 64));
        // Ship is at 512,512; start below it moving right
        let id = make(&mut sim, KindId::BlueBullet, vec_fx(IVec2::new(512, 712)), IVec2::new(512, 0), 3).unwrap();
        realize_pending(&mut sim);
        sim.actors[id].b = HOMING_INTERVAL - 1;
        update_all(&mut sim);
        let v = sim.actor_vel(id).unwrap();
        assert_eq!(v, IVec2::new(0, -KindId::BlueBullet.def().launch_speed));
    }
}
