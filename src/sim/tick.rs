//! Fixed timestep simulation tick
//!
//! Advances the world by one logic tick. Order within a tick:
//! input, realize, update sweep, motion, ship contacts, bolt contacts, reap.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, CollisionProfile, Contact};
use super::collision::{elastic_response, in_range};
use super::damage::{apply_damage, damage_ship, damage_tile};
use super::dispatch::{kill, make, realize_pending, reap, refresh_player_distance, update_all};
use super::fixed::vec_fx;
use super::kinds::KindId;
use super::motion::{ViewPoint, integrate_objects};
use super::ship;
use super::state::Sim;
use crate::audio::SoundEffect;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// 8-way stick direction, 0 = centred; values above 8 are clamped
    pub dir: u8,
    /// Fire button held
    pub fire: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(sim: &mut Sim, input: &TickInput) {
    sim.tick += 1;

    ship::steer(sim, input);

    realize_pending(sim);
    refresh_player_distance(sim);
    update_all(sim);

    track_camera(sim);
    let topo = sim.topo;
    integrate_objects(&mut sim.pool, &topo);
    sim.views.integrate(&topo);
    ship::after_motion(sim);

    ship_contacts(sim);
    bolt_contacts(sim);

    reap(sim);
}

/// Aim the camera so the ship sits mid-view after integration.
fn track_camera(sim: &mut Sim) {
    let topo = sim.topo;
    let ship = sim.ship.obj.and_then(|h| sim.pool.get(h)).filter(|_| sim.ship.alive);
    let target = match ship {
        Some(o) => {
            let half_view = IVec2::new(sim.settings.view_width, sim.settings.view_height) / 2;
            o.motion.pos + o.motion.vel - vec_fx(half_view)
        }
        None => sim.views.get(ViewPoint::Camera).pos,
    };
    sim.views.track(target, &topo);
}

/// Free-moving actors overlapping the ship, in slot order.
fn touching_ship(sim: &Sim, ship_px: IVec2) -> Vec<(ActorId, CollisionProfile)> {
    let radius = sim.settings.ship_radius;
    sim.actors
        .iter_moving()
        .filter(|(_, a)| matches!(a.profile, CollisionProfile::Free { .. }))
        .filter_map(|(id, a)| {
            let hit = a.hit_size?;
            let pos = sim.object(id)?.motion.pos_px();
            in_range(&sim.topo, ship_px, pos, hit + radius).map(|_| (id, a.profile))
        })
        .collect()
}

fn ship_contacts(sim: &mut Sim) {
    if !sim.ship.alive {
        return;
    }
    let Some(ship_px) = sim.ship_pos_px() else {
        return;
    };
    for (id, profile) in touching_ship(sim, ship_px) {
        if !sim.ship.alive {
            break;
        }
        // An earlier contact this tick may have killed it
        if !sim.actors[id].is_moving() {
            continue;
        }
        if profile.uses_physics() {
            bounce_ship(sim, id);
        }
        let damage = sim.actors[id].damage;
        match profile.contact() {
            Contact::Harmless => {}
            Contact::Damage => {
                damage_ship(sim, damage);
                let ram = sim.settings.ram_damage;
                apply_damage(sim, id, ram);
            }
            Contact::Detonate => {
                damage_ship(sim, damage);
                kill(sim, id);
            }
        }
    }
}

/// Exchange momentum with a physics actor and back the ship out of it.
fn bounce_ship(sim: &mut Sim, id: ActorId) {
    let (Some(ship_h), Some(actor_pos), Some(actor_vel)) =
        (sim.ship.obj, sim.actor_pos(id), sim.actor_vel(id))
    else {
        return;
    };
    let Some(ship_motion) = sim.pool.get(ship_h).map(|o| o.motion) else {
        return;
    };
    let normal = sim.topo.delta_fx(ship_motion.pos, actor_pos);
    let response = elastic_response(normal, ship_motion.vel, actor_vel);
    if let Some(o) = sim.pool.get_mut(ship_h) {
        o.motion.revert();
        if let Some((ship_vel, _)) = response {
            o.motion.vel = ship_vel;
        }
    }
    if let Some((_, new_vel)) = response {
        if let Some(o) = sim.object_mut(id) {
            o.motion.vel = new_vel;
        }
    }
}

/// Bolts stop at the first wall or shootable free actor they touch.
fn bolt_contacts(sim: &mut Sim) {
    let damage = sim.settings.bolt_damage;
    for slot in 0..sim.bolts.len() {
        let Some(bolt) = sim.bolts[slot] else {
            continue;
        };
        let Some(pos) = sim.pool.get(bolt.obj).map(|o| o.motion.pos_px()) else {
            continue;
        };

        if sim.tile_at(pos).is_solid() {
            let tile = sim.topo.tile_of(pos);
            damage_tile(sim, tile, damage);
            sim.play_at(SoundEffect::BoltImpact, pos);
            spark(sim, pos);
            ship::retire_bolt(sim, slot);
            continue;
        }

        let target = sim
            .actors
            .iter_moving()
            .filter(|(_, a)| matches!(a.profile, CollisionProfile::Free { shootable: true, .. }))
            .find_map(|(id, a)| {
                let at = sim.object(id)?.motion.pos_px();
                in_range(&sim.topo, pos, at, a.hit_size?).map(|_| id)
            });
        if let Some(id) = target {
            apply_damage(sim, id, damage);
            spark(sim, pos);
            ship::retire_bolt(sim, slot);
        }
    }
}

fn spark(sim: &mut Sim, pos_px: IVec2) {
    make(sim, KindId::BoltSpark, vec_fx(pos_px), IVec2::ZERO, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimSettings;
    use crate::sim::actor::ActorState;
    use crate::audio::AudioEvent;
    use crate::sim::damage::splash_damage;
    use crate::sim::fixed::vec_to_px;
    use crate::sim::map::{GridMap, Tile, TileMap};
    use crate::sim::spawn::populate_level;
    use crate::sim::state::{GameEvent, replay, replay_from};

    fn base_map() -> GridMap {
        let mut map = GridMap::new(64, 64);
        map.build_base(IVec2::new(12, 12), 3);
        map.build_base(IVec2::new(44, 20), 2);
        map.build_wall(IVec2::new(20, 40), IVec2::new(8, 2));
        map
    }

    fn inputs(n: usize) -> Vec<TickInput> {
        (0..n)
            .map(|i| TickInput {
                dir: ((i / 40) % 9) as u8,
                fire: i % 3 != 0,
            })
            .collect()
    }

    fn open_sim(seed: u64) -> Sim {
        Sim::new(SimSettings::default(), Box::new(GridMap::new(64, 64)), seed)
    }

    fn place(sim: &mut Sim, kind: KindId, dx: i32, dy: i32) -> ActorId {
        let at = sim.ship_pos().unwrap() + vec_fx(IVec2::new(dx, dy));
        make(sim, kind, at, IVec2::ZERO, 1).unwrap()
    }

    fn freeze(sim: &mut Sim, id: ActorId) {
        if let Some(o) = sim.object_mut(id) {
            o.motion.vel = IVec2::ZERO;
        }
        sim.actors[id].b = 10_000;
    }

    #[test]
    fn test_determinism() {
        let log = inputs(600);
        let a = replay(SimSettings::default(), Box::new(base_map()), 12345, &log);
        let b = replay(SimSettings::default(), Box::new(base_map()), 12345, &log);
        assert_eq!(a.len(), 600);
        assert_eq!(a, b);
        assert!(a.last().unwrap().tick == 600);
    }

    #[test]
    fn test_spawns_wait_a_tick_for_their_first_update() {
        let mut sim = open_sim(1);
        let mother = place(&mut sim, KindId::MotherDrone, 200, 200);
        sim.actors[mother].a = 0;
        tick(&mut sim, &TickInput::default());
        let (child, _) = sim
            .actors
            .iter()
            .find(|(_, a)| a.kind == Some(KindId::Drone))
            .unwrap();
        assert_eq!(sim.actors[child].state, ActorState::Reserved);
        assert_eq!(sim.actors[child].last_update_tick, None);

        tick(&mut sim, &TickInput::default());
        let child = &sim.actors[child];
        assert_eq!(child.spawned_tick, 1);
        assert_eq!(child.last_update_tick, Some(2));
    }

    #[test]
    fn test_splash_kill_scores_once() {
        let mut sim = open_sim(3);
        let centre = sim.topo.tile_center_fx(IVec2::new(5, 5));
        let id = make(&mut sim, KindId::Drone, centre, IVec2::ZERO, 1).unwrap();
        realize_pending(&mut sim);
        assert_eq!(sim.actors[id].health, 20);
        sim.drain_events();

        splash_damage(&mut sim, vec_to_px(centre), 64, 100);
        let events = sim.drain_events();
        let scores: Vec<_> = events.iter().filter(|e| matches!(e, GameEvent::Score { .. })).collect();
        assert_eq!(scores, vec![&GameEvent::Score { amount: 100 }]);
        let kills = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ActorKilled { kind: KindId::Drone, .. }))
            .count();
        assert_eq!(kills, 1);
        assert!(sim.actors[id].kind.is_none());
        assert_eq!(sim.actors.count_kind(KindId::SmallExplosion), 1);
    }

    #[test]
    fn test_slot_identity_survives_pool_churn() {
        let log = inputs(300);
        let fresh = replay(SimSettings::default(), Box::new(base_map()), 99, &log);

        let mut sim = Sim::new(SimSettings::default(), Box::new(base_map()), 99);
        let mut held = Vec::new();
        while let Some(h) = sim.pool.acquire() {
            held.push(h);
        }
        // Odd handles back first, then even ones in reverse
        let (odd, even): (Vec<_>, Vec<_>) = held.into_iter().enumerate().partition(|(i, _)| i % 2 == 1);
        for (_, h) in odd.into_iter().chain(even.into_iter().rev()) {
            sim.pool.release(h);
        }
        assert_eq!(sim.pool.violations(), 0);
        populate_level(&mut sim, 1);
        let churned = replay_from(&mut sim, &log);
        assert_eq!(fresh, churned);
    }

    #[test]
    fn test_bolts_kill_enemy_ahead() {
        let mut sim = open_sim(5);
        let drone = place(&mut sim, KindId::Drone, 0, -40);
        realize_pending(&mut sim);
        freeze(&mut sim, drone);
        let fire = TickInput { dir: 0, fire: true };
        for _ in 0..20 {
            tick(&mut sim, &fire);
        }
        assert!(sim.actors[drone].kind.is_none());
        assert_eq!(sim.score, 100);
        assert!(sim.ship.alive);
        assert_eq!(sim.ship.health, sim.settings.ship_health);
    }

    #[test]
    fn test_bolt_hits_wall_tile() {
        let mut map = GridMap::new(64, 64);
        // Ship sits in tile 32,32; wall three tiles above
        map.set_tile(32, 29, Tile(Tile::HARD));
        let mut sim = Sim::new(SimSettings::default(), Box::new(map), 5);
        tick(&mut sim, &TickInput { dir: 0, fire: true });
        sim.audio.drain();
        let mut impacts = 0;
        for _ in 0..12 {
            tick(&mut sim, &TickInput::default());
            impacts += sim
                .audio
                .drain()
                .iter()
                .filter(|e| matches!(e, AudioEvent::Play { effect: SoundEffect::BoltImpact, .. }))
                .count();
        }
        assert_eq!(impacts, 1);
        assert_eq!(sim.bolts.iter().flatten().count(), 1);
    }

    #[test]
    fn test_ramming_hurts_both() {
        let mut sim = open_sim(6);
        let drone = place(&mut sim, KindId::Drone, 2, 0);
        realize_pending(&mut sim);
        freeze(&mut sim, drone);
        tick(&mut sim, &TickInput::default());
        let dmg = KindId::Drone.def().damage;
        assert_eq!(sim.ship.health, sim.settings.ship_health - dmg);
        // Ram damage outweighs a drone's health
        assert_eq!(sim.actors[drone].state, ActorState::Unused);
        assert_eq!(sim.score, KindId::Drone.def().score as u64);
    }

    #[test]
    fn test_shot_detonates_on_ship() {
        let mut sim = open_sim(6);
        let shot = place(&mut sim, KindId::RedBullet, 0, 3);
        tick(&mut sim, &TickInput::default());
        assert_eq!(sim.ship.health, sim.settings.ship_health - KindId::RedBullet.def().damage);
        assert_eq!(sim.actors[shot].state, ActorState::Unused);
        assert_eq!(sim.score, 0);
        assert_eq!(sim.actors.count_kind(KindId::BoltSpark), 1);
    }

    #[test]
    fn test_rock_bounces_ship() {
        let mut sim = open_sim(8);
        let rock = place(&mut sim, KindId::Rock, 12, 0);
        realize_pending(&mut sim);
        if let Some(o) = sim.object_mut(rock) {
            o.motion.vel = IVec2::new(-256, 0);
        }
        let before = sim.ship_pos().unwrap();
        tick(&mut sim, &TickInput::default());
        assert_eq!(sim.actor_vel(rock), Some(IVec2::ZERO));
        assert_eq!(sim.pool.get(sim.ship.obj.unwrap()).unwrap().motion.vel, IVec2::new(-256, 0));
        assert_eq!(sim.ship_pos(), Some(before));
        assert_eq!(sim.ship.health, sim.settings.ship_health - KindId::Rock.def().damage);
        assert!(sim.actors[rock].kind.is_some());
    }

    #[test]
    fn test_camera_follows_ship() {
        let mut sim = open_sim(2);
        for _ in 0..10 {
            tick(&mut sim, &TickInput { dir: 3, fire: false });
        }
        let cam = vec_to_px(sim.views.get(ViewPoint::Camera).pos);
        let ship = sim.ship_pos_px().unwrap();
        assert_eq!(ship - cam, IVec2::new(160, 120));
    }

    #[test]
    fn test_out_of_range_direction_is_clamped() {
        let mut a = open_sim(4);
        let mut b = open_sim(4);
        tick(&mut a, &TickInput { dir: 200, fire: false });
        tick(&mut b, &TickInput { dir: 8, fire: false });
        assert_eq!(a.checkpoint(), b.checkpoint());
    }
}
