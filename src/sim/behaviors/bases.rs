//! Map sentries and the pipe walkers between them
//!
//! A base is a core tile wired to cannon tiles by pipe links. Destroying a
//! cannon sends a [`KindId::PipeIn`] walker along the pipe to hurt the core;
//! destroying a core sends [`KindId::PipeOut`] walkers outward that tear up
//! the pipe and take every cannon still attached with them.

use glam::IVec2;
use rand::Rng;

use super::{burst, fire_at_player, fire_ready, launch_sound, place, pos, pos_px};
use crate::audio::SoundEffect;
use crate::sim::actor::ActorId;
use crate::sim::damage::damage_tile;
use crate::sim::dispatch::{make, remove};
use crate::sim::fixed::{dir_towards, opposite};
use crate::sim::kinds::KindId;
use crate::sim::map::{LINK_DIRS, Tile, link_step};
use crate::sim::spawn;
use crate::sim::state::{GameEvent, Sim};

const CANNON_RANGE: i32 = 240;
const CORE_RANGE: i32 = 320;
const CANNON_DELAY: i32 = 90;
const CORE_DELAY: i32 = 150;
/// Bullets per core volley
const CORE_RING: usize = 8;
/// Ticks a pipe walker spends on each tile
const PIPE_STEP: i32 = 8;

/// First linked direction of a tile, 0 when unlinked.
fn first_link(tile: Tile) -> u8 {
    LINK_DIRS.into_iter().find(|d| tile.has_link(*d)).unwrap_or(0)
}

fn snap_to_tile(sim: &mut Sim, id: ActorId) {
    let at = sim.topo.tile_center_fx(sim.actors[id].tile);
    place(sim, id, at);
}

pub fn cannon_make(sim: &mut Sim, id: ActorId) {
    snap_to_tile(sim, id);
    let delay = sim.settings.fire_delay(CANNON_DELAY) + sim.rng.random_range(0..30);
    let link = first_link(sim.tile(sim.actors[id].tile));
    let actor = &mut sim.actors[id];
    actor.a = delay;
    actor.di = link;
}

/// Track the ship with the barrel and fire beams when it is close.
pub fn cannon_update(sim: &mut Sim, id: ActorId) {
    let Some(d) = super::to_player(sim, id) else {
        return;
    };
    let facing = dir_towards(d);
    if let Some(o) = sim.object_mut(id) {
        o.anim.set_frame(facing.saturating_sub(1) as u16);
    }
    let reload = sim.settings.fire_delay(CANNON_DELAY);
    if fire_ready(sim, id, reload) && sim.actors[id].dist_to_player <= CANNON_RANGE {
        fire_at_player(sim, id, KindId::Beam);
    }
}

/// Clear the cannon's tile and send a walker down the pipe to the core.
pub fn cannon_kill(sim: &mut Sim, id: ActorId) {
    let tile_pos = sim.actors[id].tile;
    let tile = sim.tile(tile_pos);
    burst(sim, id, KindId::Explosion);
    if tile.is_space() {
        return;
    }
    sim.set_tile(tile_pos, Tile::SPACE);
    let link = first_link(tile);
    if tile.is_pipe() && link != 0 {
        let at = sim.topo.tile_center_fx(tile_pos);
        make(sim, KindId::PipeIn, at, IVec2::ZERO, link);
    }
}

pub fn core_make(sim: &mut Sim, id: ActorId) {
    snap_to_tile(sim, id);
    sim.actors[id].a = sim.settings.fire_delay(CORE_DELAY);
}

/// Spray a rotating ring of homing bullets while the ship is in range.
pub fn core_update(sim: &mut Sim, id: ActorId) {
    let reload = sim.settings.fire_delay(CORE_DELAY);
    if !fire_ready(sim, id, reload) || sim.actors[id].dist_to_player > CORE_RANGE {
        return;
    }
    let phase = sim.actors[id].count * 4;
    let at = pos(sim, id);
    let speed = KindId::BlueBullet.def().launch_speed;
    if spawn::ring(sim, KindId::BlueBullet, at, CORE_RING, speed, phase) > 0 {
        sim.actors[id].count += 1;
        launch_sound(sim, id);
    }
}

pub fn core_kill(sim: &mut Sim, id: ActorId) {
    let tile_pos = sim.actors[id].tile;
    let tile = sim.tile(tile_pos);
    sim.events.push(GameEvent::BaseDestroyed {
        x: tile_pos.x,
        y: tile_pos.y,
    });
    log::info!("base at {},{} destroyed on tick {}", tile_pos.x, tile_pos.y, sim.tick);
    if !tile.is_space() {
        sim.set_tile(tile_pos, Tile::SPACE);
    }
    for dir in LINK_DIRS {
        if tile.has_link(dir) {
            let at = sim.topo.tile_center_fx(tile_pos + link_step(dir));
            make(sim, KindId::PipeOut, at, IVec2::ZERO, dir);
        }
    }
    let at = pos(sim, id);
    burst(sim, id, KindId::Explosion);
    spawn::ring(sim, KindId::SmallExplosion, at, 8, 384, 4);
}

pub fn pipe_make(sim: &mut Sim, id: ActorId) {
    sim.actors[id].a = PIPE_STEP;
}

/// Move a walker onto the neighbouring tile in direction `dir`.
fn step_to(sim: &mut Sim, id: ActorId, dir: u8) {
    let next = sim.topo.wrap_tile(sim.actors[id].tile + link_step(dir));
    let actor = &mut sim.actors[id];
    actor.tile = next;
    actor.di = dir;
    snap_to_tile(sim, id);
}

/// Follow the pipe toward the core and hurt it on arrival.
pub fn pipe_in_update(sim: &mut Sim, id: ActorId) {
    if !fire_ready(sim, id, PIPE_STEP) {
        return;
    }
    let dir = sim.actors[id].di;
    let next = sim.topo.wrap_tile(sim.actors[id].tile + link_step(dir));
    let tile = sim.tile(next);
    if tile.is_core() {
        let damage = sim.actors[id].damage;
        damage_tile(sim, next, damage);
        remove(sim, id);
        return;
    }
    if !tile.is_pipe() {
        remove(sim, id);
        return;
    }
    let back = opposite(dir);
    let turn = if tile.has_link(dir) {
        dir
    } else {
        LINK_DIRS
            .into_iter()
            .find(|d| *d != back && tile.has_link(*d))
            .unwrap_or(0)
    };
    if turn == 0 {
        remove(sim, id);
        return;
    }
    step_to(sim, id, dir);
    sim.actors[id].di = turn;
}

/// Erase the current pipe tile, hurt whatever sits there, then carry on
/// along every outgoing link.
pub fn pipe_out_update(sim: &mut Sim, id: ActorId) {
    if !fire_ready(sim, id, PIPE_STEP) {
        return;
    }
    let here = sim.actors[id].tile;
    let tile = sim.tile(here);
    if !tile.is_pipe() || tile.is_core() {
        remove(sim, id);
        return;
    }
    let back = opposite(sim.actors[id].di);
    let exits: Vec<u8> = LINK_DIRS
        .into_iter()
        .filter(|d| *d != back && tile.has_link(*d))
        .collect();

    sim.set_tile(here, Tile::SPACE);
    let at = pos_px(sim, id);
    sim.play_at(SoundEffect::PipeBurst, at);
    let damage = sim.actors[id].damage;
    damage_tile(sim, here, damage);

    let Some((&first, rest)) = exits.split_first() else {
        remove(sim, id);
        return;
    };
    for &dir in rest {
        let at = sim.topo.tile_center_fx(here + link_step(dir));
        make(sim, KindId::PipeOut, at, IVec2::ZERO, dir);
    }
    step_to(sim, id, first);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimSettings;
    use crate::sim::dispatch::{kill, realize_pending, reap, refresh_player_distance, update_all};
    use crate::sim::map::{GridMap, TileMap};

    const CORE: IVec2 = IVec2::new(10, 10);

    fn base_sim(arm: i32) -> Sim {
        let mut map = GridMap::new(64, 64);
        map.build_base(CORE, arm);
        Sim::new(SimSettings::default(), Box::new(map), 4)
    }

    fn at_tile(sim: &mut Sim, kind: KindId, t: IVec2) -> ActorId {
        let at = sim.topo.tile_center_fx(t);
        make(sim, kind, at, IVec2::ZERO, 0).unwrap()
    }

    fn step(sim: &mut Sim) {
        sim.tick += 1;
        realize_pending(sim);
        refresh_player_distance(sim);
        update_all(sim);
        reap(sim);
    }

    #[test]
    fn test_cannon_faces_its_pipe() {
        let mut sim = base_sim(3);
        let cannon = at_tile(&mut sim, KindId::Cannon, CORE + IVec2::new(3, 0));
        assert_eq!(sim.actors[cannon].di, 7);
    }

    #[test]
    fn test_dead_cannon_sends_damage_to_core() {
        let mut sim = base_sim(3);
        let core = at_tile(&mut sim, KindId::Core, CORE);
        let cannon = at_tile(&mut sim, KindId::Cannon, CORE + IVec2::new(3, 0));
        realize_pending(&mut sim);
        kill(&mut sim, cannon);
        assert!(sim.tile(CORE + IVec2::new(3, 0)).is_space());
        assert_eq!(sim.actors.count_kind(KindId::PipeIn), 1);

        for _ in 0..60 {
            step(&mut sim);
        }
        assert_eq!(sim.actors.count_kind(KindId::PipeIn), 0);
        let hit = KindId::Core.def().health - KindId::PipeIn.def().damage;
        assert_eq!(sim.actors[core].health, hit);
        // The pipe itself is left intact
        assert!(sim.tile(CORE + IVec2::new(1, 0)).is_pipe());
    }

    #[test]
    fn test_dead_core_tears_up_the_base() {
        let mut sim = base_sim(2);
        let core = at_tile(&mut sim, KindId::Core, CORE);
        for dir in LINK_DIRS {
            at_tile(&mut sim, KindId::Cannon, CORE + link_step(dir) * 2);
        }
        realize_pending(&mut sim);
        kill(&mut sim, core);
        assert_eq!(sim.actors.count_kind(KindId::PipeOut), 4);
        assert!(sim.events.contains(&GameEvent::BaseDestroyed { x: 10, y: 10 }));

        for _ in 0..60 {
            step(&mut sim);
        }
        assert_eq!(sim.actors.count_kind(KindId::Cannon), 0);
        assert_eq!(sim.actors.count_kind(KindId::PipeOut), 0);
        // Cannons killed by the walkers do not send anything back
        assert_eq!(sim.actors.count_kind(KindId::PipeIn), 0);
        for dir in LINK_DIRS {
            for i in 0..=2 {
                assert!(sim.tile(CORE + link_step(dir) * i).is_space());
            }
        }
        let expected = KindId::Core.def().score + 4 * KindId::Cannon.def().score;
        assert_eq!(sim.score, expected as u64);
    }

    #[test]
    fn test_pipe_out_branches_at_junctions() {
        let mut map = GridMap::new(64, 64);
        // Core at (10,10) feeding a T junction at (11,10) that splits up and down
        map.set_tile(10, 10, Tile(Tile::CORE | Tile::R));
        map.set_tile(11, 10, Tile(Tile::L | Tile::U | Tile::D));
        map.set_tile(11, 9, Tile(Tile::D));
        map.set_tile(11, 11, Tile(Tile::U));
        let mut sim = Sim::new(SimSettings::default(), Box::new(map), 4);
        let core = at_tile(&mut sim, KindId::Core, CORE);
        realize_pending(&mut sim);
        kill(&mut sim, core);
        assert_eq!(sim.actors.count_kind(KindId::PipeOut), 1);
        for _ in 0..(PIPE_STEP + 1) {
            step(&mut sim);
        }
        assert_eq!(sim.actors.count_kind(KindId::PipeOut), 2);
        for _ in 0..40 {
            step(&mut sim);
        }
        for t in [IVec2::new(11, 10), IVec2::new(11, 9), IVec2::new(11, 11)] {
            assert!(sim.tile(t).is_space(), "{t:?}");
        }
        assert_eq!(sim.actors.live_count(), 0);
    }

    #[test]
    fn test_cannon_fires_when_ship_is_close() {
        let mut sim = base_sim(3);
        // Ship sits at the world centre (tile 32,32)
        let cannon = at_tile(&mut sim, KindId::Cannon, IVec2::new(36, 32));
        realize_pending(&mut sim);
        refresh_player_distance(&mut sim);
        sim.actors[cannon].a = 0;
        update_all(&mut sim);
        assert_eq!(sim.actors.count_kind(KindId::Beam), 1);
        assert_eq!(sim.actors[cannon].di, 0);
        assert_eq!(sim.actors[cannon].a, sim.settings.fire_delay(CANNON_DELAY));
    }

    #[test]
    fn test_core_volley_rotates() {
        let mut sim = base_sim(3);
        let core = at_tile(&mut sim, KindId::Core, IVec2::new(34, 34));
        realize_pending(&mut sim);
        refresh_player_distance(&mut sim);
        sim.actors[core].a = 0;
        update_all(&mut sim);
        assert_eq!(sim.actors.count_kind(KindId::BlueBullet), CORE_RING);
        assert_eq!(sim.actors[core].count, 1);
    }
}
