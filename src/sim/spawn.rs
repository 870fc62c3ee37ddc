//! Spawn topologies and level population
//!
//! Multi-actor spawns (rings, fans, pairs) all go through
//! [`make`](super::dispatch::make) and report how many actors they actually
//! placed; a full pool or table just shortens the pattern.

use glam::IVec2;
use rand::Rng;

use super::dispatch::make;
use super::fixed::{ANGLE_STEPS, angle_of, angle_vector, dir_towards, dir_vector, scale, vec_to_px};
use super::kinds::KindId;
use super::state::Sim;

/// Pixels around the ship kept clear when placing hazards
const SAFE_RADIUS: i32 = 160;
/// Random tiles tried per placement
const PLACE_ATTEMPTS: u32 = 32;

const MOTHERS: [KindId; 3] = [KindId::MotherDrone, KindId::MotherChaser, KindId::MotherDasher];

/// `count` actors evenly spaced around a circle, moving outward at `speed`.
/// `phase` rotates the pattern in fine-compass steps.
pub fn ring(sim: &mut Sim, kind: KindId, center: IVec2, count: usize, speed: i32, phase: i32) -> usize {
    if count == 0 {
        return 0;
    }
    let n = count.min(ANGLE_STEPS as usize) as i32;
    (0..n)
        .filter(|i| {
            let angle = phase + i * ANGLE_STEPS / n;
            let v = scale(angle_vector(angle), speed);
            make(sim, kind, center, v, dir_towards(v)).is_some()
        })
        .count()
}

/// `count` actors fanned around the heading of `toward`, `spread` fine-compass
/// steps apart.
pub fn fan(
    sim: &mut Sim,
    kind: KindId,
    origin: IVec2,
    toward: IVec2,
    count: usize,
    spread: i32,
    speed: i32,
) -> usize {
    let center = angle_of(toward);
    let n = count.min(ANGLE_STEPS as usize) as i32;
    (0..n)
        .filter(|i| {
            let angle = center + (2 * i - (n - 1)) * spread / 2;
            let v = scale(angle_vector(angle), speed);
            make(sim, kind, origin, v, dir_towards(v)).is_some()
        })
        .count()
}

/// Two actors splitting off at right angles to `heading`.
pub fn pair(sim: &mut Sim, kind: KindId, center: IVec2, heading: u8, speed: i32) -> usize {
    let heading = if heading == 0 { 1 } else { heading.min(8) };
    [(heading + 1) % 8 + 1, (heading + 5) % 8 + 1]
        .into_iter()
        .filter(|&dir| make(sim, kind, center, scale(dir_vector(dir), speed), dir).is_some())
        .count()
}

/// Random open tile at least [`SAFE_RADIUS`] from the ship.
fn open_tile(sim: &mut Sim) -> Option<IVec2> {
    let tiles = sim.topo.tiles();
    let ship = sim.ship_pos_px();
    for _ in 0..PLACE_ATTEMPTS {
        let t = IVec2::new(sim.rng.random_range(0..tiles.x), sim.rng.random_range(0..tiles.y));
        if !sim.tile(t).is_space() {
            continue;
        }
        let at = sim.topo.tile_center_fx(t);
        let clear = ship.is_none_or(|s| sim.topo.distance_px(s, vec_to_px(at)) > SAFE_RADIUS);
        if clear {
            return Some(at);
        }
    }
    None
}

/// Roaming population for a level, in spawn order.
fn roster(level: u32) -> Vec<KindId> {
    let level = level.max(1);
    let mut out = Vec::new();
    out.extend(std::iter::repeat_n(KindId::Rock, 2 + level as usize));
    out.extend(std::iter::repeat_n(KindId::Ring, 1 + level as usize));
    out.extend(std::iter::repeat_n(KindId::SeekerBomb, level as usize));
    out.extend((0..level as usize).map(|i| MOTHERS[i % MOTHERS.len()]));
    out.push(KindId::Splitter);
    if level >= 2 {
        out.extend([KindId::Sniper, KindId::MineLayer]);
    }
    if level >= 3 {
        out.extend([KindId::Orbiter, KindId::Fortress]);
    }
    out
}

/// Place the map's sentries and a level's worth of roaming actors.
///
/// Cores and cannons come from the map (core tiles and pipe ends, scanned
/// row-major); everything else lands on random open tiles away from the
/// ship. Returns the number of actors placed.
pub fn populate_level(sim: &mut Sim, level: u32) -> usize {
    let size = sim.map.size();
    let mut placed = 0;
    for y in 0..size.y {
        for x in 0..size.x {
            let t = IVec2::new(x, y);
            let tile = sim.tile(t);
            let kind = if tile.is_core() {
                KindId::Core
            } else if tile.is_pipe_end() {
                KindId::Cannon
            } else {
                continue;
            };
            let at = sim.topo.tile_center_fx(t);
            if make(sim, kind, at, IVec2::ZERO, 0).is_some() {
                placed += 1;
            }
        }
    }
    let sentries = placed;

    for kind in roster(level) {
        let Some(at) = open_tile(sim) else {
            log::debug!("no open tile for {} on level {}", kind.name(), level);
            continue;
        };
        if make(sim, kind, at, IVec2::ZERO, 0).is_some() {
            placed += 1;
        }
    }
    log::info!(
        "level {}: {} sentries, {} roaming actors",
        level,
        sentries,
        placed - sentries
    );
    placed
}
