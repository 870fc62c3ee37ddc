//! Damage application
//!
//! Every path that hurts something funnels through [`apply_damage`] (actors)
//! or [`damage_ship`] (the player). Zero or negative amounts are no-ops
//! before any state is touched.

use glam::IVec2;

use super::actor::{ActorId, HEALTH_INDESTRUCTIBLE};
use super::collision::{can_hit_tile, in_range};
use super::dispatch::kill;
use super::ship::destroy_ship;
use super::state::{GameEvent, Sim};
use crate::audio::SoundEffect;

/// Hurt an actor. Crossing zero health kills it, exactly once.
pub fn apply_damage(sim: &mut Sim, id: ActorId, amount: i32) {
    if amount <= 0 {
        return;
    }
    let Some(actor) = sim.actors.get_mut(id) else {
        return;
    };
    let Some(kind) = actor.kind else {
        return;
    };
    // Indestructible, or already on its way out
    if actor.health == HEALTH_INDESTRUCTIBLE || actor.health <= 0 {
        return;
    }
    actor.health = actor.health.saturating_sub(amount);
    if actor.health > 0 {
        if let (Some(effect), Some(pos)) = (kind.def().sounds.hit, sim.actor_pos_px(id)) {
            sim.play_at(effect, pos);
        }
    } else {
        kill(sim, id);
    }
}

/// Linear falloff: `amount * mult` at the centre, zero at `radius`.
pub fn falloff(amount: i32, mult: i32, radius: i32, dist: i32) -> i32 {
    if radius <= 0 {
        return 0;
    }
    let dist = dist.clamp(0, radius);
    let scaled = amount as i128 * mult as i128 * (radius - dist) as i128 / radius as i128;
    scaled.clamp(i32::MIN as i128, i32::MAX as i128) as i32
}

/// Area damage around a pixel position.
///
/// Hits every live free-moving shootable actor in range and the ship. Hits
/// are collected before any is applied, so deaths caused here (and whatever
/// they spawn) cannot change who gets hit.
pub fn splash_damage(sim: &mut Sim, center: IVec2, radius: i32, amount: i32) {
    if amount <= 0 || radius <= 0 {
        return;
    }
    let mult = sim.settings.splash_multiplier;
    let mut hits = Vec::new();
    for (id, actor) in sim.actors.iter_moving() {
        if !actor.profile.receives_splash() {
            continue;
        }
        let Some(pos) = sim.object(id).map(|o| o.motion.pos_px()) else {
            continue;
        };
        if let Some(dist) = in_range(&sim.topo, center, pos, radius) {
            hits.push((id, falloff(amount, mult, radius, dist)));
        }
    }

    let ship_hit = sim
        .ship_pos_px()
        .and_then(|p| in_range(&sim.topo, center, p, radius))
        .map(|dist| falloff(amount, sim.settings.player_splash_multiplier, radius, dist));

    for (id, amount) in hits {
        apply_damage(sim, id, amount);
    }
    if let Some(amount) = ship_hit {
        damage_ship(sim, amount);
    }
}

/// Damage every live map-attached actor sitting in `tile`.
pub fn damage_tile(sim: &mut Sim, tile: IVec2, amount: i32) {
    if amount <= 0 {
        return;
    }
    let hits: Vec<ActorId> = sim
        .actors
        .iter_moving()
        .filter(|(_, a)| a.profile.is_map_attached())
        .filter_map(|(id, _)| {
            let pos = sim.object(id)?.motion.pos_px();
            can_hit_tile(&sim.topo, pos, tile).then_some(id)
        })
        .collect();
    for id in hits {
        apply_damage(sim, id, amount);
    }
}

/// Hurt the player ship.
pub fn damage_ship(sim: &mut Sim, amount: i32) {
    if amount <= 0 || !sim.ship.alive {
        return;
    }
    sim.ship.health = sim.ship.health.saturating_sub(amount);
    sim.events.push(GameEvent::ShipDamaged {
        amount,
        health: sim.ship.health,
    });
    if sim.ship.health > 0 {
        if let Some(pos) = sim.ship_pos_px() {
            sim.play_at(SoundEffect::ShipHit, pos);
        }
    } else {
        destroy_ship(sim);
    }
}
