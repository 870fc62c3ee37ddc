//! One-shot visual effects and the bomb blast

use super::pos_px;
use crate::audio::SoundEffect;
use crate::sim::actor::ActorId;
use crate::sim::damage::splash_damage;
use crate::sim::dispatch::remove;
use crate::sim::state::Sim;

/// Play the animation once, then vanish.
pub fn effect_update(sim: &mut Sim, id: ActorId) {
    if sim.object(id).is_some_and(|o| o.anim.looped) {
        remove(sim, id);
    }
}

/// Splash on the first update. Being spawned `Reserved`, a detonation
/// triggered by another blast goes off one tick later, so chains ripple
/// outward instead of resolving inside a single sweep.
pub fn detonation_update(sim: &mut Sim, id: ActorId) {
    if sim.actors[id].a == 0 {
        sim.actors[id].a = 1;
        let splash = sim.actors[id].splash;
        let at = pos_px(sim, id);
        sim.play_at(SoundEffect::BombBlast, at);
        splash_damage(sim, at, splash.radius, splash.amount);
    }
    effect_update(sim, id);
}
