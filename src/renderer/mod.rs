//! Render boundary
//!
//! The simulation never draws. Once per rendered frame the host calls
//! [`prepare_frame`] with how far it is between two logic ticks and gets back
//! the smoothed camera and one [`SpriteInstance`] per visible object, back
//! layer first.

pub mod instance;

pub use instance::SpriteInstance;

use glam::IVec2;

use crate::sim::fixed::vec_to_px;
use crate::sim::motion::{fraction_to_fixed, render_objects};
use crate::sim::{Layer, Sim, ViewPoint};

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    /// Top-left of the view in world pixels
    pub camera: IVec2,
    pub parallax: IVec2,
    pub sprites: Vec<SpriteInstance>,
    /// Union of per-object pixel change masks; zero means nothing moved
    pub changed: u32,
}

/// Smooth every attached object and the view points for a render at
/// `fraction` (0..1) of the way through the current tick.
pub fn prepare_frame(sim: &mut Sim, fraction: f32) -> RenderFrame {
    let mode = sim.settings.filter;
    let fraction = fraction_to_fixed(fraction);
    let topo = sim.topo;
    let changed = render_objects(&mut sim.pool, mode, fraction, &topo);
    sim.views.render(mode, fraction, &topo);

    let mut sprites = Vec::with_capacity(sim.pool.live_count());
    for layer in Layer::ALL {
        for h in sim.pool.iter_layer(layer) {
            if let Some(obj) = sim.pool.get(h) {
                if obj.flags.visible && obj.size > 0 {
                    sprites.push(SpriteInstance::new(layer, obj));
                }
            }
        }
    }

    RenderFrame {
        camera: vec_to_px(sim.views.get(ViewPoint::Camera).interp),
        parallax: vec_to_px(sim.views.get(ViewPoint::Parallax).interp),
        sprites,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FilterMode, SimSettings};
    use crate::sim::fixed::vec_fx;
    use crate::sim::kinds::KindId;
    use crate::sim::map::GridMap;
    use crate::sim::{TickInput, make, tick};

    fn sim(filter: FilterMode) -> Sim {
        let settings = SimSettings {
            filter,
            ..SimSettings::default()
        };
        Sim::new(settings, Box::new(GridMap::new(64, 64)), 13)
    }

    fn ship_sprite(frame: &RenderFrame) -> SpriteInstance {
        frame
            .sprites
            .iter()
            .copied()
            .find(|s| s.layer == Layer::Player.index() as u32)
            .unwrap()
    }

    #[test]
    fn test_interpolated_ship_lags_half_a_step() {
        let mut sim = sim(FilterMode::Interpolate);
        // 2 px per tick to the right
        tick(&mut sim, &TickInput { dir: 3, fire: false });
        let frame = prepare_frame(&mut sim, 0.5);
        assert_eq!(ship_sprite(&frame).position, [513, 512]);
        let frame = prepare_frame(&mut sim, 1.0);
        assert_eq!(ship_sprite(&frame).position, [514, 512]);
    }

    #[test]
    fn test_filter_modes_differ() {
        let input = TickInput { dir: 3, fire: false };
        let mut none = sim(FilterMode::None);
        let mut ahead = sim(FilterMode::Extrapolate);
        tick(&mut none, &input);
        tick(&mut ahead, &input);
        assert_eq!(ship_sprite(&prepare_frame(&mut none, 0.5)).position, [514, 512]);
        assert_eq!(ship_sprite(&prepare_frame(&mut ahead, 0.5)).position, [515, 512]);
    }

    #[test]
    fn test_only_visible_realized_objects_are_drawn() {
        let mut sim = sim(FilterMode::None);
        make(&mut sim, KindId::Drone, vec_fx(IVec2::new(100, 100)), IVec2::ZERO, 1).unwrap();
        let before = prepare_frame(&mut sim, 0.0);
        assert_eq!(before.sprites.len(), 1);

        make(&mut sim, KindId::PipeOut, vec_fx(IVec2::new(200, 100)), IVec2::ZERO, 1).unwrap();
        tick(&mut sim, &TickInput::default());
        let after = prepare_frame(&mut sim, 0.0);
        // Ship and drone; the pipe walker has no sprite
        assert_eq!(after.sprites.len(), 2);
        assert_eq!(after.sprites[0].layer, Layer::Enemies.index() as u32);
    }

    #[test]
    fn test_still_frame_reports_no_change() {
        let mut sim = sim(FilterMode::Interpolate);
        tick(&mut sim, &TickInput::default());
        prepare_frame(&mut sim, 0.0);
        let frame = prepare_frame(&mut sim, 0.7);
        assert_eq!(frame.changed, 0);
        assert_eq!(frame.camera, IVec2::new(512 - 160, 512 - 120));
    }
}
