//! Motion integration and render-rate interpolation
//!
//! Integration runs once per logic tick and is the only authoritative
//! position update. Rendering runs at its own rate and derives a display
//! position from the last two logic positions without touching them.
//!
//! Every interpolation step unwraps the previous position against the
//! current one along the shorter way round the torus, so an object crossing
//! the world seam never appears to jump across the screen.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::fixed::{ONE, Topology, saturate, vec_to_px};
use super::pool::ObjectPool;
use crate::settings::FilterMode;

/// Convert a render fraction in `[0, 1]` to fixed point, clamping
/// out-of-range and NaN input.
pub fn fraction_to_fixed(fraction: f32) -> i32 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * ONE as f32).round() as i32
}

/// Position/velocity/acceleration plus render smoothing state.
///
/// `pos`, `vel` and `acc` are authoritative; `prev`, `interp` and `changed`
/// exist for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionPoint {
    pub pos: IVec2,
    pub vel: IVec2,
    pub acc: IVec2,
    /// Position at the previous logic tick
    pub prev: IVec2,
    /// Last computed display position
    pub interp: IVec2,
    /// XOR of old and new display pixel coordinates
    pub changed: u32,
}

impl MotionPoint {
    /// Teleport: no smoothing from the old position.
    pub fn place(&mut self, pos: IVec2, topo: &Topology) {
        let pos = topo.wrap_fx(pos);
        self.pos = pos;
        self.prev = pos;
        self.interp = pos;
    }

    /// One logic tick: `vel += acc; pos += vel; pos = wrap(pos)`.
    pub fn integrate(&mut self, topo: &Topology) {
        self.prev = self.pos;
        self.vel = self.vel.saturating_add(self.acc);
        self.pos = topo.wrap_fx(self.pos.wrapping_add(self.vel));
    }

    /// Undo this tick's movement, e.g. after bumping into a wall.
    pub fn revert(&mut self) {
        self.pos = self.prev;
        self.vel = IVec2::ZERO;
    }

    /// Position in whole pixels.
    pub fn pos_px(&self) -> IVec2 {
        vec_to_px(self.pos)
    }

    /// Display position in whole pixels.
    pub fn interp_px(&self) -> IVec2 {
        vec_to_px(self.interp)
    }

    /// Compute the display position for a render fraction (24.8, clamped to
    /// `[0, 1]`).
    pub fn render(&mut self, mode: FilterMode, fraction: i32, topo: &Topology) -> IVec2 {
        let fraction = fraction.clamp(0, ONE);
        let step = topo.delta_fx(self.prev, self.pos);
        let out = match mode {
            FilterMode::None => self.pos,
            FilterMode::Interpolate => {
                topo.wrap_fx(self.prev.wrapping_add(part_of(step, fraction)))
            }
            FilterMode::Extrapolate => {
                topo.wrap_fx(self.pos.wrapping_add(part_of(step, fraction)))
            }
        };
        let old = vec_to_px(self.interp);
        let new = vec_to_px(out);
        self.changed = ((old.x ^ new.x) | (old.y ^ new.y)) as u32;
        self.interp = out;
        out
    }
}

fn part_of(step: IVec2, fraction: i32) -> IVec2 {
    IVec2::new(
        saturate((step.x as i64 * fraction as i64) >> 8),
        saturate((step.y as i64 * fraction as i64) >> 8),
    )
}

/// Integrate every object linked into a layer.
///
/// Reserved-but-unrealized objects are not attached and so stay put.
pub fn integrate_objects(pool: &mut ObjectPool, topo: &Topology) {
    for obj in pool.attached_mut() {
        obj.motion.integrate(topo);
    }
}

/// Compute display positions for every attached object. Returns the union of
/// their change masks.
pub fn render_objects(pool: &mut ObjectPool, mode: FilterMode, fraction: i32, topo: &Topology) -> u32 {
    let mut changed = 0;
    for obj in pool.attached_mut() {
        obj.motion.render(mode, fraction, topo);
        changed |= obj.motion.changed;
    }
    changed
}

/// Named layer offsets that move like objects but never collide or render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPoint {
    /// Top-left of the visible window
    Camera,
    /// Background scroll at half camera speed
    Parallax,
}

impl ViewPoint {
    pub const COUNT: usize = 2;
}

/// Fixed array of view points, one per [`ViewPoint`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPoints {
    points: [MotionPoint; ViewPoint::COUNT],
}

impl ViewPoints {
    pub fn get(&self, which: ViewPoint) -> &MotionPoint {
        &self.points[which as usize]
    }

    pub fn get_mut(&mut self, which: ViewPoint) -> &mut MotionPoint {
        &mut self.points[which as usize]
    }

    /// Snap the camera onto `target` (fixed, top-left) with no smoothing.
    pub fn snap(&mut self, target: IVec2, topo: &Topology) {
        self.points[ViewPoint::Camera as usize].place(target, topo);
        self.points[ViewPoint::Parallax as usize].place(target / 2, topo);
    }

    /// Set velocities so the next integration lands the camera on `target`.
    pub fn track(&mut self, target: IVec2, topo: &Topology) {
        let camera = &mut self.points[ViewPoint::Camera as usize];
        camera.vel = topo.delta_fx(camera.pos, topo.wrap_fx(target));
        let half = camera.vel / 2;
        self.points[ViewPoint::Parallax as usize].vel = half;
    }

    pub fn integrate(&mut self, topo: &Topology) {
        for p in &mut self.points {
            p.integrate(topo);
        }
    }

    pub fn render(&mut self, mode: FilterMode, fraction: i32, topo: &Topology) {
        for p in &mut self.points {
            p.render(mode, fraction, topo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixed::{fx, vec_fx, wrapped_distance};
    use proptest::prelude::*;

    fn topo() -> Topology {
        Topology::new(1024, 1024, 16)
    }

    #[test]
    fn test_integrate_applies_acceleration_then_velocity() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(10, 10)), &topo);
        p.vel = IVec2::new(fx(1), 0);
        p.acc = IVec2::new(fx(1), fx(2));
        p.integrate(&topo);
        assert_eq!(p.vel, IVec2::new(fx(2), fx(2)));
        assert_eq!(p.pos_px(), IVec2::new(12, 12));
        assert_eq!(p.prev, vec_fx(IVec2::new(10, 10)));
    }

    #[test]
    fn test_integrate_wraps_position() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(1020, 2)), &topo);
        p.vel = IVec2::new(fx(8), fx(-4));
        p.integrate(&topo);
        assert_eq!(p.pos_px(), IVec2::new(4, 1022));
    }

    #[test]
    fn test_velocity_saturates() {
        let topo = topo();
        let mut p = MotionPoint {
            vel: IVec2::new(i32::MAX - 1, 0),
            acc: IVec2::new(100, 0),
            ..Default::default()
        };
        p.integrate(&topo);
        assert_eq!(p.vel.x, i32::MAX);
        assert!(p.pos.x >= 0 && p.pos.x < fx(1024));
    }

    #[test]
    fn test_interpolate_endpoints() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(100, 100)), &topo);
        p.vel = IVec2::new(fx(10), fx(-6));
        p.integrate(&topo);
        let start = p.render(FilterMode::Interpolate, 0, &topo);
        assert_eq!(start, p.prev);
        let end = p.render(FilterMode::Interpolate, ONE, &topo);
        assert_eq!(end, p.pos);
        let mid = p.render(FilterMode::Interpolate, ONE / 2, &topo);
        assert_eq!(vec_to_px(mid), IVec2::new(105, 97));
    }

    #[test]
    fn test_interpolate_across_seam_takes_short_path() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(1020, 500)), &topo);
        p.vel = IVec2::new(fx(8), 0);
        p.integrate(&topo);
        assert_eq!(p.pos_px().x, 4);
        let mid = p.render(FilterMode::Interpolate, ONE / 2, &topo);
        // Halfway along the 8px hop, not halfway across the world
        assert_eq!(vec_to_px(mid).x, 0);
    }

    #[test]
    fn test_extrapolate_and_none() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(50, 50)), &topo);
        p.vel = IVec2::new(fx(4), 0);
        p.integrate(&topo);
        assert_eq!(p.render(FilterMode::None, ONE / 2, &topo), p.pos);
        let ahead = p.render(FilterMode::Extrapolate, ONE / 2, &topo);
        assert_eq!(vec_to_px(ahead), IVec2::new(56, 50));
        assert_eq!(p.render(FilterMode::Extrapolate, 0, &topo), p.pos);
    }

    #[test]
    fn test_extrapolate_and_none_across_seam() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(1020, 500)), &topo);
        p.vel = IVec2::new(fx(8), 0);
        p.integrate(&topo);
        assert_eq!(p.render(FilterMode::None, ONE / 2, &topo), p.pos);
        let ahead = p.render(FilterMode::Extrapolate, ONE / 2, &topo);
        assert_eq!(vec_to_px(ahead), IVec2::new(8, 500));

        // Projection itself crosses the seam
        p.place(vec_fx(IVec2::new(1012, 500)), &topo);
        p.integrate(&topo);
        assert_eq!(p.pos_px().x, 1020);
        let ahead = p.render(FilterMode::Extrapolate, ONE, &topo);
        assert_eq!(vec_to_px(ahead), IVec2::new(4, 500));

        // Moving left over x = 0
        p.place(vec_fx(IVec2::new(2, 500)), &topo);
        p.vel = IVec2::new(fx(-8), 0);
        p.integrate(&topo);
        assert_eq!(p.render(FilterMode::None, ONE / 2, &topo), p.pos);
        let ahead = p.render(FilterMode::Extrapolate, ONE / 2, &topo);
        assert_eq!(vec_to_px(ahead), IVec2::new(1014, 500));
    }

    #[test]
    fn test_changed_mask() {
        let topo = topo();
        let mut p = MotionPoint::default();
        p.place(vec_fx(IVec2::new(4, 4)), &topo);
        p.render(FilterMode::None, 0, &topo);
        assert_eq!(p.changed, 0);
        p.vel = IVec2::new(fx(1), 0);
        p.integrate(&topo);
        p.render(FilterMode::None, 0, &topo);
        assert_eq!(p.changed, 4 ^ 5);
    }

    #[test]
    fn test_fraction_clamps() {
        assert_eq!(fraction_to_fixed(-3.0), 0);
        assert_eq!(fraction_to_fixed(0.5), 128);
        assert_eq!(fraction_to_fixed(7.0), ONE);
        assert_eq!(fraction_to_fixed(f32::NAN), 0);
    }

    #[test]
    fn test_view_points_track_target() {
        let topo = topo();
        let mut views = ViewPoints::default();
        views.snap(vec_fx(IVec2::new(1000, 0)), &topo);
        views.track(vec_fx(IVec2::new(10, 0)), &topo);
        views.integrate(&topo);
        assert_eq!(views.get(ViewPoint::Camera).pos_px(), IVec2::new(10, 0));
        // Parallax moved half as far (34px → 17px) across the seam
        assert_eq!(views.get(ViewPoint::Parallax).pos_px(), IVec2::new(517, 0));
    }

    fn any_filter() -> impl Strategy<Value = FilterMode> {
        prop_oneof![
            Just(FilterMode::None),
            Just(FilterMode::Interpolate),
            Just(FilterMode::Extrapolate),
        ]
    }

    proptest! {
        #[test]
        fn prop_render_stays_on_short_path(
            x in 0i32..1024, y in 0i32..1024,
            vx in -40i32..40, vy in -40i32..40,
            frac in 0i32..=256,
            mode in any_filter(),
        ) {
            let topo = topo();
            let mut p = MotionPoint::default();
            p.place(vec_fx(IVec2::new(x, y)), &topo);
            p.vel = vec_fx(IVec2::new(vx, vy));
            p.integrate(&topo);
            let out = p.render(mode, frac, &topo);
            let w = fx(1024);
            // Every mode lands within one step of the segment it smooths
            let anchor = match mode {
                FilterMode::Interpolate => p.prev,
                _ => p.pos,
            };
            let step = IVec2::new(
                wrapped_distance(p.prev.x, p.pos.x, w),
                wrapped_distance(p.prev.y, p.pos.y, w),
            );
            prop_assert!(wrapped_distance(anchor.x, out.x, w) <= step.x);
            prop_assert!(wrapped_distance(anchor.y, out.y, w) <= step.y);
            prop_assert!(out.x >= 0 && out.x < w && out.y >= 0 && out.y < w);
            if mode == FilterMode::None {
                prop_assert_eq!(out, p.pos);
            }
        }
    }
}
