//! Collision queries on the wrap-around world
//!
//! Two families, never mixed for the same actor: circular range checks for
//! free-moving objects and tile checks for map-attached ones.

use glam::IVec2;

use super::fixed::{Topology, length, saturate};

/// Wrapped distance between two pixel positions if it is at most `max`.
///
/// Either axis alone being out of range rejects before the square root.
pub fn in_range(topo: &Topology, a: IVec2, b: IVec2, max: i32) -> Option<i32> {
    if max < 0 {
        return None;
    }
    let d = topo.delta_px(a, b);
    if d.x.abs() > max || d.y.abs() > max {
        return None;
    }
    let dist = length(d);
    (dist <= max).then_some(dist)
}

/// True when the wrapped pixel position lies in `tile`.
pub fn can_hit_tile(topo: &Topology, pos: IVec2, tile: IVec2) -> bool {
    topo.tile_of(pos) == topo.wrap_tile(tile)
}

/// Equal-mass elastic exchange along `normal` (from `a` to `b`).
///
/// Returns the new velocities, or `None` when the two are already separating.
pub fn elastic_response(normal: IVec2, a_vel: IVec2, b_vel: IVec2) -> Option<(IVec2, IVec2)> {
    let nn = normal.x as i64 * normal.x as i64 + normal.y as i64 * normal.y as i64;
    if nn == 0 {
        return None;
    }
    let rel = a_vel.as_i64vec2() - b_vel.as_i64vec2();
    let along = rel.x * normal.x as i64 + rel.y * normal.y as i64;
    if along <= 0 {
        return None;
    }
    let jx = saturate(along * normal.x as i64 / nn);
    let jy = saturate(along * normal.y as i64 / nn);
    let j = IVec2::new(jx, jy);
    Some((a_vel.saturating_sub(j), b_vel.saturating_add(j)))
}
