//! Fixed-point (24.8) arithmetic and toroidal wrap math
//!
//! Positions, velocities and accelerations are `i32` with 8 fractional bits
//! (256 = 1.0 pixel). Both world axes are periodic with a power-of-two
//! period, so wrapping is a mask and the shortest signed distance between two
//! points never exceeds half a period.
//!
//! Overflowing results saturate instead of wrapping: a wrapped distance looks
//! like a plausible wrong answer, a saturated one does not.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Fractional bits of every fixed-point quantity.
pub const FIXED_SHIFT: u32 = 8;
/// 1.0 in 24.8 fixed point.
pub const ONE: i32 = 1 << FIXED_SHIFT;

/// Pixels to 24.8 fixed point (saturating).
#[inline]
pub const fn fx(px: i32) -> i32 {
    px.saturating_mul(ONE)
}

/// 24.8 fixed point to whole pixels (floor).
#[inline]
pub const fn to_px(v: i32) -> i32 {
    v >> FIXED_SHIFT
}

/// Vector form of [`to_px`].
#[inline]
pub fn vec_to_px(v: IVec2) -> IVec2 {
    IVec2::new(to_px(v.x), to_px(v.y))
}

/// Vector form of [`fx`].
#[inline]
pub fn vec_fx(px: IVec2) -> IVec2 {
    IVec2::new(fx(px.x), fx(px.y))
}

/// Saturate an `i64` intermediate into `i32`.
#[inline]
pub fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Fixed-point multiply: `(a * b) >> 8`, saturating.
#[inline]
pub fn mul(a: i32, b: i32) -> i32 {
    saturate((a as i64 * b as i64) >> FIXED_SHIFT)
}

/// Scale each component of `v` by the fixed-point factor `f`.
#[inline]
pub fn scale(v: IVec2, f: i32) -> IVec2 {
    IVec2::new(mul(v.x, f), mul(v.y, f))
}

/// Wrap a scalar into `[0, period)`. `period` must be a power of two.
#[inline]
pub fn wrap(v: i32, period: i32) -> i32 {
    debug_assert!(period > 0 && (period & (period - 1)) == 0);
    v & (period - 1)
}

/// Shortest signed distance from `from` to `to` on a ring of `period`.
///
/// Result lies in `[-period / 2, period / 2)`.
#[inline]
pub fn wrapped_delta(from: i32, to: i32, period: i32) -> i32 {
    let d = wrap(to.wrapping_sub(from), period);
    if d >= period / 2 { d - period } else { d }
}

/// Unsigned shortest distance on a ring; never exceeds `period / 2`.
#[inline]
pub fn wrapped_distance(a: i32, b: i32, period: i32) -> i32 {
    wrapped_delta(a, b, period).abs()
}

/// Integer square root (floor).
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let bits = 64 - n.leading_zeros();
    let mut x = 1u64 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Euclidean length of an integer vector, saturating.
pub fn length(v: IVec2) -> i32 {
    let (x, y) = (v.x.unsigned_abs() as u64, v.y.unsigned_abs() as u64);
    isqrt(x * x + y * y).min(i32::MAX as u64) as i32
}

// Quarter-wave sine table for a 64-step compass, scaled by 256.
const QUARTER_SINE: [i32; 17] = [
    0, 25, 50, 74, 98, 121, 142, 162, 181, 198, 213, 226, 237, 245, 251, 255, 256,
];

/// Number of steps in a full turn of the fine compass.
pub const ANGLE_STEPS: i32 = 64;

/// Sine of a 64-step angle, scaled by 256.
pub fn sin64(angle: i32) -> i32 {
    let a = angle.rem_euclid(ANGLE_STEPS);
    match a {
        0..=16 => QUARTER_SINE[a as usize],
        17..=32 => QUARTER_SINE[(32 - a) as usize],
        33..=48 => -QUARTER_SINE[(a - 32) as usize],
        _ => -QUARTER_SINE[(64 - a) as usize],
    }
}

/// Cosine of a 64-step angle, scaled by 256.
pub fn cos64(angle: i32) -> i32 {
    sin64(angle + 16)
}

/// Unit vector (length 256) for a 64-step angle. Angle 0 points up (screen
/// `-y`), angles grow clockwise.
pub fn angle_vector(angle: i32) -> IVec2 {
    IVec2::new(sin64(angle), -cos64(angle))
}

/// The 64-step angle whose unit vector best matches `v`.
pub fn angle_of(v: IVec2) -> i32 {
    if v == IVec2::ZERO {
        return 0;
    }
    let mut best = 0;
    let mut best_dot = i64::MIN;
    for a in 0..ANGLE_STEPS {
        let u = angle_vector(a);
        let dot = u.x as i64 * v.x as i64 + u.y as i64 * v.y as i64;
        if dot > best_dot {
            best_dot = dot;
            best = a;
        }
    }
    best
}

/// Unit vector (length 256) for one of the 8 compass directions.
///
/// `1` is up, growing clockwise to `8` (up-left). `0` means "no direction"
/// and yields zero; anything above 8 wraps back into range.
pub fn dir_vector(dir: u8) -> IVec2 {
    if dir == 0 {
        return IVec2::ZERO;
    }
    let d = (dir - 1) % 8;
    angle_vector(d as i32 * 8)
}

/// The 8-way compass direction closest to `v` (0 when `v` is zero).
pub fn dir_towards(v: IVec2) -> u8 {
    if v == IVec2::ZERO {
        return 0;
    }
    let ax = (v.x as i64).abs();
    let ay = (v.y as i64).abs();
    // tan(22.5deg) ~= 106/256
    let horizontal = ay * 256 <= ax * 106;
    let vertical = ax * 256 <= ay * 106;
    match (horizontal, vertical) {
        (true, _) if v.x > 0 => 3,
        (true, _) => 7,
        (_, true) if v.y < 0 => 1,
        (_, true) => 5,
        _ => match (v.x > 0, v.y < 0) {
            (true, true) => 2,
            (true, false) => 4,
            (false, false) => 6,
            (false, true) => 8,
        },
    }
}

/// Direction pointing the other way.
pub fn opposite(dir: u8) -> u8 {
    if dir == 0 { 0 } else { (dir - 1 + 4) % 8 + 1 }
}

/// Rotate `dir` one step toward `target` along the shorter way round.
pub fn turn_towards(dir: u8, target: u8) -> u8 {
    if dir == 0 || target == 0 || dir == target {
        return if dir == 0 { target } else { dir };
    }
    let diff = (target as i32 - dir as i32).rem_euclid(8);
    let step = if diff <= 4 { 1 } else { -1 };
    ((dir as i32 - 1 + step).rem_euclid(8) + 1) as u8
}

/// Velocity of magnitude `speed` (fixed) pointing along `delta`.
///
/// Zero `delta` yields zero velocity.
pub fn aim(delta: IVec2, speed: i32) -> IVec2 {
    let len = length(delta) as i64;
    if len == 0 {
        return IVec2::ZERO;
    }
    IVec2::new(
        saturate(delta.x as i64 * speed as i64 / len),
        saturate(delta.y as i64 * speed as i64 / len),
    )
}

/// Wrap-around world description.
///
/// Width and height are in pixels and always powers of two; `tile_shift`
/// is log2 of the tile edge in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    width: i32,
    height: i32,
    tile_shift: u32,
}

/// Smallest world edge accepted by [`Topology::new`].
pub const MIN_WORLD_EDGE: i32 = 64;
/// Largest world edge; keeps the fixed-point period inside `i32`.
pub const MAX_WORLD_EDGE: i32 = 1 << 20;

fn pow2_clamped(v: i32, lo: i32, hi: i32) -> i32 {
    (v.clamp(lo, hi) as u32).next_power_of_two().min(hi as u32) as i32
}

impl Topology {
    /// Build a topology, rounding edges up to powers of two and clamping them
    /// into the supported range.
    pub fn new(width: i32, height: i32, tile_size: i32) -> Self {
        let width = pow2_clamped(width, MIN_WORLD_EDGE, MAX_WORLD_EDGE);
        let height = pow2_clamped(height, MIN_WORLD_EDGE, MAX_WORLD_EDGE);
        let tile = pow2_clamped(tile_size, 1, MIN_WORLD_EDGE);
        Self {
            width,
            height,
            tile_shift: tile.trailing_zeros(),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn tile_shift(&self) -> u32 {
        self.tile_shift
    }

    #[inline]
    pub fn tile_size(&self) -> i32 {
        1 << self.tile_shift
    }

    /// World size in tiles.
    pub fn tiles(&self) -> IVec2 {
        IVec2::new(self.width >> self.tile_shift, self.height >> self.tile_shift)
    }

    pub fn wrap_px(&self, p: IVec2) -> IVec2 {
        IVec2::new(wrap(p.x, self.width), wrap(p.y, self.height))
    }

    pub fn wrap_fx(&self, p: IVec2) -> IVec2 {
        IVec2::new(wrap(p.x, fx(self.width)), wrap(p.y, fx(self.height)))
    }

    /// Shortest signed offset from `from` to `to`, pixels.
    pub fn delta_px(&self, from: IVec2, to: IVec2) -> IVec2 {
        IVec2::new(
            wrapped_delta(from.x, to.x, self.width),
            wrapped_delta(from.y, to.y, self.height),
        )
    }

    /// Shortest signed offset from `from` to `to`, fixed point.
    pub fn delta_fx(&self, from: IVec2, to: IVec2) -> IVec2 {
        IVec2::new(
            wrapped_delta(from.x, to.x, fx(self.width)),
            wrapped_delta(from.y, to.y, fx(self.height)),
        )
    }

    /// Euclidean wrapped distance in pixels.
    pub fn distance_px(&self, a: IVec2, b: IVec2) -> i32 {
        length(self.delta_px(a, b))
    }

    /// Whether the tile grid is exactly `tiles` in size.
    pub fn matches_tiles(&self, tiles: IVec2) -> bool {
        self.tiles() == tiles
    }

    /// Tile containing a pixel position (after wrapping).
    pub fn tile_of(&self, p: IVec2) -> IVec2 {
        let p = self.wrap_px(p);
        IVec2::new(p.x >> self.tile_shift, p.y >> self.tile_shift)
    }

    /// Wrap tile coordinates onto the tile grid.
    pub fn wrap_tile(&self, t: IVec2) -> IVec2 {
        let tiles = self.tiles();
        IVec2::new(wrap(t.x, tiles.x), wrap(t.y, tiles.y))
    }

    /// Pixel centre of a tile, fixed point.
    pub fn tile_center_fx(&self, t: IVec2) -> IVec2 {
        let t = self.wrap_tile(t);
        let half = self.tile_size() / 2;
        vec_fx(IVec2::new(
            (t.x << self.tile_shift) + half,
            (t.y << self.tile_shift) + half,
        ))
    }
}
