//! Shmup Core - simulation core of a wrap-around arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic fixed-point simulation (pool, motion, collision, actors)
//! - `renderer`: Render boundary (interpolated sprite instances, no draw calls)
//! - `audio`: Audio boundary (positional sound events, no mixing)
//! - `settings`: Data-driven tuning loaded from JSON

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{AudioEvent, AudioQueue, SoundEffect};
pub use settings::{FilterMode, SettingsError, SimSettings};
pub use sim::{GameEvent, Sim, TickInput, tick};

/// Simulation configuration constants
pub mod consts {
    /// Logic ticks per second
    pub const TICK_RATE: u32 = 60;
    /// Maximum logic ticks per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Pooled objects (ship, bolts, actors)
    pub const DEFAULT_OBJECT_CAPACITY: usize = 512;
    pub const MIN_OBJECT_CAPACITY: usize = 16;
    pub const MAX_OBJECT_CAPACITY: usize = 8192;

    /// Actor table slots
    pub const DEFAULT_ACTOR_CAPACITY: usize = 256;
    pub const MIN_ACTOR_CAPACITY: usize = 8;
    pub const MAX_ACTOR_CAPACITY: usize = 4096;

    /// Concurrent player bolts
    pub const MAX_BOLTS: usize = 8;
}
