//! Holler Hen - a voice-controlled jumping-hen arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, game state)
//! - `audio`: Microphone capture and loudness smoothing
//! - `tui`: Terminal half-block rendering and key input
//! - `reward`: Score-threshold reward sink (stub devnet wallet)
//! - `config`: Gameplay and capture tunables

pub mod audio;
pub mod config;
pub mod reward;
pub mod sim;
pub mod tui;

pub use audio::IntensitySampler;
pub use config::GameConfig;
pub use reward::{RewardSink, StubWallet};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation and presentation rate (one tick per frame)
    pub const TICK_HZ: u32 = 60;
    /// Fixed timestep in seconds
    pub const TICK_DT: f32 = 1.0 / 60.0;

    /// Hen hit-box dimensions
    pub const HEN_W: f32 = 40.0;
    pub const HEN_H: f32 = 40.0;

    /// Cactus: fixed-height block planted on the ground
    pub const CACTUS_W: f32 = 40.0;
    pub const CACTUS_H: f32 = 60.0;

    /// Tower: static block with a per-spawn random height (inclusive range)
    pub const TOWER_W: f32 = 40.0;
    pub const TOWER_MIN_H: u32 = 40;
    pub const TOWER_MAX_H: u32 = 100;

    /// Cracked slab: low, wide block with decorative crack marks
    pub const SLAB_W: f32 = 60.0;
    pub const SLAB_H: f32 = 20.0;
    pub const SLAB_CRACKS: usize = 3;

    /// Bouncer: square that bobs above its ground anchor
    pub const BOUNCER_SIZE: f32 = 30.0;
    pub const BOUNCE_AMPLITUDE: f32 = 50.0;
    /// Bounce phase advance per tick (radians)
    pub const BOUNCE_STEP: f32 = 0.1;

    /// Jump strength scaling: multiplier = min(CAP, 1 + intensity * SLOPE)
    pub const JUMP_MULT_CAP: f32 = 2.5;
    pub const JUMP_MULT_SLOPE: f32 = 3.0;

    /// Samples per loudness block (device rate independent)
    pub const CAPTURE_BLOCK: usize = 1024;
    /// Recent-block ring length for smoothing
    pub const SMOOTH_RING: usize = 3;
    /// Blend weights: published = avg * BLEND_AVERAGE + newest * BLEND_RECENT
    pub const BLEND_RECENT: f32 = 0.7;
    pub const BLEND_AVERAGE: f32 = 0.3;

    /// Lamports granted per redeemed reward (0.01 SOL)
    pub const REWARD_LAMPORTS: u64 = 10_000_000;
    pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
}

/// Simulation clock reading for a tick count
#[inline]
pub fn sim_seconds(ticks: u64) -> f32 {
    ticks as f32 * consts::TICK_DT
}
