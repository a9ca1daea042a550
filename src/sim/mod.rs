//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable obstacle order (by spawn time)
//! - No capture, rendering, or wallet dependencies

pub mod collision;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use collision::{Aabb, hits_any};
pub use obstacle::{Obstacle, ObstacleField, ObstacleKind};
pub use state::{FrameSnapshot, GameEvent, GamePhase, GameState, Hen};
pub use tick::{TickInput, tick};
