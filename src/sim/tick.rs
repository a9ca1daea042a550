//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::hits_any;
use super::state::{GameEvent, GamePhase, GameState};
use crate::GameConfig;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Latest smoothed intensity; 0.0 when no sample was published
    pub intensity: f32,
    /// Begin play (honored in Ready only)
    pub start: bool,
    /// Start a fresh round (honored in GameOver only)
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
///
/// Pipeline order while playing: clock, jump, physics, spawn, scroll,
/// retire and score, reward latch, collision. Returned events are for the
/// app layer (reward sink, logging); the sim state is already settled when
/// they are handed out.
pub fn tick(state: &mut GameState, input: &TickInput, cfg: &GameConfig) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match state.phase {
        GamePhase::Ready => {
            if input.start {
                state.reset_round(cfg);
                log::info!("Round started (seed {})", state.seed);
            }
            return events;
        }
        GamePhase::GameOver => {
            if input.restart {
                state.reset_round(cfg);
                log::info!("Round restarted (seed {})", state.seed);
            }
            return events;
        }
        GamePhase::Playing => {}
    }

    // The clock only runs while playing.
    state.time_ticks += 1;
    let now = state.now();

    // --- HEN ---
    if let Some(multiplier) = state.hen.try_jump(input.intensity, now, cfg) {
        events.push(GameEvent::Jumped { multiplier });
    }
    state.hen.integrate(cfg);

    // --- OBSTACLES ---
    state.field.maybe_spawn(now, cfg);
    state.field.advance_all(cfg);
    let retired = state.field.retire_offscreen();
    if retired > 0 {
        state.score += retired * cfg.points_per_obstacle;
        events.push(GameEvent::Scored { retired });
    }

    // --- REWARD LATCH ---
    if state.reward_armed && state.score >= cfg.reward_threshold {
        state.reward_armed = false;
        events.push(GameEvent::RewardReady { score: state.score });
        log::info!("Reward threshold reached at score {}", state.score);
    }

    // --- COLLISION ---
    let hen_box = state.hen.aabb();
    if hits_any(&hen_box, state.field.iter().map(|o| o.aabb())) {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::Crashed);
        log::info!("Game over at score {} (t={:.2})", state.score, now);
    }

    events
}
