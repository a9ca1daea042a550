//! Game state and core simulation types
//!
//! Everything the fixed-tick pipeline mutates lives here. Presentation never
//! touches this directly; it gets a `FrameSnapshot` once per tick.

use glam::Vec2;

use super::collision::Aabb;
use super::obstacle::{Obstacle, ObstacleField};
use crate::GameConfig;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for setup (capture running, wallet connected) and the start key
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended; only restart leaves this phase
    GameOver,
}

/// Things a tick can emit for the app layer to act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A jump started, with the applied strength multiplier
    Jumped { multiplier: f32 },
    /// Obstacles scrolled off and were scored
    Scored { retired: u32 },
    /// The hen hit an obstacle; the round is over
    Crashed,
    /// Score crossed the reward threshold while the latch was armed
    RewardReady { score: u32 },
}

/// The player's hen
#[derive(Debug, Clone, PartialEq)]
pub struct Hen {
    /// Top-left corner; x never changes after spawn, y grows downward
    pub pos: Vec2,
    /// Vertical velocity in pixels per tick (positive is down)
    pub vy: f32,
    pub airborne: bool,
    /// Sim-seconds of the last successful jump (`None` before the first)
    pub last_jump: Option<f32>,
}

impl Hen {
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            pos: Vec2::new(cfg.hen_spawn_x(), cfg.hen_rest_y()),
            vy: 0.0,
            airborne: false,
            last_jump: None,
        }
    }

    /// Jump iff grounded, off cooldown, and the voice is loud enough
    ///
    /// Strength scales with intensity: multiplier = min(2.5, 1 + i * 3).
    /// Returns the applied multiplier when a jump starts. A loud sample while
    /// airborne or inside the cooldown is the normal steady state, not a
    /// fault, so those paths are silent no-ops.
    pub fn try_jump(&mut self, intensity: f32, now: f32, cfg: &GameConfig) -> Option<f32> {
        if self.airborne {
            return None;
        }
        if let Some(last) = self.last_jump {
            if now - last <= cfg.jump_cooldown {
                return None;
            }
        }
        if intensity <= cfg.sound_threshold {
            return None;
        }

        let multiplier = (1.0 + intensity * JUMP_MULT_SLOPE).min(JUMP_MULT_CAP);
        self.vy = -cfg.jump_power * multiplier;
        self.airborne = true;
        self.last_jump = Some(now);
        Some(multiplier)
    }

    /// One tick of vertical physics
    ///
    /// Velocity first, then position (semi-implicit Euler). Gravity is a
    /// per-tick constant, not dt-scaled: the tick rate is fixed and the
    /// tuning values assume it. Both bounds zero the velocity; only the
    /// ground clears `airborne`.
    pub fn integrate(&mut self, cfg: &GameConfig) {
        self.vy += cfg.gravity;
        self.pos.y += self.vy;

        let rest_y = cfg.hen_rest_y();
        if self.pos.y >= rest_y {
            self.pos.y = rest_y;
            self.vy = 0.0;
            self.airborne = false;
        } else if self.pos.y <= 0.0 {
            self.pos.y = 0.0;
            self.vy = 0.0;
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(HEN_W, HEN_H))
    }
}

/// Complete game state (deterministic given the seed and the input stream)
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter; monotonic across restarts
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub score: u32,
    /// Whether crossing the reward threshold should fire the sink
    pub reward_armed: bool,
    pub hen: Hen,
    pub field: ObstacleField,
}

impl GameState {
    /// Create a fresh state waiting in `Ready`
    pub fn new(seed: u64, cfg: &GameConfig) -> Self {
        Self {
            seed,
            time_ticks: 0,
            phase: GamePhase::Ready,
            score: 0,
            reward_armed: true,
            hen: Hen::new(cfg),
            field: ObstacleField::new(seed),
        }
    }

    /// Simulation clock reading
    #[inline]
    pub fn now(&self) -> f32 {
        crate::sim_seconds(self.time_ticks)
    }

    /// Fresh hen, empty field, score 0, latch armed, spawn clock re-based
    ///
    /// Shared by the Ready start and the GameOver restart so the first
    /// obstacle always arrives one full spawn interval into play.
    pub fn reset_round(&mut self, cfg: &GameConfig) {
        let now = self.now();
        self.hen = Hen::new(cfg);
        self.field.reset(now);
        self.score = 0;
        self.reward_armed = true;
        self.phase = GamePhase::Playing;
    }

    /// Apply the app layer's reward settlement
    ///
    /// Success spends the score and re-arms the latch. Failure leaves the
    /// latch disarmed; a failed reward is never retried within the round.
    pub fn settle_reward(&mut self, success: bool) {
        if success {
            self.score = 0;
            self.reward_armed = true;
        }
    }

    /// Presentation hand-off; `intensity` is the sample the tick consumed
    pub fn snapshot(&self, intensity: f32) -> FrameSnapshot {
        FrameSnapshot {
            phase: self.phase,
            score: self.score,
            intensity,
            hen_pos: self.hen.pos,
            hen_size: Vec2::new(HEN_W, HEN_H),
            airborne: self.hen.airborne,
            obstacles: self.field.obstacles.clone(),
        }
    }
}

/// One frame of render state; the only thing the presentation layer sees
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    /// Smoothed intensity as sampled; the UI clamps it for display
    pub intensity: f32,
    pub hen_pos: Vec2,
    pub hen_size: Vec2,
    pub airborne: bool,
    pub obstacles: Vec<Obstacle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_new_state_waits_grounded() {
        let cfg = cfg();
        let state = GameState::new(1, &cfg);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0);
        assert!(state.reward_armed);
        assert!(state.field.is_empty());
        assert_eq!(state.hen.pos, Vec2::new(200.0, 460.0));
        assert!(!state.hen.airborne);
    }

    #[test]
    fn test_jump_multiplier_capped_exactly() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        // 1 + 0.5 * 3 = 2.5, exactly at the cap.
        let multiplier = hen.try_jump(0.5, 1.0, &cfg);
        assert_eq!(multiplier, Some(2.5));
        assert_eq!(hen.vy, -37.5);
        assert!(hen.airborne);
        assert_eq!(hen.last_jump, Some(1.0));
    }

    #[test]
    fn test_jump_multiplier_scales_below_cap() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        let multiplier = hen.try_jump(0.2, 1.0, &cfg).unwrap();
        let expected = 1.0 + 0.2f32 * JUMP_MULT_SLOPE;
        assert!((multiplier - expected).abs() < 1e-6);
        assert!((hen.vy - (-cfg.jump_power * expected)).abs() < 1e-4);
    }

    #[test]
    fn test_jump_requires_strictly_above_threshold() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        assert_eq!(hen.try_jump(cfg.sound_threshold, 1.0, &cfg), None);
        assert!(!hen.airborne);
        assert!(hen.try_jump(cfg.sound_threshold + 0.001, 1.0, &cfg).is_some());
    }

    #[test]
    fn test_jump_blocked_while_airborne() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        assert!(hen.try_jump(1.0, 1.0, &cfg).is_some());
        assert_eq!(hen.try_jump(1.0, 1.2, &cfg), None);
    }

    #[test]
    fn test_cooldown_allows_exactly_one_jump() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        assert!(hen.try_jump(1.0, 1.0, &cfg).is_some());
        // Ground the hen again without advancing the clock past the cooldown.
        hen.airborne = false;
        hen.vy = 0.0;
        assert_eq!(hen.try_jump(1.0, 1.04, &cfg), None);
        assert!(hen.try_jump(1.0, 1.06, &cfg).is_some());
    }

    #[test]
    fn test_first_jump_has_no_cooldown() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);
        // At the very start of a round the clock reads 0.0.
        assert!(hen.try_jump(1.0, 0.0, &cfg).is_some());
    }

    #[test]
    fn test_integrate_idempotent_on_ground() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);
        let rested = hen.clone();

        hen.integrate(&cfg);
        hen.integrate(&cfg);
        assert_eq!(hen, rested);
    }

    #[test]
    fn test_jump_arc_returns_to_rest() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);
        let rest_y = cfg.hen_rest_y();

        assert_eq!(hen.try_jump(0.5, 0.0, &cfg), Some(2.5));
        let mut ticks = 0;
        while hen.airborne {
            hen.integrate(&cfg);
            ticks += 1;
            assert!(ticks < 200, "hen never landed");
            if hen.airborne {
                assert!(hen.pos.y < rest_y);
            }
        }
        assert_eq!(hen.pos.y, rest_y);
        assert_eq!(hen.vy, 0.0);
    }

    #[test]
    fn test_ceiling_clamp_zeroes_velocity() {
        let cfg = cfg();
        let mut hen = Hen::new(&cfg);

        // A max-strength jump out-climbs the scene height.
        hen.try_jump(1.0, 0.0, &cfg);
        let mut hit_ceiling = false;
        for _ in 0..200 {
            hen.integrate(&cfg);
            if hen.pos.y == 0.0 {
                hit_ceiling = true;
                assert_eq!(hen.vy, 0.0);
                assert!(hen.airborne);
                break;
            }
        }
        assert!(hit_ceiling);
    }

    #[test]
    fn test_settle_reward_latch() {
        let cfg = cfg();
        let mut state = GameState::new(1, &cfg);
        state.score = 120;
        state.reward_armed = false;

        state.settle_reward(false);
        assert_eq!(state.score, 120);
        assert!(!state.reward_armed);

        state.settle_reward(true);
        assert_eq!(state.score, 0);
        assert!(state.reward_armed);
    }

    #[test]
    fn test_reset_round_restores_spawn_state() {
        let cfg = cfg();
        let mut state = GameState::new(5, &cfg);
        state.time_ticks = 600;
        state.score = 70;
        state.reward_armed = false;
        state.hen.pos.y = 100.0;
        state.hen.airborne = true;
        state.field.maybe_spawn(10.0, &cfg);
        state.phase = GamePhase::GameOver;

        state.reset_round(&cfg);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert!(state.reward_armed);
        assert!(state.field.is_empty());
        assert_eq!(state.hen, Hen::new(&cfg));
        assert_eq!(state.field.last_spawn, state.now());
        // The sim clock itself keeps running across rounds.
        assert_eq!(state.time_ticks, 600);
    }
}
