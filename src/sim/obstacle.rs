//! Obstacle variants, spawning cadence, and retirement
//!
//! Obstacles enter at the right edge, scroll left at a constant per-tick
//! speed, and are retired (and scored) once fully off the left edge. Spawning
//! is gated by both a time interval and a minimum screen-space gap to the
//! newest obstacle, so bursts can never wall off the hen.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use crate::GameConfig;
use crate::consts::*;

/// Obstacle variant; carries per-variant state with no gameplay effect
/// beyond the hit-box (cracks and bounce phase are motion/render detail)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleKind {
    /// Fixed-size block on the ground
    Cactus,
    /// Ground block with a per-spawn random height
    Tower,
    /// Low, wide block decorated with crack marks
    CrackedSlab { cracks: [(f32, f32); SLAB_CRACKS] },
    /// Square that bobs above its ground anchor
    Bouncer { base_y: f32, phase: f32 },
}

impl ObstacleKind {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::Cactus => "cactus",
            ObstacleKind::Tower => "tower",
            ObstacleKind::CrackedSlab { .. } => "cracked slab",
            ObstacleKind::Bouncer { .. } => "bouncer",
        }
    }
}

/// A scrolling obstacle; `pos` is the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    /// Roll a fresh obstacle at the right edge of the scene
    pub fn spawn(rng: &mut Pcg32, cfg: &GameConfig) -> Self {
        match rng.random_range(0..4u32) {
            0 => Self::cactus(cfg),
            1 => Self::tower(rng, cfg),
            2 => Self::cracked_slab(rng, cfg),
            _ => Self::bouncer(cfg),
        }
    }

    fn cactus(cfg: &GameConfig) -> Self {
        Self {
            kind: ObstacleKind::Cactus,
            pos: Vec2::new(cfg.width, cfg.ground_y - CACTUS_H),
            size: Vec2::new(CACTUS_W, CACTUS_H),
        }
    }

    fn tower(rng: &mut Pcg32, cfg: &GameConfig) -> Self {
        let height = rng.random_range(TOWER_MIN_H..=TOWER_MAX_H) as f32;
        Self {
            kind: ObstacleKind::Tower,
            pos: Vec2::new(cfg.width, cfg.ground_y - height),
            size: Vec2::new(TOWER_W, height),
        }
    }

    fn cracked_slab(rng: &mut Pcg32, cfg: &GameConfig) -> Self {
        let cracks = std::array::from_fn(|_| {
            (
                rng.random_range(0.0..SLAB_W),
                rng.random_range(0.0..SLAB_H),
            )
        });
        Self {
            kind: ObstacleKind::CrackedSlab { cracks },
            pos: Vec2::new(cfg.width, cfg.ground_y - SLAB_H),
            size: Vec2::new(SLAB_W, SLAB_H),
        }
    }

    fn bouncer(cfg: &GameConfig) -> Self {
        let base_y = cfg.ground_y - BOUNCER_SIZE;
        Self {
            kind: ObstacleKind::Bouncer { base_y, phase: 0.0 },
            pos: Vec2::new(cfg.width, base_y),
            size: Vec2::new(BOUNCER_SIZE, BOUNCER_SIZE),
        }
    }

    /// One tick of motion: constant leftward scroll plus the variant's law
    pub fn advance(&mut self, cfg: &GameConfig) {
        self.pos.x -= cfg.obstacle_speed;
        if let ObstacleKind::Bouncer { base_y, phase } = &mut self.kind {
            *phase += BOUNCE_STEP;
            self.pos.y = *base_y - phase.sin().abs() * BOUNCE_AMPLITUDE;
        }
    }

    /// Fully past the left edge and due for retirement
    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// The live obstacle collection, ordered by spawn time
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    /// Sim-seconds of the most recent spawn (or the round start)
    pub last_spawn: f32,
    rng: Pcg32,
}

impl ObstacleField {
    pub fn new(seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            last_spawn: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Spawn one obstacle if both the interval and spacing gates pass
    ///
    /// The spacing gate only inspects the newest obstacle: spawns happen in
    /// x-order and nothing reorders the collection, so the newest is always
    /// the rightmost.
    pub fn maybe_spawn(&mut self, now: f32, cfg: &GameConfig) -> Option<ObstacleKind> {
        if now - self.last_spawn <= cfg.spawn_interval {
            return None;
        }
        if let Some(newest) = self.obstacles.last() {
            if cfg.width - newest.pos.x <= cfg.min_spacing {
                return None;
            }
        }

        let obstacle = Obstacle::spawn(&mut self.rng, cfg);
        let kind = obstacle.kind;
        log::debug!("spawned {} at t={:.2}", kind.name(), now);
        self.obstacles.push(obstacle);
        self.last_spawn = now;
        Some(kind)
    }

    /// Advance every obstacle by one tick
    pub fn advance_all(&mut self, cfg: &GameConfig) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(cfg);
        }
    }

    /// Drop obstacles that scrolled fully off screen; returns how many
    pub fn retire_offscreen(&mut self) -> u32 {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| !o.is_offscreen());
        (before - self.obstacles.len()) as u32
    }

    /// Empty the field and re-base the spawn clock (round start and restart)
    pub fn reset(&mut self, now: f32) {
        self.obstacles.clear();
        self.last_spawn = now;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
