//! Player-controlled target regions
//!
//! Each mode judges entities against one avatar: the breaker's ball (with
//! the paddle steering it), the runner's cube, the battle soul, or the
//! rhythm drum, which has no spatial state at all - its "region" is the
//! temporal hit window.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{Mode, SessionConfig};

/// Breaker paddle and ball
pub const PADDLE_WIDTH: f32 = 100.0;
pub const PADDLE_HEIGHT: f32 = 15.0;
/// Paddle top edge sits this far above the playfield bottom
pub const PADDLE_RAISE: f32 = 40.0;
pub const BALL_RADIUS: f32 = 8.0;
/// Serve position height above the playfield bottom
pub const SERVE_RAISE: f32 = 50.0;
/// Serve velocity components in px/tick
pub const SERVE_VX: f32 = 4.0;
pub const SERVE_VY: f32 = -4.0;

/// Runner cube
pub const CUBE_SIZE: f32 = 40.0;
pub const CUBE_X: f32 = 100.0;
pub const GROUND_HEIGHT: f32 = 100.0;
pub const GRAVITY: f32 = 0.6;
pub const JUMP_VELOCITY: f32 = -11.0;
/// Airborne spin in radians per tick (render-only)
pub const AIR_SPIN: f32 = 0.1;

/// Battle soul
pub const SOUL_SPEED: f32 = 3.0;
pub const SOUL_HALF: f32 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Avatar {
    /// Rhythm: judging is temporal, nothing to move
    Drum,
    /// Breaker: paddle left edge + free-moving ball
    Paddle {
        x: f32,
        ball_pos: Vec2,
        ball_vel: Vec2,
    },
    /// Runner: cube top edge; x is fixed at [`CUBE_X`]
    Cube {
        y: f32,
        vy: f32,
        rotation: f32,
        grounded: bool,
    },
    /// Battle: soul center with post-hit invincibility countdown
    Soul { pos: Vec2, invincible_ticks: u32 },
}

impl Avatar {
    /// Fresh avatar for a new session
    pub fn new(config: &SessionConfig, rng: &mut Pcg32) -> Self {
        let field = config.playfield;
        match &config.mode {
            Mode::Rhythm(_) => Avatar::Drum,
            Mode::Breaker(_) => {
                let mut avatar = Avatar::Paddle {
                    x: 0.0,
                    ball_pos: Vec2::ZERO,
                    ball_vel: Vec2::ZERO,
                };
                avatar.reset_serve(config, rng);
                avatar
            }
            Mode::Runner(_) => Avatar::Cube {
                y: field.max.y - GROUND_HEIGHT - CUBE_SIZE,
                vy: 0.0,
                rotation: 0.0,
                grounded: true,
            },
            Mode::Battle(_) => Avatar::Soul {
                pos: config.playfield_center(),
                invincible_ticks: 0,
            },
        }
    }

    /// Re-center paddle and ball after a serve or a lost life. The serve
    /// direction is re-rolled from the session RNG.
    pub fn reset_serve(&mut self, config: &SessionConfig, rng: &mut Pcg32) {
        if let Avatar::Paddle {
            x,
            ball_pos,
            ball_vel,
        } = self
        {
            let field = config.playfield;
            *x = field.min.x + (field.width() - PADDLE_WIDTH) / 2.0;
            *ball_pos = Vec2::new(
                field.min.x + field.width() / 2.0,
                field.max.y - SERVE_RAISE,
            );
            let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            *ball_vel = Vec2::new(SERVE_VX * dir, SERVE_VY);
        }
    }

    /// Jump if grounded; a jump mid-air is discarded
    pub fn jump(&mut self) {
        if let Avatar::Cube { vy, grounded, .. } = self {
            if *grounded {
                *vy = JUMP_VELOCITY;
                *grounded = false;
            }
        }
    }

    /// Whether spatial hits are currently absorbed
    pub fn is_invincible(&self) -> bool {
        matches!(self, Avatar::Soul { invincible_ticks, .. } if *invincible_ticks > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakerProfile, RunnerProfile, SessionConfig};
    use rand::SeedableRng;

    #[test]
    fn test_cube_starts_grounded() {
        let config = SessionConfig::runner(RunnerProfile::default());
        let mut rng = Pcg32::seed_from_u64(7);
        let avatar = Avatar::new(&config, &mut rng);
        match avatar {
            Avatar::Cube { y, grounded, .. } => {
                assert!(grounded);
                assert!((y - (450.0 - GROUND_HEIGHT - CUBE_SIZE)).abs() < f32::EPSILON);
            }
            other => panic!("expected cube, got {other:?}"),
        }
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut avatar = Avatar::Cube {
            y: 100.0,
            vy: 0.0,
            rotation: 0.0,
            grounded: true,
        };
        avatar.jump();
        match avatar {
            Avatar::Cube { vy, grounded, .. } => {
                assert_eq!(vy, JUMP_VELOCITY);
                assert!(!grounded);
            }
            _ => unreachable!(),
        }
        // A second jump mid-air changes nothing
        avatar.jump();
        match avatar {
            Avatar::Cube { vy, .. } => assert_eq!(vy, JUMP_VELOCITY),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_serve_centers_paddle() {
        let config = SessionConfig::breaker(BreakerProfile::default());
        let mut rng = Pcg32::seed_from_u64(3);
        let avatar = Avatar::new(&config, &mut rng);
        match avatar {
            Avatar::Paddle {
                x,
                ball_pos,
                ball_vel,
            } => {
                assert!((x - (480.0 - PADDLE_WIDTH) / 2.0).abs() < f32::EPSILON);
                assert_eq!(ball_pos, Vec2::new(240.0, 320.0 - SERVE_RAISE));
                assert_eq!(ball_vel.x.abs(), SERVE_VX);
                assert_eq!(ball_vel.y, SERVE_VY);
            }
            other => panic!("expected paddle, got {other:?}"),
        }
    }
}
