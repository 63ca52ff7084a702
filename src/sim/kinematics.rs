//! Per-tick kinematics
//!
//! Advances the avatar and every live entity once per fixed tick. Notes
//! are placed closed-form from their scheduled time (exact, cannot
//! drift); everything else is a Euler step. Homing bullets steer a fixed
//! fraction toward the player and are clamped to their speed cap. The
//! boundary pass marks off-field entities resolved without a verdict -
//! lifecycle expiry, not a judged miss.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::config::Mode;

use super::avatar::{
    Avatar, AIR_SPIN, BALL_RADIUS, CUBE_SIZE, GRAVITY, GROUND_HEIGHT, PADDLE_WIDTH, SOUL_HALF,
    SOUL_SPEED,
};
use super::entity::EntityKind;
use super::outcome;
use super::state::Session;

/// Hit-zone center along the rhythm lane
pub const NOTE_HIT_X: f32 = 145.0;
/// Bone bullet speed in px/tick before the difficulty multiplier
pub const BONE_SPEED: f32 = 3.0;
/// Homing bullet speed cap in px/tick before the difficulty multiplier
pub const HOMING_BASE_SPEED: f32 = 2.0;
/// Fraction of the unit-to-player direction added to homing velocity per tick
pub const HOMING_STEER: f32 = 0.05;
/// Entities this far outside the playfield are expired
pub const BOUNDS_MARGIN: f32 = 30.0;
/// Runner obstacle edge length
pub const OBSTACLE_SIZE: f32 = 40.0;

/// Closed-form note placement: distance to the hit zone is travel time
/// times travel speed
#[inline]
pub fn note_x(note_speed: f32, target_time_ms: f32, elapsed_ms: f32) -> f32 {
    NOTE_HIT_X + (target_time_ms - elapsed_ms) / 1000.0 * note_speed
}

pub(crate) fn run(session: &mut Session) {
    if matches!(session.avatar, Avatar::Paddle { .. }) {
        step_paddle(session);
    } else if matches!(session.avatar, Avatar::Cube { .. }) {
        step_cube(session);
    } else if matches!(session.avatar, Avatar::Soul { .. }) {
        step_soul(session);
    }
    if session.phase == super::Phase::Running {
        step_entities(session);
    }
}

/// Paddle tracking plus ball flight: wall reflection, paddle bounce with
/// offset-dependent redirect, life loss past the bottom edge
fn step_paddle(session: &mut Session) {
    let field = session.config.playfield;
    let Mode::Breaker(profile) = &session.config.mode else {
        return;
    };
    let ball_speed = profile.ball_speed;
    let control_x = session.control.x;

    let mut lost = false;
    if let Avatar::Paddle {
        x,
        ball_pos,
        ball_vel,
    } = &mut session.avatar
    {
        // Continuous pointer axis maps straight onto the paddle span
        let t = (control_x.clamp(-1.0, 1.0) + 1.0) / 2.0;
        *x = field.min.x + t * (field.width() - PADDLE_WIDTH);

        let next = *ball_pos + *ball_vel;
        if next.x > field.max.x - BALL_RADIUS || next.x < field.min.x + BALL_RADIUS {
            ball_vel.x = -ball_vel.x;
        }
        if next.y < field.min.y + BALL_RADIUS {
            ball_vel.y = -ball_vel.y;
        } else if next.y > field.max.y - BALL_RADIUS {
            if ball_pos.x > *x && ball_pos.x < *x + PADDLE_WIDTH {
                // Redirect by hit offset: center goes straight up, edges
                // deflect up to 60 degrees
                let offset = (ball_pos.x - (*x + PADDLE_WIDTH / 2.0)) / (PADDLE_WIDTH / 2.0);
                let angle = offset * FRAC_PI_3;
                *ball_vel = Vec2::new(ball_speed * angle.sin(), -ball_speed * angle.cos());
            } else {
                lost = true;
            }
        }
        *ball_pos += *ball_vel;
    }

    if lost {
        outcome::ball_lost(session);
    }
}

/// Gravity, ground clamp, airborne spin
fn step_cube(session: &mut Session) {
    let field = session.config.playfield;
    if let Avatar::Cube {
        y,
        vy,
        rotation,
        grounded,
    } = &mut session.avatar
    {
        *vy += GRAVITY;
        *y += *vy;

        let ground_y = field.max.y - GROUND_HEIGHT - CUBE_SIZE;
        if *y >= ground_y {
            *y = ground_y;
            *vy = 0.0;
            *grounded = true;
            // Land square on a face
            *rotation = (*rotation / FRAC_PI_2).round() * FRAC_PI_2;
        } else {
            *rotation += AIR_SPIN;
        }
    }
}

/// Direction-controlled movement, field clamp, invincibility countdown
fn step_soul(session: &mut Session) {
    let field = session.config.playfield;
    let control = session.control;
    if let Avatar::Soul {
        pos,
        invincible_ticks,
    } = &mut session.avatar
    {
        let dir = Vec2::new(control.x.clamp(-1.0, 1.0), control.y.clamp(-1.0, 1.0));
        *pos += dir * SOUL_SPEED;
        pos.x = pos.x.clamp(field.min.x + SOUL_HALF, field.max.x - SOUL_HALF);
        pos.y = pos.y.clamp(field.min.y + SOUL_HALF, field.max.y - SOUL_HALF);

        if *invincible_ticks > 0 {
            *invincible_ticks -= 1;
        }
    }
}

fn step_entities(session: &mut Session) {
    let field = session.config.playfield;
    let bounds = field.expand(BOUNDS_MARGIN);
    let elapsed = session.elapsed_ms as f32;
    let note_speed = match &session.config.mode {
        Mode::Rhythm(p) => p.note_speed,
        _ => 0.0,
    };
    let soul_pos = match &session.avatar {
        Avatar::Soul { pos, .. } => Some(*pos),
        _ => None,
    };

    let mut obstacles_passed = 0u64;
    for entity in session.entities.iter_mut() {
        if entity.resolved {
            continue;
        }
        match &mut entity.kind {
            EntityKind::NoteDon | EntityKind::NoteKa => {
                if let Some(target) = entity.target_time_ms {
                    entity.pos.x = note_x(note_speed, target, elapsed);
                }
            }
            EntityKind::HomingStar { max_speed } => {
                let cap = *max_speed;
                if let (Some(vel), Some(target)) = (entity.vel.as_mut(), soul_pos) {
                    let to_target = target - entity.pos;
                    let dist = to_target.length();
                    if dist > 0.0 {
                        *vel += to_target / dist * HOMING_STEER;
                        let speed = vel.length();
                        if speed > cap {
                            *vel = *vel / speed * cap;
                        }
                    }
                    entity.pos += *vel;
                }
            }
            EntityKind::Laser {
                warmup_ticks,
                life_ticks,
                ..
            } => {
                // Stationary: warning phase counts down, then the armed
                // phase burns out and the laser expires
                if *warmup_ticks > 0 {
                    *warmup_ticks -= 1;
                } else if *life_ticks > 0 {
                    *life_ticks -= 1;
                    if *life_ticks == 0 {
                        entity.resolved = true;
                    }
                }
                continue;
            }
            _ => {
                if let Some(vel) = entity.vel {
                    entity.pos += vel;
                }
            }
        }

        // Boundary expiry (never a judged miss)
        match entity.kind {
            EntityKind::ObstacleSpike | EntityKind::ObstacleBlock => {
                if entity.pos.x + OBSTACLE_SIZE < field.min.x {
                    entity.resolved = true;
                    obstacles_passed += 1;
                }
            }
            EntityKind::BoneVertical | EntityKind::BoneHorizontal | EntityKind::HomingStar { .. } => {
                if !bounds.contains(entity.pos) {
                    entity.resolved = true;
                }
            }
            _ => {}
        }
    }

    if obstacles_passed > 0 {
        outcome::obstacles_passed(session, obstacles_passed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BattleProfile, RunnerProfile, SessionConfig};
    use crate::sim::entity::Entity;
    use crate::sim::Phase;

    fn battle_session() -> Session {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::normal()), 11).unwrap();
        session.start();
        session
    }

    #[test]
    fn test_note_placement_is_exact() {
        // 1500ms out at 500 px/s puts the note 750px past the hit zone
        assert!((note_x(500.0, 2000.0, 500.0) - (NOTE_HIT_X + 750.0)).abs() < 0.001);
        // At the scheduled time the note sits exactly on the hit zone
        assert!((note_x(500.0, 2000.0, 2000.0) - NOTE_HIT_X).abs() < 0.001);
    }

    #[test]
    fn test_homing_speed_is_clamped() {
        let mut session = battle_session();
        let id = session.next_entity_id();
        session.entities.push(Entity::moving(
            id,
            EntityKind::HomingStar { max_speed: 2.0 },
            Vec2::new(10.0, 10.0),
            Vec2::new(2.0, 0.0),
        ));
        for _ in 0..200 {
            run(&mut session);
        }
        let star = &session.entities[0];
        assert!(star.vel.unwrap().length() <= 2.0 + 1e-4);
    }

    #[test]
    fn test_bullet_expires_outside_margin_without_verdict() {
        let mut session = battle_session();
        let id = session.next_entity_id();
        session.entities.push(Entity::moving(
            id,
            EntityKind::BoneHorizontal,
            Vec2::new(279.0, 125.0),
            Vec2::new(5.0, 0.0),
        ));
        run(&mut session);
        assert!(session.entities[0].resolved);
        assert_eq!(session.lives, 3);
        assert!(session.events.is_empty());
        assert_eq!(session.phase, Phase::Running);
    }

    #[test]
    fn test_cube_lands_and_snaps_rotation() {
        let mut session =
            Session::new(SessionConfig::runner(RunnerProfile::default()), 11).unwrap();
        session.start();
        session.avatar.jump();
        let mut airborne_ticks = 0;
        loop {
            run(&mut session);
            match session.avatar {
                Avatar::Cube { grounded, .. } if grounded => break,
                _ => airborne_ticks += 1,
            }
            assert!(airborne_ticks < 120, "cube never landed");
        }
        match session.avatar {
            Avatar::Cube { y, vy, rotation, .. } => {
                assert_eq!(vy, 0.0);
                assert!((y - (450.0 - GROUND_HEIGHT - CUBE_SIZE)).abs() < 0.001);
                let quarter_turns = rotation / FRAC_PI_2;
                assert!((quarter_turns - quarter_turns.round()).abs() < 1e-4);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_soul_clamps_to_field() {
        let mut session = battle_session();
        session.set_control_axis(Vec2::new(-1.0, -1.0));
        for _ in 0..200 {
            run(&mut session);
        }
        match session.avatar {
            Avatar::Soul { pos, .. } => {
                assert_eq!(pos, Vec2::new(SOUL_HALF, SOUL_HALF));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_laser_expires_after_life() {
        let mut session = battle_session();
        let id = session.next_entity_id();
        session.entities.push(Entity::moving(
            id,
            EntityKind::Laser {
                vertical: true,
                warmup_ticks: 2,
                life_ticks: 3,
            },
            Vec2::new(50.0, 125.0),
            Vec2::ZERO,
        ));
        for _ in 0..4 {
            run(&mut session);
            assert!(!session.entities[0].resolved);
        }
        run(&mut session);
        assert!(session.entities[0].resolved);
    }
}
