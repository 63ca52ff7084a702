//! Hit testing
//!
//! Two judging modes share this module: spatial overlap (breaker ball vs
//! bricks, runner cube vs obstacles, battle soul vs bullets) and the
//! temporal window (rhythm input vs scheduled notes). Every judged entity
//! is marked resolved in the same call that emits its verdict, so nothing
//! is ever judged twice.

use glam::Vec2;

use crate::config::Mode;

use super::avatar::{Avatar, CUBE_SIZE, CUBE_X, SOUL_HALF};
use super::entity::EntityKind;
use super::kinematics::OBSTACLE_SIZE;
use super::outcome;
use super::state::{InputCategory, Judgment, Session};

/// Runner forgiveness: the cube's judged box is shrunk this much per side
pub const CUBE_FORGIVENESS: f32 = 10.0;
/// Runner forgiveness applied to obstacle left/right/top edges
pub const OBSTACLE_FORGIVENESS: f32 = 5.0;
/// Combined soul-vs-bone thresholds (|dx|, |dy|), per bone orientation
pub const BONE_V_REACH: Vec2 = Vec2::new(SOUL_HALF, 30.0);
pub const BONE_H_REACH: Vec2 = Vec2::new(30.0, SOUL_HALF);
/// Soul-vs-star center distance threshold
pub const STAR_RADIUS: f32 = 10.0;
/// Soul-vs-armed-laser axis distance threshold
pub const LASER_REACH: f32 = 20.0;

/// Strict point-in-rectangle test (edges do not count as contact)
#[inline]
pub fn point_in_rect(p: Vec2, min: Vec2, max: Vec2) -> bool {
    p.x > min.x && p.x < max.x && p.y > min.y && p.y < max.y
}

/// Center-distance test for circular entities
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Spatial overlap pass, one verdict at most per tick
pub(crate) fn spatial_pass(session: &mut Session) {
    match &session.config.mode {
        Mode::Breaker(_) => breaker_pass(session),
        Mode::Runner(_) => runner_pass(session),
        Mode::Battle(_) => battle_pass(session),
        Mode::Rhythm(_) => {}
    }
}

fn breaker_pass(session: &mut Session) {
    let Avatar::Paddle { ball_pos, .. } = &session.avatar else {
        return;
    };
    let ball = *ball_pos;
    let size = session.brick_size;

    let hit = session
        .entities
        .iter()
        .position(|e| !e.resolved && e.kind.is_brick() && point_in_rect(ball, e.pos, e.pos + size));
    let Some(index) = hit else { return };

    session.entities[index].resolved = true;
    let id = session.entities[index].id;
    let kind = session.entities[index].kind;
    if let Avatar::Paddle { ball_vel, .. } = &mut session.avatar {
        ball_vel.y = -ball_vel.y;
    }
    outcome::brick_hit(session, id, kind);
}

fn runner_pass(session: &mut Session) {
    let Avatar::Cube { y, .. } = &session.avatar else {
        return;
    };
    let cube_left = CUBE_X + CUBE_FORGIVENESS;
    let cube_right = CUBE_X + CUBE_SIZE - CUBE_FORGIVENESS;
    let cube_bottom = *y + CUBE_SIZE - CUBE_FORGIVENESS;

    let hit = session.entities.iter().position(|e| {
        if e.resolved || !e.kind.is_obstacle() {
            return false;
        }
        let obs_left = e.pos.x + OBSTACLE_FORGIVENESS;
        let obs_right = e.pos.x + OBSTACLE_SIZE - OBSTACLE_FORGIVENESS;
        let obs_top = e.pos.y + OBSTACLE_FORGIVENESS;
        cube_right > obs_left && cube_left < obs_right && cube_bottom > obs_top
    });
    let Some(index) = hit else { return };

    session.entities[index].resolved = true;
    let id = session.entities[index].id;
    let kind = session.entities[index].kind;
    outcome::fatal_collision(session, id, kind);
}

fn battle_pass(session: &mut Session) {
    let Avatar::Soul {
        pos,
        invincible_ticks,
    } = &session.avatar
    else {
        return;
    };
    if *invincible_ticks > 0 {
        return;
    }
    let soul = *pos;

    let hit = session.entities.iter().position(|e| {
        if e.resolved {
            return false;
        }
        match e.kind {
            EntityKind::BoneVertical => {
                (soul.x - e.pos.x).abs() < BONE_V_REACH.x
                    && (soul.y - e.pos.y).abs() < BONE_V_REACH.y
            }
            EntityKind::BoneHorizontal => {
                (soul.x - e.pos.x).abs() < BONE_H_REACH.x
                    && (soul.y - e.pos.y).abs() < BONE_H_REACH.y
            }
            EntityKind::HomingStar { .. } => within_radius(soul, e.pos, STAR_RADIUS),
            EntityKind::Laser {
                vertical,
                warmup_ticks,
                life_ticks,
            } => {
                if warmup_ticks > 0 || life_ticks == 0 {
                    return false;
                }
                let axis_dist = if vertical {
                    (soul.x - e.pos.x).abs()
                } else {
                    (soul.y - e.pos.y).abs()
                };
                axis_dist < LASER_REACH
            }
            _ => false,
        }
    });
    let Some(index) = hit else { return };

    session.entities[index].resolved = true;
    let id = session.entities[index].id;
    let kind = session.entities[index].kind;
    outcome::player_hit(session, id, kind);
}

/// Autonomous miss detection: a note whose scheduled time slid past the
/// outer tolerance without being answered is judged a miss, exactly once
pub(crate) fn autonomous_miss_pass(session: &mut Session) {
    let Mode::Rhythm(profile) = &session.config.mode else {
        return;
    };
    let outer = profile.good_window_ms;
    let elapsed = session.elapsed_ms as f32;

    let mut missed = Vec::new();
    for entity in session.entities.iter_mut() {
        if entity.resolved || !entity.kind.is_note() {
            continue;
        }
        if let Some(target) = entity.target_time_ms {
            if elapsed - target > outer {
                entity.resolved = true;
                missed.push((entity.id, entity.kind));
            }
        }
    }
    for (id, kind) in missed {
        outcome::note_missed(session, id, kind);
    }
}

/// Input-path temporal judging. Scans live notes of the matching category
/// in queue order (time order) and takes the first inside the outer
/// tolerance. Returns false when the event matched nothing and was
/// discarded.
pub(crate) fn judge_input(
    session: &mut Session,
    category: InputCategory,
    input_elapsed_ms: f32,
) -> bool {
    let Mode::Rhythm(profile) = &session.config.mode else {
        return false;
    };
    let adjusted = input_elapsed_ms + session.config.latency_offset_ms;
    let (inner, outer) = (profile.perfect_window_ms, profile.good_window_ms);

    let hit = session.entities.iter().position(|e| {
        !e.resolved
            && e.kind.category() == Some(category)
            && e.target_time_ms
                .is_some_and(|target| (target - adjusted).abs() < outer)
    });
    let Some(index) = hit else { return false };

    session.entities[index].resolved = true;
    let id = session.entities[index].id;
    let kind = session.entities[index].kind;
    let error = (session.entities[index].target_time_ms.unwrap_or(0.0) - adjusted).abs();
    let judgment = if error < inner {
        Judgment::Perfect
    } else {
        Judgment::Good
    };
    outcome::note_hit(session, id, kind, judgment);
    true
}
