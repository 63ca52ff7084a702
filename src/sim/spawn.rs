//! Entity spawning strategies
//!
//! Two strategies cover all four games: schedule-driven (rhythm notes
//! emitted `lead_time` ahead of their scheduled arrival) and
//! timer/probability-driven (runner obstacles on a random countdown,
//! battle bullets on the cycling attack-pattern cadence). The breaker's
//! brick grid is populated once at session start and never respawns.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{Mode, SessionConfig};
use crate::consts::MS_PER_TICK;

use super::chart::{self, ChartNote, NoteKind};
use super::entity::{Entity, EntityKind};
use super::kinematics::{self, OBSTACLE_SIZE};
use super::outcome;
use super::state::Session;
use super::avatar::{Avatar, GROUND_HEIGHT};

/// Breaker brick grid layout
pub const BRICK_HEIGHT: f32 = 20.0;
pub const BRICK_PADDING: f32 = 10.0;
pub const BRICK_OFFSET_TOP: f32 = 50.0;
pub const BRICK_OFFSET_LEFT: f32 = 35.0;

/// Ticks an armed laser stays lethal
pub const LASER_LIFE_TICKS: u32 = 30;
/// Chance a laser aims at the player rather than a random column
const LASER_AIM_PROBABILITY: f64 = 0.7;
/// Attack patterns rotate every this many ticks
pub const PATTERN_CYCLE_TICKS: u64 = 600;
/// Number of battle attack patterns in the cycle
pub const PATTERN_COUNT: u64 = 5;

/// Per-mode spawner state, reset wholesale on session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpawnerState {
    /// Rhythm: immutable chart plus a read cursor
    Schedule { chart: Vec<ChartNote>, cursor: usize },
    /// Runner: countdown to the next obstacle, re-armed randomly
    Interval { countdown_ticks: u32 },
    /// Battle: cadence is a pure function of the session tick
    Patterns,
    /// Breaker: everything spawns up front
    Static,
}

impl SpawnerState {
    pub fn new(config: &SessionConfig, rng: &mut Pcg32) -> Self {
        match &config.mode {
            Mode::Rhythm(profile) => SpawnerState::Schedule {
                chart: chart::generate(profile, rng),
                cursor: 0,
            },
            Mode::Runner(profile) => SpawnerState::Interval {
                countdown_ticks: ms_to_ticks(profile.spawn_min_ms),
            },
            Mode::Battle(_) => SpawnerState::Patterns,
            Mode::Breaker(_) => SpawnerState::Static,
        }
    }
}

#[inline]
fn ms_to_ticks(ms: f32) -> u32 {
    (ms as f64 / MS_PER_TICK).round() as u32
}

/// Populate entities that exist from the first frame (breaker bricks)
pub(crate) fn populate_initial(session: &mut Session) {
    let Mode::Breaker(profile) = session.config.mode.clone() else {
        return;
    };
    let field = session.config.playfield;
    let cols = profile.brick_cols;
    let rows = profile.brick_rows;

    let brick_w = (field.width()
        - 2.0 * BRICK_OFFSET_LEFT
        - (cols - 1) as f32 * BRICK_PADDING)
        / cols as f32;
    session.brick_size = Vec2::new(brick_w, BRICK_HEIGHT);

    for c in 0..cols {
        for r in 0..rows {
            let pos = Vec2::new(
                field.min.x + BRICK_OFFSET_LEFT + c as f32 * (brick_w + BRICK_PADDING),
                field.min.y + BRICK_OFFSET_TOP + r as f32 * (BRICK_HEIGHT + BRICK_PADDING),
            );
            let id = session.next_entity_id();
            session.entities.push(Entity::fixed(id, EntityKind::Brick, pos));
        }
    }
}

/// Per-tick spawn pass
pub(crate) fn run(session: &mut Session) {
    match &session.config.mode {
        Mode::Rhythm(_) => run_schedule(session),
        Mode::Runner(_) => run_interval(session),
        Mode::Battle(_) => run_patterns(session),
        Mode::Breaker(_) => {}
    }
}

fn run_schedule(session: &mut Session) {
    let Mode::Rhythm(profile) = session.config.mode.clone() else {
        return;
    };
    let elapsed = session.elapsed_ms as f32;

    loop {
        let next = match &session.spawner {
            SpawnerState::Schedule { chart, cursor } => chart.get(*cursor).copied(),
            _ => None,
        };
        let Some(entry) = next else { break };
        if entry.time_ms - profile.lead_time_ms > elapsed {
            break;
        }

        match entry.kind {
            NoteKind::End => {
                // The sentinel only ends the session once every previously
                // spawned note has resolved; a trailing note defers it.
                if session.entities.is_empty() {
                    outcome::finish_schedule(session);
                }
                break;
            }
            kind => {
                let entity_kind = match kind {
                    NoteKind::Don => EntityKind::NoteDon,
                    NoteKind::Ka => EntityKind::NoteKa,
                    NoteKind::End => unreachable!(),
                };
                let lane_y = session.config.playfield_center().y;
                let x = kinematics::note_x(profile.note_speed, entry.time_ms, elapsed);
                let id = session.next_entity_id();
                session.entities.push(Entity::scheduled(
                    id,
                    entity_kind,
                    Vec2::new(x, lane_y),
                    entry.time_ms,
                ));
                if let SpawnerState::Schedule { cursor, .. } = &mut session.spawner {
                    *cursor += 1;
                }
            }
        }
    }
}

fn run_interval(session: &mut Session) {
    let Mode::Runner(profile) = session.config.mode.clone() else {
        return;
    };
    let SpawnerState::Interval { countdown_ticks } = &mut session.spawner else {
        return;
    };

    if *countdown_ticks > 0 {
        *countdown_ticks -= 1;
        return;
    }

    let interval_ms = session
        .rng
        .random_range(profile.spawn_min_ms..=profile.spawn_max_ms);
    if let SpawnerState::Interval { countdown_ticks } = &mut session.spawner {
        *countdown_ticks = ms_to_ticks(interval_ms);
    }

    let field = session.config.playfield;
    let kind = if session.rng.random_bool(0.5) {
        EntityKind::ObstacleSpike
    } else {
        EntityKind::ObstacleBlock
    };
    let pos = Vec2::new(
        field.max.x + 100.0,
        field.max.y - GROUND_HEIGHT - OBSTACLE_SIZE,
    );
    let vel = Vec2::new(-session.game_speed, 0.0);
    let id = session.next_entity_id();
    session.entities.push(Entity::moving(id, kind, pos, vel));
}

fn run_patterns(session: &mut Session) {
    let Mode::Battle(profile) = session.config.mode.clone() else {
        return;
    };
    let tick = session.tick_count;
    let pattern = (tick / PATTERN_CYCLE_TICKS) % PATTERN_COUNT;
    let phase_tick = tick % PATTERN_CYCLE_TICKS;
    let mult = profile.spawn_rate_mult;

    let cadence = |base: f32| ((base * mult) as u64).max(1);
    let fires = |every: u64| tick % every == 0;

    match pattern {
        0 => {
            // Warm-up: cadence tightens over the phase, floored at 15 ticks
            let base = (30 - (phase_tick / 40) as i64).max(15) as f32;
            if fires(cadence(base)) {
                spawn_bone(session, profile.bullet_speed_mult);
            }
        }
        1 => {
            if fires(cadence(20.0)) {
                spawn_bone(session, profile.bullet_speed_mult);
            }
        }
        2 => {
            if profile.has_homing && fires(cadence(60.0)) {
                spawn_homing(session, profile.bullet_speed_mult);
            }
            if fires(cadence(35.0)) {
                spawn_bone(session, profile.bullet_speed_mult);
            }
        }
        3 => {
            if profile.has_homing && fires(cadence(40.0)) {
                spawn_homing(session, profile.bullet_speed_mult);
            }
            if fires(cadence(15.0)) {
                spawn_bone(session, profile.bullet_speed_mult);
            }
        }
        _ => {
            if fires(profile.laser_delay_ticks as u64) {
                spawn_laser(session, ms_to_ticks(profile.laser_warning_ms));
            }
        }
    }
}

fn spawn_bone(session: &mut Session, speed_mult: f32) {
    let field = session.config.playfield;
    let speed = kinematics::BONE_SPEED * speed_mult;

    let (kind, pos, vel) = if session.rng.random_bool(0.5) {
        if session.rng.random_bool(0.5) {
            // Floor crawler entering from a side wall
            let from_right = session.rng.random_bool(0.5);
            let x = if from_right {
                field.max.x + 20.0
            } else {
                field.min.x - 20.0
            };
            let vx = if from_right { -speed } else { speed };
            (
                EntityKind::BoneVertical,
                Vec2::new(x, field.max.y - 14.0),
                Vec2::new(vx, 0.0),
            )
        } else {
            // Rising from below
            let x = session
                .rng
                .random_range(field.min.x + 10.0..field.max.x - 10.0);
            (
                EntityKind::BoneVertical,
                Vec2::new(x, field.max.y + 20.0),
                Vec2::new(0.0, -speed),
            )
        }
    } else {
        // Sweeping in from the right
        let y = session
            .rng
            .random_range(field.min.y + 10.0..field.max.y - 10.0);
        (
            EntityKind::BoneHorizontal,
            Vec2::new(field.max.x + 20.0, y),
            Vec2::new(-speed, 0.0),
        )
    };

    let id = session.next_entity_id();
    session.entities.push(Entity::moving(id, kind, pos, vel));
}

fn spawn_homing(session: &mut Session, speed_mult: f32) {
    let field = session.config.playfield;
    let x = session.rng.random_range(field.min.x..field.max.x);
    let id = session.next_entity_id();
    session.entities.push(Entity::moving(
        id,
        EntityKind::HomingStar {
            max_speed: kinematics::HOMING_BASE_SPEED * speed_mult,
        },
        Vec2::new(x, field.min.y - 10.0),
        Vec2::new(0.0, 1.0),
    ));
}

fn spawn_laser(session: &mut Session, warmup_ticks: u32) {
    let field = session.config.playfield;
    let vertical = session.rng.random_bool(0.5);

    let player_axis = match &session.avatar {
        Avatar::Soul { pos, .. } => {
            if vertical {
                pos.x
            } else {
                pos.y
            }
        }
        _ => return,
    };
    let target = if session.rng.random_bool(LASER_AIM_PROBABILITY) {
        player_axis
    } else if vertical {
        session.rng.random_range(field.min.x..field.max.x)
    } else {
        session.rng.random_range(field.min.y..field.max.y)
    };

    let center = session.config.playfield_center();
    let pos = if vertical {
        Vec2::new(target, center.y)
    } else {
        Vec2::new(center.x, target)
    };
    let id = session.next_entity_id();
    session.entities.push(Entity::moving(
        id,
        EntityKind::Laser {
            vertical,
            warmup_ticks,
            life_ticks: LASER_LIFE_TICKS,
        },
        pos,
        Vec2::ZERO,
    ));
}
