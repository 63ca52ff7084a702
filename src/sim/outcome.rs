//! Outcome aggregation
//!
//! Every verdict lands here and is applied synchronously: score, combo,
//! gauge and lives move in the same call that emitted the verdict, each
//! accumulator clamped to its declared bounds after every mutation.
//! Terminal transitions (Cleared/Failed) also live here; they stop the
//! loop by flipping the phase, which every tick entry point checks.

use super::avatar::Avatar;
use super::entity::{EntityId, EntityKind};
use super::state::{Judgment, OutcomeEvent, Phase, Session};

/// Rhythm scoring
pub const SCORE_BASE_PERFECT: u64 = 1000;
pub const SCORE_BASE_GOOD: u64 = 500;
pub const COMBO_BONUS_PERFECT: u64 = 10;
pub const COMBO_BONUS_GOOD: u64 = 5;

/// Gauge deltas
pub const GAUGE_GAIN_PERFECT: i32 = 2;
pub const GAUGE_GAIN_GOOD: i32 = 1;
pub const GAUGE_LOSS_MISS: i32 = 3;

/// Breaker brick value
pub const SCORE_BRICK: u64 = 100;

/// Ticks of post-hit invincibility in the battle mode
pub const INVINCIBILITY_TICKS: u32 = 60;

fn add_gauge(session: &mut Session, delta: i32) {
    session.gauge = (session.gauge + delta).clamp(0, session.config.max_gauge);
}

fn bump_combo(session: &mut Session) {
    session.combo += 1;
    session.max_combo = session.max_combo.max(session.combo);
}

/// Best- or second-tier note verdict from the input path
pub(crate) fn note_hit(
    session: &mut Session,
    id: EntityId,
    kind: EntityKind,
    judgment: Judgment,
) {
    match judgment {
        Judgment::Perfect => {
            session.score += SCORE_BASE_PERFECT + session.combo as u64 * COMBO_BONUS_PERFECT;
            add_gauge(session, GAUGE_GAIN_PERFECT);
            session.counts.perfect += 1;
        }
        Judgment::Good => {
            session.score += SCORE_BASE_GOOD + session.combo as u64 * COMBO_BONUS_GOOD;
            add_gauge(session, GAUGE_GAIN_GOOD);
            session.counts.good += 1;
        }
        _ => return,
    }
    bump_combo(session);
    session.events.push(OutcomeEvent::Judged { entity: id, kind, judgment });
}

/// Autonomous miss: the note's window expired unanswered
pub(crate) fn note_missed(session: &mut Session, id: EntityId, kind: EntityKind) {
    session.combo = 0;
    add_gauge(session, -GAUGE_LOSS_MISS);
    session.counts.miss += 1;
    session.events.push(OutcomeEvent::Judged {
        entity: id,
        kind,
        judgment: Judgment::Miss,
    });
}

/// Ball-brick contact
pub(crate) fn brick_hit(session: &mut Session, id: EntityId, kind: EntityKind) {
    session.score += SCORE_BRICK;
    bump_combo(session);
    session.events.push(OutcomeEvent::Judged {
        entity: id,
        kind,
        judgment: Judgment::Contact,
    });
}

/// Bullet-soul contact. The miss-classed verdict resets combo, costs a
/// life and arms the invincibility window.
pub(crate) fn player_hit(session: &mut Session, id: EntityId, kind: EntityKind) {
    if let Avatar::Soul { invincible_ticks, .. } = &mut session.avatar {
        *invincible_ticks = INVINCIBILITY_TICKS;
    }
    session.combo = 0;
    session.counts.miss += 1;
    session.lives = session.lives.saturating_sub(1);
    session.events.push(OutcomeEvent::Judged {
        entity: id,
        kind,
        judgment: Judgment::Miss,
    });
    session.events.push(OutcomeEvent::LifeLost {
        remaining: session.lives,
    });
    if session.lives == 0 {
        fail(session);
    }
}

/// Breaker ball fell past the paddle
pub(crate) fn ball_lost(session: &mut Session) {
    session.combo = 0;
    session.lives = session.lives.saturating_sub(1);
    session.events.push(OutcomeEvent::LifeLost {
        remaining: session.lives,
    });
    if session.lives == 0 {
        fail(session);
    } else {
        session
            .avatar
            .reset_serve(&session.config, &mut session.rng);
    }
}

/// Runner cube struck a terminal obstacle
pub(crate) fn fatal_collision(session: &mut Session, id: EntityId, kind: EntityKind) {
    session.events.push(OutcomeEvent::Judged {
        entity: id,
        kind,
        judgment: Judgment::Miss,
    });
    fail(session);
}

/// Obstacles that scrolled off the field score one point each; every few
/// points the scroll speeds up, including obstacles already in flight.
pub(crate) fn obstacles_passed(session: &mut Session, count: u64) {
    let crate::config::Mode::Runner(profile) = session.config.mode.clone() else {
        return;
    };
    let mut speed_changed = false;
    for _ in 0..count {
        session.score += 1;
        if profile.speed_step_every > 0 && session.score % profile.speed_step_every == 0 {
            session.game_speed += profile.speed_step;
            speed_changed = true;
        }
    }
    if speed_changed {
        log::debug!("scroll speed now {}", session.game_speed);
        for entity in session.entities.iter_mut() {
            if entity.kind.is_obstacle() && !entity.resolved {
                if let Some(vel) = entity.vel.as_mut() {
                    vel.x = -session.game_speed;
                }
            }
        }
    }
}

/// Schedule exhausted with every note resolved: clear or fail by gauge
pub(crate) fn finish_schedule(session: &mut Session) {
    if session.gauge >= session.config.clear_threshold {
        clear(session);
    } else {
        fail(session);
    }
}

/// Collection-wide completion checks that cannot be attributed to a
/// single verdict (breaker field emptied)
pub(crate) fn check_completion(session: &mut Session) {
    if session.phase != Phase::Running {
        return;
    }
    if matches!(session.config.mode, crate::config::Mode::Breaker(_)) {
        let bricks_left = session
            .entities
            .iter()
            .any(|e| e.kind.is_brick() && !e.resolved);
        if !bricks_left {
            clear(session);
        }
    }
}

pub(crate) fn fail(session: &mut Session) {
    session.phase = Phase::Failed;
    session.events.push(OutcomeEvent::Terminal {
        phase: Phase::Failed,
    });
    log::info!(
        "session failed: score={} max_combo={}",
        session.score,
        session.max_combo
    );
}

pub(crate) fn clear(session: &mut Session) {
    session.phase = Phase::Cleared;
    session.events.push(OutcomeEvent::Terminal {
        phase: Phase::Cleared,
    });
    log::info!(
        "session cleared: score={} max_combo={}",
        session.score,
        session.max_combo
    );
}
