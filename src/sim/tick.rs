//! Fixed timestep pipeline
//!
//! One tick runs the full per-frame data flow: clock advance, spawner,
//! integrator, hit-tester, aggregator, pruner. A terminal transition
//! anywhere in the chain short-circuits the remaining passes; the pruner
//! always runs so resolved entities never survive into another frame.

use crate::consts::MS_PER_TICK;

use super::state::{Phase, Session};
use super::{hittest, kinematics, outcome, spawn};

pub(crate) fn tick(session: &mut Session) {
    session.tick_count += 1;
    session.elapsed_ms = session.tick_count as f64 * MS_PER_TICK;

    spawn::run(session);
    if session.phase == Phase::Running {
        kinematics::run(session);
    }
    if session.phase == Phase::Running {
        hittest::spatial_pass(session);
    }
    if session.phase == Phase::Running {
        hittest::autonomous_miss_pass(session);
        outcome::check_completion(session);
    }
    prune(session);
}

/// Drop every resolved entity. Removal order is irrelevant: entities
/// carry no references to each other.
pub(crate) fn prune(session: &mut Session) {
    session.entities.retain(|e| !e.resolved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BattleProfile, BreakerProfile, RhythmProfile, RunnerProfile, SessionConfig,
    };
    use crate::sim::chart::{ChartNote, NoteKind};
    use crate::sim::entity::{Entity, EntityKind};
    use crate::sim::spawn::SpawnerState;
    use crate::sim::state::{InputCategory, InputEvent, Judgment, OutcomeEvent};
    use crate::sim::Avatar;
    use glam::Vec2;

    /// Anchor the session clock at zero and run `n` fixed ticks
    fn drive(session: &mut Session, n: u64) {
        if session.tick_count == 0 {
            session.advance(0.0);
        }
        for _ in 0..n {
            if session.phase != Phase::Running {
                break;
            }
            tick(session);
        }
    }

    fn rhythm_with_single_note() -> Session {
        let mut session =
            Session::new(SessionConfig::rhythm(RhythmProfile::normal()), 77).unwrap();
        session.start();
        session.spawner = SpawnerState::Schedule {
            chart: vec![
                ChartNote {
                    time_ms: 2000.0,
                    kind: NoteKind::Don,
                },
                ChartNote {
                    time_ms: 4000.0,
                    kind: NoteKind::End,
                },
            ],
            cursor: 0,
        };
        session
    }

    #[test]
    fn test_on_time_input_scores_perfect() {
        let mut session = rhythm_with_single_note();
        // 120 ticks = 2000ms: the note is live and at the hit zone
        drive(&mut session, 120);
        assert_eq!(session.entities.len(), 1);

        session.on_input(InputEvent {
            category: InputCategory::Don,
            timestamp_ms: 2005.0,
        });
        assert_eq!(session.score, 1000);
        assert_eq!(session.combo, 1);
        assert!(session.renderable_entities().is_empty());

        // The judged note never reappears and is never judged again
        drive(&mut session, 10);
        assert_eq!(session.counts.miss, 0);
        assert!(session.renderable_entities().is_empty());
    }

    #[test]
    fn test_late_input_discarded_then_autonomous_miss() {
        let mut session = rhythm_with_single_note();
        drive(&mut session, 120);

        // 350ms late: outside the outer tolerance, no verdict at all
        session.on_input(InputEvent {
            category: InputCategory::Don,
            timestamp_ms: 2350.0,
        });
        assert_eq!(session.score, 0);
        assert_eq!(session.counts.miss, 0);

        // Once sim time passes target + 200ms the miss fires exactly once
        drive(&mut session, 14);
        assert_eq!(session.counts.miss, 1);
        assert_eq!(session.combo, 0);
        assert!(session.entities.is_empty());
    }

    #[test]
    fn test_schedule_end_fails_below_threshold() {
        let mut session = rhythm_with_single_note();
        // Never hit the note; miss, then reach the sentinel
        drive(&mut session, 300);
        assert_eq!(session.phase, Phase::Failed);
        assert_eq!(session.counts.miss, 1);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, OutcomeEvent::Terminal { phase: Phase::Failed })));
    }

    #[test]
    fn test_breaker_overlap_scores_and_resolves() {
        let mut session =
            Session::new(SessionConfig::breaker(BreakerProfile::default()), 77).unwrap();
        session.start();
        // Replace the grid with the one brick under test
        session.entities.clear();
        let id = session.next_entity_id();
        session
            .entities
            .push(Entity::fixed(id, EntityKind::Brick, Vec2::new(90.0, 180.0)));
        session.brick_size = Vec2::new(60.0, 20.0);
        if let Avatar::Paddle {
            ball_pos, ball_vel, ..
        } = &mut session.avatar
        {
            *ball_pos = Vec2::new(100.0, 190.0);
            *ball_vel = Vec2::new(0.0, -4.0);
        }

        hittest::spatial_pass(&mut session);
        assert_eq!(session.score, 100);
        assert!(session.entities[0].resolved);
        if let Avatar::Paddle { ball_vel, .. } = &session.avatar {
            assert_eq!(ball_vel.y, 4.0);
        }

        // Pruner drops it; a second prune removes nothing further
        prune(&mut session);
        assert!(session.entities.is_empty());
        prune(&mut session);
        assert!(session.entities.is_empty());
    }

    #[test]
    fn test_breaker_clears_when_field_empties() {
        let mut session =
            Session::new(SessionConfig::breaker(BreakerProfile::default()), 77).unwrap();
        session.start();
        for entity in session.entities.iter_mut() {
            entity.resolved = true;
        }
        drive(&mut session, 1);
        assert_eq!(session.phase, Phase::Cleared);
    }

    #[test]
    fn test_breaker_ball_lost_consumes_life_and_reserves() {
        let mut session =
            Session::new(SessionConfig::breaker(BreakerProfile::default()), 77).unwrap();
        session.start();
        if let Avatar::Paddle {
            x,
            ball_pos,
            ball_vel,
        } = &mut session.avatar
        {
            // Ball dropping far from the paddle
            *x = 0.0;
            *ball_pos = Vec2::new(400.0, 315.0);
            *ball_vel = Vec2::new(0.0, 4.0);
        }
        // Keep the paddle pinned left so it cannot save the ball
        session.set_control_axis(Vec2::new(-1.0, 0.0));
        drive(&mut session, 1);
        assert_eq!(session.lives, 2);
        // Ball re-served at the center serve position
        if let Avatar::Paddle { ball_pos, .. } = &session.avatar {
            assert_eq!(*ball_pos, Vec2::new(240.0, 270.0));
        }
    }

    #[test]
    fn test_runner_fatal_collision_fails() {
        let mut session =
            Session::new(SessionConfig::runner(RunnerProfile::default()), 77).unwrap();
        session.start();
        let id = session.next_entity_id();
        // Obstacle already overlapping the cube on the ground
        session.entities.push(Entity::moving(
            id,
            EntityKind::ObstacleSpike,
            Vec2::new(110.0, 450.0 - 100.0 - 40.0),
            Vec2::new(-6.0, 0.0),
        ));
        drive(&mut session, 1);
        assert_eq!(session.phase, Phase::Failed);
    }

    #[test]
    fn test_runner_scores_on_passed_obstacles() {
        let mut session =
            Session::new(SessionConfig::runner(RunnerProfile::default()), 77).unwrap();
        session.start();
        let id = session.next_entity_id();
        // About to cross the left boundary, far from the cube vertically
        session.entities.push(Entity::moving(
            id,
            EntityKind::ObstacleBlock,
            Vec2::new(-35.0, 310.0),
            Vec2::new(-6.0, 0.0),
        ));
        drive(&mut session, 1);
        assert_eq!(session.score, 1);
        assert_eq!(session.phase, Phase::Running);
        // Expiry is not a judged miss: no verdict events were emitted
        assert!(!session
            .drain_events()
            .iter()
            .any(|e| matches!(e, OutcomeEvent::Judged { judgment: Judgment::Miss, .. })));
    }

    #[test]
    fn test_battle_never_clears_and_fails_only_by_contact() {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::easy()), 77).unwrap();
        session.start();
        drive(&mut session, 1200);
        assert_ne!(session.phase, Phase::Cleared);
        assert_eq!(session.lives, 3 - session.counts.miss.min(3));
        if session.phase == Phase::Failed {
            assert_eq!(session.counts.miss, 3);
        }
    }
}
