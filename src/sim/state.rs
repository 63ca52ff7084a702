//! Session state and the public control surface
//!
//! One [`Session`] owns everything a run needs: configuration, seeded
//! RNG, the entity collection, the avatar, the spawner, accumulators and
//! the outcome-event queue. There are no module-level singletons;
//! constructing a second session gives a fully independent run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Mode, SessionConfig};
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, MS_PER_TICK};

use super::avatar::Avatar;
use super::entity::{Entity, EntityId, EntityKind, RenderEntity};
use super::spawn::SpawnerState;
use super::{hittest, tick};

/// Session lifecycle. `Cleared` and `Failed` are terminal; only
/// [`Session::restart`] leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Cleared,
    Failed,
}

/// Discrete input categories delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputCategory {
    /// Rhythm: center-drum hit
    Don,
    /// Rhythm: rim hit
    Ka,
    /// Runner: jump
    Jump,
}

/// A discrete input event, stamped with the host's monotonic clock
/// (same basis as [`Session::advance`]'s `now_ms`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub category: InputCategory,
    pub timestamp_ms: f64,
}

/// Classified outcome of judging one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Judgment {
    /// Best tier: inside the inner timing window
    Perfect,
    /// Second tier: inside the outer timing window
    Good,
    /// Window expired unanswered, or the player absorbed a hit
    Miss,
    /// Spatial contact on a scoring target (brick)
    Contact,
}

/// Events queued during a frame for the render/audio subscribers; drained
/// with [`Session::drain_events`] after the physics pass completes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutcomeEvent {
    Judged {
        entity: EntityId,
        kind: EntityKind,
        judgment: Judgment,
    },
    LifeLost {
        remaining: u32,
    },
    Terminal {
        phase: Phase,
    },
}

/// Verdict tallies for the results screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
}

/// Snapshot of session bookkeeping for HUD rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub phase: Phase,
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub gauge: i32,
    pub counts: VerdictCounts,
}

/// One game run: construct with [`Session::new`], drive with
/// [`Session::advance`] once per display frame.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) config: SessionConfig,
    seed: u64,
    pub(crate) rng: Pcg32,

    pub(crate) phase: Phase,
    pub(crate) tick_count: u64,
    /// Simulated elapsed time, `tick_count * MS_PER_TICK`
    pub(crate) elapsed_ms: f64,
    /// Host timestamp of the first `advance` after start
    started_at_ms: Option<f64>,
    last_now_ms: f64,
    accumulator_ms: f64,

    pub(crate) score: u64,
    pub(crate) combo: u32,
    pub(crate) max_combo: u32,
    pub(crate) lives: u32,
    pub(crate) gauge: i32,
    pub(crate) counts: VerdictCounts,

    pub(crate) avatar: Avatar,
    pub(crate) control: Vec2,
    pub(crate) entities: Vec<Entity>,
    next_id: u32,
    pub(crate) spawner: SpawnerState,
    /// Runner scroll speed; grows with score
    pub(crate) game_speed: f32,
    /// Breaker brick extent, computed from the grid layout at start
    pub(crate) brick_size: Vec2,

    pub(crate) events: Vec<OutcomeEvent>,
}

impl Session {
    /// Validate the configuration and build an idle session. Two sessions
    /// constructed from the same `(config, seed)` replay identically
    /// under identical inputs.
    pub fn new(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let avatar = Avatar::new(&config, &mut rng);
        let spawner = SpawnerState::new(&config, &mut rng);
        let game_speed = match &config.mode {
            Mode::Runner(p) => p.start_speed,
            _ => 0.0,
        };
        let lives = config.lives;
        Ok(Self {
            config,
            seed,
            rng,
            phase: Phase::Idle,
            tick_count: 0,
            elapsed_ms: 0.0,
            started_at_ms: None,
            last_now_ms: 0.0,
            accumulator_ms: 0.0,
            score: 0,
            combo: 0,
            max_combo: 0,
            lives,
            gauge: 0,
            counts: VerdictCounts::default(),
            avatar,
            control: Vec2::ZERO,
            entities: Vec::new(),
            next_id: 1,
            spawner,
            game_speed,
            brick_size: Vec2::ZERO,
            events: Vec::new(),
        })
    }

    fn reset_state(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.tick_count = 0;
        self.elapsed_ms = 0.0;
        self.started_at_ms = None;
        self.last_now_ms = 0.0;
        self.accumulator_ms = 0.0;
        self.score = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.lives = self.config.lives;
        self.gauge = 0;
        self.counts = VerdictCounts::default();
        self.control = Vec2::ZERO;
        self.entities.clear();
        self.next_id = 1;
        self.events.clear();
        self.avatar = Avatar::new(&self.config, &mut self.rng);
        self.spawner = SpawnerState::new(&self.config, &mut self.rng);
        self.game_speed = match &self.config.mode {
            Mode::Runner(p) => p.start_speed,
            _ => 0.0,
        };
        self.brick_size = Vec2::ZERO;
        super::spawn::populate_initial(self);
    }

    /// Begin the run. Only valid from `Idle`; a running or finished
    /// session is restarted with [`Session::restart`].
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.reset_state();
        self.phase = Phase::Running;
        log::info!("session started: {}", mode_name(&self.config.mode));
    }

    /// Stop and return to `Idle`, discarding all transient state
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.entities.clear();
        self.events.clear();
    }

    /// Reset everything and run again, from any phase
    pub fn restart(&mut self) {
        self.reset_state();
        self.phase = Phase::Running;
        log::info!("session restarted: {}", mode_name(&self.config.mode));
    }

    /// Advance the loop to the host's current monotonic time. The first
    /// call after start anchors the clock; later calls convert wall-clock
    /// progress into fixed ticks. A call while not `Running` is a no-op,
    /// which makes a stale animation-frame callback harmless.
    pub fn advance(&mut self, now_ms: f64) {
        if self.phase != Phase::Running {
            return;
        }
        if self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
            self.last_now_ms = now_ms;
            return;
        }

        let frame_ms = (now_ms - self.last_now_ms).clamp(0.0, MAX_FRAME_MS);
        self.last_now_ms = now_ms;
        self.accumulator_ms += frame_ms;

        let mut substeps = 0;
        while self.accumulator_ms >= MS_PER_TICK && substeps < MAX_SUBSTEPS {
            tick::tick(self);
            self.accumulator_ms -= MS_PER_TICK;
            substeps += 1;
            if self.phase != Phase::Running {
                // Terminal transition cancels the rest of the frame
                self.accumulator_ms = 0.0;
                return;
            }
        }
        // Shed any debt the substep cap could not absorb
        if self.accumulator_ms >= MS_PER_TICK {
            self.accumulator_ms = MS_PER_TICK;
        }
    }

    /// Deliver a discrete input event. Temporal judging happens here,
    /// synchronously, against the same entity collection the periodic
    /// tick mutates; an event that matches nothing is discarded.
    pub fn on_input(&mut self, event: InputEvent) {
        if self.phase != Phase::Running {
            return;
        }
        match event.category {
            InputCategory::Jump => self.avatar.jump(),
            InputCategory::Don | InputCategory::Ka => {
                let Some(start) = self.started_at_ms else {
                    return;
                };
                let input_elapsed = (event.timestamp_ms - start) as f32;
                hittest::judge_input(self, event.category, input_elapsed);
            }
        }
    }

    /// Continuous control: components are clamped to `[-1, 1]`. The
    /// battle soul reads it as a movement direction, the breaker paddle
    /// as an absolute position across its span; other modes ignore it.
    pub fn set_control_axis(&mut self, axis: Vec2) {
        self.control = Vec2::new(axis.x.clamp(-1.0, 1.0), axis.y.clamp(-1.0, 1.0));
    }

    /// Entities still in play, projected for the render sink
    pub fn renderable_entities(&self) -> Vec<RenderEntity> {
        self.entities
            .iter()
            .filter(|e| !e.resolved)
            .map(RenderEntity::from)
            .collect()
    }

    /// HUD snapshot
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            combo: self.combo,
            max_combo: self.max_combo,
            gauge: self.gauge,
            counts: self.counts,
        }
    }

    /// Take the outcome events queued since the last drain. Intended for
    /// the audio/UI subscribers, after the frame's physics pass.
    pub fn drain_events(&mut self) -> Vec<OutcomeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }
}

fn mode_name(mode: &Mode) -> &'static str {
    match mode {
        Mode::Rhythm(_) => "rhythm",
        Mode::Battle(_) => "battle",
        Mode::Runner(_) => "runner",
        Mode::Breaker(_) => "breaker",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BattleProfile, RhythmProfile};

    fn frame_times(frames: usize) -> impl Iterator<Item = f64> {
        (0..frames).map(|i| i as f64 * (1000.0 / 60.0))
    }

    #[test]
    fn test_stale_tick_is_noop_before_start() {
        let mut session =
            Session::new(SessionConfig::rhythm(RhythmProfile::normal()), 1).unwrap();
        session.advance(1000.0);
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.tick_count, 0);
        session.on_input(InputEvent {
            category: InputCategory::Don,
            timestamp_ms: 1000.0,
        });
        assert!(session.events.is_empty());
    }

    #[test]
    fn test_advance_consumes_fixed_ticks() {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::normal()), 1).unwrap();
        session.start();
        for now in frame_times(61) {
            session.advance(now);
        }
        // 60 frames of 16.67ms after the anchor ~ 1 second
        assert!((59..=60).contains(&session.tick_count));
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::normal()), 1).unwrap();
        session.start();
        session.advance(0.0);
        // A 10-second stall must not replay 10 seconds of simulation
        session.advance(10_000.0);
        assert!(session.tick_count <= u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_sessions_with_same_seed_replay_identically() {
        let make = || {
            let mut s =
                Session::new(SessionConfig::rhythm(RhythmProfile::hard()), 1234).unwrap();
            s.start();
            for now in frame_times(600) {
                s.advance(now);
                if now > 2500.0 && now < 2600.0 {
                    s.on_input(InputEvent {
                        category: InputCategory::Don,
                        timestamp_ms: now,
                    });
                }
            }
            s.summary()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_restart_fully_resets_state() {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::normal()), 9).unwrap();
        session.start();
        for now in frame_times(300) {
            session.advance(now);
        }
        session.score = 123;
        session.combo = 4;
        let had_entities = !session.entities.is_empty();

        session.restart();
        assert_eq!(session.phase, Phase::Running);
        assert_eq!(session.score, 0);
        assert_eq!(session.combo, 0);
        assert_eq!(session.tick_count, 0);
        assert_eq!(session.lives, session.config.lives);
        assert!(session.entities.is_empty());
        assert!(had_entities, "battle session should have spawned bullets");
    }

    #[test]
    fn test_stop_returns_to_idle_and_guards_ticks() {
        let mut session =
            Session::new(SessionConfig::battle(BattleProfile::normal()), 9).unwrap();
        session.start();
        for now in frame_times(120) {
            session.advance(now);
        }
        session.stop();
        let ticks = session.tick_count;
        // A late animation-frame callback after stop changes nothing
        session.advance(99_999.0);
        assert_eq!(session.tick_count, ticks);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_summary_serializes() {
        let session =
            Session::new(SessionConfig::rhythm(RhythmProfile::easy()), 2).unwrap();
        let summary = session.summary();
        let json = serde_json::to_string(&summary).unwrap();
        let back: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, back);
    }
}
