//! Session configuration and difficulty profiles
//!
//! Everything the host decides up front lives here: which game mode to
//! run, the difficulty numbers for that mode, the playfield, lives and
//! gauge thresholds. A [`SessionConfig`] is validated once at session
//! construction; nothing inside the frame loop is fallible.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Which of the four games a session runs, with its difficulty profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    /// Two-category timing game judged against a precomputed schedule
    Rhythm(RhythmProfile),
    /// Bullet-hell box with lives and invincibility frames
    Battle(BattleProfile),
    /// Endless side-scroller with a gravity-bound avatar
    Runner(RunnerProfile),
    /// Paddle-and-ball brick field
    Breaker(BreakerProfile),
}

/// Rhythm schedule generation and judging parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmProfile {
    /// Beats per minute of the generated schedule
    pub bpm: f32,
    /// Probability a beat carries a single note
    pub prob_quarter: f32,
    /// Probability a beat splits into two eighth notes
    pub prob_eighth: f32,
    /// Probability a beat splits into four sixteenth notes
    pub prob_sixteenth: f32,
    /// Schedule length in beats
    pub length_beats: u32,
    /// Note travel speed in px/s (used for the closed-form placement)
    pub note_speed: f32,
    /// Interval between a note entering play and reaching the hit zone
    pub lead_time_ms: f32,
    /// Inner (best-tier) judging tolerance
    pub perfect_window_ms: f32,
    /// Outer judging tolerance; past this an unhit note is a miss
    pub good_window_ms: f32,
}

impl RhythmProfile {
    pub fn easy() -> Self {
        Self {
            bpm: 100.0,
            prob_quarter: 0.9,
            prob_eighth: 0.0,
            prob_sixteenth: 0.0,
            length_beats: 80,
            ..Self::normal()
        }
    }

    pub fn normal() -> Self {
        Self {
            bpm: 130.0,
            prob_quarter: 0.6,
            prob_eighth: 0.3,
            prob_sixteenth: 0.0,
            length_beats: 120,
            note_speed: 500.0,
            lead_time_ms: 1500.0,
            perfect_window_ms: 100.0,
            good_window_ms: 200.0,
        }
    }

    pub fn hard() -> Self {
        Self {
            bpm: 150.0,
            prob_quarter: 0.4,
            prob_eighth: 0.5,
            prob_sixteenth: 0.05,
            length_beats: 180,
            ..Self::normal()
        }
    }

    pub fn oni() -> Self {
        Self {
            bpm: 180.0,
            prob_quarter: 0.1,
            prob_eighth: 0.5,
            prob_sixteenth: 0.4,
            length_beats: 250,
            ..Self::normal()
        }
    }

    /// Milliseconds per beat at this tempo
    #[inline]
    pub fn beat_interval_ms(&self) -> f32 {
        60_000.0 / self.bpm
    }
}

/// Bullet-hell difficulty multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleProfile {
    /// Scales every bullet's speed
    pub bullet_speed_mult: f32,
    /// Scales spawn cadence (larger = sparser)
    pub spawn_rate_mult: f32,
    /// Ticks between laser volleys in the laser pattern
    pub laser_delay_ticks: u32,
    /// Warning duration before a laser arms
    pub laser_warning_ms: f32,
    /// Whether homing bullets spawn at all
    pub has_homing: bool,
}

impl BattleProfile {
    pub fn easy() -> Self {
        Self {
            bullet_speed_mult: 0.6,
            spawn_rate_mult: 1.5,
            laser_delay_ticks: 120,
            laser_warning_ms: 1000.0,
            has_homing: false,
        }
    }

    pub fn normal() -> Self {
        Self {
            bullet_speed_mult: 1.0,
            spawn_rate_mult: 1.0,
            laser_delay_ticks: 90,
            laser_warning_ms: 1000.0,
            has_homing: true,
        }
    }

    pub fn hard() -> Self {
        Self {
            bullet_speed_mult: 1.5,
            spawn_rate_mult: 0.6,
            laser_delay_ticks: 60,
            laser_warning_ms: 500.0,
            has_homing: true,
        }
    }
}

/// Endless-runner pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
    /// Initial scroll speed in px/tick
    pub start_speed: f32,
    /// Speed added every `speed_step_every` points
    pub speed_step: f32,
    pub speed_step_every: u64,
    /// Spawn countdown is re-armed from this interval (ms)
    pub spawn_min_ms: f32,
    pub spawn_max_ms: f32,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            start_speed: 6.0,
            speed_step: 0.5,
            speed_step_every: 5,
            spawn_min_ms: 1000.0,
            spawn_max_ms: 2500.0,
        }
    }
}

/// Brick-field layout and ball speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerProfile {
    pub brick_rows: u32,
    pub brick_cols: u32,
    /// Ball speed in px/tick after a paddle bounce
    pub ball_speed: f32,
}

impl Default for BreakerProfile {
    fn default() -> Self {
        Self {
            brick_rows: 5,
            brick_cols: 8,
            ball_speed: 6.0,
        }
    }
}

/// Complete, validated session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: Mode,
    /// Playfield bounds in logical pixels
    pub playfield: Rect,
    /// Starting lives; 0 in modes that do not model lives
    pub lives: u32,
    /// Upper gauge bound (gauge is always clamped to `[0, max_gauge]`)
    pub max_gauge: i32,
    /// Gauge level required for a Cleared outcome
    pub clear_threshold: i32,
    /// Added to every input timestamp before temporal judging. Kept as a
    /// tunable; the shipped default is zero.
    pub latency_offset_ms: f32,
}

impl SessionConfig {
    pub fn rhythm(profile: RhythmProfile) -> Self {
        Self {
            mode: Mode::Rhythm(profile),
            playfield: Rect::from_size(800.0, 200.0),
            lives: 0,
            max_gauge: 100,
            clear_threshold: 80,
            latency_offset_ms: 0.0,
        }
    }

    pub fn battle(profile: BattleProfile) -> Self {
        Self {
            mode: Mode::Battle(profile),
            playfield: Rect::from_size(250.0, 250.0),
            lives: 3,
            max_gauge: 0,
            clear_threshold: 0,
            latency_offset_ms: 0.0,
        }
    }

    pub fn runner(profile: RunnerProfile) -> Self {
        Self {
            mode: Mode::Runner(profile),
            playfield: Rect::from_size(800.0, 450.0),
            lives: 0,
            max_gauge: 0,
            clear_threshold: 0,
            latency_offset_ms: 0.0,
        }
    }

    pub fn breaker(profile: BreakerProfile) -> Self {
        Self {
            mode: Mode::Breaker(profile),
            playfield: Rect::from_size(480.0, 320.0),
            lives: 3,
            max_gauge: 0,
            clear_threshold: 0,
            latency_offset_ms: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playfield.width() <= 0.0 || self.playfield.height() <= 0.0 {
            return Err(ConfigError::NonPositive("playfield"));
        }
        if self.clear_threshold > self.max_gauge {
            return Err(ConfigError::GaugeThreshold);
        }
        match &self.mode {
            Mode::Rhythm(p) => {
                if p.bpm <= 0.0 {
                    return Err(ConfigError::NonPositive("bpm"));
                }
                if p.note_speed <= 0.0 {
                    return Err(ConfigError::NonPositive("note_speed"));
                }
                if p.lead_time_ms <= 0.0 {
                    return Err(ConfigError::NonPositive("lead_time_ms"));
                }
                if p.length_beats == 0 {
                    return Err(ConfigError::NonPositive("length_beats"));
                }
                let probs = [p.prob_quarter, p.prob_eighth, p.prob_sixteenth];
                if probs.iter().any(|p| !(0.0..=1.0).contains(p))
                    || probs.iter().sum::<f32>() > 1.0
                {
                    return Err(ConfigError::Probability("note density"));
                }
                if p.perfect_window_ms <= 0.0 || p.perfect_window_ms >= p.good_window_ms {
                    return Err(ConfigError::Window);
                }
            }
            Mode::Battle(p) => {
                if p.bullet_speed_mult <= 0.0 || p.spawn_rate_mult <= 0.0 {
                    return Err(ConfigError::NonPositive("battle multiplier"));
                }
                if p.laser_delay_ticks == 0 {
                    return Err(ConfigError::NonPositive("laser_delay_ticks"));
                }
                if self.lives == 0 {
                    return Err(ConfigError::Lives);
                }
            }
            Mode::Runner(p) => {
                if p.start_speed <= 0.0 {
                    return Err(ConfigError::NonPositive("start_speed"));
                }
                if p.spawn_min_ms <= 0.0 || p.spawn_min_ms > p.spawn_max_ms {
                    return Err(ConfigError::SpawnInterval);
                }
            }
            Mode::Breaker(p) => {
                if p.brick_rows == 0 || p.brick_cols == 0 {
                    return Err(ConfigError::NonPositive("brick grid"));
                }
                if p.ball_speed <= 0.0 {
                    return Err(ConfigError::NonPositive("ball_speed"));
                }
                if self.lives == 0 {
                    return Err(ConfigError::Lives);
                }
            }
        }
        Ok(())
    }

    /// Center of the playfield
    pub fn playfield_center(&self) -> Vec2 {
        (self.playfield.min + self.playfield.max) * 0.5
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative
    NonPositive(&'static str),
    /// A probability was outside [0, 1] or a band sum exceeded 1
    Probability(&'static str),
    /// The perfect window must sit strictly inside the good window
    Window,
    /// Spawn interval bounds must satisfy 0 < min <= max
    SpawnInterval,
    /// Clear threshold cannot exceed the gauge maximum
    GaugeThreshold,
    /// This mode models lives and needs at least one
    Lives,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositive(what) => write!(f, "{what} must be positive"),
            ConfigError::Probability(what) => write!(f, "invalid probability for {what}"),
            ConfigError::Window => write!(f, "perfect window must be inside the good window"),
            ConfigError::SpawnInterval => write!(f, "spawn interval must satisfy 0 < min <= max"),
            ConfigError::GaugeThreshold => write!(f, "clear threshold exceeds gauge maximum"),
            ConfigError::Lives => write!(f, "this mode requires at least one life"),
        }
    }
}

impl std::error::Error for ConfigError {}
