//! Minicade - four single-screen arcade games on one entity loop
//!
//! Core modules:
//! - `config`: Session configuration and difficulty profiles
//! - `sim`: Deterministic simulation (spawning, kinematics, hit-testing,
//!   outcome bookkeeping)
//!
//! Rendering, audio synthesis and input-device binding live outside the
//! crate: the host drives [`sim::Session::advance`] once per display frame,
//! feeds discrete inputs through [`sim::Session::on_input`], and projects
//! [`sim::Session::renderable_entities`] / [`sim::Session::summary`] onto
//! whatever surface it owns.

pub mod config;
pub mod sim;

pub use config::{Mode, SessionConfig};
pub use sim::{InputCategory, InputEvent, OutcomeEvent, Phase, Session};

use glam::Vec2;

/// Shared loop constants
pub mod consts {
    /// Fixed simulation rate. The source games are 60 Hz animation-frame
    /// loops and all per-tick constants assume that rate.
    pub const TICK_HZ: u32 = 60;
    /// Milliseconds of simulated time per tick
    pub const MS_PER_TICK: f64 = 1000.0 / TICK_HZ as f64;
    /// Maximum ticks consumed per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock gap (ms) a single host frame may contribute
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// Axis-aligned rectangle, used for playfields and hitboxes
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Rectangle grown by `margin` on every side
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::from_size(250.0, 250.0);
        assert!(r.contains(Vec2::new(125.0, 125.0)));
        assert!(r.contains(Vec2::new(0.0, 250.0)));
        assert!(!r.contains(Vec2::new(-1.0, 10.0)));
    }

    #[test]
    fn test_rect_expand() {
        let r = Rect::from_size(250.0, 250.0).expand(30.0);
        assert!(r.contains(Vec2::new(-29.0, 279.0)));
        assert!(!r.contains(Vec2::new(-31.0, 100.0)));
    }
}
