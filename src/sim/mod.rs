//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities kept in spawn order)
//! - No rendering or platform dependencies

pub mod avatar;
pub mod chart;
pub mod entity;
pub mod hittest;
pub mod kinematics;
pub mod outcome;
pub mod spawn;
pub mod state;
pub mod tick;

pub use avatar::Avatar;
pub use chart::{ChartNote, NoteKind};
pub use entity::{Entity, EntityId, EntityKind, RenderEntity};
pub use state::{
    InputCategory, InputEvent, Judgment, OutcomeEvent, Phase, Session, SessionSummary,
    VerdictCounts,
};
