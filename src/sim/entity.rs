//! Transient entity records
//!
//! Every independently-judged object in play (note, obstacle, brick,
//! bullet) is one plain record in the session's entity list. Rendering is
//! a projection of these records, never the source of truth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::InputCategory;

/// Monotonically allocated entity identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entity discriminator, with per-kind payload where a kind carries
/// private state (homing speed cap, laser arming countdown)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Rhythm note answered with the Don category
    NoteDon,
    /// Rhythm note answered with the Ka category
    NoteKa,
    /// Runner obstacle, triangular (rendered) but judged as a shrunk box
    ObstacleSpike,
    /// Runner obstacle, square
    ObstacleBlock,
    /// Breaker brick; extent comes from the session's grid layout
    Brick,
    /// Battle bone, tall hitbox
    BoneVertical,
    /// Battle bone, wide hitbox
    BoneHorizontal,
    /// Battle bullet steering toward the player, speed clamped to the cap
    HomingStar { max_speed: f32 },
    /// Battle laser: harmless while warming up, lethal while `life_ticks`
    /// remain, then expired
    Laser {
        vertical: bool,
        warmup_ticks: u32,
        life_ticks: u32,
    },
}

impl EntityKind {
    /// The input category that can answer this entity, if any
    pub fn category(&self) -> Option<InputCategory> {
        match self {
            EntityKind::NoteDon => Some(InputCategory::Don),
            EntityKind::NoteKa => Some(InputCategory::Ka),
            _ => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, EntityKind::NoteDon | EntityKind::NoteKa)
    }

    pub fn is_brick(&self) -> bool {
        matches!(self, EntityKind::Brick)
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self, EntityKind::ObstacleSpike | EntityKind::ObstacleBlock)
    }
}

/// A transient object in play
///
/// Created by the spawner, owned exclusively by the session's entity list,
/// removed by the pruner once `resolved`. A resolved entity is never
/// judged again and never reappears in the render projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Per-tick velocity; `None` for entities placed by the closed-form
    /// time formula (rhythm notes)
    pub vel: Option<Vec2>,
    /// Scheduled hit-zone arrival, session-relative milliseconds
    pub target_time_ms: Option<f32>,
    /// Set once on hit, miss or boundary expiry; never cleared
    pub resolved: bool,
}

impl Entity {
    /// A velocity-integrated entity
    pub fn moving(id: EntityId, kind: EntityKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Some(vel),
            target_time_ms: None,
            resolved: false,
        }
    }

    /// A stationary entity judged in place (brick)
    pub fn fixed(id: EntityId, kind: EntityKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Some(Vec2::ZERO),
            target_time_ms: None,
            resolved: false,
        }
    }

    /// A schedule-placed entity whose position is a pure function of time
    pub fn scheduled(id: EntityId, kind: EntityKind, pos: Vec2, target_time_ms: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: None,
            target_time_ms: Some(target_time_ms),
            resolved: false,
        }
    }
}

/// Render projection of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderEntity {
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Radians; nonzero only for kinds that visually spin
    pub rotation: f32,
}

impl From<&Entity> for RenderEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            kind: entity.kind,
            pos: entity.pos,
            rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_categories() {
        assert_eq!(EntityKind::NoteDon.category(), Some(InputCategory::Don));
        assert_eq!(EntityKind::NoteKa.category(), Some(InputCategory::Ka));
        assert_eq!(EntityKind::Brick.category(), None);
    }

    #[test]
    fn test_scheduled_entity_has_no_velocity() {
        let note = Entity::scheduled(EntityId(1), EntityKind::NoteDon, Vec2::ZERO, 2000.0);
        assert!(note.vel.is_none());
        assert_eq!(note.target_time_ms, Some(2000.0));
        assert!(!note.resolved);
    }
}
