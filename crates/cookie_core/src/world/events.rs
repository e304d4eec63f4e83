//! Gameplay events
//!
//! The simulation never talks to a renderer directly. Anything a front end
//! would animate, recolor or play a sound for is queued here and drained
//! once per tick.

use super::game_object::{ObjectHandle, ObjectKind};
use crate::foundation::math::Vec3;

/// Something visible happened in the world
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// An object switched to a different material
    MaterialChanged {
        /// Recolored object
        object: ObjectHandle,
        /// New material name
        material: String,
    },
    /// A delivery target should play its reaction animation
    DeliveryAnimationTriggered {
        /// Target that received the cookie
        object: ObjectHandle,
    },
    /// A hit billboard was spawned at a collision point
    HitEffectSpawned {
        /// The billboard object
        effect: ObjectHandle,
        /// Where the cookie struck
        position: Vec3,
    },
    /// Points were awarded for a delivery
    ScoreReported {
        /// Cookie that earned the points
        cookie: ObjectHandle,
        /// Points for this delivery
        points: f32,
        /// Seconds added to the clock
        time_bonus: f32,
    },
    /// A dynamic object left the world
    ObjectDespawned {
        /// Removed handle, now stale
        object: ObjectHandle,
        /// What it was
        kind: ObjectKind,
    },
}
