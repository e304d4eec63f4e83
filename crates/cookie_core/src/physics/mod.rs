//! Per-object physics components
//!
//! Each dynamic object may carry one component. The world lends the
//! component the whole [`GameWorld`] and [`GameSession`] for the duration of
//! a call through [`PhysicsContext`], and the component reaches its holder by
//! handle.

mod billboard;
mod cookie;
mod player;

pub use billboard::BillboardPhysics;
pub use cookie::{distance_multiplier, CookiePhysics, CookieState};
pub use player::PlayerPhysics;

use crate::world::{GameSession, GameWorld, ObjectHandle};

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// The component's holder was removed from the world
    #[error("game object {0:?} is no longer in the world")]
    MissingHolder(ObjectHandle),
}

/// Mutable access to the game state a component may touch
pub struct PhysicsContext<'a> {
    /// Object registry and collision queries
    pub world: &'a mut GameWorld,
    /// Score and clock
    pub session: &'a mut GameSession,
}

/// Behavior attached to a dynamic object
pub trait ObjectPhysics {
    /// Called once when the holder is added to the world
    fn init_object_physics(&mut self, ctx: &mut PhysicsContext<'_>, holder: ObjectHandle) -> Result<(), PhysicsError>;

    /// Advance the holder by `delta_time` seconds
    fn update_physics(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        delta_time: f32,
    ) -> Result<(), PhysicsError>;
}

/// The closed set of physics behaviors
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsComponent {
    /// Rising hit effect with a lifetime
    Billboard(BillboardPhysics),
    /// Ballistic, bouncing, scoring projectile
    Cookie(CookiePhysics),
    /// Input-driven walker
    Player(PlayerPhysics),
}

impl PhysicsComponent {
    /// Cookie state, if this is a cookie
    pub fn as_cookie(&self) -> Option<&CookiePhysics> {
        match self {
            Self::Cookie(cookie) => Some(cookie),
            _ => None,
        }
    }

    /// Billboard state, if this is a billboard
    pub fn as_billboard(&self) -> Option<&BillboardPhysics> {
        match self {
            Self::Billboard(billboard) => Some(billboard),
            _ => None,
        }
    }
}

impl ObjectPhysics for PhysicsComponent {
    fn init_object_physics(&mut self, ctx: &mut PhysicsContext<'_>, holder: ObjectHandle) -> Result<(), PhysicsError> {
        match self {
            Self::Billboard(b) => b.init_object_physics(ctx, holder),
            Self::Cookie(c) => c.init_object_physics(ctx, holder),
            Self::Player(p) => p.init_object_physics(ctx, holder),
        }
    }

    fn update_physics(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        match self {
            Self::Billboard(b) => b.update_physics(ctx, holder, delta_time),
            Self::Cookie(c) => c.update_physics(ctx, holder, delta_time),
            Self::Player(p) => p.update_physics(ctx, holder, delta_time),
        }
    }
}

impl From<BillboardPhysics> for PhysicsComponent {
    fn from(physics: BillboardPhysics) -> Self {
        Self::Billboard(physics)
    }
}

impl From<CookiePhysics> for PhysicsComponent {
    fn from(physics: CookiePhysics) -> Self {
        Self::Cookie(physics)
    }
}

impl From<PlayerPhysics> for PhysicsComponent {
    fn from(physics: PlayerPhysics) -> Self {
        Self::Player(physics)
    }
}
