//! Hit billboard: drifts along its heading and despawns after a lifetime

use super::{ObjectPhysics, PhysicsContext, PhysicsError};
use crate::foundation::logging::trace;
use crate::world::ObjectHandle;

/// Lifetime-limited linear mover
#[derive(Debug, Clone, PartialEq)]
pub struct BillboardPhysics {
    current_lifetime: f32,
    max_lifetime: f32,
    removal_requested: bool,
}

impl BillboardPhysics {
    /// Billboard that lives for `max_lifetime` seconds
    pub fn new(max_lifetime: f32) -> Self {
        Self {
            current_lifetime: 0.0,
            max_lifetime,
            removal_requested: false,
        }
    }

    /// Seconds lived so far
    pub fn current_lifetime(&self) -> f32 {
        self.current_lifetime
    }

    /// Whether the holder has already been asked to leave the world
    pub fn removal_requested(&self) -> bool {
        self.removal_requested
    }
}

impl ObjectPhysics for BillboardPhysics {
    fn init_object_physics(&mut self, ctx: &mut PhysicsContext<'_>, holder: ObjectHandle) -> Result<(), PhysicsError> {
        ctx.world.holder_mut(holder)?.update_bounding_box();
        Ok(())
    }

    fn update_physics(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        if self.removal_requested {
            return Ok(());
        }

        self.current_lifetime += delta_time;
        if self.current_lifetime > self.max_lifetime {
            self.removal_requested = true;
            trace!("Billboard {holder:?} expired after {:.2}s", self.current_lifetime);
            ctx.world.rm_dynamic_game_object(holder);
            return Ok(());
        }

        let billboard = ctx.world.holder_mut(holder)?;
        let position = billboard.position() + billboard.direction * billboard.velocity * delta_time;
        billboard.set_position(position);
        Ok(())
    }
}
