//! Player walker

use super::{ObjectPhysics, PhysicsContext, PhysicsError};
use crate::foundation::math::Vec3;
use crate::world::ObjectHandle;

/// Moves the holder forward while its `movement_enabled` flag is set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerPhysics;

impl PlayerPhysics {
    /// Create the component
    pub fn new() -> Self {
        Self
    }
}

impl ObjectPhysics for PlayerPhysics {
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
        let player = ctx.world.holder_mut(holder)?;
        if !player.movement_enabled {
            return Ok(());
        }

        let heading = player.direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
        let position = player.position() + heading * player.velocity * delta_time;
        player.set_position(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::spatial::BoundingBox;
    use crate::world::{GameObject, GameSession, GameWorld, ObjectKind};
    use approx::assert_relative_eq;

    fn setup() -> (GameWorld, GameSession, ObjectHandle) {
        let config = SimulationConfig::default();
        let mut world = GameWorld::new(&config);
        let mut session = GameSession::new(&config.game);
        let player = GameObject::new(ObjectKind::Player, Vec3::zeros(), Vec3::new(0.0, 0.0, 2.0), 4.0)
            .with_shape_bounds(BoundingBox::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 1.0, 0.5)))
            .with_physics(PlayerPhysics::new());
        let handle = world.add_dynamic_game_object(&mut session, player).unwrap();
        (world, session, handle)
    }

    #[test]
    fn test_player_holds_position_until_enabled() {
        let (mut world, mut session, player) = setup();
        world.update_object(&mut session, player, 0.5).unwrap();
        assert_eq!(world.object(player).unwrap().position(), Vec3::zeros());

        world.object_mut(player).unwrap().movement_enabled = true;
        world.update_object(&mut session, player, 0.5).unwrap();
        let moved = world.object(player).unwrap();
        assert_relative_eq!(moved.position(), Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(moved.bounding_box().unwrap().max(), Vec3::new(0.5, 1.0, 2.5));

        world.object_mut(player).unwrap().movement_enabled = false;
        world.update_object(&mut session, player, 0.5).unwrap();
        assert_relative_eq!(world.object(player).unwrap().position(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_player_heading_is_renormalized() {
        let (mut world, mut session, player) = setup();
        let object = world.object_mut(player).unwrap();
        object.movement_enabled = true;
        object.direction = Vec3::new(3.0, 0.0, 4.0);

        world.update_object(&mut session, player, 1.0).unwrap();
        assert_relative_eq!(world.object(player).unwrap().position(), Vec3::new(2.4, 0.0, 3.2), epsilon = 1e-5);
    }
}
