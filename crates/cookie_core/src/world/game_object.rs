//! Game objects owned by the world registry

use crate::foundation::math::{Transform, Vec3};
use crate::physics::PhysicsComponent;
use crate::spatial::BoundingBox;

slotmap::new_key_type! {
    /// Non-owning handle to an object in the [`GameWorld`](super::GameWorld)
    ///
    /// Handles stay valid as values after the object is removed; resolving a
    /// stale handle through the world simply yields nothing.
    pub struct ObjectHandle;
}

/// What role an object plays in collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Immovable scenery such as houses; indexed by the octree
    Static,
    /// Moving targets
    Dynamic,
    /// The player avatar
    Player,
    /// A thrown cookie
    Cookie,
    /// Short-lived visual effect
    Billboard,
}

impl ObjectKind {
    /// Whether a cookie bounces off objects of this kind
    pub fn is_obstacle(self) -> bool {
        matches!(self, Self::Static | Self::Dynamic)
    }
}

/// An object in the game world
///
/// Position, direction and speed are public state read and written by the
/// physics components. The world-space bounding box is recomputed from the
/// model-space shape bounds every time the transform changes.
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Collision role
    pub kind: ObjectKind,
    /// Unit heading
    pub direction: Vec3,
    /// Speed along `direction` in units per second
    pub velocity: f32,
    /// Whether a cookie hit on this object still awards score
    pub deliverable: bool,
    /// Set by input to let the player walk forward
    pub movement_enabled: bool,
    transform: Transform,
    shape_bounds: Option<BoundingBox>,
    bounding_box: Option<BoundingBox>,
    material: Option<String>,
    physics: Option<PhysicsComponent>,
}

impl GameObject {
    /// Create an object at `position` heading along `direction`
    ///
    /// A zero direction is kept as zero rather than normalized into NaNs.
    pub fn new(kind: ObjectKind, position: Vec3, direction: Vec3, velocity: f32) -> Self {
        Self {
            kind,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
            velocity,
            deliverable: false,
            movement_enabled: false,
            transform: Transform::from_position(position),
            shape_bounds: None,
            bounding_box: None,
            material: None,
            physics: None,
        }
    }

    /// Immovable object with the given world-space footprint
    pub fn static_box(bounds: BoundingBox) -> Self {
        let center = bounds.center();
        let half = bounds.extent() * 0.5;
        Self::new(ObjectKind::Static, center, Vec3::zeros(), 0.0)
            .with_shape_bounds(BoundingBox::new(-half, half))
    }

    /// Set the model-space bounds (typically the mesh min/max)
    pub fn with_shape_bounds(mut self, shape: BoundingBox) -> Self {
        self.shape_bounds = Some(shape);
        self.update_bounding_box();
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Attach a physics component
    pub fn with_physics(mut self, physics: impl Into<PhysicsComponent>) -> Self {
        self.physics = Some(physics.into());
        self
    }

    /// Mark the object as a delivery target
    pub fn deliverable(mut self) -> Self {
        self.deliverable = true;
        self
    }

    /// Set the initial material name
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Current world position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Move the object; the bounding box follows
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.update_bounding_box();
    }

    /// Current scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Rescale the object; the bounding box follows
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.update_bounding_box();
    }

    /// Rotation around the up axis in radians
    pub fn y_rotation(&self) -> f32 {
        self.transform.y_rotation
    }

    /// Turn the object around the up axis; the bounding box follows
    pub fn set_y_rotation(&mut self, angle: f32) {
        self.transform.y_rotation = angle;
        self.update_bounding_box();
    }

    /// Full transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Model-space bounds, if the object has a shape
    pub fn shape_bounds(&self) -> Option<&BoundingBox> {
        self.shape_bounds.as_ref()
    }

    /// World-space bounds; `None` for objects without a shape
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Recompute the world-space bounds from the shape and transform
    pub fn update_bounding_box(&mut self) {
        let matrix = self.transform.to_matrix();
        match (self.shape_bounds, self.bounding_box.as_mut()) {
            (Some(shape), Some(world)) => world.update(&shape, &matrix),
            (Some(shape), None) => self.bounding_box = Some(shape.transformed(&matrix)),
            (None, _) => self.bounding_box = None,
        }
    }

    /// Test this object's bounds against another object's
    pub fn check_intersection(&self, other: &GameObject) -> bool {
        match (&self.bounding_box, &other.bounding_box) {
            (Some(a), Some(b)) => a.intersects(b),
            _ => false,
        }
    }

    /// Name of the material the renderer should use
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Swap the material; returns false when it was already in use
    pub fn change_material(&mut self, material: &str) -> bool {
        if self.material.as_deref() == Some(material) {
            return false;
        }
        self.material = Some(material.to_string());
        true
    }

    /// Attached physics component
    pub fn physics(&self) -> Option<&PhysicsComponent> {
        self.physics.as_ref()
    }

    pub(crate) fn take_physics(&mut self) -> Option<PhysicsComponent> {
        self.physics.take()
    }

    pub(crate) fn restore_physics(&mut self, physics: PhysicsComponent) {
        self.physics = Some(physics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn crate_shape() -> BoundingBox {
        BoundingBox::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0))
    }

    #[test]
    fn test_direction_is_normalized() {
        let obj = GameObject::new(ObjectKind::Dynamic, Vec3::zeros(), Vec3::new(3.0, 0.0, 4.0), 1.0);
        assert_relative_eq!(obj.direction, Vec3::new(0.6, 0.0, 0.8), epsilon = 1e-6);

        let still = GameObject::new(ObjectKind::Dynamic, Vec3::zeros(), Vec3::zeros(), 0.0);
        assert_eq!(still.direction, Vec3::zeros());
    }

    #[test]
    fn test_bounding_box_follows_transform() {
        let mut obj = GameObject::new(ObjectKind::Static, Vec3::new(10.0, 0.0, 0.0), Vec3::zeros(), 0.0)
            .with_shape_bounds(crate_shape());
        assert_eq!(obj.bounding_box().unwrap().min(), Vec3::new(9.0, 0.0, -1.0));

        obj.set_position(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(obj.bounding_box().unwrap().max(), Vec3::new(1.0, 7.0, 1.0));

        obj.set_scale(Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(obj.bounding_box().unwrap().min(), Vec3::new(-2.0, 5.0, -2.0));
    }

    #[test]
    fn test_shape_bounds_stay_in_model_space() {
        let mut obj = GameObject::new(ObjectKind::Dynamic, Vec3::new(0.0, 1.0, 0.0), Vec3::zeros(), 0.0)
            .with_shape_bounds(crate_shape())
            .with_scale(Vec3::new(2.0, 3.0, 2.0));
        obj.set_y_rotation(crate::foundation::math::constants::HALF_PI);

        assert_eq!(obj.shape_bounds(), Some(&crate_shape()));
        assert_eq!(obj.transform().scale, Vec3::new(2.0, 3.0, 2.0));
        let expected = crate_shape().transformed(&obj.transform().to_matrix());
        assert_eq!(obj.bounding_box(), Some(&expected));
        assert_relative_eq!(obj.bounding_box().unwrap().max().y, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_object_without_shape_has_no_bounds() {
        let a = GameObject::new(ObjectKind::Dynamic, Vec3::zeros(), Vec3::x(), 1.0);
        let b = GameObject::new(ObjectKind::Static, Vec3::zeros(), Vec3::zeros(), 0.0).with_shape_bounds(crate_shape());

        assert!(a.bounding_box().is_none());
        assert!(!a.check_intersection(&b));
        assert!(!b.check_intersection(&a));
    }

    #[test]
    fn test_static_box_keeps_footprint() {
        let footprint = BoundingBox::new(Vec3::new(4.0, 0.0, -2.0), Vec3::new(6.0, 3.0, 2.0));
        let house = GameObject::static_box(footprint);
        assert_eq!(house.bounding_box(), Some(&footprint));
        assert_eq!(house.position(), Vec3::new(5.0, 1.5, 0.0));
    }

    #[test]
    fn test_change_material_reports_changes_only() {
        let mut obj = GameObject::new(ObjectKind::Static, Vec3::zeros(), Vec3::zeros(), 0.0).with_material("Brick");
        assert!(!obj.change_material("Brick"));
        assert!(obj.change_material("Red Rubber"));
        assert_eq!(obj.material(), Some("Red Rubber"));
    }
}
