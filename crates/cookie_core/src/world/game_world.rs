//! Object registry and collision query surface

use slotmap::SlotMap;

use super::events::GameEvent;
use super::game_object::{GameObject, ObjectHandle, ObjectKind};
use super::session::GameSession;
use crate::config::{PhysicsConfig, SimulationConfig};
use crate::foundation::logging::{debug, info};
use crate::foundation::math::Vec3;
use crate::physics::{BillboardPhysics, CookiePhysics, ObjectPhysics, PhysicsComponent, PhysicsContext, PhysicsError};
use crate::spatial::{BoundingBox, Octree};

const COOKIE_HALF_EXTENTS: Vec3 = Vec3::new(0.25, 0.25, 0.25);
const BILLBOARD_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.5, 0.05);

/// All objects in play
///
/// Static objects are indexed by an octree that is rebuilt on demand after
/// the static set changes. Dynamic objects are kept in insertion order and
/// scanned linearly.
#[derive(Debug)]
pub struct GameWorld {
    objects: SlotMap<ObjectHandle, GameObject>,
    statics: Vec<ObjectHandle>,
    dynamics: Vec<ObjectHandle>,
    octree: Octree<ObjectHandle>,
    tree_dirty: bool,
    events: Vec<GameEvent>,
    deliveries: u32,
    physics_config: PhysicsConfig,
    delivered_material: String,
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

impl GameWorld {
    /// Create an empty world
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            statics: Vec::new(),
            dynamics: Vec::new(),
            octree: Octree::new(config.octree.clone()),
            tree_dirty: false,
            events: Vec::new(),
            deliveries: 0,
            physics_config: config.physics.clone(),
            delivered_material: config.game.delivered_material.clone(),
        }
    }

    /// Register a static object; the octree is rebuilt before its next use
    pub fn add_static_game_object(&mut self, object: GameObject) -> ObjectHandle {
        let bounds = object.bounding_box().copied();
        let handle = self.objects.insert(object);
        self.statics.push(handle);
        self.octree.add_object(handle, bounds);
        self.tree_dirty = true;
        handle
    }

    /// Remove a static object
    pub fn rm_static_game_object(&mut self, handle: ObjectHandle) -> Option<GameObject> {
        let index = self.statics.iter().position(|h| *h == handle)?;
        self.statics.remove(index);
        self.octree.remove_object(handle);
        self.tree_dirty = true;
        self.objects.remove(handle)
    }

    /// Register a dynamic object and initialize its physics component
    pub fn add_dynamic_game_object(
        &mut self,
        session: &mut GameSession,
        object: GameObject,
    ) -> Result<ObjectHandle, PhysicsError> {
        let kind = object.kind;
        let handle = self.objects.insert(object);
        self.dynamics.push(handle);
        debug!("Added dynamic {kind:?} object {handle:?}");

        self.run_physics(session, handle, |physics, ctx| {
            physics.init_object_physics(ctx, handle)
        })?;
        Ok(handle)
    }

    /// Remove a dynamic object
    ///
    /// Removing something that is not (or no longer) in the dynamic list
    /// does nothing and returns `None`.
    pub fn rm_dynamic_game_object(&mut self, handle: ObjectHandle) -> Option<GameObject> {
        let index = self.dynamics.iter().position(|h| *h == handle)?;
        self.dynamics.remove(index);
        let object = self.objects.remove(handle)?;

        debug!("Removed dynamic {:?} object {handle:?}", object.kind);
        self.events.push(GameEvent::ObjectDespawned {
            object: handle,
            kind: object.kind,
        });
        Some(object)
    }

    /// Throw a cookie from `position` along `direction`
    pub fn spawn_cookie(
        &mut self,
        session: &mut GameSession,
        position: Vec3,
        direction: Vec3,
        velocity: f32,
    ) -> Result<ObjectHandle, PhysicsError> {
        let cookie = GameObject::new(ObjectKind::Cookie, position, direction, velocity)
            .with_shape_bounds(BoundingBox::from_center_extents(Vec3::zeros(), COOKIE_HALF_EXTENTS))
            .with_physics(CookiePhysics::new(&self.physics_config));
        self.add_dynamic_game_object(session, cookie)
    }

    /// Spawn a rising hit billboard at `position`
    pub fn spawn_hit_billboard(
        &mut self,
        session: &mut GameSession,
        position: Vec3,
    ) -> Result<ObjectHandle, PhysicsError> {
        let billboard = GameObject::new(
            ObjectKind::Billboard,
            position,
            Vec3::y(),
            self.physics_config.billboard_speed,
        )
        .with_shape_bounds(BoundingBox::from_center_extents(Vec3::zeros(), BILLBOARD_HALF_EXTENTS))
        .with_physics(BillboardPhysics::new(self.physics_config.billboard_lifetime));

        let effect = self.add_dynamic_game_object(session, billboard)?;
        self.events.push(GameEvent::HitEffectSpawned { effect, position });
        Ok(effect)
    }

    /// Rebuild the octree if the static set changed since the last build
    ///
    /// Returns whether a rebuild happened.
    pub fn rebuild_tree(&mut self) -> bool {
        if !self.tree_dirty && self.octree.is_built() {
            return false;
        }
        self.octree.build_tree();
        self.tree_dirty = false;
        true
    }

    /// Flag the octree as stale, e.g. after moving a static object in place
    pub fn invalidate_tree(&mut self) {
        let objects = &self.objects;
        self.octree.set_objects(
            self.statics
                .iter()
                .map(|handle| (*handle, objects.get(*handle).and_then(|o| o.bounding_box().copied()))),
        );
        self.tree_dirty = true;
    }

    /// The static-object index
    pub fn octree(&self) -> &Octree<ObjectHandle> {
        &self.octree
    }

    /// Every object whose bounds strictly overlap those of `handle`
    ///
    /// Static hits come first, then dynamic hits in insertion order. The
    /// queried object never appears in its own result. Objects without
    /// bounds neither hit nor get hit.
    pub fn check_collision(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        let Some(query) = self.objects.get(handle).and_then(|o| o.bounding_box().copied()) else {
            return Vec::new();
        };

        let mut hits = if self.octree.is_built() && !self.tree_dirty {
            self.octree.check_intersection(Some(&query), Some(handle))
        } else {
            self.scan(&self.statics, handle, &query)
        };
        hits.extend(self.scan(&self.dynamics, handle, &query));
        hits
    }

    fn scan(&self, handles: &[ObjectHandle], exclude: ObjectHandle, query: &BoundingBox) -> Vec<ObjectHandle> {
        handles
            .iter()
            .copied()
            .filter(|h| *h != exclude)
            .filter(|h| {
                self.objects
                    .get(*h)
                    .and_then(GameObject::bounding_box)
                    .is_some_and(|bounds| bounds.intersects(query))
            })
            .collect()
    }

    /// Step the physics component of one object
    ///
    /// Objects without a component are left alone. A handle that no longer
    /// resolves is reported as [`PhysicsError::MissingHolder`].
    pub fn update_object(
        &mut self,
        session: &mut GameSession,
        handle: ObjectHandle,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        self.run_physics(session, handle, |physics, ctx| {
            physics.update_physics(ctx, handle, delta_time)
        })
    }

    /// Lend an object's component to `f` with the whole world in context
    ///
    /// The component is detached while it runs so it can mutate its holder
    /// through the world, and reattached afterwards unless the holder was
    /// removed in the meantime.
    fn run_physics<F>(&mut self, session: &mut GameSession, handle: ObjectHandle, f: F) -> Result<(), PhysicsError>
    where
        F: FnOnce(&mut PhysicsComponent, &mut PhysicsContext<'_>) -> Result<(), PhysicsError>,
    {
        let Some(mut physics) = self.holder_mut(handle)?.take_physics() else {
            return Ok(());
        };

        let result = f(&mut physics, &mut PhysicsContext { world: self, session });

        if let Some(object) = self.objects.get_mut(handle) {
            object.restore_physics(physics);
        }
        result
    }

    /// Resolve a handle
    pub fn object(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.objects.get(handle)
    }

    /// Resolve a handle mutably
    ///
    /// Moving a static object through this does not reindex it; call
    /// [`invalidate_tree`](Self::invalidate_tree) afterwards.
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.objects.get_mut(handle)
    }

    /// Resolve a component's holder or fail with `MissingHolder`
    pub fn holder(&self, handle: ObjectHandle) -> Result<&GameObject, PhysicsError> {
        self.objects.get(handle).ok_or(PhysicsError::MissingHolder(handle))
    }

    /// Mutable variant of [`holder`](Self::holder)
    pub fn holder_mut(&mut self, handle: ObjectHandle) -> Result<&mut GameObject, PhysicsError> {
        self.objects.get_mut(handle).ok_or(PhysicsError::MissingHolder(handle))
    }

    /// Swap an object's material and announce it
    pub fn change_material(&mut self, handle: ObjectHandle, material: &str) {
        if let Some(object) = self.objects.get_mut(handle) {
            if object.change_material(material) {
                self.events.push(GameEvent::MaterialChanged {
                    object: handle,
                    material: material.to_string(),
                });
            }
        }
    }

    /// Ask the front end to play a target's reaction animation
    pub fn trigger_delivery_animation(&mut self, handle: ObjectHandle) {
        self.events.push(GameEvent::DeliveryAnimationTriggered { object: handle });
    }

    /// Consume a target's deliverable flag
    ///
    /// Returns false if the object was not deliverable (or is gone).
    pub fn mark_delivered(&mut self, handle: ObjectHandle) -> bool {
        match self.objects.get_mut(handle) {
            Some(object) if object.deliverable => {
                object.deliverable = false;
                self.deliveries += 1;
                info!("Delivery #{} to {handle:?}", self.deliveries);
                true
            }
            _ => false,
        }
    }

    /// Queue an event for the front end
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Material delivered targets switch to
    pub fn delivered_material(&self) -> &str {
        &self.delivered_material
    }

    /// Physics tunables shared by spawned components
    pub fn physics_config(&self) -> &PhysicsConfig {
        &self.physics_config
    }

    /// Dynamic handles in update order
    pub fn dynamic_handles(&self) -> &[ObjectHandle] {
        &self.dynamics
    }

    /// Static handles in insertion order
    pub fn static_handles(&self) -> &[ObjectHandle] {
        &self.statics
    }

    /// Number of dynamic objects
    pub fn num_dynamic_game_objects(&self) -> usize {
        self.dynamics.len()
    }

    /// Number of static objects
    pub fn num_static_game_objects(&self) -> usize {
        self.statics.len()
    }

    /// Number of successful deliveries
    pub fn num_deliveries(&self) -> u32 {
        self.deliveries
    }

    /// Targets still waiting for a cookie
    pub fn deliverables_remaining(&self) -> usize {
        self.objects.values().filter(|o| o.deliverable).count()
    }
}
