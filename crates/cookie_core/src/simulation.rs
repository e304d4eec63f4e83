//! Frame driver tying the world, the session and the physics together

use crate::config::{ConfigError, SimulationConfig};
use crate::foundation::logging::{info, trace, warn};
use crate::foundation::math::Vec3;
use crate::physics::{PhysicsError, PlayerPhysics};
use crate::spatial::BoundingBox;
use crate::world::{GameEvent, GameObject, GameSession, GameWorld, ObjectHandle, ObjectKind};

const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);

/// One play session
#[derive(Debug)]
pub struct Simulation {
    world: GameWorld,
    session: GameSession,
    config: SimulationConfig,
    player: Option<ObjectHandle>,
    frame: u64,
}

impl Simulation {
    /// Validate `config` and set up an empty world
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: GameWorld::new(&config),
            session: GameSession::new(&config.game),
            config,
            player: None,
            frame: 0,
        })
    }

    /// Place the player; replaces any previous player
    pub fn spawn_player(&mut self, position: Vec3, direction: Vec3, velocity: f32) -> Result<ObjectHandle, PhysicsError> {
        if let Some(previous) = self.player.take() {
            self.world.rm_dynamic_game_object(previous);
        }

        let player = GameObject::new(ObjectKind::Player, position, direction, velocity)
            .with_shape_bounds(BoundingBox::from_center_extents(Vec3::zeros(), PLAYER_HALF_EXTENTS))
            .with_physics(PlayerPhysics::new());
        let handle = self.world.add_dynamic_game_object(&mut self.session, player)?;
        self.player = Some(handle);
        Ok(handle)
    }

    /// Throw a cookie from the player along its heading
    ///
    /// Returns `None` when there is no player or the game is over.
    pub fn throw_cookie(&mut self) -> Result<Option<ObjectHandle>, PhysicsError> {
        if self.session.is_game_over() {
            return Ok(None);
        }
        let Some(player) = self.player.and_then(|h| self.world.object(h)) else {
            return Ok(None);
        };

        let (position, direction) = (player.position(), player.direction);
        let cookie = self.world.spawn_cookie(
            &mut self.session,
            position,
            direction,
            self.config.physics.throw_velocity,
        )?;
        info!("Cookie {cookie:?} thrown from {:?}", position.as_slice());
        Ok(Some(cookie))
    }

    /// Advance everything by `delta_time` seconds and return the events raised
    pub fn tick(&mut self, delta_time: f32) -> Vec<GameEvent> {
        if self.session.is_game_over() {
            return self.world.drain_events();
        }

        self.frame += 1;
        self.session.advance(delta_time);
        self.world.rebuild_tree();

        // Objects spawned during this pass are first updated next frame
        let handles = self.world.dynamic_handles().to_vec();
        for handle in handles {
            if self.world.object(handle).is_none() {
                continue;
            }
            if let Err(e) = self.world.update_object(&mut self.session, handle, delta_time) {
                warn!("Skipping update: {e}");
            }
        }

        if self.world.num_deliveries() > 0 && self.world.deliverables_remaining() == 0 && !self.session.is_game_over() {
            self.session.finish();
            info!(
                "All deliveries made after {:.1}s: score {}, final {}",
                self.session.elapsed(),
                self.session.score(),
                self.session.final_score()
            );
        } else if self.session.is_game_over() {
            info!("Time up: final score {}", self.session.final_score());
        }

        trace!(
            "Frame {}: {} dynamic objects, {:.2}s left",
            self.frame,
            self.world.num_dynamic_game_objects(),
            self.session.time_remaining()
        );
        self.world.drain_events()
    }

    /// The world
    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    /// The world, mutably, for laying out scenery
    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    /// Score and clock
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Current player handle
    pub fn player(&self) -> Option<ObjectHandle> {
        self.player
    }

    /// Let the player walk or stop
    pub fn set_player_moving(&mut self, moving: bool) {
        if let Some(player) = self.player.and_then(|h| self.world.object_mut(h)) {
            player.movement_enabled = moving;
        }
    }

    /// Frames simulated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.physics.gravity = 0.0;
        config.physics.throw_velocity = 10.0;
        config
    }

    fn house(min_x: f32, max_x: f32) -> GameObject {
        GameObject::static_box(BoundingBox::new(Vec3::new(min_x, 0.0, -2.0), Vec3::new(max_x, 3.0, 2.0)))
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.game.start_time = 0.0;
        assert!(matches!(Simulation::new(config), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_throw_requires_player() {
        let mut sim = Simulation::new(flat_config()).unwrap();
        assert_eq!(sim.throw_cookie().unwrap(), None);

        sim.spawn_player(Vec3::new(0.0, 1.0, 0.0), Vec3::x(), 2.0).unwrap();
        let cookie = sim.throw_cookie().unwrap().unwrap();
        let cookie = sim.world().object(cookie).unwrap();
        assert_eq!(cookie.kind, ObjectKind::Cookie);
        assert_eq!(cookie.velocity, 10.0);
        assert_eq!(cookie.direction, Vec3::x());
    }

    #[test]
    fn test_last_delivery_wins_the_game() {
        crate::foundation::logging::init();
        let mut sim = Simulation::new(flat_config()).unwrap();
        let target = sim.world_mut().add_static_game_object(house(4.0, 6.0).deliverable());
        sim.spawn_player(Vec3::new(0.0, 1.0, 0.0), Vec3::x(), 0.0).unwrap();
        sim.throw_cookie().unwrap();

        let mut events = Vec::new();
        for _ in 0..10 {
            events.extend(sim.tick(0.1));
        }

        assert!(sim.session().is_won());
        assert!(!sim.world().object(target).unwrap().deliverable);
        assert_relative_eq!(sim.session().score(), 500.0);
        assert!(events.contains(&GameEvent::DeliveryAnimationTriggered { object: target }));

        // Frozen once over
        let frame = sim.frame();
        assert!(sim.tick(0.1).is_empty());
        assert_eq!(sim.frame(), frame);
    }

    #[test]
    fn test_clock_runs_out() {
        let mut config = flat_config();
        config.game.start_time = 0.5;
        let mut sim = Simulation::new(config).unwrap();
        sim.world_mut().add_static_game_object(house(40.0, 42.0).deliverable());

        for _ in 0..6 {
            sim.tick(0.1);
        }
        assert!(sim.session().is_game_over());
        assert!(!sim.session().is_won());
    }

    #[test]
    fn test_billboards_expire_during_ticks() {
        let mut sim = Simulation::new(flat_config()).unwrap();
        sim.world_mut().add_static_game_object(house(4.0, 6.0).deliverable());
        sim.world_mut().add_static_game_object(house(20.0, 22.0).deliverable());
        sim.spawn_player(Vec3::new(0.0, 1.0, 0.0), Vec3::x(), 0.0).unwrap();
        sim.throw_cookie().unwrap();

        let mut despawned = 0;
        for _ in 0..30 {
            despawned += sim
                .tick(0.1)
                .iter()
                .filter(|e| matches!(e, GameEvent::ObjectDespawned { kind: ObjectKind::Billboard, .. }))
                .count();
        }
        assert_eq!(despawned, 1);
        assert_eq!(sim.world().num_deliveries(), 1);
        assert!(!sim.session().is_game_over());
    }

    #[test]
    fn test_player_walks_when_enabled() {
        let mut sim = Simulation::new(flat_config()).unwrap();
        let player = sim.spawn_player(Vec3::zeros(), Vec3::z(), 2.0).unwrap();

        sim.tick(0.5);
        assert_eq!(sim.world().object(player).unwrap().position(), Vec3::zeros());

        sim.set_player_moving(true);
        sim.tick(0.5);
        assert_relative_eq!(sim.world().object(player).unwrap().position(), Vec3::new(0.0, 0.0, 1.0));
    }
}
