//! # Cookie Core
//!
//! Spatial and physics core for a cookie delivery game: throw cookies from
//! the player, bounce them off houses, and score deliveries against the
//! clock.
//!
//! ## Features
//!
//! - **Octree broad phase**: Arena octree over the static scenery
//! - **Bounding boxes**: Axis-aligned boxes with reflection normals
//! - **Physics components**: Cookie, hit billboard and player behaviors
//! - **Headless**: Visual reactions are reported as events
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookie_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sim = Simulation::new(SimulationConfig::default())?;
//!     let house = BoundingBox::new(Vec3::new(10.0, 0.0, -2.0), Vec3::new(14.0, 4.0, 2.0));
//!     sim.world_mut().add_static_game_object(GameObject::static_box(house).deliverable());
//!
//!     sim.spawn_player(Vec3::new(0.0, 1.0, 0.0), Vec3::x(), 2.0)?;
//!     sim.throw_cookie()?;
//!     for _ in 0..120 {
//!         for event in sim.tick(1.0 / 60.0) {
//!             println!("{event:?}");
//!         }
//!     }
//!     println!("score: {}", sim.session().final_score());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod world;

mod simulation;

pub use simulation::Simulation;

/// Common imports
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, GameConfig, OctreeConfig, PhysicsConfig, SimulationConfig},
        foundation::math::{Transform, Vec3},
        physics::{
            BillboardPhysics, CookiePhysics, ObjectPhysics, PhysicsComponent, PhysicsContext, PhysicsError,
            PlayerPhysics,
        },
        spatial::{BoundingBox, Octree},
        world::{GameEvent, GameObject, GameSession, GameWorld, ObjectHandle, ObjectKind},
        Simulation,
    };
}
