//! Headless cookie delivery demo
//!
//! Lays out a street of houses around the player, throws a cookie at each
//! house in turn and logs deliveries until every house is served or the
//! clock runs out.
//!
//! Usage: `cookie_demo [config.toml|config.ron] [seed]`

use cookie_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

// Neighbourhood layout
const NUM_HOUSES: usize = 8;
const STREET_RADIUS_MIN: f32 = 8.0;
const STREET_RADIUS_MAX: f32 = 20.0;
const HOUSE_HALF_WIDTH: f32 = 2.0;
const HOUSE_HEIGHT: f32 = 4.0;

// Frame pacing
const FRAME_TIME: f32 = 1.0 / 60.0;
const THROW_INTERVAL: u64 = 90;
const MAX_FRAMES: u64 = 60 * 120;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

struct DeliveryDemo {
    sim: Simulation,
    targets: Vec<(ObjectHandle, Vec3)>,
    next_target: usize,
}

impl DeliveryDemo {
    fn new(config: SimulationConfig, seed: u64) -> Result<Self, DemoError> {
        let mut sim = Simulation::new(config)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut targets = Vec::with_capacity(NUM_HOUSES);
        for i in 0..NUM_HOUSES {
            let angle = (i as f32 / NUM_HOUSES as f32) * 2.0 * PI + rng.gen_range(-0.2..0.2);
            let radius = rng.gen_range(STREET_RADIUS_MIN..STREET_RADIUS_MAX);
            let center = Vec3::new(radius * angle.cos(), HOUSE_HEIGHT * 0.5, radius * angle.sin());
            let half = Vec3::new(HOUSE_HALF_WIDTH, HOUSE_HEIGHT * 0.5, HOUSE_HALF_WIDTH);

            let house = GameObject::static_box(BoundingBox::from_center_extents(center, half))
                .with_material("Brick")
                .deliverable();
            let handle = sim.world_mut().add_static_game_object(house);
            targets.push((handle, center));
        }

        // A few fences to bounce off
        for _ in 0..NUM_HOUSES / 2 {
            let x = rng.gen_range(-STREET_RADIUS_MAX..STREET_RADIUS_MAX);
            let z = rng.gen_range(-STREET_RADIUS_MAX..STREET_RADIUS_MAX);
            let fence = BoundingBox::new(Vec3::new(x, 0.0, z), Vec3::new(x + 6.0, 1.5, z + 0.3));
            if fence.contains_point(&Vec3::zeros()) {
                continue;
            }
            sim.world_mut().add_static_game_object(GameObject::static_box(fence));
        }

        sim.spawn_player(Vec3::new(0.0, 1.0, 0.0), Vec3::x(), 3.0)?;
        log::info!(
            "Neighbourhood ready: {} houses, {} static objects",
            targets.len(),
            sim.world().num_static_game_objects()
        );

        Ok(Self {
            sim,
            targets,
            next_target: 0,
        })
    }

    /// Turn the player toward the next house that still wants a cookie
    fn aim(&mut self) -> bool {
        let pending = (0..self.targets.len())
            .map(|offset| (self.next_target + offset) % self.targets.len())
            .find(|i| {
                let (handle, _) = self.targets[*i];
                self.sim.world().object(handle).is_some_and(|o| o.deliverable)
            });
        let Some(index) = pending else {
            return false;
        };
        self.next_target = (index + 1) % self.targets.len();

        let Some(player) = self.sim.player() else {
            return false;
        };
        let target = self.targets[index].1;
        let Some(position) = self.sim.world().object(player).map(GameObject::position) else {
            return false;
        };
        let mut heading = target - position;
        heading.y = 0.0;
        let distance = heading.norm();
        let Some(flat) = heading.try_normalize(f32::EPSILON) else {
            return false;
        };

        // Lob so the flat-ground landing point is the house center
        let physics = self.sim.config().physics.clone();
        let pitch = lob_angle(distance, physics.throw_velocity, physics.gravity);
        let Some(object) = self.sim.world_mut().object_mut(player) else {
            return false;
        };
        object.direction = flat * pitch.cos() + Vec3::y() * pitch.sin();
        object.set_y_rotation(flat.x.atan2(flat.z));
        true
    }

    fn run(mut self) -> Result<GameSession, DemoError> {
        let mut frame = 0;
        while !self.sim.session().is_game_over() && frame < MAX_FRAMES {
            if frame % THROW_INTERVAL == 0 && self.aim() {
                self.sim.throw_cookie()?;
            }

            for event in self.sim.tick(FRAME_TIME) {
                match event {
                    GameEvent::ScoreReported { points, time_bonus, .. } => {
                        log::info!("Delivered! +{points} points, +{time_bonus:.1}s");
                    }
                    GameEvent::MaterialChanged { object, material } => {
                        log::debug!("{object:?} is now {material}");
                    }
                    other => log::trace!("{other:?}"),
                }
            }
            frame += 1;
        }

        log::info!(
            "Finished after {} frames: {}/{} houses served, {} objects still moving",
            frame,
            self.sim.world().num_deliveries(),
            self.targets.len(),
            self.sim.world().num_dynamic_game_objects()
        );
        Ok(self.sim.session().clone())
    }
}

/// Launch angle whose flat-ground range reaches `distance`
fn lob_angle(distance: f32, speed: f32, gravity: f32) -> f32 {
    if gravity <= 0.0 || speed <= 0.0 {
        return 0.0;
    }
    let reach = (distance * gravity / (speed * speed)).clamp(0.0, 1.0);
    0.5 * reach.asin()
}

fn load_config(path: Option<&str>) -> Result<SimulationConfig, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            SimulationConfig::load_from_file(path)
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);

    println!("=== Cookie Delivery Demo ===");
    let session = DeliveryDemo::new(config, seed)?.run()?;

    println!(
        "{} | score {} | time left {:.1}s | final {}",
        if session.is_won() { "All houses served" } else { "Out of time" },
        session.score(),
        session.time_remaining(),
        session.final_score()
    );
    Ok(())
}
