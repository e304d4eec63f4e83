//! Thrown cookie: ballistic flight, bounces off obstacles, scores deliveries

use super::{ObjectPhysics, PhysicsContext, PhysicsError};
use crate::config::PhysicsConfig;
use crate::foundation::logging::{debug, info, trace};
use crate::foundation::math::{ground_distance, reflect, Vec3};
use crate::world::{GameEvent, ObjectHandle};

/// Score multiplier for the ground distance a cookie traveled
///
/// Thresholds are strict: exactly 15 units still earns the base rate.
pub fn distance_multiplier(distance: f32) -> f32 {
    if distance > 30.0 {
        2.0
    } else if distance > 25.0 {
        1.75
    } else if distance > 20.0 {
        1.5
    } else if distance > 15.0 {
        1.25
    } else {
        1.0
    }
}

/// Flight record of one cookie
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieState {
    /// Obstacles struck so far
    pub hits: u32,
    /// Session time the cookie was thrown at
    pub launch_time: f64,
    /// Where the cookie was thrown from
    pub launch_position: Vec3,
    /// Cookie position after each bounce, oldest first
    pub hit_positions: Vec<Vec3>,
    /// Points this cookie has already been credited with
    pub scored: f32,
}

impl CookieState {
    /// Ground-plane length of the path launch, hit 0, hit 1, ...
    ///
    /// `None` until the cookie has hit something.
    pub fn distance_traveled(&self) -> Option<f32> {
        if self.hit_positions.is_empty() {
            return None;
        }
        let path = std::iter::once(&self.launch_position).chain(&self.hit_positions);
        Some(
            path.zip(self.hit_positions.iter())
                .map(|(from, to)| ground_distance(from, to))
                .sum(),
        )
    }

    /// Points for a delivery on the latest hit
    pub fn score(&self, points_per_hit: f32) -> Option<f32> {
        let distance = self.distance_traveled()?;
        Some(points_per_hit * self.hits as f32 * distance_multiplier(distance))
    }
}

/// Cookie physics component
#[derive(Debug, Clone, PartialEq)]
pub struct CookiePhysics {
    gravity: f32,
    ground_epsilon: f32,
    points_per_hit: f32,
    y_velocity: f32,
    resting: bool,
    state: CookieState,
}

impl CookiePhysics {
    /// Fresh cookie with tunables from `config`
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            ground_epsilon: config.ground_epsilon,
            points_per_hit: config.points_per_hit,
            y_velocity: 0.0,
            resting: false,
            state: CookieState::default(),
        }
    }

    /// Flight record
    pub fn state(&self) -> &CookieState {
        &self.state
    }

    /// Current vertical speed
    pub fn y_velocity(&self) -> f32 {
        self.y_velocity
    }

    /// Settled on the ground or on top of an obstacle
    ///
    /// Both speeds are zero and the cookie no longer moves or collides.
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    fn integrate(&self, from: Vec3, direction: Vec3, velocity: f32, delta_time: f32) -> Vec3 {
        from + direction * velocity * delta_time + Vec3::new(0.0, self.y_velocity * delta_time, 0.0)
    }

    /// Reflect off `obstacle` and redo this step from `old_position`
    fn bounce(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        obstacle: ObjectHandle,
        old_position: Vec3,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        let obstacle_box = ctx.world.holder(obstacle)?.bounding_box().copied();
        let cookie_box = ctx.world.holder(holder)?.bounding_box().copied();
        let (Some(obstacle_box), Some(cookie_box)) = (obstacle_box, cookie_box) else {
            return Ok(());
        };
        let normal = obstacle_box.calc_refl_normal(&cookie_box);

        let (direction, velocity) = {
            let cookie = ctx.world.holder_mut(holder)?;
            cookie.direction = reflect(&cookie.direction, &normal);
            // Landed on top: settle where the step started
            if normal.y > 0.0 {
                cookie.velocity = 0.0;
                self.y_velocity = 0.0;
                self.resting = true;
            }
            (cookie.direction, cookie.velocity)
        };
        let hit_position = self.integrate(old_position, direction, velocity, delta_time);
        ctx.world.holder_mut(holder)?.set_position(hit_position);

        self.state.hits += 1;
        self.state.hit_positions.push(hit_position);
        debug!(
            "Cookie {holder:?} bounced off {obstacle:?} (hit {}), normal {:?}",
            self.state.hits,
            normal.as_slice()
        );

        if ctx.world.holder(obstacle)?.deliverable {
            self.deliver(ctx, holder, obstacle, hit_position)?;
        }
        Ok(())
    }

    fn deliver(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        target: ObjectHandle,
        hit_position: Vec3,
    ) -> Result<(), PhysicsError> {
        let material = ctx.world.delivered_material().to_string();
        ctx.world.change_material(target, &material);
        ctx.world.trigger_delivery_animation(target);
        ctx.world.spawn_hit_billboard(ctx.session, hit_position)?;

        let Some(points) = self.state.score(self.points_per_hit) else {
            return Ok(());
        };
        ctx.session.report_score(points);
        let time_bonus = (points - self.state.scored) / self.points_per_hit + 1.0;
        self.state.scored += points;
        ctx.session.increase_time(time_bonus);
        ctx.world.mark_delivered(target);

        info!(
            "Cookie {holder:?} delivered to {target:?}: +{points} points, +{time_bonus:.2}s (total {})",
            ctx.session.score()
        );
        ctx.world.push_event(GameEvent::ScoreReported {
            cookie: holder,
            points,
            time_bonus,
        });
        Ok(())
    }
}

impl ObjectPhysics for CookiePhysics {
    fn init_object_physics(&mut self, ctx: &mut PhysicsContext<'_>, holder: ObjectHandle) -> Result<(), PhysicsError> {
        let cookie = ctx.world.holder_mut(holder)?;
        cookie.update_bounding_box();
        self.y_velocity = 0.0;
        self.resting = false;
        self.state = CookieState {
            launch_time: ctx.session.elapsed(),
            launch_position: cookie.position(),
            ..CookieState::default()
        };
        Ok(())
    }

    fn update_physics(
        &mut self,
        ctx: &mut PhysicsContext<'_>,
        holder: ObjectHandle,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        if self.resting {
            return Ok(());
        }

        let cookie = ctx.world.holder_mut(holder)?;
        let old_position = cookie.position();
        let position = self.integrate(old_position, cookie.direction, cookie.velocity, delta_time);
        cookie.set_position(position);

        if position.y > self.ground_epsilon {
            self.y_velocity -= self.gravity * delta_time;
        } else {
            self.y_velocity = 0.0;
            cookie.velocity = 0.0;
            self.resting = true;
        }
        trace!("Cookie {holder:?} at {:?}", position.as_slice());

        let obstacle = ctx
            .world
            .check_collision(holder)
            .into_iter()
            .find(|h| ctx.world.object(*h).is_some_and(|o| o.kind.is_obstacle()));

        match obstacle {
            Some(obstacle) => self.bounce(ctx, holder, obstacle, old_position, delta_time),
            None => Ok(()),
        }
    }
}
