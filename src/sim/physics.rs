//! Platformer motion: input, gravity, one-way platform landing, camera
//!
//! Platforms are one-way: a body only lands when its feet were at or above
//! the platform top on the previous step and it is not moving up. Sides and
//! undersides never collide. World edges clamp, they do not bounce.

use glam::Vec2;

use super::entity::{Behavior, Entity};
use super::geometry::{Aabb, Direction};
use super::state::PhysicsRules;
use super::tick::TickInput;
use crate::consts::LANDING_EPSILON;

/// Result of moving one body for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub bounds: Aabb,
    pub vel: Vec2,
    pub grounded: bool,
}

/// Accelerate/damp horizontally and start a jump if grounded
pub fn apply_input(
    vel: Vec2,
    grounded: bool,
    input: &TickInput,
    rules: &PhysicsRules,
    dt: f32,
) -> (Vec2, bool) {
    let mut vel = vel;
    let mut grounded = grounded;

    let dir_x = input.direction.map_or(0.0, Direction::horizontal);
    if dir_x != 0.0 {
        vel.x = (vel.x + dir_x * rules.run_accel * dt).clamp(-rules.max_run_speed, rules.max_run_speed);
    } else {
        vel.x *= rules.damping;
        if vel.x.abs() < 1.0 {
            vel.x = 0.0;
        }
    }

    let wants_jump = input.jump || input.direction == Some(Direction::Up);
    if wants_jump && grounded {
        vel.y = -rules.jump_velocity;
        grounded = false;
    }
    (vel, grounded)
}

/// Gravity applies only while airborne, clamped to terminal speed
pub fn apply_gravity(vel: Vec2, grounded: bool, rules: &PhysicsRules, dt: f32) -> Vec2 {
    if grounded {
        return vel;
    }
    Vec2::new(vel.x, (vel.y + rules.gravity * dt).min(rules.max_fall_speed))
}

/// Integrate position, land on platforms, clamp to world edges
pub fn move_and_land(
    prev: Aabb,
    vel: Vec2,
    platforms: &[Aabb],
    world: &Aabb,
    dt: f32,
) -> Motion {
    let mut bounds = prev.translated(vel * dt);
    let mut vel = vel;
    let mut grounded = false;

    if vel.y >= 0.0 {
        // Highest platform whose top the feet crossed this step
        let landing = platforms
            .iter()
            .filter(|p| {
                bounds.overlaps_x(p)
                    && prev.bottom() <= p.y + LANDING_EPSILON
                    && bounds.bottom() >= p.y - LANDING_EPSILON
            })
            .map(|p| p.y)
            .reduce(f32::min);

        if let Some(top) = landing {
            bounds.y = top - bounds.h;
            vel.y = 0.0;
            grounded = true;
        }
    }

    // Horizontal world clamp
    if bounds.x < world.x {
        bounds.x = world.x;
        vel.x = 0.0;
    } else if bounds.right() > world.right() {
        bounds.x = world.right() - bounds.w;
        vel.x = 0.0;
    }
    // Ceiling
    if bounds.y < world.y {
        bounds.y = world.y;
        vel.y = vel.y.max(0.0);
    }

    Motion {
        bounds,
        vel,
        grounded,
    }
}

/// Advance a patrolling hazard, reversing at its limits
pub fn step_patrol(entity: &mut Entity, dt: f32) {
    let Behavior::Patrol {
        min_x,
        max_x,
        speed,
    } = &mut entity.behavior
    else {
        return;
    };

    entity.bounds.x += *speed * dt;
    if entity.bounds.x < *min_x {
        entity.bounds.x = *min_x;
        *speed = speed.abs();
    } else if entity.bounds.right() > *max_x {
        entity.bounds.x = *max_x - entity.bounds.w;
        *speed = -speed.abs();
    }
    entity.vel = Vec2::new(*speed, 0.0);
}

/// Horizontal camera offset centered on the player, kept inside the level
pub fn camera_offset(player: &Aabb, level_width: f32, viewport_width: f32) -> f32 {
    let max_offset = (level_width - viewport_width).max(0.0);
    (player.center().x - viewport_width / 2.0).clamp(0.0, max_offset)
}
