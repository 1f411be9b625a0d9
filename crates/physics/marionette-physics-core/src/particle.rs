//! The particle chain and its integration step.
//!
//! Particle 0 is pinned to the rig's input translation. Every other particle
//! hangs off its predecessor on a rigid rod of length `radius`: forces and
//! inertia may swing the rod but never stretch it.

use serde::{Deserialize, Serialize};

use crate::data::PhysicsParticleData;
use crate::vector::{degrees_to_radian, direction_to_radian, radian_to_direction, Vec2};

/// Divisor applied to the gravity change when bending a rod, giving the chain lag.
pub const AIR_RESISTANCE: f32 = 5.0;

/// Jitter threshold as a fraction of the rig's normalized position maximum.
pub const MOVEMENT_THRESHOLD: f32 = 0.001;

/// Authoring frame rate the `delay` factors were tuned against.
pub const REFERENCE_FPS: f32 = 30.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub initial_position: Vec2,
    pub position: Vec2,
    pub last_position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub last_gravity: Vec2,
    pub radius: f32,
    pub mobility: f32,
    pub delay: f32,
    pub acceleration: f32,
}

/// Build a chain hanging straight down from the origin.
pub fn build_chain(data: &[PhysicsParticleData]) -> Vec<Particle> {
    let mut chain: Vec<Particle> = Vec::with_capacity(data.len());
    for (i, p) in data.iter().enumerate() {
        let initial_position = if i == 0 {
            Vec2::ZERO
        } else {
            let prev = chain[i - 1].initial_position;
            Vec2::new(prev.x, prev.y + p.radius)
        };
        chain.push(Particle {
            initial_position,
            position: initial_position,
            last_position: initial_position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            last_gravity: Vec2::new(0.0, 1.0),
            radius: p.radius,
            mobility: p.mobility,
            delay: p.delay,
            acceleration: p.acceleration,
        });
    }
    chain
}

/// One integration step of duration `dt`.
///
/// `angle` is the rig angle in degrees; gravity points along
/// `(sin angle, cos angle)`. Positions with `|x| < threshold` snap to x = 0.
pub fn update_particles(
    strand: &mut [Particle],
    translation: Vec2,
    angle: f32,
    wind: Vec2,
    threshold: f32,
    dt: f32,
) {
    let Some(first) = strand.first_mut() else {
        return;
    };
    first.position = translation;

    let gravity = radian_to_direction(degrees_to_radian(angle))
        .try_normalize()
        .unwrap_or(Vec2::new(0.0, 1.0));

    for i in 1..strand.len() {
        let prev = strand[i - 1].position;
        let p = &mut strand[i];

        p.force = gravity * p.acceleration + wind;
        p.last_position = p.position;
        let delay = p.delay * dt * REFERENCE_FPS;

        let bend = direction_to_radian(p.last_gravity, gravity) / AIR_RESISTANCE;
        let direction = (p.position - prev).rotated(bend);
        p.position = prev + direction;

        p.position += p.velocity * delay + p.force * (delay * delay);

        let rod = (p.position - prev)
            .try_normalize()
            .or_else(|| direction.try_normalize())
            .unwrap_or(Vec2::new(0.0, 1.0));
        p.position = prev + rod * p.radius;

        if p.position.x.abs() < threshold {
            p.position.x = 0.0;
        }

        if delay != 0.0 {
            p.velocity = (p.position - p.last_position) * (p.mobility / delay);
        }

        p.force = Vec2::ZERO;
        p.last_gravity = gravity;
    }
}

/// Place every particle at rest along the current force direction.
pub fn update_particles_for_stabilization(
    strand: &mut [Particle],
    translation: Vec2,
    angle: f32,
    wind: Vec2,
    threshold: f32,
) {
    let Some(first) = strand.first_mut() else {
        return;
    };
    first.position = translation;

    let gravity = radian_to_direction(degrees_to_radian(angle))
        .try_normalize()
        .unwrap_or(Vec2::new(0.0, 1.0));

    for i in 1..strand.len() {
        let prev = strand[i - 1].position;
        let p = &mut strand[i];

        p.force = gravity * p.acceleration + wind;
        p.last_position = p.position;
        p.velocity = Vec2::ZERO;

        // no force keeps the rod where it points now
        let rod = p
            .force
            .try_normalize()
            .or_else(|| (p.position - prev).try_normalize())
            .unwrap_or(Vec2::new(0.0, 1.0));
        p.position = prev + rod * p.radius;

        if p.position.x.abs() < threshold {
            p.position.x = 0.0;
        }

        p.force = Vec2::ZERO;
        p.last_gravity = gravity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Particle> {
        let p = |radius| PhysicsParticleData {
            mobility: 0.95,
            delay: 0.9,
            acceleration: 1.5,
            radius,
        };
        build_chain(&[p(0.0), p(3.0), p(2.0)])
    }

    #[test]
    fn chain_hangs_straight_down() {
        let c = chain();
        assert_eq!(c[0].initial_position, Vec2::ZERO);
        assert_eq!(c[1].initial_position, Vec2::new(0.0, 3.0));
        assert_eq!(c[2].initial_position, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn rest_chain_stays_at_rest() {
        let mut c = chain();
        let before: Vec<Vec2> = c.iter().map(|p| p.position).collect();
        for _ in 0..10 {
            update_particles(&mut c, Vec2::ZERO, 0.0, Vec2::ZERO, 0.01, 1.0 / 30.0);
        }
        for (p, b) in c.iter().zip(before) {
            assert!((p.position - b).length() < 1e-5);
        }
    }

    #[test]
    fn stabilization_follows_wind() {
        let mut c = chain();
        update_particles_for_stabilization(&mut c, Vec2::ZERO, 0.0, Vec2::new(1.5, 0.0), 0.0);
        // force = (0, 1.5) + (1.5, 0): rods point at 45 degrees
        let d = c[1].position - c[0].position;
        assert!((d.x - d.y).abs() < 1e-5);
        assert!((d.length() - 3.0).abs() < 1e-5);
        assert_eq!(c[1].velocity, Vec2::ZERO);
    }
}
