use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{
        aabb::Aabb,
        queries::{RayCastInput, RayCastOutput},
    },
    core::types::{MassData, Transform},
    error::ShapeError,
};

/// Solid circle with an optional local offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    position: Vec2,
    radius: f32,
}

impl CircleShape {
    pub fn new(radius: f32) -> Result<Self, ShapeError> {
        Self::with_position(radius, Vec2::ZERO)
    }

    pub fn with_position(radius: f32, position: Vec2) -> Result<Self, ShapeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ShapeError::InvalidExtent(radius));
        }
        Ok(Self { position, radius })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let p = xf.apply(self.position);
        Aabb::from_center_half_extents(p, Vec2::splat(self.radius))
    }

    pub fn compute_mass(&self, density: f32) -> MassData {
        let mass = density * PI * self.radius * self.radius;
        MassData {
            mass,
            center: self.position,
            inertia: mass * (0.5 * self.radius * self.radius + self.position.dot(self.position)),
        }
    }

    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        let center = xf.apply(self.position);
        (p - center).length_squared() <= self.radius * self.radius
    }

    pub fn raycast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        let position = xf.apply(self.position);
        let s = input.p1 - position;
        let b = s.dot(s) - self.radius * self.radius;

        // Solve for the entering root of |s + t r| = radius.
        let r = input.p2 - input.p1;
        let c = s.dot(r);
        let rr = r.dot(r);
        let sigma = c * c - rr * b;

        if sigma < 0.0 || rr < f32::EPSILON {
            return None;
        }

        let a = -(c + sigma.sqrt());
        if 0.0 <= a && a <= input.max_fraction * rr {
            let fraction = a / rr;
            Some(RayCastOutput {
                normal: (s + r * fraction).normalize_or_zero(),
                fraction,
            })
        } else {
            None
        }
    }

    pub fn compute_distance_to(&self, xf: &Transform, p: Vec2) -> (f32, Vec2) {
        let d = p - xf.apply(self.position);
        (d.length() - self.radius, d.normalize_or_zero())
    }
}
