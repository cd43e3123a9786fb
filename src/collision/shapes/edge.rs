use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{
        aabb::Aabb,
        queries::{RayCastInput, RayCastOutput},
    },
    config::{LINEAR_SLOP, POLYGON_RADIUS},
    core::types::{MassData, Transform},
    error::ShapeError,
    utils::math::{closest_point_on_segment, cross_vs},
};

/// Line segment. The optional ghost vertices describe the neighbouring
/// segments when the edge is part of a chain, for smooth collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeShape {
    vertex1: Vec2,
    vertex2: Vec2,
    vertex0: Option<Vec2>,
    vertex3: Option<Vec2>,
    radius: f32,
}

impl EdgeShape {
    pub fn new(v1: Vec2, v2: Vec2) -> Result<Self, ShapeError> {
        if v1.distance_squared(v2) <= LINEAR_SLOP * LINEAR_SLOP {
            return Err(ShapeError::DegenerateEdge);
        }
        Ok(Self::from_segment(v1, v2, None, None))
    }

    pub(crate) fn from_segment(v1: Vec2, v2: Vec2, v0: Option<Vec2>, v3: Option<Vec2>) -> Self {
        Self {
            vertex1: v1,
            vertex2: v2,
            vertex0: v0,
            vertex3: v3,
            radius: POLYGON_RADIUS,
        }
    }

    pub fn with_ghost_vertices(mut self, v0: Option<Vec2>, v3: Option<Vec2>) -> Self {
        self.vertex0 = v0;
        self.vertex3 = v3;
        self
    }

    pub fn vertices(&self) -> (Vec2, Vec2) {
        (self.vertex1, self.vertex2)
    }

    pub fn ghost_vertices(&self) -> (Option<Vec2>, Option<Vec2>) {
        (self.vertex0, self.vertex3)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let v1 = xf.apply(self.vertex1);
        let v2 = xf.apply(self.vertex2);
        Aabb::from_points(v1, v2).extended(self.radius)
    }

    pub fn compute_mass(&self) -> MassData {
        MassData {
            mass: 0.0,
            center: (self.vertex1 + self.vertex2) * 0.5,
            inertia: 0.0,
        }
    }

    /// Two-sided segment test in the edge's local frame.
    pub fn raycast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        let p1 = xf.apply_inverse(input.p1);
        let p2 = xf.apply_inverse(input.p2);
        let d = p2 - p1;

        let e = self.vertex2 - self.vertex1;
        let normal = cross_vs(e, 1.0).normalize_or_zero();

        let numerator = normal.dot(self.vertex1 - p1);
        let denominator = normal.dot(d);
        if denominator == 0.0 {
            return None;
        }

        let t = numerator / denominator;
        if t < 0.0 || input.max_fraction < t {
            return None;
        }

        let q = p1 + d * t;
        let rr = e.length_squared();
        if rr == 0.0 {
            return None;
        }
        let s = (q - self.vertex1).dot(e) / rr;
        if !(0.0..=1.0).contains(&s) {
            return None;
        }

        let facing = if numerator > 0.0 { -normal } else { normal };
        Some(RayCastOutput {
            normal: xf.q.mul_vec(facing),
            fraction: t,
        })
    }

    pub fn compute_distance_to(&self, xf: &Transform, p: Vec2) -> (f32, Vec2) {
        let v1 = xf.apply(self.vertex1);
        let v2 = xf.apply(self.vertex2);
        let delta = p - closest_point_on_segment(v1, v2, p);
        (delta.length(), delta.normalize_or_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn coincident_endpoints_are_rejected() {
        let p = Vec2::new(1.0, 2.0);
        assert_eq!(EdgeShape::new(p, p), Err(ShapeError::DegenerateEdge));
        assert_eq!(
            EdgeShape::new(p, p + Vec2::splat(LINEAR_SLOP * 0.5)),
            Err(ShapeError::DegenerateEdge)
        );
        assert!(EdgeShape::new(p, p + Vec2::X).is_ok());
    }

    #[test]
    fn raycast_hits_either_side() {
        let edge = EdgeShape::new(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)).unwrap();
        let xf = Transform::IDENTITY;

        let down = RayCastInput::new(Vec2::new(0.0, 2.0), Vec2::new(0.0, -2.0), 1.0);
        let hit = edge.raycast(&down, &xf).expect("crosses from above");
        assert_relative_eq!(hit.fraction, 0.5, epsilon = 1e-6);
        assert_eq!(hit.normal, Vec2::Y);

        let up = RayCastInput::new(Vec2::new(0.5, -2.0), Vec2::new(0.5, 2.0), 1.0);
        let hit = edge.raycast(&up, &xf).expect("crosses from below");
        assert_eq!(hit.normal, Vec2::NEG_Y);

        let wide = RayCastInput::new(Vec2::new(3.0, 2.0), Vec2::new(3.0, -2.0), 1.0);
        assert!(edge.raycast(&wide, &xf).is_none());
    }

    #[test]
    fn distance_measures_to_nearest_endpoint() {
        let edge = EdgeShape::new(Vec2::ZERO, Vec2::new(2.0, 0.0)).unwrap();
        let (distance, normal) =
            edge.compute_distance_to(&Transform::IDENTITY, Vec2::new(5.0, 4.0));
        assert_relative_eq!(distance, 5.0, epsilon = 1e-5);
        assert_relative_eq!(normal.x, 0.6, epsilon = 1e-5);
    }

    #[test]
    fn edges_have_no_mass() {
        let edge = EdgeShape::new(Vec2::ZERO, Vec2::new(2.0, 0.0)).unwrap();
        let mass = edge.compute_mass();
        assert_eq!(mass.mass, 0.0);
        assert_eq!(mass.center, Vec2::new(1.0, 0.0));
    }
}
