use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::queries::RayCastInput;

/// Axis-aligned bounding box used by shapes, proxies and the broad-phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub lower_bound: Vec2,
    pub upper_bound: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            lower_bound: Vec2::ZERO,
            upper_bound: Vec2::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(lower_bound: Vec2, upper_bound: Vec2) -> Self {
        Self {
            lower_bound,
            upper_bound,
        }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self::new(a.min(b), b.max(a))
    }

    /// Lower bound is below the upper bound and both are finite.
    pub fn is_valid(&self) -> bool {
        let d = self.upper_bound - self.lower_bound;
        d.x >= 0.0 && d.y >= 0.0 && self.lower_bound.is_finite() && self.upper_bound.is_finite()
    }

    pub fn center(&self) -> Vec2 {
        (self.lower_bound + self.upper_bound) * 0.5
    }

    pub fn extents(&self) -> Vec2 {
        (self.upper_bound - self.lower_bound) * 0.5
    }

    pub fn perimeter(&self) -> f32 {
        let d = self.upper_bound - self.lower_bound;
        2.0 * (d.x + d.y)
    }

    /// Axis-wise union of two boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            lower_bound: self.lower_bound.min(other.lower_bound),
            upper_bound: self.upper_bound.max(other.upper_bound),
        }
    }

    pub fn extended(&self, margin: f32) -> Aabb {
        let r = Vec2::splat(margin);
        Aabb {
            lower_bound: self.lower_bound - r,
            upper_bound: self.upper_bound + r,
        }
    }

    /// Returns `true` if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.lower_bound.x <= other.lower_bound.x
            && self.lower_bound.y <= other.lower_bound.y
            && other.upper_bound.x <= self.upper_bound.x
            && other.upper_bound.y <= self.upper_bound.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.lower_bound.x
            && p.y >= self.lower_bound.y
            && p.x <= self.upper_bound.x
            && p.y <= self.upper_bound.y
    }

    /// Inclusive overlap test: touching faces count as overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(other.lower_bound.x > self.upper_bound.x
            || other.lower_bound.y > self.upper_bound.y
            || self.lower_bound.x > other.upper_bound.x
            || self.lower_bound.y > other.upper_bound.y)
    }

    /// Slab test of the input segment against the box. Returns the entry
    /// fraction along `p1 -> p2`.
    pub fn raycast(&self, input: &RayCastInput) -> Option<f32> {
        let d = input.p2 - input.p1;
        let mut t_min = f32::MIN;
        let mut t_max = f32::MAX;

        for i in 0..2 {
            let origin = input.p1[i];
            let dir = d[i];
            let min = self.lower_bound[i];
            let max = self.upper_bound[i];

            if dir.abs() < f32::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
            } else {
                let inv_d = 1.0 / dir;
                let mut t1 = (min - origin) * inv_d;
                let mut t2 = (max - origin) * inv_d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_max < 0.0 {
            return None;
        }
        let t_min = t_min.max(0.0);
        if t_min > input.max_fraction {
            return None;
        }
        Some(t_min)
    }
}
