use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::utils::allocator::FixtureId;

/// Ray-cast input: the segment `p1 -> p1 + max_fraction * (p2 - p1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayCastInput {
    pub p1: Vec2,
    pub p2: Vec2,
    pub max_fraction: f32,
}

impl RayCastInput {
    pub fn new(p1: Vec2, p2: Vec2, max_fraction: f32) -> Self {
        Self {
            p1,
            p2,
            max_fraction,
        }
    }

    /// Point at `fraction` along the ray.
    pub fn point_at(&self, fraction: f32) -> Vec2 {
        self.p1 + (self.p2 - self.p1) * fraction
    }
}

/// Ray-cast hit against a single shape child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayCastOutput {
    pub normal: Vec2,
    pub fraction: f32,
}

/// Ray-cast hit reported by a world query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub fixture: FixtureId,
    pub child_index: usize,
    pub point: Vec2,
    pub normal: Vec2,
    pub fraction: f32,
}
