//! Collision geometry attached to bodies through fixtures.
//!
//! [`Shape`] dispatches the capability contract a fixture relies on: child
//! count, per-child bounds, mass, point containment, ray casts and signed
//! distance. Single-child shapes ignore the child index.

pub mod chain;
pub mod circle;
pub mod edge;
pub mod polygon;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use chain::ChainShape;
pub use circle::CircleShape;
pub use edge::EdgeShape;
pub use polygon::PolygonShape;

use crate::{
    collision::{
        aabb::Aabb,
        queries::{RayCastInput, RayCastOutput},
    },
    core::types::{MassData, Transform},
};

/// Tag identifying the concrete geometry of a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Circle,
    Edge,
    Polygon,
    Chain,
}

/// Enumeration of supported collision geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(CircleShape),
    Polygon(PolygonShape),
    Edge(EdgeShape),
    Chain(ChainShape),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Polygon(_) => ShapeType::Polygon,
            Shape::Edge(_) => ShapeType::Edge,
            Shape::Chain(_) => ShapeType::Chain,
        }
    }

    /// Number of independently bounded children.
    pub fn child_count(&self) -> usize {
        match self {
            Shape::Chain(chain) => chain.child_count(),
            _ => 1,
        }
    }

    /// Skin radius for polygonal shapes, the radius itself for circles.
    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle(circle) => circle.radius(),
            Shape::Polygon(polygon) => polygon.radius(),
            Shape::Edge(edge) => edge.radius(),
            Shape::Chain(chain) => chain.child_edge(0).radius(),
        }
    }

    /// Whether the shape encloses an area, which point containment needs.
    pub fn is_convex(&self) -> bool {
        matches!(self, Shape::Circle(_) | Shape::Polygon(_))
    }

    /// Bounds of child `child_index` under `xf`.
    ///
    /// # Panics
    /// Panics for a chain when `child_index >= child_count()`.
    pub fn compute_aabb(&self, xf: &Transform, child_index: usize) -> Aabb {
        match self {
            Shape::Circle(circle) => circle.compute_aabb(xf),
            Shape::Polygon(polygon) => polygon.compute_aabb(xf),
            Shape::Edge(edge) => edge.compute_aabb(xf),
            Shape::Chain(chain) => chain.compute_aabb(xf, child_index),
        }
    }

    pub fn compute_mass(&self, density: f32) -> MassData {
        match self {
            Shape::Circle(circle) => circle.compute_mass(density),
            Shape::Polygon(polygon) => polygon.compute_mass(density),
            Shape::Edge(edge) => edge.compute_mass(),
            Shape::Chain(chain) => chain.compute_mass(),
        }
    }

    /// World-space point containment. Shapes without an interior never
    /// contain a point.
    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        match self {
            Shape::Circle(circle) => circle.test_point(xf, p),
            Shape::Polygon(polygon) => polygon.test_point(xf, p),
            Shape::Edge(_) | Shape::Chain(_) => false,
        }
    }

    pub fn raycast(
        &self,
        input: &RayCastInput,
        xf: &Transform,
        child_index: usize,
    ) -> Option<RayCastOutput> {
        match self {
            Shape::Circle(circle) => circle.raycast(input, xf),
            Shape::Polygon(polygon) => polygon.raycast(input, xf),
            Shape::Edge(edge) => edge.raycast(input, xf),
            Shape::Chain(chain) => chain.raycast(input, xf, child_index),
        }
    }

    /// Signed distance from `p` to child `child_index` and the outward
    /// direction at the closest feature.
    pub fn compute_distance_to(&self, xf: &Transform, p: Vec2, child_index: usize) -> (f32, Vec2) {
        match self {
            Shape::Circle(circle) => circle.compute_distance_to(xf, p),
            Shape::Polygon(polygon) => polygon.compute_distance_to(xf, p),
            Shape::Edge(edge) => edge.compute_distance_to(xf, p),
            Shape::Chain(chain) => chain.compute_distance_to(xf, p, child_index),
        }
    }
}

impl From<CircleShape> for Shape {
    fn from(shape: CircleShape) -> Self {
        Shape::Circle(shape)
    }
}

impl From<PolygonShape> for Shape {
    fn from(shape: PolygonShape) -> Self {
        Shape::Polygon(shape)
    }
}

impl From<EdgeShape> for Shape {
    fn from(shape: EdgeShape) -> Self {
        Shape::Edge(shape)
    }
}

impl From<ChainShape> for Shape {
    fn from(shape: ChainShape) -> Self {
        Shape::Chain(shape)
    }
}
