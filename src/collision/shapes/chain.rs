use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::edge::EdgeShape;
use crate::{
    collision::{
        aabb::Aabb,
        queries::{RayCastInput, RayCastOutput},
    },
    config::LINEAR_SLOP,
    core::types::{MassData, Transform},
    error::ShapeError,
};

/// Free-form sequence of line segments. Each segment is one child, so a
/// fixture holding a chain registers one broad-phase proxy per segment.
///
/// Chains have no interior and no mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainShape {
    vertices: Vec<Vec2>,
    is_loop: bool,
    prev_vertex: Option<Vec2>,
    next_vertex: Option<Vec2>,
}

impl ChainShape {
    /// Open chain through `vertices`.
    pub fn new_chain(vertices: &[Vec2]) -> Result<Self, ShapeError> {
        validate(vertices, 2)?;
        Ok(Self {
            vertices: vertices.to_vec(),
            is_loop: false,
            prev_vertex: None,
            next_vertex: None,
        })
    }

    /// Closed loop through `vertices`; the closing segment is added
    /// automatically.
    pub fn new_loop(vertices: &[Vec2]) -> Result<Self, ShapeError> {
        validate(vertices, 3)?;
        let mut closed = vertices.to_vec();
        closed.push(vertices[0]);
        let count = closed.len();
        Ok(Self {
            prev_vertex: Some(closed[count - 2]),
            next_vertex: Some(closed[1]),
            vertices: closed,
            is_loop: true,
        })
    }

    /// Sets the ghost vertices used to smooth collisions at the open ends.
    pub fn with_adjacent_vertices(mut self, prev: Option<Vec2>, next: Option<Vec2>) -> Self {
        if !self.is_loop {
            self.prev_vertex = prev;
            self.next_vertex = next;
        }
        self
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    pub fn child_count(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Segment `index` as a standalone edge with its neighbours as ghost
    /// vertices.
    ///
    /// # Panics
    /// Panics if `index >= child_count()`.
    pub fn child_edge(&self, index: usize) -> EdgeShape {
        assert!(
            index < self.child_count(),
            "chain child {index} out of range ({})",
            self.child_count()
        );
        let v0 = if index > 0 {
            Some(self.vertices[index - 1])
        } else {
            self.prev_vertex
        };
        let v3 = if index + 2 < self.vertices.len() {
            Some(self.vertices[index + 2])
        } else {
            self.next_vertex
        };
        EdgeShape::from_segment(self.vertices[index], self.vertices[index + 1], v0, v3)
    }

    pub fn compute_aabb(&self, xf: &Transform, child_index: usize) -> Aabb {
        self.child_edge(child_index).compute_aabb(xf)
    }

    pub fn compute_mass(&self) -> MassData {
        MassData::default()
    }

    pub fn raycast(
        &self,
        input: &RayCastInput,
        xf: &Transform,
        child_index: usize,
    ) -> Option<RayCastOutput> {
        self.child_edge(child_index).raycast(input, xf)
    }

    pub fn compute_distance_to(&self, xf: &Transform, p: Vec2, child_index: usize) -> (f32, Vec2) {
        self.child_edge(child_index).compute_distance_to(xf, p)
    }
}

fn validate(vertices: &[Vec2], required: usize) -> Result<(), ShapeError> {
    if vertices.len() < required {
        return Err(ShapeError::TooFewVertices {
            kind: "chain",
            required,
            actual: vertices.len(),
        });
    }
    for (index, pair) in vertices.windows(2).enumerate() {
        if pair[0].distance_squared(pair[1]) <= LINEAR_SLOP * LINEAR_SLOP {
            return Err(ShapeError::CoincidentChainVertices {
                index,
                next: index + 1,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 1.0),
        ]
    }

    #[test]
    fn open_chain_has_one_child_per_segment() {
        let chain = ChainShape::new_chain(&zigzag()).unwrap();
        assert_eq!(chain.child_count(), 3);

        let middle = chain.child_edge(1);
        assert_eq!(middle.vertices(), (Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0)));
        assert_eq!(
            middle.ghost_vertices(),
            (Some(Vec2::new(0.0, 0.0)), Some(Vec2::new(3.0, 1.0)))
        );
        assert_eq!(chain.child_edge(0).ghost_vertices().0, None);
    }

    #[test]
    fn loop_closes_back_to_start() {
        let chain = ChainShape::new_loop(&zigzag()).unwrap();
        assert_eq!(chain.child_count(), 4);
        let closing = chain.child_edge(3);
        assert_eq!(closing.vertices(), (Vec2::new(3.0, 1.0), Vec2::new(0.0, 0.0)));
        assert_eq!(closing.ghost_vertices().1, Some(Vec2::new(1.0, 1.0)));
        assert_eq!(chain.child_edge(0).ghost_vertices().0, Some(Vec2::new(3.0, 1.0)));
    }

    #[test]
    fn rejects_coincident_vertices() {
        let points = [Vec2::ZERO, Vec2::ZERO, Vec2::ONE];
        assert_eq!(
            ChainShape::new_chain(&points),
            Err(ShapeError::CoincidentChainVertices { index: 0, next: 1 })
        );
    }
}
