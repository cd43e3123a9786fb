use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rotation stored as sine/cosine pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rot {
    pub s: f32,
    pub c: f32,
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot {
    pub const IDENTITY: Rot = Rot { s: 0.0, c: 1.0 };

    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { s, c }
    }

    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotates `v` by this rotation.
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotates `v` by the inverse of this rotation.
    pub fn mul_t_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }
}

/// Translation and rotation of a body frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub p: Vec2,
    pub q: Rot,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        p: Vec2::ZERO,
        q: Rot::IDENTITY,
    };

    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            p: position,
            q: Rot::from_angle(angle),
        }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            p: position,
            q: Rot::IDENTITY,
        }
    }

    /// Maps a local point into the parent frame.
    pub fn apply(&self, v: Vec2) -> Vec2 {
        self.q.mul_vec(v) + self.p
    }

    /// Maps a parent-frame point into local coordinates.
    pub fn apply_inverse(&self, v: Vec2) -> Vec2 {
        self.q.mul_t_vec(v - self.p)
    }
}

/// Mass, centroid and rotational inertia of a shape.
///
/// `inertia` is measured about the shape origin, not the centroid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MassData {
    pub mass: f32,
    pub center: Vec2,
    pub inertia: f32,
}
