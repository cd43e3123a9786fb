//! Global configuration constants for the Fixture2D engine.

use serde::{Deserialize, Serialize};

/// Collision and constraint tolerance (in meters).
pub const LINEAR_SLOP: f32 = 0.005;

/// Skin radius wrapped around polygons so that resting polygons keep a gap.
pub const POLYGON_RADIUS: f32 = 2.0 * LINEAR_SLOP;

/// Maximum number of vertices on a convex polygon.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Margin added to every broad-phase proxy so that small motions do not
/// trigger a re-insertion.
pub const AABB_EXTENSION: f32 = 0.1;

/// Scales the displacement used to predict a proxy's next position.
pub const AABB_MULTIPLIER: f32 = 2.0;

/// Tunables shared by the world and its broad-phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aabb_extension: f32,
    pub aabb_multiplier: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aabb_extension: AABB_EXTENSION,
            aabb_multiplier: AABB_MULTIPLIER,
        }
    }
}
