use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{
        aabb::Aabb,
        queries::{RayCastInput, RayCastOutput},
    },
    config::{LINEAR_SLOP, MAX_POLYGON_VERTICES, POLYGON_RADIUS},
    core::types::{MassData, Transform},
    error::ShapeError,
    utils::math::{closest_point_on_segment, cross_vs},
};

/// Solid convex polygon with counter-clockwise winding.
///
/// Geometry is derived once at construction; the vertex, normal and centroid
/// arrays stay consistent because nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    centroid: Vec2,
    radius: f32,
}

impl PolygonShape {
    /// Axis-aligned box centered on the shape origin.
    pub fn new_box(hx: f32, hy: f32) -> Result<Self, ShapeError> {
        Self::new_oriented_box(hx, hy, Vec2::ZERO, 0.0)
    }

    /// Box with half extents `hx`, `hy`, placed at `center` and rotated by
    /// `angle` in the shape frame.
    pub fn new_oriented_box(
        hx: f32,
        hy: f32,
        center: Vec2,
        angle: f32,
    ) -> Result<Self, ShapeError> {
        for extent in [hx, hy] {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(ShapeError::InvalidExtent(extent));
            }
        }

        let xf = Transform::new(center, angle);
        let local = [
            Vec2::new(-hx, -hy),
            Vec2::new(hx, -hy),
            Vec2::new(hx, hy),
            Vec2::new(-hx, hy),
        ];
        let local_normals = [Vec2::NEG_Y, Vec2::X, Vec2::Y, Vec2::NEG_X];

        Ok(Self {
            vertices: local.iter().map(|&v| xf.apply(v)).collect(),
            normals: local_normals.iter().map(|&n| xf.q.mul_vec(n)).collect(),
            centroid: center,
            radius: POLYGON_RADIUS,
        })
    }

    /// Builds the convex hull of `points`. Points closer than half the linear
    /// slop are welded and collinear points are dropped.
    pub fn from_points(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices {
                kind: "polygon",
                required: 3,
                actual: points.len(),
            });
        }
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(ShapeError::TooManyVertices {
                max: MAX_POLYGON_VERTICES,
                actual: points.len(),
            });
        }

        let weld_sq = (0.5 * LINEAR_SLOP) * (0.5 * LINEAR_SLOP);
        let mut unique: Vec<Vec2> = Vec::with_capacity(points.len());
        for &p in points {
            if unique.iter().all(|q| q.distance_squared(p) >= weld_sq) {
                unique.push(p);
            }
        }
        if unique.len() < points.len() {
            log::warn!(
                "polygon welded {} coincident vertices",
                points.len() - unique.len()
            );
        }
        if unique.len() < 3 {
            return Err(ShapeError::DegenerateHull);
        }

        let hull = gift_wrap(&unique);
        if hull.len() < 3 {
            return Err(ShapeError::DegenerateHull);
        }

        let normals: Vec<Vec2> = (0..hull.len())
            .map(|i| {
                let edge = hull[(i + 1) % hull.len()] - hull[i];
                cross_vs(edge, 1.0).normalize_or_zero()
            })
            .collect();
        if normals.iter().any(|n| *n == Vec2::ZERO) {
            return Err(ShapeError::DegenerateHull);
        }

        let centroid = compute_centroid(&hull).ok_or(ShapeError::DegenerateHull)?;

        Ok(Self {
            vertices: hull,
            normals,
            centroid,
            radius: POLYGON_RADIUS,
        })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let first = xf.apply(self.vertices[0]);
        let (lower, upper) = self.vertices[1..]
            .iter()
            .map(|&v| xf.apply(v))
            .fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Aabb::new(lower, upper).extended(self.radius)
    }

    /// Triangle-fan integration around the first vertex, which keeps the
    /// products small for polygons far from the origin.
    pub fn compute_mass(&self, density: f32) -> MassData {
        const INV3: f32 = 1.0 / 3.0;

        let s = self.vertices[0];
        let mut center = Vec2::ZERO;
        let mut area = 0.0;
        let mut inertia = 0.0;

        for i in 0..self.vertices.len() {
            let e1 = self.vertices[i] - s;
            let e2 = self.vertices[(i + 1) % self.vertices.len()] - s;
            let d = e1.perp_dot(e2);

            let triangle_area = 0.5 * d;
            area += triangle_area;
            center += (e1 + e2) * (triangle_area * INV3);

            let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            inertia += (0.25 * INV3 * d) * (intx2 + inty2);
        }

        let mass = density * area;
        let center = if area > f32::EPSILON { center / area } else { Vec2::ZERO };
        let world_center = center + s;

        MassData {
            mass,
            center: world_center,
            // Shift from the reference vertex to the shape origin.
            inertia: density * inertia
                + mass * (world_center.dot(world_center) - center.dot(center)),
        }
    }

    pub fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        let local = xf.apply_inverse(p);
        self.vertices
            .iter()
            .zip(&self.normals)
            .all(|(&v, &n)| n.dot(local - v) <= 0.0)
    }

    pub fn raycast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        let p1 = xf.apply_inverse(input.p1);
        let p2 = xf.apply_inverse(input.p2);
        let d = p2 - p1;

        let mut lower = 0.0;
        let mut upper = input.max_fraction;
        let mut index = None;

        for (i, (&v, &n)) in self.vertices.iter().zip(&self.normals).enumerate() {
            // p = p1 + t * d, plane n . (p - v) = 0
            let numerator = n.dot(v - p1);
            let denominator = n.dot(d);

            if denominator == 0.0 {
                if numerator < 0.0 {
                    return None;
                }
            } else if denominator < 0.0 && numerator < lower * denominator {
                lower = numerator / denominator;
                index = Some(i);
            } else if denominator > 0.0 && numerator < upper * denominator {
                upper = numerator / denominator;
            }

            if upper < lower {
                return None;
            }
        }

        index.map(|i| RayCastOutput {
            normal: xf.q.mul_vec(self.normals[i]),
            fraction: lower,
        })
    }

    /// Signed distance: maximum face separation inside, distance to the
    /// closest boundary point outside.
    pub fn compute_distance_to(&self, xf: &Transform, p: Vec2) -> (f32, Vec2) {
        let local = xf.apply_inverse(p);

        let (best_face, max_separation) = self
            .vertices
            .iter()
            .zip(&self.normals)
            .map(|(&v, &n)| n.dot(local - v))
            .enumerate()
            .fold((0, f32::MIN), |best, (i, sep)| if sep > best.1 { (i, sep) } else { best });

        if max_separation <= 0.0 {
            return (max_separation, xf.q.mul_vec(self.normals[best_face]));
        }

        let count = self.vertices.len();
        let closest = (0..count)
            .map(|i| {
                closest_point_on_segment(self.vertices[i], self.vertices[(i + 1) % count], local)
            })
            .min_by(|a, b| a.distance_squared(local).total_cmp(&b.distance_squared(local)))
            .unwrap_or(self.vertices[best_face]);

        let delta = local - closest;
        (delta.length(), xf.q.mul_vec(delta.normalize_or_zero()))
    }
}

/// Gift-wrapping hull in counter-clockwise order, starting from the
/// right-most (then lowest) point. Collinear points are skipped.
fn gift_wrap(points: &[Vec2]) -> Vec<Vec2> {
    let start = points
        .iter()
        .enumerate()
        .fold(0, |best, (i, p)| {
            let b = points[best];
            if p.x > b.x || (p.x == b.x && p.y < b.y) {
                i
            } else {
                best
            }
        });

    let mut hull = Vec::with_capacity(points.len());
    let mut current = start;

    loop {
        hull.push(current);
        if hull.len() > points.len() {
            break;
        }

        let mut candidate = 0;
        for j in 1..points.len() {
            if candidate == current {
                candidate = j;
                continue;
            }
            let r = points[candidate] - points[current];
            let v = points[j] - points[current];
            let c = r.perp_dot(v);
            if c < 0.0 || (c == 0.0 && v.length_squared() > r.length_squared()) {
                candidate = j;
            }
        }

        current = candidate;
        if current == start {
            break;
        }
    }

    hull.into_iter().map(|i| points[i]).collect()
}

fn compute_centroid(vertices: &[Vec2]) -> Option<Vec2> {
    const INV3: f32 = 1.0 / 3.0;

    let reference = vertices[0];
    let mut center = Vec2::ZERO;
    let mut area = 0.0;

    for i in 0..vertices.len() {
        let e1 = vertices[i] - reference;
        let e2 = vertices[(i + 1) % vertices.len()] - reference;
        let triangle_area = 0.5 * e1.perp_dot(e2);
        area += triangle_area;
        center += (e1 + e2) * (triangle_area * INV3);
    }

    if area <= f32::EPSILON {
        return None;
    }
    Some(center / area + reference)
}
