//! Error types for recoverable shape and query failures.
//!
//! Broken lifecycle invariants (creating proxies twice, tearing down a
//! fixture with live proxies, negative density) are programming errors and
//! panic at the call site instead of surfacing here.

use thiserror::Error;

use crate::collision::shapes::ShapeType;

/// Errors raised while building shape geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Fewer points than the shape kind needs.
    #[error("{kind} needs at least {required} vertices, got {actual}")]
    TooFewVertices {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    /// More points than a convex polygon can hold.
    #[error("polygon supports at most {max} vertices, got {actual}")]
    TooManyVertices { max: usize, actual: usize },

    /// Points are collinear or coincident and do not span an area.
    #[error("polygon hull is degenerate")]
    DegenerateHull,

    /// Edge endpoints are closer than the linear slop.
    #[error("edge endpoints are too close")]
    DegenerateEdge,

    /// Two consecutive chain vertices are too close together.
    #[error("chain vertices {index} and {next} are too close")]
    CoincidentChainVertices { index: usize, next: usize },

    /// Radius or half extent was zero, negative or not finite.
    #[error("invalid extent {0}")]
    InvalidExtent(f32),
}

/// Errors raised by fixture and world queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Point containment was requested on a shape without an interior.
    #[error("point containment is not supported for {0:?} shapes")]
    NonConvexShape(ShapeType),

    /// Child index is not in `[0, child_count)`.
    #[error("child index {index} out of range (child count {child_count})")]
    ChildIndexOutOfRange { index: usize, child_count: usize },

    /// The handle does not refer to a live body.
    #[error("unknown body handle")]
    UnknownBody,

    /// The handle does not refer to a live fixture.
    #[error("unknown fixture handle")]
    UnknownFixture,
}
