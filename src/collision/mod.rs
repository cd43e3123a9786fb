//! Collision primitives: bounding boxes, shapes, the broad-phase contract
//! and contacts.

pub mod aabb;
pub mod broadphase;
pub mod contact;
pub mod dynamic_tree;
pub mod queries;
pub mod shapes;

pub use aabb::Aabb;
pub use broadphase::{BroadPhase, ProxyId, ProxyKey, TreeBroadPhase};
pub use dynamic_tree::DynamicTree;
pub use contact::{Contact, ContactEdge, ContactFlags};
pub use queries::{RayCastInput, RayCastOutput, RaycastHit};
pub use shapes::{ChainShape, CircleShape, EdgeShape, PolygonShape, Shape, ShapeType};
