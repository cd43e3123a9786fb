//! Fixture2D – fixtures, broad-phase proxies and contact filtering for 2D
//! rigid bodies.
//!
//! A [`Fixture`] binds a [`Shape`] to a [`Body`] together with material and
//! [`Filter`] data. Each shape child is registered in a [`BroadPhase`] as a
//! proxy whose bounds follow the body through
//! [`synchronize`](Fixture::synchronize). Filter changes never remove
//! contacts directly; they flag them, and the next
//! [`World::collide`] pass decides.

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    aabb::Aabb,
    broadphase::{BroadPhase, ProxyId, ProxyKey, TreeBroadPhase},
    dynamic_tree::DynamicTree,
    contact::{Contact, ContactEdge, ContactFlags},
    queries::{RayCastInput, RayCastOutput, RaycastHit},
    shapes::{ChainShape, CircleShape, EdgeShape, PolygonShape, Shape, ShapeType},
};
pub use config::Settings;
pub use core::{
    body::Body,
    filter::Filter,
    fixture::{Fixture, FixtureDef, FixtureProxy},
    types::{MassData, Rot, Transform},
};
pub use error::{QueryError, ShapeError};
pub use utils::allocator::{Arena, BodyId, ContactId, FixtureId, GenerationalId};
pub use world::{ContactManager, World};
