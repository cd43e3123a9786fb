//! Core types describing bodies, fixtures and shared value types.

pub mod body;
pub mod filter;
pub mod fixture;
pub mod types;

pub use body::Body;
pub use filter::Filter;
pub use fixture::{Fixture, FixtureDef, FixtureProxy};
pub use types::{MassData, Rot, Transform};
