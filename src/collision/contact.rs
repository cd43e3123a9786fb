use bitflags::bitflags;

use crate::utils::allocator::{BodyId, ContactId, FixtureId};

bitflags! {
    /// State bits carried by a contact between pipeline phases.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContactFlags: u8 {
        /// Filter data changed; the pair must be re-checked before the next
        /// collide pass.
        const FILTER = 1 << 0;
        /// The contact participates in resolution.
        const ENABLED = 1 << 1;
        /// The swept bounds of both children overlap.
        const TOUCHING = 1 << 2;
    }
}

/// Potential collision between one child of each of two fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub fixture_a: FixtureId,
    pub child_a: usize,
    pub fixture_b: FixtureId,
    pub child_b: usize,
    pub body_a: BodyId,
    pub body_b: BodyId,
    flags: ContactFlags,
}

impl Contact {
    pub fn new(
        (fixture_a, child_a, body_a): (FixtureId, usize, BodyId),
        (fixture_b, child_b, body_b): (FixtureId, usize, BodyId),
    ) -> Self {
        Self {
            fixture_a,
            child_a,
            fixture_b,
            child_b,
            body_a,
            body_b,
            flags: ContactFlags::ENABLED,
        }
    }

    pub fn flags(&self) -> ContactFlags {
        self.flags
    }

    /// Marks the contact for deferred filter re-evaluation. The contact is
    /// not removed here; the collide phase consumes the flag.
    pub fn flag_for_filtering(&mut self) {
        self.flags.insert(ContactFlags::FILTER);
    }

    pub fn needs_filtering(&self) -> bool {
        self.flags.contains(ContactFlags::FILTER)
    }

    pub fn clear_filter_flag(&mut self) {
        self.flags.remove(ContactFlags::FILTER);
    }

    pub fn set_touching(&mut self, touching: bool) {
        self.flags.set(ContactFlags::TOUCHING, touching);
    }

    pub fn is_touching(&self) -> bool {
        self.flags.contains(ContactFlags::TOUCHING)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(ContactFlags::ENABLED, enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ContactFlags::ENABLED)
    }

    /// Returns `true` if `fixture` is either side of the contact.
    pub fn involves(&self, fixture: FixtureId) -> bool {
        self.fixture_a == fixture || self.fixture_b == fixture
    }

    /// Same fixture children, regardless of order.
    pub fn matches(&self, a: (FixtureId, usize), b: (FixtureId, usize)) -> bool {
        let this_a = (self.fixture_a, self.child_a);
        let this_b = (self.fixture_b, self.child_b);
        (this_a == a && this_b == b) || (this_a == b && this_b == a)
    }
}

/// Entry in a body's contact list, pointing at the contact and the body on
/// the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEdge {
    pub other: BodyId,
    pub contact: ContactId,
}
