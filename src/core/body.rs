use crate::{
    collision::contact::ContactEdge,
    utils::allocator::{BodyId, ContactId, FixtureId},
};

use super::types::{MassData, Transform};

/// Rigid body frame owning a set of fixtures and a contact list.
///
/// The world moves bodies; fixtures only read the transform, wake the body
/// and walk its contact edges.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    transform: Transform,
    prev_transform: Transform,
    awake: bool,
    active: bool,
    fixtures: Vec<FixtureId>,
    contact_edges: Vec<ContactEdge>,
    mass_data: MassData,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(BodyId::default(), Transform::IDENTITY)
    }
}

impl Body {
    pub fn new(id: BodyId, transform: Transform) -> Self {
        Self {
            id,
            transform,
            prev_transform: transform,
            awake: true,
            active: true,
            fixtures: Vec::new(),
            contact_edges: Vec::new(),
            mass_data: MassData::default(),
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Pose at the start of the last motion step.
    pub fn prev_transform(&self) -> &Transform {
        &self.prev_transform
    }

    /// Moves the body to `transform`, remembering the old pose for swept
    /// bounds. Does not touch the broad-phase.
    pub(crate) fn advance_to(&mut self, transform: Transform) {
        self.prev_transform = self.transform;
        self.transform = transform;
    }

    /// Places the body at `transform` with no sweep.
    pub(crate) fn teleport(&mut self, transform: Transform) {
        self.prev_transform = transform;
        self.transform = transform;
    }

    pub fn set_awake(&mut self, flag: bool) {
        if flag && !self.awake {
            log::trace!("body {:?} woken", self.id);
        }
        self.awake = flag;
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active_flag(&mut self, active: bool) {
        self.active = active;
    }

    pub fn fixtures(&self) -> &[FixtureId] {
        &self.fixtures
    }

    pub(crate) fn attach_fixture(&mut self, fixture: FixtureId) {
        self.fixtures.push(fixture);
    }

    pub(crate) fn detach_fixture(&mut self, fixture: FixtureId) {
        self.fixtures.retain(|&id| id != fixture);
    }

    /// Contact list, newest contact first.
    pub fn contact_edges(&self) -> &[ContactEdge] {
        &self.contact_edges
    }

    pub(crate) fn push_contact_edge(&mut self, edge: ContactEdge) {
        self.contact_edges.insert(0, edge);
    }

    pub(crate) fn remove_contact_edge(&mut self, contact: ContactId) {
        self.contact_edges.retain(|edge| edge.contact != contact);
    }

    pub fn mass_data(&self) -> &MassData {
        &self.mass_data
    }

    pub(crate) fn set_mass_data(&mut self, mass_data: MassData) {
        self.mass_data = mass_data;
    }
}
