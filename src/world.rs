pub mod contact_manager;

use glam::Vec2;

use crate::{
    collision::{
        aabb::Aabb,
        broadphase::{BroadPhase, TreeBroadPhase},
        contact::Contact,
        queries::{RayCastInput, RaycastHit},
    },
    config::Settings,
    core::{
        body::Body,
        filter::Filter,
        fixture::{Fixture, FixtureDef},
        types::{MassData, Transform},
    },
    error::QueryError,
    utils::allocator::{Arena, BodyId, ContactId, FixtureId},
};

pub use contact_manager::ContactManager;

/// Owns bodies, fixtures and the contact manager, and keeps proxies in step
/// with body motion.
pub struct World {
    bodies: Arena<BodyId, Body>,
    fixtures: Arena<FixtureId, Fixture>,
    contact_manager: ContactManager,
    settings: Settings,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl World {
    pub fn new(settings: Settings) -> Self {
        Self {
            bodies: Arena::new(),
            fixtures: Arena::new(),
            contact_manager: ContactManager::new(&settings),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contact_manager.contacts.get(id)
    }

    pub fn contacts(&self) -> impl Iterator<Item = (ContactId, &Contact)> + '_ {
        self.contact_manager.contacts.iter()
    }

    pub fn contact_count(&self) -> usize {
        self.contact_manager.contacts.len()
    }

    pub fn broad_phase(&self) -> &TreeBroadPhase {
        &self.contact_manager.broad_phase
    }

    pub fn create_body(&mut self, transform: Transform) -> BodyId {
        let id = self.bodies.insert(Body::new(BodyId::default(), transform));
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
        }
        id
    }

    /// Attaches a new fixture to `body_id`. Proxies are registered right
    /// away when the body is active.
    ///
    /// # Panics
    /// Panics if `def.density` is negative.
    pub fn create_fixture(
        &mut self,
        body_id: BodyId,
        def: &FixtureDef,
    ) -> Result<FixtureId, QueryError> {
        let body = self.bodies.get_mut(body_id).ok_or(QueryError::UnknownBody)?;

        let id = self.fixtures.insert(Fixture::new(body_id, def));
        let fixture = self.fixtures.get_mut(id).ok_or(QueryError::UnknownFixture)?;
        fixture.id = id;

        if body.is_active() {
            fixture.create_proxies(&mut self.contact_manager.broad_phase, body.transform());
        }
        body.attach_fixture(id);

        if def.density > 0.0 {
            self.reset_mass_data(body_id)?;
        }
        Ok(id)
    }

    /// Destroys the fixture's contacts and proxies, then the fixture.
    pub fn destroy_fixture(&mut self, id: FixtureId) -> Result<(), QueryError> {
        let body_id = self.fixtures.get(id).ok_or(QueryError::UnknownFixture)?.body();

        self.contact_manager.destroy_contacts_of(body_id, Some(id), &mut self.bodies);

        let mut fixture = self.fixtures.remove(id).ok_or(QueryError::UnknownFixture)?;
        fixture.destroy_proxies(&mut self.contact_manager.broad_phase);
        fixture.destroy();

        if let Some(body) = self.bodies.get_mut(body_id) {
            body.detach_fixture(id);
        }
        self.reset_mass_data(body_id)?;
        Ok(())
    }

    pub fn destroy_body(&mut self, id: BodyId) -> Result<(), QueryError> {
        let fixtures = self.bodies.get(id).ok_or(QueryError::UnknownBody)?.fixtures().to_vec();
        for fixture in fixtures {
            self.destroy_fixture(fixture)?;
        }
        self.bodies.remove(id);
        Ok(())
    }

    /// Activating registers proxies at the current pose; deactivating
    /// removes them together with the body's contacts.
    pub fn set_body_active(&mut self, id: BodyId, active: bool) -> Result<(), QueryError> {
        let body = self.bodies.get(id).ok_or(QueryError::UnknownBody)?;
        if body.is_active() == active {
            return Ok(());
        }

        let transform = *body.transform();
        let fixtures = body.fixtures().to_vec();
        let broad_phase = &mut self.contact_manager.broad_phase;

        for &fixture_id in &fixtures {
            let Some(fixture) = self.fixtures.get_mut(fixture_id) else {
                continue;
            };
            if active {
                fixture.create_proxies(broad_phase, &transform);
            } else {
                fixture.destroy_proxies(broad_phase);
            }
        }
        if !active {
            self.contact_manager.destroy_contacts_of(id, None, &mut self.bodies);
        }

        if let Some(body) = self.bodies.get_mut(id) {
            body.set_active_flag(active);
        }
        Ok(())
    }

    /// Places the body without a sweep: proxies are bounded at the new pose
    /// only.
    pub fn set_transform(&mut self, id: BodyId, transform: Transform) -> Result<(), QueryError> {
        let body = self.bodies.get_mut(id).ok_or(QueryError::UnknownBody)?;
        body.teleport(transform);
        self.synchronize_fixtures(id)
    }

    /// Moves the body to `transform` over one step: proxies cover both the
    /// previous and the new pose.
    pub fn move_body(&mut self, id: BodyId, transform: Transform) -> Result<(), QueryError> {
        let body = self.bodies.get_mut(id).ok_or(QueryError::UnknownBody)?;
        body.advance_to(transform);
        self.synchronize_fixtures(id)
    }

    fn synchronize_fixtures(&mut self, id: BodyId) -> Result<(), QueryError> {
        let body = self.bodies.get(id).ok_or(QueryError::UnknownBody)?;
        for &fixture_id in body.fixtures() {
            if let Some(fixture) = self.fixtures.get_mut(fixture_id) {
                fixture.synchronize(
                    &mut self.contact_manager.broad_phase,
                    body.prev_transform(),
                    body.transform(),
                );
            }
        }
        Ok(())
    }

    /// Recomputes the body's mass from its fixtures. The stored center is
    /// the local centroid and the inertia is about that centroid.
    pub fn reset_mass_data(&mut self, id: BodyId) -> Result<MassData, QueryError> {
        let body = self.bodies.get_mut(id).ok_or(QueryError::UnknownBody)?;

        let mut mass = 0.0;
        let mut center = Vec2::ZERO;
        let mut inertia = 0.0;
        for fixture in body.fixtures().iter().filter_map(|&f| self.fixtures.get(f)) {
            if fixture.density() == 0.0 {
                continue;
            }
            let data = fixture.mass_data();
            mass += data.mass;
            center += data.center * data.mass;
            inertia += data.inertia;
        }

        if mass > 0.0 {
            center /= mass;
            inertia -= mass * center.dot(center);
        }

        let data = MassData {
            mass,
            center,
            inertia,
        };
        body.set_mass_data(data);
        Ok(data)
    }

    pub fn set_awake(&mut self, id: BodyId, awake: bool) -> Result<(), QueryError> {
        let body = self.bodies.get_mut(id).ok_or(QueryError::UnknownBody)?;
        body.set_awake(awake);
        Ok(())
    }

    pub fn set_sensor(&mut self, id: FixtureId, sensor: bool) -> Result<(), QueryError> {
        let fixture = self.fixtures.get_mut(id).ok_or(QueryError::UnknownFixture)?;
        let body = self.bodies.get_mut(fixture.body()).ok_or(QueryError::UnknownBody)?;
        fixture.set_sensor(sensor, body);
        Ok(())
    }

    /// Returns the number of contacts flagged for filtering.
    pub fn set_filter_data(&mut self, id: FixtureId, filter: Filter) -> Result<usize, QueryError> {
        let fixture = self.fixtures.get_mut(id).ok_or(QueryError::UnknownFixture)?;
        let body = self.bodies.get(fixture.body()).ok_or(QueryError::UnknownBody)?;
        Ok(fixture.set_filter_data(
            filter,
            body,
            &mut self.contact_manager.contacts,
            Some(&mut self.contact_manager.broad_phase),
        ))
    }

    /// Returns the number of contacts flagged for filtering.
    pub fn refilter(&mut self, id: FixtureId) -> Result<usize, QueryError> {
        let fixture = self.fixtures.get(id).ok_or(QueryError::UnknownFixture)?;
        let body = self.bodies.get(fixture.body()).ok_or(QueryError::UnknownBody)?;
        Ok(fixture.refilter(
            body,
            &mut self.contact_manager.contacts,
            Some(&mut self.contact_manager.broad_phase),
        ))
    }

    /// Creates contacts for new broad-phase pairs.
    pub fn find_new_contacts(&mut self) -> usize {
        self.contact_manager.find_new_contacts(&self.fixtures, &mut self.bodies)
    }

    /// Re-filters flagged contacts and drops the ones that stopped
    /// overlapping.
    pub fn collide(&mut self) -> usize {
        self.contact_manager.collide(&self.fixtures, &mut self.bodies)
    }

    pub fn contains_point(&self, id: FixtureId, p: Vec2) -> Result<bool, QueryError> {
        let fixture = self.fixtures.get(id).ok_or(QueryError::UnknownFixture)?;
        let body = self.bodies.get(fixture.body()).ok_or(QueryError::UnknownBody)?;
        fixture.contains_point(body, p)
    }

    pub fn compute_distance(
        &self,
        id: FixtureId,
        p: Vec2,
        child_index: usize,
    ) -> Result<(f32, Vec2), QueryError> {
        let fixture = self.fixtures.get(id).ok_or(QueryError::UnknownFixture)?;
        let body = self.bodies.get(fixture.body()).ok_or(QueryError::UnknownBody)?;
        fixture.compute_distance(body, p, child_index)
    }

    /// Visits fixture children whose proxy overlaps `aabb` until `callback`
    /// returns `false`.
    pub fn query_aabb<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(FixtureId, usize) -> bool,
    {
        let broad_phase = &self.contact_manager.broad_phase;
        broad_phase.query(aabb, &mut |proxy| match broad_phase.user_data(proxy) {
            Some(key) => callback(key.fixture, key.child_index),
            None => true,
        });
    }

    /// Casts the segment `p1 -> p2` against every proxy whose fat box it
    /// enters. Hits are sorted by fraction.
    pub fn raycast(&self, p1: Vec2, p2: Vec2) -> Vec<RaycastHit> {
        let input = RayCastInput::new(p1, p2, 1.0);
        let mut hits = Vec::new();

        let broad_phase = &self.contact_manager.broad_phase;
        broad_phase.raycast(&input, &mut |proxy| {
            let Some(key) = broad_phase.user_data(proxy) else {
                return true;
            };
            let (fixture_id, child_index) = (key.fixture, key.child_index);
            let Some(fixture) = self.fixtures.get(fixture_id) else {
                return true;
            };
            let Some(body) = self.bodies.get(fixture.body()) else {
                return true;
            };
            if let Ok(Some(output)) = fixture.raycast(body, &input, child_index) {
                hits.push(RaycastHit {
                    fixture: fixture_id,
                    child_index,
                    point: input.point_at(output.fraction),
                    normal: output.normal,
                    fraction: output.fraction,
                });
            }
            true
        });

        hits.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
        hits
    }
}
