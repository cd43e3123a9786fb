use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    body::Body,
    filter::Filter,
    types::{MassData, Transform},
};
use crate::{
    collision::{
        aabb::Aabb,
        broadphase::{BroadPhase, ProxyId, ProxyKey},
        contact::Contact,
        queries::{RayCastInput, RayCastOutput},
        shapes::{Shape, ShapeType},
    },
    error::QueryError,
    utils::allocator::{Arena, BodyId, ContactId, FixtureId},
};

/// Everything needed to build a [`Fixture`]. The shape is cloned on
/// attachment, so the definition can be reused or mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    pub shape: Shape,
    pub user_data: u64,
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
    pub is_sensor: bool,
    pub filter: Filter,
}

impl FixtureDef {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            user_data: 0,
            friction: 0.2,
            restitution: 0.0,
            density: 0.0,
            is_sensor: false,
            filter: Filter::default(),
        }
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }
}

/// Broad-phase registration of one shape child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureProxy {
    aabb: Aabb,
    proxy_id: Option<ProxyId>,
    fixture: Option<FixtureId>,
    child_index: usize,
}

impl FixtureProxy {
    fn unregistered() -> Self {
        Self {
            aabb: Aabb::default(),
            proxy_id: None,
            fixture: None,
            child_index: 0,
        }
    }

    /// Bounds passed to the broad-phase by the last create or synchronize.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// `None` while the child is not registered in a broad-phase.
    pub fn proxy_id(&self) -> Option<ProxyId> {
        self.proxy_id
    }

    pub fn fixture(&self) -> Option<FixtureId> {
        self.fixture
    }

    pub fn child_index(&self) -> usize {
        self.child_index
    }
}

/// Attaches a shape to a body together with material and filtering data.
///
/// A fixture has either no live proxies or one per shape child. Proxies are
/// registered by [`create_proxies`](Fixture::create_proxies) and must be
/// released with [`destroy_proxies`](Fixture::destroy_proxies) before the
/// fixture is [`destroy`](Fixture::destroy)ed.
///
/// Fixtures own their proxies and cannot be duplicated:
///
/// ```compile_fail
/// use fixture2d::{BodyId, Fixture, FixtureDef, PolygonShape};
///
/// let def = FixtureDef::new(PolygonShape::new_box(1.0, 1.0).unwrap());
/// let fixture = Fixture::new(BodyId::new(0, 0), &def);
/// let copy = fixture.clone();
/// ```
#[derive(Debug)]
pub struct Fixture {
    /// Assigned by the owning world on insertion; recorded on each proxy.
    pub(crate) id: FixtureId,
    body: BodyId,
    shape: Shape,
    filter: Filter,
    user_data: u64,
    density: f32,
    friction: f32,
    restitution: f32,
    is_sensor: bool,
    proxies: Vec<FixtureProxy>,
    proxy_count: usize,
}

impl Fixture {
    /// # Panics
    /// Panics if `def.density` is negative.
    pub fn new(body: BodyId, def: &FixtureDef) -> Self {
        assert!(def.density >= 0.0, "fixture density must be non-negative, got {}", def.density);

        let shape = def.shape.clone();
        let child_count = shape.child_count();

        let mut fixture = Self {
            id: FixtureId::default(),
            body,
            shape,
            filter: def.filter,
            user_data: def.user_data,
            density: def.density,
            friction: def.friction,
            restitution: def.restitution,
            is_sensor: def.is_sensor,
            proxies: vec![FixtureProxy::unregistered(); child_count],
            proxy_count: 0,
        };
        fixture.reserve_proxies(child_count);
        fixture
    }

    /// Grows the proxy array to hold `needed` entries, at least doubling it.
    fn reserve_proxies(&mut self, needed: usize) {
        if self.proxies.len() >= needed {
            return;
        }
        let new_len = (self.proxies.len() * 2).max(needed);
        self.proxies.resize(new_len, FixtureProxy::unregistered());
    }

    /// Null until the fixture is inserted into a world.
    pub fn id(&self) -> FixtureId {
        self.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    /// Changing the sensor state wakes the body so contacts get re-evaluated.
    pub fn set_sensor(&mut self, sensor: bool, body: &mut Body) {
        debug_assert_eq!(body.id, self.body, "fixture attached to another body");
        if sensor != self.is_sensor {
            body.set_awake(true);
            self.is_sensor = sensor;
        }
    }

    pub fn filter_data(&self) -> &Filter {
        &self.filter
    }

    /// Replaces the filter and [`refilter`](Fixture::refilter)s.
    ///
    /// Contacts already resolved this step keep their old outcome; the new
    /// filter applies from the next step in which the body is awake.
    pub fn set_filter_data<B: BroadPhase + ?Sized>(
        &mut self,
        filter: Filter,
        body: &Body,
        contacts: &mut Arena<ContactId, Contact>,
        broad_phase: Option<&mut B>,
    ) -> usize {
        self.filter.set(&filter);
        self.refilter(body, contacts, broad_phase)
    }

    /// Flags every contact of this fixture for filtering and touches its
    /// live proxies so that pairs rejected earlier can form again.
    ///
    /// Without a broad-phase (body not in a world) only the flagging
    /// happens. Returns the number of contacts flagged.
    pub fn refilter<B: BroadPhase + ?Sized>(
        &self,
        body: &Body,
        contacts: &mut Arena<ContactId, Contact>,
        broad_phase: Option<&mut B>,
    ) -> usize {
        debug_assert_eq!(body.id, self.body, "fixture attached to another body");

        // A contact between two fixtures of this body has two edges here.
        let mut seen: Vec<ContactId> = Vec::new();
        for edge in body.contact_edges() {
            if seen.contains(&edge.contact) {
                continue;
            }
            if let Some(contact) = contacts.get_mut(edge.contact) {
                if contact.involves(self.id) {
                    contact.flag_for_filtering();
                    seen.push(edge.contact);
                }
            }
        }

        let Some(broad_phase) = broad_phase else {
            return seen.len();
        };

        for proxy in &self.proxies[..self.proxy_count] {
            if let Some(proxy_id) = proxy.proxy_id {
                broad_phase.touch_proxy(proxy_id);
            }
        }
        seen.len()
    }

    pub fn proxies(&self) -> &[FixtureProxy] {
        &self.proxies
    }

    /// Number of live proxies: zero or the shape's child count.
    pub fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Does not update the body's mass; call `World::reset_mass_data`.
    ///
    /// # Panics
    /// Panics if `density` is negative.
    pub fn set_density(&mut self, density: f32) {
        assert!(density >= 0.0, "fixture density must be non-negative, got {density}");
        self.density = density;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Existing contacts keep their mixed friction.
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Existing contacts keep their mixed restitution.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    pub fn set_user_data(&mut self, user_data: u64) {
        self.user_data = user_data;
    }

    /// Tests a world point against the shape at the body's current pose.
    /// Only shapes with an interior (circle, polygon) support this.
    pub fn contains_point(&self, body: &Body, p: Vec2) -> Result<bool, QueryError> {
        if !self.shape.is_convex() {
            return Err(QueryError::NonConvexShape(self.shape.shape_type()));
        }
        Ok(self.shape.test_point(body.transform(), p))
    }

    pub fn raycast(
        &self,
        body: &Body,
        input: &RayCastInput,
        child_index: usize,
    ) -> Result<Option<RayCastOutput>, QueryError> {
        self.check_child(child_index)?;
        Ok(self.shape.raycast(input, body.transform(), child_index))
    }

    /// Mass from the shape and density; inertia is about the shape origin.
    pub fn mass_data(&self) -> MassData {
        self.shape.compute_mass(self.density)
    }

    /// Bounds stored on the proxy at the last create or synchronize. They can
    /// be enlarged or stale; recompute from the shape for exact bounds.
    ///
    /// # Panics
    /// Panics if `child_index` is not a live proxy.
    pub fn aabb(&self, child_index: usize) -> &Aabb {
        assert!(
            child_index < self.proxy_count,
            "child index {child_index} out of range ({} live proxies)",
            self.proxy_count
        );
        &self.proxies[child_index].aabb
    }

    /// Signed distance from a world point to child `child_index` and the
    /// outward direction at the closest feature.
    pub fn compute_distance(
        &self,
        body: &Body,
        p: Vec2,
        child_index: usize,
    ) -> Result<(f32, Vec2), QueryError> {
        self.check_child(child_index)?;
        Ok(self.shape.compute_distance_to(body.transform(), p, child_index))
    }

    fn check_child(&self, index: usize) -> Result<(), QueryError> {
        let child_count = self.shape.child_count();
        if index >= child_count {
            return Err(QueryError::ChildIndexOutOfRange { index, child_count });
        }
        Ok(())
    }

    /// Registers one proxy per shape child, bounded under `xf`.
    ///
    /// # Panics
    /// Panics if proxies are already live.
    pub fn create_proxies<B: BroadPhase + ?Sized>(&mut self, broad_phase: &mut B, xf: &Transform) {
        assert!(
            self.proxy_count == 0,
            "fixture {:?} already has {} live proxies",
            self.id,
            self.proxy_count
        );

        let child_count = self.shape.child_count();
        self.reserve_proxies(child_count);

        for (child_index, proxy) in self.proxies[..child_count].iter_mut().enumerate() {
            proxy.aabb = self.shape.compute_aabb(xf, child_index);
            proxy.proxy_id = Some(broad_phase.create_proxy(
                proxy.aabb,
                ProxyKey {
                    fixture: self.id,
                    child_index,
                },
            ));
            proxy.fixture = Some(self.id);
            proxy.child_index = child_index;
        }

        self.proxy_count = child_count;
        log::debug!("fixture {:?}: created {child_count} proxies", self.id);
    }

    /// Releases every live proxy. Calling it with no live proxies does
    /// nothing.
    pub fn destroy_proxies<B: BroadPhase + ?Sized>(&mut self, broad_phase: &mut B) {
        if self.proxy_count == 0 {
            return;
        }
        for proxy in &mut self.proxies[..self.proxy_count] {
            if let Some(proxy_id) = proxy.proxy_id.take() {
                broad_phase.destroy_proxy(proxy_id);
            }
        }
        log::debug!("fixture {:?}: destroyed {} proxies", self.id, self.proxy_count);
        self.proxy_count = 0;
    }

    /// Moves every live proxy to the union of the child bounds under
    /// `xf1` and `xf2`. The sweep is conservative for translation but can
    /// miss part of a rotation.
    pub fn synchronize<B: BroadPhase + ?Sized>(
        &mut self,
        broad_phase: &mut B,
        xf1: &Transform,
        xf2: &Transform,
    ) {
        if self.proxy_count == 0 {
            return;
        }

        let displacement = xf2.p - xf1.p;
        for proxy in &mut self.proxies[..self.proxy_count] {
            let aabb1 = self.shape.compute_aabb(xf1, proxy.child_index);
            let aabb2 = self.shape.compute_aabb(xf2, proxy.child_index);
            proxy.aabb = aabb1.union(&aabb2);

            if let Some(proxy_id) = proxy.proxy_id {
                broad_phase.move_proxy(proxy_id, proxy.aabb, displacement);
            }
        }
    }

    /// Tears the fixture down.
    ///
    /// # Panics
    /// Panics if proxies are still live.
    pub fn destroy(self) {
        assert!(
            self.proxy_count == 0,
            "fixture {:?} destroyed with {} live proxies",
            self.id,
            self.proxy_count
        );
    }
}
