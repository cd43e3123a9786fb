use crate::{
    collision::{
        broadphase::{BroadPhase, TreeBroadPhase, ProxyKey},
        contact::{Contact, ContactEdge},
    },
    config::Settings,
    core::{body::Body, fixture::Fixture},
    utils::{
        allocator::{Arena, BodyId, ContactId, FixtureId},
        logging::ScopedTimer,
    },
};

/// Owns the broad-phase and the contact graph built from its pairs.
pub struct ContactManager {
    pub broad_phase: TreeBroadPhase,
    pub contacts: Arena<ContactId, Contact>,
}

impl Default for ContactManager {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl ContactManager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            broad_phase: TreeBroadPhase::with_settings(settings),
            contacts: Arena::new(),
        }
    }

    /// Turns new broad-phase pairs into contacts. Returns how many were
    /// created.
    pub fn find_new_contacts(
        &mut self,
        fixtures: &Arena<FixtureId, Fixture>,
        bodies: &mut Arena<BodyId, Body>,
    ) -> usize {
        let mut timer = ScopedTimer::new("contacts::find_new");

        let mut pairs = Vec::new();
        self.broad_phase.update_pairs(&mut |a, b| pairs.push((a, b)));

        let created = pairs
            .into_iter()
            .filter(|&(a, b)| self.add_pair(a, b, fixtures, bodies))
            .count();
        timer.set_items(created);
        created
    }

    fn add_pair(
        &mut self,
        key_a: ProxyKey,
        key_b: ProxyKey,
        fixtures: &Arena<FixtureId, Fixture>,
        bodies: &mut Arena<BodyId, Body>,
    ) -> bool {
        let (Some(fixture_a), Some(fixture_b)) =
            (fixtures.get(key_a.fixture), fixtures.get(key_b.fixture))
        else {
            return false;
        };

        let body_a = fixture_a.body();
        let body_b = fixture_b.body();
        if body_a == body_b {
            return false;
        }

        let a = (key_a.fixture, key_a.child_index);
        let b = (key_b.fixture, key_b.child_index);
        let exists = bodies.get(body_b).is_some_and(|body| {
            body.contact_edges().iter().any(|edge| {
                edge.other == body_a
                    && self
                        .contacts
                        .get(edge.contact)
                        .is_some_and(|contact| contact.matches(a, b))
            })
        });
        if exists {
            return false;
        }

        if !fixture_a.filter_data().should_collide(fixture_b.filter_data()) {
            return false;
        }

        let contact = self
            .contacts
            .insert(Contact::new((a.0, a.1, body_a), (b.0, b.1, body_b)));

        if let Some(body) = bodies.get_mut(body_a) {
            body.push_contact_edge(ContactEdge {
                other: body_b,
                contact,
            });
        }
        if let Some(body) = bodies.get_mut(body_b) {
            body.push_contact_edge(ContactEdge {
                other: body_a,
                contact,
            });
        }

        log::debug!("contact {:?} created between {:?} and {:?}", contact, a, b);
        true
    }

    /// Consumes pending filter flags and culls contacts whose fat boxes no
    /// longer overlap. Returns how many contacts were destroyed.
    pub fn collide(
        &mut self,
        fixtures: &Arena<FixtureId, Fixture>,
        bodies: &mut Arena<BodyId, Body>,
    ) -> usize {
        let mut timer = ScopedTimer::new("contacts::collide");
        let mut destroyed = 0;

        let ids: Vec<ContactId> = self.contacts.ids().collect();
        for id in ids {
            let Some(contact) = self.contacts.get(id) else {
                continue;
            };
            let needs_filtering = contact.needs_filtering();
            let (fixture_a, child_a, body_a) = (contact.fixture_a, contact.child_a, contact.body_a);
            let (fixture_b, child_b, body_b) = (contact.fixture_b, contact.child_b, contact.body_b);

            let (Some(fixture_a), Some(fixture_b)) =
                (fixtures.get(fixture_a), fixtures.get(fixture_b))
            else {
                self.destroy(id, bodies);
                destroyed += 1;
                continue;
            };

            if needs_filtering {
                if !fixture_a.filter_data().should_collide(fixture_b.filter_data()) {
                    self.destroy(id, bodies);
                    destroyed += 1;
                    continue;
                }
                if let Some(contact) = self.contacts.get_mut(id) {
                    contact.clear_filter_flag();
                }
            }

            let awake = |body: BodyId| bodies.get(body).is_some_and(Body::is_awake);
            if !awake(body_a) && !awake(body_b) {
                continue;
            }

            let proxy_a = fixture_a.proxies().get(child_a).and_then(|proxy| proxy.proxy_id());
            let proxy_b = fixture_b.proxies().get(child_b).and_then(|proxy| proxy.proxy_id());
            let overlap = match (proxy_a, proxy_b) {
                (Some(a), Some(b)) => self.broad_phase.test_overlap(a, b),
                _ => false,
            };
            if !overlap {
                self.destroy(id, bodies);
                destroyed += 1;
                continue;
            }

            let touching = fixture_a.proxies()[child_a]
                .aabb()
                .overlaps(fixture_b.proxies()[child_b].aabb());
            let sensor = fixture_a.is_sensor() || fixture_b.is_sensor();
            if let Some(contact) = self.contacts.get_mut(id) {
                contact.set_touching(touching);
                contact.set_enabled(!sensor);
            }
        }

        timer.set_items(destroyed);
        destroyed
    }

    /// Removes a contact and unlinks it from both bodies.
    pub fn destroy(&mut self, id: ContactId, bodies: &mut Arena<BodyId, Body>) {
        let Some(contact) = self.contacts.remove(id) else {
            return;
        };
        for body in [contact.body_a, contact.body_b] {
            if let Some(body) = bodies.get_mut(body) {
                body.remove_contact_edge(id);
            }
        }
        log::debug!(
            "contact {:?} destroyed ({:?} / {:?})",
            id,
            contact.fixture_a,
            contact.fixture_b
        );
    }

    /// Destroys every contact on `body` that references `fixture`, or every
    /// contact on `body` when `fixture` is `None`.
    pub fn destroy_contacts_of(
        &mut self,
        body: BodyId,
        fixture: Option<FixtureId>,
        bodies: &mut Arena<BodyId, Body>,
    ) -> usize {
        let Some(owner) = bodies.get(body) else {
            return 0;
        };
        let doomed: Vec<ContactId> = owner
            .contact_edges()
            .iter()
            .map(|edge| edge.contact)
            .filter(|&id| match fixture {
                Some(fixture) => self
                    .contacts
                    .get(id)
                    .is_some_and(|contact| contact.involves(fixture)),
                None => true,
            })
            .collect();

        for &id in &doomed {
            self.destroy(id, bodies);
        }
        doomed.len()
    }
}
