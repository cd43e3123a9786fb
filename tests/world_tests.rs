use approx::assert_relative_eq;
use fixture2d::*;

fn unit_box() -> FixtureDef {
    FixtureDef::new(PolygonShape::new_box(0.5, 0.5).unwrap())
}

fn body_with_box(world: &mut World, position: Vec2) -> (BodyId, FixtureId) {
    let body = world.create_body(Transform::from_position(position));
    let fixture = world.create_fixture(body, &unit_box()).unwrap();
    (body, fixture)
}

fn contact_between(world: &World, a: FixtureId, b: FixtureId) -> Option<ContactId> {
    world
        .contacts()
        .find(|(_, contact)| contact.involves(a) && contact.involves(b))
        .map(|(id, _)| id)
}

#[test]
fn overlapping_fixtures_form_one_contact() {
    let mut world = World::default();
    let (body_a, a) = body_with_box(&mut world, Vec2::ZERO);
    let (body_b, b) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    body_with_box(&mut world, Vec2::new(20.0, 0.0));

    assert_eq!(world.find_new_contacts(), 1);
    assert_eq!(world.find_new_contacts(), 0, "pairs are not reported twice");

    let contact = contact_between(&world, a, b).expect("contact created");
    let edges_a = world.body(body_a).unwrap().contact_edges();
    let edges_b = world.body(body_b).unwrap().contact_edges();
    assert_eq!(edges_a, &[ContactEdge { other: body_b, contact }]);
    assert_eq!(edges_b, &[ContactEdge { other: body_a, contact }]);
}

#[test]
fn fixtures_on_one_body_never_collide() {
    let mut world = World::default();
    let body = world.create_body(Transform::IDENTITY);
    world.create_fixture(body, &unit_box()).unwrap();
    world.create_fixture(body, &unit_box()).unwrap();

    assert_eq!(world.find_new_contacts(), 0);
    assert_eq!(world.contact_count(), 0);
}

#[test]
fn filter_change_is_deferred_to_collide() {
    let mut world = World::default();
    let (body_a, a) = body_with_box(&mut world, Vec2::ZERO);
    let (_, b) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();
    let contact = contact_between(&world, a, b).unwrap();

    let flagged = world.set_filter_data(a, Filter::new(0x0002, 0x0002, 0)).unwrap();
    assert_eq!(flagged, 1);
    let pending = world.contact(contact).expect("flagging does not destroy");
    assert!(pending.needs_filtering());
    assert!(pending.flags().contains(ContactFlags::FILTER));

    assert_eq!(world.collide(), 1);
    assert!(world.contact(contact).is_none());
    assert!(world.body(body_a).unwrap().contact_edges().is_empty());

    // Restoring the filter touches the proxies so the pair comes back.
    assert_eq!(world.set_filter_data(a, Filter::default()).unwrap(), 0);
    assert!(world.broad_phase().move_count() > 0);
    assert_eq!(world.find_new_contacts(), 1);
    assert!(contact_between(&world, a, b).is_some());
}

#[test]
fn surviving_contacts_lose_the_filter_flag() {
    let mut world = World::default();
    body_with_box(&mut world, Vec2::ZERO);
    let (_, b) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    assert_eq!(world.refilter(b).unwrap(), 1);
    assert_eq!(world.collide(), 0);
    let (_, contact) = world.contacts().next().unwrap();
    assert!(!contact.needs_filtering());
    assert!(contact.is_touching());
}

#[test]
fn refilter_leaves_other_fixtures_alone() {
    let mut world = World::default();
    let shared = world.create_body(Transform::IDENTITY);
    let left = world.create_fixture(shared, &unit_box()).unwrap();
    let right_def = FixtureDef::new(
        PolygonShape::new_oriented_box(0.5, 0.5, Vec2::new(10.0, 0.0), 0.0).unwrap(),
    );
    let right = world.create_fixture(shared, &right_def).unwrap();

    let (_, near_left) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    let (_, near_right) = body_with_box(&mut world, Vec2::new(10.8, 0.0));
    assert_eq!(world.find_new_contacts(), 2);

    assert_eq!(world.refilter(left).unwrap(), 1);

    let flagged = contact_between(&world, left, near_left).unwrap();
    let untouched = contact_between(&world, right, near_right).unwrap();
    assert!(world.contact(flagged).unwrap().needs_filtering());
    assert!(!world.contact(untouched).unwrap().needs_filtering());
}

#[test]
fn separated_bodies_lose_their_contact() {
    let mut world = World::default();
    body_with_box(&mut world, Vec2::ZERO);
    let (body_b, _) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    world
        .set_transform(body_b, Transform::from_position(Vec2::new(10.0, 0.0)))
        .unwrap();
    assert_eq!(world.collide(), 1);
    assert_eq!(world.contact_count(), 0);
    assert!(world.body(body_b).unwrap().contact_edges().is_empty());
}

#[test]
fn sleeping_pairs_are_left_alone() {
    let mut world = World::default();
    let (body_a, _) = body_with_box(&mut world, Vec2::ZERO);
    let (body_b, _) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    world
        .set_transform(body_b, Transform::from_position(Vec2::new(10.0, 0.0)))
        .unwrap();
    world.set_awake(body_a, false).unwrap();
    world.set_awake(body_b, false).unwrap();
    assert_eq!(world.collide(), 0, "asleep pairs keep their contact");

    world.set_awake(body_b, true).unwrap();
    assert_eq!(world.collide(), 1);
}

#[test]
fn sensor_contacts_are_disabled() {
    let mut world = World::default();
    let (body_a, a) = body_with_box(&mut world, Vec2::ZERO);
    body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    world.set_sensor(a, true).unwrap();
    world.set_sensor(a, true).unwrap();
    assert!(world.fixture(a).unwrap().is_sensor());
    assert!(world.body(body_a).unwrap().is_awake());

    world.collide();
    let (_, contact) = world.contacts().next().unwrap();
    assert!(!contact.is_enabled());
}

#[test]
fn moving_body_sweeps_its_proxy() {
    let mut world = World::default();
    let (body, fixture) = body_with_box(&mut world, Vec2::ZERO);

    world
        .move_body(body, Transform::from_position(Vec2::new(3.0, 0.0)))
        .unwrap();

    let fixture = world.fixture(fixture).unwrap();
    let swept = fixture.aabb(0);
    assert!(swept.contains_point(Vec2::new(-0.5, 0.0)));
    assert!(swept.contains_point(Vec2::new(3.5, 0.0)));

    let proxy = fixture.proxies()[0].proxy_id().unwrap();
    let fat = world.broad_phase().fat_aabb(proxy).unwrap();
    assert!(fat.contains(swept));
}

#[test]
fn inactive_bodies_have_no_proxies() {
    let mut world = World::default();
    let (body_a, a) = body_with_box(&mut world, Vec2::ZERO);
    body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    world.set_body_active(body_a, false).unwrap();
    assert_eq!(world.fixture(a).unwrap().proxy_count(), 0);
    assert_eq!(world.broad_phase().proxy_count(), 1);
    assert_eq!(world.contact_count(), 0);

    world.set_body_active(body_a, true).unwrap();
    assert_eq!(world.fixture(a).unwrap().proxy_count(), 1);
    assert_eq!(world.find_new_contacts(), 1);
}

#[test]
fn destroying_a_fixture_removes_its_contacts() {
    let mut world = World::default();
    let (body_a, a) = body_with_box(&mut world, Vec2::ZERO);
    let (body_b, _) = body_with_box(&mut world, Vec2::new(0.8, 0.0));
    world.find_new_contacts();

    world.destroy_fixture(a).unwrap();
    assert!(world.fixture(a).is_none());
    assert_eq!(world.contact_count(), 0);
    assert!(world.body(body_a).unwrap().fixtures().is_empty());
    assert!(world.body(body_b).unwrap().contact_edges().is_empty());
    assert_eq!(world.broad_phase().proxy_count(), 1);

    assert_eq!(world.destroy_fixture(a), Err(QueryError::UnknownFixture));
    world.destroy_body(body_b).unwrap();
    assert!(world.body(body_b).is_none());
    assert_eq!(world.broad_phase().proxy_count(), 0);
}

#[test]
fn mass_is_accumulated_about_the_centroid() {
    let mut world = World::default();
    let body = world.create_body(Transform::IDENTITY);
    for x in [0.0, 2.0] {
        let shape = PolygonShape::new_oriented_box(0.5, 0.5, Vec2::new(x, 0.0), 0.0).unwrap();
        world
            .create_fixture(body, &FixtureDef::new(shape).density(1.0))
            .unwrap();
    }

    let mass = *world.body(body).unwrap().mass_data();
    assert_relative_eq!(mass.mass, 2.0, epsilon = 1e-5);
    assert_relative_eq!(mass.center.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(mass.center.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(mass.inertia, 7.0 / 3.0, epsilon = 1e-4);
}

#[test]
fn queries_report_fixture_children() {
    let mut world = World::default();
    let (_, near) = body_with_box(&mut world, Vec2::new(2.0, 0.0));
    let (_, far) = body_with_box(&mut world, Vec2::new(5.0, 0.0));
    let ground = world.create_body(Transform::IDENTITY);
    let chain = ChainShape::new_chain(&[
        Vec2::new(-10.0, -2.0),
        Vec2::new(0.0, -2.0),
        Vec2::new(10.0, -2.0),
    ])
    .unwrap();
    let ground_fixture = world.create_fixture(ground, &FixtureDef::new(chain)).unwrap();

    let hits = world.raycast(Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0));
    let order: Vec<FixtureId> = hits.iter().map(|hit| hit.fixture).collect();
    assert_eq!(order, vec![near, far]);
    assert_relative_eq!(hits[0].point.x, 1.5, epsilon = 1e-5);
    assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-5);

    let mut found = Vec::new();
    world.query_aabb(
        &Aabb::new(Vec2::new(4.0, -3.0), Vec2::new(6.0, 1.0)),
        |fixture, child| {
            found.push((fixture, child));
            true
        },
    );
    found.sort();
    assert_eq!(found, vec![(far, 0), (ground_fixture, 1)]);

    assert_eq!(world.contains_point(near, Vec2::new(2.2, 0.3)), Ok(true));
    assert_eq!(
        world.contains_point(ground_fixture, Vec2::ZERO),
        Err(QueryError::NonConvexShape(ShapeType::Chain))
    );
    let (distance, normal) =
        world.compute_distance(ground_fixture, Vec2::new(5.0, 0.0), 1).unwrap();
    assert_relative_eq!(distance, 2.0, epsilon = 1e-5);
    assert_relative_eq!(normal.y, 1.0, epsilon = 1e-5);
}

fn live_proxies(world: &World, fixtures: &[FixtureId]) -> Vec<ProxyId> {
    fixtures
        .iter()
        .filter_map(|&id| world.fixture(id))
        .flat_map(|fixture| fixture.proxies().iter().filter_map(|proxy| proxy.proxy_id()))
        .collect()
}

#[test]
fn fixtures_never_share_proxies() {
    let mut world = World::default();
    let ground = world.create_body(Transform::IDENTITY);
    let chain = ChainShape::new_chain(&[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 1.0)]).unwrap();
    let mut fixtures = vec![world.create_fixture(ground, &FixtureDef::new(chain)).unwrap()];
    for i in 0..6 {
        let (_, fixture) = body_with_box(&mut world, Vec2::new(i as f32 * 0.7, 1.0));
        fixtures.push(fixture);
    }

    // Free some slots and refill them so ids get reused.
    let doomed: Vec<FixtureId> = fixtures.iter().copied().skip(1).step_by(2).collect();
    for &id in &doomed {
        world.destroy_fixture(id).unwrap();
    }
    fixtures.retain(|id| !doomed.contains(id));
    for i in 0..3 {
        let (_, fixture) = body_with_box(&mut world, Vec2::new(i as f32, -1.0));
        fixtures.push(fixture);
    }

    for &id in &fixtures {
        let fixture = world.fixture(id).unwrap();
        assert_eq!(fixture.id(), id);
        for proxy in fixture.proxies().iter().filter(|p| p.proxy_id().is_some()) {
            assert_eq!(proxy.fixture(), Some(id));
        }
    }

    let mut proxies = live_proxies(&world, &fixtures);
    let total = proxies.len();
    proxies.sort();
    proxies.dedup();
    assert_eq!(proxies.len(), total, "a proxy id is owned by one fixture");
    assert_eq!(total, world.broad_phase().proxy_count());
}

#[test]
fn huge_ground_moves_and_pairs() {
    let mut world = World::default();
    let ground = world.create_body(Transform::IDENTITY);
    let slab = PolygonShape::new_box(1000.0, 1000.0).unwrap();
    let slab = world.create_fixture(ground, &FixtureDef::new(slab)).unwrap();
    let (_, outside) = body_with_box(&mut world, Vec2::new(1010.0, 0.0));
    world.find_new_contacts();
    assert_eq!(world.contact_count(), 0);

    world
        .set_transform(ground, Transform::from_position(Vec2::new(12.0, 0.0)))
        .unwrap();
    assert_eq!(world.find_new_contacts(), 1);
    assert!(world.contacts().any(|(_, contact)| contact.involves(outside)));
    assert!(world.broad_phase().tree().height() <= 2);

    let hits = world.raycast(Vec2::new(1020.0, 0.0), Vec2::new(1008.0, 0.0));
    let order: Vec<FixtureId> = hits.iter().map(|hit| hit.fixture).collect();
    assert_eq!(order, vec![slab, outside]);
    assert_relative_eq!(hits[0].point.x, 1012.0, epsilon = 1e-3);
}
