use fixture2d::*;

fn key(fixture: usize, child_index: usize) -> ProxyKey {
    ProxyKey {
        fixture: FixtureId::new(fixture, 0),
        child_index,
    }
}

fn boxed(x: f32, y: f32) -> Aabb {
    Aabb::from_center_half_extents(Vec2::new(x, y), Vec2::splat(0.5))
}

fn drain(bp: &mut TreeBroadPhase) -> Vec<(ProxyKey, ProxyKey)> {
    let mut pairs = Vec::new();
    bp.update_pairs(&mut |a, b| pairs.push((a, b)));
    pairs
}

#[test]
fn touching_re_reports_existing_pairs() {
    let mut bp = TreeBroadPhase::new();
    let a = bp.create_proxy(boxed(0.0, 0.0), key(0, 0));
    bp.create_proxy(boxed(0.6, 0.0), key(1, 0));
    bp.create_proxy(boxed(0.0, 0.6), key(2, 0));
    assert_eq!(drain(&mut bp).len(), 3);
    assert!(drain(&mut bp).is_empty());

    bp.touch_proxy(a);
    bp.touch_proxy(a);
    let pairs = drain(&mut bp);
    assert_eq!(pairs, vec![(key(0, 0), key(1, 0)), (key(0, 0), key(2, 0))]);
}

#[test]
fn destroyed_proxies_leave_the_move_buffer() {
    let mut bp = TreeBroadPhase::new();
    bp.create_proxy(boxed(0.0, 0.0), key(0, 0));
    let doomed = bp.create_proxy(boxed(0.2, 0.0), key(1, 0));
    bp.destroy_proxy(doomed);

    assert!(drain(&mut bp).is_empty());
    assert_eq!(bp.user_data(doomed), None);
    assert!(!bp.test_overlap(doomed, doomed));

    bp.destroy_proxy(doomed);
    assert_eq!(bp.proxy_count(), 1);
}

#[test]
fn fat_boxes_are_inflated() {
    let settings = Settings {
        aabb_extension: 0.25,
        ..Settings::default()
    };
    let mut bp = TreeBroadPhase::with_settings(&settings);
    let proxy = bp.create_proxy(boxed(1.0, 1.0), key(0, 0));

    let fat = bp.fat_aabb(proxy).unwrap();
    assert_eq!(fat, boxed(1.0, 1.0).extended(0.25));
    assert!(fat.contains(&boxed(1.2, 0.8)));
}

#[test]
fn query_stops_when_asked() {
    let mut bp = TreeBroadPhase::new();
    for i in 0..10 {
        bp.create_proxy(boxed(i as f32 * 0.1, 0.0), key(i, 0));
    }

    let mut visited = 0;
    bp.query(&boxed(0.5, 0.0), &mut |_| {
        visited += 1;
        visited < 4
    });
    assert_eq!(visited, 4);

    let mut all = Vec::new();
    bp.query(&Aabb::new(Vec2::splat(-100.0), Vec2::splat(100.0)), &mut |proxy| {
        all.push(bp.user_data(proxy).unwrap().fixture);
        true
    });
    assert_eq!(all.len(), 10);
}

#[test]
fn pairs_from_many_moved_proxies_are_unique() {
    let mut bp = TreeBroadPhase::new();
    let mut proxies = Vec::new();
    for i in 0..8 {
        for j in 0..8 {
            let index = i * 8 + j;
            proxies.push(bp.create_proxy(boxed(i as f32 * 0.9, j as f32 * 0.9), key(index, 0)));
        }
    }
    drain(&mut bp);

    for &proxy in &proxies {
        bp.touch_proxy(proxy);
    }
    let pairs = drain(&mut bp);
    let mut unique = pairs.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(pairs.len(), unique.len());
    assert!(pairs.iter().all(|(a, b)| a < b));

    // Fat boxes reach the eight neighbours of each box, nothing further.
    let expected = 2 * 8 * 7 + 2 * 7 * 7;
    assert_eq!(pairs.len(), expected);
}
