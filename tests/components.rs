use ecs_core::World;

#[derive(Clone, Copy)]
struct Position {
    x: i32,
    y: i32,
}

#[derive(Clone, Copy)]
struct Health {
    hp: i32,
}

#[derive(Clone, Copy)]
struct Velocity {
    vx: f32,
    vy: f32,
}

#[derive(Clone, Copy)]
struct Tag;

#[test]
fn add_get_remove() {
    let mut world = World::new();
    let e = world.create();

    assert!(!world.has::<Position>(e));
    let pos = world.add(e, Position { x: 3, y: 4 });
    assert_eq!(pos.x, 3);
    assert_eq!(pos.y, 4);
    assert!(world.has::<Position>(e));

    let pos = world.get::<Position>(e);
    assert_eq!(pos.x, 3);
    assert_eq!(pos.y, 4);

    world.remove::<Position>(e);
    assert!(!world.has::<Position>(e));
}

#[test]
fn add_existing_returns_existing_value() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 1, y: 2 });

    let pos = world.add(e, Position { x: 99, y: 99 });
    assert_eq!(pos.x, 1);
    assert_eq!(pos.y, 2);
}

#[test]
fn remove_missing_component_is_noop() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 1, y: 2 });

    world.remove::<Health>(e);
    world.remove::<Health>(e);

    assert!(world.has::<Position>(e));
    assert!(!world.has::<Health>(e));
}

#[test]
fn try_get_absent_returns_none() {
    let mut world = World::new();
    let e = world.create();

    assert!(world.try_get::<Position>(e).is_none());
    assert!(world.try_get::<Health>(e).is_none());
}

#[test]
#[should_panic(expected = "does not carry")]
fn get_absent_panics() {
    let mut world = World::new();
    let e = world.create();
    let _ = world.get::<Health>(e);
}

#[test]
fn rank_lookup_with_multiple_components() {
    let mut world = World::new();
    let e = world.create();

    world.add(e, Position { x: 1, y: 2 });
    world.add(e, Health { hp: 100 });
    world.add(e, Velocity { vx: 3.0, vy: 4.0 });

    assert!(world.has::<Position>(e));
    assert!(world.has::<Health>(e));
    assert!(world.has::<Velocity>(e));

    assert_eq!(world.get::<Position>(e).x, 1);
    assert_eq!(world.get::<Health>(e).hp, 100);
    assert_eq!(world.get::<Velocity>(e).vx, 3.0);

    // Removing from the middle of the rank list must not disturb the rest.
    world.remove::<Health>(e);
    assert!(!world.has::<Health>(e));
    assert!(world.has::<Position>(e));
    assert!(world.has::<Velocity>(e));
    assert_eq!(world.get::<Position>(e).x, 1);
    assert_eq!(world.get::<Velocity>(e).vx, 3.0);
}

#[test]
fn add_remove_order_independence() {
    let mut world = World::new();

    // Add in order A, B, C; remove B.
    let e = world.create();
    world.add(e, Position { x: 1, y: 1 });
    world.add(e, Health { hp: 50 });
    world.add(e, Velocity { vx: 2.0, vy: 2.0 });

    world.remove::<Health>(e);
    assert_eq!(world.get::<Position>(e).x, 1);
    assert_eq!(world.get::<Velocity>(e).vx, 2.0);

    // Add in order C, A, B; remove A.
    let e = world.create();
    world.add(e, Velocity { vx: 5.0, vy: 5.0 });
    world.add(e, Position { x: 3, y: 3 });
    world.add(e, Health { hp: 75 });

    world.remove::<Position>(e);
    assert_eq!(world.get::<Velocity>(e).vx, 5.0);
    assert_eq!(world.get::<Health>(e).hp, 75);
}

#[test]
fn zero_sized_tag_component() {
    let mut world = World::new();
    let e = world.create();

    assert!(!world.has::<Tag>(e));
    world.add(e, Tag);
    assert!(world.has::<Tag>(e));

    let mut count = 0;
    world.each::<Tag, _>(|_, _| count += 1);
    assert_eq!(count, 1);

    world.remove::<Tag>(e);
    assert!(!world.has::<Tag>(e));
}

#[test]
fn compact_reference_access() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Health { hp: 12 });

    assert_eq!(world.try_get_at::<Health>(e.slot, e.gen).map(|h| h.hp), Some(12));
    assert!(world.try_get_at::<Position>(e.slot, e.gen).is_none());

    world.try_get_at_mut::<Health>(e.slot, e.gen).unwrap().hp = 21;
    assert_eq!(world.get::<Health>(e).hp, 21);

    world.destroy(e);
    assert!(world.try_get_at::<Health>(e.slot, e.gen).is_none());
}

#[test]
fn mutation_in_place() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 3, y: 4 });

    world.get_mut::<Position>(e).x = 9;
    assert_eq!(world.get::<Position>(e).x, 9);

    world.try_get_mut::<Position>(e).unwrap().y = 7;
    assert_eq!(world.get::<Position>(e).y, 7);
}
