use ecs_core::{World, GEN_ALIVE_BIT, GEN_MASK};

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
struct Counter {
    value: i32,
}

#[test]
fn create_destroy_lifecycle() {
    let mut world = World::new();
    let e = world.create();
    assert!(world.is_alive(e));

    world.destroy(e);
    assert!(!world.is_alive(e));

    let e2 = world.create();
    assert!(world.is_alive(e2));
    assert!(e2.id > e.id);
    assert_eq!(e2.slot, e.slot);
    assert_eq!(e2.gen, e.gen + 1);
}

#[test]
fn slot_reuse_increments_generation() {
    let mut world = World::new();

    let e1 = world.create();
    let old_slot = e1.slot;
    let old_gen = e1.gen;

    world.destroy(e1);
    assert!(!world.is_alive(e1));

    let e2 = world.create();
    assert_eq!(e2.slot, old_slot);
    let expected_gen = ((old_gen + 1) & GEN_MASK) | GEN_ALIVE_BIT;
    assert_eq!(e2.gen, expected_gen);
    assert_eq!(e2.id, e1.id + 1);

    assert!(!world.is_alive(e1));
    assert!(world.is_alive(e2));
}

#[test]
fn entity_id_strictly_increases() {
    let mut world = World::new();

    let e1 = world.create();
    let e2 = world.create();
    world.destroy(e1);
    let e3 = world.create();
    let e4 = world.create();

    assert!(e1.id < e2.id);
    assert!(e2.id < e3.id);
    assert!(e3.id < e4.id);
}

#[test]
fn stale_handle_rejected_after_destruction() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 5, y: 5 });

    let stale = e;
    world.destroy(e);

    assert!(!world.is_alive(stale));
    assert!(!world.has::<Position>(stale));
    assert!(world.try_get::<Position>(stale).is_none());

    // The reused slot must not resurrect the stale handle.
    let e2 = world.create();
    world.add(e2, Position { x: 10, y: 10 });

    assert!(!world.has::<Position>(stale));
    assert_eq!(world.get::<Position>(e2).x, 10);
}

#[test]
fn destroy_stale_handle_is_noop() {
    let mut world = World::new();
    let e = world.create();
    world.destroy(e);

    let replacement = world.create();
    world.add(replacement, Health { hp: 3 });

    world.destroy(e);
    assert!(world.is_alive(replacement));
    assert_eq!(world.get::<Health>(replacement).hp, 3);
}

#[test]
fn resolve_from_slot_and_generation() {
    let mut world = World::new();
    let a = world.create();

    let r0 = world.resolve(a.slot, a.gen);
    assert_eq!(r0, a);

    world.destroy(a);
    let r1 = world.resolve(a.slot, a.gen);
    assert!(r1.is_null());

    let b = world.create();
    assert_eq!(b.slot, a.slot);
    assert_eq!(b.gen, a.gen + 1);
    let r2 = world.resolve(b.slot, b.gen);
    assert_eq!(r2.id, b.id);
    let r3 = world.resolve(b.slot, a.gen);
    assert!(r3.is_null());
}

#[test]
fn destroy_removes_all_components() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 1, y: 2 });
    world.add(e, Health { hp: 100 });
    world.add(e, Velocity { vx: 3.0, vy: 4.0 });

    world.destroy(e);

    let mut pos_count = 0;
    let mut hp_count = 0;
    let mut vel_count = 0;
    world.each::<Position, _>(|_, _| pos_count += 1);
    world.each::<Health, _>(|_, _| hp_count += 1);
    world.each::<Velocity, _>(|_, _| vel_count += 1);

    assert_eq!(pos_count, 0);
    assert_eq!(hp_count, 0);
    assert_eq!(vel_count, 0);
}

#[test]
fn churn_many_entities() {
    let mut world = World::new();
    const N: i32 = 1000;

    let mut entities = Vec::with_capacity(N as usize);
    for i in 0..N {
        let e = world.create();
        world.add(e, Counter { value: i });
        entities.push(e);
    }

    for i in (0..N).step_by(2) {
        world.destroy(entities[i as usize]);
    }

    let mut sum = 0;
    let mut count = 0;
    world.each::<Counter, _>(|_, counter| {
        sum += counter.value;
        count += 1;
    });

    assert_eq!(count, N / 2);
    let expected_sum: i32 = (1..N).step_by(2).sum();
    assert_eq!(sum, expected_sum);
}
