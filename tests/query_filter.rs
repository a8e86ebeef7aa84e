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
struct Counter {
    value: i32,
}

#[derive(Clone, Copy)]
struct Unused;

#[test]
fn each_visits_all_records() {
    let mut world = World::new();
    let a = world.create();
    let b = world.create();
    world.add(a, Health { hp: 5 });
    world.add(b, Health { hp: 7 });

    let mut sum = 0;
    let mut count = 0;
    world.each::<Health, _>(|_, health| {
        sum += health.hp;
        count += 1;
    });

    assert_eq!(count, 2);
    assert_eq!(sum, 12);
}

#[test]
fn each_skips_destroyed_entities() {
    let mut world = World::new();
    let a = world.create();
    let b = world.create();
    let c = world.create();

    world.add(a, Counter { value: 1 });
    world.add(b, Counter { value: 2 });
    world.add(c, Counter { value: 3 });

    world.destroy(b);

    let mut sum = 0;
    let mut count = 0;
    world.each::<Counter, _>(|_, counter| {
        sum += counter.value;
        count += 1;
    });

    assert_eq!(count, 2);
    assert_eq!(sum, 4);
}

#[test]
fn each_mutations_are_visible() {
    let mut world = World::new();

    for i in 0..10 {
        let e = world.create();
        world.add(e, Counter { value: i });
    }

    world.each::<Counter, _>(|_, counter| counter.value *= 2);

    let mut sum = 0;
    world.each::<Counter, _>(|_, counter| sum += counter.value);
    assert_eq!(sum, 90);
}

#[test]
fn query_filters_by_required_signature() {
    let mut world = World::new();

    let e1 = world.create();
    world.add(e1, Position { x: 1, y: 1 });

    let e2 = world.create();
    world.add(e2, Position { x: 2, y: 2 });
    world.add(e2, Health { hp: 10 });

    let e3 = world.create();
    world.add(e3, Health { hp: 20 });

    let e4 = world.create();
    world.add(e4, Position { x: 3, y: 3 });
    world.add(e4, Health { hp: 30 });
    world.add(e4, Velocity { vx: 4.0, vy: 4.0 });

    let mut visited = Vec::new();
    let mut sum = 0;
    world.query2::<Position, Health, _>(|entity, position, health| {
        visited.push(entity.id);
        sum += position.x + health.hp;
        health.hp += 1;
    });

    // Exactly the {P,H} and {P,H,V} entities, in position-pool order.
    assert_eq!(visited, vec![e2.id, e4.id]);
    assert_eq!(sum, 45);
    assert_eq!(world.get::<Health>(e2).hp, 11);
    assert_eq!(world.get::<Health>(e4).hp, 31);
}

#[test]
fn query_missing_required_pool_visits_nothing() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 1, y: 2 });

    let mut count = 0;
    world.query2::<Position, Unused, _>(|_, _, _| count += 1);
    assert_eq!(count, 0);
}

#[test]
fn query_missing_driver_pool_visits_nothing() {
    let mut world = World::new();
    let e = world.create();
    world.add(e, Position { x: 1, y: 2 });

    let mut count = 0;
    world.query2::<Unused, Position, _>(|_, _, _| count += 1);
    assert_eq!(count, 0);
}

#[test]
fn query_three_components() {
    let mut world = World::new();

    let full = world.create();
    world.add(full, Position { x: 1, y: 0 });
    world.add(full, Health { hp: 2 });
    world.add(full, Velocity { vx: 3.0, vy: 0.0 });

    let partial = world.create();
    world.add(partial, Position { x: 10, y: 0 });
    world.add(partial, Health { hp: 20 });

    let mut visited = Vec::new();
    world.query3::<Position, Health, Velocity, _>(|entity, position, health, velocity| {
        visited.push((entity.id, position.x, health.hp, velocity.vx as i32));
    });

    assert_eq!(visited, vec![(full.id, 1, 2, 3)]);
}

#[test]
fn query_four_components() {
    let mut world = World::new();

    let full = world.create();
    world.add(full, Position { x: 1, y: 0 });
    world.add(full, Health { hp: 2 });
    world.add(full, Velocity { vx: 3.0, vy: 0.0 });
    world.add(full, Counter { value: 4 });

    let partial = world.create();
    world.add(partial, Position { x: 10, y: 0 });
    world.add(partial, Health { hp: 20 });
    world.add(partial, Velocity { vx: 30.0, vy: 0.0 });

    let mut visited = Vec::new();
    world.query4::<Position, Health, Velocity, Counter, _>(
        |entity, position, health, velocity, counter| {
            visited.push((entity.id, position.x, health.hp, velocity.vx as i32, counter.value));
        },
    );

    assert_eq!(visited, vec![(full.id, 1, 2, 3, 4)]);
}

#[test]
fn query_skips_destroyed_entities() {
    let mut world = World::new();

    let a = world.create();
    world.add(a, Position { x: 1, y: 0 });
    world.add(a, Health { hp: 1 });

    let b = world.create();
    world.add(b, Position { x: 2, y: 0 });
    world.add(b, Health { hp: 2 });

    world.destroy(a);

    let mut visited = Vec::new();
    world.query2::<Position, Health, _>(|entity, _, _| visited.push(entity.id));
    assert_eq!(visited, vec![b.id]);
}
