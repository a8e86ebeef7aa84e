#![allow(dead_code)]

use ecs_core::World;

pub const AGENTS_SMALL: usize = 1_000;
pub const AGENTS_MED: usize = 10_000;
pub const AGENTS_LARGE: usize = 100_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Copy)]
pub struct Health {
    pub hp: i32,
}

pub fn populate(world: &mut World, count: usize) {
    for i in 0..count {
        let e = world.create();
        world.add(e, Position { x: i as f32, y: 0.0 });
        world.add(e, Velocity { vx: 1.0, vy: 1.0 });
        if i % 2 == 0 {
            world.add(e, Health { hp: i as i32 });
        }
    }
}

pub fn make_world(count: usize) -> World {
    let mut world = World::new();
    populate(&mut world, count);
    world
}
