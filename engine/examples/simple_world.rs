//! A small host loop: particles move each tick and expire after a fixed lifetime.
//!
//! Run with `cargo run --example simple_world`.

use std::any::Any;

use log::LevelFilter;
use rusty_ecs::{
    core::log::ChannelLogger,
    ecs::{
        Component, ComponentSystem, Entity, System,
        component::Tag,
        context::Context,
        system::HookKind,
        world::World,
    },
};

const TICKS: u32 = 6;

#[derive(Component, Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Component, Debug)]
struct Lifetime(u32);

/// Frame data handed to every system.
#[derive(Default)]
struct Frame {
    tick: u32,
    moved: usize,
}

struct Movement;

impl ComponentSystem for Movement {
    type Components = (Position, Velocity, Tag);

    fn on_process(
        &mut self,
        _: Entity,
        (position, velocity, tag): (&mut Position, &mut Velocity, &mut Tag),
        data: &mut dyn Any,
    ) {
        if tag.contains(Tag::IGNORE) {
            return;
        }
        position.x += velocity.dx;
        position.y += velocity.dy;
        if let Some(frame) = data.downcast_mut::<Frame>() {
            frame.moved += 1;
        }
    }
}

/// Ages every entity and destroys, with deferral, those whose lifetime ran out.
struct Expiry;

impl System for Expiry {
    fn process(&mut self, context: &mut Context, _: &mut dyn Any) {
        let mut expired = Vec::new();
        for (entity, lifetime) in context.view::<Lifetime>().iter_mut() {
            lifetime.0 = lifetime.0.saturating_sub(1);
            if lifetime.0 == 0 {
                expired.push(entity);
            }
        }
        for entity in expired {
            context.destroy_with(entity, true, |context, entity| {
                if let Some(position) = context.get_component::<Position>(entity) {
                    println!("  {entity} expired at ({:.1}, {:.1})", position.x, position.y);
                }
            });
        }
    }
}

fn main() {
    let logs = ChannelLogger::install(LevelFilter::Info).ok();

    let mut world = World::new();
    world.reserve_systems(2);
    world.register(false, Movement);
    world.register(true, Expiry);
    world.attach::<Movement>(HookKind::Enable, |context, _| {
        println!("movement enabled for {} entities", context.entity_count());
    });
    world.attach::<Movement>(HookKind::PostProcess, |_, data| {
        if let Some(frame) = data.downcast_mut::<Frame>() {
            println!("  moved {} entities", frame.moved);
        }
    });

    for i in 0..5u32 {
        let flags = if i == 4 { Tag::IGNORE } else { Tag::NONE };
        let entity = world.create_tagged(flags);
        world.append(entity, Position { x: 0.0, y: 0.0 });
        world.append(
            entity,
            Velocity {
                dx: i as f32,
                dy: 1.0,
            },
        );
        world.append(entity, Lifetime(2 + i));
    }

    world.enable::<Movement>(&mut Frame::default());

    for tick in 0..TICKS {
        println!("tick {tick}: {} entities", world.entity_count());
        let mut frame = Frame {
            tick,
            ..Frame::default()
        };
        world.process_active(&mut frame);
        world.sweep();
        debug_assert_eq!(frame.tick, tick);
    }

    if let Some(logs) = logs {
        for message in logs.try_iter() {
            println!("[{}] {}", message.level, message.message);
        }
    }
}
