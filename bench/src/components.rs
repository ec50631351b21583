//! Common component types used across benchmarks.

use rusty_ecs::ecs::Component;

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Hit points (4 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Health(pub u32);
