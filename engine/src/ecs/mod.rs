pub mod capacity;
pub mod component;
pub mod context;
pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod query;
pub mod storage;
pub mod system;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use context::Context;
pub use entity::Entity;
pub use fingerprint::Fingerprint;
pub use system::{ComponentSystem, System};
pub use world::World;
