//! Engine plumbing shared by hosts of the ECS.

pub mod log;
