//! Error types surfaced by the ECS.
//!
//! Most ECS operations never fail: lookups return `Option` and no-op conditions return `false`.
//! The errors here cover setup-time misuse, where the caller may prefer a `Result` over a panic.

use thiserror::Error;

use crate::ecs::{capacity::Capacity, fingerprint::Fingerprint};

/// Errors raised while building or installing a [`Capacity`] configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("storage size must be non zero")]
    ZeroSize,

    #[error("storage growth offset must be non zero")]
    ZeroOffset,

    #[error("capacity is already configured (size {}, offset {})", .current.size(), .current.offset())]
    AlreadyConfigured { current: Capacity },
}

/// Errors raised while registering a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("system '{name}' is already registered (fingerprint {fingerprint})")]
    Duplicate {
        name: &'static str,
        fingerprint: Fingerprint,
    },
}
