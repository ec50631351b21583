//! Storage sizing policy shared by the entity allocator and every component storage.
//!
//! A [`Capacity`] pairs a baseline storage size with a growth offset. Storages start with at
//! least `size` slots and grow by `offset` slots whenever they run out, trading allocation
//! frequency for predictable memory growth.
//!
//! # Process-wide configuration
//!
//! [`configure`] installs the capacity used by default constructors (`Context::new`,
//! `World::new`, ...). It must run before any of those objects is created: the first call to
//! [`current`] freezes the value, and `configure` fails from then on. Objects built with an
//! explicit capacity (`Context::with_capacity`) are unaffected by the global value.

use once_cell::sync::OnceCell;

use crate::ecs::error::CapacityError;

/// Baseline size and growth increment for entity and component storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capacity {
    size: u32,
    offset: u32,
}

impl Capacity {
    /// The default policy: 32 slots, growing by 16.
    pub const DEFAULT: Self = Self {
        size: 32,
        offset: 32 / 2,
    };

    /// Construct a capacity policy. Both values must be non zero.
    pub const fn new(size: u32, offset: u32) -> Result<Self, CapacityError> {
        if size == 0 {
            return Err(CapacityError::ZeroSize);
        }
        if offset == 0 {
            return Err(CapacityError::ZeroOffset);
        }
        Ok(Self { size, offset })
    }

    /// The baseline number of slots a storage starts with.
    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// The number of slots added each time a storage is exhausted.
    #[inline]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// The capacity a storage gets when `requested` slots are asked for: never below `size`.
    #[inline]
    pub const fn storage_capacity(&self, requested: u32) -> u32 {
        if self.size < requested {
            requested
        } else {
            self.size
        }
    }

    /// The capacity after one growth step from `current`.
    #[inline]
    pub const fn grow(&self, current: u32) -> u32 {
        current.saturating_add(self.offset)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static GLOBAL: OnceCell<Capacity> = OnceCell::new();

/// Install the process-wide capacity. Fails once a capacity has been configured or read.
pub fn configure(capacity: Capacity) -> Result<(), CapacityError> {
    GLOBAL
        .set(capacity)
        .map_err(|_| CapacityError::AlreadyConfigured { current: current() })?;
    log::debug!(
        "configured storage capacity: size {}, offset {}",
        capacity.size,
        capacity.offset
    );
    Ok(())
}

/// The process-wide capacity. The first call freezes the value.
#[inline]
pub fn current() -> Capacity {
    *GLOBAL.get_or_init(Capacity::default)
}
