//! Process-wide capacity configuration. Kept in its own test binary because the configured
//! value is frozen for the rest of the process.

use rusty_ecs::ecs::{
    Entity,
    capacity::{self, Capacity},
    context::Context,
    error::CapacityError,
};

#[test]
fn configure_once_before_first_use() {
    // Given
    let custom = Capacity::new(8, 4).unwrap();

    // When
    let configured = capacity::configure(custom);

    // Then
    assert_eq!(configured, Ok(()));
    assert_eq!(capacity::current(), custom);

    // When - Contexts built from the global value follow it
    let mut context = Context::new();
    for _ in 0..9 {
        context.create();
    }

    // Then
    assert_eq!(context.capacity(), custom);
    assert_eq!(context.entity_capacity(), 12);
    assert_eq!(context.registry().capacity::<Entity>(), 12);

    // When - A second configuration is rejected
    let again = capacity::configure(Capacity::DEFAULT);

    // Then
    assert_eq!(again, Err(CapacityError::AlreadyConfigured { current: custom }));
    assert_eq!(capacity::current(), custom);

    // Then - Explicit capacities bypass the global value
    assert_eq!(Context::with_capacity(Capacity::DEFAULT).entity_capacity(), 32);
}
