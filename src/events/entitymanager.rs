//! Entity manager events.
//!
//! [`EntityManagerEvent`] wraps a [`ManagerEvent`] together with the ECS
//! entity carrying the [`EntityManager`](crate::components::entitymanager::EntityManager)
//! that raised it.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<EntityManagerEvent>| {
//!     if let ManagerEvent::ZoneEntered { entity, zone, .. } = &trigger.event().event {
//!         info!("{} entered zone {}", entity, zone);
//!     }
//! });
//! ```

use bevy_ecs::prelude::*;

use crate::components::entitymanager::ManagerEvent;

#[derive(Event, Debug, Clone)]
pub struct EntityManagerEvent {
    /// ECS entity holding the manager and its container.
    pub container: Entity,
    pub event: ManagerEvent,
}
