//! Entity manager systems.
//!
//! - [`update_entity_managers`] syncs every [`EntityManager`] with the
//!   [`Container`] on the same ECS entity and advances its entities.
//! - [`process_keyboard_for_managers`] and [`process_mouse_for_managers`]
//!   offer input to the managed entities.
//!
//! Every system drains the manager's queued [`ManagerEvent`]s afterwards and
//! triggers them as [`EntityManagerEvent`]s, in the order they were raised.
//!
//! [`ManagerEvent`]: crate::components::entitymanager::ManagerEvent

use bevy_ecs::prelude::*;

use crate::components::container::Container;
use crate::components::entitymanager::EntityManager;
use crate::events::entitymanager::EntityManagerEvent;
use crate::resources::keyboard::Keyboard;
use crate::resources::mouse::MouseState;
use crate::resources::worldtime::WorldTime;

fn forward_events(container: Entity, manager: &mut EntityManager, commands: &mut Commands) {
    for event in manager.drain_events() {
        commands.trigger(EntityManagerEvent { container, event });
    }
}

/// Run `EntityManager::update` against the sibling `Container`.
pub fn update_entity_managers(
    mut query: Query<(Entity, &mut EntityManager, &Container)>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut manager, container) in query.iter_mut() {
        manager.update(container, time.delta);
        forward_events(entity, &mut manager, &mut commands);
    }
}

/// Offer the keyboard to managed entities when anything was pressed or released.
pub fn process_keyboard_for_managers(
    mut query: Query<(Entity, &mut EntityManager)>,
    keyboard: Res<Keyboard>,
    mut commands: Commands,
) {
    if !keyboard.has_keys_pressed() && keyboard.keys_released().is_empty() {
        return;
    }
    for (entity, mut manager) in query.iter_mut() {
        manager.process_keyboard(&keyboard);
        forward_events(entity, &mut manager, &mut commands);
    }
}

/// Offer the mouse to managed entities.
pub fn process_mouse_for_managers(
    mut query: Query<(Entity, &mut EntityManager)>,
    mouse: Res<MouseState>,
    mut commands: Commands,
) {
    for (entity, mut manager) in query.iter_mut() {
        manager.process_mouse(&mouse);
        forward_events(entity, &mut manager, &mut commands);
    }
}
