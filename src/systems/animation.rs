//! Animation system for free-standing grid entities.
//!
//! [`update_grid_entities`] advances every [`GridEntity`] component in the
//! world and triggers a [`GridAnimationEvent`] for each state change of its
//! active animation. Entities owned by an
//! [`EntityManager`](crate::components::entitymanager::EntityManager) are
//! advanced by the manager instead.

use bevy_ecs::prelude::*;

use crate::components::gridentity::GridEntity;
use crate::events::animation::GridAnimationEvent;
use crate::resources::worldtime::WorldTime;

/// Advance animation playback of every `GridEntity` component.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Mutates the entity's active animation (gated by `do_update`).
/// - Triggers [`GridAnimationEvent`] for buffered state changes.
pub fn update_grid_entities(
    mut query: Query<(Entity, &mut GridEntity)>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut grid_entity) in query.iter_mut() {
        grid_entity.update(time.delta);
        for change in grid_entity.drain_animation_events() {
            commands.trigger(GridAnimationEvent { entity, change });
        }
    }
}
