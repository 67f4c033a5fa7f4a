//! Animation state events for free-standing grid entities.

use bevy_ecs::prelude::*;

use crate::components::gridentity::AnimationStateChanged;

/// The active animation of a [`GridEntity`](crate::components::gridentity::GridEntity)
/// component changed state.
#[derive(Event, Debug, Clone)]
pub struct GridAnimationEvent {
    pub entity: Entity,
    pub change: AnimationStateChanged,
}
