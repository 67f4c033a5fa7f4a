//! Usage errors.
//!
//! These signal a caller defect rather than a runtime condition: removing the
//! `"default"` animation, handing one entity to two managers, clearing a
//! manager wholesale, or naming an entity/zone/hotspot the manager does not
//! track. Nothing in the crate retries or recovers from them.

use std::fmt;

use crate::components::entitymanager::{HotspotId, ManagerId, ZoneId};
use crate::components::gridentity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// The animation named `"default"` can be replaced but never removed.
    DefaultAnimationRemoval,
    /// The entity already belongs to another manager.
    AlreadyParented { entity: EntityId, parent: ManagerId },
    /// The entity is already tracked by this manager.
    AlreadyTracked(EntityId),
    /// Bulk clearing skips per-entity teardown; use `remove_all`.
    ClearUnsupported,
    UnknownEntity(EntityId),
    UnknownZone(ZoneId),
    UnknownHotspot(HotspotId),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::DefaultAnimationRemoval => write!(
                f,
                "cannot remove the default animation; replace it by adding an animation named \"default\""
            ),
            UsageError::AlreadyParented { entity, parent } => write!(
                f,
                "entity {entity} is already parented to manager {parent}"
            ),
            UsageError::AlreadyTracked(entity) => {
                write!(f, "entity {entity} is already tracked by this manager")
            }
            UsageError::ClearUnsupported => write!(
                f,
                "clearing the entity collection is not supported; use remove_all"
            ),
            UsageError::UnknownEntity(entity) => {
                write!(f, "entity {entity} is not managed by this entity manager")
            }
            UsageError::UnknownZone(zone) => write!(f, "zone {zone} is not registered"),
            UsageError::UnknownHotspot(hotspot) => {
                write!(f, "hotspot {hotspot} is not registered")
            }
        }
    }
}

impl std::error::Error for UsageError {}
