//! Zone and hotspot tracking for a collection of [`GridEntity`]s.
//!
//! An [`EntityManager`] owns the entities handed to it and bridges them to the
//! [`Container`] it is attached to: every update it assigns each entity's render
//! offset and visibility from the container's viewport, advances animations,
//! and forwards animation state changes.
//!
//! Movement is evaluated whenever an entity is moved through the manager
//! ([`EntityManager::set_entity_position`] or the [`EntityMut`] guard returned by
//! [`EntityManager::entity_mut`]). A move raises, in order:
//!
//! 1. [`ManagerEvent::EntityMoved`]
//! 2. zone transitions: `ZoneMoved` inside the same zone, `ZoneExited` +
//!    `ZoneEntered` between zones, or a single `ZoneEntered`/`ZoneExited`
//! 3. hotspot transitions: `HotspotExited` and/or `HotspotEntered`
//!
//! Events are delivered synchronously to listeners registered with
//! [`EntityManager::subscribe`] and queued for [`EntityManager::drain_events`].
//! Disabled entities raise no events but their membership and the position
//! index stay current.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::Component;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::container::Container;
use crate::components::framebuffer::RenderSurface;
use crate::components::gridentity::{AnimationStateChanged, EntityId, GridEntity};
use crate::error::UsageError;
use crate::geometry::{Point, Rect};
use crate::resources::keyboard::Keyboard;
use crate::resources::mouse::MouseState;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an [`EntityManager`], recorded as the parent of its entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManagerId(u64);

impl ManagerId {
    fn next() -> Self {
        ManagerId(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a zone registered with a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a hotspot registered with a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotspotId(u64);

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rectangular trigger region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub area: Rect,
}

impl Zone {
    pub fn new(name: impl Into<String>, area: Rect) -> Self {
        Self {
            name: name.into(),
            area,
        }
    }
}

/// A trigger region made of arbitrary, possibly scattered, cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub name: String,
    pub positions: FxHashSet<Point>,
}

impl Hotspot {
    pub fn new(name: impl Into<String>, positions: impl IntoIterator<Item = Point>) -> Self {
        Self {
            name: name.into(),
            positions: positions.into_iter().collect(),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.positions.contains(&point)
    }
}

/// Notification raised by an [`EntityManager`].
///
/// Zone and hotspot events carry the position that triggered them: the new
/// position for enter events and the previous position for exit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    EntityMoved {
        entity: EntityId,
        from: Point,
        to: Point,
    },
    ZoneEntered {
        entity: EntityId,
        zone: ZoneId,
        position: Point,
    },
    ZoneExited {
        entity: EntityId,
        zone: ZoneId,
        position: Point,
    },
    /// The entity moved but stayed inside the same zone.
    ZoneMoved {
        entity: EntityId,
        zone: ZoneId,
        from: Point,
        to: Point,
    },
    HotspotEntered {
        entity: EntityId,
        hotspot: HotspotId,
        position: Point,
    },
    HotspotExited {
        entity: EntityId,
        hotspot: HotspotId,
        position: Point,
    },
    AnimationStateChanged(AnimationStateChanged),
}

impl ManagerEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            ManagerEvent::EntityMoved { entity, .. }
            | ManagerEvent::ZoneEntered { entity, .. }
            | ManagerEvent::ZoneExited { entity, .. }
            | ManagerEvent::ZoneMoved { entity, .. }
            | ManagerEvent::HotspotEntered { entity, .. }
            | ManagerEvent::HotspotExited { entity, .. } => *entity,
            ManagerEvent::AnimationStateChanged(change) => change.entity,
        }
    }
}

type ManagerListener = Arc<dyn Fn(&ManagerEvent) + Send + Sync>;

/// Cached membership of one tracked entity.
#[derive(Debug, Clone, Copy)]
struct EntityState {
    position: Point,
    zone: Option<ZoneId>,
    hotspot: Option<HotspotId>,
    disabled: bool,
}

/// Everything the manager keeps besides the entities themselves. Split out so
/// a borrowed entity and the bookkeeping can be mutated together.
#[derive(Default)]
struct Tracking {
    states: FxHashMap<EntityId, EntityState>,
    zones: Vec<(ZoneId, Zone)>,
    hotspots: Vec<(HotspotId, Hotspot)>,
    next_zone: u64,
    next_hotspot: u64,
    index: FxHashMap<Point, SmallVec<[EntityId; 4]>>,
    listeners: Vec<ManagerListener>,
    pending: Vec<ManagerEvent>,
}

impl Tracking {
    fn zone_at(&self, point: Point) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|(_, zone)| zone.area.contains(point))
            .map(|(id, _)| *id)
    }

    fn hotspot_at(&self, point: Point) -> Option<HotspotId> {
        self.hotspots
            .iter()
            .find(|(_, hotspot)| hotspot.contains(point))
            .map(|(id, _)| *id)
    }

    fn index_insert(&mut self, entity: EntityId, position: Point) {
        self.index.entry(position).or_default().push(entity);
    }

    fn index_remove(&mut self, entity: EntityId, position: Point) {
        if let Some(list) = self.index.get_mut(&position) {
            list.retain(|e| *e != entity);
            if list.is_empty() {
                self.index.remove(&position);
            }
        }
    }

    fn emit(&mut self, event: ManagerEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
        self.pending.push(event);
    }

    /// Forwards buffered animation notifications and evaluates movement.
    fn settle(&mut self, entity: &mut GridEntity) {
        let changes: SmallVec<[AnimationStateChanged; 4]> =
            entity.drain_animation_events().collect();
        for change in changes {
            self.emit(ManagerEvent::AnimationStateChanged(change));
        }
        self.evaluate_move(entity);
    }

    fn evaluate_move(&mut self, entity: &GridEntity) {
        let id = entity.id();
        let to = entity.position();
        let Some(state) = self.states.get(&id) else {
            return;
        };
        if state.position == to {
            return;
        }
        let (from, disabled) = (state.position, state.disabled);

        self.index_remove(id, from);
        self.index_insert(id, to);
        if !disabled {
            self.emit(ManagerEvent::EntityMoved {
                entity: id,
                from,
                to,
            });
        }
        self.update_membership(id, from, to, true);
    }

    /// Recomputes zone and hotspot membership at `to` and raises the
    /// transitions from the cached membership.
    fn update_membership(&mut self, id: EntityId, from: Point, to: Point, moved: bool) {
        let zone = self.zone_at(to);
        let hotspot = self.hotspot_at(to);
        let Some(state) = self.states.get_mut(&id) else {
            return;
        };
        let (old_zone, old_hotspot) = (state.zone, state.hotspot);
        state.position = to;
        state.zone = zone;
        state.hotspot = hotspot;
        if state.disabled {
            return;
        }

        let mut events: SmallVec<[ManagerEvent; 4]> = SmallVec::new();
        match (old_zone, zone) {
            (Some(old), Some(new)) if old == new => {
                if moved {
                    events.push(ManagerEvent::ZoneMoved {
                        entity: id,
                        zone: new,
                        from,
                        to,
                    });
                }
            }
            (old, new) => {
                if let Some(old) = old {
                    events.push(ManagerEvent::ZoneExited {
                        entity: id,
                        zone: old,
                        position: from,
                    });
                }
                if let Some(new) = new {
                    events.push(ManagerEvent::ZoneEntered {
                        entity: id,
                        zone: new,
                        position: to,
                    });
                }
            }
        }
        // every step on hotspot cells re-triggers it, even inside one hotspot
        if old_hotspot != hotspot || (moved && hotspot.is_some()) {
            if let Some(old) = old_hotspot {
                events.push(ManagerEvent::HotspotExited {
                    entity: id,
                    hotspot: old,
                    position: from,
                });
            }
            if let Some(new) = hotspot {
                events.push(ManagerEvent::HotspotEntered {
                    entity: id,
                    hotspot: new,
                    position: to,
                });
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    /// Re-evaluates every tracked entity in place after zones or hotspots changed.
    fn refresh_all(&mut self, order: &[EntityId]) {
        for &id in order {
            if let Some(state) = self.states.get(&id) {
                let position = state.position;
                self.update_membership(id, position, position, false);
            }
        }
    }
}

/// Owns a set of [`GridEntity`]s and raises zone/hotspot events as they move.
#[derive(Component)]
pub struct EntityManager {
    id: ManagerId,
    entities: FxHashMap<EntityId, GridEntity>,
    order: Vec<EntityId>,
    tracking: Tracking,
    viewport: Option<Rect>,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            id: ManagerId::next(),
            entities: FxHashMap::default(),
            order: Vec::new(),
            tracking: Tracking::default(),
            viewport: None,
        }
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Viewport cached by the last [`EntityManager::update`], if the container had one.
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// Takes ownership of `entity` and starts tracking it.
    ///
    /// Membership is computed at the entity's current position without
    /// raising events. Fails if the entity already belongs to a manager or if
    /// an entity with the same identity is already tracked here.
    pub fn add_entity(&mut self, mut entity: GridEntity) -> Result<EntityId, UsageError> {
        let id = entity.id();
        if let Some(parent) = entity.parent() {
            let err = if parent == self.id {
                UsageError::AlreadyTracked(id)
            } else {
                UsageError::AlreadyParented { entity: id, parent }
            };
            warn!("EntityManager {}: rejected entity {}: {}", self.id, id, err);
            return Err(err);
        }
        if self.entities.contains_key(&id) {
            warn!("EntityManager {}: entity {} is already tracked", self.id, id);
            return Err(UsageError::AlreadyTracked(id));
        }

        entity.set_parent(Some(self.id));
        entity.drain_animation_events().for_each(drop);
        let position = entity.position();
        let state = EntityState {
            position,
            zone: self.tracking.zone_at(position),
            hotspot: self.tracking.hotspot_at(position),
            disabled: false,
        };
        self.tracking.states.insert(id, state);
        self.tracking.index_insert(id, position);
        self.entities.insert(id, entity);
        self.order.push(id);
        debug!("EntityManager {}: added entity {} at {:?}", self.id, id, position);
        Ok(id)
    }

    /// Stops tracking an entity and hands it back with its parent cleared.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<GridEntity, UsageError> {
        let mut entity = self
            .entities
            .remove(&id)
            .ok_or(UsageError::UnknownEntity(id))?;
        self.order.retain(|e| *e != id);
        if let Some(state) = self.tracking.states.remove(&id) {
            self.tracking.index_remove(id, state.position);
        }
        entity.set_parent(None);
        debug!("EntityManager {}: removed entity {}", self.id, id);
        Ok(entity)
    }

    /// Removes every entity, running the same teardown as [`EntityManager::remove_entity`].
    pub fn remove_all(&mut self) -> Vec<GridEntity> {
        let ids = std::mem::take(&mut self.order);
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(mut entity) = self.entities.remove(&id) {
                entity.set_parent(None);
                removed.push(entity);
            }
        }
        self.tracking.states.clear();
        self.tracking.index.clear();
        debug!("EntityManager {}: removed {} entities", self.id, removed.len());
        removed
    }

    /// Always fails: wholesale clearing would skip per-entity teardown.
    /// Use [`EntityManager::remove_all`].
    pub fn clear(&mut self) -> Result<(), UsageError> {
        warn!("EntityManager {}: clear is not supported", self.id);
        Err(UsageError::ClearUnsupported)
    }

    pub fn entity(&self, id: EntityId) -> Option<&GridEntity> {
        self.entities.get(&id)
    }

    /// Mutable access to a tracked entity. Movement and animation changes are
    /// evaluated when the guard is dropped.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        let entity = self.entities.get_mut(&id)?;
        Some(EntityMut {
            entity,
            tracking: &mut self.tracking,
        })
    }

    /// Tracked entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &GridEntity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Moves an entity and raises the resulting events.
    pub fn set_entity_position(&mut self, id: EntityId, position: Point) -> Result<(), UsageError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(UsageError::UnknownEntity(id))?;
        entity.set_position(position);
        self.tracking.evaluate_move(entity);
        Ok(())
    }

    /// Ids of the entities currently at `position`.
    pub fn entity_ids_at(&self, position: Point) -> &[EntityId] {
        self.tracking
            .index
            .get(&position)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn entities_at(&self, position: Point) -> impl Iterator<Item = &GridEntity> {
        self.entity_ids_at(position)
            .iter()
            .filter_map(|id| self.entities.get(id))
    }

    /// Stops raising zone and hotspot events for an entity.
    pub fn disable_entity(&mut self, id: EntityId) -> Result<(), UsageError> {
        self.state_mut(id)?.disabled = true;
        Ok(())
    }

    pub fn enable_entity(&mut self, id: EntityId) -> Result<(), UsageError> {
        self.state_mut(id)?.disabled = false;
        Ok(())
    }

    pub fn is_entity_disabled(&self, id: EntityId) -> Result<bool, UsageError> {
        self.tracking
            .states
            .get(&id)
            .map(|state| state.disabled)
            .ok_or(UsageError::UnknownEntity(id))
    }

    fn state_mut(&mut self, id: EntityId) -> Result<&mut EntityState, UsageError> {
        match self.tracking.states.get_mut(&id) {
            Some(state) => Ok(state),
            None => {
                warn!("EntityManager {}: entity {} is not managed here", self.id, id);
                Err(UsageError::UnknownEntity(id))
            }
        }
    }

    /// Registers a zone. Enabled entities already inside it get an enter event.
    pub fn add_zone(&mut self, zone: Zone) -> ZoneId {
        self.tracking.next_zone += 1;
        let id = ZoneId(self.tracking.next_zone);
        debug!("EntityManager {}: added zone {} '{}'", self.id, id, zone.name);
        self.tracking.zones.push((id, zone));
        self.tracking.refresh_all(&self.order);
        id
    }

    /// Unregisters a zone. Enabled entities that were inside it get an exit event.
    pub fn remove_zone(&mut self, id: ZoneId) -> Result<Zone, UsageError> {
        let index = self
            .tracking
            .zones
            .iter()
            .position(|(zone_id, _)| *zone_id == id)
            .ok_or(UsageError::UnknownZone(id))?;
        let (_, zone) = self.tracking.zones.remove(index);
        self.tracking.refresh_all(&self.order);
        Ok(zone)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.tracking
            .zones
            .iter()
            .find(|(zone_id, _)| *zone_id == id)
            .map(|(_, zone)| zone)
    }

    pub fn zones(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.tracking.zones.iter().map(|(id, zone)| (*id, zone))
    }

    /// Entities whose cached membership is `zone`, in insertion order.
    pub fn entities_in_zone(&self, zone: ZoneId) -> Result<Vec<EntityId>, UsageError> {
        if self.zone(zone).is_none() {
            return Err(UsageError::UnknownZone(zone));
        }
        Ok(self
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.tracking
                    .states
                    .get(id)
                    .is_some_and(|state| state.zone == Some(zone))
            })
            .collect())
    }

    /// Registers a hotspot. Enabled entities already on it get an enter event.
    pub fn add_hotspot(&mut self, hotspot: Hotspot) -> HotspotId {
        self.tracking.next_hotspot += 1;
        let id = HotspotId(self.tracking.next_hotspot);
        debug!("EntityManager {}: added hotspot {} '{}'", self.id, id, hotspot.name);
        self.tracking.hotspots.push((id, hotspot));
        self.tracking.refresh_all(&self.order);
        id
    }

    pub fn remove_hotspot(&mut self, id: HotspotId) -> Result<Hotspot, UsageError> {
        let index = self
            .tracking
            .hotspots
            .iter()
            .position(|(hotspot_id, _)| *hotspot_id == id)
            .ok_or(UsageError::UnknownHotspot(id))?;
        let (_, hotspot) = self.tracking.hotspots.remove(index);
        self.tracking.refresh_all(&self.order);
        Ok(hotspot)
    }

    pub fn hotspot(&self, id: HotspotId) -> Option<&Hotspot> {
        self.tracking
            .hotspots
            .iter()
            .find(|(hotspot_id, _)| *hotspot_id == id)
            .map(|(_, hotspot)| hotspot)
    }

    pub fn hotspots(&self) -> impl Iterator<Item = (HotspotId, &Hotspot)> {
        self.tracking.hotspots.iter().map(|(id, hotspot)| (*id, hotspot))
    }

    /// Registers a listener called synchronously for every event.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&ManagerEvent) + Send + Sync + 'static,
    {
        self.tracking.listeners.push(Arc::new(listener));
    }

    /// Removes and returns the events queued since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ManagerEvent> {
        self.tracking.pending.drain(..)
    }

    /// Syncs render offsets and visibility with `container`, then advances
    /// every entity by `delta` seconds.
    pub fn update(&mut self, container: &Container, delta: f32) {
        self.viewport = container.viewport;
        let offset = match container.viewport {
            Some(viewport) => container.position - viewport.position(),
            None => container.position,
        };
        let bounds = container.bounds();

        let Self {
            entities,
            order,
            tracking,
            viewport,
            ..
        } = self;
        for id in order.iter() {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            entity.set_position_offset(offset);
            let position = entity.position();
            entity.is_visible = match viewport {
                Some(viewport) => viewport.contains(position),
                None => bounds.contains(position),
            };
            entity.update(delta);
            tracking.settle(entity);
        }
    }

    /// Offers the keyboard to each entity in turn. Returns true as soon as one
    /// of them handles it.
    pub fn process_keyboard(&mut self, keyboard: &Keyboard) -> bool {
        let Self {
            entities,
            order,
            tracking,
            ..
        } = self;
        for id in order.iter() {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            let handled = entity.process_keyboard(keyboard);
            tracking.settle(entity);
            if handled {
                return true;
            }
        }
        false
    }

    /// Offers the mouse to each entity in turn, translated to the entity's
    /// local cell space. Returns true as soon as one of them handles it.
    pub fn process_mouse(&mut self, mouse: &MouseState) -> bool {
        let Self {
            entities,
            order,
            tracking,
            ..
        } = self;
        for id in order.iter() {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            let origin =
                entity.position() + entity.position_offset() - entity.current_animation().center;
            let local = mouse.relative_to(origin);
            let handled = entity.process_mouse(&local);
            tracking.settle(entity);
            if handled {
                return true;
            }
        }
        false
    }

    /// Draws the visible entities onto `dest` in insertion order.
    pub fn render_to<S: RenderSurface + ?Sized>(&self, dest: &mut S) {
        for entity in self.entities() {
            entity.render_to(dest);
        }
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("id", &self.id)
            .field("entities", &self.order.len())
            .field("zones", &self.tracking.zones.len())
            .field("hotspots", &self.tracking.hotspots.len())
            .finish_non_exhaustive()
    }
}

/// Mutable borrow of a managed entity. Dropping it forwards animation changes
/// and raises movement events if the position changed.
pub struct EntityMut<'a> {
    entity: &'a mut GridEntity,
    tracking: &'a mut Tracking,
}

impl Deref for EntityMut<'_> {
    type Target = GridEntity;

    fn deref(&self) -> &GridEntity {
        &*self.entity
    }
}

impl DerefMut for EntityMut<'_> {
    fn deref_mut(&mut self) -> &mut GridEntity {
        &mut *self.entity
    }
}

impl Drop for EntityMut<'_> {
    fn drop(&mut self) {
        self.tracking.settle(&mut *self.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::{Animation, AnimationState};
    use crate::components::gridentity::{KeyboardHandler, MouseHandler};
    use std::sync::Mutex;

    fn manager_with_entity(at: Point) -> (EntityManager, EntityId) {
        let mut manager = EntityManager::new();
        let id = manager
            .add_entity(GridEntity::new(1, 1).with_position(at))
            .unwrap();
        (manager, id)
    }

    fn events(manager: &mut EntityManager) -> Vec<ManagerEvent> {
        manager.drain_events().collect()
    }

    #[test]
    fn test_move_into_zone_raises_single_enter() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        let zone = manager.add_zone(Zone::new("room", Rect::new(5, 5, 3, 3)));
        assert!(events(&mut manager).is_empty());

        let p1 = Point::new(0, 0);
        let p2 = Point::new(6, 6);
        manager.set_entity_position(id, p2).unwrap();
        let events = events(&mut manager);
        assert_eq!(
            events,
            vec![
                ManagerEvent::EntityMoved {
                    entity: id,
                    from: p1,
                    to: p2
                },
                ManagerEvent::ZoneEntered {
                    entity: id,
                    zone,
                    position: p2
                },
            ]
        );
        assert_eq!(manager.entity_ids_at(p2), &[id]);
        assert!(manager.entity_ids_at(p1).is_empty());
        assert_eq!(manager.entities_in_zone(zone), Ok(vec![id]));
    }

    #[test]
    fn test_zone_transitions() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        let a = manager.add_zone(Zone::new("a", Rect::new(0, 0, 2, 1)));
        let b = manager.add_zone(Zone::new("b", Rect::new(2, 0, 2, 1)));
        // already inside zone a when it was added
        assert_eq!(
            events(&mut manager),
            vec![ManagerEvent::ZoneEntered {
                entity: id,
                zone: a,
                position: Point::new(0, 0)
            }]
        );

        manager.set_entity_position(id, Point::new(1, 0)).unwrap();
        assert_eq!(
            events(&mut manager)[1],
            ManagerEvent::ZoneMoved {
                entity: id,
                zone: a,
                from: Point::new(0, 0),
                to: Point::new(1, 0)
            }
        );

        manager.set_entity_position(id, Point::new(2, 0)).unwrap();
        assert_eq!(
            events(&mut manager)[1..],
            [
                ManagerEvent::ZoneExited {
                    entity: id,
                    zone: a,
                    position: Point::new(1, 0)
                },
                ManagerEvent::ZoneEntered {
                    entity: id,
                    zone: b,
                    position: Point::new(2, 0)
                },
            ]
        );

        manager.set_entity_position(id, Point::new(9, 9)).unwrap();
        assert_eq!(
            events(&mut manager)[1..],
            [ManagerEvent::ZoneExited {
                entity: id,
                zone: b,
                position: Point::new(2, 0)
            }]
        );
    }

    #[test]
    fn test_events_ordered_moved_zone_hotspot() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        let zone = manager.add_zone(Zone::new("z", Rect::new(3, 3, 1, 1)));
        let spot = manager.add_hotspot(Hotspot::new("h", [Point::new(3, 3), Point::new(7, 1)]));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        manager.subscribe(move |e| seen_clone.lock().unwrap().push(e.clone()));

        manager.set_entity_position(id, Point::new(3, 3)).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], ManagerEvent::EntityMoved { .. }));
        assert_eq!(
            seen[1],
            ManagerEvent::ZoneEntered {
                entity: id,
                zone,
                position: Point::new(3, 3)
            }
        );
        assert_eq!(
            seen[2],
            ManagerEvent::HotspotEntered {
                entity: id,
                hotspot: spot,
                position: Point::new(3, 3)
            }
        );
    }

    #[test]
    fn test_moving_within_hotspot_exits_then_reenters() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        let hotspot = manager.add_hotspot(Hotspot::new("h", [Point::new(0, 0), Point::new(5, 5)]));
        events(&mut manager);

        manager.set_entity_position(id, Point::new(5, 5)).unwrap();
        let events = events(&mut manager);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ManagerEvent::EntityMoved { .. }));
        assert_eq!(
            events[1],
            ManagerEvent::HotspotExited {
                entity: id,
                hotspot,
                position: Point::new(0, 0),
            }
        );
        assert_eq!(
            events[2],
            ManagerEvent::HotspotEntered {
                entity: id,
                hotspot,
                position: Point::new(5, 5),
            }
        );

        // adding an unrelated zone re-evaluates in place without touching the hotspot
        manager.add_zone(Zone::new("far", Rect::new(50, 50, 1, 1)));
        assert!(self::events(&mut manager).is_empty());
    }

    #[test]
    fn test_disabled_entity_is_silent_but_indexed() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        let zone = manager.add_zone(Zone::new("z", Rect::new(4, 4, 2, 2)));
        manager.disable_entity(id).unwrap();
        assert_eq!(manager.is_entity_disabled(id), Ok(true));

        manager.set_entity_position(id, Point::new(4, 4)).unwrap();
        assert!(events(&mut manager).is_empty());
        assert_eq!(manager.entity_ids_at(Point::new(4, 4)), &[id]);
        assert_eq!(manager.entities_in_zone(zone), Ok(vec![id]));

        // membership was kept current, so re-enabling does not replay an enter
        manager.enable_entity(id).unwrap();
        manager.set_entity_position(id, Point::new(5, 5)).unwrap();
        assert!(matches!(
            events(&mut manager)[1],
            ManagerEvent::ZoneMoved { .. }
        ));
    }

    #[test]
    fn test_unknown_entity_is_a_usage_error() {
        let mut manager = EntityManager::new();
        let stranger = GridEntity::new(1, 1).id();
        assert_eq!(
            manager.disable_entity(stranger),
            Err(UsageError::UnknownEntity(stranger))
        );
        assert_eq!(
            manager.enable_entity(stranger),
            Err(UsageError::UnknownEntity(stranger))
        );
        assert_eq!(
            manager.is_entity_disabled(stranger),
            Err(UsageError::UnknownEntity(stranger))
        );
        assert_eq!(
            manager.set_entity_position(stranger, Point::ZERO),
            Err(UsageError::UnknownEntity(stranger))
        );
    }

    #[test]
    fn test_double_add_is_rejected() {
        let entity = GridEntity::new(1, 1);
        let same = entity.clone();
        let mut manager = EntityManager::new();
        let id = manager.add_entity(entity).unwrap();
        assert_eq!(manager.add_entity(same), Err(UsageError::AlreadyTracked(id)));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.entity_ids_at(Point::ZERO), &[id]);

        let parented = manager.entity(id).unwrap().clone();
        assert_eq!(parented.parent(), Some(manager.id()));
        let mut other = EntityManager::new();
        assert_eq!(
            other.add_entity(parented),
            Err(UsageError::AlreadyParented {
                entity: id,
                parent: manager.id()
            })
        );
        assert!(other.is_empty());
    }

    #[test]
    fn test_clear_fails_and_remove_all_tears_down() {
        let (mut manager, id) = manager_with_entity(Point::new(2, 2));
        assert_eq!(manager.clear(), Err(UsageError::ClearUnsupported));
        assert_eq!(manager.len(), 1);

        let removed = manager.remove_all();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), id);
        assert_eq!(removed[0].parent(), None);
        assert!(manager.is_empty());
        assert!(manager.entity_ids_at(Point::new(2, 2)).is_empty());

        let mut again = EntityManager::new();
        assert!(again.add_entity(removed.into_iter().next().unwrap()).is_ok());
    }

    #[test]
    fn test_remove_entity_drops_index_entry() {
        let (mut manager, id) = manager_with_entity(Point::new(1, 1));
        let entity = manager.remove_entity(id).unwrap();
        assert_eq!(entity.parent(), None);
        assert!(manager.entity_ids_at(Point::new(1, 1)).is_empty());
        assert!(matches!(
            manager.remove_entity(id),
            Err(UsageError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_entity_mut_guard_evaluates_on_drop() {
        let (mut manager, id) = manager_with_entity(Point::new(0, 0));
        {
            let mut entity = manager.entity_mut(id).unwrap();
            entity.set_position(Point::new(1, 0));
            entity.set_position(Point::new(2, 0));
        }
        let events = events(&mut manager);
        assert_eq!(
            events,
            vec![ManagerEvent::EntityMoved {
                entity: id,
                from: Point::new(0, 0),
                to: Point::new(2, 0)
            }]
        );
        assert_eq!(manager.entity_ids_at(Point::new(2, 0)), &[id]);
    }

    #[test]
    fn test_index_tracks_shared_cells() {
        let mut manager = EntityManager::new();
        let a = manager.add_entity(GridEntity::new(1, 1)).unwrap();
        let b = manager.add_entity(GridEntity::new(1, 1)).unwrap();
        assert_eq!(manager.entity_ids_at(Point::ZERO), &[a, b]);

        manager.set_entity_position(a, Point::new(1, 1)).unwrap();
        assert_eq!(manager.entity_ids_at(Point::ZERO), &[b]);
        assert_eq!(manager.entities_at(Point::new(1, 1)).count(), 1);
        for entity in manager.entities() {
            assert!(manager.entity_ids_at(entity.position()).contains(&entity.id()));
        }
    }

    #[test]
    fn test_remove_zone_raises_exit() {
        let (mut manager, id) = manager_with_entity(Point::new(1, 1));
        let zone = manager.add_zone(Zone::new("z", Rect::new(0, 0, 3, 3)));
        events(&mut manager);
        let removed = manager.remove_zone(zone).unwrap();
        assert_eq!(removed.name, "z");
        assert_eq!(
            events(&mut manager),
            vec![ManagerEvent::ZoneExited {
                entity: id,
                zone,
                position: Point::new(1, 1)
            }]
        );
        assert_eq!(manager.remove_zone(zone), Err(UsageError::UnknownZone(zone)));
        assert_eq!(manager.entities_in_zone(zone), Err(UsageError::UnknownZone(zone)));
    }

    #[test]
    fn test_update_with_viewport() {
        let mut manager = EntityManager::new();
        let inside = manager
            .add_entity(GridEntity::new(1, 1).with_position(Point::new(12, 6)))
            .unwrap();
        let outside = manager
            .add_entity(GridEntity::new(1, 1).with_position(Point::new(1, 1)))
            .unwrap();
        let container = Container::new(10, 5).with_viewport(Rect::new(10, 5, 10, 5));

        manager.update(&container, 0.016);
        assert_eq!(manager.viewport(), Some(Rect::new(10, 5, 10, 5)));
        let inside = manager.entity(inside).unwrap();
        assert!(inside.is_visible);
        assert_eq!(inside.position_offset(), Point::new(-10, -5));
        assert!(!manager.entity(outside).unwrap().is_visible);
    }

    #[test]
    fn test_update_without_viewport_uses_container_bounds() {
        let mut manager = EntityManager::new();
        let id = manager
            .add_entity(GridEntity::new(1, 1).with_position(Point::new(9, 4)))
            .unwrap();
        let container = Container::new(10, 5).with_position(Point::new(3, 2));

        manager.update(&container, 0.0);
        assert!(manager.entity(id).unwrap().is_visible);
        assert_eq!(manager.entity(id).unwrap().position_offset(), Point::new(3, 2));

        manager.set_entity_position(id, Point::new(10, 4)).unwrap();
        manager.update(&container, 0.0);
        assert!(!manager.entity(id).unwrap().is_visible);
    }

    #[test]
    fn test_update_forwards_animation_changes() {
        let mut anim = Animation::new("blink", 1, 1);
        anim.create_frame();
        anim.create_frame();
        anim.set_animation_duration(1.0);
        anim.repeat = false;
        anim.commit();

        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(anim);
        let mut manager = EntityManager::new();
        let id = manager.add_entity(entity).unwrap();
        {
            let mut entity = manager.entity_mut(id).unwrap();
            entity.set_active_animation("blink");
            entity.start();
        }
        let container = Container::new(4, 4);
        manager.update(&container, 0.5);
        manager.update(&container, 0.5);

        let states: Vec<AnimationState> = manager
            .drain_events()
            .filter_map(|e| match e {
                ManagerEvent::AnimationStateChanged(change) if change.entity == id => {
                    Some(change.new_state)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                AnimationState::Deactivated,
                AnimationState::Activated,
                AnimationState::Playing,
                AnimationState::Finished,
            ]
        );
    }

    #[test]
    fn test_process_keyboard_stops_at_first_handler() {
        fn consume(entity: &mut GridEntity, _: &Keyboard) -> bool {
            entity.name = "handled".into();
            true
        }
        let mut manager = EntityManager::new();
        let mut first = GridEntity::new(1, 1);
        first.use_keyboard = true;
        first.set_keyboard_handler(Some(consume as KeyboardHandler));
        let mut second = first.duplicate();
        second.name = "untouched".into();
        let first = manager.add_entity(first).unwrap();
        let second = manager.add_entity(second).unwrap();

        assert!(manager.process_keyboard(&Keyboard::default()));
        assert_eq!(manager.entity(first).unwrap().name, "handled");
        assert_eq!(manager.entity(second).unwrap().name, "untouched");
    }

    #[test]
    fn test_process_mouse_translates_to_local_space() {
        fn on_click(entity: &mut GridEntity, mouse: &MouseState) -> bool {
            let hit = mouse.position == Point::ZERO;
            if hit {
                let moved = entity.position() + Point::new(1, 0);
                entity.set_position(moved);
            }
            hit
        }
        let mut entity = GridEntity::new(1, 1).with_position(Point::new(3, 2));
        entity.use_mouse = true;
        entity.set_mouse_handler(Some(on_click as MouseHandler));
        let mut manager = EntityManager::new();
        let id = manager.add_entity(entity).unwrap();

        assert!(!manager.process_mouse(&MouseState::at(Point::new(0, 0))));
        assert!(manager.process_mouse(&MouseState::at(Point::new(3, 2))));
        // handler moves go through the same event path
        assert_eq!(manager.entity_ids_at(Point::new(4, 2)), &[id]);
        assert!(matches!(
            events(&mut manager)[..],
            [ManagerEvent::EntityMoved { .. }]
        ));
    }
}
