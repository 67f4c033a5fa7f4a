//! Positioned, animated grid objects.
//!
//! A [`GridEntity`] owns a set of named [`Animation`]s and exposes one of them
//! as the active animation used for drawing and bounding boxes. Every entity
//! has an animation named `"default"` from construction onwards; it can be
//! replaced by adding another animation with the same name but never removed.
//!
//! Names are case-insensitive: `"Walk"` and `"walk"` address the same slot and
//! adding an animation under an existing name replaces it.
//!
//! Switching the active animation stops and rewinds the previous one, marks it
//! [`AnimationState::Deactivated`], then marks the new one
//! [`AnimationState::Activated`]. Each recorded state change is delivered
//! once, synchronously, to listeners registered with
//! [`GridEntity::on_animation_state_changed`], and buffered for the owning
//! [`EntityManager`](crate::components::entitymanager::EntityManager).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::animation::{Animation, AnimationState};
use crate::components::entitymanager::ManagerId;
use crate::components::framebuffer::RenderSurface;
use crate::components::glyph::Color;
use crate::error::UsageError;
use crate::geometry::{Point, Rect};
use crate::resources::keyboard::Keyboard;
use crate::resources::mouse::MouseState;

/// Name of the animation every entity is created with.
pub const DEFAULT_ANIMATION: &str = "default";

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`GridEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How [`GridEntity::render_position`] interprets position values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionMode {
    /// Positions are cell coordinates, scaled by the cell size.
    #[default]
    Cell,
    /// Positions are already pixels.
    Pixel,
}

/// Notification that the active animation of an entity changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationStateChanged {
    pub entity: EntityId,
    pub animation: String,
    pub new_state: AnimationState,
    pub previous_state: AnimationState,
}

pub type KeyboardHandler = fn(&mut GridEntity, &Keyboard) -> bool;
pub type MouseHandler = fn(&mut GridEntity, &MouseState) -> bool;
type AnimationListener = Arc<dyn Fn(&AnimationStateChanged) + Send + Sync>;

#[derive(Debug, Clone)]
enum ActiveAnimation {
    Registered(String),
    /// Swapped in without being added to the animation map.
    Detached(Box<Animation>),
}

fn animation_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Component, Clone, Serialize, Deserialize)]
#[serde(from = "GridEntityFile", into = "GridEntityFile")]
pub struct GridEntity {
    id: EntityId,
    pub name: String,
    position: Point,
    position_offset: Point,
    pub collision_box: Rect,
    animation_bounding_box: Rect,
    animations: FxHashMap<String, Animation>,
    active: ActiveAnimation,
    pub is_visible: bool,
    /// When false, [`GridEntity::update`] does not advance the animation.
    pub do_update: bool,
    pub use_keyboard: bool,
    pub use_mouse: bool,
    pub position_mode: PositionMode,
    parent: Option<ManagerId>,
    keyboard_handler: Option<KeyboardHandler>,
    mouse_handler: Option<MouseHandler>,
    listeners: Vec<AnimationListener>,
    pending: Vec<AnimationStateChanged>,
}

impl GridEntity {
    /// Creates an entity whose `"default"` animation has one blank frame of
    /// `width`×`height` cells.
    pub fn new(width: i32, height: i32) -> Self {
        let mut animation = Animation::new(DEFAULT_ANIMATION, width, height);
        animation.create_frame();
        animation.commit();
        Self::from_animation(animation)
    }

    /// Creates a 1×1 entity showing a single glyph.
    pub fn from_glyph(foreground: Color, background: Color, glyph: i32) -> Self {
        let mut animation = Animation::new(DEFAULT_ANIMATION, 1, 1);
        let frame = animation.create_frame();
        frame.set_glyph(0, 0, glyph);
        frame.set_foreground(0, 0, foreground);
        frame.set_background(0, 0, background);
        animation.commit();
        Self::from_animation(animation)
    }

    /// Creates an entity using `animation` (renamed to `"default"`).
    pub fn from_animation(mut animation: Animation) -> Self {
        animation.name = DEFAULT_ANIMATION.to_string();
        let (width, height) = (animation.width(), animation.height());
        animation.set_state(AnimationState::Activated);
        animation.drain_transitions().for_each(drop);

        let mut animations = FxHashMap::default();
        animations.insert(DEFAULT_ANIMATION.to_string(), animation);

        let mut entity = Self {
            id: EntityId::next(),
            name: String::new(),
            position: Point::ZERO,
            position_offset: Point::ZERO,
            collision_box: Rect::new(0, 0, width, height),
            animation_bounding_box: Rect::new(0, 0, width, height),
            animations,
            active: ActiveAnimation::Registered(DEFAULT_ANIMATION.to_string()),
            is_visible: true,
            do_update: true,
            use_keyboard: false,
            use_mouse: false,
            position_mode: PositionMode::Cell,
            parent: None,
            keyboard_handler: None,
            mouse_handler: None,
            listeners: Vec::new(),
            pending: Vec::new(),
        };
        entity.update_animation_bounding_box();
        entity
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Copy of this entity with a fresh identity and no parent.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = EntityId::next();
        copy.parent = None;
        copy.pending.clear();
        copy
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The manager currently tracking this entity, if any.
    pub fn parent(&self) -> Option<ManagerId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ManagerId>) {
        self.parent = parent;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Moves the entity. When the entity is owned by a manager, move it
    /// through the manager so zone and hotspot events fire.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Render offset assigned by the owning manager from its viewport.
    pub fn position_offset(&self) -> Point {
        self.position_offset
    }

    pub(crate) fn set_position_offset(&mut self, offset: Point) {
        self.position_offset = offset;
    }

    pub fn animation_bounding_box(&self) -> Rect {
        self.animation_bounding_box
    }

    pub fn current_animation(&self) -> &Animation {
        match &self.active {
            ActiveAnimation::Registered(key) => self
                .animations
                .get(key)
                .or_else(|| self.animations.get(DEFAULT_ANIMATION))
                .unwrap_or_else(|| unreachable!("entity lost its default animation")),
            ActiveAnimation::Detached(animation) => &**animation,
        }
    }

    pub fn current_animation_mut(&mut self) -> &mut Animation {
        match &mut self.active {
            ActiveAnimation::Registered(key) => {
                let key = if self.animations.contains_key(key.as_str()) {
                    key.as_str()
                } else {
                    DEFAULT_ANIMATION
                };
                self.animations
                    .get_mut(key)
                    .unwrap_or_else(|| unreachable!("entity lost its default animation"))
            }
            ActiveAnimation::Detached(animation) => &mut **animation,
        }
    }

    /// True when the active animation is not part of the animation map.
    pub fn is_active_detached(&self) -> bool {
        matches!(self.active, ActiveAnimation::Detached(_))
    }

    pub fn get_animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(&animation_key(name))
    }

    pub fn get_animation_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(&animation_key(name))
    }

    pub fn animations(&self) -> impl Iterator<Item = &Animation> {
        self.animations.values()
    }

    /// Registered animation names, sorted.
    pub fn animation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.values().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Adds `animation`, replacing any animation with the same name. If the
    /// replaced animation was active, the new one becomes active in its place.
    pub fn add_animation(&mut self, mut animation: Animation) {
        animation.drain_transitions().for_each(drop);
        let key = animation_key(&animation.name);
        let replaces_active =
            matches!(&self.active, ActiveAnimation::Registered(active) if *active == key);

        if replaces_active || self.animations.is_empty() {
            animation.set_state(AnimationState::Activated);
            self.animations.insert(key.clone(), animation);
            self.active = ActiveAnimation::Registered(key);
            self.record_active_transitions();
            self.update_animation_bounding_box();
        } else {
            self.animations.insert(key, animation);
        }
    }

    /// Removes and returns the named animation. Removing the active animation
    /// falls back to `"default"`; removing `"default"` itself is an error.
    pub fn remove_animation(&mut self, name: &str) -> Result<Option<Animation>, UsageError> {
        let key = animation_key(name);
        if key == DEFAULT_ANIMATION {
            return Err(UsageError::DefaultAnimationRemoval);
        }

        let was_active =
            matches!(&self.active, ActiveAnimation::Registered(active) if *active == key);
        if was_active {
            self.set_active_animation(DEFAULT_ANIMATION);
        }
        Ok(self.animations.remove(&key))
    }

    /// Activates a registered animation. Unknown names are ignored.
    pub fn set_active_animation(&mut self, name: &str) {
        let key = animation_key(name);
        if !self.animations.contains_key(&key) {
            return;
        }
        if matches!(&self.active, ActiveAnimation::Registered(active) if *active == key) {
            return;
        }
        self.deactivate_current();
        self.active = ActiveAnimation::Registered(key);
        self.activate_current();
    }

    /// Activates an animation that is not registered with this entity.
    pub fn set_active_animation_instance(&mut self, mut animation: Animation) {
        animation.drain_transitions().for_each(drop);
        self.deactivate_current();
        self.active = ActiveAnimation::Detached(Box::new(animation));
        self.activate_current();
    }

    fn deactivate_current(&mut self) {
        self.current_animation_mut().deactivate();
        self.record_active_transitions();
    }

    fn activate_current(&mut self) {
        let animation = self.current_animation_mut();
        // changes made while it was inactive are not notified
        animation.drain_transitions().for_each(drop);
        animation.set_state(AnimationState::Activated);
        self.record_active_transitions();
        self.update_animation_bounding_box();
    }

    /// Moves the active animation's recorded transitions into notifications.
    fn record_active_transitions(&mut self) {
        let id = self.id;
        let animation = match &mut self.active {
            ActiveAnimation::Registered(key) => match self.animations.get_mut(key.as_str()) {
                Some(animation) => animation,
                None => return,
            },
            ActiveAnimation::Detached(animation) => &mut **animation,
        };
        let name = animation.name.clone();
        for transition in animation.drain_transitions() {
            let event = AnimationStateChanged {
                entity: id,
                animation: name.clone(),
                new_state: transition.new,
                previous_state: transition.previous,
            };
            for listener in &self.listeners {
                listener(&event);
            }
            self.pending.push(event);
        }
    }

    pub fn update_animation_bounding_box(&mut self) {
        let animation = self.current_animation();
        self.animation_bounding_box = Rect::new(
            -animation.center.x,
            -animation.center.y,
            animation.width(),
            animation.height(),
        );
    }

    /// Advances the active animation when `do_update` is set.
    pub fn update(&mut self, delta: f32) {
        if !self.do_update {
            return;
        }
        self.current_animation_mut().update(delta);
        self.record_active_transitions();
    }

    /// Starts the active animation.
    pub fn start(&mut self) {
        self.current_animation_mut().start();
        self.record_active_transitions();
    }

    /// Stops the active animation.
    pub fn stop(&mut self) {
        self.current_animation_mut().stop();
        self.record_active_transitions();
    }

    /// Registers a listener called synchronously for every state change of
    /// the active animation.
    pub fn on_animation_state_changed<F>(&mut self, listener: F)
    where
        F: Fn(&AnimationStateChanged) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Removes and returns notifications buffered since the last drain.
    pub fn drain_animation_events(&mut self) -> std::vec::Drain<'_, AnimationStateChanged> {
        self.pending.drain(..)
    }

    /// Top-left corner of the drawn frame in screen units.
    ///
    /// `cell_size` is the font cell size in pixels; it is only applied in
    /// [`PositionMode::Cell`].
    pub fn render_position(&self, cell_size: Point) -> Point {
        let origin = self.position + self.position_offset - self.current_animation().center;
        match self.position_mode {
            PositionMode::Pixel => origin,
            PositionMode::Cell => Point::new(origin.x * cell_size.x, origin.y * cell_size.y),
        }
    }

    /// Copies the current frame onto `dest` at the entity's cell position.
    pub fn render_to<S: RenderSurface + ?Sized>(&self, dest: &mut S) {
        if !self.is_visible {
            return;
        }
        let animation = self.current_animation();
        if let Some(frame) = animation.current_frame() {
            let origin = self.position + self.position_offset - animation.center;
            frame.copy_to(dest, origin.x, origin.y);
        }
    }

    pub fn set_keyboard_handler(&mut self, handler: Option<KeyboardHandler>) {
        self.keyboard_handler = handler;
    }

    pub fn set_mouse_handler(&mut self, handler: Option<MouseHandler>) {
        self.mouse_handler = handler;
    }

    /// Returns true when the entity consumed the keyboard state.
    pub fn process_keyboard(&mut self, keyboard: &Keyboard) -> bool {
        if !self.use_keyboard {
            return false;
        }
        match self.keyboard_handler {
            Some(handler) => handler(self, keyboard),
            None => false,
        }
    }

    /// Returns true when the entity consumed the mouse state. `mouse` is
    /// expected in the entity's local cell space.
    pub fn process_mouse(&mut self, mouse: &MouseState) -> bool {
        if !self.use_mouse {
            return false;
        }
        match self.mouse_handler {
            Some(handler) => handler(self, mouse),
            None => false,
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize entity: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse entity: {}", e))
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), String> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| format!("Failed to write {}: {}", path.as_ref().display(), e))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, String> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read {}: {}", path.as_ref().display(), e))?;
        Self::from_json(&json)
    }
}

impl fmt::Debug for GridEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEntity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("animation", &self.current_animation().name)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Persisted form of a [`GridEntity`]. Identity, parent, handlers and
/// listeners are runtime-only.
#[derive(Serialize, Deserialize)]
struct GridEntityFile {
    name: String,
    position: Point,
    collision_box: Rect,
    animations: Vec<Animation>,
    current_animation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detached_animation: Option<Animation>,
    is_visible: bool,
    #[serde(default)]
    position_mode: PositionMode,
}

impl From<GridEntityFile> for GridEntity {
    fn from(file: GridEntityFile) -> Self {
        let mut others = Vec::new();
        let mut default = None;
        for animation in file.animations {
            if animation_key(&animation.name) == DEFAULT_ANIMATION {
                default = Some(animation);
            } else {
                others.push(animation);
            }
        }
        let default = default.unwrap_or_else(|| {
            let (w, h) = others
                .first()
                .map(|a| (a.width(), a.height()))
                .unwrap_or((1, 1));
            let mut animation = Animation::new(DEFAULT_ANIMATION, w, h);
            animation.create_frame();
            animation.commit();
            animation
        });

        let mut entity = GridEntity::from_animation(default);
        for animation in others {
            entity.add_animation(animation);
        }
        match file.detached_animation {
            Some(animation) => entity.set_active_animation_instance(animation),
            None => entity.set_active_animation(&file.current_animation),
        }
        entity.name = file.name;
        entity.position = file.position;
        entity.collision_box = file.collision_box;
        entity.is_visible = file.is_visible;
        entity.position_mode = file.position_mode;
        entity.pending.clear();
        entity
    }
}

impl From<GridEntity> for GridEntityFile {
    fn from(entity: GridEntity) -> Self {
        let (current_animation, detached_animation) = match entity.active {
            ActiveAnimation::Registered(key) => (key, None),
            ActiveAnimation::Detached(animation) => (animation.name.clone(), Some(*animation)),
        };
        let mut animations: Vec<Animation> = entity.animations.into_values().collect();
        animations.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            name: entity.name,
            position: entity.position,
            collision_box: entity.collision_box,
            animations,
            current_animation,
            detached_animation,
            is_visible: entity.is_visible,
            position_mode: entity.position_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::framebuffer::FrameBuffer;
    use std::sync::Mutex;

    fn animation(name: &str, width: i32, height: i32, frames: usize) -> Animation {
        let mut anim = Animation::new(name, width, height);
        for _ in 0..frames {
            anim.create_frame();
        }
        anim.set_animation_duration(frames as f32);
        anim.commit();
        anim
    }

    #[test]
    fn test_new_entity_has_active_default() {
        let entity = GridEntity::new(3, 2);
        assert_eq!(entity.animation_count(), 1);
        assert_eq!(entity.current_animation().name, DEFAULT_ANIMATION);
        assert_eq!(entity.current_animation().frame_count(), 1);
        assert_eq!(entity.current_animation().state(), AnimationState::Activated);
        assert_eq!(entity.collision_box, Rect::new(0, 0, 3, 2));
        assert_eq!(entity.animation_bounding_box(), Rect::new(0, 0, 3, 2));
    }

    #[test]
    fn test_default_animation_cannot_be_removed() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("walk", 1, 1, 2));
        entity.add_animation(animation("run", 1, 1, 2));
        assert_eq!(
            entity.remove_animation("default"),
            Err(UsageError::DefaultAnimationRemoval)
        );
        assert_eq!(
            entity.remove_animation("DEFAULT"),
            Err(UsageError::DefaultAnimationRemoval)
        );
        assert!(entity.get_animation("default").is_some());
    }

    #[test]
    fn test_unknown_name_leaves_active_unchanged() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("walk", 1, 1, 2));
        entity.set_active_animation("walk");
        entity.set_active_animation("swim");
        assert_eq!(entity.current_animation().name, "walk");
    }

    #[test]
    fn test_names_are_case_insensitive_and_replace() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("Walk", 1, 1, 2));
        entity.add_animation(animation("WALK", 1, 1, 5));
        assert_eq!(entity.animation_count(), 2);
        assert_eq!(entity.get_animation("walk").map(|a| a.frame_count()), Some(5));
    }

    #[test]
    fn test_switch_rewinds_previous_and_updates_bbox() {
        let mut entity = GridEntity::new(1, 1);
        let mut big = animation("big", 4, 3, 2);
        big.center = Point::new(1, 1);
        entity.add_animation(big);
        entity.add_animation(animation("walk", 1, 1, 3));

        entity.set_active_animation("walk");
        entity.start();
        let step = entity.current_animation().time_per_frame();
        entity.update(step);
        assert_eq!(entity.current_animation().current_frame_index(), 1);

        entity.set_active_animation("big");
        let walk = entity.get_animation("walk").unwrap();
        assert_eq!(walk.current_frame_index(), 0);
        assert!(!walk.is_playing());
        assert_eq!(walk.state(), AnimationState::Deactivated);
        assert_eq!(entity.animation_bounding_box(), Rect::new(-1, -1, 4, 3));
    }

    #[test]
    fn test_listener_sees_deactivate_then_activate() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("walk", 1, 1, 2));
        entity.on_animation_state_changed(move |e| {
            seen_clone
                .lock()
                .unwrap()
                .push((e.animation.clone(), e.previous_state, e.new_state));
        });

        entity.set_active_animation("walk");
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (
                    "default".to_string(),
                    AnimationState::Activated,
                    AnimationState::Deactivated
                ),
                (
                    "walk".to_string(),
                    AnimationState::Stopped,
                    AnimationState::Activated
                ),
            ]
        );
        assert_eq!(entity.drain_animation_events().count(), 2);
    }

    #[test]
    fn test_inactive_animation_changes_are_not_replayed_on_switch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("walk", 1, 1, 2));
        entity.on_animation_state_changed(move |e| {
            seen_clone
                .lock()
                .unwrap()
                .push((e.animation.clone(), e.new_state));
        });

        let walk = entity.get_animation_mut("walk").unwrap();
        walk.start();
        walk.stop();
        entity.set_active_animation("walk");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("default".to_string(), AnimationState::Deactivated),
                ("walk".to_string(), AnimationState::Activated),
            ]
        );
        assert_eq!(entity.drain_animation_events().count(), 2);
    }

    #[test]
    fn test_removing_active_falls_back_to_default() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("walk", 1, 1, 2));
        entity.set_active_animation("walk");
        let removed = entity.remove_animation("walk").unwrap();
        assert!(removed.is_some());
        assert_eq!(entity.current_animation().name, DEFAULT_ANIMATION);
        assert_eq!(entity.remove_animation("walk"), Ok(None));
    }

    #[test]
    fn test_replacing_active_animation_activates_replacement() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("default", 2, 5, 3));
        assert_eq!(entity.current_animation().frame_count(), 3);
        assert_eq!(entity.current_animation().state(), AnimationState::Activated);
        assert_eq!(entity.animation_bounding_box(), Rect::new(0, 0, 2, 5));
    }

    #[test]
    fn test_detached_animation_swap() {
        let mut entity = GridEntity::new(1, 1);
        entity.set_active_animation_instance(animation("explode", 2, 2, 4));
        assert!(entity.is_active_detached());
        assert_eq!(entity.current_animation().name, "explode");
        assert!(entity.get_animation("explode").is_none());

        entity.set_active_animation("default");
        assert!(!entity.is_active_detached());
    }

    #[test]
    fn test_do_update_gates_animation() {
        let mut entity = GridEntity::new(1, 1);
        entity.add_animation(animation("default", 1, 1, 2));
        entity.start();
        entity.do_update = false;
        entity.update(10.0);
        assert_eq!(entity.current_animation().current_frame_index(), 0);
        entity.do_update = true;
        entity.update(1.0);
        assert_eq!(entity.current_animation().current_frame_index(), 1);
    }

    #[test]
    fn test_render_to_uses_position_offset_and_center() {
        let mut anim = Animation::new("default", 1, 1);
        anim.create_frame().set_glyph(0, 0, 64);
        anim.center = Point::new(0, 1);
        anim.commit();
        let mut entity = GridEntity::from_animation(anim).with_position(Point::new(3, 3));
        entity.set_position_offset(Point::new(-1, 0));

        let mut dest = FrameBuffer::new(5, 5);
        entity.render_to(&mut dest);
        assert_eq!(dest.get(2, 2).map(|c| c.glyph), Some(64));

        entity.is_visible = false;
        let mut hidden = FrameBuffer::new(5, 5);
        entity.render_to(&mut hidden);
        assert!(hidden.cells().iter().all(|c| c.glyph == 0));
    }

    #[test]
    fn test_render_position_modes() {
        let mut entity = GridEntity::new(1, 1).with_position(Point::new(2, 3));
        assert_eq!(entity.render_position(Point::new(8, 16)), Point::new(16, 48));
        entity.position_mode = PositionMode::Pixel;
        assert_eq!(entity.render_position(Point::new(8, 16)), Point::new(2, 3));
    }

    #[test]
    fn test_keyboard_handler_requires_use_keyboard() {
        fn consume(entity: &mut GridEntity, _: &Keyboard) -> bool {
            entity.name = "handled".into();
            true
        }
        let keyboard = Keyboard::default();
        let mut entity = GridEntity::new(1, 1);
        entity.set_keyboard_handler(Some(consume as KeyboardHandler));
        assert!(!entity.process_keyboard(&keyboard));
        entity.use_keyboard = true;
        assert!(entity.process_keyboard(&keyboard));
        assert_eq!(entity.name, "handled");
    }

    #[test]
    fn test_duplicate_gets_new_identity() {
        let entity = GridEntity::new(1, 1);
        let copy = entity.clone();
        let dup = entity.duplicate();
        assert_eq!(copy.id(), entity.id());
        assert_ne!(dup.id(), entity.id());
    }

    #[test]
    fn test_json_restores_active_animation() {
        let mut entity = GridEntity::new(2, 2)
            .with_name("hero")
            .with_position(Point::new(4, 5));
        entity.add_animation(animation("walk", 2, 2, 3));
        entity.set_active_animation("walk");

        let loaded = GridEntity::from_json(&entity.to_json().unwrap()).unwrap();
        assert_eq!(loaded.name, "hero");
        assert_eq!(loaded.position(), Point::new(4, 5));
        assert_eq!(loaded.current_animation().name, "walk");
        assert_eq!(loaded.animation_count(), 2);
        assert_ne!(loaded.id(), entity.id());
    }
}
