//! Frame-based glyph animation.
//!
//! An [`Animation`] keeps two lists of frames:
//! - `frames` – the editable draft list. Add, remove, reorder freely.
//! - a committed playback snapshot, replaced only by [`Animation::commit`].
//!
//! Playback, [`Animation::current_frame`] and frame counts always read the
//! snapshot, so edits to `frames` have no visible effect until the next
//! commit.
//!
//! # Timing
//!
//! `animation_duration` is the length of one full cycle in seconds and is
//! split evenly between the committed frames. A duration of 0 (or an empty
//! snapshot) makes the animation static: [`Animation::update`] does nothing.

use serde::{Deserialize, Serialize};

use crate::components::framebuffer::FrameBuffer;
use crate::components::glyph::Color;
use crate::geometry::Point;

/// Lifecycle and activation state of an animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
    Restarted,
    Finished,
    Activated,
    Deactivated,
}

/// A single recorded change of [`AnimationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub previous: AnimationState,
    pub new: AnimationState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AnimationFile", into = "AnimationFile")]
pub struct Animation {
    pub name: String,
    width: i32,
    height: i32,
    /// Draft frames. Call [`Animation::commit`] after editing.
    pub frames: Vec<FrameBuffer>,
    animated_frames: Vec<FrameBuffer>,
    animation_duration: f32,
    time_per_frame: f32,
    added_time: f32,
    current_frame_index: usize,
    /// Loop back to the first frame instead of stopping on the last one.
    pub repeat: bool,
    is_playing: bool,
    /// Pivot subtracted from the owner's position when drawing.
    pub center: Point,
    state: AnimationState,
    transitions: Vec<StateTransition>,
}

impl Animation {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width: width.max(0),
            height: height.max(0),
            frames: Vec::new(),
            animated_frames: Vec::new(),
            animation_duration: 0.0,
            time_per_frame: 0.0,
            added_time: 0.0,
            current_frame_index: 0,
            repeat: false,
            is_playing: false,
            center: Point::ZERO,
            state: AnimationState::Stopped,
            transitions: Vec::new(),
        }
    }

    /// Builds a looping animation of random glyphs, already committed and playing.
    pub fn create_static(
        width: i32,
        height: i32,
        frames: usize,
        blank_chance: f64,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut animation = Animation::new("default", width, height);
        for _ in 0..frames {
            let frame = animation.create_frame();
            frame.default_background = Color::BLACK;
            for y in 0..height {
                for x in 0..width {
                    let glyph = if rng.f64() <= blank_chance {
                        32
                    } else {
                        rng.i32(48..168)
                    };
                    frame.set_glyph(x, y, glyph);
                    frame.set_foreground(x, y, Color::WHITE.scaled(rng.f32() * 0.5 + 0.5));
                    frame.set_background(x, y, Color::BLACK);
                }
            }
        }
        animation.repeat = true;
        animation.commit();
        animation.set_animation_duration(1.0);
        animation.start();
        animation
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Allocates a blank frame sized to the animation and appends it to the
    /// draft list. Playback is untouched until the next commit.
    pub fn create_frame(&mut self) -> &mut FrameBuffer {
        self.frames.push(FrameBuffer::new(self.width, self.height));
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Snapshots the draft frames for playback, stops the animation and
    /// rewinds it to the first frame.
    pub fn commit(&mut self) {
        self.stop();
        self.current_frame_index = 0;
        self.added_time = 0.0;
        self.animated_frames = self.frames.clone();
        self.calculate_frame_duration();
    }

    /// Number of committed frames.
    pub fn frame_count(&self) -> usize {
        self.animated_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animated_frames.is_empty()
    }

    /// Committed frames in playback order.
    pub fn animated_frames(&self) -> &[FrameBuffer] {
        &self.animated_frames
    }

    pub fn current_frame(&self) -> Option<&FrameBuffer> {
        self.animated_frames.get(self.current_frame_index)
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Jumps to a committed frame. Any index outside the committed range
    /// resets to frame 0, not to the nearest bound.
    pub fn set_current_frame_index(&mut self, index: usize) {
        self.current_frame_index = if index >= self.animated_frames.len() {
            0
        } else {
            index
        };
    }

    pub fn animation_duration(&self) -> f32 {
        self.animation_duration
    }

    pub fn set_animation_duration(&mut self, seconds: f32) {
        self.animation_duration = seconds;
        self.calculate_frame_duration();
    }

    pub fn time_per_frame(&self) -> f32 {
        self.time_per_frame
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    fn calculate_frame_duration(&mut self) {
        self.time_per_frame = if self.is_empty() || self.animation_duration == 0.0 {
            0.0
        } else {
            self.animation_duration / self.animated_frames.len() as f32
        };
    }

    /// Records a transition when `state` differs from the current one.
    pub(crate) fn set_state(&mut self, state: AnimationState) {
        if state != self.state {
            self.transitions.push(StateTransition {
                previous: self.state,
                new: state,
            });
            self.state = state;
        }
    }

    /// Removes and returns the transitions recorded since the last drain.
    pub fn drain_transitions(&mut self) -> std::vec::Drain<'_, StateTransition> {
        self.transitions.drain(..)
    }

    pub fn start(&mut self) {
        self.calculate_frame_duration();
        self.is_playing = true;
        self.set_state(AnimationState::Playing);
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.set_state(AnimationState::Stopped);
    }

    /// Halts and rewinds without recording a Stopped transition; used when an
    /// owner switches away from this animation.
    pub(crate) fn deactivate(&mut self) {
        self.is_playing = false;
        self.added_time = 0.0;
        self.set_current_frame_index(0);
        self.set_state(AnimationState::Deactivated);
    }

    pub fn restart(&mut self) {
        self.calculate_frame_duration();
        self.is_playing = true;
        self.added_time = 0.0;
        self.set_current_frame_index(0);
        self.set_state(AnimationState::Restarted);
        self.set_state(AnimationState::Playing);
    }

    /// Advances playback by `delta` seconds, at most one frame per call.
    pub fn update(&mut self, delta: f32) {
        if !self.is_playing || self.time_per_frame == 0.0 {
            return;
        }

        self.added_time += delta;
        if self.added_time < self.time_per_frame {
            return;
        }

        self.added_time = 0.0;
        self.current_frame_index += 1;

        if self.current_frame_index >= self.animated_frames.len() {
            if self.repeat {
                self.current_frame_index = 0;
                self.set_state(AnimationState::Restarted);
                self.set_state(AnimationState::Playing);
            } else {
                self.is_playing = false;
                self.current_frame_index = self.animated_frames.len() - 1;
                self.set_state(AnimationState::Finished);
            }
        }
    }

    /// Resizes the animation and every draft and committed frame.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
        for frame in self.frames.iter_mut().chain(self.animated_frames.iter_mut()) {
            frame.resize(self.width, self.height);
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize animation: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse animation: {}", e))
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

impl PartialEq for Animation {
    /// Animations compare by name and committed content, not playback position.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.width == other.width
            && self.height == other.height
            && self.frames == other.frames
            && self.animated_frames == other.animated_frames
            && self.repeat == other.repeat
            && self.center == other.center
            && self.animation_duration == other.animation_duration
    }
}

/// Persisted form of an [`Animation`]. Playback state is not stored.
#[derive(Serialize, Deserialize)]
struct AnimationFile {
    name: String,
    width: i32,
    height: i32,
    frames: Vec<FrameBuffer>,
    animation_duration: f32,
    repeat: bool,
    #[serde(default)]
    center: Point,
}

impl From<AnimationFile> for Animation {
    fn from(file: AnimationFile) -> Self {
        let mut animation = Animation::new(file.name, file.width, file.height);
        animation.frames = file.frames;
        animation.repeat = file.repeat;
        animation.center = file.center;
        animation.animation_duration = file.animation_duration;
        animation.commit();
        animation.transitions.clear();
        animation
    }
}

impl From<Animation> for AnimationFile {
    fn from(animation: Animation) -> Self {
        Self {
            name: animation.name,
            width: animation.width,
            height: animation.height,
            frames: animation.frames,
            animation_duration: animation.animation_duration,
            repeat: animation.repeat,
            center: animation.center,
        }
    }
}
