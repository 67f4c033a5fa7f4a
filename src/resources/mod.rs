//! ECS resources.
//!
//! Submodules overview:
//! - [`keys`] – physical key identifiers
//! - [`asciikey`] – decoding keys into characters under the modifier state
//! - [`keyboard`] – host key snapshot and the press/repeat/release state machine
//! - [`mouse`] – mouse position and buttons in cell coordinates
//! - [`worldtime`] – elapsed and per-tick time
//! - [`engineconfig`] – settings loaded from an INI file

pub mod asciikey;
pub mod engineconfig;
pub mod keyboard;
pub mod keys;
pub mod mouse;
pub mod worldtime;
