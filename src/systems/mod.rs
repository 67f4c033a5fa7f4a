//! ECS systems run once per tick.
//!
//! Suggested order: [`time::update_world_time`],
//! [`engineconfig::apply_engine_config`], [`input::update_keyboard`],
//! [`entitymanager::process_keyboard_for_managers`],
//! [`entitymanager::update_entity_managers`],
//! [`animation::update_grid_entities`].
pub mod animation;
pub mod engineconfig;
pub mod entitymanager;
pub mod input;
pub mod time;
