//! Gridsprite headless demo.
//!
//! Builds a world with one container and its entity manager, a zone and a
//! hotspot, a handful of random-walking entities and a keyboard-driven
//! player. A scripted keyboard snapshot stands in for real hardware. Every
//! manager and key event is logged by observers.
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (or `--config`), falling back to defaults
//! 2. Spawn the container + manager and register observers
//! 3. For each tick:
//!    - advance `WorldTime` and feed the scripted key snapshot
//!    - random-walk the walkers through the manager
//!    - run the schedule (config, keyboard, input dispatch, manager update)
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --ticks 600 --seed 7
//! ```

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{debug, error, info, warn};
use std::path::PathBuf;

use gridsprite::components::animation::Animation;
use gridsprite::components::container::Container;
use gridsprite::components::entitymanager::{EntityManager, Hotspot, ManagerEvent, Zone};
use gridsprite::components::glyph::Color;
use gridsprite::components::gridentity::{EntityId, GridEntity, KeyboardHandler};
use gridsprite::events::entitymanager::EntityManagerEvent;
use gridsprite::events::input::{KeyPressedEvent, KeyReleasedEvent};
use gridsprite::geometry::{Point, Rect};
use gridsprite::resources::engineconfig::EngineConfig;
use gridsprite::resources::keyboard::{Keyboard, KeyboardSnapshot};
use gridsprite::resources::keys::Keys;
use gridsprite::resources::mouse::MouseState;
use gridsprite::resources::worldtime::WorldTime;
use gridsprite::systems::animation::update_grid_entities;
use gridsprite::systems::engineconfig::apply_engine_config;
use gridsprite::systems::entitymanager::{
    process_keyboard_for_managers, process_mouse_for_managers, update_entity_managers,
};
use gridsprite::systems::input::update_keyboard;
use gridsprite::systems::time::update_world_time;

/// Headless gridsprite demo
#[derive(Parser)]
#[command(version, about = "Random-walking grid entities with zones, hotspots and key repeat.")]
struct Cli {
    /// Path to the INI configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 240)]
    ticks: u32,

    /// Number of random-walking entities.
    #[arg(long, default_value_t = 4)]
    entities: usize,

    /// Seed for the random walk.
    #[arg(long)]
    seed: Option<u64>,
}

/// Arrow keys move the player one cell per press or repeat; space toggles
/// its animation.
fn player_keys(entity: &mut GridEntity, keyboard: &Keyboard) -> bool {
    if keyboard.is_key_pressed(Keys::Space) {
        let next = if entity.current_animation().name == "static" {
            "default"
        } else {
            "static"
        };
        entity.set_active_animation(next);
        entity.start();
        return true;
    }

    let mut step = Point::ZERO;
    if keyboard.is_key_pressed(Keys::Left) {
        step.x -= 1;
    }
    if keyboard.is_key_pressed(Keys::Right) {
        step.x += 1;
    }
    if keyboard.is_key_pressed(Keys::Up) {
        step.y -= 1;
    }
    if keyboard.is_key_pressed(Keys::Down) {
        step.y += 1;
    }
    if step == Point::ZERO {
        return false;
    }
    let position = entity.position() + step;
    entity.set_position(position);
    true
}

/// Keys held by the scripted "player" at a given tick.
fn scripted_keys(tick: u32) -> KeyboardSnapshot {
    let mut snapshot = KeyboardSnapshot::default();
    match tick {
        10..=70 => snapshot.press(Keys::Right),
        90..=92 => snapshot.press(Keys::Space),
        100..=130 => snapshot.press(Keys::Down),
        _ => {}
    }
    snapshot
}

fn log_manager_event(event: &EntityManagerEvent) {
    match &event.event {
        ManagerEvent::EntityMoved { .. } => debug!("{:?}", event.event),
        ManagerEvent::ZoneEntered { entity, zone, position } => {
            info!("Entity {} entered zone {} at {:?}", entity, zone, position)
        }
        ManagerEvent::ZoneExited { entity, zone, position } => {
            info!("Entity {} left zone {} from {:?}", entity, zone, position)
        }
        ManagerEvent::ZoneMoved { .. } => debug!("{:?}", event.event),
        ManagerEvent::HotspotEntered { entity, hotspot, position } => {
            info!("Entity {} stepped on hotspot {} at {:?}", entity, hotspot, position)
        }
        ManagerEvent::HotspotExited { entity, hotspot, .. } => {
            info!("Entity {} left hotspot {}", entity, hotspot)
        }
        ManagerEvent::AnimationStateChanged(change) => debug!(
            "Entity {} animation '{}': {:?} -> {:?}",
            change.entity, change.animation, change.previous_state, change.new_state
        ),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => EngineConfig::with_path(path),
        None => EngineConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    let tick_seconds = config.tick_seconds();
    let (width, height) = config.grid_size();

    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    info!(
        "Starting gridsprite demo: {}x{} grid, {} walkers, {} ticks",
        width, height, cli.entities, cli.ticks
    );

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(Keyboard::default());
    world.insert_resource(KeyboardSnapshot::default());
    world.insert_resource(MouseState::default());
    world.insert_resource(config);

    // --------------- Manager, zones and entities ---------------
    let mut manager = EntityManager::new();
    let pond = manager.add_zone(Zone::new(
        "pond",
        Rect::new(width / 4, height / 4, width / 2, height / 2),
    ));
    manager.add_hotspot(Hotspot::new(
        "shrine",
        (0..5).map(|i| Point::new(width / 2 + i, height / 2)),
    ));

    let mut walkers: Vec<EntityId> = Vec::with_capacity(cli.entities);
    for i in 0..cli.entities {
        let mut entity = GridEntity::from_glyph(Color::YELLOW, Color::BLACK, '@' as i32)
            .with_name(format!("walker{}", i))
            .with_position(Point::new(rng.i32(0..width), rng.i32(0..height)));
        entity.start();
        match manager.add_entity(entity) {
            Ok(id) => walkers.push(id),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    let mut player = GridEntity::from_glyph(Color::GREEN, Color::BLACK, 'P' as i32)
        .with_name("player")
        .with_position(Point::new(0, height / 2));
    let mut noise = Animation::create_static(1, 1, 4, 0.25, &mut rng);
    noise.name = "static".to_string();
    player.add_animation(noise);
    player.use_keyboard = true;
    player.set_keyboard_handler(Some(player_keys as KeyboardHandler));
    if let Err(e) = manager.add_entity(player) {
        error!("{}", e);
        std::process::exit(1);
    }

    let container = world
        .spawn((
            Container::new(width, height).with_viewport(Rect::new(0, 0, width, height)),
            manager,
        ))
        .id();

    // --------------- Observers ---------------
    world.add_observer(|trigger: On<EntityManagerEvent>| log_manager_event(trigger.event()));
    world.add_observer(|trigger: On<KeyPressedEvent>| {
        let event = trigger.event();
        debug!(
            "Key pressed: {:?} '{}' (repeat: {})",
            event.key.key,
            event.key.character.escape_default(),
            event.repeat
        );
    });
    world.add_observer(|trigger: On<KeyReleasedEvent>| {
        debug!("Key released: {:?}", trigger.event().key.key);
    });
    // Ensure the observers are registered before any system triggers events.
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            apply_engine_config,
            update_keyboard,
            process_keyboard_for_managers,
            process_mouse_for_managers,
            update_entity_managers,
            update_grid_entities,
        )
            .chain(),
    );

    // --------------- Main loop ---------------
    for tick in 0..cli.ticks {
        update_world_time(&mut world, tick_seconds);
        world.insert_resource(scripted_keys(tick));

        if tick % 4 == 0 {
            let mut entity_ref = world.entity_mut(container);
            if let Some(mut manager) = entity_ref.get_mut::<EntityManager>() {
                for &id in &walkers {
                    let Some(position) = manager.entity(id).map(|e| e.position()) else {
                        continue;
                    };
                    let step = Point::new(rng.i32(-1..=1), rng.i32(-1..=1));
                    let next = position + step;
                    let next = Point::new(next.x.clamp(0, width - 1), next.y.clamp(0, height - 1));
                    if let Err(e) = manager.set_entity_position(id, next) {
                        error!("{}", e);
                    }
                }
            }
        }

        update.run(&mut world);
    }

    let elapsed = world.resource::<WorldTime>().elapsed;
    if let Some(manager) = world.get::<EntityManager>(container) {
        let in_pond = manager.entities_in_zone(pond).map(|ids| ids.len()).unwrap_or(0);
        info!(
            "Finished {} ticks ({:.2}s simulated); {} of {} entities in the pond",
            cli.ticks,
            elapsed,
            in_pond,
            manager.len()
        );
    }
}
