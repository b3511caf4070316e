/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fogwalk::config::GameConfig;
use fogwalk::sim::visibility::reveal_from_player;
use fogwalk::Map;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;

const INPUT_WAIT: Duration = Duration::from_millis(250);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = setup_logging(&config) {
        eprintln!("Logging disabled: {e}");
    }
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    // A map path on the command line wins over config.toml.
    let map_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.map_path.clone());

    let mut map = match Map::load(&map_path) {
        Ok(map) => map,
        Err(e) => {
            tracing::error!("map load failed: {e}");
            eprintln!("Could not load map: {e}");
            std::process::exit(1);
        }
    };

    if let Some(radius) = config.sight.radius {
        for index in 0..map.actor_count() {
            if let Err(e) = map.set_actor_sight_radius(index, radius) {
                tracing::warn!("sight radius not applied: {e}");
            }
        }
    }

    let mut renderer = Renderer::new();
    map.set_observer(Box::new(renderer.observer()));

    if config.sight.reveal_on_start {
        reveal_from_player(&mut map);
    }

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut map, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!("Explored {} of {} tiles.", map.seen_count(), map.width() * map.height());
}

fn game_loop(
    map: &mut Map,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new(&config.keys);
    let mut status = String::new();

    loop {
        renderer.render(map, &status)?;

        let commands = input.drain_events(INPUT_WAIT)?.to_vec();
        for command in commands {
            match command {
                Command::Quit => return Ok(()),
                Command::Step(dir) => {
                    if map.move_player(dir.step()) {
                        let revealed = reveal_from_player(map);
                        status = if revealed > 0 {
                            format!("{revealed} new tiles")
                        } else {
                            String::new()
                        };
                    } else {
                        status = "blocked".to_string();
                    }
                }
            }
        }
    }
}

/// Log to a file so the alternate screen stays clean.
/// `RUST_LOG` overrides the level from config.
fn setup_logging(config: &GameConfig) -> std::io::Result<()> {
    let file = File::create(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!(log = %config.log_file.display(), "logging initialized");
    Ok(())
}
