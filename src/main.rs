//! # Emberfall Main Entry Point
//!
//! Parses CLI arguments, seeds the combat session from a freshly created
//! character record, and runs the macroquad frame loop.

use clap::Parser;
use emberfall::{
    CharacterClass, CombatSession, EmberError, EmberResult, InMemoryProgression, InputHandler,
    IsoRenderer, PlayerInput, PlayerRecord,
};
use log::info;
use macroquad::prelude::*;
use std::time::Instant;
use tokio::sync::mpsc;

/// Command line arguments for the Emberfall client.
#[derive(Parser, Debug)]
#[command(name = "emberfall")]
#[command(about = "An isometric action RPG client with persistent character progression")]
#[command(version)]
struct Args {
    /// Character name
    #[arg(short, long, default_value = "Adventurer")]
    name: String,

    /// Character class (warrior, mage, ranger, cleric)
    #[arg(short, long, default_value = "warrior")]
    class: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[macroquad::main("Emberfall")]
async fn main() -> EmberResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Emberfall v{}", emberfall::VERSION);

    run_game(&args).await
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Runs the main game loop with macroquad graphics.
async fn run_game(args: &Args) -> EmberResult<()> {
    let class = CharacterClass::by_id(&args.class)
        .ok_or_else(|| EmberError::InvalidState(format!("unknown class: {}", args.class)))?;
    let record = PlayerRecord::new(args.name.clone(), &class);

    info!(
        "created {} the {} at {:?}",
        record.character_name, class.name, record.position
    );

    // The in-memory store stands in for the remote one; it must hold the
    // record before the session starts syncing against it.
    let store = InMemoryProgression::with_record(record.clone());
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let mut session =
        CombatSession::new(record, emberfall::starter_roster(), store, notice_tx);

    request_new_screen_size(1024.0, 768.0);

    let mut renderer = IsoRenderer::new()?;
    renderer.add_message(format!("Welcome to Emberfall, {}!", args.name));
    renderer.add_message("Use WASD/arrows to move, SPACE to attack".to_string());

    let input_handler = InputHandler::new();

    while session.is_running() {
        let now = Instant::now();

        if let Some(input) = input_handler.get_input() {
            match input {
                PlayerInput::Quit => {
                    info!("player quit the game");
                    session.teardown().await;
                    break;
                }
                PlayerInput::Help => {
                    renderer.add_message(
                        "Help: WASD/arrows=move, SPACE=attack, ESC=quit".to_string(),
                    );
                }
                other => session.handle_input(other, now),
            }
        }

        session.tick(now).await;

        while let Ok(notice) = notice_rx.try_recv() {
            renderer.add_message(format!("{} {}", notice.title, notice.body));
        }

        if (screen_width(), screen_height()) != renderer.viewport() {
            renderer.resize();
        }
        if let Some(player) = session.local_player() {
            renderer.set_camera(player.pos);
        }
        renderer.render_game(session.simulation(), session.record());

        next_frame().await;
    }

    info!("game loop ended");
    Ok(())
}
