#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Pinch Puzzle experience.

mod bot;
mod config;
mod hand_trace;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pinch_puzzle_core::{GridSize, Modality};
use pinch_puzzle_rendering::{Color, Presentation, RenderingBackend, Scene};
use pinch_puzzle_rendering_macroquad::MacroquadBackend;
use tracing::{info, Level};

use crate::{config::GameConfig, hand_trace::HandTrace, simulation::Simulation};

#[derive(Debug, Parser)]
#[command(name = "pinch-puzzle", version, about = "Jigsaw puzzle played with a pointer or a pinch")]
struct Cli {
    /// TOML file overriding the built-in settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Opens the puzzle window.
    Play(PlayArgs),
    /// Solves a puzzle headlessly and prints the result.
    Solve(SolveArgs),
}

#[derive(Debug, Default, clap::Args)]
struct PlayArgs {
    /// Tiles per board edge.
    #[arg(long)]
    size: Option<u32>,
    /// Image to cut into tiles.
    #[arg(long)]
    image: Option<PathBuf>,
    /// JSON-lines hand landmark recording replayed as the camera feed.
    #[arg(long)]
    hand_trace: Option<PathBuf>,
    /// Seed for the tile scatter.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, clap::Args)]
struct SolveArgs {
    /// Tiles per board edge.
    #[arg(long)]
    size: Option<u32>,
    /// Seed for the tile scatter.
    #[arg(long)]
    seed: Option<u64>,
    /// Input path the solver drives.
    #[arg(long, value_enum, default_value_t = InputMode::Pointer)]
    modality: InputMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputMode {
    Pointer,
    Camera,
}

impl From<InputMode> for Modality {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::Pointer => Modality::Pointer,
            InputMode::Camera => Modality::Camera,
        }
    }
}

/// Entry point for the Pinch Puzzle command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = GameConfig::load(cli.config.as_deref())?;
    match cli.command.unwrap_or(Command::Play(PlayArgs::default())) {
        Command::Play(args) => play(config, args),
        Command::Solve(args) => solve(&config, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();
}

fn grid_size(config: &GameConfig, requested: Option<u32>) -> Result<GridSize> {
    match requested {
        Some(value) => GridSize::new(value).context("invalid --size"),
        None => config.grid_size(),
    }
}

fn play(config: GameConfig, args: PlayArgs) -> Result<()> {
    let size = grid_size(&config, args.size)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let image = args.image.unwrap_or_else(|| config.session.image.clone());

    let trace = match args.hand_trace.as_deref() {
        Some(path) => {
            let trace = HandTrace::load(path)?;
            info!(
                path = %path.display(),
                frames = trace.len(),
                tracker = ?config.tracker_settings(),
                camera = ?config.camera_settings(),
                "replaying hand trace"
            );
            Some(trace)
        }
        None => None,
    };

    info!(size = size.get(), seed, image = %image.display(), "starting pinch puzzle");
    let mut simulation = Simulation::new(
        size,
        seed,
        config.preview_delay(),
        config.hand_tracking(),
        trace,
    );

    MacroquadBackend::new()
        .with_vsync(true)
        .with_image(image)
        .run(
            Presentation::new(
                "Pinch Puzzle",
                Color::from_rgb_u8(24, 24, 28),
                Scene::new(size),
            ),
            move |dt: Duration, input, scene: &mut Scene| {
                simulation.advance(dt, input);
                simulation.populate_scene(scene);
            },
        )
}

fn solve(config: &GameConfig, args: SolveArgs) -> Result<()> {
    let size = grid_size(config, args.size)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let report = bot::solve(
        size,
        seed,
        args.modality.into(),
        config.preview_delay(),
        config.hand_tracking(),
    )?;

    println!("size: {0}x{0}", size.get());
    println!("seed: {seed}");
    println!("moves: {}", report.moves);
    println!("time: {:.1}s", report.elapsed.as_secs_f32());
    println!("frames: {}", report.frames);
    Ok(())
}
